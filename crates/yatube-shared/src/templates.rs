//! Template names, one per page.

pub const INDEX: &str = "posts/index.html";
pub const GROUP_LIST: &str = "posts/group_list.html";
pub const PROFILE: &str = "posts/profile.html";
pub const POST_DETAIL: &str = "posts/post_detail.html";
/// Shared by the create and edit pages.
pub const POST_FORM: &str = "posts/create_or_update.html";
pub const ABOUT_AUTHOR: &str = "about/author.html";
pub const ABOUT_TECH: &str = "about/tech.html";
