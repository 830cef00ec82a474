//! View models - the typed context each page template receives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public information about a post's author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorView {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupView {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// A post with its author and group already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub text: String,
    pub author: AuthorView,
    pub group: Option<GroupView>,
    pub created_at: DateTime<Utc>,
}

/// One page of a paginated listing, as a template consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView<T> {
    pub object_list: Vec<T>,
    pub number: u64,
    pub per_page: usize,
    pub count: usize,
    pub num_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> PageView<T> {
    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }
}

/// Context of `posts/index.html`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexContext {
    pub page_obj: PageView<PostView>,
}

/// Context of `posts/group_list.html`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupListContext {
    pub group: GroupView,
    pub page_obj: PageView<PostView>,
}

/// Context of `posts/profile.html`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileContext {
    pub author: AuthorView,
    pub post_count: u64,
    pub page_obj: PageView<PostView>,
}

/// Context of `posts/post_detail.html`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailContext {
    pub post: PostView,
    pub author_post_count: u64,
}

/// Form field widget kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    CharField,
    ModelChoiceField,
}

/// One option of a choice field; `value` is what gets submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub kind: FieldKind,
    pub label: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormView {
    pub fields: Vec<FormField>,
}

impl FormView {
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(|f| f.errors.is_empty())
    }
}

/// Context of `posts/create_or_update.html`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostFormContext {
    pub form: FormView,
    pub is_edit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<PostView>,
}

/// Submitted post form (`application/x-www-form-urlencoded`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostFormData {
    #[serde(default)]
    pub text: String,
    /// Group slug; empty or absent means no group.
    #[serde(default)]
    pub group: Option<String>,
}

/// Context of the static about pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AboutContext {
    pub title: String,
}
