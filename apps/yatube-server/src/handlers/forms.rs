//! The post form shown on the create and edit pages.

use yatube_core::domain::Group;
use yatube_shared::dto::{Choice, FieldKind, FormField, FormView};

pub const TEXT_FIELD: &str = "text";
pub const GROUP_FIELD: &str = "group";

/// Build the post form. `group` is the selected group's slug.
pub fn post_form(groups: &[Group], text: Option<&str>, group: Option<&str>) -> FormView {
    FormView {
        fields: vec![
            FormField {
                name: TEXT_FIELD.to_string(),
                kind: FieldKind::CharField,
                label: "Текст поста".to_string(),
                required: true,
                value: text.map(str::to_string),
                choices: Vec::new(),
                errors: Vec::new(),
            },
            FormField {
                name: GROUP_FIELD.to_string(),
                kind: FieldKind::ModelChoiceField,
                label: "Группа".to_string(),
                required: false,
                value: group.filter(|g| !g.is_empty()).map(str::to_string),
                choices: groups
                    .iter()
                    .map(|g| Choice {
                        value: g.slug.clone(),
                        label: g.title.clone(),
                    })
                    .collect(),
                errors: Vec::new(),
            },
        ],
    }
}

/// Attach an error message to the named field.
pub fn add_error(form: &mut FormView, field: &str, message: impl Into<String>) {
    if let Some(f) = form.fields.iter_mut().find(|f| f.name == field) {
        f.errors.push(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_kinds() {
        let groups = vec![Group::new("test-title", "test-slug", "").unwrap()];
        let form = post_form(&groups, None, None);

        assert_eq!(form.field("text").unwrap().kind, FieldKind::CharField);
        assert!(form.field("text").unwrap().required);

        let group = form.field("group").unwrap();
        assert_eq!(group.kind, FieldKind::ModelChoiceField);
        assert!(!group.required);
        assert_eq!(group.choices[0].value, "test-slug");
    }

    #[test]
    fn test_errors_attach_to_field() {
        let mut form = post_form(&[], Some(""), None);
        assert!(form.is_valid());

        add_error(&mut form, TEXT_FIELD, "This field is required.");

        assert!(!form.is_valid());
        assert_eq!(form.field("text").unwrap().errors.len(), 1);
        assert!(form.field("group").unwrap().errors.is_empty());
    }
}
