//! Reconcile a note's existing frontmatter with its content type's template.
//!
//! Existing scalars always win, list keys are unioned existing-first, and keys only
//! the template knows are appended in template order. Re-running a merge on its
//! own output changes nothing.

use composer_core::{Properties, PropertyValue, TemplateRenderResult};
use indexmap::IndexSet;

/// Merged properties plus the keys that must serialize as lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeResult {
    pub properties: Properties,
    pub list_keys: IndexSet<String>,
}

impl MergeResult {
    /// Whether the merge changed anything relative to `existing`
    pub fn differs_from(&self, existing: &Properties) -> bool {
        self.properties.len() != existing.len()
            || self
                .properties
                .iter()
                .zip(existing.iter())
                .any(|(a, b)| a != b)
    }
}

/// Merge existing properties with a rendered template
pub fn merge(existing: &Properties, rendered: &TemplateRenderResult) -> MergeResult {
    let mut properties = existing.clone();
    let mut list_keys = IndexSet::new();

    for key in &rendered.declared_keys {
        let Some(declared) = rendered.values.get(key) else {
            continue;
        };

        match (properties.get(key), declared) {
            (None, value) => {
                if value.is_list() {
                    list_keys.insert(key.clone());
                }
                properties.insert(key.clone(), value.clone());
            }
            (Some(current), PropertyValue::List(template_items)) => {
                let mut items = current.items();
                for item in template_items {
                    if !items.contains(item) {
                        items.push(item.clone());
                    }
                }
                list_keys.insert(key.clone());
                properties.insert(key.clone(), PropertyValue::List(items));
            }
            (Some(_), PropertyValue::Scalar(_)) => {}
        }
    }

    for (key, value) in existing {
        if value.as_list().is_some_and(|items| items.len() > 1) {
            list_keys.insert(key.clone());
        }
    }

    MergeResult {
        properties,
        list_keys,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::decode;
    use crate::template::render;
    use composer_core::TemplateContext;

    fn rendered(template: &str, title: &str) -> TemplateRenderResult {
        render(template, &TemplateContext::new(title, "2024-05-01"))
    }

    #[test]
    fn test_list_union_preserves_order_and_dedups() {
        let existing = decode("---\ntags: [a, b]\n---\n").properties;
        let template = rendered("---\ntags: [b, c]\n---\n", "x");
        let merged = merge(&existing, &template);
        assert_eq!(merged.properties["tags"], PropertyValue::list(["a", "b", "c"]));
        assert!(merged.list_keys.contains("tags"));
    }

    #[test]
    fn test_existing_scalar_wins() {
        let existing = decode("---\ntitle: \"My Custom Title\"\n---\n").properties;
        let template = rendered("---\ntitle: \"{{title}}\"\n---\n", "Generated Title");
        let merged = merge(&existing, &template);
        assert_eq!(
            merged.properties["title"],
            PropertyValue::scalar("\"My Custom Title\"")
        );
    }

    #[test]
    fn test_template_keys_appended_after_existing() {
        let existing = decode("---\ncustom: 1\ntitle: Mine\n---\n").properties;
        let template = rendered(
            "---\ntitle: \"{{title}}\"\npubDate: {{date}}\ntags: []\n---\n",
            "T",
        );
        let merged = merge(&existing, &template);
        let keys: Vec<_> = merged.properties.keys().cloned().collect();
        assert_eq!(keys, vec!["custom", "title", "pubDate", "tags"]);
        assert_eq!(merged.properties["pubDate"], PropertyValue::scalar("2024-05-01"));
        assert!(merged.list_keys.contains("tags"));
    }

    #[test]
    fn test_existing_scalar_becomes_list_when_template_declares_list() {
        let existing = decode("---\ntags: solo\n---\n").properties;
        let template = rendered("---\ntags: [blog]\n---\n", "T");
        let merged = merge(&existing, &template);
        assert_eq!(merged.properties["tags"], PropertyValue::list(["solo", "blog"]));
    }

    #[test]
    fn test_undeclared_multi_value_lists_are_marked() {
        let existing = decode("---\naliases:\n  - a\n  - b\nsingle:\n  - x\n---\n").properties;
        let merged = merge(&existing, &rendered("---\ntitle: x\n---\n", "T"));
        assert!(merged.list_keys.contains("aliases"));
        assert!(!merged.list_keys.contains("single"));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let existing = decode("---\ntitle: Mine\ntags: [a]\n---\n").properties;
        let template = rendered(
            "---\ntitle: \"{{title}}\"\ndescription: \"\"\ntags: [a, b]\n---\n",
            "T",
        );
        let once = merge(&existing, &template);
        let twice = merge(&once.properties, &template);
        assert_eq!(once.properties, twice.properties);
        assert!(!twice.differs_from(&once.properties));
        assert!(once.differs_from(&existing));
    }
}
