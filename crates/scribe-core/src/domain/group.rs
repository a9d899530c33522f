use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_SLUG_LEN: usize = 100;

/// Group entity - a slug-identified category posts may belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
}

impl Group {
    /// Create a group after checking the title and slug.
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        let slug = slug.into();

        if title.trim().is_empty() || title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::Validation(format!(
                "group title must be 1-{MAX_TITLE_LEN} characters"
            )));
        }
        if !is_valid_slug(&slug) {
            return Err(DomainError::Validation(format!("invalid group slug: {slug:?}")));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            title,
            slug,
            description: description.filter(|d| !d.trim().is_empty()),
        })
    }
}

/// Slugs are ASCII letters, digits, hyphens and underscores.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_rules() {
        assert!(is_valid_slug("cats"));
        assert!(is_valid_slug("big-cats_2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug("кошки"));
        assert!(!is_valid_slug(&"a".repeat(MAX_SLUG_LEN + 1)));
    }

    #[test]
    fn test_new_group_rejects_bad_input() {
        assert!(Group::new("Cats", "cats", None).is_ok());
        assert!(matches!(
            Group::new("", "cats", None),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            Group::new("Cats", "c a t s", None),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_blank_description_is_dropped() {
        let group = Group::new("Cats", "cats", Some("  ".into())).unwrap();
        assert_eq!(group.description, None);
    }
}
