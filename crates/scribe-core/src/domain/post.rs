use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Group;
use crate::error::DomainError;

/// Post entity - an authored text record, optionally grouped and illustrated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub text: String,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    /// Path relative to the media root, e.g. `posts/<id>.png`.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(author_id: Uuid, text: String, group_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            author_id,
            group_id,
            image: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    /// Fails with `Forbidden` unless `user_id` wrote this post.
    pub fn ensure_author(&self, user_id: Uuid) -> Result<(), DomainError> {
        if self.author_id == user_id {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }

    /// Apply an edit. Author and creation time stay as they were; the image is
    /// only replaced when a new one is given.
    pub fn edit(&mut self, text: String, group_id: Option<Uuid>, image: Option<String>) {
        self.text = text;
        self.group_id = group_id;
        if image.is_some() {
            self.image = image;
        }
    }
}

/// A post with the data its listings render alongside it.
#[derive(Debug, Clone)]
pub struct PostView {
    pub post: Post,
    pub author: String,
    pub group: Option<Group>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_author() {
        let author = Uuid::new_v4();
        let post = Post::new(author, "text".into(), None);

        assert!(post.ensure_author(author).is_ok());
        assert!(matches!(
            post.ensure_author(Uuid::new_v4()),
            Err(DomainError::Forbidden)
        ));
    }

    #[test]
    fn test_edit_keeps_author_and_image() {
        let author = Uuid::new_v4();
        let mut post = Post::new(author, "old".into(), None).with_image(Some("posts/a.png".into()));
        let created_at = post.created_at;

        let group = Uuid::new_v4();
        post.edit("new".into(), Some(group), None);

        assert_eq!(post.text, "new");
        assert_eq!(post.group_id, Some(group));
        assert_eq!(post.image.as_deref(), Some("posts/a.png"));
        assert_eq!(post.author_id, author);
        assert_eq!(post.created_at, created_at);

        post.edit("newer".into(), None, Some("posts/b.gif".into()));
        assert_eq!(post.image.as_deref(), Some("posts/b.gif"));
        assert_eq!(post.group_id, None);
    }
}
