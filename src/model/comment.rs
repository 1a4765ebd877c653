use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{generate_id, Id, ParentRef};

/// A comment, optionally attached to a product or an article.
///
/// The parent is serialized as a `productId` or `articleId` field, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Id,
    pub content: String,
    #[serde(flatten)]
    pub parent: Option<ParentRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(new_comment: NewComment) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            content: new_comment.content,
            parent: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn belongs_to(&self, parent: &ParentRef) -> bool {
        self.parent.as_ref() == Some(parent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewComment {
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentPatch {
    pub content: Option<String>,
}

impl CommentPatch {
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }

    pub fn apply_to(self, comment: &mut Comment) {
        if let Some(content) = self.content {
            comment.content = content;
        }
    }
}

/// Comment as embedded in a product or article detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSummary {
    pub id: Id,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Comment> for CommentSummary {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.clone(),
            content: comment.content.clone(),
            created_at: comment.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(content: &str) -> Comment {
        Comment::new(NewComment {
            content: content.to_string(),
        })
    }

    #[test]
    fn test_unattached_comment_has_no_parent_field() {
        let json = serde_json::to_value(comment("nice!")).unwrap();
        assert!(json.get("productId").is_none());
        assert!(json.get("articleId").is_none());
        assert_eq!(json["content"], serde_json::json!("nice!"));
    }

    #[test]
    fn test_attached_comment_exposes_exactly_one_parent_field() {
        let mut c = comment("nice!");
        c.parent = Some(ParentRef::Product("p1".to_string()));

        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["productId"], serde_json::json!("p1"));
        assert!(json.get("articleId").is_none());
        assert!(c.belongs_to(&ParentRef::Product("p1".to_string())));
        assert!(!c.belongs_to(&ParentRef::Article("p1".to_string())));
    }

    #[test]
    fn test_patch_replaces_content() {
        let mut c = comment("first");
        CommentPatch {
            content: Some("second".to_string()),
        }
        .apply_to(&mut c);
        assert_eq!(c.content, "second");
    }
}
