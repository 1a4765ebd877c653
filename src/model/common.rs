use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type Id = String;

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

/// The kinds of persisted entities, used for error messages and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Product,
    Article,
    Comment,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            EntityKind::Product => write!(f, "product"),
            EntityKind::Article => write!(f, "article"),
            EntityKind::Comment => write!(f, "comment"),
        }
    }
}

/// Owner of a comment. A comment belongs to at most one parent at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParentRef {
    #[serde(rename = "productId")]
    Product(Id),
    #[serde(rename = "articleId")]
    Article(Id),
}

impl ParentRef {
    pub fn id(&self) -> &Id {
        match self {
            ParentRef::Product(id) | ParentRef::Article(id) => id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            ParentRef::Product(_) => EntityKind::Product,
            ParentRef::Article(_) => EntityKind::Article,
        }
    }
}

impl std::fmt::Display for ParentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.id())
    }
}
