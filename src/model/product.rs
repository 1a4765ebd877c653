use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{generate_id, CommentSummary, Id};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Id,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub tags: Vec<String>,
    pub favorite_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(new_product: NewProduct) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            name: new_product.name,
            description: new_product.description,
            price: new_product.price,
            tags: new_product.tags,
            favorite_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated body of `POST /products`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub tags: Vec<String>,
}

/// Validated body of `PATCH /products/:id`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub tags: Option<Vec<String>>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.tags.is_none()
    }

    /// Merge the provided fields into `product`
    pub fn apply_to(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(tags) = self.tags {
            product.tags = tags;
        }
    }
}

/// Row shape returned by product listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: Id,
    pub name: String,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            created_at: product.created_at,
        }
    }
}

/// A product together with the comments attached to it, newest first
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub comments: Vec<CommentSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chair() -> Product {
        Product::new(NewProduct {
            name: "Chair".to_string(),
            description: "A sturdy chair".to_string(),
            price: 50,
            tags: vec!["wood".to_string()],
        })
    }

    #[test]
    fn test_new_product_starts_without_favorites() {
        let product = chair();
        assert_eq!(product.favorite_count, 0);
        assert_eq!(product.created_at, product.updated_at);
    }

    #[test]
    fn test_patch_only_touches_provided_fields() {
        let mut product = chair();
        let before = product.clone();

        ProductPatch {
            price: Some(75),
            ..Default::default()
        }
        .apply_to(&mut product);

        assert_eq!(product.price, 75);
        assert_eq!(product.name, before.name);
        assert_eq!(product.description, before.description);
        assert_eq!(product.tags, before.tags);
    }

    #[test]
    fn test_empty_patch_is_a_no_op() {
        let mut product = chair();
        let before = product.clone();
        let patch = ProductPatch::default();
        assert!(patch.is_empty());
        patch.apply_to(&mut product);
        assert_eq!(product, before);
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let result = serde_json::from_value::<ProductPatch>(serde_json::json!({
            "name": "Stool",
            "favoriteCount": 99
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_product_serializes_camel_case() {
        let json = serde_json::to_value(chair()).unwrap();
        assert!(json.get("favoriteCount").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("favorite_count").is_none());
    }
}
