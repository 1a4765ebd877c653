use serde::de::DeserializeOwned;

use crate::logic::shape::{FieldRule, Shape};
use crate::model::{ArticlePatch, CommentPatch, NewArticle, NewComment, NewProduct, ProductPatch};

pub fn create_product() -> Shape {
    Shape::new(
        "CreateProduct",
        vec![
            FieldRule::text("name", 1, 20),
            FieldRule::text("description", 10, 100),
            FieldRule::integer("price", 1),
            FieldRule::text_list("tags", 1, 1, 5),
        ],
    )
}

pub fn patch_product() -> Shape {
    create_product().partial("PatchProduct")
}

pub fn create_article() -> Shape {
    Shape::new(
        "CreateArticle",
        vec![
            FieldRule::text("title", 1, 30),
            FieldRule::text("content", 10, 500),
        ],
    )
}

pub fn patch_article() -> Shape {
    create_article().partial("PatchArticle")
}

pub fn create_comment() -> Shape {
    Shape::new("CreateComment", vec![FieldRule::text("content", 1, 200)])
}

pub fn patch_comment() -> Shape {
    create_comment().partial("PatchComment")
}

/// A request body type guarded by a shape
pub trait Payload: DeserializeOwned {
    fn shape() -> Shape;
}

impl Payload for NewProduct {
    fn shape() -> Shape {
        create_product()
    }
}

impl Payload for ProductPatch {
    fn shape() -> Shape {
        patch_product()
    }
}

impl Payload for NewArticle {
    fn shape() -> Shape {
        create_article()
    }
}

impl Payload for ArticlePatch {
    fn shape() -> Shape {
        patch_article()
    }
}

impl Payload for NewComment {
    fn shape() -> Shape {
        create_comment()
    }
}

impl Payload for CommentPatch {
    fn shape() -> Shape {
        patch_comment()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::shape::Violation;
    use serde_json::json;

    #[test]
    fn test_create_product_rejects_short_description() {
        let err = create_product()
            .validate(&json!({
                "name": "A",
                "description": "short",
                "price": 5,
                "tags": ["x"]
            }))
            .unwrap_err();
        assert_eq!(err.field, "description");
        assert_eq!(err.violation, Violation::TooShort { min: 10, actual: 5 });
    }

    #[test]
    fn test_create_product_accepts_valid_payload() {
        let payload = json!({
            "name": "Chair",
            "description": "A sturdy chair",
            "price": 50,
            "tags": ["wood"]
        });
        assert!(create_product().validate(&payload).is_ok());
        let product: NewProduct = serde_json::from_value(payload).unwrap();
        assert_eq!(product.price, 50);
    }

    #[test]
    fn test_product_tag_length_bounds() {
        let err = patch_product()
            .validate(&json!({ "tags": ["wood", "walnut"] }))
            .unwrap_err();
        assert_eq!(err.field, "tags[1]");

        let err = patch_product().validate(&json!({ "tags": [""] })).unwrap_err();
        assert_eq!(err.violation, Violation::TooShort { min: 1, actual: 0 });
    }

    #[test]
    fn test_patch_shapes_accept_empty_object() {
        for shape in [patch_product(), patch_article(), patch_comment()] {
            assert!(shape.validate(&json!({})).is_ok(), "{}", shape.name);
        }
    }

    #[test]
    fn test_create_shapes_reject_empty_object() {
        for shape in [create_product(), create_article(), create_comment()] {
            let err = shape.validate(&json!({})).unwrap_err();
            assert_eq!(err.violation, Violation::Missing, "{}", shape.name);
        }
    }

    #[test]
    fn test_article_bounds() {
        let shape = create_article();
        assert!(shape
            .validate(&json!({ "title": "t", "content": "0123456789" }))
            .is_ok());
        let long_title = "x".repeat(31);
        let err = shape
            .validate(&json!({ "title": long_title, "content": "0123456789" }))
            .unwrap_err();
        assert_eq!(err.violation, Violation::TooLong { max: 30, actual: 31 });
    }

    #[test]
    fn test_comment_bounds() {
        let shape = create_comment();
        assert!(shape.validate(&json!({ "content": "nice!" })).is_ok());
        assert!(shape.validate(&json!({ "content": "" })).is_err());
        assert!(shape
            .validate(&json!({ "content": "x".repeat(201) }))
            .is_err());
    }

    #[test]
    fn test_payload_shapes_match_named_shapes() {
        assert_eq!(<NewProduct as Payload>::shape().name, "CreateProduct");
        assert_eq!(<ProductPatch as Payload>::shape().name, "PatchProduct");
        assert_eq!(<CommentPatch as Payload>::shape().name, "PatchComment");
    }
}
