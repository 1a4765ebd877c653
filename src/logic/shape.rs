//! Declarative payload shapes.
//!
//! A [`Shape`] lists the fields a JSON body may carry together with their
//! constraints. Create shapes mark every field required; patch shapes are
//! derived with [`Shape::partial`] and keep every other constraint as is.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// A string whose length (in characters) lies in `min_len..=max_len`
    Text { min_len: usize, max_len: usize },
    /// A JSON integer no smaller than `min`
    Integer { min: i64 },
    /// An array of at least `min_items` strings, each checked like `Text`
    TextList {
        min_items: usize,
        item_min_len: usize,
        item_max_len: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldRule {
    pub const fn text(name: &'static str, min_len: usize, max_len: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Text { min_len, max_len },
            required: true,
        }
    }

    pub const fn integer(name: &'static str, min: i64) -> Self {
        Self {
            name,
            kind: FieldKind::Integer { min },
            required: true,
        }
    }

    pub const fn text_list(
        name: &'static str,
        min_items: usize,
        item_min_len: usize,
        item_max_len: usize,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::TextList {
                min_items,
                item_min_len,
                item_max_len,
            },
            required: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shape {
    pub name: &'static str,
    pub fields: Vec<FieldRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("expected a JSON object")]
    NotAnObject,
    #[error("is required")]
    Missing,
    #[error("is not a known field")]
    Unknown,
    #[error("expected {expected}")]
    WrongType { expected: &'static str },
    #[error("must be at least {min} characters long (got {actual})")]
    TooShort { min: usize, actual: usize },
    #[error("must be at most {max} characters long (got {actual})")]
    TooLong { max: usize, actual: usize },
    #[error("must be at least {min} (got {actual})")]
    BelowMinimum { min: i64, actual: i64 },
    #[error("must contain at least {min} item(s) (got {actual})")]
    TooFewItems { min: usize, actual: usize },
}

/// A payload that does not fit its shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{shape}: `{field}` {violation}")]
pub struct ValidationError {
    pub shape: &'static str,
    pub field: String,
    pub violation: Violation,
}

impl Shape {
    pub fn new(name: &'static str, fields: Vec<FieldRule>) -> Self {
        Self { name, fields }
    }

    /// Derive a shape where every field is optional
    pub fn partial(&self, name: &'static str) -> Self {
        Self {
            name,
            fields: self
                .fields
                .iter()
                .map(|rule| FieldRule {
                    required: false,
                    ..*rule
                })
                .collect(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|rule| rule.name == name)
    }

    /// Rewrite integral floats such as `50.0` in integer fields as plain
    /// integers so they deserialize into `i64`
    pub fn normalize(&self, value: &mut Value) {
        let Some(object) = value.as_object_mut() else {
            return;
        };
        for rule in &self.fields {
            if !matches!(rule.kind, FieldKind::Integer { .. }) {
                continue;
            }
            if let Some(field_value) = object.get_mut(rule.name) {
                if field_value.is_f64() {
                    if let Some(number) = as_integer(field_value) {
                        *field_value = Value::from(number);
                    }
                }
            }
        }
    }

    /// Check `value` against the shape, stopping at the first violation
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(object) = value.as_object() else {
            return Err(self.error("(body)", Violation::NotAnObject));
        };

        if let Some(unknown) = object.keys().find(|key| self.field(key).is_none()) {
            return Err(self.error(unknown, Violation::Unknown));
        }

        for rule in &self.fields {
            match object.get(rule.name) {
                Some(field_value) => self.check(rule, field_value)?,
                None if rule.required => return Err(self.error(rule.name, Violation::Missing)),
                None => {}
            }
        }

        Ok(())
    }

    fn check(&self, rule: &FieldRule, value: &Value) -> Result<(), ValidationError> {
        match rule.kind {
            FieldKind::Text { min_len, max_len } => {
                let Some(text) = value.as_str() else {
                    return Err(self.error(rule.name, Violation::WrongType { expected: "a string" }));
                };
                check_length(text, min_len, max_len).map_err(|v| self.error(rule.name, v))
            }
            FieldKind::Integer { min } => {
                let Some(number) = as_integer(value) else {
                    return Err(self.error(
                        rule.name,
                        Violation::WrongType {
                            expected: "an integer",
                        },
                    ));
                };
                if number < min {
                    return Err(self.error(
                        rule.name,
                        Violation::BelowMinimum {
                            min,
                            actual: number,
                        },
                    ));
                }
                Ok(())
            }
            FieldKind::TextList {
                min_items,
                item_min_len,
                item_max_len,
            } => {
                let Some(items) = value.as_array() else {
                    return Err(self.error(
                        rule.name,
                        Violation::WrongType {
                            expected: "an array of strings",
                        },
                    ));
                };
                if items.len() < min_items {
                    return Err(self.error(
                        rule.name,
                        Violation::TooFewItems {
                            min: min_items,
                            actual: items.len(),
                        },
                    ));
                }
                for (index, item) in items.iter().enumerate() {
                    let field = format!("{}[{}]", rule.name, index);
                    let Some(text) = item.as_str() else {
                        return Err(self.error(&field, Violation::WrongType { expected: "a string" }));
                    };
                    check_length(text, item_min_len, item_max_len)
                        .map_err(|v| self.error(&field, v))?;
                }
                Ok(())
            }
        }
    }

    fn error(&self, field: &str, violation: Violation) -> ValidationError {
        ValidationError {
            shape: self.name,
            field: field.to_string(),
            violation,
        }
    }
}

/// A JSON number with no fractional part that fits in `i64`
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(number) = value.as_i64() {
        return Some(number);
    }
    let float = value.as_f64()?;
    // i64::MAX as f64 rounds up to 2^63
    if float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64 {
        Some(float as i64)
    } else {
        None
    }
}

fn check_length(text: &str, min: usize, max: usize) -> Result<(), Violation> {
    let actual = text.chars().count();
    if actual < min {
        Err(Violation::TooShort { min, actual })
    } else if actual > max {
        Err(Violation::TooLong { max, actual })
    } else {
        Ok(())
    }
}
