//! Checks parsed provider output against the same [`ResponseSchema`] that constrained it.

use serde_json::Value;
use thiserror::Error;

use crate::api_connection::endpoints::{ResponseSchema, SchemaType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {reason}")]
pub struct SchemaViolation {
    pub path: String,
    pub reason: String,
}

impl SchemaViolation {
    fn new(path: &str, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl ResponseSchema {
    /// Validates `value`, reporting the first violation found. Required string
    /// properties count as missing when blank.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        self.validate_at("$", value)
    }

    fn validate_at(&self, path: &str, value: &Value) -> Result<(), SchemaViolation> {
        let type_matches = match self.schema_type {
            SchemaType::String => value.is_string(),
            SchemaType::Number => value.is_number(),
            SchemaType::Integer => value.is_i64() || value.is_u64(),
            SchemaType::Boolean => value.is_boolean(),
            SchemaType::Array => value.is_array(),
            SchemaType::Object => value.is_object(),
        };
        if !type_matches {
            return Err(SchemaViolation::new(
                path,
                format!("expected {:?}, found {}", self.schema_type, type_name(value)),
            ));
        }

        if let (Some(allowed), Some(text)) = (&self.r#enum, value.as_str()) {
            if !allowed.iter().any(|candidate| candidate == text) {
                return Err(SchemaViolation::new(
                    path,
                    format!("'{text}' is not one of {allowed:?}"),
                ));
            }
        }

        if let Some(items) = value.as_array() {
            if let Some(min) = self.min_items {
                if items.len() < min as usize {
                    return Err(SchemaViolation::new(
                        path,
                        format!("expected at least {min} item(s), found {}", items.len()),
                    ));
                }
            }
            if let Some(item_schema) = &self.items {
                for (idx, item) in items.iter().enumerate() {
                    item_schema.validate_at(&format!("{path}[{idx}]"), item)?;
                }
            }
        }

        if let Some(object) = value.as_object() {
            for name in self.required.iter().flatten() {
                let present = match object.get(name) {
                    None | Some(Value::Null) => false,
                    Some(Value::String(text)) => !text.trim().is_empty(),
                    Some(_) => true,
                };
                if !present {
                    return Err(SchemaViolation::new(
                        &format!("{path}.{name}"),
                        "required field is missing or empty",
                    ));
                }
            }
            if let Some(properties) = &self.properties {
                for (name, property_schema) in properties {
                    if let Some(field) = object.get(name) {
                        property_schema.validate_at(&format!("{path}.{name}"), field)?;
                    }
                }
            }
        }

        Ok(())
    }
}
