//! Document validation against registered schemas
//!
//! A document passes when:
//! - it is a JSON object
//! - every required field is present
//! - no undeclared field exists
//! - every value has the declared semantic type
//! - enumerated and patterned strings hold an allowed value
//!
//! Null values are rejected everywhere. Nothing is coerced or defaulted.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::DateTime;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::errors::{SchemaError, SchemaResult, Violation};
use super::registry::SchemaRegistry;
use super::types::{FieldDef, FieldType};

/// Validator borrowing a registry.
///
/// Validation never mutates the document and always reports the first
/// violation in field-name order.
pub struct SchemaValidator<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Validates a document against the schema for `entity_type`.
    ///
    /// # Errors
    ///
    /// - `TICKETING_UNKNOWN_ENTITY_TYPE` if no schema is registered
    /// - `TICKETING_SCHEMA_VIOLATION` if the document does not conform
    pub fn validate_document(&self, entity_type: &str, document: &Value) -> SchemaResult<()> {
        let schema = self.registry.require(entity_type)?;

        let obj = document.as_object().ok_or_else(|| {
            SchemaError::violation(
                entity_type,
                Violation::type_mismatch("$root", "object", json_type_name(document)),
            )
        })?;

        self.validate_object(obj, &schema.fields, "")
            .map_err(|v| SchemaError::violation(entity_type, v))
    }

    /// Validates an updated document, checking `_id` immutability first.
    pub fn validate_update(
        &self,
        entity_type: &str,
        existing_id: &str,
        document: &Value,
    ) -> SchemaResult<()> {
        if let Some(new_id) = document.get("_id").and_then(Value::as_str) {
            if new_id != existing_id {
                return Err(SchemaError::violation(
                    entity_type,
                    Violation::new(
                        "_id",
                        format!(
                            "immutable value '{}', attempted change to '{}'",
                            existing_id, new_id
                        ),
                    ),
                ));
            }
        }

        self.validate_document(entity_type, document)
    }

    fn validate_object(
        &self,
        obj: &Map<String, Value>,
        fields: &BTreeMap<String, FieldDef>,
        prefix: &str,
    ) -> Result<(), Violation> {
        for key in obj.keys() {
            if !fields.contains_key(key) {
                return Err(Violation::undeclared_field(make_path(prefix, key)));
            }
        }

        for (name, def) in fields {
            let path = make_path(prefix, name);
            match obj.get(name) {
                Some(value) => self.validate_value(value, def, &path)?,
                None if def.required => return Err(Violation::missing_field(path)),
                None => {}
            }
        }

        Ok(())
    }

    fn validate_value(&self, value: &Value, def: &FieldDef, path: &str) -> Result<(), Violation> {
        if value.is_null() {
            return Err(Violation::null_value(path));
        }

        match &def.field_type {
            FieldType::String => {
                let s = value
                    .as_str()
                    .ok_or_else(|| type_error(path, "string", value))?;
                self.check_string_constraints(s, def, path)?;
            }
            FieldType::Int => {
                if !value.is_i64() && !value.is_u64() {
                    return Err(type_error(path, "int", value));
                }
            }
            FieldType::Number => {
                if !value.is_number() {
                    return Err(type_error(path, "number", value));
                }
            }
            FieldType::Bool => {
                if !value.is_boolean() {
                    return Err(type_error(path, "bool", value));
                }
            }
            FieldType::Date => {
                let s = value.as_str().ok_or_else(|| type_error(path, "date", value))?;
                if DateTime::parse_from_rfc3339(s).is_err() {
                    return Err(Violation::new(
                        path,
                        format!("'{}' is not an RFC 3339 timestamp", s),
                    ));
                }
            }
            FieldType::Decimal => {
                if !is_decimal(value) {
                    return Err(type_error(path, "decimal", value));
                }
            }
            FieldType::Object { fields } => {
                let obj = value
                    .as_object()
                    .ok_or_else(|| type_error(path, "object", value))?;
                self.validate_object(obj, fields, path)?;
            }
            FieldType::Array { items } => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| type_error(path, "array", value))?;
                for (i, elem) in arr.iter().enumerate() {
                    self.validate_value(elem, items, &format!("{}[{}]", path, i))?;
                }
            }
            FieldType::Map { values } => {
                let obj = value
                    .as_object()
                    .ok_or_else(|| type_error(path, "map", value))?;
                for (key, elem) in obj {
                    self.validate_value(elem, values, &make_path(path, key))?;
                }
            }
        }

        Ok(())
    }

    fn check_string_constraints(&self, s: &str, def: &FieldDef, path: &str) -> Result<(), Violation> {
        if let Some(allowed) = &def.allowed {
            if !allowed.iter().any(|a| a == s) {
                return Err(Violation::not_in_enum(path, s, allowed));
            }
        }

        if let Some(pattern) = &def.pattern {
            // Registered schemas always have their patterns compiled
            let matches = match self.registry.pattern(pattern) {
                Some(regex) => regex.is_match(s),
                None => false,
            };
            if !matches {
                return Err(Violation::pattern_mismatch(path, pattern));
            }
        }

        Ok(())
    }
}

fn is_decimal(value: &Value) -> bool {
    match value {
        Value::String(s) => Decimal::from_str(s).is_ok(),
        Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().map_or(false, f64::is_finite),
        _ => false,
    }
}

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

fn type_error(path: &str, expected: &str, actual: &Value) -> Violation {
    Violation::type_mismatch(path, expected, json_type_name(actual))
}
