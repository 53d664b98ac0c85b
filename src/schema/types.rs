//! Schema type definitions
//!
//! Supported types:
//! - string: UTF-8 string, optionally constrained by an enumeration or a pattern
//! - int: 64-bit signed integer
//! - number: any JSON number
//! - bool: Boolean
//! - date: RFC 3339 timestamp string
//! - decimal: decimal string or JSON number
//! - object: nested object with its own field schema
//! - array: homogeneous array with an element definition
//! - map: object with free-form keys and homogeneous values

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Field types understood by the validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    String,
    Int,
    Number,
    Bool,
    Date,
    Decimal,
    /// Nested object with its own field schema
    Object {
        fields: BTreeMap<String, FieldDef>,
    },
    /// Homogeneous array; the element's `required` flag is ignored
    Array {
        items: Box<FieldDef>,
    },
    /// Free-form keys, every value matching `values`
    Map {
        values: Box<FieldDef>,
    },
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Number => "number",
            FieldType::Bool => "bool",
            FieldType::Date => "date",
            FieldType::Decimal => "decimal",
            FieldType::Object { .. } => "object",
            FieldType::Array { .. } => "array",
            FieldType::Map { .. } => "map",
        }
    }

    /// Array whose elements match `items`
    pub fn array_of(items: FieldDef) -> Self {
        FieldType::Array {
            items: Box::new(items),
        }
    }

    /// Map whose values match `values`
    pub fn map_of(values: FieldDef) -> Self {
        FieldType::Map {
            values: Box::new(values),
        }
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field data type
    #[serde(flatten)]
    pub field_type: FieldType,
    /// Whether field must be present
    #[serde(default)]
    pub required: bool,
    /// Allowed values for string fields
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
    /// Regular expression string fields must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl FieldDef {
    /// Create a required field of the given type
    pub fn required(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: true,
            allowed: None,
            pattern: None,
        }
    }

    /// Create an optional field of the given type
    pub fn optional(field_type: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(field_type)
        }
    }

    pub fn required_string() -> Self {
        Self::required(FieldType::String)
    }

    pub fn optional_string() -> Self {
        Self::optional(FieldType::String)
    }

    pub fn required_int() -> Self {
        Self::required(FieldType::Int)
    }

    pub fn optional_int() -> Self {
        Self::optional(FieldType::Int)
    }

    pub fn required_bool() -> Self {
        Self::required(FieldType::Bool)
    }

    pub fn optional_bool() -> Self {
        Self::optional(FieldType::Bool)
    }

    pub fn required_number() -> Self {
        Self::required(FieldType::Number)
    }

    pub fn required_date() -> Self {
        Self::required(FieldType::Date)
    }

    pub fn optional_date() -> Self {
        Self::optional(FieldType::Date)
    }

    pub fn required_decimal() -> Self {
        Self::required(FieldType::Decimal)
    }

    pub fn optional_decimal() -> Self {
        Self::optional(FieldType::Decimal)
    }

    /// Create a required string field restricted to `values`
    pub fn required_enum(values: &[&str]) -> Self {
        Self::required_string().with_enum(values)
    }

    /// Create an optional string field restricted to `values`
    pub fn optional_enum(values: &[&str]) -> Self {
        Self::optional_string().with_enum(values)
    }

    pub fn required_object(fields: BTreeMap<String, FieldDef>) -> Self {
        Self::required(FieldType::Object { fields })
    }

    pub fn optional_object(fields: BTreeMap<String, FieldDef>) -> Self {
        Self::optional(FieldType::Object { fields })
    }

    pub fn required_array(items: FieldDef) -> Self {
        Self::required(FieldType::array_of(items))
    }

    pub fn optional_array(items: FieldDef) -> Self {
        Self::optional(FieldType::array_of(items))
    }

    /// Restrict the allowed values
    pub fn with_enum(mut self, values: &[&str]) -> Self {
        self.allowed = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    /// Require the value to match a regular expression
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Checks the definition itself, recursing into nested shapes.
    fn validate_structure(&self, path: &str) -> Result<(), String> {
        if self.allowed.is_some() || self.pattern.is_some() {
            if self.field_type != FieldType::String {
                return Err(format!(
                    "'{}': enum and pattern constraints require a string field, found {}",
                    path,
                    self.field_type.type_name()
                ));
            }
        }

        if let Some(allowed) = &self.allowed {
            if allowed.is_empty() {
                return Err(format!("'{}': enum must list at least one value", path));
            }
        }

        if let Some(pattern) = &self.pattern {
            Regex::new(pattern).map_err(|e| format!("'{}': invalid pattern: {}", path, e))?;
        }

        match &self.field_type {
            FieldType::Object { fields } => {
                for (name, def) in fields {
                    def.validate_structure(&format!("{}.{}", path, name))?;
                }
            }
            FieldType::Array { items } => items.validate_structure(&format!("{}[]", path))?,
            FieldType::Map { values } => values.validate_structure(&format!("{}{{}}", path))?,
            _ => {}
        }

        Ok(())
    }
}

/// Complete schema definition for one entity type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Entity type (collection name) this schema governs
    pub entity_type: String,
    /// Schema version
    pub schema_version: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Field definitions
    pub fields: BTreeMap<String, FieldDef>,
}

impl Schema {
    /// Create a new schema
    pub fn new(
        entity_type: impl Into<String>,
        schema_version: impl Into<String>,
        fields: BTreeMap<String, FieldDef>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            schema_version: schema_version.into(),
            description: None,
            fields,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Names of all required top-level fields
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, def)| def.required)
            .map(|(name, _)| name.as_str())
    }

    /// Validates the schema structure itself (not a document)
    pub fn validate_structure(&self) -> Result<(), String> {
        if self.entity_type.is_empty() {
            return Err("Schema must name its entity type".into());
        }

        match self.fields.get("_id") {
            None => return Err("Schema must define an '_id' field".into()),
            Some(id_field) => {
                if !id_field.required {
                    return Err("'_id' field must be required".into());
                }
                if id_field.field_type != FieldType::String {
                    return Err("'_id' field must be a string".into());
                }
            }
        }

        for (name, def) in &self.fields {
            def.validate_structure(name)?;
        }

        Ok(())
    }
}
