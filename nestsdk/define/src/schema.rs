//! The subset of JSON Schema inspected during generation.
//!
//! The generator only needs to know whether a schema is a direct reference
//! to a named model, or which primitive type a parameter carries. Everything
//! else in a schema object is accepted and ignored.

use serde::{Deserialize, Serialize};

/// A JSON Schema object, reduced to the fields the generator reads.
///
/// ## Examples
///
/// A direct reference:
///
/// ```
/// use nestsdk_define::Schema;
///
/// let schema: Schema = serde_json::from_str(
///     r##"{ "$ref": "#/components/schemas/ApplicationDto" }"##
/// ).unwrap();
/// assert_eq!(schema.reference(), Some("#/components/schemas/ApplicationDto"));
/// ```
///
/// A primitive:
///
/// ```
/// use nestsdk_define::{PrimitiveType, Schema};
///
/// let schema: Schema = serde_json::from_str(r#"{ "type": "integer" }"#).unwrap();
/// assert_eq!(schema.primitive(), PrimitiveType::Number);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Reference to a named schema (e.g. `#/components/schemas/UserDto`).
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Declared JSON type. OpenAPI 3.1 allows a list of types.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaKind>,

    /// Item schema for arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    /// Allowed values, when the schema is an enumeration.
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enumeration: Vec<serde_json::Value>,
}

/// The `type` keyword of a schema: a single type name or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaKind {
    Single(String),
    Multiple(Vec<String>),
}

impl SchemaKind {
    /// Returns the first type name that is not `null`.
    pub fn primary(&self) -> Option<&str> {
        match self {
            SchemaKind::Single(name) => Some(name.as_str()),
            SchemaKind::Multiple(names) => names
                .iter()
                .map(String::as_str)
                .find(|name| *name != "null"),
        }
    }
}

/// Primitive classification of a schema, as used for parameter typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveType {
    /// `string`
    String,
    /// `integer` or `number`
    Number,
    /// `boolean`
    Boolean,
    /// `array` with the primitive type of its items
    Array(Box<PrimitiveType>),
    /// Objects, references and anything undeclared
    Unknown,
}

impl Schema {
    /// Creates a schema holding only a type name.
    pub fn of_type(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(SchemaKind::Single(kind.into())),
            ..Self::default()
        }
    }

    /// Returns the reference string when this schema is a direct `$ref`.
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// Returns the allowed values when every one of them is a string.
    ///
    /// ## Examples
    ///
    /// ```
    /// use nestsdk_define::Schema;
    ///
    /// let schema: Schema = serde_json::from_str(
    ///     r#"{ "type": "string", "enum": ["asc", "desc"] }"#
    /// ).unwrap();
    /// assert_eq!(schema.string_enum(), Some(vec!["asc", "desc"]));
    /// ```
    pub fn string_enum(&self) -> Option<Vec<&str>> {
        if self.enumeration.is_empty() {
            return None;
        }
        self.enumeration.iter().map(|value| value.as_str()).collect()
    }

    /// Classifies the schema into a [`PrimitiveType`].
    ///
    /// ## Examples
    ///
    /// ```
    /// use nestsdk_define::{PrimitiveType, Schema};
    ///
    /// let mut schema = Schema::of_type("array");
    /// schema.items = Some(Box::new(Schema::of_type("string")));
    /// assert_eq!(
    ///     schema.primitive(),
    ///     PrimitiveType::Array(Box::new(PrimitiveType::String))
    /// );
    /// ```
    pub fn primitive(&self) -> PrimitiveType {
        match self.kind.as_ref().and_then(SchemaKind::primary) {
            Some("string") => PrimitiveType::String,
            Some("integer") | Some("number") => PrimitiveType::Number,
            Some("boolean") => PrimitiveType::Boolean,
            Some("array") => PrimitiveType::Array(Box::new(
                self.items
                    .as_ref()
                    .map(|items| items.primitive())
                    .unwrap_or(PrimitiveType::Unknown),
            )),
            _ => PrimitiveType::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_and_number_are_numbers() {
        assert_eq!(Schema::of_type("integer").primitive(), PrimitiveType::Number);
        assert_eq!(Schema::of_type("number").primitive(), PrimitiveType::Number);
    }

    #[test]
    fn object_and_missing_type_are_unknown() {
        assert_eq!(Schema::of_type("object").primitive(), PrimitiveType::Unknown);
        assert_eq!(Schema::default().primitive(), PrimitiveType::Unknown);
    }

    #[test]
    fn array_without_items_is_array_of_unknown() {
        assert_eq!(
            Schema::of_type("array").primitive(),
            PrimitiveType::Array(Box::new(PrimitiveType::Unknown))
        );
    }

    #[test]
    fn type_list_skips_null() {
        let schema: Schema = serde_json::from_str(r#"{ "type": ["null", "boolean"] }"#).unwrap();
        assert_eq!(schema.primitive(), PrimitiveType::Boolean);
    }

    #[test]
    fn unknown_keywords_are_ignored() {
        let schema: Schema = serde_json::from_str(
            r#"{ "type": "string", "minLength": 3, "example": "abc" }"#,
        )
        .unwrap();
        assert_eq!(schema.primitive(), PrimitiveType::String);
        assert!(schema.reference().is_none());
    }

    #[test]
    fn mixed_enum_is_not_a_string_enum() {
        let schema: Schema = serde_json::from_str(r#"{ "enum": ["a", 1] }"#).unwrap();
        assert_eq!(schema.string_enum(), None);
        assert_eq!(Schema::of_type("string").string_enum(), None);
    }
}
