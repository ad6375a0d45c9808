//! Operation-level types: parameters, request bodies and responses.
//!
//! Both OpenAPI 3 (`requestBody`, `content`) and Swagger 2 (`in: body`
//! parameters, inline `type`, `schema` on responses) shapes are accepted, so
//! the generator can treat either kind of document the same way.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::JSON_MEDIA_TYPE;
use crate::schema::{PrimitiveType, Schema, SchemaKind};

/// The response key whose schema types a generated method.
pub const DEFAULT_RESPONSE_KEY: &str = "default";

/// A single endpoint: one HTTP verb on one path.
///
/// Operations are read-only once loaded; the generator only borrows them.
///
/// ## Examples
///
/// ```
/// use nestsdk_define::Operation;
///
/// let op: Operation = serde_json::from_str(r##"{
///     "operationId": "application_create",
///     "requestBody": {
///         "content": {
///             "application/json": {
///                 "schema": { "$ref": "#/components/schemas/ApplicationDtoCreate" }
///             }
///         }
///     }
/// }"##).unwrap();
///
/// assert_eq!(
///     op.json_body_schema().and_then(|s| s.reference()),
///     Some("#/components/schemas/ApplicationDtoCreate")
/// );
/// assert!(op.default_response_schema().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Expected to encode `<controller>_<methodName>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    /// One-line summary, used when there is no description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,

    /// Declared parameters in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,

    /// Responses keyed by status code or `default`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Response>,
}

impl Operation {
    /// Returns `true` when the operation accepts a request payload of any kind.
    pub fn has_body(&self) -> bool {
        self.request_body.is_some()
            || self.parameters.iter().any(|p| {
                matches!(p.location, ParameterLocation::Body | ParameterLocation::FormData)
            })
    }

    /// Returns the JSON request body schema, if one is declared.
    ///
    /// Looks at `requestBody.content["application/json"]` first and falls
    /// back to a Swagger 2 `in: body` parameter.
    pub fn json_body_schema(&self) -> Option<&Schema> {
        if let Some(body) = &self.request_body {
            return body.json_schema();
        }
        self.parameters
            .iter()
            .find(|p| p.location == ParameterLocation::Body)
            .and_then(|p| p.schema.as_ref())
    }

    /// Returns the JSON schema of the `default` response, if any.
    pub fn default_response_schema(&self) -> Option<&Schema> {
        self.responses
            .get(DEFAULT_RESPONSE_KEY)
            .and_then(Response::json_schema)
    }

    /// Parameters that become part of the generated `query` argument.
    ///
    /// Path parameters are included because the generated client substitutes
    /// path placeholders from the same object.
    pub fn signature_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(|p| matches!(p.location, ParameterLocation::Query | ParameterLocation::Path))
    }
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    #[default]
    Query,
    Path,
    Header,
    Cookie,
    /// Swagger 2 body parameter.
    Body,
    /// Swagger 2 form field.
    FormData,
}

/// A declared operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "in", default)]
    pub location: ParameterLocation,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// OpenAPI 3 schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    /// Swagger 2 inline type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaKind>,

    /// Swagger 2 inline array items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
}

impl Parameter {
    /// Creates a parameter with a primitive schema type.
    pub fn new(
        name: impl Into<String>,
        location: ParameterLocation,
        required: bool,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            required,
            description: None,
            schema: Some(Schema::of_type(kind)),
            kind: None,
            items: None,
        }
    }

    /// The primitive type of this parameter, from `schema` or inline `type`.
    ///
    /// ## Examples
    ///
    /// ```
    /// use nestsdk_define::{Parameter, PrimitiveType};
    ///
    /// let swagger2: Parameter = serde_json::from_str(
    ///     r#"{ "name": "page", "in": "query", "type": "integer" }"#
    /// ).unwrap();
    /// assert_eq!(swagger2.primitive(), PrimitiveType::Number);
    /// ```
    pub fn primitive(&self) -> PrimitiveType {
        match &self.schema {
            Some(schema) => schema.primitive(),
            None => Schema {
                kind: self.kind.clone(),
                items: self.items.clone(),
                ..Schema::default()
            }
            .primitive(),
        }
    }
}

/// An OpenAPI 3 request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

impl RequestBody {
    /// The `application/json` schema, if declared.
    pub fn json_schema(&self) -> Option<&Schema> {
        self.content
            .get(JSON_MEDIA_TYPE)
            .and_then(|media| media.schema.as_ref())
    }
}

/// A response entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// OpenAPI 3 content map.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,

    /// Swagger 2 response schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl Response {
    /// The `application/json` schema, or the Swagger 2 `schema`.
    pub fn json_schema(&self) -> Option<&Schema> {
        self.content
            .get(JSON_MEDIA_TYPE)
            .and_then(|media| media.schema.as_ref())
            .or(self.schema.as_ref())
    }
}

/// A media type entry of a `content` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_response_ignores_status_codes() {
        let op: Operation = serde_json::from_str(
            r##"{
                "responses": {
                    "200": {
                        "content": {
                            "application/json": { "schema": { "$ref": "#/components/schemas/A" } }
                        }
                    }
                }
            }"##,
        )
        .unwrap();

        assert!(op.default_response_schema().is_none());
    }

    #[test]
    fn default_response_reads_json_content() {
        let op: Operation = serde_json::from_str(
            r##"{
                "responses": {
                    "default": {
                        "description": "ok",
                        "content": {
                            "application/json": { "schema": { "$ref": "#/components/schemas/A" } }
                        }
                    }
                }
            }"##,
        )
        .unwrap();

        assert_eq!(
            op.default_response_schema().and_then(Schema::reference),
            Some("#/components/schemas/A")
        );
    }

    #[test]
    fn swagger2_body_parameter_is_the_json_body() {
        let op: Operation = serde_json::from_str(
            r##"{
                "parameters": [
                    { "name": "body", "in": "body", "schema": { "$ref": "#/definitions/UserDto" } }
                ]
            }"##,
        )
        .unwrap();

        assert!(op.has_body());
        assert_eq!(
            op.json_body_schema().and_then(Schema::reference),
            Some("#/definitions/UserDto")
        );
        assert_eq!(op.signature_parameters().count(), 0);
    }

    #[test]
    fn non_json_body_has_no_json_schema() {
        let op: Operation = serde_json::from_str(
            r#"{
                "requestBody": {
                    "content": { "multipart/form-data": { "schema": { "type": "object" } } }
                }
            }"#,
        )
        .unwrap();

        assert!(op.has_body());
        assert!(op.json_body_schema().is_none());
    }

    #[test]
    fn signature_parameters_exclude_headers() {
        let op = Operation {
            parameters: vec![
                Parameter::new("id", ParameterLocation::Path, true, "integer"),
                Parameter::new("x-trace", ParameterLocation::Header, false, "string"),
                Parameter::new("page", ParameterLocation::Query, false, "integer"),
            ],
            ..Operation::default()
        };

        let names: Vec<_> = op.signature_parameters().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id", "page"]);
    }

    #[test]
    fn parameter_location_defaults_to_query() {
        let param: Parameter = serde_json::from_str(r#"{ "name": "q" }"#).unwrap();
        assert_eq!(param.location, ParameterLocation::Query);
        assert!(!param.required);
        assert_eq!(param.primitive(), PrimitiveType::Unknown);
    }
}
