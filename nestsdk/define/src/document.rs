//! The top-level API document and its paths.
//!
//! - [`ApiDocument`] - The whole description, loaded from JSON
//! - [`PathItem`] - Operations of one path, in document order
//! - [`HttpVerb`] - The verbs a client method can be generated for

use std::fs;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::DocumentError;
use crate::operation::{Operation, Parameter};

/// Path item keys that are HTTP verbs the generator does not support.
const UNSUPPORTED_VERBS: &[&str] = &["patch", "head", "options", "trace"];

/// HTTP verbs a client method can be generated for.
///
/// ## Examples
///
/// ```
/// use std::str::FromStr;
/// use nestsdk_define::HttpVerb;
///
/// assert_eq!(HttpVerb::from_str("post").unwrap(), HttpVerb::Post);
/// assert_eq!(HttpVerb::Delete.to_string(), "delete");
/// assert!(HttpVerb::from_str("patch").is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    /// Lowercase verb name, as used in the document and the generated client.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Document metadata from the `info` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
}

/// The full API description.
///
/// Paths keep the order in which they appear in the document; the generator
/// relies on this for deterministic, first-seen controller ordering.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiDocument {
    #[serde(default)]
    pub info: Option<Info>,

    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
}

impl ApiDocument {
    /// Parses a document from a JSON string.
    ///
    /// ## Errors
    ///
    /// Returns [`DocumentError::Parse`] when the text is not JSON or an
    /// operation does not have the expected shape.
    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a document from a file.
    ///
    /// ## Errors
    ///
    /// Returns [`DocumentError::Read`] when the file cannot be read and
    /// [`DocumentError::Parse`] when its content is not a valid document.
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Total number of supported operations across all paths.
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(|item| item.operations.len()).sum()
    }
}

/// The operations declared on one path.
///
/// Built from the raw path object: supported verbs become typed
/// [`Operation`]s, path-level `parameters` are merged into each operation
/// (operation-level entries win), and unsupported verbs are remembered so
/// they can be reported instead of silently dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathItem {
    /// Supported operations in document order.
    pub operations: Vec<(HttpVerb, Operation)>,
    /// Verb keys present on the path that no method is generated for.
    pub unsupported_verbs: Vec<String>,
}

impl PathItem {
    /// Returns the operation for a verb, if declared.
    pub fn get(&self, verb: HttpVerb) -> Option<&Operation> {
        self.operations
            .iter()
            .find(|(v, _)| *v == verb)
            .map(|(_, op)| op)
    }
}

impl<'de> Deserialize<'de> for PathItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        PathItem::try_from(raw).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<IndexMap<String, Value>> for PathItem {
    type Error = serde_json::Error;

    fn try_from(raw: IndexMap<String, Value>) -> Result<Self, Self::Error> {
        let mut operations = Vec::new();
        let mut unsupported_verbs = Vec::new();
        let mut shared_params: Vec<Parameter> = Vec::new();

        for (key, value) in raw {
            if let Ok(verb) = HttpVerb::from_str(&key) {
                operations.push((verb, serde_json::from_value::<Operation>(value)?));
            } else if key == "parameters" {
                shared_params = serde_json::from_value(value)?;
            } else if UNSUPPORTED_VERBS.contains(&key.as_str()) {
                unsupported_verbs.push(key);
            }
        }

        if !shared_params.is_empty() {
            for (_, op) in &mut operations {
                merge_path_parameters(op, &shared_params);
            }
        }

        Ok(PathItem {
            operations,
            unsupported_verbs,
        })
    }
}

/// Prepends path-level parameters the operation does not override.
fn merge_path_parameters(op: &mut Operation, shared: &[Parameter]) {
    let inherited: Vec<Parameter> = shared
        .iter()
        .filter(|p| {
            !op.parameters
                .iter()
                .any(|own| own.name == p.name && own.location == p.location)
        })
        .cloned()
        .collect();

    if !inherited.is_empty() {
        let own = std::mem::take(&mut op.parameters);
        op.parameters = inherited.into_iter().chain(own).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::ParameterLocation;
    use std::io::Write;
    use strum::IntoEnumIterator;

    #[test]
    fn verbs_cover_get_post_put_delete() {
        let verbs: Vec<_> = HttpVerb::iter().map(|v| v.as_str()).collect();
        assert_eq!(verbs, vec!["get", "post", "put", "delete"]);
    }

    #[test]
    fn paths_keep_document_order() {
        let doc = ApiDocument::from_json_str(
            r#"{
                "paths": {
                    "/zeta": { "get": { "operationId": "z_get" } },
                    "/alpha": { "get": { "operationId": "a_get" } },
                    "/mid": { "get": { "operationId": "m_get" } }
                }
            }"#,
        )
        .unwrap();

        let keys: Vec<_> = doc.paths.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["/zeta", "/alpha", "/mid"]);
    }

    #[test]
    fn verbs_keep_document_order() {
        let doc = ApiDocument::from_json_str(
            r#"{
                "paths": {
                    "/items": {
                        "delete": { "operationId": "items_remove" },
                        "get": { "operationId": "items_list" }
                    }
                }
            }"#,
        )
        .unwrap();

        let verbs: Vec<_> = doc.paths["/items"].operations.iter().map(|(v, _)| *v).collect();
        assert_eq!(verbs, vec![HttpVerb::Delete, HttpVerb::Get]);
    }

    #[test]
    fn unsupported_verbs_are_recorded() {
        let doc = ApiDocument::from_json_str(
            r#"{
                "paths": {
                    "/items": {
                        "summary": "Items",
                        "patch": { "operationId": "items_patch" },
                        "get": { "operationId": "items_list" }
                    }
                }
            }"#,
        )
        .unwrap();

        let item = &doc.paths["/items"];
        assert_eq!(item.operations.len(), 1);
        assert_eq!(item.unsupported_verbs, vec!["patch".to_string()]);
        assert_eq!(doc.operation_count(), 1);
    }

    #[test]
    fn path_level_parameters_are_merged() {
        let doc = ApiDocument::from_json_str(
            r#"{
                "paths": {
                    "/items/{id}": {
                        "parameters": [
                            { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "get": {
                            "operationId": "items_get",
                            "parameters": [
                                { "name": "expand", "in": "query", "schema": { "type": "boolean" } }
                            ]
                        },
                        "put": {
                            "operationId": "items_put",
                            "parameters": [
                                { "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } }
                            ]
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        let item = &doc.paths["/items/{id}"];
        let get = item.get(HttpVerb::Get).unwrap();
        let names: Vec<_> = get.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id", "expand"]);

        // Operation-level definition wins
        let put = item.get(HttpVerb::Put).unwrap();
        assert_eq!(put.parameters.len(), 1);
        assert_eq!(put.parameters[0].location, ParameterLocation::Path);
        assert_eq!(
            put.parameters[0].primitive(),
            crate::schema::PrimitiveType::Number
        );
    }

    #[test]
    fn malformed_operation_is_a_parse_error() {
        let result = ApiDocument::from_json_str(
            r#"{ "paths": { "/x": { "get": { "parameters": "not-a-list" } } } }"#,
        );
        assert!(matches!(result, Err(DocumentError::Parse(_))));
    }

    #[test]
    fn missing_paths_is_an_empty_document() {
        let doc = ApiDocument::from_json_str(r#"{ "openapi": "3.0.0" }"#).unwrap();
        assert!(doc.paths.is_empty());
    }

    #[test]
    fn from_file_reads_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "info": {{ "title": "Demo", "version": "1.0" }}, "paths": {{}} }}"#
        )
        .unwrap();

        let doc = ApiDocument::from_file(file.path()).unwrap();
        assert_eq!(doc.info.unwrap().title, "Demo");
    }

    #[test]
    fn from_file_missing_is_read_error() {
        let result = ApiDocument::from_file(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(DocumentError::Read { .. })));
    }
}
