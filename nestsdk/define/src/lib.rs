//! nestsdk Document Model
//!
//! This crate provides the strongly-typed model of the OpenAPI/Swagger
//! documents consumed by the `nestsdk-gen` client generator. The document is
//! validated once, at load time, so the rest of the pipeline never touches
//! untyped JSON.
//!
//! ## Core Types
//!
//! - [`ApiDocument`] - The full description: paths in document order
//! - [`PathItem`] - The operations declared on a single path
//! - [`HttpVerb`] - Supported HTTP verbs (GET, POST, PUT, DELETE)
//! - [`Operation`] - One endpoint with parameters, body and responses
//! - [`Parameter`] / [`ParameterLocation`] - Declared operation parameters
//! - [`RequestBody`] / [`Response`] / [`MediaType`] - Payload descriptions
//! - [`Schema`] / [`PrimitiveType`] - The subset of JSON Schema we inspect
//!
//! ## Examples
//!
//! ```
//! use nestsdk_define::{ApiDocument, HttpVerb};
//!
//! let doc = ApiDocument::from_json_str(r#"{
//!     "paths": {
//!         "/applications": {
//!             "get": { "operationId": "application_findAll" }
//!         }
//!     }
//! }"#).unwrap();
//!
//! let item = &doc.paths["/applications"];
//! assert_eq!(item.operations[0].0, HttpVerb::Get);
//! assert_eq!(
//!     item.operations[0].1.operation_id.as_deref(),
//!     Some("application_findAll")
//! );
//! ```

pub mod document;
pub mod error;
pub mod operation;
pub mod schema;

// Re-export main types at crate root
pub use document::{ApiDocument, HttpVerb, PathItem};
pub use error::DocumentError;
pub use operation::{MediaType, Operation, Parameter, ParameterLocation, RequestBody, Response};
pub use schema::{PrimitiveType, Schema};

/// The media type whose schemas are inspected for bodies and responses.
pub const JSON_MEDIA_TYPE: &str = "application/json";
