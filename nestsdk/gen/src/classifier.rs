//! Operation classification: grouping operations into controllers.
//!
//! Every supported `(path, verb)` pair of the document is keyed by its
//! `operationId`, which encodes `<controller><separator><method>`
//! (`application_findAll`). The result is a [`ControllerMap`] that keeps
//! controllers and methods in first-seen order.
//!
//! ## Rules
//!
//! - The id is split on the **first** separator, so `orders_list_all` becomes
//!   controller `orders`, method `list_all`.
//! - Both halves must be identifiers. Anything else is a structural defect:
//!   the operation is left out with an error diagnostic and no name is
//!   guessed. Whether the run then fails is decided by the caller, see
//!   [`crate::config::InvalidOperationIdPolicy`].
//! - A method name already present in its controller gets the first free
//!   suffix `_2`, `_3`, ... and an informational diagnostic.
//!
//! Classification is a pure transform over the in-memory document.

use indexmap::IndexMap;
use nestsdk_define::{ApiDocument, HttpVerb, Operation};
use tracing::debug;

use crate::config::{GeneratorConfig, is_identifier};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::scaffold::RESERVED_MEMBERS;

/// An operation together with where it was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrichedOperation<'a> {
    pub verb: HttpVerb,
    pub path: &'a str,
    pub operation: &'a Operation,
}

impl EnrichedOperation<'_> {
    /// `"<verb> <path>"`, for diagnostics.
    pub fn location(&self) -> String {
        format!("{} {}", self.verb, self.path)
    }
}

/// Methods of one controller, keyed by (disambiguated) method name.
pub type ControllerMethods<'a> = IndexMap<String, EnrichedOperation<'a>>;

/// Controllers in first-seen order, each with its methods in first-seen order.
///
/// ## Examples
///
/// ```
/// use nestsdk_define::{HttpVerb, Operation};
/// use nestsdk_gen::classifier::{ControllerMap, EnrichedOperation};
///
/// let op = Operation::default();
/// let enriched = EnrichedOperation { verb: HttpVerb::Get, path: "/orders", operation: &op };
///
/// let mut map = ControllerMap::new();
/// assert_eq!(map.insert("orders", "list", enriched), "list");
/// assert_eq!(map.insert("orders", "list", enriched), "list_2");
/// assert_eq!(map.insert("orders", "list", enriched), "list_3");
/// assert_eq!(map.method_count(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerMap<'a> {
    controllers: IndexMap<String, ControllerMethods<'a>>,
}

impl<'a> ControllerMap<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an operation under `controller`, renaming the method if the name
    /// is taken. Returns the name the method was stored under.
    pub fn insert(&mut self, controller: &str, method: &str, op: EnrichedOperation<'a>) -> String {
        let methods = self.controllers.entry(controller.to_string()).or_default();
        let name = disambiguate(methods, method);
        methods.insert(name.clone(), op);
        name
    }

    pub fn get(&self, controller: &str) -> Option<&ControllerMethods<'a>> {
        self.controllers.get(controller)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ControllerMethods<'a>)> {
        self.controllers.iter()
    }

    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    pub fn method_count(&self) -> usize {
        self.controllers.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

/// Returns `base` if free, otherwise the first free `base_N` with `N >= 2`.
fn disambiguate(methods: &ControllerMethods<'_>, base: &str) -> String {
    if !methods.contains_key(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !methods.contains_key(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Splits an `operationId` into `(controller, method)`.
///
/// ## Examples
///
/// ```
/// use nestsdk_gen::classifier::split_operation_id;
///
/// assert_eq!(split_operation_id("application_findAll", "_"), Some(("application", "findAll")));
/// assert_eq!(split_operation_id("orders_list_all", "_"), Some(("orders", "list_all")));
/// assert_eq!(split_operation_id("findAll", "_"), None);
/// assert_eq!(split_operation_id("_findAll", "_"), None);
/// assert_eq!(split_operation_id("app-x_find", "_"), None);
/// ```
pub fn split_operation_id<'s>(operation_id: &'s str, separator: &str) -> Option<(&'s str, &'s str)> {
    let (controller, method) = operation_id.split_once(separator)?;
    if is_identifier(controller) && is_identifier(method) {
        Some((controller, method))
    } else {
        None
    }
}

/// Groups every supported operation of the document by controller.
///
/// Operations with a malformed `operationId` are left out and recorded as
/// [`Diagnostic::InvalidOperationId`]. Classification always covers the
/// whole document, so every defect is reported in one run.
pub fn classify<'a>(
    document: &'a ApiDocument,
    config: &GeneratorConfig,
    diagnostics: &mut Diagnostics,
) -> ControllerMap<'a> {
    let separator = config.operation_id_separator.as_str();
    let mut map = ControllerMap::new();

    for (path, item) in &document.paths {
        for verb in &item.unsupported_verbs {
            diagnostics.push(Diagnostic::UnsupportedVerb {
                path: path.clone(),
                verb: verb.clone(),
            });
        }

        for (verb, operation) in &item.operations {
            let parts = operation
                .operation_id
                .as_deref()
                .and_then(|id| split_operation_id(id, separator))
                .filter(|(controller, _)| !RESERVED_MEMBERS.contains(controller));

            let Some((controller, method)) = parts else {
                diagnostics.push(Diagnostic::InvalidOperationId {
                    path: path.clone(),
                    verb: *verb,
                    operation_id: operation.operation_id.clone(),
                });
                continue;
            };

            let enriched = EnrichedOperation {
                verb: *verb,
                path: path.as_str(),
                operation,
            };
            let stored = map.insert(controller, method, enriched);
            if stored != method {
                diagnostics.push(Diagnostic::MethodRenamed {
                    controller: controller.to_string(),
                    original: method.to_string(),
                    renamed: stored,
                    path: path.clone(),
                    verb: *verb,
                });
            } else {
                debug!(%controller, %method, "{} {}", verb, path);
            }
        }
    }

    map
}
