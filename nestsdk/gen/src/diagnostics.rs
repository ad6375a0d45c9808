//! Diagnostics collected during a generation run.
//!
//! Nothing the classifier or synthesizer notices is dropped silently. Each
//! [`Diagnostic`] is logged through `tracing` at the moment it is recorded and
//! kept in [`Diagnostics`] so the caller can report it at the end of the run.
//!
//! | Kind | Severity |
//! |------|----------|
//! | Invalid `operationId` | Error |
//! | Unresolvable reference, unclassified model, untyped body | Warning |
//! | Unsupported verb, undeclared path parameter, skipped parameter | Warning |
//! | Method renamed to avoid a collision | Info |

use std::fmt;

use nestsdk_define::{HttpVerb, ParameterLocation};
use tracing::{error, info, warn};

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Something the pipeline noticed about the input document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The operation was left out: its `operationId` does not split into
    /// `<controller><separator><method>`.
    InvalidOperationId {
        path: String,
        verb: HttpVerb,
        operation_id: Option<String>,
    },
    /// A verb key on a path that no method is generated for.
    UnsupportedVerb { path: String, verb: String },
    /// A method name collided within its controller and got a suffix.
    MethodRenamed {
        controller: String,
        original: String,
        renamed: String,
        path: String,
        verb: HttpVerb,
    },
    /// A `$ref` whose model name could not be derived; the affected
    /// position is emitted untyped.
    UnresolvableReference { reference: String, context: String },
    /// A model name that matches no module convention. The method still
    /// references the type, which the generated file does not import.
    UnclassifiedModel { model: String, context: String },
    /// A request body that is not a direct JSON `$ref`; `data` is untyped.
    UntypedBody { context: String },
    /// A `{placeholder}` in the path with no declared parameter.
    UndeclaredPathParam { path: String, param: String },
    /// A parameter that has no place in the generated signature.
    SkippedParameter {
        context: String,
        name: String,
        location: ParameterLocation,
    },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::InvalidOperationId { .. } => Severity::Error,
            Diagnostic::MethodRenamed { .. } => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::InvalidOperationId {
                path,
                verb,
                operation_id,
            } => match operation_id {
                Some(id) => write!(f, "{} {}: invalid operationId '{}', operation skipped", verb, path, id),
                None => write!(f, "{} {}: missing operationId, operation skipped", verb, path),
            },
            Diagnostic::UnsupportedVerb { path, verb } => {
                write!(f, "{} {}: unsupported verb, no method generated", verb, path)
            }
            Diagnostic::MethodRenamed {
                controller,
                original,
                renamed,
                path,
                verb,
            } => write!(
                f,
                "{} {}: {}.{} already exists, generated as {}.{}",
                verb, path, controller, original, controller, renamed
            ),
            Diagnostic::UnresolvableReference { reference, context } => write!(
                f,
                "{}: cannot derive a model name from '{}', emitted untyped",
                context, reference
            ),
            Diagnostic::UnclassifiedModel { model, context } => write!(
                f,
                "{}: model '{}' matches no module convention and is not imported",
                context, model
            ),
            Diagnostic::UntypedBody { context } => write!(
                f,
                "{}: request body is not a JSON schema reference, data is untyped",
                context
            ),
            Diagnostic::UndeclaredPathParam { path, param } => write!(
                f,
                "{}: placeholder '{{{}}}' has no declared parameter",
                path, param
            ),
            Diagnostic::SkippedParameter {
                context,
                name,
                location,
            } => write!(
                f,
                "{}: {:?} parameter '{}' is not part of the generated signature",
                context, location, name
            ),
        }
    }
}

/// Ordered collection of diagnostics for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs and stores a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Info => info!("{}", diagnostic),
            Severity::Warning => warn!("{}", diagnostic),
            Severity::Error => error!("{}", diagnostic),
        }
        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of diagnostics with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity() == severity)
            .count()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn renamed() -> Diagnostic {
        Diagnostic::MethodRenamed {
            controller: "orders".to_string(),
            original: "list".to_string(),
            renamed: "list_2".to_string(),
            path: "/orders/archive".to_string(),
            verb: HttpVerb::Get,
        }
    }

    #[test]
    fn severities() {
        assert_eq!(renamed().severity(), Severity::Info);
        assert_eq!(
            Diagnostic::InvalidOperationId {
                path: "/x".to_string(),
                verb: HttpVerb::Get,
                operation_id: None,
            }
            .severity(),
            Severity::Error
        );
        assert_eq!(
            Diagnostic::UntypedBody {
                context: "a.b".to_string()
            }
            .severity(),
            Severity::Warning
        );
    }

    #[test]
    fn renamed_message() {
        assert_eq!(
            renamed().to_string(),
            "get /orders/archive: orders.list already exists, generated as orders.list_2"
        );
    }

    #[test]
    fn undeclared_path_param_message_keeps_braces() {
        let d = Diagnostic::UndeclaredPathParam {
            path: "/items/{id}".to_string(),
            param: "id".to_string(),
        };
        assert_eq!(d.to_string(), "/items/{id}: placeholder '{id}' has no declared parameter");
    }

    #[test]
    fn count_by_severity() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(renamed());
        diagnostics.push(Diagnostic::UnsupportedVerb {
            path: "/x".to_string(),
            verb: "patch".to_string(),
        });
        diagnostics.push(renamed());

        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics.count(Severity::Info), 2);
        assert_eq!(diagnostics.count(Severity::Warning), 1);
        assert_eq!(diagnostics.count(Severity::Error), 0);
    }

    #[test]
    #[traced_test]
    fn push_logs_the_diagnostic() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::UnsupportedVerb {
            path: "/widgets".to_string(),
            verb: "patch".to_string(),
        });

        assert!(logs_contain("patch /widgets: unsupported verb"));
    }
}
