//! Method synthesis: one client method per classified operation.
//!
//! For every operation of a controller the synthesizer derives:
//!
//! - the result type, from a direct `$ref` in the `default` response;
//! - a `query` parameter listing every query and path parameter;
//! - a `data` parameter typed by a direct `$ref` request body, followed by
//!   `validate = false`;
//! - a body that optionally guards on the validator and then delegates to
//!   the shared `sendRequest` primitive.
//!
//! Every referenced model is recorded in the [`DependencySet`]. Anything
//! that degrades the output (untyped positions, unimported models) is
//! recorded as a diagnostic.

use nestsdk_define::{Parameter, ParameterLocation, PrimitiveType, Schema};

use crate::classifier::{ControllerMethods, EnrichedOperation};
use crate::config::GeneratorConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::ir::{
    Body, ControllerDecl, DispatchCall, FieldDecl, ObjectMethod, ParamDecl, TypeExpr,
    ValidationGuard,
};
use crate::parser::extract_path_params;
use crate::resolver::{DependencySet, ModelImport, record_dependency, resolve_ref};

/// Name of the structured parameter carrying query and path values.
pub const QUERY_PARAM: &str = "query";
/// Name of the request body parameter.
pub const DATA_PARAM: &str = "data";
/// Name of the boolean flag enabling client-side validation.
pub const VALIDATE_PARAM: &str = "validate";

/// Synthesizes the methods of one controller.
///
/// Methods keep the order of `methods`. `deps` is extended with every model
/// and validator the methods reference.
pub fn synthesize(
    controller: &str,
    methods: &ControllerMethods<'_>,
    deps: &mut DependencySet,
    config: &GeneratorConfig,
    diagnostics: &mut Diagnostics,
) -> ControllerDecl {
    let methods = methods
        .iter()
        .map(|(name, op)| {
            let context = format!("{}.{} ({})", controller, name, op.location());
            synthesize_method(name, op, &context, deps, config, diagnostics)
        })
        .collect();

    ControllerDecl {
        name: controller.to_string(),
        docs: vec![format!("{} controller", controller)],
        methods,
    }
}

fn synthesize_method(
    name: &str,
    op: &EnrichedOperation<'_>,
    context: &str,
    deps: &mut DependencySet,
    config: &GeneratorConfig,
    diagnostics: &mut Diagnostics,
) -> ObjectMethod {
    let operation = op.operation;

    let result = operation
        .default_response_schema()
        .and_then(|schema| schema.reference())
        .and_then(|reference| resolve_model(reference, context, deps, config, diagnostics))
        .map(|(model, _)| TypeExpr::named(model));

    let query_fields = query_fields(op, context, diagnostics);
    let body = operation
        .has_body()
        .then(|| body_param(op, context, deps, config, diagnostics));

    let mut params = Vec::new();
    let mut docs = description_docs(op, config);

    if !query_fields.is_empty() {
        let any_required = query_fields.iter().any(|f| !f.optional);
        let mut param = ParamDecl::new(QUERY_PARAM, TypeExpr::Object(query_fields));
        if !any_required && body.is_none() {
            param = param.optional();
        }
        params.push(param);
        docs.push(format!("@param {} Path and query parameters", QUERY_PARAM));
    }

    let mut guard = None;
    if let Some(body) = &body {
        params.push(ParamDecl::new(DATA_PARAM, body.ty.clone()));
        params.push(ParamDecl::new(VALIDATE_PARAM, TypeExpr::named("boolean")).with_default("false"));
        docs.push(format!("@param {} Request body", DATA_PARAM));
        docs.push(format!(
            "@param {} Validate {} before sending, skipping the request when invalid",
            VALIDATE_PARAM, DATA_PARAM
        ));

        guard = body.validator.as_ref().map(|validator| ValidationGuard {
            flag: VALIDATE_PARAM.to_string(),
            validator: validator.clone(),
            payload: DATA_PARAM.to_string(),
        });
    }

    if let Some(TypeExpr::Named(model)) = &result {
        docs.push(format!("@returns {} response body", model));
    }

    let has_query = params.iter().any(|p| p.name == QUERY_PARAM);
    ObjectMethod {
        name: name.to_string(),
        docs,
        params,
        body: Body::Dispatch(DispatchCall {
            verb: op.verb,
            path: op.path.to_string(),
            result,
            pass_query: has_query,
            pass_data: body.is_some(),
            guard,
        }),
    }
}

/// Resolves a `$ref` to a model name and records its import.
///
/// Returns `None` (untyped) when no model name can be derived. An
/// unclassified model is still returned, without an import.
fn resolve_model(
    reference: &str,
    context: &str,
    deps: &mut DependencySet,
    config: &GeneratorConfig,
    diagnostics: &mut Diagnostics,
) -> Option<(String, Option<ModelImport>)> {
    let model = resolve_ref(reference);
    if model.is_empty() {
        diagnostics.push(Diagnostic::UnresolvableReference {
            reference: reference.to_string(),
            context: context.to_string(),
        });
        return None;
    }

    let import = record_dependency(deps, &model, &config.models);
    if import.is_none() {
        diagnostics.push(Diagnostic::UnclassifiedModel {
            model: model.clone(),
            context: context.to_string(),
        });
    }
    Some((model, import))
}

struct BodyParam {
    ty: TypeExpr,
    validator: Option<String>,
}

fn body_param(
    op: &EnrichedOperation<'_>,
    context: &str,
    deps: &mut DependencySet,
    config: &GeneratorConfig,
    diagnostics: &mut Diagnostics,
) -> BodyParam {
    let reference = op.operation.json_body_schema().and_then(|schema| schema.reference());

    let Some(reference) = reference else {
        diagnostics.push(Diagnostic::UntypedBody {
            context: context.to_string(),
        });
        return BodyParam {
            ty: TypeExpr::any(),
            validator: None,
        };
    };

    match resolve_model(reference, context, deps, config, diagnostics) {
        Some((model, import)) => {
            let validator = import.and_then(|import| {
                let validator = import.validator?;
                deps.insert(&import.module, &validator);
                Some(validator)
            });
            BodyParam {
                ty: TypeExpr::named(model),
                validator,
            }
        }
        None => BodyParam {
            ty: TypeExpr::any(),
            validator: None,
        },
    }
}

/// Fields of the `query` parameter: declared query/path parameters in
/// declaration order, then undeclared path placeholders.
fn query_fields(
    op: &EnrichedOperation<'_>,
    context: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<FieldDecl> {
    let mut fields: Vec<FieldDecl> = Vec::new();

    for param in &op.operation.parameters {
        if matches!(param.location, ParameterLocation::Header | ParameterLocation::Cookie) {
            diagnostics.push(Diagnostic::SkippedParameter {
                context: context.to_string(),
                name: param.name.clone(),
                location: param.location,
            });
        }
    }

    for param in op.operation.signature_parameters() {
        if fields.iter().any(|f| f.name == param.name) {
            diagnostics.push(Diagnostic::SkippedParameter {
                context: context.to_string(),
                name: param.name.clone(),
                location: param.location,
            });
            continue;
        }
        let mut field = FieldDecl::new(param.name.clone(), parameter_type(param));
        field.optional = !param.required;
        if let Some(description) = &param.description {
            field.docs.push(description.clone());
        }
        fields.push(field);
    }

    for placeholder in extract_path_params(op.path) {
        if fields.iter().any(|f| f.name == placeholder) {
            continue;
        }
        diagnostics.push(Diagnostic::UndeclaredPathParam {
            path: op.path.to_string(),
            param: placeholder.to_string(),
        });
        fields.push(FieldDecl::new(
            placeholder,
            TypeExpr::Union(vec![TypeExpr::named("string"), TypeExpr::named("number")]),
        ));
    }

    fields
}

/// A string enumeration becomes a union of literals, anything else its
/// primitive type.
fn parameter_type(param: &Parameter) -> TypeExpr {
    match param.schema.as_ref().and_then(Schema::string_enum) {
        Some(values) => TypeExpr::Union(
            values
                .into_iter()
                .map(|value| TypeExpr::StringLiteral(value.to_string()))
                .collect(),
        ),
        None => primitive_type(&param.primitive()),
    }
}

/// Maps a parameter's primitive type to a TypeScript type.
pub fn primitive_type(primitive: &PrimitiveType) -> TypeExpr {
    match primitive {
        PrimitiveType::String => TypeExpr::named("string"),
        PrimitiveType::Number => TypeExpr::named("number"),
        PrimitiveType::Boolean => TypeExpr::named("boolean"),
        PrimitiveType::Array(inner) => TypeExpr::Array(Box::new(primitive_type(inner))),
        PrimitiveType::Unknown => TypeExpr::any(),
    }
}

fn description_docs(op: &EnrichedOperation<'_>, config: &GeneratorConfig) -> Vec<String> {
    let operation = op.operation;
    let mut docs: Vec<String> = [&operation.description, &operation.summary]
        .into_iter()
        .filter_map(|text| text.as_deref().map(str::trim))
        .find(|text| !text.is_empty())
        .map(|text| text.lines().map(|line| line.trim_end().to_string()).collect())
        .unwrap_or_else(|| vec![config.missing_description.clone()]);

    if operation.deprecated {
        docs.push("@deprecated".to_string());
    }
    docs
}
