//! Output assembly and file writing for the generated client.
//!
//! This module runs the last phase of generation: assembling the scaffold
//! and the synthesized controllers into one [`GeneratedUnit`], rendering it,
//! checking the result and writing it to disk atomically.
//!
//! ## Output Structure
//!
//! ```text
//! import { ... } from '<model module>';   // one line per module, sorted
//!
//! export interface BaseObj / RequestInitType / RequestType
//! function _fetch_ / replacePathParams / omitPathParams
//! export class Request { ... }            // dispatch base class
//! export class NestSDK extends Request {  // one group per controller
//!   private _application = { ... };
//!   readonly application: Readonly<typeof this._application> = this._application;
//! }
//! ```
//!
//! ## Safety Guarantees
//!
//! - **Validation**: the rendered text must have balanced delimiters
//! - **Atomic writes**: a uniquely named temp file in the target directory
//!   is persisted over the target, so a failed run leaves any previous
//!   output untouched
//! - **Strict runs**: with the abort policy an invalid `operationId` fails
//!   the run after every diagnostic has been collected

use std::fs;
use std::path::Path;

use nestsdk_define::{ApiDocument, HttpVerb};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::classifier::classify;
use crate::config::{GeneratorConfig, InvalidOperationIdPolicy};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::errors::GeneratorError;
use crate::ir::{
    ClassDecl, ClassMember, ConstructorDecl, ControllerDecl, Expr, GeneratedUnit, ImportDecl,
    ParamDecl, PropertyDecl, TypeExpr, Visibility,
};
use crate::render::{Renderer, TypeScriptRenderer};
use crate::resolver::DependencySet;
use crate::scaffold::{base_class, init_options_type, shared_functions, shared_interfaces};
use crate::synthesizer::synthesize;

/// Notice at the top of every generated file.
pub const GENERATED_NOTICE: &str =
    "This code was automatically generated by nestsdk-gen. Do not edit manually.";

/// The result of one generation run.
#[derive(Debug)]
pub struct Generation {
    /// The rendered TypeScript source.
    pub code: String,
    pub diagnostics: Diagnostics,
    pub controller_count: usize,
    pub method_count: usize,
}

/// Assembles the generated unit.
///
/// ## Arguments
///
/// * `controllers` - Synthesized controllers, in first-seen order
/// * `deps` - Every model and validator the controllers reference
/// * `config` - Supplies the client and base class names
///
/// ## Returns
///
/// The unit in emission order: imports, shared interfaces, shared
/// functions, base class, client class.
pub fn assemble_unit(
    controllers: &[ControllerDecl],
    deps: &DependencySet,
    config: &GeneratorConfig,
) -> GeneratedUnit {
    let imports = deps
        .iter()
        .map(|(module, symbols)| ImportDecl {
            module: module.clone(),
            symbols: symbols.iter().cloned().collect(),
        })
        .collect();

    GeneratedUnit {
        header: vec![GENERATED_NOTICE.to_string()],
        imports,
        interfaces: shared_interfaces(),
        functions: shared_functions(),
        classes: vec![
            base_class(&config.base_class_name),
            client_class(controllers, config),
        ],
    }
}

fn client_class(controllers: &[ControllerDecl], config: &GeneratorConfig) -> ClassDecl {
    let mut members = vec![ClassMember::Constructor(ConstructorDecl {
        params: vec![ParamDecl::new("options", init_options_type()).optional()],
        body: vec!["super(options);".to_string()],
    })];

    for controller in controllers {
        let private_name = format!("_{}", controller.name);
        let this_private = format!("this.{}", private_name);

        members.push(ClassMember::Property(PropertyDecl {
            name: private_name,
            docs: Vec::new(),
            visibility: Visibility::Private,
            readonly: false,
            optional: false,
            ty: None,
            initializer: Some(Expr::Object(controller.methods.clone())),
        }));
        members.push(ClassMember::Property(PropertyDecl {
            name: controller.name.clone(),
            docs: controller.docs.clone(),
            visibility: Visibility::Public,
            readonly: true,
            optional: false,
            ty: Some(TypeExpr::generic(
                "Readonly",
                vec![TypeExpr::TypeOf(this_private.clone())],
            )),
            initializer: Some(Expr::Raw(this_private)),
        }));
    }

    ClassDecl {
        name: config.client_name.clone(),
        docs: vec![
            "API client".to_string(),
            "Each controller is exposed as a read-only group of request methods".to_string(),
        ],
        exported: true,
        extends: Some(config.base_class_name.clone()),
        members,
    }
}

/// Checks that the rendered code has balanced `()`, `[]` and `{}`.
///
/// String literals, template literals (including `${...}` holes) and
/// comments are skipped. The emitted code contains no regular expression
/// literals, so `/` only ever starts a comment here.
///
/// ## Errors
///
/// Returns [`GeneratorError::CodeGenError`] naming the first offending line.
pub fn validate_code(code: &str) -> Result<(), GeneratorError> {
    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Frame {
        Delim(char, usize),
        Template(usize),
        TemplateHole(usize),
    }

    let invalid = |msg: String| GeneratorError::CodeGenError(format!("Generated code is invalid: {}", msg));

    let mut stack: Vec<Frame> = Vec::new();
    let mut chars = code.chars().peekable();
    let mut line = 1usize;

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }

        if let Some(Frame::Template(_)) = stack.last() {
            match c {
                '\\' => {
                    if chars.next() == Some('\n') {
                        line += 1;
                    }
                }
                '`' => {
                    stack.pop();
                }
                '$' if chars.peek() == Some(&'{') => {
                    chars.next();
                    stack.push(Frame::TemplateHole(line));
                }
                _ => {}
            }
            continue;
        }

        match c {
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        line += 1;
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let start = line;
                let mut prev = '\0';
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '\n' {
                        line += 1;
                    }
                    if prev == '*' && next == '/' {
                        closed = true;
                        break;
                    }
                    prev = next;
                }
                if !closed {
                    return Err(invalid(format!("unterminated comment starting at line {}", start)));
                }
            }
            '\'' | '"' => {
                let mut closed = false;
                while let Some(next) = chars.next() {
                    match next {
                        '\\' => {
                            chars.next();
                        }
                        '\n' => break,
                        _ if next == c => {
                            closed = true;
                            break;
                        }
                        _ => {}
                    }
                }
                if !closed {
                    return Err(invalid(format!("unterminated string at line {}", line)));
                }
            }
            '`' => stack.push(Frame::Template(line)),
            '(' => stack.push(Frame::Delim(')', line)),
            '[' => stack.push(Frame::Delim(']', line)),
            '{' => stack.push(Frame::Delim('}', line)),
            ')' | ']' | '}' => match stack.pop() {
                Some(Frame::Delim(expected, _)) if expected == c => {}
                Some(Frame::TemplateHole(_)) if c == '}' => {}
                _ => return Err(invalid(format!("unexpected '{}' at line {}", c, line))),
            },
            _ => {}
        }
    }

    match stack.last() {
        None => Ok(()),
        Some(Frame::Delim(expected, opened)) => Err(invalid(format!(
            "missing '{}' for delimiter opened at line {}",
            expected, opened
        ))),
        Some(Frame::Template(opened)) | Some(Frame::TemplateHole(opened)) => Err(invalid(format!(
            "unterminated template literal starting at line {}",
            opened
        ))),
    }
}

/// Writes content to a file atomically.
///
/// Creates parent directories if needed, writes to a uniquely named
/// temporary file in the target's directory and persists it over the target.
///
/// ## Errors
///
/// Returns [`GeneratorError::WriteError`] if any step fails. The target is
/// either fully replaced or left as it was.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), GeneratorError> {
    let write_error = |path: &Path, source: std::io::Error| GeneratorError::WriteError {
        path: path.display().to_string(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;

    let temp_file = NamedTempFile::new_in(parent).map_err(|e| write_error(parent, e))?;
    fs::write(temp_file.path(), content).map_err(|e| write_error(temp_file.path(), e))?;

    debug!(path = %path.display(), "persisting generated file");
    temp_file
        .persist(path)
        .map_err(|e| write_error(path, e.error))?;

    Ok(())
}

/// The first operation the classifier left out for its `operationId`.
fn first_invalid_operation(diagnostics: &Diagnostics) -> Option<(String, HttpVerb, Option<String>)> {
    diagnostics.iter().find_map(|diagnostic| match diagnostic {
        Diagnostic::InvalidOperationId {
            path,
            verb,
            operation_id,
        } => Some((path.clone(), *verb, operation_id.clone())),
        _ => None,
    })
}

/// Runs the whole pipeline over an in-memory document.
///
/// Classification, synthesis, assembly, rendering and validation. Nothing
/// is written.
///
/// ## Errors
///
/// Returns an error if the configuration is invalid, an operationId is
/// invalid under the abort policy, or the rendered code fails validation.
/// An abort carries the diagnostics of the whole document.
pub fn generate(
    document: &ApiDocument,
    config: &GeneratorConfig,
) -> Result<Generation, GeneratorError> {
    config.validate()?;

    let mut diagnostics = Diagnostics::new();
    let map = classify(document, config, &mut diagnostics);

    let mut deps = DependencySet::new();
    let controllers: Vec<ControllerDecl> = map
        .iter()
        .map(|(name, methods)| synthesize(name, methods, &mut deps, config, &mut diagnostics))
        .collect();

    if config.on_invalid_operation_id == InvalidOperationIdPolicy::Abort
        && let Some((path, verb, operation_id)) = first_invalid_operation(&diagnostics)
    {
        return Err(GeneratorError::InvalidOperationId {
            path,
            verb,
            operation_id,
            separator: config.operation_id_separator.clone(),
            diagnostics,
        });
    }

    let mut unit = assemble_unit(&controllers, &deps, config);
    if let Some(info) = &document.info
        && !info.title.is_empty()
    {
        unit.header.push(format!("Source: {} {}", info.title, info.version).trim_end().to_string());
    }

    let code = TypeScriptRenderer::new().render(&unit);
    validate_code(&code)?;

    debug!(
        imports = deps.symbol_count(),
        bytes = code.len(),
        "rendered client"
    );

    Ok(Generation {
        code,
        diagnostics,
        controller_count: map.controller_count(),
        method_count: map.method_count(),
    })
}

/// Generates the client for `input` and writes it to `output`.
///
/// This is the main entry point for code generation.
///
/// ## Arguments
///
/// * `input` - Path of the JSON API document
/// * `output` - Path of the TypeScript file to write
/// * `config` - Generator configuration
/// * `dry_run` - If true, print code instead of writing the file
///
/// ## Errors
///
/// Returns an error if the document cannot be loaded, generation fails or
/// the file cannot be written. No file is written in any of these cases.
pub fn generate_and_write(
    input: &Path,
    output: &Path,
    config: &GeneratorConfig,
    dry_run: bool,
) -> Result<Generation, GeneratorError> {
    let document = ApiDocument::from_file(input)?;
    info!(
        input = %input.display(),
        operations = document.operation_count(),
        "loaded API document"
    );

    let generation = generate(&document, config)?;

    if dry_run {
        println!("{}", generation.code);
    } else {
        write_atomic(output, &generation.code)?;
        info!(
            output = %output.display(),
            controllers = generation.controller_count,
            methods = generation.method_count,
            "wrote client"
        );
    }

    Ok(generation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use crate::ir::ObjectMethod;
    use tempfile::TempDir;

    const DOC: &str = r##"{
        "info": { "title": "Demo", "version": "1.0" },
        "paths": {
            "/applications": { "get": { "operationId": "application_findAll" } },
            "/application": {
                "post": {
                    "operationId": "application_create",
                    "requestBody": {
                        "content": {
                            "application/json": { "schema": { "$ref": "#/components/schemas/ApplicationDtoCreate" } }
                        }
                    },
                    "responses": {
                        "default": {
                            "content": {
                                "application/json": { "schema": { "$ref": "#/components/schemas/ApplicationDto" } }
                            }
                        }
                    }
                }
            },
            "/users/{id}": { "get": { "operationId": "user_get" } }
        }
    }"##;

    fn write_doc(dir: &TempDir, json: &str) -> std::path::PathBuf {
        let path = dir.path().join("swagger.json");
        fs::write(&path, json).unwrap();
        path
    }

    fn controller(name: &str) -> ControllerDecl {
        ControllerDecl {
            name: name.to_string(),
            docs: vec![format!("{} controller", name)],
            methods: Vec::<ObjectMethod>::new(),
        }
    }

    // === assemble_unit tests ===

    #[test]
    fn assemble_unit_orders_sections() {
        let unit = assemble_unit(&[], &DependencySet::new(), &GeneratorConfig::default());

        let interfaces: Vec<_> = unit.interfaces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(interfaces, vec!["BaseObj", "RequestInitType", "RequestType"]);

        let classes: Vec<_> = unit.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(classes, vec!["Request", "NestSDK"]);
        assert!(unit.imports.is_empty());
    }

    #[test]
    fn assemble_unit_exposes_each_controller() {
        let unit = assemble_unit(
            &[controller("user"), controller("order")],
            &DependencySet::new(),
            &GeneratorConfig::default(),
        );
        let sdk = unit.class("NestSDK").unwrap();

        assert_eq!(sdk.extends.as_deref(), Some("Request"));
        assert!(matches!(sdk.members[0], ClassMember::Constructor(_)));

        let private = sdk.property("_user").unwrap();
        assert_eq!(private.visibility, Visibility::Private);
        assert!(matches!(private.initializer, Some(Expr::Object(_))));

        let public = sdk.property("user").unwrap();
        assert!(public.readonly);
        assert_eq!(public.initializer, Some(Expr::Raw("this._user".to_string())));

        let names: Vec<_> = sdk
            .members
            .iter()
            .filter_map(|m| match m {
                ClassMember::Property(p) => Some(p.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["_user", "user", "_order", "order"]);
    }

    #[test]
    fn assemble_unit_groups_imports_by_module() {
        let mut deps = DependencySet::new();
        deps.insert("./zodExt/Application", "ApplicationZodCreate");
        deps.insert("./zod", "ApplicationDto");
        deps.insert("./zodExt/Application", "ApplicationDtoCreate");

        let unit = assemble_unit(&[], &deps, &GeneratorConfig::default());
        assert_eq!(
            unit.imports,
            vec![
                ImportDecl {
                    module: "./zod".to_string(),
                    symbols: vec!["ApplicationDto".to_string()],
                },
                ImportDecl {
                    module: "./zodExt/Application".to_string(),
                    symbols: vec![
                        "ApplicationDtoCreate".to_string(),
                        "ApplicationZodCreate".to_string()
                    ],
                },
            ]
        );
    }

    #[test]
    fn assemble_unit_uses_configured_names() {
        let config = GeneratorConfig {
            client_name: "ShopClient".to_string(),
            base_class_name: "HttpBase".to_string(),
            ..GeneratorConfig::default()
        };
        let unit = assemble_unit(&[], &DependencySet::new(), &config);

        assert!(unit.class("HttpBase").is_some());
        assert_eq!(
            unit.class("ShopClient").and_then(|c| c.extends.as_deref()),
            Some("HttpBase")
        );
    }

    // === validate_code tests ===

    #[test]
    fn validate_code_accepts_balanced_code() {
        assert!(validate_code("function a(b: string[]) { return { c: [b] }; }").is_ok());
    }

    #[test]
    fn validate_code_skips_strings_comments_and_templates() {
        let code = r#"
            // unmatched ) in a comment
            /* and { here */
            const a = '}' + "(" + 'it\'s';
            const b = `${a.map((x) => `${x}}`)}`;
        "#;
        assert!(validate_code(code).is_ok());
    }

    #[test]
    fn validate_code_rejects_unbalanced_code() {
        let result = validate_code("class A {\n  m() {\n}\n");
        match result {
            Err(GeneratorError::CodeGenError(msg)) => assert!(msg.contains("line 1"), "{}", msg),
            other => panic!("Expected CodeGenError, got {:?}", other),
        }

        assert!(validate_code("f(]").is_err());
        assert!(validate_code("const s = 'open;\n").is_err());
        assert!(validate_code("const t = `open").is_err());
        assert!(validate_code("/* open").is_err());
    }

    // === write_atomic tests ===

    #[test]
    fn write_atomic_creates_file_and_parents() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nested/deep/sdk.ts");

        write_atomic(&file_path, "// content").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "// content");
        let entries: Vec<_> = fs::read_dir(file_path.parent().unwrap()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn write_atomic_accepts_tmp_extension() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("sdk.tmp");
        fs::write(&file_path, "// old").unwrap();

        write_atomic(&file_path, "// new").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "// new");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn write_atomic_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("sdk.ts");
        fs::write(&file_path, "// old").unwrap();

        write_atomic(&file_path, "// new").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "// new");
    }

    // === generate tests ===

    #[test]
    fn generate_renders_valid_client() {
        let document = ApiDocument::from_json_str(DOC).unwrap();
        let generation = generate(&document, &GeneratorConfig::default()).unwrap();

        assert_eq!(generation.controller_count, 2);
        assert_eq!(generation.method_count, 3);
        assert!(generation.code.starts_with(&format!("// {}\n// Source: Demo 1.0\n", GENERATED_NOTICE)));
        assert!(generation.code.contains("import { ApplicationDto } from './zod';"));
        assert!(generation.code.contains("export class NestSDK extends Request {"));
        // /users/{id} declares no parameters
        assert_eq!(generation.diagnostics.len(), 1);
    }

    #[test]
    fn generate_keeps_multi_line_title_in_comments() {
        let document = ApiDocument::from_json_str(
            r#"{ "info": { "title": "Shop API\nInternal build", "version": "1" }, "paths": {} }"#,
        )
        .unwrap();
        let code = generate(&document, &GeneratorConfig::default()).unwrap().code;

        assert!(code.contains("// Source: Shop API\n// Internal build 1\n"), "{}", code);
        assert!(code.lines().all(|line| !line.starts_with("Internal")));
    }

    #[test]
    fn strict_abort_reports_earlier_diagnostics() {
        let document = ApiDocument::from_json_str(
            r#"{
                "paths": {
                    "/a": {
                        "patch": { "operationId": "a_patch" },
                        "get": {
                            "operationId": "a_get",
                            "parameters": [{ "name": "x-tenant", "in": "header", "schema": { "type": "string" } }]
                        }
                    },
                    "/b": { "get": { "operationId": "broken" } }
                }
            }"#,
        )
        .unwrap();
        let config = GeneratorConfig {
            on_invalid_operation_id: InvalidOperationIdPolicy::Abort,
            ..GeneratorConfig::default()
        };

        match generate(&document, &config) {
            Err(GeneratorError::InvalidOperationId {
                path, diagnostics, ..
            }) => {
                assert_eq!(path, "/b");
                assert!(diagnostics.iter().any(|d| matches!(
                    d,
                    Diagnostic::UnsupportedVerb { verb, .. } if verb == "patch"
                )));
                assert!(diagnostics.iter().any(|d| matches!(
                    d,
                    Diagnostic::SkippedParameter { name, .. } if name == "x-tenant"
                )));
                assert_eq!(diagnostics.count(Severity::Error), 1);
            }
            other => panic!("Expected InvalidOperationId, got {:?}", other.map(|g| g.code)),
        }
    }

    #[test]
    fn generate_rejects_invalid_config() {
        let document = ApiDocument::from_json_str(DOC).unwrap();
        let config = GeneratorConfig {
            client_name: "not valid".to_string(),
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            generate(&document, &config),
            Err(GeneratorError::ConfigError(_))
        ));
    }

    // === generate_and_write tests ===

    #[test]
    fn generate_and_write_dry_run_creates_no_file() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_doc(&temp_dir, DOC);
        let output = temp_dir.path().join("sdk.ts");

        let generation =
            generate_and_write(&input, &output, &GeneratorConfig::default(), true).unwrap();

        assert!(generation.code.contains("readonly application"));
        assert!(!output.exists());
    }

    #[test]
    fn generate_and_write_file_matches_returned_code() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_doc(&temp_dir, DOC);
        let output = temp_dir.path().join("out/sdk.ts");

        let generation =
            generate_and_write(&input, &output, &GeneratorConfig::default(), false).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), generation.code);
    }

    #[test]
    fn failed_run_leaves_previous_output_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_doc(
            &temp_dir,
            r#"{ "paths": { "/x": { "get": { "operationId": "broken" } } } }"#,
        );
        let output = temp_dir.path().join("sdk.ts");
        fs::write(&output, "// previous").unwrap();

        let config = GeneratorConfig {
            on_invalid_operation_id: InvalidOperationIdPolicy::Abort,
            ..GeneratorConfig::default()
        };
        let result = generate_and_write(&input, &output, &config, false);

        assert!(matches!(result, Err(GeneratorError::InvalidOperationId { .. })));
        assert_eq!(fs::read_to_string(&output).unwrap(), "// previous");
    }

    #[test]
    fn missing_input_is_a_document_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = generate_and_write(
            &temp_dir.path().join("missing.json"),
            &temp_dir.path().join("sdk.ts"),
            &GeneratorConfig::default(),
            false,
        );
        assert!(matches!(result, Err(GeneratorError::Document(_))));
    }
}
