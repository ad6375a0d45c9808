//! The request-dispatch scaffold emitted into every generated client.
//!
//! Generated methods depend on this contract:
//!
//! - the base class holds an `origin` and a pluggable transport (`request`),
//!   defaulting to `_fetch_`, which calls `fetch` and parses the JSON body;
//! - `init(options)` replaces both, never merging with earlier calls;
//! - `sendRequest(options)` substitutes `{name}` placeholders from `query`
//!   via `replacePathParams`, prefixes the origin, forwards the remaining
//!   query entries to the transport and returns its result unchanged.

use crate::ir::{
    Body, ClassDecl, ClassMember, ConstructorDecl, Expr, FieldDecl, FunctionDecl, IndexSignature,
    InterfaceDecl, MethodDecl, ParamDecl, PropertyDecl, TypeExpr, TypeParam, Visibility,
};

/// Generic key-value container.
pub const BASE_OBJ: &str = "BaseObj";
/// Options accepted by the constructor and `init`.
pub const REQUEST_INIT_TYPE: &str = "RequestInitType";
/// Options of a single request.
pub const REQUEST_TYPE: &str = "RequestType";
/// Default transport function.
pub const DEFAULT_TRANSPORT: &str = "_fetch_";
/// Shared dispatch method every generated method delegates to.
pub const DISPATCH_METHOD: &str = "sendRequest";

/// Member names of the base class. A controller with one of these names
/// would shadow the scaffold.
pub const RESERVED_MEMBERS: &[&str] = &["constructor", "init", "sendRequest", "origin", "request"];

/// `Partial<RequestInitType>`
pub fn init_options_type() -> TypeExpr {
    TypeExpr::generic("Partial", vec![TypeExpr::named(REQUEST_INIT_TYPE)])
}

fn doc(line: &str) -> Vec<String> {
    vec![line.to_string()]
}

fn lines(source: &[&str]) -> Body {
    Body::Statements(source.iter().map(|line| line.to_string()).collect())
}

/// Shared interfaces, in declaration order.
pub fn shared_interfaces() -> Vec<InterfaceDecl> {
    let method_union = TypeExpr::Union(
        ["get", "post", "put", "delete"]
            .iter()
            .map(|verb| TypeExpr::StringLiteral(verb.to_string()))
            .collect(),
    );

    vec![
        InterfaceDecl {
            name: BASE_OBJ.to_string(),
            docs: doc("Generic key-value container"),
            type_params: vec![TypeParam::new("T").with_default(TypeExpr::any())],
            index_signature: Some(IndexSignature {
                key_name: "key".to_string(),
                key_ty: TypeExpr::named("string"),
                value_ty: TypeExpr::named("T"),
            }),
            fields: Vec::new(),
            exported: true,
        },
        InterfaceDecl {
            name: REQUEST_INIT_TYPE.to_string(),
            docs: doc("Options accepted by the client constructor and init()"),
            type_params: Vec::new(),
            index_signature: None,
            fields: vec![
                FieldDecl::new("origin", TypeExpr::named("string"))
                    .optional()
                    .with_doc("Base URL prepended to every request path"),
                FieldDecl::new("request", TypeExpr::TypeOf(DEFAULT_TRANSPORT.to_string()))
                    .with_doc("Custom transport function, defaults to fetch"),
            ],
            exported: true,
        },
        InterfaceDecl {
            name: REQUEST_TYPE.to_string(),
            docs: doc("Options of a single request"),
            type_params: Vec::new(),
            index_signature: None,
            fields: vec![
                FieldDecl::new("method", method_union).with_doc("HTTP method"),
                FieldDecl::new("path", TypeExpr::named("string"))
                    .with_doc("Request path, placeholders included"),
                FieldDecl::new("query", TypeExpr::named(BASE_OBJ))
                    .optional()
                    .with_doc("Path and query parameters"),
                FieldDecl::new("data", TypeExpr::any())
                    .optional()
                    .with_doc("Request body"),
                FieldDecl::new(
                    "headers",
                    TypeExpr::generic(BASE_OBJ, vec![TypeExpr::named("string")]),
                )
                .optional()
                .with_doc("Request headers"),
            ],
            exported: true,
        },
    ]
}

/// Shared functions: default transport and path helpers.
pub fn shared_functions() -> Vec<FunctionDecl> {
    let t_any = || vec![TypeParam::new("T").with_default(TypeExpr::any())];
    let optional_query = || ParamDecl::new("query", TypeExpr::named(BASE_OBJ)).optional();

    vec![
        FunctionDecl {
            name: DEFAULT_TRANSPORT.to_string(),
            docs: vec![
                "Default transport".to_string(),
                "Sends the request with fetch and parses the JSON response body".to_string(),
            ],
            is_async: true,
            type_params: t_any(),
            params: vec![ParamDecl::new("options", TypeExpr::named(REQUEST_TYPE))],
            return_type: Some(TypeExpr::generic("Promise", vec![TypeExpr::named("T")])),
            body: lines(&[
                "const headers: BaseObj<string> = { ...options.headers };",
                "const init: RequestInit = { method: options.method.toUpperCase(), headers };",
                "if (options.data !== undefined) {",
                "  headers['Content-Type'] = headers['Content-Type'] || 'application/json';",
                "  init.body = JSON.stringify(options.data);",
                "}",
                "const search = new URLSearchParams();",
                "const query = options.query || {};",
                "Object.keys(query).forEach((key) => {",
                "  const value = query[key];",
                "  const items: unknown[] = Array.isArray(value) ? value : [value];",
                "  items.forEach((item) => {",
                "    if (item !== undefined && item !== null) search.append(key, String(item));",
                "  });",
                "});",
                "const qs = search.toString();",
                "const res = await fetch(qs ? `${options.path}?${qs}` : options.path, init);",
                "const result: T = await res.json();",
                "return result;",
            ]),
            exported: false,
        },
        FunctionDecl {
            name: "replacePathParams".to_string(),
            docs: vec![
                "Replaces `{name}` placeholders in a path with values from query".to_string(),
                "Placeholders without a string or number value are left as they are".to_string(),
                "@example replacePathParams('/page-node/{typeId}/{id}', { id: 1, typeId: 2 }) => '/page-node/2/1'"
                    .to_string(),
            ],
            is_async: false,
            type_params: Vec::new(),
            params: vec![
                ParamDecl::new("path", TypeExpr::named("string")),
                optional_query(),
            ],
            return_type: Some(TypeExpr::named("string")),
            body: lines(&[
                "const values = query || {};",
                r"return path.replace(new RegExp('\\{([^}]+)\\}', 'g'), (match: string, param: string) => {",
                "  const value = values[param];",
                "  if (value === undefined) return match;",
                "  if (typeof value !== 'number' && typeof value !== 'string') {",
                "    console.warn(`path parameter ${param} must be a string or number`, values);",
                "    return match;",
                "  }",
                "  return String(value);",
                "});",
            ]),
            exported: false,
        },
        FunctionDecl {
            name: "omitPathParams".to_string(),
            docs: doc("Returns the query entries not consumed by a path placeholder"),
            is_async: false,
            type_params: Vec::new(),
            params: vec![
                ParamDecl::new("path", TypeExpr::named("string")),
                optional_query(),
            ],
            return_type: Some(TypeExpr::Union(vec![
                TypeExpr::named(BASE_OBJ),
                TypeExpr::named("undefined"),
            ])),
            body: lines(&[
                "if (!query) return undefined;",
                "const source: BaseObj = query;",
                "const rest: BaseObj = {};",
                "Object.keys(source).forEach((key) => {",
                "  if (!path.includes(`{${key}}`)) rest[key] = source[key];",
                "});",
                "return rest;",
            ]),
            exported: false,
        },
    ]
}

/// The request-dispatch base class.
pub fn base_class(name: &str) -> ClassDecl {
    ClassDecl {
        name: name.to_string(),
        docs: doc("Request dispatch base class"),
        exported: true,
        extends: None,
        members: vec![
            ClassMember::Property(PropertyDecl {
                name: "origin".to_string(),
                docs: doc("Base URL prepended to every request path"),
                visibility: Visibility::Private,
                readonly: false,
                optional: true,
                ty: Some(TypeExpr::named("string")),
                initializer: None,
            }),
            ClassMember::Property(PropertyDecl {
                name: "request".to_string(),
                docs: doc("Transport function"),
                visibility: Visibility::Private,
                readonly: false,
                optional: false,
                ty: Some(TypeExpr::TypeOf(DEFAULT_TRANSPORT.to_string())),
                initializer: Some(Expr::Raw(DEFAULT_TRANSPORT.to_string())),
            }),
            ClassMember::Constructor(ConstructorDecl {
                params: vec![ParamDecl::new("options", init_options_type()).optional()],
                body: vec!["if (options) this.init(options);".to_string()],
            }),
            ClassMember::Method(MethodDecl {
                name: "init".to_string(),
                docs: doc("Configures origin and transport, replacing any previous configuration"),
                visibility: Visibility::Public,
                is_async: false,
                type_params: Vec::new(),
                params: vec![ParamDecl::new("options", init_options_type())],
                return_type: Some(TypeExpr::named("void")),
                body: lines(&[
                    "this.origin = options.origin;",
                    "this.request = options.request || _fetch_;",
                ]),
            }),
            ClassMember::Method(MethodDecl {
                name: DISPATCH_METHOD.to_string(),
                docs: doc("Sends a request through the configured transport"),
                visibility: Visibility::Protected,
                is_async: true,
                type_params: vec![TypeParam::new("T").with_default(TypeExpr::any())],
                params: vec![ParamDecl::new("options", TypeExpr::named(REQUEST_TYPE))],
                return_type: Some(TypeExpr::generic("Promise", vec![TypeExpr::named("T")])),
                body: lines(&[
                    "const path = replacePathParams(options.path, options.query);",
                    "return this.request<T>({",
                    "  ...options,",
                    "  path: `${this.origin ?? ''}${path}`,",
                    "  query: omitPathParams(options.path, options.query),",
                    "});",
                ]),
            }),
        ],
    }
}
