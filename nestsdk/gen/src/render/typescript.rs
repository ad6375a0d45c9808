//! TypeScript source renderer.

use super::{CodeWriter, Renderer};
use crate::config::is_identifier;
use crate::ir::{
    Body, ClassDecl, ClassMember, ConstructorDecl, DispatchCall, Expr, FieldDecl, FunctionDecl,
    GeneratedUnit, ImportDecl, InterfaceDecl, MethodDecl, ObjectMethod, ParamDecl, PropertyDecl,
    TypeExpr, TypeParam, Visibility,
};
use crate::scaffold::DISPATCH_METHOD;

const INDENT: &str = "  ";

/// Renders a [`GeneratedUnit`] as a single TypeScript module.
///
/// Output order is fixed: header comment, imports, interfaces, functions,
/// classes. Two-space indentation, single-quoted strings, semicolons.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeScriptRenderer;

impl TypeScriptRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for TypeScriptRenderer {
    fn render(&self, unit: &GeneratedUnit) -> String {
        let mut w = CodeWriter::new(INDENT);

        for line in unit.header.iter().flat_map(|entry| text_lines(entry)) {
            if line.is_empty() {
                w.line("//");
            } else {
                w.line(&format!("// {}", line));
            }
        }
        w.blank();

        for import in &unit.imports {
            write_import(&mut w, import);
        }
        w.blank();

        for interface in &unit.interfaces {
            write_interface(&mut w, interface);
            w.blank();
        }

        for function in &unit.functions {
            write_function(&mut w, function);
            w.blank();
        }

        for class in &unit.classes {
            write_class(&mut w, class);
            w.blank();
        }

        w.finish()
    }
}

// === declarations ===

fn write_import(w: &mut CodeWriter, import: &ImportDecl) {
    w.line(&format!(
        "import {{ {} }} from {};",
        import.symbols.join(", "),
        string_literal(&import.module)
    ));
}

fn write_interface(w: &mut CodeWriter, interface: &InterfaceDecl) {
    write_docs(w, &interface.docs);
    w.line(&format!(
        "{}interface {}{} {{",
        export_prefix(interface.exported),
        interface.name,
        type_params(&interface.type_params)
    ));
    w.indent();
    if let Some(index) = &interface.index_signature {
        w.line(&format!(
            "[{}: {}]: {};",
            index.key_name,
            type_expr(&index.key_ty, &w.prefix()),
            type_expr(&index.value_ty, &w.prefix())
        ));
    }
    for field in &interface.fields {
        write_field(w, field);
    }
    w.dedent();
    w.line("}");
}

fn write_field(w: &mut CodeWriter, field: &FieldDecl) {
    write_docs(w, &field.docs);
    w.line(&format!("{};", field_signature(field, &w.prefix())));
}

fn write_function(w: &mut CodeWriter, function: &FunctionDecl) {
    write_docs(w, &function.docs);
    w.line(&format!(
        "{}{}function {}{}({}){} {{",
        export_prefix(function.exported),
        async_prefix(function.is_async),
        function.name,
        type_params(&function.type_params),
        params(&function.params, &w.prefix()),
        return_annotation(function.return_type.as_ref(), &w.prefix())
    ));
    write_body(w, &function.body);
    w.line("}");
}

fn write_class(w: &mut CodeWriter, class: &ClassDecl) {
    write_docs(w, &class.docs);
    let extends = class
        .extends
        .as_ref()
        .map(|base| format!(" extends {}", base))
        .unwrap_or_default();
    w.line(&format!(
        "{}class {}{} {{",
        export_prefix(class.exported),
        class.name,
        extends
    ));
    w.indent();
    for (i, member) in class.members.iter().enumerate() {
        if i > 0 {
            w.blank();
        }
        match member {
            ClassMember::Constructor(ctor) => write_constructor(w, ctor),
            ClassMember::Property(property) => write_property(w, property),
            ClassMember::Method(method) => write_method(w, method),
        }
    }
    w.dedent();
    w.line("}");
}

fn write_constructor(w: &mut CodeWriter, ctor: &ConstructorDecl) {
    w.line(&format!("constructor({}) {{", params(&ctor.params, &w.prefix())));
    w.indent();
    for line in &ctor.body {
        w.line(line);
    }
    w.dedent();
    w.line("}");
}

fn write_property(w: &mut CodeWriter, property: &PropertyDecl) {
    write_docs(w, &property.docs);

    let mut head = visibility_prefix(property.visibility).to_string();
    if property.readonly {
        head.push_str("readonly ");
    }
    head.push_str(&property.name);
    if property.optional {
        head.push('?');
    }
    if let Some(ty) = &property.ty {
        head.push_str(": ");
        head.push_str(&type_expr(ty, &w.prefix()));
    }

    match &property.initializer {
        None => w.line(&format!("{};", head)),
        Some(Expr::Raw(expr)) => w.line(&format!("{} = {};", head, expr)),
        Some(Expr::Object(methods)) => {
            w.line(&format!("{} = {{", head));
            w.indent();
            for (i, method) in methods.iter().enumerate() {
                if i > 0 {
                    w.blank();
                }
                write_object_method(w, method);
            }
            w.dedent();
            w.line("};");
        }
    }
}

fn write_method(w: &mut CodeWriter, method: &MethodDecl) {
    write_docs(w, &method.docs);
    w.line(&format!(
        "{}{}{}{}({}){} {{",
        visibility_prefix(method.visibility),
        async_prefix(method.is_async),
        method.name,
        type_params(&method.type_params),
        params(&method.params, &w.prefix()),
        return_annotation(method.return_type.as_ref(), &w.prefix())
    ));
    write_body(w, &method.body);
    w.line("}");
}

fn write_object_method(w: &mut CodeWriter, method: &ObjectMethod) {
    write_docs(w, &method.docs);
    w.line(&format!(
        "{}: ({}) => {{",
        property_name(&method.name),
        params(&method.params, &w.prefix())
    ));
    write_body(w, &method.body);
    w.line("},");
}

// === bodies ===

fn write_body(w: &mut CodeWriter, body: &Body) {
    w.indent();
    match body {
        Body::Statements(lines) => {
            for line in lines {
                w.line(line);
            }
        }
        Body::Dispatch(call) => write_dispatch(w, call),
    }
    w.dedent();
}

fn write_dispatch(w: &mut CodeWriter, call: &DispatchCall) {
    if let Some(guard) = &call.guard {
        w.line(&format!(
            "if ({} && !{}.safeParse({}).success) return;",
            guard.flag, guard.validator, guard.payload
        ));
    }

    let mut fields = vec![
        format!("method: {}", string_literal(call.verb.as_str())),
        format!("path: {}", string_literal(&call.path)),
    ];
    if call.pass_query {
        fields.push("query".to_string());
    }
    if call.pass_data {
        fields.push("data".to_string());
    }

    let generic = call
        .result
        .as_ref()
        .map(|ty| format!("<{}>", type_expr(ty, &w.prefix())))
        .unwrap_or_default();

    w.line(&format!(
        "return this.{}{}({{ {} }});",
        DISPATCH_METHOD,
        generic,
        fields.join(", ")
    ));
}

// === docs ===

fn write_docs(w: &mut CodeWriter, docs: &[String]) {
    if docs.is_empty() {
        return;
    }
    w.line("/**");
    for doc in docs {
        for line in text_lines(doc) {
            let line = line.replace("*/", "*\\/");
            if line.is_empty() {
                w.line(" *");
            } else {
                w.line(&format!(" * {}", line));
            }
        }
    }
    w.line(" */");
}

// === fragments ===

/// Splits free text on every ECMAScript line terminator, so no piece can end
/// a `//` comment early. Trailing whitespace is trimmed.
fn text_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split("\r\n")
        .flat_map(|chunk| chunk.split(['\n', '\r', '\u{2028}', '\u{2029}']))
        .map(str::trim_end)
}

fn export_prefix(exported: bool) -> &'static str {
    if exported { "export " } else { "" }
}

fn async_prefix(is_async: bool) -> &'static str {
    if is_async { "async " } else { "" }
}

fn visibility_prefix(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "",
        Visibility::Protected => "protected ",
        Visibility::Private => "private ",
    }
}

fn type_params(params: &[TypeParam]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = params
        .iter()
        .map(|p| match &p.default {
            Some(default) => format!("{} = {}", p.name, type_expr(default, "")),
            None => p.name.clone(),
        })
        .collect();
    format!("<{}>", rendered.join(", "))
}

fn params(params: &[ParamDecl], prefix: &str) -> String {
    params
        .iter()
        .map(|p| {
            let mut out = p.name.clone();
            if p.optional && p.default.is_none() {
                out.push('?');
            }
            if let Some(ty) = &p.ty {
                out.push_str(": ");
                out.push_str(&type_expr(ty, prefix));
            }
            if let Some(default) = &p.default {
                out.push_str(" = ");
                out.push_str(default);
            }
            out
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn return_annotation(ty: Option<&TypeExpr>, prefix: &str) -> String {
    ty.map(|ty| format!(": {}", type_expr(ty, prefix)))
        .unwrap_or_default()
}

fn field_signature(field: &FieldDecl, prefix: &str) -> String {
    format!(
        "{}{}: {}",
        property_name(&field.name),
        if field.optional { "?" } else { "" },
        type_expr(&field.ty, prefix)
    )
}

/// Renders a type. `prefix` is the indentation of the line the type starts
/// on, used when an object type spans several lines.
fn type_expr(ty: &TypeExpr, prefix: &str) -> String {
    match ty {
        TypeExpr::Named(name) => name.clone(),
        TypeExpr::Generic(name, args) => {
            let args: Vec<String> = args.iter().map(|a| type_expr(a, prefix)).collect();
            format!("{}<{}>", name, args.join(", "))
        }
        TypeExpr::Array(inner) => match inner.as_ref() {
            TypeExpr::Union(_) => format!("({})[]", type_expr(inner, prefix)),
            _ => format!("{}[]", type_expr(inner, prefix)),
        },
        TypeExpr::Union(members) => members
            .iter()
            .map(|m| type_expr(m, prefix))
            .collect::<Vec<_>>()
            .join(" | "),
        TypeExpr::StringLiteral(value) => string_literal(value),
        TypeExpr::TypeOf(expr) => format!("typeof {}", expr),
        TypeExpr::Object(fields) => object_type(fields, prefix),
    }
}

fn object_type(fields: &[FieldDecl], prefix: &str) -> String {
    if fields.is_empty() {
        return "{}".to_string();
    }

    if fields.iter().all(|f| f.docs.is_empty()) {
        let inline: Vec<String> = fields.iter().map(|f| field_signature(f, prefix)).collect();
        return format!("{{ {} }}", inline.join("; "));
    }

    let inner = format!("{}{}", prefix, INDENT);
    let mut out = String::from("{\n");
    for field in fields {
        for doc in &field.docs {
            for line in doc.lines() {
                out.push_str(&format!("{}/** {} */\n", inner, line.replace("*/", "*\\/")));
            }
        }
        out.push_str(&format!("{}{};\n", inner, field_signature(field, &inner)));
    }
    out.push_str(prefix);
    out.push('}');
    out
}

/// Object keys that are not identifiers are quoted.
fn property_name(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        string_literal(name)
    }
}

fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}
