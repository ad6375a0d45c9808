//! Intermediate representation of the generated source file.
//!
//! Synthesis produces these declarations; a [`crate::render::Renderer`]
//! turns them into text. Keeping the two apart lets the synthesis logic be
//! tested on structure instead of on formatted strings.
//!
//! Statement bodies of shared scaffold functions are carried as source lines
//! ([`Body::Statements`]). Generated operation methods carry a structured
//! [`DispatchCall`] instead.

use nestsdk_define::HttpVerb;

/// A TypeScript type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// A named type: `string`, `ApplicationDto`, `T`.
    Named(String),
    /// A generic application: `Partial<RequestInitType>`.
    Generic(String, Vec<TypeExpr>),
    /// `T[]`
    Array(Box<TypeExpr>),
    /// `A | B`
    Union(Vec<TypeExpr>),
    /// A string literal type: `'get'`.
    StringLiteral(String),
    /// An inline object type: `{ id: number; name?: string }`.
    Object(Vec<FieldDecl>),
    /// `typeof expr`
    TypeOf(String),
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into())
    }

    pub fn any() -> Self {
        TypeExpr::named("any")
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Generic(name.into(), args)
    }
}

/// A field of an interface or inline object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub optional: bool,
    pub docs: Vec<String>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            docs: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.docs.push(doc.into());
        self
    }
}

/// A generic type parameter with an optional default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    pub default: Option<TypeExpr>,
}

impl TypeParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: TypeExpr) -> Self {
        self.default = Some(default);
        self
    }
}

/// `[key: K]: V` index signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSignature {
    pub key_name: String,
    pub key_ty: TypeExpr,
    pub value_ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub name: String,
    pub docs: Vec<String>,
    pub type_params: Vec<TypeParam>,
    pub index_signature: Option<IndexSignature>,
    pub fields: Vec<FieldDecl>,
    pub exported: bool,
}

/// A function or method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: String,
    pub ty: Option<TypeExpr>,
    pub optional: bool,
    /// Default value expression (`false`); implies optional at call sites.
    pub default: Option<String>,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            optional: false,
            default: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// The body of a function, method or arrow function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Literal source lines, indented by the renderer.
    Statements(Vec<String>),
    /// A call to the shared dispatch primitive.
    Dispatch(DispatchCall),
}

/// `return this.sendRequest<T>({ method, path, query, data })`, optionally
/// preceded by a validation guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchCall {
    pub verb: HttpVerb,
    /// Path template with `{param}` placeholders left intact.
    pub path: String,
    /// Result type annotation for the dispatch generic.
    pub result: Option<TypeExpr>,
    pub pass_query: bool,
    pub pass_data: bool,
    pub guard: Option<ValidationGuard>,
}

/// Returns early without dispatching when `validate` is set and the payload
/// fails the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationGuard {
    pub flag: String,
    pub validator: String,
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: String,
    pub docs: Vec<String>,
    pub is_async: bool,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<ParamDecl>,
    pub return_type: Option<TypeExpr>,
    pub body: Body,
    pub exported: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// An arrow function stored as a property of an object literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMethod {
    pub name: String,
    pub docs: Vec<String>,
    pub params: Vec<ParamDecl>,
    pub body: Body,
}

/// Initializer expression of a class property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A literal expression such as `_fetch_` or `this._user`.
    Raw(String),
    /// `{ name: (...) => { ... }, ... }`
    Object(Vec<ObjectMethod>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: String,
    pub docs: Vec<String>,
    pub visibility: Visibility,
    pub readonly: bool,
    pub optional: bool,
    pub ty: Option<TypeExpr>,
    pub initializer: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub docs: Vec<String>,
    pub visibility: Visibility,
    pub is_async: bool,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<ParamDecl>,
    pub return_type: Option<TypeExpr>,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDecl {
    pub params: Vec<ParamDecl>,
    pub body: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassMember {
    Constructor(ConstructorDecl),
    Property(PropertyDecl),
    Method(MethodDecl),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: String,
    pub docs: Vec<String>,
    pub exported: bool,
    pub extends: Option<String>,
    pub members: Vec<ClassMember>,
}

/// `import { A, B } from 'module';`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub module: String,
    pub symbols: Vec<String>,
}

/// One controller as produced by the synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerDecl {
    pub name: String,
    pub docs: Vec<String>,
    pub methods: Vec<ObjectMethod>,
}

/// The whole generated file, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// Plain comment lines at the top of the file.
    pub header: Vec<String>,
    pub imports: Vec<ImportDecl>,
    pub interfaces: Vec<InterfaceDecl>,
    pub functions: Vec<FunctionDecl>,
    pub classes: Vec<ClassDecl>,
}

impl GeneratedUnit {
    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.iter().find(|c| c.name == name)
    }
}

impl ClassDecl {
    pub fn property(&self, name: &str) -> Option<&PropertyDecl> {
        self.members.iter().find_map(|member| match member {
            ClassMember::Property(p) if p.name == name => Some(p),
            _ => None,
        })
    }
}
