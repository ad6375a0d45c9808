//! Schema reference resolution and import bookkeeping.
//!
//! A `$ref` such as `#/components/schemas/ApplicationDtoCreate` becomes the
//! model name `ApplicationDtoCreate`. The model is then bucketed into the
//! module that exports it, using the value-object suffix convention:
//!
//! | Model | Rule | Module (defaults) |
//! |-------|------|-------------------|
//! | `ApplicationDto` | ends with the suffix | `./zod` |
//! | `ApplicationDtoCreate` | suffix followed by more characters | `./zodExt/Application` |
//! | `Application` | neither | not imported |
//!
//! Each model may have a validator: the same name with the value-object
//! suffix replaced by the validator suffix (`ApplicationZodCreate`), exported
//! from the same module.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::config::{ModelConvention, is_identifier};

/// Symbols to import, grouped by module.
///
/// Modules and symbols are kept sorted so the rendered import block does not
/// depend on the order operations were visited in. Adding a pair that is
/// already present is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    modules: BTreeMap<String, BTreeSet<String>>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `symbol` to the imports of `module`.
    ///
    /// Returns `true` if the pair was not present before.
    pub fn insert(&mut self, module: &str, symbol: &str) -> bool {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(symbol.to_string())
    }

    pub fn contains(&self, module: &str, symbol: &str) -> bool {
        self.modules
            .get(module)
            .is_some_and(|symbols| symbols.contains(symbol))
    }

    /// Symbols imported from `module`.
    pub fn get(&self, module: &str) -> Option<&BTreeSet<String>> {
        self.modules.get(module)
    }

    /// Iterates modules in sorted order with their symbols.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.modules.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Total number of (module, symbol) pairs.
    pub fn symbol_count(&self) -> usize {
        self.modules.values().map(BTreeSet::len).sum()
    }
}

/// A model classified into its exporting module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelImport {
    pub model: String,
    pub module: String,
    /// Name of the model's validator, when the convention defines one.
    pub validator: Option<String>,
}

/// Derives a model name from a schema reference.
///
/// Returns the final `/`-separated segment, or an empty string when the
/// reference has no recognisable structure. Never fails.
///
/// ## Examples
///
/// ```
/// use nestsdk_gen::resolver::resolve_ref;
///
/// assert_eq!(resolve_ref("#/components/schemas/ApplicationDto"), "ApplicationDto");
/// assert_eq!(resolve_ref("#/definitions/User"), "User");
/// assert_eq!(resolve_ref("ApplicationDto"), "");
/// assert_eq!(resolve_ref("#/components/schemas/"), "");
/// ```
pub fn resolve_ref(reference: &str) -> String {
    match reference.rsplit_once('/') {
        Some((_, segment)) if is_identifier(segment) => segment.to_string(),
        _ => String::new(),
    }
}

/// Classifies a model name by the value-object suffix convention.
///
/// Returns `None` for names matching neither rule.
///
/// ## Examples
///
/// ```
/// use nestsdk_gen::config::ModelConvention;
/// use nestsdk_gen::resolver::classify_model;
///
/// let convention = ModelConvention::default();
///
/// let shared = classify_model("ApplicationDto", &convention).unwrap();
/// assert_eq!(shared.module, "./zod");
/// assert_eq!(shared.validator.as_deref(), Some("ApplicationZod"));
///
/// let ext = classify_model("ApplicationDtoCreate", &convention).unwrap();
/// assert_eq!(ext.module, "./zodExt/Application");
/// assert_eq!(ext.validator.as_deref(), Some("ApplicationZodCreate"));
///
/// assert!(classify_model("Application", &convention).is_none());
/// ```
pub fn classify_model(model: &str, convention: &ModelConvention) -> Option<ModelImport> {
    let suffix = convention.value_object_suffix.as_str();
    if suffix.is_empty() || model.is_empty() {
        return None;
    }

    let (module, validator) = if let Some(prefix) = model.strip_suffix(suffix) {
        (
            convention.shared_module.clone(),
            validator_for(prefix, "", convention),
        )
    } else {
        let index = model.find(suffix)?;
        let prefix = &model[..index];
        if prefix.is_empty() {
            return None;
        }
        let rest = &model[index + suffix.len()..];
        (
            format!("{}{}", convention.extension_module_prefix, prefix),
            validator_for(prefix, rest, convention),
        )
    };

    Some(ModelImport {
        model: model.to_string(),
        module,
        validator,
    })
}

fn validator_for(prefix: &str, rest: &str, convention: &ModelConvention) -> Option<String> {
    if convention.validator_suffix.is_empty() {
        return None;
    }
    Some(format!("{}{}{}", prefix, convention.validator_suffix, rest))
}

/// Records a model as an import dependency.
///
/// Returns the classification, or `None` when the model matches no
/// convention (nothing is recorded; the caller reports it).
pub fn record_dependency(
    deps: &mut DependencySet,
    model: &str,
    convention: &ModelConvention,
) -> Option<ModelImport> {
    let import = classify_model(model, convention)?;
    if deps.insert(&import.module, &import.model) {
        debug!(model = %import.model, module = %import.module, "recorded import");
    }
    Some(import)
}
