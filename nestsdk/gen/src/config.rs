//! Generator configuration.
//!
//! Every setting has a default that matches the conventions of a NestJS
//! backend using zod DTOs, so the generator runs without any configuration
//! file. A TOML file can override any subset of settings:
//!
//! ```toml
//! client_name = "ShopSDK"
//! on_invalid_operation_id = "abort"
//!
//! [models]
//! value_object_suffix = "Dto"
//! validator_suffix = "Zod"
//! shared_module = "./zod"
//! extension_module_prefix = "./zodExt/"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::errors::GeneratorError;

/// What to do with an operation whose `operationId` cannot be split into a
/// controller and a method name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidOperationIdPolicy {
    /// Record an error diagnostic, leave the operation out, keep going.
    #[default]
    Skip,
    /// Fail the run before anything is written. The whole document is
    /// still checked, so the failure reports every diagnostic.
    Abort,
}

/// Naming convention that maps model names to the modules exporting them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConvention {
    /// Suffix marking a value object (`ApplicationDto`).
    pub value_object_suffix: String,
    /// Replaces `value_object_suffix` to name a model's validator (`ApplicationZod`).
    pub validator_suffix: String,
    /// Module exporting every plain value object.
    pub shared_module: String,
    /// Prefix of the per-entity module for extended value objects
    /// (`ApplicationDtoCreate` comes from `{prefix}Application`).
    pub extension_module_prefix: String,
}

impl Default for ModelConvention {
    fn default() -> Self {
        Self {
            value_object_suffix: "Dto".to_string(),
            validator_suffix: "Zod".to_string(),
            shared_module: "./zod".to_string(),
            extension_module_prefix: "./zodExt/".to_string(),
        }
    }
}

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Name of the exported SDK class.
    pub client_name: String,
    /// Name of the emitted request-dispatch base class.
    pub base_class_name: String,
    /// Separator between controller and method in `operationId`.
    pub operation_id_separator: String,
    pub on_invalid_operation_id: InvalidOperationIdPolicy,
    /// Doc comment used for operations without a description.
    pub missing_description: String,
    pub models: ModelConvention,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            client_name: "NestSDK".to_string(),
            base_class_name: "Request".to_string(),
            operation_id_separator: "_".to_string(),
            on_invalid_operation_id: InvalidOperationIdPolicy::Skip,
            missing_description: "No description provided".to_string(),
            models: ModelConvention::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parses a configuration from TOML text and validates it.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ConfigParse` for malformed TOML or unknown
    /// keys, and `GeneratorError::ConfigError` for invalid values.
    pub fn from_toml_str(text: &str) -> Result<Self, GeneratorError> {
        let config: GeneratorConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ConfigRead` if the file cannot be read, plus
    /// the errors of [`GeneratorConfig::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, GeneratorError> {
        let text = fs::read_to_string(path).map_err(|source| GeneratorError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks that names end up as valid TypeScript identifiers.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ConfigError` describing the first bad value.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        for (key, value) in [
            ("client_name", &self.client_name),
            ("base_class_name", &self.base_class_name),
        ] {
            if !is_identifier(value) {
                return Err(GeneratorError::ConfigError(format!(
                    "{} '{}' is not a valid identifier",
                    key, value
                )));
            }
        }

        if self.client_name == self.base_class_name {
            return Err(GeneratorError::ConfigError(format!(
                "client_name and base_class_name must differ (both '{}')",
                self.client_name
            )));
        }

        if self.operation_id_separator.is_empty() {
            return Err(GeneratorError::ConfigError(
                "operation_id_separator cannot be empty".to_string(),
            ));
        }

        let models = &self.models;
        if models.value_object_suffix.is_empty() || !is_identifier(&models.value_object_suffix) {
            return Err(GeneratorError::ConfigError(format!(
                "models.value_object_suffix '{}' must be a non-empty identifier",
                models.value_object_suffix
            )));
        }
        if !models.validator_suffix.is_empty() && !is_identifier(&models.validator_suffix) {
            return Err(GeneratorError::ConfigError(format!(
                "models.validator_suffix '{}' is not a valid identifier",
                models.validator_suffix
            )));
        }
        if models.shared_module.is_empty() {
            return Err(GeneratorError::ConfigError(
                "models.shared_module cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Returns `true` for a JavaScript identifier made of ASCII letters, digits,
/// `_` and `$`, not starting with a digit.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = GeneratorConfig::from_toml_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_given_keys() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            client_name = "ShopSDK"
            on_invalid_operation_id = "abort"

            [models]
            shared_module = "@shop/models"
            "#,
        )
        .unwrap();

        assert_eq!(config.client_name, "ShopSDK");
        assert_eq!(config.base_class_name, "Request");
        assert_eq!(config.on_invalid_operation_id, InvalidOperationIdPolicy::Abort);
        assert_eq!(config.models.shared_module, "@shop/models");
        assert_eq!(config.models.value_object_suffix, "Dto");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = GeneratorConfig::from_toml_str("clientName = \"X\"");
        assert!(matches!(result, Err(GeneratorError::ConfigParse(_))));
    }

    #[test]
    fn invalid_client_name_is_rejected() {
        let result = GeneratorConfig::from_toml_str("client_name = \"my-sdk\"");
        assert!(matches!(result, Err(GeneratorError::ConfigError(_))));
    }

    #[test]
    fn client_and_base_class_must_differ() {
        let result = GeneratorConfig::from_toml_str("client_name = \"Request\"");
        assert!(matches!(result, Err(GeneratorError::ConfigError(_))));
    }

    #[test]
    fn empty_separator_is_rejected() {
        let result = GeneratorConfig::from_toml_str("operation_id_separator = \"\"");
        assert!(matches!(result, Err(GeneratorError::ConfigError(_))));
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let result = GeneratorConfig::load(Path::new("/no/such/nestsdk.toml"));
        assert!(matches!(result, Err(GeneratorError::ConfigRead { .. })));
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("findAll"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("$store"));
        assert!(is_identifier("list_2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("find-all"));
        assert!(!is_identifier("find all"));
    }
}
