//! Configuration for the Object Types module.
//!
//! The registration list replaces runtime metadata scanning: every object type
//! known to the platform is declared here (or registered in code) before the
//! catalog is frozen.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use object_types_sdk::{TypeDescriptor, WellKnownTypes};
use serde::{Deserialize, Serialize};

/// Prefix of environment variables overriding file configuration.
pub const ENV_PREFIX: &str = "OBJECT_TYPES__";

/// Configuration error for loading the registration list.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to load object types config: {0}")]
    Load(#[source] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Load(Box::new(e))
    }
}

/// Configuration for the Object Types module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ObjectTypesConfig {
    /// Names of the built-in site and system-root types.
    pub well_known: WellKnownTypes,

    /// Startup registrations, applied in order (later entries win).
    pub registrations: Vec<TypeRegistration>,

    /// Descriptor templates for dynamically-named types.
    pub dynamic_types: Vec<DynamicTypeTemplate>,
}

/// One entry of the startup registration list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeRegistration {
    /// Object type name.
    #[serde(default)]
    pub name: String,

    /// Name of the entity implementation backing the type.
    #[serde(default)]
    pub backing_type: String,

    /// Type metadata; a missing descriptor is a configuration error.
    #[serde(default)]
    pub descriptor: Option<TypeDescriptor>,
}

/// Descriptor template for types named at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DynamicTypeTemplate {
    /// Case-insensitive name prefix, e.g. `cms.document.`.
    pub prefix: String,

    /// Descriptor used for every matching name; `object_type` is replaced.
    #[serde(default)]
    pub descriptor: TypeDescriptor,
}

impl ObjectTypesConfig {
    /// Loads the configuration from a YAML file, then applies
    /// `OBJECT_TYPES__*` environment overrides (`__` separates nested keys).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file does not exist and
    /// `ConfigError::Load` if the merged configuration does not match the schema.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let config = Figment::from(Serialized::defaults(Self::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(config)
    }

    /// Parses the configuration from a YAML string without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if the document does not match the schema.
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        let config = Figment::from(Serialized::defaults(Self::default()))
            .merge(Yaml::string(source))
            .extract()?;
        Ok(config)
    }
}
