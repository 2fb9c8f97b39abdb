use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    env, fs,
    io::{self, ErrorKind},
    marker::PhantomData,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::{
    defaults::CONFIG_FILE_NAME,
    package::{DescriptorError, PackageDescriptor},
    package_type::PackageType,
};

/// Represents the raw configuration file content
#[derive(Debug, Clone)]
pub struct ConfigFile<T> {
    content: Cow<'static, str>,
    _marker: PhantomData<T>,
    pub path: PathBuf,
}
impl<T> AsRef<str> for ConfigFile<T> {
    fn as_ref(&self) -> &str {
        &self.content
    }
}

/// Errors that can occur during configuration handling
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error parsing JSON content
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Error parsing TOML content
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// File extension is neither json nor toml
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// Document parsed but does not have the expected shape
    #[error("Invalid configuration document: {0}")]
    InvalidDocument(String),

    /// A package entry could not be decoded
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// Document syntax of a configuration file, derived from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") | None => Ok(ConfigFormat::Json),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some(other) => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Parses TOML content into a JSON node
///
/// Datetimes become their RFC 3339 string form. Non-finite floats have no
/// JSON form and are rejected.
pub fn toml_document(content: &str) -> Result<serde_json::Value, ConfigError> {
    let document = content.parse::<toml::Table>()?;
    toml_to_json(toml::Value::Table(document))
}

fn toml_to_json(value: toml::Value) -> Result<serde_json::Value, ConfigError> {
    Ok(match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| ConfigError::InvalidDocument(format!("float {} has no JSON form", f)))?,
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(datetime) => serde_json::Value::String(datetime.to_string()),
        toml::Value::Array(items) => serde_json::Value::Array(
            items
                .into_iter()
                .map(toml_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(key, value)| Ok((key, toml_to_json(value)?)))
                .collect::<Result<serde_json::Map<_, _>, ConfigError>>()?,
        ),
    })
}

pub trait ConfigType {
    fn default_config_path() -> &'static str;
}

impl<T: ConfigType> ConfigFile<T> {
    /// Loads configuration from the specified location or the current directory
    ///
    /// # Arguments
    ///
    /// * `config_path` - Optional path to configuration file or directory
    ///
    /// # Returns
    ///
    /// * `Result<ConfigFile<T>, ConfigError>` - The loaded configuration or an error
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let path = Self::resolve_config_path(config_path)?;
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(&path).map_err(ConfigError::Io)?;
        Ok(ConfigFile {
            content: Cow::Owned(content),
            _marker: PhantomData,
            path,
        })
    }

    /// Wraps already loaded content, e.g. a document received from another tool
    pub fn from_content(content: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        ConfigFile {
            content: Cow::Owned(content.into()),
            _marker: PhantomData,
            path: path.into(),
        }
    }

    /// Resolves the configuration file path
    fn resolve_config_path(config_path: Option<String>) -> Result<PathBuf, ConfigError> {
        let path = match config_path {
            Some(location) => {
                let path = PathBuf::from(location);
                if path.is_dir() {
                    path.join(T::default_config_path())
                } else {
                    path
                }
            }
            None => env::current_dir()
                .map_err(ConfigError::Io)?
                .join(T::default_config_path()),
        };

        if !path.exists() {
            return Err(ConfigError::Io(io::Error::new(
                ErrorKind::NotFound,
                format!("Path does not exist: {}", path.display()),
            )));
        }

        Ok(path)
    }

    /// Parses the configuration content into the generic type T
    ///
    /// The syntax is picked from the file extension: `.toml` is read as TOML,
    /// `.json` or no extension as JSON. TOML goes through [`toml_document`]
    /// first, so both syntaxes reach `T` as the same JSON shape.
    ///
    /// # Returns
    ///
    /// * `Result<T, ConfigError>` - The parsed configuration or an error
    pub fn parse(self) -> Result<T, ConfigError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        match ConfigFormat::from_path(&self.path)? {
            ConfigFormat::Json => serde_json::from_str::<T>(&self.content).map_err(ConfigError::from),
            ConfigFormat::Toml => {
                serde_json::from_value::<T>(toml_document(&self.content)?).map_err(ConfigError::from)
            }
        }
    }

    /// Convenience method to load and parse in one operation
    ///
    /// # Arguments
    ///
    /// * `config_path` - Optional path to configuration file or directory
    ///
    /// # Returns
    ///
    /// * `Result<T, ConfigError>` - The parsed configuration or an error
    pub fn load_and_parse(config_path: Option<String>) -> Result<T, ConfigError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        Self::load(config_path)?.parse()
    }
}

/// List of packages produced by a build
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct PackageConfig {
    #[serde(default)]
    pub packages: Vec<PackageDescriptor>,
}
impl ConfigType for PackageConfig {
    fn default_config_path() -> &'static str {
        CONFIG_FILE_NAME
    }
}

impl PackageConfig {
    /// Loads the package list, decoding every entry with the typed descriptor errors
    ///
    /// Unlike [`ConfigFile::parse`], a malformed package entry is reported as
    /// [`ConfigError::Descriptor`] rather than as a parser message.
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let file = ConfigFile::<PackageConfig>::load(config_path)?;
        let document: serde_json::Value = match ConfigFormat::from_path(&file.path)? {
            ConfigFormat::Json => serde_json::from_str(file.as_ref())?,
            ConfigFormat::Toml => toml_document(file.as_ref())?,
        };
        let config = Self::from_document(document)?;
        if config.packages.is_empty() {
            warn!("No packages declared in {}", file.path.display());
        }
        Ok(config)
    }

    fn from_document(document: serde_json::Value) -> Result<Self, ConfigError> {
        let entries = match document {
            serde_json::Value::Object(mut fields) => fields.remove("packages"),
            _ => {
                return Err(ConfigError::InvalidDocument(
                    "top level of a package configuration must be an object".to_string(),
                ))
            }
        };
        let packages = match entries {
            Some(serde_json::Value::Array(entries)) => entries
                .into_iter()
                .map(PackageDescriptor::from_value)
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(ConfigError::InvalidDocument(
                    "'packages' must be an array".to_string(),
                ))
            }
            None => Vec::new(),
        };
        debug!("Decoded {} package(s)", packages.len());
        Ok(PackageConfig { packages })
    }

    /// First package whose name template equals `name_template`
    pub fn find(&self, name_template: &str) -> Option<&PackageDescriptor> {
        self.packages
            .iter()
            .find(|package| package.name_template() == name_template)
    }

    pub fn by_type(&self, package_type: PackageType) -> impl Iterator<Item = &PackageDescriptor> {
        self.packages
            .iter()
            .filter(move |package| package.package_type() == package_type)
    }
}
