use log::debug;
use serde::{de, ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    defaults::{NAME_TEMPLATE_FIELD, PACKAGE_TYPE_FIELD, RESERVED_FIELDS},
    package_type::{PackageType, UnknownPackageType},
};

/// Errors that can occur while decoding or building a package descriptor
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// A required field is absent from the package document
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    /// A field holds a value of the wrong kind
    #[error("Field '{field}' must be {expected}, found {found}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// The `type` field names no declared package type
    #[error(transparent)]
    UnknownPackageType(#[from] UnknownPackageType),

    /// A well-known field was placed into the configuration bag
    #[error("Field '{0}' is reserved and cannot be part of the package configuration")]
    ReservedKey(String),

    /// The package document is not valid JSON
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Extension fields of a package, kept verbatim.
///
/// Never contains `name_template` or `type`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration(Map<String, Value>);

impl Configuration {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.0.iter()
    }

    pub fn keys(&self) -> serde_json::map::Keys<'_> {
        self.0.keys()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl TryFrom<Map<String, Value>> for Configuration {
    type Error = DescriptorError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        if let Some(key) = RESERVED_FIELDS.iter().find(|key| map.contains_key(**key)) {
            return Err(DescriptorError::ReservedKey(key.to_string()));
        }
        Ok(Configuration(map))
    }
}

impl<'a> IntoIterator for &'a Configuration {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Declarative configuration of a single package.
///
/// Decoded from an object with a `name_template` string, a `type` naming a
/// [`PackageType`] and any number of extension fields. Extension fields are
/// kept in [`Configuration`] and written back at the same level on encode.
///
/// A descriptor is never modified in place; the `with_*` methods return a
/// new descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDescriptor {
    name_template: String,
    package_type: PackageType,
    configuration: Configuration,
}

impl PackageDescriptor {
    /// Creates a descriptor with an empty configuration
    pub fn new(name_template: impl Into<String>, package_type: PackageType) -> Self {
        PackageDescriptor {
            name_template: name_template.into(),
            package_type,
            configuration: Configuration::default(),
        }
    }

    pub fn name_template(&self) -> &str {
        &self.name_template
    }

    pub fn package_type(&self) -> PackageType {
        self.package_type
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.configuration.get(key)
    }

    pub fn with_name_template(&self, name_template: impl Into<String>) -> Self {
        PackageDescriptor {
            name_template: name_template.into(),
            ..self.clone()
        }
    }

    pub fn with_package_type(&self, package_type: PackageType) -> Self {
        PackageDescriptor {
            package_type,
            ..self.clone()
        }
    }

    /// Replaces the whole configuration bag
    ///
    /// # Errors
    ///
    /// * `DescriptorError::ReservedKey` if `configuration` holds `name_template` or `type`
    pub fn with_configuration(
        &self,
        configuration: Map<String, Value>,
    ) -> Result<Self, DescriptorError> {
        Ok(PackageDescriptor {
            configuration: Configuration::try_from(configuration)?,
            ..self.clone()
        })
    }

    /// Adds or replaces one extension field
    ///
    /// # Errors
    ///
    /// * `DescriptorError::ReservedKey` if `key` is `name_template` or `type`
    pub fn with_config_entry(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Self, DescriptorError> {
        let key = key.into();
        if RESERVED_FIELDS.contains(&key.as_str()) {
            return Err(DescriptorError::ReservedKey(key));
        }
        let mut configuration = self.configuration.clone();
        configuration.0.insert(key, value.into());
        Ok(PackageDescriptor {
            configuration,
            ..self.clone()
        })
    }

    /// Decodes a descriptor from the fields of a package object
    ///
    /// `name_template` and `type` are taken out first; every remaining field
    /// becomes part of the configuration unchanged.
    pub fn from_map(mut fields: Map<String, Value>) -> Result<Self, DescriptorError> {
        let name_template = take_string(&mut fields, NAME_TEMPLATE_FIELD)?;
        let package_type = take_string(&mut fields, PACKAGE_TYPE_FIELD)?.parse::<PackageType>()?;

        debug!(
            "Decoded package '{}' of type {} with {} extension field(s)",
            name_template,
            package_type,
            fields.len()
        );

        Ok(PackageDescriptor {
            name_template,
            package_type,
            configuration: Configuration(fields),
        })
    }

    /// Decodes a descriptor from a package object node
    pub fn from_value(value: Value) -> Result<Self, DescriptorError> {
        match value {
            Value::Object(fields) => Self::from_map(fields),
            other => Err(DescriptorError::TypeMismatch {
                field: "<root>",
                expected: "an object",
                found: value_kind(&other),
            }),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, DescriptorError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Encodes the descriptor as a package object node
    ///
    /// Configuration entries are emitted as siblings of `name_template` and
    /// `type`, so the result decodes back into an equal descriptor.
    pub fn to_value(&self) -> Value {
        let mut fields = Map::new();
        fields.insert(
            NAME_TEMPLATE_FIELD.to_string(),
            Value::String(self.name_template.clone()),
        );
        fields.insert(
            PACKAGE_TYPE_FIELD.to_string(),
            Value::String(self.package_type.as_str().to_string()),
        );
        for (key, value) in &self.configuration {
            fields.insert(key.clone(), value.clone());
        }
        Value::Object(fields)
    }

    pub fn to_json_string(&self) -> Result<String, DescriptorError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_string_pretty(&self) -> Result<String, DescriptorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn take_string(
    fields: &mut Map<String, Value>,
    field: &'static str,
) -> Result<String, DescriptorError> {
    match fields.remove(field) {
        Some(Value::String(value)) => Ok(value),
        Some(other) => Err(DescriptorError::TypeMismatch {
            field,
            expected: "a string",
            found: value_kind(&other),
        }),
        None => Err(DescriptorError::MissingField(field)),
    }
}

impl TryFrom<Value> for PackageDescriptor {
    type Error = DescriptorError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        PackageDescriptor::from_value(value)
    }
}

impl From<&PackageDescriptor> for Value {
    fn from(descriptor: &PackageDescriptor) -> Self {
        descriptor.to_value()
    }
}

impl Serialize for PackageDescriptor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2 + self.configuration.len()))?;
        map.serialize_entry(NAME_TEMPLATE_FIELD, &self.name_template)?;
        map.serialize_entry(PACKAGE_TYPE_FIELD, &self.package_type)?;
        for (key, value) in &self.configuration {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PackageDescriptor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        PackageDescriptor::from_map(fields).map_err(de::Error::custom)
    }
}
