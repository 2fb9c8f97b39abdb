use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown package type '{value}', expected one of: {}", .expected.join(", "))]
pub struct UnknownPackageType {
    pub value: String,
    pub expected: Vec<&'static str>,
}

/// Kind of artifact a package is built into.
///
/// The textual name of each variant is the only accepted token for it in a
/// package document; matching is case-sensitive.
///
/// The member set is provisional and may change once the packaging stages
/// that consume it settle on their list; do not rely on it being exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageType {
    /// Full distributable bundle
    Bundle,
    /// Zip archive of the build output
    Zip,
    /// Gzip compressed tarball of the build output
    TarGz,
    /// Plain copy of the build output into the package directory
    Copy,
}

const PACKAGE_TYPE_NAMES: &[(&str, PackageType)] = &[
    ("Bundle", PackageType::Bundle),
    ("Zip", PackageType::Zip),
    ("TarGz", PackageType::TarGz),
    ("Copy", PackageType::Copy),
];

impl PackageType {
    pub const ALL: [PackageType; 4] = [
        PackageType::Bundle,
        PackageType::Zip,
        PackageType::TarGz,
        PackageType::Copy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageType::Bundle => "Bundle",
            PackageType::Zip => "Zip",
            PackageType::TarGz => "TarGz",
            PackageType::Copy => "Copy",
        }
    }

    /// All accepted package type names, in declaration order
    pub fn names() -> Vec<&'static str> {
        PACKAGE_TYPE_NAMES.iter().map(|(name, _)| *name).collect()
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageType {
    type Err = UnknownPackageType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PACKAGE_TYPE_NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, package_type)| *package_type)
            .ok_or_else(|| UnknownPackageType {
                value: s.to_string(),
                expected: PackageType::names(),
            })
    }
}

impl Serialize for PackageType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PackageType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PackageTypeVisitor;

        impl<'de> de::Visitor<'de> for PackageTypeVisitor {
            type Value = PackageType;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(
                    formatter,
                    "a package type name, one of: {}",
                    PackageType::names().join(", ")
                )
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value.parse().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(PackageTypeVisitor)
    }
}
