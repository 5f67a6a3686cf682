use std::borrow::Cow;
use std::fmt;

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use semver::Version;
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::contract::ReportContract;
use crate::validation::{ContractIssue, ValidationError};

/// Current supported contract document version.
pub const CURRENT_SPEC_VERSION: &str = "0.1.0";
/// Constant identifier for this document format.
pub const SPEC_IDENT: &str = "mbc";

/// A contract wrapped in its versioned serialization envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(
    title = "Markbound Report Contract",
    description = "Versioned document binding the marks of a spreadsheet template to data sources, ranges and parameters."
)]
#[serde(deny_unknown_fields)]
pub struct ContractDocument {
    /// Identifier for this document format (must be `mbc`).
    pub spec: String,
    pub spec_version: SpecVersion,
    /// The contract payload.
    pub contract: ReportContract,
}

impl ContractDocument {
    /// Wrap a contract with the current identifier and version.
    pub fn new(contract: ReportContract) -> Self {
        let version =
            Version::parse(CURRENT_SPEC_VERSION).expect("CURRENT_SPEC_VERSION must be valid semver");
        Self {
            spec: SPEC_IDENT.to_string(),
            spec_version: SpecVersion(version),
            contract,
        }
    }

    /// Construct a document by reading YAML from any reader.
    pub fn from_yaml_reader<R: std::io::Read>(reader: R) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(reader)
    }

    /// Construct a document from a YAML string slice.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Construct a document from a JSON string slice.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize this document to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Serialize this document to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Validate the envelope and the contract it carries.
    ///
    /// Issues from the contract are reported under a `contract.` prefix so a
    /// caller can tell envelope problems from binding problems.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.spec != SPEC_IDENT {
            issues.push(ContractIssue::new(
                "spec",
                format!(
                    "expected spec identifier `{}`, found `{}`",
                    SPEC_IDENT, self.spec
                ),
            ));
        }

        let current_version = Version::parse(CURRENT_SPEC_VERSION)
            .expect("CURRENT_SPEC_VERSION must be valid semver");
        let spec_version = &self.spec_version.0;
        if spec_version.major != current_version.major
            || (current_version.major == 0 && spec_version.minor != current_version.minor)
        {
            issues.push(ContractIssue::new(
                "spec_version",
                format!(
                    "incompatible version `{spec_version}` (this build supports `{current_version}`)"
                ),
            ));
        }

        if let Err(err) = self.contract.validate() {
            for issue in err.issues {
                issues.push(ContractIssue::new(
                    format!("contract.{}", issue.path),
                    issue.message,
                ));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }
}

impl std::str::FromStr for ContractDocument {
    type Err = serde_yaml::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContractDocument::from_yaml_str(s)
    }
}

/// Wrapper around semver::Version for serde compatibility.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpecVersion(pub Version);

impl SpecVersion {
    pub fn new(version: Version) -> Self {
        Self(version)
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for SpecVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for SpecVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct VersionVisitor;

        impl<'de> Visitor<'de> for VersionVisitor {
            type Value = SpecVersion;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("semantic version string (e.g. 0.1.0)")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Version::parse(v)
                    .map(SpecVersion)
                    .map_err(|err| de::Error::custom(format!("invalid spec_version: {err}")))
            }
        }

        deserializer.deserialize_str(VersionVisitor)
    }
}

impl JsonSchema for SpecVersion {
    fn schema_name() -> Cow<'static, str> {
        Cow::Borrowed("SpecVersion")
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "string",
            "pattern": r"^[0-9]+\.[0-9]+\.[0-9]+(?:-[0-9A-Za-z-.]+)?(?:\+[0-9A-Za-z-.]+)?$"
        })
    }
}
