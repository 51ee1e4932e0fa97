//! Configuration for building and signing v2 descriptors.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tor_rendv2_crypto::d::DigestAlgorithm;
use tor_rendv2_crypto::NUM_REPLICAS_DEFAULT;

/// The largest number of replicas we will build descriptors for.
const MAX_REPLICAS: u8 = 16;

/// An error related to an option passed to a configuration builder.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigBuildError {
    /// A mandatory field was not present.
    #[error("Field was not provided: {field}")]
    MissingField {
        /// The name of the missing field.
        field: String,
    },
    /// A single field had a value that proved to be unusable.
    #[error("Value of {field} was incorrect: {problem}")]
    Invalid {
        /// The name of the invalid field
        field: String,
        /// A description of the problem.
        problem: String,
    },
}

impl From<derive_builder::UninitializedFieldError> for ConfigBuildError {
    fn from(val: derive_builder::UninitializedFieldError) -> Self {
        ConfigBuildError::MissingField {
            field: val.field_name().to_string(),
        }
    }
}

/// Configuration for building the descriptors of one onion service.
///
/// This type is immutable once constructed. To make one, use
/// [`DescriptorConfigBuilder`], or deserialize it from a string.
#[derive(Debug, Clone, Builder, Eq, PartialEq)]
#[builder(build_fn(validate = "Self::validate", error = "ConfigBuildError"))]
#[builder(derive(Debug, Serialize, Deserialize))]
#[non_exhaustive]
pub struct DescriptorConfig {
    /// The digest to compute over a descriptor's body before signing it.
    ///
    /// rend-spec-v2 uses SHA-1.
    #[builder(default)]
    #[builder_field_attr(serde(default))]
    pub(crate) digest: DigestAlgorithm,

    /// How many replicas to publish.  Each replica gets its own
    /// descriptor identifier.
    #[builder(default = "NUM_REPLICAS_DEFAULT")]
    #[builder_field_attr(serde(default))]
    pub(crate) replicas: u8,
}

impl DescriptorConfigBuilder {
    /// Check that the replica count is in range.
    fn validate(&self) -> Result<(), ConfigBuildError> {
        if let Some(n) = self.replicas {
            if !(1..=MAX_REPLICAS).contains(&n) {
                return Err(ConfigBuildError::Invalid {
                    field: "replicas".to_string(),
                    problem: format!("must be between 1 and {}, not {}", MAX_REPLICAS, n),
                });
            }
        }
        Ok(())
    }
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        DescriptorConfig {
            digest: DigestAlgorithm::default(),
            replicas: NUM_REPLICAS_DEFAULT,
        }
    }
}

impl DescriptorConfig {
    /// Return a new builder to construct a DescriptorConfig.
    pub fn builder() -> DescriptorConfigBuilder {
        DescriptorConfigBuilder::default()
    }

    /// Return the digest algorithm used when signing.
    pub fn digest(&self) -> DigestAlgorithm {
        self.digest
    }

    /// Return the number of replicas to build descriptors for.
    pub fn replicas(&self) -> u8 {
        self.replicas
    }
}
