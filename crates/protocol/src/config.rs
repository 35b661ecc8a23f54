use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::encoding::F32_BITS;

/// How the evaluator obtains the labels of its own input wires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OtMode {
    /// Labels are obtained by oblivious transfer.
    #[default]
    Enabled,
    /// The garbler sends both labels of every evaluator wire.
    ///
    /// INSECURE: the evaluator can decode every gate. For debugging only.
    InsecureNoOt,
}

/// Configuration of a garbler or evaluator.
#[derive(Debug, Clone, Default, Builder, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// How evaluator labels are transferred.
    #[builder(default)]
    ot_mode: OtMode,
}

impl ProtocolConfig {
    /// Creates a new builder.
    pub fn builder() -> ProtocolConfigBuilder {
        ProtocolConfigBuilder::default()
    }

    /// Returns how evaluator labels are transferred.
    pub fn ot_mode(&self) -> OtMode {
        self.ot_mode
    }
}

/// Configuration of a set intersection party.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct PsiConfig {
    /// Width of an encoded element. Must be 32, the width of an `f32`.
    #[builder(default = "F32_BITS")]
    bit_width: usize,
    /// How many times a comparison is attempted before giving up.
    #[builder(default = "3")]
    max_attempts: usize,
    /// Configuration of every comparison.
    #[builder(default)]
    protocol: ProtocolConfig,
}

impl PsiConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(bit_width) = self.bit_width {
            if bit_width != F32_BITS {
                return Err(format!(
                    "bit_width must be {F32_BITS} for IEEE-754 single precision, got {bit_width}"
                ));
            }
        }

        if self.max_attempts == Some(0) {
            return Err("max_attempts must be at least 1".to_string());
        }

        Ok(())
    }
}

impl PsiConfig {
    /// Creates a new builder.
    pub fn builder() -> PsiConfigBuilder {
        PsiConfigBuilder::default()
    }

    /// Returns the width of an encoded element.
    pub fn bit_width(&self) -> usize {
        self.bit_width
    }

    /// Returns how many times a comparison is attempted.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Returns the configuration of every comparison.
    pub fn protocol(&self) -> &ProtocolConfig {
        &self.protocol
    }
}

impl Default for PsiConfig {
    fn default() -> Self {
        Self {
            bit_width: F32_BITS,
            max_attempts: 3,
            protocol: ProtocolConfig::default(),
        }
    }
}
