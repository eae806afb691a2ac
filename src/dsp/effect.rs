//! Effect trait definition
//!
//! Uniform surface for effects driven by user controls: parameters are read
//! and written by name, serialized to JSON, and an effect can be bypassed.

use crate::engine::AudioBuffer;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters common to all effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectParams {
    /// Unique identifier for this effect instance
    pub id: String,
    /// Whether the effect is enabled
    pub enabled: bool,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            enabled: true,
        }
    }
}

/// Base trait for all DSP effects
///
/// Effects never mutate their input. `process` returns a new buffer in the
/// input's format, or a copy of the input when the effect is disabled.
pub trait Effect: Send + Sync {
    /// Render the effect over `input`
    fn process(&self, input: &AudioBuffer) -> Result<AudioBuffer>;

    /// Get the effect type identifier
    fn effect_type(&self) -> &'static str;

    /// Get human-readable display name
    fn display_name(&self) -> &str;

    /// Get the unique instance ID
    fn id(&self) -> &str;

    /// Check if effect is enabled
    fn is_enabled(&self) -> bool;

    /// Enable or disable the effect
    fn set_enabled(&mut self, enabled: bool);

    /// Serialize effect parameters to JSON
    fn to_json(&self) -> Result<Value>;

    /// Deserialize effect parameters from JSON
    fn from_json(&mut self, json: &Value) -> Result<()>;

    /// Get all parameters as JSON (for UI controls)
    fn get_params(&self) -> Value;

    /// Set a single parameter by name
    fn set_param(&mut self, name: &str, value: &Value) -> Result<()>;

    /// Clone the effect into a boxed trait object
    fn box_clone(&self) -> Box<dyn Effect>;
}

impl Clone for Box<dyn Effect> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Helper macro to implement common Effect trait methods
#[macro_export]
macro_rules! impl_effect_common {
    ($effect_type:expr, $display_name:expr) => {
        fn effect_type(&self) -> &'static str {
            $effect_type
        }

        fn display_name(&self) -> &str {
            $display_name
        }

        fn id(&self) -> &str {
            &self.params.id
        }

        fn is_enabled(&self) -> bool {
            self.params.enabled
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.params.enabled = enabled;
        }

        fn box_clone(&self) -> Box<dyn Effect> {
            Box::new(self.clone())
        }
    };
}
