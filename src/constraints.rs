//! Per-family sampling parameter constraints
//!
//! General chat models accept the full set of sampling parameters; reasoning
//! models reject them all and name the output-token limit differently on the
//! wire. [`constraints_for`] resolves the record the request builder applies.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::model::{ModelDescriptor, ModelFamily};

/// Wire field name carrying the output-token limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLimitField {
    MaxTokens,
    MaxCompletionTokens,
}

/// Which sampling parameters a model accepts, and how the output limit is
/// spelled on the wire. Governs parameter presence only; values are passed
/// through as supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterConstraints {
    pub temperature: bool,
    pub top_p: bool,
    pub frequency_penalty: bool,
    pub presence_penalty: bool,
    pub stop_sequences: bool,

    pub output_limit_field: OutputLimitField,

    /// Legal temperature range, when the parameter is supported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_range: Option<RangeInclusive<f32>>,

    /// Legal top-p range, when the parameter is supported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p_range: Option<RangeInclusive<f32>>,
}

impl ParameterConstraints {
    /// Constraints of the general chat family
    #[must_use]
    pub fn general() -> Self {
        Self {
            temperature: true,
            top_p: true,
            frequency_penalty: true,
            presence_penalty: true,
            stop_sequences: true,
            output_limit_field: OutputLimitField::MaxTokens,
            temperature_range: Some(0.0..=2.0),
            top_p_range: Some(0.0..=1.0),
        }
    }

    /// Constraints of the reasoning family: no sampling parameters at all
    #[must_use]
    pub fn reasoning() -> Self {
        Self {
            temperature: false,
            top_p: false,
            frequency_penalty: false,
            presence_penalty: false,
            stop_sequences: false,
            output_limit_field: OutputLimitField::MaxCompletionTokens,
            temperature_range: None,
            top_p_range: None,
        }
    }
}

/// Resolve the constraints for a model.
///
/// An explicit override on the descriptor wins; otherwise the family default
/// applies. Total function, no error path.
#[must_use]
pub fn constraints_for(model: &ModelDescriptor) -> ParameterConstraints {
    if let Some(constraints) = &model.constraint_override {
        return constraints.clone();
    }
    match model.family {
        ModelFamily::General => ParameterConstraints::general(),
        ModelFamily::Reasoning => ParameterConstraints::reasoning(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn general_permits_all_sampling_parameters() {
        let c = ParameterConstraints::general();
        assert!(c.temperature && c.top_p && c.frequency_penalty);
        assert!(c.presence_penalty && c.stop_sequences);
        assert_eq!(c.output_limit_field, OutputLimitField::MaxTokens);
        assert_eq!(c.temperature_range, Some(0.0..=2.0));
        assert_eq!(c.top_p_range, Some(0.0..=1.0));
    }

    #[test]
    fn reasoning_permits_none() {
        let c = ParameterConstraints::reasoning();
        assert!(!c.temperature && !c.top_p && !c.frequency_penalty);
        assert!(!c.presence_penalty && !c.stop_sequences);
        assert_eq!(c.output_limit_field, OutputLimitField::MaxCompletionTokens);
        assert_eq!(c.temperature_range, None);
        assert_eq!(c.top_p_range, None);
    }

    #[test]
    fn family_selects_constraints() {
        let general = ModelDescriptor::general("gpt-test", 128_000, 16_384);
        assert_eq!(constraints_for(&general), ParameterConstraints::general());

        let reasoning = ModelDescriptor::reasoning("o-test", 200_000, 100_000);
        assert_eq!(
            constraints_for(&reasoning),
            ParameterConstraints::reasoning()
        );
    }

    #[test]
    fn explicit_override_wins_over_family() {
        let custom = ParameterConstraints {
            temperature: true,
            ..ParameterConstraints::reasoning()
        };
        let model =
            ModelDescriptor::reasoning("o-custom", 200_000, 100_000).with_constraints(custom.clone());
        assert_eq!(constraints_for(&model), custom);
    }
}
