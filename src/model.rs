//! Model descriptors and capability metadata
//!
//! A [`ModelDescriptor`] identifies one target model and everything the
//! request builder needs to know about it. Descriptors are immutable values:
//! construct once, reuse across calls.

use serde::{Deserialize, Serialize};

use crate::constraints::ParameterConstraints;

/// Model family, selecting how requests are shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    /// General-purpose chat model; accepts the full set of sampling parameters
    General,
    /// Constrained reasoning model; rejects sampling parameters and names the
    /// output limit differently on the wire
    Reasoning,
}

/// Pricing tier of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingTier {
    Free,
    Standard,
    Premium,
}

/// What a model can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCapabilities {
    pub text: bool,
    pub vision: bool,
    pub function_calling: bool,
    pub reasoning: bool,
    pub streaming: bool,
    pub tool_access: bool,
}

impl ModelCapabilities {
    /// Capabilities of a typical chat model: text, function calling, streaming
    #[must_use]
    pub const fn chat() -> Self {
        Self {
            text: true,
            vision: false,
            function_calling: true,
            reasoning: false,
            streaming: true,
            tool_access: true,
        }
    }

    /// Capabilities of a typical reasoning model
    #[must_use]
    pub const fn reasoning() -> Self {
        Self {
            text: true,
            vision: false,
            function_calling: true,
            reasoning: true,
            streaming: true,
            tool_access: true,
        }
    }
}

impl Default for ModelCapabilities {
    fn default() -> Self {
        Self::chat()
    }
}

/// Immutable description of one target model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Model identifier sent on the wire
    pub name: String,

    pub family: ModelFamily,

    /// Context window size in tokens
    pub context_window: u32,

    /// Maximum output tokens; never exceeds `context_window`
    pub max_output_tokens: u32,

    pub capabilities: ModelCapabilities,

    pub pricing_tier: PricingTier,

    /// Knowledge-cutoff label, e.g. "2024-06"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_cutoff: Option<String>,

    /// Explicit per-model constraints; when set, the family default is ignored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint_override: Option<ParameterConstraints>,
}

impl ModelDescriptor {
    /// Create a descriptor. The output limit is clamped to the context window.
    pub fn new(
        name: impl Into<String>,
        family: ModelFamily,
        context_window: u32,
        max_output_tokens: u32,
    ) -> Self {
        let capabilities = match family {
            ModelFamily::General => ModelCapabilities::chat(),
            ModelFamily::Reasoning => ModelCapabilities::reasoning(),
        };
        Self {
            name: name.into(),
            family,
            context_window,
            max_output_tokens: max_output_tokens.min(context_window),
            capabilities,
            pricing_tier: PricingTier::Standard,
            knowledge_cutoff: None,
            constraint_override: None,
        }
    }

    /// Shorthand for a general-family descriptor
    pub fn general(name: impl Into<String>, context_window: u32, max_output_tokens: u32) -> Self {
        Self::new(name, ModelFamily::General, context_window, max_output_tokens)
    }

    /// Shorthand for a reasoning-family descriptor
    pub fn reasoning(name: impl Into<String>, context_window: u32, max_output_tokens: u32) -> Self {
        Self::new(name, ModelFamily::Reasoning, context_window, max_output_tokens)
    }

    /// Attach an explicit constraint record, overriding the family default
    #[must_use]
    pub fn with_constraints(mut self, constraints: ParameterConstraints) -> Self {
        self.constraint_override = Some(constraints);
        self
    }

    #[must_use]
    pub fn with_pricing_tier(mut self, tier: PricingTier) -> Self {
        self.pricing_tier = tier;
        self
    }

    #[must_use]
    pub fn with_knowledge_cutoff(mut self, cutoff: impl Into<String>) -> Self {
        self.knowledge_cutoff = Some(cutoff.into());
        self
    }
}
