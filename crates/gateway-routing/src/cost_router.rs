//! Cost optimization router for LLM model selection.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Content generation priority levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Quality-first: flagship models.
    High,
    /// Balanced cost/quality.
    Medium,
    /// Cost-first: cheapest viable models.
    Low,
}

impl Priority {
    /// Parse a priority string, defaulting to `Medium` with a warning on
    /// unrecognized input.
    #[must_use]
    pub fn parse_or_default(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|()| {
            warn!(priority = raw, "Invalid priority, defaulting to medium");
            Self::Medium
        })
    }
}

impl FromStr for Priority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Selected model and provider information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSelection {
    /// Provider name.
    pub provider: String,
    /// Model name.
    pub model: String,
    /// Estimated cost per 1K output tokens.
    pub estimated_cost_per_1k_tokens: Decimal,
    /// Which constraint drove the choice.
    pub reason: String,
}

/// One catalog entry: (provider, model, estimated USD per 1K output tokens).
type CatalogEntry = (&'static str, &'static str, Decimal);

/// Estimated costs per 1K output tokens, used for routing decisions only
/// (billing uses the providers' exact price tables).
const ESTIMATED_COSTS: &[CatalogEntry] = &[
    ("openai", "gpt-4o", dec!(0.01)),
    ("openai", "gpt-4o-mini", dec!(0.0006)),
    ("openai", "gpt-4-turbo", dec!(0.03)),
    ("openai", "gpt-4", dec!(0.06)),
    ("openai", "gpt-3.5-turbo", dec!(0.002)),
    ("anthropic", "claude-3-5-sonnet-20241022", dec!(0.015)),
    ("anthropic", "claude-3-sonnet-20240229", dec!(0.015)),
    ("anthropic", "claude-3-opus-20240229", dec!(0.075)),
    ("anthropic", "claude-3-haiku-20240307", dec!(0.00125)),
    ("google", "gemini-1.5-pro", dec!(0.005)),
    ("google", "gemini-1.5-flash", dec!(0.0003)),
    ("google", "gemini-pro", dec!(0.0015)),
    ("xai", "grok-beta", dec!(0.015)),
    ("xai", "grok-2", dec!(0.01)),
];

/// Default (provider, model) per priority.
const fn default_route(priority: Priority) -> (&'static str, &'static str) {
    match priority {
        Priority::High => ("openai", "gpt-4o"),
        Priority::Medium => ("anthropic", "claude-3-5-sonnet-20241022"),
        Priority::Low => ("google", "gemini-1.5-flash"),
    }
}

/// Fallback routes tried in order when the primary provider is unavailable.
const fn fallback_routes(priority: Priority) -> &'static [(&'static str, &'static str)] {
    match priority {
        Priority::High => &[
            ("anthropic", "claude-3-opus-20240229"),
            ("openai", "gpt-4-turbo"),
        ],
        Priority::Medium => &[("openai", "gpt-4o-mini"), ("google", "gemini-1.5-pro")],
        Priority::Low => &[
            ("openai", "gpt-3.5-turbo"),
            ("anthropic", "claude-3-haiku-20240307"),
        ],
    }
}

/// Tokens estimated per word when converting a word-count target into a
/// token budget for routing.
const TOKENS_PER_WORD_OUTPUT: Decimal = dec!(1.5);

/// Tokens estimated per word (input + output) for end-to-end cost estimates.
const TOKENS_PER_WORD_TOTAL: Decimal = dec!(3);

const FALLBACK_COST_PER_1K: Decimal = dec!(0.01);

/// Cost optimization router.
///
/// Routes generation requests to a (provider, model) pair based on the
/// priority level, target word count, and budget constraints. Availability
/// is a startup-time snapshot of which providers hold credentials; the
/// router never fails a request on budget alone.
#[derive(Debug, Clone, Default)]
pub struct CostRouter {
    available_providers: Vec<String>,
}

impl CostRouter {
    /// Create a router with no availability information.
    ///
    /// Without a snapshot every provider is assumed reachable and the
    /// fallback routes are never consulted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a router with an availability snapshot.
    #[must_use]
    pub fn with_available_providers(available_providers: Vec<String>) -> Self {
        Self {
            available_providers,
        }
    }

    /// Select the optimal model for the given constraints.
    #[must_use]
    pub fn select(
        &self,
        priority: Priority,
        word_count: Option<u64>,
        max_budget_usd: Option<Decimal>,
    ) -> ModelSelection {
        let (provider, model) = default_route(priority);

        // Budget constraint first: it can move the choice off the priority
        // default entirely.
        if let (Some(budget), Some(words)) = (max_budget_usd, word_count) {
            let estimated_tokens = Decimal::from(words) * TOKENS_PER_WORD_OUTPUT;
            let default_cost =
                estimated_tokens / dec!(1000) * catalog_cost(provider, model);

            if default_cost > budget {
                return self.cheapest_within_budget(estimated_tokens, budget);
            }
        }

        // Availability fallback: only when we hold a snapshot and the
        // primary is not in it.
        if !self.available_providers.is_empty()
            && !self.is_available(provider)
        {
            for (fb_provider, fb_model) in fallback_routes(priority) {
                if self.is_available(fb_provider) {
                    return ModelSelection {
                        provider: (*fb_provider).to_string(),
                        model: (*fb_model).to_string(),
                        estimated_cost_per_1k_tokens: catalog_cost(fb_provider, fb_model),
                        reason: format!("Fallback for {priority} priority (primary unavailable)"),
                    };
                }
            }
        }

        ModelSelection {
            provider: provider.to_string(),
            model: model.to_string(),
            estimated_cost_per_1k_tokens: catalog_cost(provider, model),
            reason: format!("Default route for {priority} priority"),
        }
    }

    /// Estimate the cost of generating `word_count` words on a model.
    #[must_use]
    pub fn estimate_cost(&self, provider: &str, model: &str, word_count: u64) -> Decimal {
        let estimated_tokens = Decimal::from(word_count) * TOKENS_PER_WORD_TOTAL;
        estimated_tokens / dec!(1000) * catalog_cost(provider, model)
    }

    fn is_available(&self, provider: &str) -> bool {
        self.available_providers.iter().any(|p| p == provider)
    }

    /// Walk the catalog in ascending cost order for the first entry whose
    /// estimated cost fits the budget. When nothing fits, the cheapest
    /// entry is selected anyway and the reason says so.
    fn cheapest_within_budget(
        &self,
        estimated_tokens: Decimal,
        max_budget_usd: Decimal,
    ) -> ModelSelection {
        let mut sorted: Vec<&CatalogEntry> = ESTIMATED_COSTS.iter().collect();
        sorted.sort_by_key(|(_, _, cost)| *cost);

        for (provider, model, cost_per_1k) in &sorted {
            let estimated_cost = estimated_tokens / dec!(1000) * *cost_per_1k;
            if estimated_cost <= max_budget_usd {
                return ModelSelection {
                    provider: (*provider).to_string(),
                    model: (*model).to_string(),
                    estimated_cost_per_1k_tokens: *cost_per_1k,
                    reason: format!("Budget-optimized selection (max: ${max_budget_usd})"),
                };
            }
        }

        // Budget is advisory: fall through to the cheapest entry rather
        // than failing the request.
        let (provider, model, cost_per_1k) = sorted[0];
        ModelSelection {
            provider: (*provider).to_string(),
            model: (*model).to_string(),
            estimated_cost_per_1k_tokens: *cost_per_1k,
            reason: format!(
                "Cheapest available selection; no model fits budget ${max_budget_usd}"
            ),
        }
    }
}

fn catalog_cost(provider: &str, model: &str) -> Decimal {
    ESTIMATED_COSTS
        .iter()
        .find(|(p, m, _)| *p == provider && *m == model)
        .map_or(FALLBACK_COST_PER_1K, |(_, _, cost)| *cost)
}
