//! # Gateway Routing
//!
//! Cost-optimizing model selection for the SEO platform gateway.
//!
//! The [`CostRouter`] maps a content-generation priority plus optional
//! word-count/budget constraints onto a concrete (provider, model) pair,
//! with a human-readable reason for every decision.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cost_router;

pub use cost_router::{CostRouter, ModelSelection, Priority};
