//! Personal Wealth Management Portfolio Bot
//!
//! Answers natural-language questions about a financial portfolio by
//! combining a conversational intent classifier with external market-risk
//! analytics:
//! - greeting and holdings-listing responses
//! - what-if scenario impact estimates (dollar and percent change, with a
//!   per-holding breakdown)
//!
//! TURN FLOW:
//! MESSAGE → LOAD SESSION → CLASSIFY → ROUTE → [FAN-OUT ANALYTICS] → RENDER → PERSIST

pub mod analytics;
pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod holdings;
pub mod impact;
pub mod models;
pub mod pipeline;
pub mod risk;
pub mod router;
pub mod session;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use pipeline::TurnPipeline;
