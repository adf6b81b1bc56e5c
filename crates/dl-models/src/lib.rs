//! # dl-models
//!
//! Models implementing the valuation contracts of `dl-methods`.
//!
//! ```text
//! Model
//! ├── AssetModel          → BlackModel
//! └── InterestRateModel   → DeterministicRateModel
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Asset models ─────────────────────────────────────────────────────────
pub mod black_model;

// ── Interest-rate models ─────────────────────────────────────────────────
pub mod deterministic_rate;

// ── Re-exports ───────────────────────────────────────────────────────────
pub use black_model::{BlackConfig, BlackModel};
pub use deterministic_rate::{DeterministicRateConfig, DeterministicRateModel};
