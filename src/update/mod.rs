//! Field update decision engine
//!
//! - `strategy.rs` - update-log detection and the atomic/full-rewrite choice
//! - `executor.rs` - payload construction and submission for either plan

mod executor;
mod strategy;

pub use executor::{UpdateIntent, UpdatePhase, atomic_payload, rewrite_payload};
pub use strategy::{LEGACY_UPDATE_LOG_KEY, UpdateLogStatus, UpdateStrategy, update_log_enabled};
