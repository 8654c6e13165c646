//! Search orchestrator: generation-tagged fan-out, aggregation, progress.
//!
//! This module dispatches one query per active site concurrently, merges
//! the answers into a link-deduplicated result set, tracks a status per
//! site, and discards anything that arrives for a superseded generation.

pub mod dedup;
pub mod events;
pub mod search;
pub mod session;

pub use dedup::ResultSet;
pub use events::HoundEvent;
pub use search::{Orchestrator, QueryHandle};
pub use session::{Generation, SessionSnapshot, SessionState, SettledSource};
