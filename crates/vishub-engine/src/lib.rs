//! Business rules for the recommendation/autopilot pipeline.
//!
//! Pure logic only — no I/O, no store access. The server crate feeds stored
//! rows in and persists whatever comes out, so every invariant here (the
//! exactly-N recommendation list, the scope whitelist, the fix catalog
//! order) is unit-testable without a database.

pub mod catalog;
pub mod describe;
pub mod recommend;
pub mod scopes;


pub use catalog::{fix_catalog, matching_fixes, FixTemplate};
pub use describe::describe_change;
pub use recommend::{default_catalog, health_check_seeds, select_top_n, RecommendationTemplate, TopPick};
pub use scopes::{
    default_toggle_scopes, fallback_apply_scopes, resolve_apply_scopes, validate_scopes,
    ScopeError,
};
