//! Scoring rules for X01.
//!
//! Pure functions only. Nothing here knows about players, legs or matches.

pub mod score;
pub mod visit;

pub use score::{dart_score, darts_total, is_double, is_triple};
pub use visit::{
    BustReason, InRule, OutRule, VisitOutcome, VisitResult, apply_visit, apply_visit_rules,
    apply_visit_with,
};
