//! OpenTelemetry-Compatible Span Helpers
//!
//! Structured `tracing` spans for the voting pipeline. Field names use
//! dot notation so they map onto OpenTelemetry attributes when exported.
//!
//! # Span Hierarchy
//!
//! ```text
//! consensus.voting             (one per conduct_voting call)
//!   └─ consensus.collaborator  (adaptive weights, result validation)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use industry_consensus::otel;
//!
//! let span = otel::voting_span("weighted_average", 4);
//! let _guard = span.enter();
//! // ... vote ...
//! otel::record_voting_result(&span, "ok", 3);
//! ```

use tracing::Span;

// ── Span Name Constants ──────────────────────────────────────────────

/// One voting run.
pub const SPAN_VOTING: &str = "consensus.voting";

/// One call into an external collaborator.
pub const SPAN_COLLABORATOR: &str = "consensus.collaborator";

// ── Field Name Constants ─────────────────────────────────────────────

pub const FIELD_VOTE_STRATEGY: &str = "consensus.vote.strategy";
pub const FIELD_VOTER_COUNT: &str = "consensus.vote.voter_count";
pub const FIELD_VOTE_OUTCOME: &str = "consensus.vote.outcome";
pub const FIELD_DURATION_MS: &str = "consensus.duration_ms";
pub const FIELD_COLLABORATOR: &str = "consensus.collaborator.name";
pub const FIELD_SUCCESS: &str = "consensus.success";

/// Collaborator name for the adaptive weight calculator.
pub const COLLABORATOR_ADAPTIVE_WEIGHTS: &str = "adaptive_weights";

/// Collaborator name for the result validator.
pub const COLLABORATOR_RESULT_VALIDATOR: &str = "result_validator";

/// Create a span for a voting run.
///
/// Fields filled later via [`record_voting_result`]: outcome, duration.
pub fn voting_span(strategy: &str, voter_count: usize) -> Span {
    // Declared field names must be literals; they mirror the FIELD_* table.
    tracing::info_span!(
        SPAN_VOTING,
        "consensus.vote.strategy" = %strategy,
        "consensus.vote.voter_count" = voter_count as u64,
        "consensus.vote.outcome" = tracing::field::Empty,
        "consensus.duration_ms" = tracing::field::Empty,
    )
}

/// Record the result of a voting run.
pub fn record_voting_result(span: &Span, outcome: &str, duration_ms: u64) {
    span.record(FIELD_VOTE_OUTCOME, outcome);
    span.record(FIELD_DURATION_MS, duration_ms);
}

/// Create a span for a collaborator call.
pub fn collaborator_span(name: &str) -> Span {
    tracing::debug_span!(
        SPAN_COLLABORATOR,
        "consensus.collaborator.name" = %name,
        "consensus.success" = tracing::field::Empty,
    )
}

/// Record whether a collaborator call succeeded.
pub fn record_collaborator_result(span: &Span, success: bool) {
    span.record(FIELD_SUCCESS, success);
}
