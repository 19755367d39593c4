//! Optional observability helpers for adapter calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `payfast_recurring.call` carrying the `operation`,
//!   `subject` (profile id or form id), and final `outcome` fields.
//! - Enable `metrics` to increment `payfast_recurring_call_total` (labels `operation`,
//!   `outcome`) and `payfast_recurring_provider_status_total` (labels `operation`, `class`).
//!
//! Pass-phrases and signatures are never attached to spans or metrics.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Remote subscription cancellation.
	Cancel,
	/// Recurring-period validation on form save.
	PeriodValidation,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Cancel => "cancel",
			CallKind::PeriodValidation => "period_validation",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to an adapter operation.
	Attempt,
	/// Operation did not apply (foreign gateway, guard not engaged).
	Skipped,
	/// Operation completed as requested.
	Success,
	/// Provider or guard rejected the operation.
	Rejected,
	/// Transport failure.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Skipped => "skipped",
			CallOutcome::Success => "success",
			CallOutcome::Rejected => "rejected",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
