//! Recurring-period guard for donation-form saves.
//!
//! Payfast only bills monthly or yearly, so administrative edits that select a daily or
//! weekly interval for a recurring form are rejected before they are stored.

// self
use crate::{
	_prelude::*,
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Content type of donation forms.
pub const DONATION_FORM_CONTENT_TYPE: &str = "give_forms";
/// Content type of stored revisions.
pub const REVISION_CONTENT_TYPE: &str = "revision";
/// User-facing message shown when a disallowed interval is submitted.
pub const DISALLOWED_PERIOD_MESSAGE: &str =
	"Payfast Only allows for Monthly and Yearly recurring donations. Please revise your selection.";

/// Billing intervals a donation form can select.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurringPeriod {
	/// Daily.
	Day,
	/// Weekly.
	Week,
	/// Monthly.
	Month,
	/// Quarterly.
	Quarter,
	/// Yearly.
	Year,
}
impl RecurringPeriod {
	/// Returns the form-field label.
	pub const fn as_str(self) -> &'static str {
		match self {
			RecurringPeriod::Day => "day",
			RecurringPeriod::Week => "week",
			RecurringPeriod::Month => "month",
			RecurringPeriod::Quarter => "quarter",
			RecurringPeriod::Year => "year",
		}
	}

	/// Parses a raw submitted label; unknown labels yield `None`.
	pub fn from_label(label: &str) -> Option<Self> {
		match label.trim() {
			"day" => Some(RecurringPeriod::Day),
			"week" => Some(RecurringPeriod::Week),
			"month" => Some(RecurringPeriod::Month),
			"quarter" => Some(RecurringPeriod::Quarter),
			"year" => Some(RecurringPeriod::Year),
			_ => None,
		}
	}
}
impl Display for RecurringPeriod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Submitted recurring mode (`_give_recurring`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurringMode {
	/// Recurring disabled.
	#[default]
	No,
	/// Donor chooses whether to recur.
	YesDonor,
	/// Administrator fixes the recurring schedule.
	YesAdmin,
	/// Any other submitted value; recurring is treated as enabled.
	Other,
}
impl RecurringMode {
	/// Parses a raw submitted value. Only a missing value or the literal `no` disables
	/// recurring; unrecognized values keep the guard engaged.
	pub fn from_raw(raw: Option<&str>) -> Self {
		match raw.map(str::trim) {
			None | Some("no") => RecurringMode::No,
			Some("yes_donor") => RecurringMode::YesDonor,
			Some("yes_admin") => RecurringMode::YesAdmin,
			Some(_) => RecurringMode::Other,
		}
	}
}

/// Submitted pricing mode (`_give_price_option`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceOption {
	/// Single fixed price.
	#[default]
	Set,
	/// Multiple donation levels.
	Multi,
}
impl PriceOption {
	/// Parses a raw submitted value; anything other than `multi` is a single price.
	pub fn from_raw(raw: Option<&str>) -> Self {
		match raw.map(str::trim) {
			Some("multi") => PriceOption::Multi,
			_ => PriceOption::Set,
		}
	}
}

/// Everything the guard reads about a content save.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSaveContext {
	/// Saved content identifier.
	pub form_id: u64,
	/// Content type of the saved item.
	pub content_type: String,
	/// Submitted recurring mode.
	pub recurring_mode: RecurringMode,
	/// Submitted pricing mode.
	pub price_option: PriceOption,
	/// Raw per-level periods for multi-level forms.
	pub level_periods: Vec<String>,
	/// Raw period for single-price forms.
	pub period: Option<String>,
	/// Whether the host already considers the form recurring.
	pub form_is_recurring: bool,
	/// Save triggered by autosave.
	pub autosave: bool,
	/// Save triggered by an AJAX request.
	pub ajax: bool,
	/// Save triggered by bulk edit.
	pub bulk_edit: bool,
	/// Acting principal may edit donation forms.
	pub can_edit: bool,
	/// Payfast gateway is enabled on the host.
	pub gateway_active: bool,
}
impl FormSaveContext {
	/// Creates a context for a donation-form save by an authorized editor with the gateway
	/// active; adjust the remaining fields to match the request.
	pub fn new(form_id: u64) -> Self {
		Self {
			form_id,
			content_type: DONATION_FORM_CONTENT_TYPE.into(),
			can_edit: true,
			gateway_active: true,
			..Default::default()
		}
	}
}

/// Reason the guard did not inspect a save.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
	/// Recurring is disabled on the form.
	RecurringDisabled,
	/// Autosave, AJAX, or bulk-edit request.
	BackgroundSave,
	/// Stored revision.
	Revision,
	/// Content is not a donation form.
	NotDonationForm,
	/// Acting principal cannot edit donation forms.
	PermissionDenied,
	/// Payfast is not an active gateway.
	GatewayInactive,
}

/// Non-error result of the guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
	/// The guard did not apply to this save.
	Skipped(SkipReason),
	/// All inspected periods are allowed.
	Accepted,
}

/// Rejection raised by the guard; aborts the save.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum PeriodValidationError {
	/// A disallowed billing interval was submitted.
	#[error("{}", DISALLOWED_PERIOD_MESSAGE)]
	DisallowedPeriod {
		/// Offending interval.
		period: RecurringPeriod,
		/// Saved content identifier.
		form_id: u64,
	},
}
impl PeriodValidationError {
	/// HTTP status the host should answer with.
	pub const fn status(&self) -> u16 {
		400
	}

	/// Title of the error page.
	pub const fn title(&self) -> &'static str {
		"Error"
	}
}

/// Denylist-based interval guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeriodGuard {
	/// Intervals that abort the save.
	pub denied: Vec<RecurringPeriod>,
}
impl PeriodGuard {
	/// Validates a save, rejecting it when an inspected period is denied.
	///
	/// Multi-level forms with an administrator-fixed schedule have every level inspected;
	/// otherwise the single submitted period is inspected when the form is recurring.
	pub fn validate(
		&self,
		ctx: &FormSaveContext,
	) -> Result<GuardDecision, PeriodValidationError> {
		const KIND: CallKind = CallKind::PeriodValidation;

		let span = CallSpan::new(KIND, ctx.form_id);

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.in_scope(|| {
			let result = self.evaluate(ctx);

			#[cfg(feature = "tracing")]
			{
				if let Err(e) = &result {
					tracing::warn!(error = ?e, "Rejected disallowed recurring period.");
				}
			}

			result
		});
		let label = match &result {
			Ok(GuardDecision::Skipped(_)) => CallOutcome::Skipped,
			Ok(GuardDecision::Accepted) => CallOutcome::Success,
			Err(_) => CallOutcome::Rejected,
		};

		span.record_outcome(label);
		obs::record_call_outcome(KIND, label);

		result
	}

	/// Returns `true` when `label` names a denied interval.
	pub fn is_denied(&self, label: &str) -> bool {
		RecurringPeriod::from_label(label).is_some_and(|period| self.denied.contains(&period))
	}

	fn evaluate(&self, ctx: &FormSaveContext) -> Result<GuardDecision, PeriodValidationError> {
		if let Some(reason) = skip_reason(ctx) {
			return Ok(GuardDecision::Skipped(reason));
		}

		if ctx.price_option == PriceOption::Multi && ctx.recurring_mode == RecurringMode::YesAdmin {
			for label in &ctx.level_periods {
				self.check(label, ctx.form_id)?;
			}
		} else if let Some(label) = ctx.period.as_deref().filter(|_| ctx.form_is_recurring) {
			self.check(label, ctx.form_id)?;
		}

		Ok(GuardDecision::Accepted)
	}

	fn check(&self, label: &str, form_id: u64) -> Result<(), PeriodValidationError> {
		match RecurringPeriod::from_label(label) {
			Some(period) if self.denied.contains(&period) =>
				Err(PeriodValidationError::DisallowedPeriod { period, form_id }),
			_ => Ok(()),
		}
	}
}
impl Default for PeriodGuard {
	fn default() -> Self {
		Self { denied: vec![RecurringPeriod::Day, RecurringPeriod::Week] }
	}
}

fn skip_reason(ctx: &FormSaveContext) -> Option<SkipReason> {
	if ctx.recurring_mode == RecurringMode::No {
		return Some(SkipReason::RecurringDisabled);
	}
	if ctx.autosave || ctx.ajax || ctx.bulk_edit {
		return Some(SkipReason::BackgroundSave);
	}
	if ctx.content_type == REVISION_CONTENT_TYPE {
		return Some(SkipReason::Revision);
	}
	if ctx.content_type != DONATION_FORM_CONTENT_TYPE {
		return Some(SkipReason::NotDonationForm);
	}
	if !ctx.can_edit {
		return Some(SkipReason::PermissionDenied);
	}
	if !ctx.gateway_active {
		return Some(SkipReason::GatewayInactive);
	}

	None
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn multi_admin(periods: &[&str]) -> FormSaveContext {
		FormSaveContext {
			recurring_mode: RecurringMode::YesAdmin,
			price_option: PriceOption::Multi,
			level_periods: periods.iter().map(|p| p.to_string()).collect(),
			..FormSaveContext::new(11)
		}
	}

	#[test]
	fn multi_level_admin_forms_reject_any_denied_level() {
		let guard = PeriodGuard::default();
		let err = guard
			.validate(&multi_admin(&["month", "week", "year"]))
			.expect_err("A weekly level must abort the save.");

		assert_eq!(err, PeriodValidationError::DisallowedPeriod {
			period: RecurringPeriod::Week,
			form_id: 11
		});
		assert_eq!(err.status(), 400);
		assert_eq!(err.to_string(), DISALLOWED_PERIOD_MESSAGE);
	}

	#[test]
	fn monthly_and_yearly_levels_pass() {
		let guard = PeriodGuard::default();

		assert_eq!(
			guard.validate(&multi_admin(&["month", "year", "quarter", ""])),
			Ok(GuardDecision::Accepted)
		);
	}

	#[test]
	fn single_price_recurring_forms_check_the_submitted_period() {
		let guard = PeriodGuard::default();
		let ctx = FormSaveContext {
			recurring_mode: RecurringMode::YesDonor,
			period: Some("day".into()),
			form_is_recurring: true,
			..FormSaveContext::new(5)
		};

		assert!(guard.validate(&ctx).is_err());

		let not_recurring = FormSaveContext { form_is_recurring: false, ..ctx.clone() };

		assert_eq!(guard.validate(&not_recurring), Ok(GuardDecision::Accepted));

		let monthly = FormSaveContext { period: Some("month".into()), ..ctx };

		assert_eq!(guard.validate(&monthly), Ok(GuardDecision::Accepted));
	}

	#[test]
	fn donor_choice_multi_forms_fall_back_to_the_single_period() {
		let guard = PeriodGuard::default();
		let ctx = FormSaveContext {
			recurring_mode: RecurringMode::YesDonor,
			period: Some("week".into()),
			form_is_recurring: true,
			..multi_admin(&["month"])
		};

		assert!(guard.validate(&ctx).is_err());
	}

	#[test]
	fn guard_conditions_short_circuit() {
		let guard = PeriodGuard::default();
		let base = multi_admin(&["day"]);
		let cases = [
			(
				FormSaveContext { recurring_mode: RecurringMode::No, ..base.clone() },
				SkipReason::RecurringDisabled,
			),
			(FormSaveContext { autosave: true, ..base.clone() }, SkipReason::BackgroundSave),
			(FormSaveContext { ajax: true, ..base.clone() }, SkipReason::BackgroundSave),
			(FormSaveContext { bulk_edit: true, ..base.clone() }, SkipReason::BackgroundSave),
			(
				FormSaveContext { content_type: REVISION_CONTENT_TYPE.into(), ..base.clone() },
				SkipReason::Revision,
			),
			(
				FormSaveContext { content_type: "post".into(), ..base.clone() },
				SkipReason::NotDonationForm,
			),
			(FormSaveContext { can_edit: false, ..base.clone() }, SkipReason::PermissionDenied),
			(
				FormSaveContext { gateway_active: false, ..base.clone() },
				SkipReason::GatewayInactive,
			),
		];

		for (ctx, reason) in cases {
			assert_eq!(guard.validate(&ctx), Ok(GuardDecision::Skipped(reason)));
		}
	}

	#[test]
	fn raw_field_parsing() {
		assert_eq!(RecurringMode::from_raw(None), RecurringMode::No);
		assert_eq!(RecurringMode::from_raw(Some("yes_admin")), RecurringMode::YesAdmin);
		assert_eq!(PriceOption::from_raw(Some("multi")), PriceOption::Multi);
		assert_eq!(PriceOption::from_raw(Some("")), PriceOption::Set);
		assert!(PeriodGuard::default().is_denied(" day "));
		assert!(!PeriodGuard::default().is_denied("fortnight"));
	}

	#[test]
	fn unrecognized_recurring_mode_keeps_the_guard_engaged() {
		assert_eq!(RecurringMode::from_raw(Some("no")), RecurringMode::No);
		assert_eq!(RecurringMode::from_raw(Some("yes")), RecurringMode::Other);

		let weekly = FormSaveContext {
			recurring_mode: RecurringMode::from_raw(Some("yes")),
			period: Some("week".into()),
			form_is_recurring: true,
			..FormSaveContext::new(21)
		};

		assert_eq!(
			PeriodGuard::default().validate(&weekly),
			Err(PeriodValidationError::DisallowedPeriod { period: RecurringPeriod::Week, form_id: 21 })
		);
	}
}
