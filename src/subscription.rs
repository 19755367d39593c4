//! Subscription records handed to the adapter by the donation host.

// self
use crate::{_prelude::*, id::ProfileId};

/// Gateway tag the adapter answers to.
pub const GATEWAY_ID: &str = "payfast";

/// Lifecycle states a host subscription can be in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
	/// Created but the first payment has not cleared.
	Pending,
	/// Billing normally.
	Active,
	/// Cancelled by the donor or an administrator.
	Cancelled,
	/// Reached its end date.
	Expired,
	/// All scheduled payments were collected.
	Completed,
	/// Recent renewal failed.
	Failing,
	/// Temporarily halted.
	Suspended,
	/// Abandoned before activation.
	Abandoned,
	/// Any status this adapter does not model.
	#[serde(untagged)]
	Other(String),
}
impl SubscriptionStatus {
	/// Returns the host's status label.
	pub fn as_str(&self) -> &str {
		match self {
			SubscriptionStatus::Pending => "pending",
			SubscriptionStatus::Active => "active",
			SubscriptionStatus::Cancelled => "cancelled",
			SubscriptionStatus::Expired => "expired",
			SubscriptionStatus::Completed => "completed",
			SubscriptionStatus::Failing => "failing",
			SubscriptionStatus::Suspended => "suspended",
			SubscriptionStatus::Abandoned => "abandoned",
			SubscriptionStatus::Other(label) => label,
		}
	}
}
impl Display for SubscriptionStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for SubscriptionStatus {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s.trim() {
			"pending" => SubscriptionStatus::Pending,
			"active" => SubscriptionStatus::Active,
			"cancelled" => SubscriptionStatus::Cancelled,
			"expired" => SubscriptionStatus::Expired,
			"completed" => SubscriptionStatus::Completed,
			"failing" => SubscriptionStatus::Failing,
			"suspended" => SubscriptionStatus::Suspended,
			"abandoned" => SubscriptionStatus::Abandoned,
			other => SubscriptionStatus::Other(other.to_owned()),
		})
	}
}

/// Read-only view of a host subscription.
pub trait SubscriptionRecord
where
	Self: Send + Sync,
{
	/// Remote profile identifier.
	fn profile_id(&self) -> &ProfileId;

	/// Gateway tag recorded by the host, if any.
	fn gateway(&self) -> Option<&str>;

	/// Current lifecycle status.
	fn status(&self) -> &SubscriptionStatus;

	/// Returns `true` unless the record carries a gateway tag other than [`GATEWAY_ID`].
	///
	/// An untagged record is treated as ours.
	fn belongs_to_gateway(&self) -> bool {
		self.gateway().is_none_or(|gateway| gateway == GATEWAY_ID)
	}
}

/// Plain subscription value for hosts without their own record type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRef {
	/// Remote profile identifier.
	pub profile_id: ProfileId,
	/// Gateway tag, if recorded.
	#[serde(default)]
	pub gateway: Option<String>,
	/// Lifecycle status.
	pub status: SubscriptionStatus,
}
impl SubscriptionRef {
	/// Creates an active subscription tagged with [`GATEWAY_ID`].
	pub fn new(profile_id: ProfileId) -> Self {
		Self {
			profile_id,
			gateway: Some(GATEWAY_ID.to_owned()),
			status: SubscriptionStatus::Active,
		}
	}

	/// Overrides the gateway tag.
	pub fn with_gateway(mut self, gateway: Option<impl Into<String>>) -> Self {
		self.gateway = gateway.map(Into::into);

		self
	}

	/// Overrides the status.
	pub fn with_status(mut self, status: SubscriptionStatus) -> Self {
		self.status = status;

		self
	}
}
impl SubscriptionRecord for SubscriptionRef {
	fn profile_id(&self) -> &ProfileId {
		&self.profile_id
	}

	fn gateway(&self) -> Option<&str> {
		self.gateway.as_deref()
	}

	fn status(&self) -> &SubscriptionStatus {
		&self.status
	}
}

/// Returns `true` when the subscription may be cancelled through this gateway.
///
/// Only active subscriptions qualify.
pub fn can_cancel(subscription: &(impl SubscriptionRecord + ?Sized)) -> bool {
	*subscription.status() == SubscriptionStatus::Active
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn profile() -> ProfileId {
		ProfileId::new("2afa4575-5628-051a-d0ed-4e071b56a7b0")
			.expect("Profile fixture should be valid.")
	}

	#[test]
	fn only_active_subscriptions_can_cancel() {
		let active = SubscriptionRef::new(profile());

		assert!(can_cancel(&active));

		for status in ["pending", "cancelled", "expired", "suspended", "on_hold"] {
			let record =
				active.clone().with_status(status.parse().expect("Status parsing is infallible."));

			assert!(!can_cancel(&record), "Status `{status}` must not be cancellable.");
		}
	}

	#[test]
	fn gateway_ownership_checks() {
		let ours = SubscriptionRef::new(profile());
		let untagged = ours.clone().with_gateway(None::<String>);
		let foreign = ours.clone().with_gateway(Some("stripe"));

		assert!(ours.belongs_to_gateway());
		assert!(untagged.belongs_to_gateway());
		assert!(!foreign.belongs_to_gateway());
	}

	#[test]
	fn status_labels_round_trip() {
		let record: SubscriptionRef = serde_json::from_str(
			r#"{"profile_id":"abc-123","gateway":"payfast","status":"on_hold"}"#,
		)
		.expect("Subscription payload should deserialize.");

		assert_eq!(record.status, SubscriptionStatus::Other("on_hold".into()));
		assert_eq!(record.status.to_string(), "on_hold");
		assert_eq!(
			serde_json::to_string(&SubscriptionStatus::Active).expect("Status should serialize."),
			"\"active\""
		);
	}
}
