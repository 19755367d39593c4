//! Recurring gateway surface exposed to the donation host.
//!
//! Instead of registering callbacks on a global named-event bus, the host's orchestration
//! layer holds a [`GatewayCancellationHandler`] and invokes it directly whenever a
//! [`SubscriptionEvent`] occurs. [`PayfastGateway`] is the Payfast implementation; it also
//! covers the remaining gateway contract pieces (identity, off-site checkout, signup profile
//! assignment, cancellability).

// self
use crate::{
	_prelude::*,
	client::{CancellationClient, CancellationOutcome},
	http::ApiHttpClient,
	id::ProfileId,
	period::{FormSaveContext, GuardDecision, PeriodGuard, PeriodValidationError},
	subscription::{self, GATEWAY_ID, SubscriptionRecord},
};

/// Boxed future returned by [`GatewayCancellationHandler::handle`].
pub type HandlerFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a + Send>>;

/// Subscription lifecycle events the host forwards to a gateway.
#[derive(Clone, Copy)]
pub enum SubscriptionEvent<'a> {
	/// A donor or administrator asked for the subscription to be cancelled.
	CancelRequested {
		/// Host-side subscription identifier.
		subscription_id: u64,
		/// Subscription record.
		subscription: &'a dyn SubscriptionRecord,
	},
	/// The host already marked the subscription cancelled.
	Cancelled {
		/// Host-side subscription identifier.
		subscription_id: u64,
		/// Subscription record.
		subscription: &'a dyn SubscriptionRecord,
	},
}
impl<'a> SubscriptionEvent<'a> {
	/// Host-side subscription identifier carried by the event.
	pub fn subscription_id(&self) -> u64 {
		match self {
			SubscriptionEvent::CancelRequested { subscription_id, .. }
			| SubscriptionEvent::Cancelled { subscription_id, .. } => *subscription_id,
		}
	}

	/// Subscription record carried by the event.
	pub fn subscription(&self) -> &'a dyn SubscriptionRecord {
		match self {
			SubscriptionEvent::CancelRequested { subscription, .. }
			| SubscriptionEvent::Cancelled { subscription, .. } => *subscription,
		}
	}
}
impl Debug for SubscriptionEvent<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let name = match self {
			SubscriptionEvent::CancelRequested { .. } => "CancelRequested",
			SubscriptionEvent::Cancelled { .. } => "Cancelled",
		};

		f.debug_struct(name)
			.field("subscription_id", &self.subscription_id())
			.field("profile_id", self.subscription().profile_id())
			.finish()
	}
}

/// Capability invoked by the host when a subscription cancellation event occurs.
pub trait GatewayCancellationHandler
where
	Self: Send + Sync,
{
	/// Gateway tag this handler answers to.
	fn gateway_id(&self) -> &str;

	/// Handles a subscription event, cancelling the remote profile when applicable.
	fn handle<'a>(
		&'a self,
		event: SubscriptionEvent<'a>,
	) -> HandlerFuture<'a, CancellationOutcome>;
}

/// Payfast recurring gateway.
pub struct PayfastGateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Client used for remote cancellations.
	pub client: CancellationClient<C>,
	/// Guard applied to donation-form saves.
	pub period_guard: PeriodGuard,
}
impl<C> PayfastGateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a gateway around `client` with the default period guard.
	pub fn new(client: CancellationClient<C>) -> Self {
		Self { client, period_guard: PeriodGuard::default() }
	}

	/// Gateway identifier.
	pub fn id(&self) -> &'static str {
		GATEWAY_ID
	}

	/// Donors complete payment on the provider's hosted page.
	pub fn is_offsite(&self) -> bool {
		true
	}

	/// Assigns the signup profile identifier for a purchase.
	pub fn create_payment_profile(&self, purchase_key: &str) -> Result<ProfileId> {
		Ok(ProfileId::for_purchase(purchase_key)?)
	}

	/// Runs the recurring-period guard for a donation-form save.
	pub fn validate_recurring_period(
		&self,
		ctx: &FormSaveContext,
	) -> Result<GuardDecision, PeriodValidationError> {
		self.period_guard.validate(ctx)
	}

	/// Returns `true` when the subscription may be cancelled (active only).
	pub fn can_cancel(&self, subscription: &dyn SubscriptionRecord) -> bool {
		subscription::can_cancel(subscription)
	}
}
impl<C> GatewayCancellationHandler for PayfastGateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn gateway_id(&self) -> &str {
		self.id()
	}

	fn handle<'a>(
		&'a self,
		event: SubscriptionEvent<'a>,
	) -> HandlerFuture<'a, CancellationOutcome> {
		Box::pin(async move { self.client.cancel(event.subscription()).await })
	}
}
impl<C> Debug for PayfastGateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PayfastGateway")
			.field("client", &self.client)
			.field("period_guard", &self.period_guard)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, period::RecurringMode, subscription::SubscriptionRef};

	fn gateway(transport: Arc<RecordingHttpClient>) -> PayfastGateway<RecordingHttpClient> {
		let settings = test_settings_builder().build().expect("Settings should build.");
		let client = CancellationClient::with_http_client(Arc::new(settings), transport)
			.with_clock(test_clock());

		PayfastGateway::new(client)
	}

	#[test]
	fn gateway_contract_basics() {
		let gateway = gateway(Arc::new(RecordingHttpClient::default()));

		assert_eq!(gateway.gateway_id(), "payfast");
		assert!(gateway.is_offsite());
		assert_eq!(
			gateway.create_payment_profile("9c1d2e").expect("Purchase key should be valid.").as_str(),
			"payfast-9c1d2e"
		);

		let weekly = FormSaveContext {
			recurring_mode: RecurringMode::YesAdmin,
			period: Some("week".into()),
			form_is_recurring: true,
			..FormSaveContext::new(3)
		};

		assert!(gateway.validate_recurring_period(&FormSaveContext::new(3)).is_ok());
		assert!(gateway.validate_recurring_period(&weekly).is_err());
	}

	#[test]
	fn blank_purchase_keys_surface_as_identifier_errors() {
		let gateway = gateway(Arc::new(RecordingHttpClient::default()));

		assert!(matches!(
			gateway.create_payment_profile("  "),
			Err(Error::Identifier(crate::id::IdentifierError::Empty { .. }))
		));
	}

	#[tokio::test]
	async fn both_events_dispatch_a_cancellation() {
		let transport = Arc::new(RecordingHttpClient::scripted([
			ScriptedReply::Respond(200, r#"{"code":"200"}"#.into()),
			ScriptedReply::Respond(200, r#"{"code":"200"}"#.into()),
		]));
		let gateway = gateway(transport.clone());
		let record = SubscriptionRef::new(
			ProfileId::new("profile-42").expect("Profile fixture should be valid."),
		);
		let handler: &dyn GatewayCancellationHandler = &gateway;
		let requested = handler
			.handle(SubscriptionEvent::CancelRequested { subscription_id: 42, subscription: &record })
			.await;
		let cancelled = handler
			.handle(SubscriptionEvent::Cancelled { subscription_id: 42, subscription: &record })
			.await;

		assert!(requested.is_cancelled());
		assert!(cancelled.is_cancelled());
		assert_eq!(transport.requests().len(), 2);
	}

	#[test]
	fn event_accessors_expose_payload() {
		let record =
			SubscriptionRef::new(ProfileId::new("profile-7").expect("Profile fixture should be valid."));
		let event = SubscriptionEvent::Cancelled { subscription_id: 7, subscription: &record };

		assert_eq!(event.subscription_id(), 7);
		assert_eq!(event.subscription().profile_id().as_str(), "profile-7");
		assert_eq!(
			format!("{event:?}"),
			"Cancelled { subscription_id: 7, profile_id: Profile(profile-7) }"
		);
	}
}
