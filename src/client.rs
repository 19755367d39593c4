//! Signed cancellation client for Payfast recurring-billing subscriptions.
//!
//! [`CancellationClient::cancel`] issues exactly one authenticated
//! `PUT {base}/subscriptions/{profile_id}/cancel` per invocation (appending `testing=true`
//! in sandbox mode) and folds every failure into a [`CancellationOutcome`]. The client keeps
//! no mutable state, so one instance can serve concurrent callers; duplicate events produce
//! duplicate requests and idempotency is left to the provider. Retries belong to the caller.

pub mod outcome;

pub use outcome::*;

// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	http::{ApiHttpClient, ApiRequest, HttpMethod},
	id::ProfileId,
	obs::{self, CallKind, CallOutcome, CallSpan},
	settings::SettingsProvider,
	signing::{self, Clock, LocalClock, SignatureFields, Timestamp},
	subscription::SubscriptionRecord,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestCancellationClient = CancellationClient<ReqwestHttpClient>;

/// Cancels remote subscriptions through the Payfast subscriptions API.
///
/// Settings, transport, and clock are injected at construction; nothing is read from
/// ambient configuration.
#[derive(Clone)]
pub struct CancellationClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// HTTP client used for every outbound call.
	pub http_client: Arc<C>,
	/// Merchant credentials and mode flags.
	pub settings: Arc<dyn SettingsProvider>,
	/// Source of request timestamps.
	pub clock: Arc<dyn Clock>,
	/// Per-request timeout.
	pub timeout: Duration,
}
impl<C> CancellationClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(
		settings: Arc<dyn SettingsProvider>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			settings,
			clock: Arc::new(LocalClock),
			timeout: ApiRequest::DEFAULT_TIMEOUT,
		}
	}

	/// Replaces the clock used to stamp requests.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Overrides the per-request timeout (defaults to 60 seconds).
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Builds the cancellation endpoint for `profile_id`.
	///
	/// The profile id is appended as a single encoded path segment below the configured base.
	pub fn cancel_url(&self, profile_id: &ProfileId) -> Result<Url, ConfigError> {
		let mut url = self.settings.api_base().clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::CannotBeABase {
				url: self.settings.api_base().to_string(),
			})?
			.pop_if_empty()
			.extend(["subscriptions", profile_id.as_str(), "cancel"]);

		if self.settings.test_mode() {
			url.query_pairs_mut().append_pair("testing", "true");
		}

		Ok(url)
	}

	/// Assembles the signed cancellation request stamped with `timestamp`.
	///
	/// Cancellation signs no payload fields and sends an empty body.
	pub fn cancel_request(
		&self,
		profile_id: &ProfileId,
		timestamp: Timestamp,
	) -> Result<ApiRequest, ConfigError> {
		let url = self.cancel_url(profile_id)?;
		let headers = signing::sign(self.settings.as_ref(), timestamp, &SignatureFields::new());
		let mut request = ApiRequest::new(HttpMethod::Put, url).with_timeout(self.timeout);

		for (name, value) in headers.to_pairs() {
			request = request.with_header(name, value);
		}

		Ok(request)
	}

	/// Cancels `subscription` at the provider.
	///
	/// Records tagged with another gateway are skipped without any network traffic.
	pub async fn cancel<S>(&self, subscription: &S) -> CancellationOutcome
	where
		S: ?Sized + SubscriptionRecord,
	{
		const KIND: CallKind = CallKind::Cancel;

		let span = CallSpan::new(KIND, subscription.profile_id());

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let outcome = span
			.instrument(async move {
				if !subscription.belongs_to_gateway() {
					let gateway = subscription.gateway().unwrap_or_default().to_owned();

					#[cfg(feature = "tracing")]
					tracing::debug!(gateway = %gateway, "Subscription belongs to another gateway.");

					return CancellationOutcome::Skipped { gateway };
				}

				let timestamp = self.clock.now();
				let request = match self.cancel_request(subscription.profile_id(), timestamp) {
					Ok(request) => request,
					Err(e) => return CancellationOutcome::TransportError(e.into()),
				};
				let response = match self.http_client.execute(request).await {
					Ok(response) => response,
					Err(e) => {
						#[cfg(feature = "tracing")]
						tracing::warn!(error = %e, "Cancellation request failed in transport.");

						return CancellationOutcome::TransportError(TransportError::network(e));
					},
				};

				obs::record_provider_status(KIND, response.status);

				let outcome = interpret_response(response.status, &response.body);

				#[cfg(feature = "tracing")]
				{
					if let CancellationOutcome::Rejected(rejection) = &outcome {
						tracing::warn!(
							status = rejection.status,
							code = ?rejection.code,
							detail = ?rejection.detail,
							"Provider did not confirm the cancellation."
						);
					}
				}

				outcome
			})
			.await;

		span.record_outcome(outcome.label());
		obs::record_call_outcome(KIND, outcome.label());

		outcome
	}

	/// Boolean wrapper around [`cancel`](Self::cancel): `true` only when the provider
	/// confirmed the cancellation.
	pub async fn cancel_flag<S>(&self, subscription: &S) -> bool
	where
		S: ?Sized + SubscriptionRecord,
	{
		self.cancel(subscription).await.is_cancelled()
	}
}
#[cfg(feature = "reqwest")]
impl CancellationClient<ReqwestHttpClient> {
	/// Creates a client backed by a default (certificate-verifying) reqwest transport.
	pub fn new(settings: Arc<dyn SettingsProvider>) -> Self {
		Self::with_http_client(settings, ReqwestHttpClient::default())
	}
}
impl<C> Debug for CancellationClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CancellationClient")
			.field("merchant_id", &self.settings.merchant_id())
			.field("test_mode", &self.settings.test_mode())
			.field("timeout", &self.timeout)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::*,
		settings::GatewaySettings,
		subscription::{SubscriptionRef, SubscriptionStatus},
	};

	fn client(
		settings: GatewaySettings,
		transport: RecordingHttpClient,
	) -> (CancellationClient<RecordingHttpClient>, Arc<RecordingHttpClient>) {
		let transport = Arc::new(transport);
		let client = CancellationClient::with_http_client(Arc::new(settings), transport.clone())
			.with_clock(test_clock());

		(client, transport)
	}

	fn subscription() -> SubscriptionRef {
		SubscriptionRef::new(
			ProfileId::new("2afa4575-5628-051a-d0ed-4e071b56a7b0")
				.expect("Profile fixture should be valid."),
		)
	}

	#[test]
	fn cancel_url_appends_testing_flag_only_in_sandbox() {
		let profile = subscription().profile_id;
		let (live, _) = client(
			test_settings_builder().build().expect("Live settings should build."),
			RecordingHttpClient::default(),
		);
		let (sandbox, _) = client(
			test_settings_builder().test_mode(true).build().expect("Sandbox settings should build."),
			RecordingHttpClient::default(),
		);

		assert_eq!(
			live.cancel_url(&profile).expect("Live URL should build.").as_str(),
			"https://api.payfast.co.za/subscriptions/2afa4575-5628-051a-d0ed-4e071b56a7b0/cancel"
		);
		assert_eq!(
			sandbox.cancel_url(&profile).expect("Sandbox URL should build.").as_str(),
			"https://api.payfast.co.za/subscriptions/2afa4575-5628-051a-d0ed-4e071b56a7b0/cancel?testing=true"
		);
	}

	#[test]
	fn cancel_url_respects_base_paths_and_encodes_profile() {
		let settings = test_settings_builder()
			.api_base(Url::parse("https://gateway.example.com/payfast/").expect("Base should parse."))
			.build()
			.expect("Settings with base path should build.");
		let (client, _) = client(settings, RecordingHttpClient::default());
		let profile = ProfileId::new("a/b?c").expect("Profile fixture should be valid.");

		assert_eq!(
			client.cancel_url(&profile).expect("URL should build.").as_str(),
			"https://gateway.example.com/payfast/subscriptions/a%2Fb%3Fc/cancel"
		);
	}

	#[test]
	fn test_mode_does_not_alter_signed_headers() {
		let profile = subscription().profile_id;
		let stamp = test_clock().now();
		let (live, _) = client(
			test_settings_builder().build().expect("Live settings should build."),
			RecordingHttpClient::default(),
		);
		let (sandbox, _) = client(
			test_settings_builder().test_mode(true).build().expect("Sandbox settings should build."),
			RecordingHttpClient::default(),
		);
		let live = live.cancel_request(&profile, stamp).expect("Live request should build.");
		let sandbox = sandbox.cancel_request(&profile, stamp).expect("Sandbox request should build.");

		assert_eq!(live.headers, sandbox.headers);
		assert_ne!(live.url, sandbox.url);
	}

	#[tokio::test]
	async fn cancel_sends_one_signed_put() {
		let (client, transport) = client(
			test_settings_builder().build().expect("Settings should build."),
			RecordingHttpClient::responding(200, r#"{"code":"200","status":"success"}"#),
		);
		let outcome = client.cancel(&subscription()).await;

		assert!(outcome.is_cancelled());

		let requests = transport.requests();

		assert_eq!(requests.len(), 1);

		let request = &requests[0];

		assert_eq!(request.method, HttpMethod::Put);
		assert!(request.body.is_empty());
		assert_eq!(request.timeout, Duration::seconds(60));
		assert_eq!(request.header("version"), Some("v1"));
		assert_eq!(request.header("merchant-id"), Some(TEST_MERCHANT_ID));
		assert_eq!(request.header("timestamp"), Some(TEST_TIMESTAMP));
		assert_eq!(request.header("signature"), Some("3257c9cd740f7c9863a55e1f711a88cc"));
		assert_eq!(
			request.headers.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
			["version", "merchant-id", "signature", "timestamp"]
		);
	}

	#[tokio::test]
	async fn foreign_gateways_are_skipped_without_traffic() {
		let (client, transport) = client(
			test_settings_builder().build().expect("Settings should build."),
			RecordingHttpClient::responding(200, r#"{"code":"200"}"#),
		);
		let foreign = subscription().with_gateway(Some("paypal"));
		let outcome = client.cancel(&foreign).await;

		assert!(matches!(&outcome, CancellationOutcome::Skipped { gateway } if gateway == "paypal"));
		assert!(!client.cancel_flag(&foreign).await);
		assert!(transport.requests().is_empty());
	}

	#[tokio::test]
	async fn standing_reply_answers_every_request() {
		let (client, transport) = client(
			test_settings_builder().build().expect("Settings should build."),
			RecordingHttpClient::responding(200, r#"{"code":"200"}"#),
		);

		assert!(client.cancel_flag(&subscription()).await);
		assert!(client.cancel_flag(&subscription()).await);
		assert_eq!(transport.requests().len(), 2);
	}

	#[tokio::test]
	async fn untagged_records_are_cancelled() {
		let (client, transport) = client(
			test_settings_builder().build().expect("Settings should build."),
			RecordingHttpClient::responding(200, r#"{"code":"200"}"#),
		);
		let untagged = subscription()
			.with_gateway(None::<String>)
			.with_status(SubscriptionStatus::Suspended);

		assert!(client.cancel_flag(&untagged).await);
		assert_eq!(transport.requests().len(), 1);
	}

	#[tokio::test]
	async fn transport_failures_are_not_retried() {
		let (client, transport) = client(
			test_settings_builder().build().expect("Settings should build."),
			RecordingHttpClient::scripted([
				ScriptedReply::Fail("connection reset"),
				ScriptedReply::Respond(200, r#"{"code":"200"}"#.into()),
			]),
		);
		let outcome = client.cancel(&subscription()).await;

		assert!(matches!(
			outcome,
			CancellationOutcome::TransportError(TransportError::Network { .. })
		));
		assert_eq!(outcome.label(), CallOutcome::Failure);
		assert_eq!(transport.requests().len(), 1);
	}

	#[tokio::test]
	async fn provider_rejections_surface_status_and_code() {
		let (client, _) = client(
			test_settings_builder().build().expect("Settings should build."),
			RecordingHttpClient::responding(401, r#"{"code":401,"status":"failed"}"#),
		);

		match client.cancel(&subscription()).await {
			CancellationOutcome::Rejected(rejection) => {
				assert_eq!(rejection.status, 401);
				assert_eq!(rejection.code, Some(serde_json::json!(401)));
			},
			other => panic!("Expected a rejection, got {other:?}."),
		}
	}
}
