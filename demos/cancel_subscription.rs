//! Demonstrates cancelling a Payfast subscription through the gateway handler against a local
//! sandbox stand-in, then running the recurring-period guard on a weekly form save.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use payfast_recurring::{
	client::CancellationClient,
	gateway::{GatewayCancellationHandler, PayfastGateway, SubscriptionEvent},
	http::ReqwestHttpClient,
	id::ProfileId,
	period::{FormSaveContext, RecurringMode},
	reqwest::Client,
	settings::GatewaySettings,
	subscription::SubscriptionRef,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let cancel_mock = server
		.mock_async(|when, then| {
			when.method(PUT)
				.path("/subscriptions/2afa4575-5628-051a-d0ed-4e071b56a7b0/cancel")
				.query_param("testing", "true");
			then.status(200).header("content-type", "application/json").body(
				"{\"code\":\"200\",\"status\":\"success\",\"data\":{\"response\":true}}",
			);
		})
		.await;
	let settings = GatewaySettings::builder()
		.merchant_id("10000100")
		.pass_phrase("jt7NOE43FZPn")
		.test_mode(true)
		.api_base(Url::parse(&format!("https://{}", server.address()))?)
		.build()?;
	// The local stand-in serves a self-signed certificate; real deployments use
	// `CancellationClient::new`, which keeps verification on.
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let gateway =
		PayfastGateway::new(CancellationClient::with_http_client(Arc::new(settings), http_client));
	let subscription =
		SubscriptionRef::new(ProfileId::new("2afa4575-5628-051a-d0ed-4e071b56a7b0")?);
	let outcome = gateway
		.handle(SubscriptionEvent::CancelRequested { subscription_id: 42, subscription: &subscription })
		.await;

	println!("Cancellation outcome: {outcome:?}.");

	cancel_mock.assert_async().await;

	let weekly = FormSaveContext {
		recurring_mode: RecurringMode::YesAdmin,
		period: Some("week".into()),
		form_is_recurring: true,
		..FormSaveContext::new(7)
	};

	match gateway.validate_recurring_period(&weekly) {
		Ok(decision) => println!("Form save accepted: {decision:?}."),
		Err(e) => println!("Form save refused with {} {}: {e}", e.status(), e.title()),
	}

	Ok(())
}
