// self
use crate::{
	_prelude::*,
	id::{IdentifierError, MerchantId},
	settings::{DEFAULT_API_BASE, GatewaySettings, PassPhrase},
};

/// Errors raised while constructing or validating gateway settings.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SettingsError {
	/// Merchant identifier is mandatory.
	#[error("Missing merchant identifier.")]
	MissingMerchantId,
	/// Merchant identifier failed validation.
	#[error("Merchant identifier is invalid: {0}")]
	InvalidMerchantId(#[source] IdentifierError),
	/// API base could not be parsed.
	#[error("API base URL is invalid: {source}.")]
	InvalidApiBase {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// API base must use HTTPS; certificate verification is never optional.
	#[error("The API base URL must use HTTPS: {url}.")]
	InsecureApiBase {
		/// URL that failed validation.
		url: String,
	},
}

/// Builder for [`GatewaySettings`] values.
#[derive(Debug, Default)]
pub struct GatewaySettingsBuilder {
	/// Raw merchant identifier.
	pub merchant_id: Option<String>,
	/// Normalized pass-phrase.
	pub pass_phrase: Option<PassPhrase>,
	/// Sandbox flag.
	pub test_mode: bool,
	/// Optional API base override.
	pub api_base: Option<Url>,
}
impl GatewaySettingsBuilder {
	/// Creates an empty builder targeting production.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the merchant identifier.
	pub fn merchant_id(mut self, merchant_id: impl Into<String>) -> Self {
		self.merchant_id = Some(merchant_id.into());

		self
	}

	/// Sets the pass-phrase; blank values clear it.
	pub fn pass_phrase(mut self, pass_phrase: impl AsRef<str>) -> Self {
		self.pass_phrase = PassPhrase::new(pass_phrase);

		self
	}

	/// Toggles sandbox mode.
	pub fn test_mode(mut self, test_mode: bool) -> Self {
		self.test_mode = test_mode;

		self
	}

	/// Overrides the API base URL.
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting settings.
	pub fn build(self) -> Result<GatewaySettings, SettingsError> {
		let merchant_id = self.merchant_id.ok_or(SettingsError::MissingMerchantId)?;
		let merchant_id = MerchantId::new(merchant_id).map_err(SettingsError::InvalidMerchantId)?;
		let api_base = match self.api_base {
			Some(url) => url,
			None => Url::parse(DEFAULT_API_BASE)
				.map_err(|source| SettingsError::InvalidApiBase { source })?,
		};

		validate_api_base(&api_base)?;

		Ok(GatewaySettings {
			merchant_id,
			pass_phrase: self.pass_phrase,
			test_mode: self.test_mode,
			api_base,
		})
	}
}

fn validate_api_base(url: &Url) -> Result<(), SettingsError> {
	if url.scheme() != "https" {
		Err(SettingsError::InsecureApiBase { url: url.to_string() })
	} else {
		Ok(())
	}
}
