//! Pass-phrase wrapper that redacts sensitive material.

// self
use crate::_prelude::*;

/// Redacted merchant pass-phrase keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassPhrase(String);
impl PassPhrase {
	/// Wraps a pass-phrase, returning `None` when it is blank after trimming.
	pub fn new(value: impl AsRef<str>) -> Option<Self> {
		let trimmed = value.as_ref().trim();

		if trimmed.is_empty() { None } else { Some(Self(trimmed.to_owned())) }
	}

	/// Returns the inner pass-phrase. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for PassPhrase {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for PassPhrase {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("PassPhrase").field(&"<redacted>").finish()
	}
}
impl Display for PassPhrase {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn pass_phrase_formatters_redact() {
		let secret = PassPhrase::new(" super-secret ").expect("Non-blank pass-phrase should wrap.");

		assert_eq!(secret.expose(), "super-secret");
		assert_eq!(format!("{secret:?}"), "PassPhrase(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn blank_pass_phrases_are_absent() {
		assert!(PassPhrase::new("").is_none());
		assert!(PassPhrase::new(" \t\n").is_none());
	}
}
