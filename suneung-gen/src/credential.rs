//! Picks the credential for one run

use llm_client::ApiKey;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("No API key available. Enter one, add one with `suneung config add-key`, or set GEMINI_API_KEY.")]
pub struct MissingCredential;

/// Override wins when non-blank, otherwise the first default is used
pub fn resolve(
    override_key: Option<&str>,
    defaults: &[ApiKey],
) -> Result<ApiKey, MissingCredential> {
    if let Some(key) = override_key.and_then(|k| ApiKey::new(k)) {
        return Ok(key);
    }
    defaults.first().cloned().ok_or(MissingCredential)
}
