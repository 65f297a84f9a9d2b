//! Postal-code (CEP) normalization seam.
//!
//! Address location fields are always derived from a resolution, never
//! taken from the client. The trait exists so tests can script the
//! collaborator without the network.

use async_trait::async_trait;
use thiserror::Error;

/// Canonical resolution of a postal code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CepInfo {
    /// Canonical 8-digit form.
    pub postal_code: String,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

/// Failure taxonomy of the external lookup. All three are recoverable
/// request-level outcomes; a timeout is `Unavailable`, not a crash.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CepError {
    #[error("Postal code must have 8 digits: {0}")]
    Malformed(String),

    #[error("Postal code not found: {0}")]
    NotFound(String),

    #[error("Postal code lookup unavailable for: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CepService: Send + Sync {
    /// Resolves a postal code to its canonical address fields.
    async fn resolve(&self, postal_code: &str) -> Result<CepInfo, CepError>;
}

/// Strips non-digits and enforces the 8-digit canonical form, the only
/// shape the remote accepts.
pub fn canonicalize(postal_code: &str) -> Result<String, CepError> {
    let digits: String = postal_code.chars().filter(char::is_ascii_digit).collect();

    if digits.len() != 8 {
        return Err(CepError::Malformed(postal_code.to_string()));
    }

    Ok(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_separators() {
        assert_eq!(canonicalize("01001-000").unwrap(), "01001000");
        assert_eq!(canonicalize("01 001 000").unwrap(), "01001000");
        assert_eq!(canonicalize("01001000").unwrap(), "01001000");
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(canonicalize(""), Err(CepError::Malformed(_))));
        assert!(matches!(canonicalize("1234"), Err(CepError::Malformed(_))));
        assert!(matches!(
            canonicalize("123456789"),
            Err(CepError::Malformed(_))
        ));
        assert!(matches!(canonicalize("abcdefgh"), Err(CepError::Malformed(_))));
    }
}
