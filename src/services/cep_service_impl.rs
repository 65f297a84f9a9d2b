//! ViaCEP-backed implementation of the `CepService` trait.

use async_trait::async_trait;
use tracing::warn;

use crate::clients::ViaCepClient;
use crate::services::cep_service::{CepError, CepInfo, CepService, canonicalize};

pub struct ViaCepService {
    client: ViaCepClient,
}

impl ViaCepService {
    #[must_use]
    pub const fn new(client: ViaCepClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CepService for ViaCepService {
    async fn resolve(&self, postal_code: &str) -> Result<CepInfo, CepError> {
        let digits = canonicalize(postal_code)?;

        let payload = match self.client.get_cep(&digits).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!("ViaCEP lookup failed for {digits}: {err}");
                return Err(CepError::Unavailable(digits));
            }
        };

        // The remote answers 200 with `erro: true` for unknown codes;
        // a record without street/city is equally unusable.
        let Some(payload) = payload else {
            return Err(CepError::NotFound(digits));
        };

        if payload.erro {
            return Err(CepError::NotFound(digits));
        }

        let (Some(street), Some(city)) = (payload.logradouro, payload.localidade) else {
            return Err(CepError::NotFound(digits));
        };

        Ok(CepInfo {
            postal_code: digits,
            street,
            neighborhood: payload.bairro.unwrap_or_default(),
            city,
            state: payload.uf.unwrap_or_default(),
        })
    }
}
