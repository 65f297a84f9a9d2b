use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://viacep.com.br/ws";

/// Raw ViaCEP payload. Unknown codes come back 200 with `erro: true`
/// and the address fields absent.
#[derive(Debug, Deserialize)]
pub struct CepPayload {
    #[serde(default)]
    pub erro: bool,
    pub cep: Option<String>,
    pub logradouro: Option<String>,
    pub complemento: Option<String>,
    pub bairro: Option<String>,
    pub localidade: Option<String>,
    pub uf: Option<String>,
}

#[derive(Clone)]
pub struct ViaCepClient {
    client: Client,
    base_url: String,
}

impl ViaCepClient {
    pub fn new(base_url: &str, timeout_seconds: u64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("cadastro/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_shared_client(client, base_url))
    }

    #[must_use]
    pub fn with_shared_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetches a CEP record. `digits` must already be the canonical
    /// 8-digit form. `Ok(None)` means the remote rejected the code;
    /// network and timeout failures surface as `Err`.
    pub async fn get_cep(&self, digits: &str) -> Result<Option<CepPayload>, reqwest::Error> {
        let url = format!("{}/{}/json/", self.base_url, digits);
        let response = self.client.get(&url).send().await?;

        if response.status().is_client_error() {
            return Ok(None);
        }

        let response = response.error_for_status()?;
        let payload: CepPayload = response.json().await?;
        Ok(Some(payload))
    }
}
