use std::{sync::Arc, time::Duration};

use reqwest::Client;

use crate::{
    clock::SystemClock,
    configuration::Config,
    error::Error,
    provider::KrakenLedger,
    types::Credentials,
};

/// Shared upstream HTTP client. Every call is bounded by the configured
/// timeout.
#[derive(Debug)]
pub struct HTTP {
    pub config: Config,
    pub client: Client,
}

impl HTTP {
    pub fn new(config: Config) -> Result<HTTP, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(HTTP { config, client })
    }

    /// Ledger listing bound to one set of credentials.
    pub fn ledger(&self, credentials: &Credentials) -> Result<KrakenLedger, Error> {
        let url = self.config.get_ledger_url()?;
        KrakenLedger::new(
            self.client.clone(),
            url,
            credentials,
            Arc::new(SystemClock),
        )
    }
}
