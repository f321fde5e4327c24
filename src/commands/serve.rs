//! Handler for the `llmcount serve` command.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use tracing::warn;

use crate::config::Config;
use crate::error::{LlmCountError, Result};
use crate::models::Provider;
use crate::provider::{Credentials, HttpCompletionClient};
use crate::server::{self, AppState};
use crate::service::CounterService;
use crate::utils;

#[derive(Debug)]
pub struct ServeCommandOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
}

pub fn run(options: ServeCommandOptions, config: &Config) -> Result<()> {
    let host = options.host.unwrap_or_else(|| config.server.host.clone());
    let port = options.port.unwrap_or(config.server.port);
    let ip: IpAddr = host
        .parse()
        .map_err(|_| LlmCountError::validation("--host", format!("invalid address '{host}'")))?;

    let credentials = Credentials::from_env();
    for provider in Provider::ALL {
        if credentials.get(provider).is_none() {
            warn!(
                %provider,
                "{} is not set; requests for these models will fail",
                provider.credential_env()
            );
        }
    }

    let client = HttpCompletionClient::new(&config.provider, credentials)?;
    let service = CounterService::new(client, config.limits.clone(), config.provider.clone());
    let state = Arc::new(AppState { service });

    utils::runtime()?.block_on(server::serve(SocketAddr::new(ip, port), state))
}
