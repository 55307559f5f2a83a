use std::str::FromStr;

use alloy::{
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::{LocalSignerError, PrivateKeySigner},
    transports::http::reqwest::Url,
};
use snafu::{ResultExt, Snafu};
use tracing::info;

#[derive(Debug, Snafu)]
pub enum ProviderSetupError {
    #[snafu(display("Invalid RPC URL {url:?}: {source}"))]
    InvalidRpcUrl {
        url: String,
        source: url::ParseError,
    },

    #[snafu(display("Invalid private key: {source}"))]
    InvalidPrivateKey { source: LocalSignerError },
}

/// Read-only HTTP provider.
pub fn create_http_provider(rpc_url: &str) -> Result<DynProvider, ProviderSetupError> {
    let url = parse_rpc_url(rpc_url)?;
    Ok(ProviderBuilder::new().connect_http(url).erased())
}

/// HTTP provider that fills and signs transactions with the given key.
///
/// Returns the provider together with the signer's address.
pub fn create_wallet_provider(
    rpc_url: &str,
    private_key: &str,
) -> Result<(DynProvider, Address), ProviderSetupError> {
    let url = parse_rpc_url(rpc_url)?;
    let signer = PrivateKeySigner::from_str(private_key.trim_start_matches("0x"))
        .context(InvalidPrivateKeySnafu)?;
    let address = signer.address();
    info!("Signing transactions as {address}");

    let provider = ProviderBuilder::new()
        .wallet(signer)
        .connect_http(url)
        .erased();

    Ok((provider, address))
}

fn parse_rpc_url(rpc_url: &str) -> Result<Url, ProviderSetupError> {
    Url::parse(rpc_url).context(InvalidRpcUrlSnafu { url: rpc_url })
}
