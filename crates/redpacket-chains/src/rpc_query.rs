use std::str::FromStr;

use alloy::{
    primitives::Address,
    providers::{DynProvider, Provider},
};
use redpacket_models::{BlockSnapshot, RpcResponse};
use tracing::{debug, warn};

/// Node queries that report failures in-band through [`RpcResponse`] instead
/// of returning an error.
#[derive(Clone)]
pub struct RpcQueryClient {
    provider: DynProvider,
}

impl RpcQueryClient {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }

    /// Balance of `address` in wei as a decimal integer string, `"0"` for an
    /// empty account.
    pub async fn get_balance(&self, address: &str) -> RpcResponse<String> {
        let Ok(parsed) = Address::from_str(address.trim()) else {
            return RpcResponse::err(format!("Invalid address {address:?}"));
        };

        debug!("Fetching balance of {parsed}");
        match self.provider.get_balance(parsed).await {
            Ok(wei) => RpcResponse::ok(wei.to_string()),
            Err(e) => {
                warn!("Balance query for {parsed} failed: {e}");
                RpcResponse::err(e.to_string())
            }
        }
    }

    /// Block header fields and transaction hashes of block `number`.
    pub async fn get_block(&self, number: u64) -> RpcResponse<BlockSnapshot> {
        debug!("Fetching block {number}");
        let block = self
            .provider
            .raw_request::<_, Option<BlockSnapshot>>(
                "eth_getBlockByNumber".into(),
                (format!("{number:#x}"), false),
            )
            .await;

        match block {
            Ok(Some(block)) => RpcResponse::ok(block),
            Ok(None) => RpcResponse::err(format!("Block {number} not found")),
            Err(e) => {
                warn!("Block query for {number} failed: {e}");
                RpcResponse::err(e.to_string())
            }
        }
    }
}
