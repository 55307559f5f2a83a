use serde::{Deserialize, Serialize};

use crate::format::{self, FormatError};

/// One chain block as returned by `eth_getBlockByNumber` without full transactions.
///
/// Numeric fields stay in the node's hex encoding; the accessors parse them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSnapshot {
    pub number: String,
    pub hash: String,
    pub timestamp: String,
    pub miner: String,
    pub gas_used: String,
    pub gas_limit: String,
    #[serde(default)]
    pub transactions: Vec<String>,
}

impl BlockSnapshot {
    pub fn number_u64(&self) -> Result<u64, FormatError> {
        format::parse_hex_quantity(&self.number)
    }

    pub fn timestamp_secs(&self) -> Result<u64, FormatError> {
        format::parse_hex_quantity(&self.timestamp)
    }

    pub fn gas_used_u64(&self) -> Result<u64, FormatError> {
        format::parse_hex_quantity(&self.gas_used)
    }

    pub fn gas_limit_u64(&self) -> Result<u64, FormatError> {
        format::parse_hex_quantity(&self.gas_limit)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}
