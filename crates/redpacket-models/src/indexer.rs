use alloy::primitives::{Address, Bytes, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A `DataWritten` row as served by the indexing service.
///
/// BigInt fields arrive as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataWrittenRecord {
    pub id: String,
    pub sender: String,
    pub value: String,
    pub note: String,
    pub block_timestamp: String,
}

impl DataWrittenRecord {
    pub fn value_u256(&self) -> Option<U256> {
        U256::from_str_radix(&self.value, 10).ok()
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let secs: i64 = self.block_timestamp.parse().ok()?;
        DateTime::from_timestamp(secs, 0)
    }
}

/// Decoded parameters of a Logger `DataWritten` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataWrittenEvent {
    pub sender: Address,
    pub value: U256,
    pub note: String,
}

/// Where an event was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventMeta {
    pub transaction_hash: B256,
    pub log_index: u64,
    pub block_number: u64,
    pub block_timestamp: u64,
}

/// Entity stored for each `DataWritten` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: Bytes,
    pub sender: Address,
    pub value: U256,
    pub note: String,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub transaction_hash: B256,
}

impl LogEntry {
    /// Maps one event to its entity. The id is the transaction hash followed by
    /// the log index as little-endian `i32`, so it is unique per log.
    pub fn from_event(event: DataWrittenEvent, meta: EventMeta) -> Self {
        let mut id = meta.transaction_hash.to_vec();
        id.extend_from_slice(&(meta.log_index as i32).to_le_bytes());

        Self {
            id: Bytes::from(id),
            sender: event.sender,
            value: event.value,
            note: event.note,
            block_number: meta.block_number,
            block_timestamp: meta.block_timestamp,
            transaction_hash: meta.transaction_hash,
        }
    }
}
