use alloy::{
    network::ReceiptResponse,
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, Provider},
    rpc::types::Log,
};
use redpacket_models::{BlockSnapshot, DataWrittenEvent, EventMeta, LogEntry};
use snafu::{ensure, ResultExt};
use tracing::{debug, info};

use crate::contracts::Logger::{self, LoggerInstance};
use crate::error::{classify_contract_error, classify_rpc_error, PendingTransactionSnafu};
use crate::{Error, Result};

/// Writes records to the Logger contract.
pub struct LoggerClient {
    provider: DynProvider,
    contract: LoggerInstance<DynProvider>,
    account: Option<Address>,
}

impl LoggerClient {
    pub fn new(provider: DynProvider, contract_address: Address, account: Option<Address>) -> Self {
        let contract = Logger::new(contract_address, provider.clone());
        Self {
            provider,
            contract,
            account,
        }
    }

    /// Submits `writeData(value, note)` and returns the entities mapped from the
    /// `DataWritten` logs of the mined transaction.
    pub async fn write_data(&self, value: U256, note: &str) -> Result<Vec<LogEntry>> {
        let signer = self.account.ok_or(Error::WalletNotConnected)?;

        info!("Writing data to logger: value={value}, note={note:?}");
        let receipt = self
            .contract
            .writeData(value, note.to_string())
            .from(signer)
            .send()
            .await
            .map_err(|e| classify_contract_error(e, None))?
            .get_receipt()
            .await
            .context(PendingTransactionSnafu)?;

        let tx_hash = receipt.transaction_hash;
        ensure!(
            receipt.status(),
            crate::error::RevertedSnafu {
                action: "write logger data",
                tx_hash
            }
        );

        let entries = self
            .entries_from_logs(receipt.logs(), tx_hash, receipt.block_number)
            .await?;
        info!("Logger write {tx_hash} emitted {} entries", entries.len());
        Ok(entries)
    }

    /// Maps the `DataWritten` logs of one transaction. Logs without a block
    /// timestamp take it from the block, fetched at most once.
    async fn entries_from_logs(
        &self,
        logs: &[Log],
        tx_hash: TxHash,
        receipt_block: Option<u64>,
    ) -> Result<Vec<LogEntry>> {
        let logs: Vec<Log<Logger::DataWritten>> = logs
            .iter()
            .filter_map(|log| log.log_decode::<Logger::DataWritten>().ok())
            .collect();

        let mut block_timestamp = None;
        let mut entries = Vec::with_capacity(logs.len());
        for log in logs {
            let block_number = log
                .block_number
                .or(receipt_block)
                .unwrap_or_default();

            let timestamp = match log.block_timestamp.or(block_timestamp) {
                Some(timestamp) => timestamp,
                None => {
                    let timestamp = self.fetch_block_timestamp(block_number).await?;
                    block_timestamp = Some(timestamp);
                    timestamp
                }
            };

            let meta = EventMeta {
                transaction_hash: log.transaction_hash.unwrap_or(tx_hash),
                log_index: log.log_index.unwrap_or_default(),
                block_number,
                block_timestamp: timestamp,
            };
            let event = log.inner.data;
            entries.push(LogEntry::from_event(
                DataWrittenEvent {
                    sender: event.sender,
                    value: event.value,
                    note: event.note,
                },
                meta,
            ));
        }
        Ok(entries)
    }

    async fn fetch_block_timestamp(&self, block_number: u64) -> Result<u64> {
        debug!("Fetching timestamp of block {block_number}");
        let block = self
            .provider
            .raw_request::<_, Option<BlockSnapshot>>(
                "eth_getBlockByNumber".into(),
                (format!("{block_number:#x}"), false),
            )
            .await
            .map_err(|e| classify_rpc_error(e, None))?;

        match block.map(|block| block.timestamp_secs()) {
            Some(Ok(timestamp)) => Ok(timestamp),
            Some(Err(e)) => crate::error::NetworkSnafu {
                message: format!("Block {block_number} has a malformed timestamp: {e}"),
            }
            .fail(),
            None => crate::error::NetworkSnafu {
                message: format!("Block {block_number} not found"),
            }
            .fail(),
        }
    }
}
