use crate::Result;
use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use redpacket_models::{CreatePacketRequest, PacketDetail, PacketId};

/// Outcome of a confirmed `createPacket` transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedPacket {
    pub tx_hash: TxHash,
    /// Identifier taken from the `PacketCreated` log, when the receipt carries one.
    pub id: Option<PacketId>,
}

/// Red packet operations against a deployed contract.
///
/// Write operations wait for the transaction receipt before returning.
#[async_trait]
pub trait RedPacketService: Send + Sync {
    /// Account that signs write operations, if any.
    fn account(&self) -> Option<Address>;

    /// Submit a validated create request.
    async fn submit_create(&self, request: CreatePacketRequest) -> Result<CreatedPacket>;

    /// Claim one share of a packet. Only the transaction hash is returned;
    /// callers re-query balances and packets to observe the effect.
    async fn grab_packet(&self, id: PacketId) -> Result<TxHash>;

    async fn check_packet(&self, id: PacketId) -> Result<PacketDetail>;

    /// Every packet, newest first.
    async fn list_packets(&self) -> Result<Vec<PacketDetail>>;

    /// Balance in wei.
    async fn get_balance(&self, address: Address) -> Result<U256>;

    /// Create a packet from form input, converting the decimal ether amount to wei.
    async fn create_packet(
        &self,
        total_shares: u64,
        is_equal: bool,
        amount: &str,
    ) -> Result<CreatedPacket> {
        let request = CreatePacketRequest::parse(total_shares, is_equal, amount)?;
        self.submit_create(request).await
    }
}
