use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{address, Address, TxHash, U256};
use async_trait::async_trait;
use redpacket_chains::{classify_message, CreatedPacket, Error, RedPacketService, Result};
use redpacket_models::{CreatePacketRequest, PacketDetail, PacketId, PacketRecord};
use tokio::sync::Notify;

pub const ACCOUNT: Address = address!("0x9146E804C874b4651C44685C95804A48b3F935f4");
pub const OTHER: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

const WEI_PER_SHARE: u64 = 1_000;

pub fn packet(id: PacketId, total_shares: u64, remaining_shares: u64) -> PacketDetail {
    PacketDetail::try_from_record(PacketRecord {
        id,
        sender: OTHER,
        total_amount: U256::from(total_shares * WEI_PER_SHARE),
        remaining_amount: U256::from(remaining_shares * WEI_PER_SHARE),
        total_shares: U256::from(total_shares),
        remaining_shares: U256::from(remaining_shares),
        is_equal: true,
    })
    .unwrap()
}

/// In-memory contract: packets are stored oldest first and listed newest first.
pub struct MockService {
    account: Option<Address>,
    balance: Mutex<U256>,
    packets: Mutex<Vec<PacketDetail>>,
    pub created: Mutex<Vec<CreatePacketRequest>>,
    pub balance_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub fail_balance: AtomicBool,
    /// When set, grabs wait for a notification before settling.
    pub grab_gate: Option<Arc<Notify>>,
}

impl MockService {
    pub fn new(account: Option<Address>) -> Self {
        Self {
            account,
            balance: Mutex::new(U256::ZERO),
            packets: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
            balance_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            fail_balance: AtomicBool::new(false),
            grab_gate: None,
        }
    }

    pub fn with_grab_gate(mut self, gate: Arc<Notify>) -> Self {
        self.grab_gate = Some(gate);
        self
    }

    pub fn with_packets(self, packets: Vec<PacketDetail>) -> Self {
        *self.packets.lock().unwrap() = packets;
        self
    }

    pub fn set_balance(&self, wei: U256) {
        *self.balance.lock().unwrap() = wei;
    }

    fn find(&self, id: PacketId) -> Result<PacketDetail> {
        self.packets
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id() == id)
            .cloned()
            .ok_or(Error::PacketNotFound { id })
    }
}

#[async_trait]
impl RedPacketService for MockService {
    fn account(&self) -> Option<Address> {
        self.account
    }

    async fn submit_create(&self, request: CreatePacketRequest) -> Result<CreatedPacket> {
        self.account.ok_or(Error::WalletNotConnected)?;
        self.created.lock().unwrap().push(request);

        let mut packets = self.packets.lock().unwrap();
        let id = packets.len() as PacketId;
        packets.push(packet(id, request.total_shares, request.total_shares));
        Ok(CreatedPacket {
            tx_hash: TxHash::repeat_byte(1),
            id: Some(id),
        })
    }

    async fn grab_packet(&self, id: PacketId) -> Result<TxHash> {
        self.account.ok_or(Error::WalletNotConnected)?;
        if let Some(gate) = &self.grab_gate {
            gate.notified().await;
        }

        let current = self.find(id)?;
        if current.is_exhausted() {
            return Err(Error::PacketExhausted { id });
        }

        let mut packets = self.packets.lock().unwrap();
        if let Some(slot) = packets.iter_mut().find(|p| p.id() == id) {
            *slot = packet(id, current.total_shares(), current.remaining_shares() - 1);
        }
        Ok(TxHash::repeat_byte(2))
    }

    async fn check_packet(&self, id: PacketId) -> Result<PacketDetail> {
        self.find(id)
    }

    async fn list_packets(&self) -> Result<Vec<PacketDetail>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.packets.lock().unwrap().iter().rev().cloned().collect())
    }

    async fn get_balance(&self, _address: Address) -> Result<U256> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_balance.load(Ordering::SeqCst) {
            return Err(classify_message("connection refused", None));
        }
        Ok(*self.balance.lock().unwrap())
    }
}
