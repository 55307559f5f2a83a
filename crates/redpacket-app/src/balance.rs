use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use redpacket_chains::{RedPacketService, Result};
use redpacket_models::format;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::PageController;

pub const BALANCE_REFRESH_INTERVAL: Duration = Duration::from_secs(12);
pub const BALANCE_STALE_AFTER: Duration = Duration::from_secs(10);

/// Balance of one account at the time it was fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub address: Address,
    pub wei: U256,
    pub fetched_at: Instant,
}

impl BalanceSnapshot {
    pub fn new(address: Address, wei: U256) -> Self {
        Self {
            address,
            wei,
            fetched_at: Instant::now(),
        }
    }

    pub fn is_fresh(&self, stale_after: Duration) -> bool {
        self.fetched_at.elapsed() < stale_after
    }

    /// Ether with eight fractional digits.
    pub fn display(&self) -> String {
        format::format_balance(self.wei)
    }
}

/// Single-entry balance cache keyed by account.
pub struct BalanceCache {
    service: Arc<dyn RedPacketService>,
    stale_after: Duration,
    entry: Mutex<Option<BalanceSnapshot>>,
}

impl BalanceCache {
    pub fn new(service: Arc<dyn RedPacketService>) -> Self {
        Self::with_stale_after(service, BALANCE_STALE_AFTER)
    }

    pub fn with_stale_after(service: Arc<dyn RedPacketService>, stale_after: Duration) -> Self {
        Self {
            service,
            stale_after,
            entry: Mutex::new(None),
        }
    }

    /// Returns the cached balance while it is fresh and for the same address,
    /// otherwise fetches and replaces the entry. A failed fetch leaves the
    /// previous entry in place.
    pub async fn get(&self, address: Address) -> Result<BalanceSnapshot> {
        let mut entry = self.entry.lock().await;
        if let Some(snapshot) = *entry {
            if snapshot.address == address && snapshot.is_fresh(self.stale_after) {
                debug!("Using cached balance for {address}");
                return Ok(snapshot);
            }
        }

        let wei = self.service.get_balance(address).await?;
        let snapshot = BalanceSnapshot::new(address, wei);
        *entry = Some(snapshot);
        Ok(snapshot)
    }

    pub async fn cached(&self) -> Option<BalanceSnapshot> {
        *self.entry.lock().await
    }
}

/// Keeps the page's balance current by polling one account.
pub struct BalancePoller {
    cache: Arc<BalanceCache>,
    controller: PageController,
    address: Address,
    interval: Duration,
}

impl BalancePoller {
    pub fn new(cache: Arc<BalanceCache>, controller: PageController, address: Address) -> Self {
        Self {
            cache,
            controller,
            address,
            interval: BALANCE_REFRESH_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn spawn(self, join_set: &mut JoinSet<Result<()>>) {
        join_set.spawn(self.run());
    }

    /// Polls until the task is aborted. The first fetch happens immediately.
    pub async fn run(self) -> Result<()> {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            match self.cache.get(self.address).await {
                Ok(snapshot) => self.controller.publish_balance(snapshot),
                Err(e) => warn!("Failed to refresh balance of {}: {e}", self.address),
            }
        }
    }
}
