use std::sync::Arc;

use alloy::primitives::Address;
use redpacket_chains::{CreatedPacket, Error, RedPacketService, Result};
use redpacket_models::{CreatePacketForm, PacketError, PacketId};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{Action, ActionOutcome, BalanceSnapshot, PageState, StateStore};

/// Result of asking the controller to run an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Completed(ActionOutcome),
    /// The action was already pending; nothing was submitted.
    Ignored,
}

/// Drives the red packet page: runs user actions against the service and is
/// the only writer of the page state.
#[derive(Clone)]
pub struct PageController {
    service: Arc<dyn RedPacketService>,
    store: StateStore,
}

impl PageController {
    pub fn new(service: Arc<dyn RedPacketService>) -> Self {
        let store = StateStore::new(PageState {
            account: service.account(),
            ..PageState::default()
        });
        Self { service, store }
    }

    pub fn subscribe(&self) -> watch::Receiver<PageState> {
        self.store.subscribe()
    }

    pub fn state(&self) -> PageState {
        self.store.snapshot()
    }

    pub fn account(&self) -> Option<Address> {
        self.service.account()
    }

    pub async fn create(&self, form: &CreatePacketForm) -> Submission {
        let Some(guard) = self.store.try_begin(Action::Create) else {
            debug!("Create already pending, ignoring");
            return Submission::Ignored;
        };

        let result = match parse_total_shares(&form.total_shares) {
            Ok(total_shares) => {
                self.service
                    .create_packet(total_shares, form.is_equal, &form.amount)
                    .await
            }
            Err(e) => Err(e),
        };

        let outcome = match result {
            Ok(CreatedPacket { tx_hash, id }) => ActionOutcome::succeeded(match id {
                Some(id) => format!("Red packet {id} created in {tx_hash}"),
                None => format!("Red packet created in {tx_hash}"),
            }),
            Err(e) => failed(Action::Create, &e),
        };
        self.settle(guard, outcome).await
    }

    pub async fn grab(&self, id: PacketId) -> Submission {
        let Some(guard) = self.store.try_begin(Action::Grab) else {
            debug!("Grab already pending, ignoring");
            return Submission::Ignored;
        };

        let outcome = match self.service.grab_packet(id).await {
            Ok(tx_hash) => ActionOutcome::succeeded(format!("Grabbed red packet {id} in {tx_hash}")),
            Err(e) => failed(Action::Grab, &e),
        };
        self.settle(guard, outcome).await
    }

    /// Loads a packet and opens it as the detail view.
    pub async fn check(&self, id: PacketId) -> Submission {
        let Some(guard) = self.store.try_begin(Action::Check) else {
            debug!("Check already pending, ignoring");
            return Submission::Ignored;
        };

        let outcome = match self.service.check_packet(id).await {
            Ok(detail) => {
                self.store.update(|state| state.detail = Some(detail));
                ActionOutcome::succeeded(format!("Loaded red packet {id}"))
            }
            Err(e) => failed(Action::Check, &e),
        };

        guard.settle(outcome.clone());
        Submission::Completed(outcome)
    }

    pub fn close_detail(&self) {
        self.store.update(|state| state.detail = None);
    }

    /// Reloads the packet list and the account balance. Failures are logged
    /// and leave the displayed values untouched.
    pub async fn refresh(&self) {
        let account = self.service.account();
        let (packets, balance) = tokio::join!(self.service.list_packets(), async {
            match account {
                Some(address) => Some(
                    self.service
                        .get_balance(address)
                        .await
                        .map(|wei| BalanceSnapshot::new(address, wei)),
                ),
                None => None,
            }
        });

        match packets {
            Ok(packets) => self.store.update(|state| state.packets = packets),
            Err(e) => warn!("Failed to load red packets: {e}"),
        }
        match balance {
            Some(Ok(snapshot)) => self.publish_balance(snapshot),
            Some(Err(e)) => warn!("Failed to load balance: {e}"),
            None => {}
        }
    }

    pub fn publish_balance(&self, snapshot: BalanceSnapshot) {
        self.store.update(|state| state.balance = Some(snapshot));
    }

    async fn settle(&self, guard: crate::state::BusyGuard, outcome: ActionOutcome) -> Submission {
        let refresh = outcome.is_success();
        guard.settle(outcome.clone());
        if refresh {
            self.refresh().await;
        }
        Submission::Completed(outcome)
    }
}

fn parse_total_shares(input: &str) -> Result<u64> {
    input.trim().parse::<u64>().map_err(|_| {
        Error::from(PacketError::InvalidShares {
            input: input.to_string(),
        })
    })
}

fn failed(action: Action, error: &Error) -> ActionOutcome {
    warn!("{action:?} failed: {error}");
    ActionOutcome::failed(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{packet, MockService, ACCOUNT};
    use crate::ActionPhase;
    use alloy::primitives::U256;
    use redpacket_chains::ErrorKind;
    use redpacket_models::Distribution;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn form(total_shares: &str, is_equal: bool, amount: &str) -> CreatePacketForm {
        CreatePacketForm {
            total_shares: total_shares.to_string(),
            is_equal,
            amount: amount.to_string(),
        }
    }

    fn failure_kind(submission: &Submission) -> Option<ErrorKind> {
        match submission {
            Submission::Completed(ActionOutcome::Failed { kind, .. }) => Some(*kind),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_create_submits_wei_and_refreshes() {
        let service = Arc::new(MockService::new(Some(ACCOUNT)));
        service.set_balance(U256::from(99u64));
        let controller = PageController::new(service.clone());

        let submission = controller.create(&form("10", true, "0.01")).await;
        assert!(matches!(
            submission,
            Submission::Completed(ActionOutcome::Succeeded { .. })
        ));

        let request = service.created.lock().unwrap()[0];
        assert_eq!(request.total_shares, 10);
        assert_eq!(request.distribution, Distribution::Equal);
        assert_eq!(request.amount_wei, U256::from(10u64).pow(U256::from(16u8)));

        let state = controller.state();
        assert_eq!(state.packets.len(), 1);
        assert_eq!(state.balance.unwrap().wei, U256::from(99u64));
        assert_eq!(state.create.phase, ActionPhase::Idle);
        assert!(state.create.last_outcome.unwrap().is_success());
    }

    #[tokio::test]
    async fn test_invalid_form_fails_without_calling_service() {
        let service = Arc::new(MockService::new(Some(ACCOUNT)));
        let controller = PageController::new(service.clone());

        let submission = controller.create(&form("ten", false, "0.01")).await;
        assert_eq!(failure_kind(&submission), Some(ErrorKind::InvalidInput));

        let submission = controller.create(&form("10", false, "-1")).await;
        assert_eq!(failure_kind(&submission), Some(ErrorKind::InvalidInput));

        assert!(service.created.lock().unwrap().is_empty());
        assert_eq!(service.list_calls.load(Ordering::SeqCst), 0);
        assert!(!controller.state().create.is_busy());
    }

    #[tokio::test]
    async fn test_unparseable_shares_name_the_input() {
        let controller = PageController::new(Arc::new(MockService::new(Some(ACCOUNT))));

        for input in ["ten", "1.5", "-3"] {
            let submission = controller.create(&form(input, true, "0.01")).await;
            let Submission::Completed(ActionOutcome::Failed { kind, message }) = submission else {
                panic!("{input:?} should fail");
            };
            assert_eq!(kind, ErrorKind::InvalidInput);
            assert!(message.contains(&format!("{input:?}")), "{message}");
            assert!(!message.contains("positive integer"), "{message}");
        }

        let submission = controller.create(&form("0", true, "0.01")).await;
        let Submission::Completed(ActionOutcome::Failed { message, .. }) = submission else {
            panic!("zero shares should fail");
        };
        assert!(message.contains("positive integer"), "{message}");
    }

    #[tokio::test]
    async fn test_grab_exhausted_packet_fails() {
        let service = Arc::new(MockService::new(Some(ACCOUNT)).with_packets(vec![packet(0, 3, 0)]));
        let controller = PageController::new(service.clone());

        let submission = controller.grab(0).await;
        assert_eq!(failure_kind(&submission), Some(ErrorKind::PacketExhausted));

        let state = controller.state();
        assert_eq!(state.grab.phase, ActionPhase::Idle);
        assert_eq!(
            state.grab.last_outcome.as_ref().map(ActionOutcome::is_success),
            Some(false)
        );
        assert_eq!(service.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_grab_while_pending_is_ignored() {
        let gate = Arc::new(Notify::new());
        let service = Arc::new(
            MockService::new(Some(ACCOUNT))
                .with_packets(vec![packet(0, 3, 3)])
                .with_grab_gate(gate.clone()),
        );
        let controller = PageController::new(service.clone());
        let mut rx = controller.subscribe();

        let first = tokio::spawn({
            let controller = controller.clone();
            async move { controller.grab(0).await }
        });
        rx.wait_for(|state| state.grab.is_busy()).await.unwrap();

        assert_eq!(controller.grab(0).await, Submission::Ignored);
        // Other actions are not blocked by the pending grab.
        assert!(matches!(controller.check(0).await, Submission::Completed(_)));

        gate.notify_one();
        let submission = first.await.unwrap();
        assert!(matches!(
            submission,
            Submission::Completed(ActionOutcome::Succeeded { .. })
        ));

        let state = controller.state();
        assert!(!state.grab.is_busy());
        assert_eq!(state.packets[0].remaining_shares(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_action_releases_its_slot() {
        let gate = Arc::new(Notify::new());
        let service = Arc::new(
            MockService::new(Some(ACCOUNT))
                .with_packets(vec![packet(0, 3, 3)])
                .with_grab_gate(gate),
        );
        let controller = PageController::new(service);

        let timed_out = tokio::time::timeout(Duration::from_millis(10), controller.grab(0)).await;
        assert!(timed_out.is_err());
        assert!(!controller.state().grab.is_busy());
    }

    #[tokio::test]
    async fn test_check_opens_and_close_discards_detail() {
        let service = Arc::new(MockService::new(None).with_packets(vec![packet(0, 5, 2)]));
        let controller = PageController::new(service);

        controller.check(0).await;
        let detail = controller.state().detail.unwrap();
        assert_eq!(detail.claimed_shares(), 3);
        assert!(!detail.can_grab(controller.account()));

        controller.close_detail();
        assert!(controller.state().detail.is_none());

        let submission = controller.check(42).await;
        assert_eq!(failure_kind(&submission), Some(ErrorKind::NotFound));
        assert!(controller.state().detail.is_none());
    }

    #[tokio::test]
    async fn test_write_actions_require_an_account() {
        let service = Arc::new(MockService::new(None).with_packets(vec![packet(0, 3, 3)]));
        let controller = PageController::new(service);

        let submission = controller.grab(0).await;
        assert_eq!(failure_kind(&submission), Some(ErrorKind::TransactionRejected));
    }
}
