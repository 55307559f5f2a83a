use std::sync::Arc;

use alloy::primitives::Address;
use redpacket_chains::{Error, ErrorKind};
use redpacket_models::PacketDetail;
use tokio::sync::watch;

use crate::BalanceSnapshot;

/// User actions that each own a busy slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Grab,
    Check,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActionPhase {
    #[default]
    Idle,
    Pending,
}

/// How the last submission of an action settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Succeeded { message: String },
    Failed { kind: ErrorKind, message: String },
}

impl ActionOutcome {
    pub fn succeeded(message: impl Into<String>) -> Self {
        ActionOutcome::Succeeded {
            message: message.into(),
        }
    }

    pub fn failed(error: &Error) -> Self {
        ActionOutcome::Failed {
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Succeeded { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            ActionOutcome::Succeeded { message } | ActionOutcome::Failed { message, .. } => message,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSlot {
    pub phase: ActionPhase,
    /// Kept until the next submission of the same action.
    pub last_outcome: Option<ActionOutcome>,
}

impl ActionSlot {
    pub fn is_busy(&self) -> bool {
        self.phase == ActionPhase::Pending
    }
}

/// Everything the red packet page displays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageState {
    pub account: Option<Address>,
    pub balance: Option<BalanceSnapshot>,
    pub packets: Vec<PacketDetail>,
    /// Packet opened by the last successful check, until closed.
    pub detail: Option<PacketDetail>,
    pub create: ActionSlot,
    pub grab: ActionSlot,
    pub check: ActionSlot,
}

impl PageState {
    pub fn slot(&self, action: Action) -> &ActionSlot {
        match action {
            Action::Create => &self.create,
            Action::Grab => &self.grab,
            Action::Check => &self.check,
        }
    }

    fn slot_mut(&mut self, action: Action) -> &mut ActionSlot {
        match action {
            Action::Create => &mut self.create,
            Action::Grab => &mut self.grab,
            Action::Check => &mut self.check,
        }
    }
}

/// Observable page state. Readers subscribe; only the controller writes.
#[derive(Clone)]
pub struct StateStore {
    tx: Arc<watch::Sender<PageState>>,
}

impl StateStore {
    pub fn new(initial: PageState) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<PageState> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> PageState {
        self.tx.borrow().clone()
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut PageState)) {
        self.tx.send_modify(f);
    }

    /// Marks `action` pending unless it already is. The returned guard puts the
    /// slot back to idle when dropped.
    pub(crate) fn try_begin(&self, action: Action) -> Option<BusyGuard> {
        let acquired = self.tx.send_if_modified(|state| {
            let slot = state.slot_mut(action);
            if slot.is_busy() {
                return false;
            }
            slot.phase = ActionPhase::Pending;
            slot.last_outcome = None;
            true
        });

        acquired.then(|| BusyGuard {
            store: self.clone(),
            action,
            outcome: None,
        })
    }
}

/// Holds an action's busy slot. Released on drop, whether or not the action
/// settled.
pub(crate) struct BusyGuard {
    store: StateStore,
    action: Action,
    outcome: Option<ActionOutcome>,
}

impl BusyGuard {
    /// Releases the slot and records how the action ended.
    pub(crate) fn settle(mut self, outcome: ActionOutcome) {
        self.outcome = Some(outcome);
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let action = self.action;
        let outcome = self.outcome.take();
        self.store.update(|state| {
            let slot = state.slot_mut(action);
            slot.phase = ActionPhase::Idle;
            if outcome.is_some() {
                slot.last_outcome = outcome;
            }
        });
    }
}
