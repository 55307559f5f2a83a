use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt, Snafu};

use crate::format::{self, FormatError};

pub type PacketId = u64;

#[derive(Debug, Snafu)]
pub enum PacketError {
    #[snafu(display("Red packet {id} does not exist"))]
    PacketNotFound { id: PacketId },

    #[snafu(display("Red packet {id} violates its invariants: {reason}"))]
    InvariantViolated { id: PacketId, reason: String },

    #[snafu(display("Total shares must be a positive integer"))]
    ZeroShares,

    #[snafu(display("Total shares {input:?} is not a whole number"))]
    InvalidShares { input: String },

    #[snafu(display("Red packet amount must be greater than zero"))]
    ZeroAmount,

    #[snafu(display("Invalid red packet amount: {source}"))]
    Amount { source: FormatError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distribution {
    Equal,
    Random,
}

impl Distribution {
    #[must_use]
    pub fn from_is_equal(is_equal: bool) -> Self {
        if is_equal {
            Distribution::Equal
        } else {
            Distribution::Random
        }
    }

    #[must_use]
    pub fn is_equal(self) -> bool {
        matches!(self, Distribution::Equal)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Distribution::Equal => "Equal",
            Distribution::Random => "Random",
        }
    }
}

/// A packet exactly as the contract reports it, before any validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketRecord {
    pub id: PacketId,
    pub sender: Address,
    pub total_amount: U256,
    pub remaining_amount: U256,
    pub total_shares: U256,
    pub remaining_shares: U256,
    pub is_equal: bool,
}

/// Validated snapshot of a red packet.
///
/// Only constructible through [`PacketDetail::try_from_record`], so every value
/// upholds `remaining_amount <= total_amount`, `remaining_shares <= total_shares`
/// and "no shares left means no amount left".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketDetail {
    id: PacketId,
    sender: Address,
    total_amount: U256,
    remaining_amount: U256,
    total_shares: u64,
    remaining_shares: u64,
    distribution: Distribution,
}

impl PacketDetail {
    pub fn try_from_record(record: PacketRecord) -> Result<Self, PacketError> {
        let id = record.id;
        // Unset storage reads back as the zero address.
        ensure!(record.sender != Address::ZERO, PacketNotFoundSnafu { id });

        let total_shares = shares_to_u64(id, "total shares", record.total_shares)?;
        let remaining_shares = shares_to_u64(id, "remaining shares", record.remaining_shares)?;

        ensure!(
            record.remaining_amount <= record.total_amount,
            InvariantViolatedSnafu {
                id,
                reason: format!(
                    "remaining amount {} exceeds total amount {}",
                    record.remaining_amount, record.total_amount
                ),
            }
        );
        ensure!(
            remaining_shares <= total_shares,
            InvariantViolatedSnafu {
                id,
                reason: format!(
                    "remaining shares {remaining_shares} exceed total shares {total_shares}"
                ),
            }
        );
        ensure!(
            remaining_shares > 0 || record.remaining_amount.is_zero(),
            InvariantViolatedSnafu {
                id,
                reason: format!(
                    "no shares remain but {} wei is unclaimed",
                    record.remaining_amount
                ),
            }
        );

        Ok(Self {
            id,
            sender: record.sender,
            total_amount: record.total_amount,
            remaining_amount: record.remaining_amount,
            total_shares,
            remaining_shares,
            distribution: Distribution::from_is_equal(record.is_equal),
        })
    }

    pub fn id(&self) -> PacketId {
        self.id
    }

    pub fn sender(&self) -> Address {
        self.sender
    }

    pub fn total_amount(&self) -> U256 {
        self.total_amount
    }

    pub fn remaining_amount(&self) -> U256 {
        self.remaining_amount
    }

    pub fn total_shares(&self) -> u64 {
        self.total_shares
    }

    pub fn remaining_shares(&self) -> u64 {
        self.remaining_shares
    }

    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    pub fn claimed_shares(&self) -> u64 {
        self.total_shares - self.remaining_shares
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_shares == 0
    }

    /// Percentage of shares already claimed, `0.0` for a packet with no shares.
    pub fn progress_percent(&self) -> f64 {
        if self.total_shares == 0 {
            return 0.0;
        }
        self.claimed_shares() as f64 / self.total_shares as f64 * 100.0
    }

    /// A packet can be grabbed by a connected account while shares remain.
    pub fn can_grab(&self, account: Option<Address>) -> bool {
        account.is_some() && !self.is_exhausted()
    }
}

fn shares_to_u64(id: PacketId, field: &str, value: U256) -> Result<u64, PacketError> {
    u64::try_from(value).map_err(|_| PacketError::InvariantViolated {
        id,
        reason: format!("{field} {value} does not fit in 64 bits"),
    })
}

/// Validated input for creating a red packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatePacketRequest {
    pub total_shares: u64,
    pub distribution: Distribution,
    pub amount_wei: U256,
}

impl CreatePacketRequest {
    /// Converts form input into a request, turning the decimal ether amount into wei.
    pub fn parse(total_shares: u64, is_equal: bool, amount: &str) -> Result<Self, PacketError> {
        ensure!(total_shares > 0, ZeroSharesSnafu);
        let amount_wei = format::parse_ether(amount).context(AmountSnafu)?;
        ensure!(!amount_wei.is_zero(), ZeroAmountSnafu);

        Ok(Self {
            total_shares,
            distribution: Distribution::from_is_equal(is_equal),
            amount_wei,
        })
    }
}

/// Form values a user starts from when creating a packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePacketForm {
    pub total_shares: String,
    pub is_equal: bool,
    pub amount: String,
}

impl Default for CreatePacketForm {
    fn default() -> Self {
        Self {
            total_shares: "10".to_string(),
            is_equal: false,
            amount: "0.01".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn record() -> PacketRecord {
        PacketRecord {
            id: 7,
            sender: address!("0x9146E804C874b4651C44685C95804A48b3F935f4"),
            total_amount: U256::from(1_000u64),
            remaining_amount: U256::from(400u64),
            total_shares: U256::from(10u64),
            remaining_shares: U256::from(4u64),
            is_equal: false,
        }
    }

    #[test]
    fn test_valid_record_becomes_detail() {
        let detail = PacketDetail::try_from_record(record()).unwrap();
        assert_eq!(detail.id(), 7);
        assert_eq!(detail.claimed_shares(), 6);
        assert_eq!(detail.distribution(), Distribution::Random);
        assert!((detail.progress_percent() - 60.0).abs() < f64::EPSILON);
        assert!(detail.remaining_amount() <= detail.total_amount());
        assert!(detail.remaining_shares() <= detail.total_shares());
    }

    #[test]
    fn test_zero_sender_is_not_found() {
        let mut raw = record();
        raw.sender = Address::ZERO;
        assert!(matches!(
            PacketDetail::try_from_record(raw),
            Err(PacketError::PacketNotFound { id: 7 })
        ));
    }

    #[test]
    fn test_remaining_amount_above_total_is_rejected() {
        let mut raw = record();
        raw.remaining_amount = U256::from(1_001u64);
        assert!(matches!(
            PacketDetail::try_from_record(raw),
            Err(PacketError::InvariantViolated { .. })
        ));
    }

    #[test]
    fn test_remaining_shares_above_total_is_rejected() {
        let mut raw = record();
        raw.remaining_shares = U256::from(11u64);
        assert!(PacketDetail::try_from_record(raw).is_err());
    }

    #[test]
    fn test_exhausted_packet_must_be_empty() {
        let mut raw = record();
        raw.remaining_shares = U256::ZERO;
        assert!(PacketDetail::try_from_record(raw.clone()).is_err());

        raw.remaining_amount = U256::ZERO;
        let detail = PacketDetail::try_from_record(raw).unwrap();
        assert!(detail.is_exhausted());
        assert!(!detail.can_grab(Some(Address::ZERO)));
    }

    #[test]
    fn test_can_grab_requires_account() {
        let detail = PacketDetail::try_from_record(record()).unwrap();
        assert!(!detail.can_grab(None));
        assert!(detail.can_grab(Some(detail.sender())));
    }

    #[test]
    fn test_create_request_parsing() {
        let request = CreatePacketRequest::parse(10, true, "0.01").unwrap();
        assert_eq!(request.total_shares, 10);
        assert_eq!(request.distribution, Distribution::Equal);
        assert_eq!(request.amount_wei, U256::from(10_000_000_000_000_000u64));

        assert!(matches!(
            CreatePacketRequest::parse(0, true, "0.01"),
            Err(PacketError::ZeroShares)
        ));
        assert!(matches!(
            CreatePacketRequest::parse(1, true, "0"),
            Err(PacketError::ZeroAmount)
        ));
        assert!(matches!(
            CreatePacketRequest::parse(1, false, "lots"),
            Err(PacketError::Amount { .. })
        ));
    }

    #[test]
    fn test_default_form() {
        let form = CreatePacketForm::default();
        assert_eq!(form.total_shares, "10");
        assert!(!form.is_equal);
        assert_eq!(form.amount, "0.01");
    }
}
