use alloy::{
    primitives::TxHash,
    sol_types::SolInterface,
    transports::{RpcError, TransportErrorKind},
};
use redpacket_models::{deployment::DeploymentError, PacketError, PacketId};
use snafu::{prelude::*, Location};

use crate::contracts::RedPacket::RedPacketErrors;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("EVMRPCError at {loc}: {message}"))]
    Network {
        message: String,
        #[snafu(implicit)]
        loc: Location,
    },

    #[snafu(display("Pending transaction failed at {loc}: {source}"))]
    PendingTransaction {
        source: alloy::providers::PendingTransactionError,
        #[snafu(implicit)]
        loc: Location,
    },

    #[snafu(display("Malformed response: {source}"))]
    MalformedResponse { source: PacketError },

    #[snafu(display("Transaction rejected: {message}"))]
    TransactionRejected { message: String },

    #[snafu(display("No wallet connected to sign the transaction"))]
    WalletNotConnected,

    #[snafu(display("Insufficient funds: {message}"))]
    InsufficientFunds { message: String },

    #[snafu(display("Red packet {id} has no shares left"))]
    PacketExhausted { id: PacketId },

    #[snafu(display("Red packet {id} does not exist"))]
    PacketNotFound { id: PacketId },

    #[snafu(display("Invalid input: {source}"))]
    InvalidInput { source: PacketError },

    #[snafu(display("Invalid address {address:?}"))]
    InvalidAddress { address: String },

    #[snafu(display("Transaction {tx_hash} reverted while trying to {action}"))]
    Reverted {
        action: &'static str,
        tx_hash: TxHash,
    },

    #[snafu(display("Contract artifact has no bytecode"))]
    EmptyBytecode,

    #[snafu(display("Deployment transaction {tx_hash} created no contract"))]
    NoContractAddress { tx_hash: TxHash },

    #[snafu(display("Deployment artifact error: {source}"))]
    Deployment { source: DeploymentError },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse category of a failure, the level at which callers react to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    TransactionRejected,
    InsufficientFunds,
    PacketExhausted,
    NotFound,
    InvalidInput,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network { .. }
            | Error::PendingTransaction { .. }
            | Error::MalformedResponse { .. }
            | Error::Reverted { .. }
            | Error::NoContractAddress { .. } => ErrorKind::Network,
            Error::TransactionRejected { .. } | Error::WalletNotConnected => {
                ErrorKind::TransactionRejected
            }
            Error::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Error::PacketExhausted { .. } => ErrorKind::PacketExhausted,
            Error::PacketNotFound { .. } => ErrorKind::NotFound,
            Error::InvalidInput { .. }
            | Error::InvalidAddress { .. }
            | Error::EmptyBytecode
            | Error::Deployment { .. } => ErrorKind::InvalidInput,
        }
    }
}

impl From<PacketError> for Error {
    fn from(error: PacketError) -> Self {
        match error {
            PacketError::PacketNotFound { id } => Error::PacketNotFound { id },
            source @ PacketError::InvariantViolated { .. } => Error::MalformedResponse { source },
            source => Error::InvalidInput { source },
        }
    }
}

impl From<DeploymentError> for Error {
    fn from(source: DeploymentError) -> Self {
        Error::Deployment { source }
    }
}

/// Maps a node error onto the taxonomy. `packet` is the packet the failing
/// call targeted, if any.
#[track_caller]
pub fn classify_rpc_error(
    error: RpcError<TransportErrorKind>,
    packet: Option<PacketId>,
) -> Error {
    if let RpcError::LocalUsageError(inner) = &error {
        // The only local step before submission is signing.
        return Error::TransactionRejected {
            message: inner.to_string(),
        };
    }

    if let Some(payload) = error.as_error_resp() {
        if let Some(decoded) = payload
            .as_revert_data()
            .and_then(|data| RedPacketErrors::abi_decode(&data).ok())
        {
            return match decoded {
                RedPacketErrors::PacketNotFound(e) => Error::PacketNotFound {
                    id: e.id.saturating_to(),
                },
                RedPacketErrors::PacketExhausted(e) => Error::PacketExhausted {
                    id: e.id.saturating_to(),
                },
            };
        }
        return classify_message(&payload.message, packet);
    }

    classify_message(&error.to_string(), packet)
}

/// Maps a contract binding error onto the taxonomy.
#[track_caller]
pub fn classify_contract_error(error: alloy::contract::Error, packet: Option<PacketId>) -> Error {
    match error {
        alloy::contract::Error::TransportError(e) => classify_rpc_error(e, packet),
        alloy::contract::Error::PendingTransactionError(source) => Error::PendingTransaction {
            source,
            loc: Location::default(),
        },
        other => Error::Network {
            message: other.to_string(),
            loc: Location::default(),
        },
    }
}

/// Classifies an error by the text a node or wallet attached to it.
#[track_caller]
pub fn classify_message(message: &str, packet: Option<PacketId>) -> Error {
    let lower = message.to_lowercase();

    if lower.contains("insufficient funds") {
        return Error::InsufficientFunds {
            message: message.to_string(),
        };
    }

    if lower.contains("user rejected")
        || lower.contains("user denied")
        || lower.contains("rejected by user")
    {
        return Error::TransactionRejected {
            message: message.to_string(),
        };
    }

    if let Some(id) = packet {
        if lower.contains("exhausted")
            || lower.contains("no shares")
            || lower.contains("all shares")
            || lower.contains("packet is empty")
        {
            return Error::PacketExhausted { id };
        }
        if lower.contains("not found") || lower.contains("does not exist") {
            return Error::PacketNotFound { id };
        }
    }

    Error::Network {
        message: message.to_string(),
        loc: Location::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{
        primitives::U256,
        rpc::json_rpc::ErrorPayload,
        sol_types::SolError,
    };

    use crate::contracts::RedPacket;

    fn error_resp(message: &str, data: Option<serde_json::Value>) -> RpcError<TransportErrorKind> {
        let raw = serde_json::json!({
            "code": 3,
            "message": message,
            "data": data,
        })
        .to_string();
        let payload: ErrorPayload = serde_json::from_str(&raw).unwrap();
        RpcError::ErrorResp(payload)
    }

    #[test]
    fn test_insufficient_funds() {
        let err = classify_message(
            "insufficient funds for gas * price + value: have 0 want 10000000000000000",
            None,
        );
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    }

    #[test]
    fn test_user_rejection() {
        let err = classify_message("MetaMask Tx Signature: User denied transaction signature.", None);
        assert_eq!(err.kind(), ErrorKind::TransactionRejected);
    }

    #[test]
    fn test_revert_reasons_need_a_packet() {
        let err = classify_message("execution reverted: Packet exhausted", Some(3));
        assert!(matches!(err, Error::PacketExhausted { id: 3 }));

        let err = classify_message("execution reverted: Packet exhausted", None);
        assert_eq!(err.kind(), ErrorKind::Network);

        let err = classify_message("execution reverted: packet does not exist", Some(9));
        assert!(matches!(err, Error::PacketNotFound { id: 9 }));
    }

    #[test]
    fn test_unknown_messages_are_network_errors() {
        let err = classify_message("connection refused", Some(1));
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn test_custom_error_revert_data_is_decoded() {
        let data = RedPacket::PacketExhausted { id: U256::from(4u64) }.abi_encode();
        let err = classify_rpc_error(
            error_resp(
                "execution reverted",
                Some(serde_json::Value::String(alloy::hex::encode_prefixed(data))),
            ),
            None,
        );
        assert!(matches!(err, Error::PacketExhausted { id: 4 }));

        let data = RedPacket::PacketNotFound { id: U256::from(12u64) }.abi_encode();
        let err = classify_rpc_error(
            error_resp(
                "execution reverted",
                Some(serde_json::Value::String(alloy::hex::encode_prefixed(data))),
            ),
            Some(12),
        );
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_error_response_without_data_uses_message() {
        let err = classify_rpc_error(error_resp("insufficient funds for transfer", None), None);
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    }

    #[test]
    fn test_packet_errors_convert() {
        assert_eq!(
            Error::from(PacketError::PacketNotFound { id: 1 }).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(Error::from(PacketError::ZeroShares).kind(), ErrorKind::InvalidInput);
        assert_eq!(
            Error::from(PacketError::InvariantViolated {
                id: 1,
                reason: "bad".to_string()
            })
            .kind(),
            ErrorKind::Network
        );
    }
}
