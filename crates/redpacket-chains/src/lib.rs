pub mod contracts;
pub mod deploy;
mod error;
mod logger;
mod red_packet;
mod rpc_query;
mod traits;

pub use error::{classify_message, classify_rpc_error, Error, ErrorKind, Result};
pub use logger::LoggerClient;
pub use red_packet::EvmRedPacketService;
pub use rpc_query::RpcQueryClient;
pub use traits::{CreatedPacket, RedPacketService};
