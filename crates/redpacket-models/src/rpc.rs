use serde::{Deserialize, Serialize};

/// Envelope returned by the RPC query operations.
///
/// Failures are reported in-band: `success` is false, `data` is empty and
/// `msg` carries the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub msg: String,
}

impl<T> RpcResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            msg: String::new(),
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            msg: msg.into(),
        }
    }
}

#[test]
fn test_serialization() {
    let response: RpcResponse<String> = RpcResponse::err("Block 9 not found");
    let json = serde_json::to_string(&response).unwrap();
    assert_eq!(json, r#"{"success":false,"data":null,"msg":"Block 9 not found"}"#);
}
