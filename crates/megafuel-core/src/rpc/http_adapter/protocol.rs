use crate::error::{ClientError, RpcError};

#[derive(serde::Serialize)]
pub(super) struct JsonRpcRequest<'a> {
    pub(super) jsonrpc: &'static str,
    pub(super) id: u64,
    pub(super) method: &'a str,
    pub(super) params: Vec<serde_json::Value>,
}

/// `result` is `Some(Value::Null)` for an explicit `"result": null` and
/// `None` only when the member is missing.
#[derive(serde::Deserialize)]
pub(super) struct JsonRpcResponse {
    #[serde(default, deserialize_with = "present_member")]
    pub(super) result: Option<serde_json::Value>,
    pub(super) error: Option<serde_json::Value>,
}

impl JsonRpcResponse {
    /// Split the envelope into the call outcome.
    pub(super) fn into_result(self) -> Result<serde_json::Value, ClientError> {
        if let Some(err) = self.error {
            return Err(parse_jsonrpc_error(err));
        }
        self.result.ok_or_else(|| {
            ClientError::Rpc(RpcError::InvalidResponse(
                "response has neither result nor error".to_owned(),
            ))
        })
    }
}

fn present_member<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    <serde_json::Value as serde::Deserialize>::deserialize(deserializer).map(Some)
}

/// Map a JSON-RPC `error` member to a `ClientError`.
///
/// Well-formed error objects (`code`, `message`, optional `data`) become
/// `ServerError` with all three preserved; anything else is reported as
/// `InvalidResponse` carrying the raw JSON.
pub(super) fn parse_jsonrpc_error(err: serde_json::Value) -> ClientError {
    #[derive(serde::Deserialize)]
    struct JsonRpcError {
        code: i64,
        message: String,
        #[serde(default)]
        data: Option<serde_json::Value>,
    }

    if let Ok(parsed) = serde_json::from_value::<JsonRpcError>(err.clone()) {
        ClientError::Rpc(RpcError::ServerError {
            code: parsed.code,
            message: parsed.message,
            data: parsed.data,
        })
    } else {
        ClientError::Rpc(RpcError::InvalidResponse(format!(
            "non-standard JSON-RPC error: {err}"
        )))
    }
}
