use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Clone, Error)]
/// A JSON-RPC 2.0 error
pub struct JsonRpcError {
    /// The error code
    pub code: i64,
    /// The error message
    pub message: String,
    /// Additional data
    pub data: Option<Value>,
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(code: {}, message: {}, data: {:?})",
            self.code, self.message, self.data
        )
    }
}

#[derive(Serialize, Deserialize, Debug)]
/// A JSON-RPC request
pub struct Request<'a, T> {
    id: u64,
    jsonrpc: &'a str,
    method: &'a str,
    params: T,
}

impl<'a, T> Request<'a, T> {
    /// Creates a new JSON RPC request
    pub fn new(id: u64, method: &'a str, params: T) -> Self {
        Self {
            id,
            jsonrpc: "2.0",
            method,
            params,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Response<T> {
    id: u64,
    /// Some Graphene node frontends omit the version field
    #[serde(default)]
    jsonrpc: Option<String>,
    #[serde(flatten)]
    pub data: ResponseData<T>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum ResponseData<R> {
    Error { error: JsonRpcError },
    Success { result: R },
}

impl<R> ResponseData<R> {
    /// Consume response and return value
    pub fn into_result(self) -> Result<R, JsonRpcError> {
        match self {
            ResponseData::Success { result } => Ok(result),
            ResponseData::Error { error } => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response() {
        let response: Response<u64> =
            serde_json::from_str(r#"{"jsonrpc": "2.0", "result": 19, "id": 1}"#).unwrap();
        assert_eq!(response.id, 1);
        assert_eq!(response.data.into_result().unwrap(), 19);
    }

    #[test]
    fn response_without_version_field() {
        let response: Response<bool> =
            serde_json::from_str(r#"{"id": 3, "result": true}"#).unwrap();
        assert!(response.data.into_result().unwrap());
    }

    #[test]
    fn error_response() {
        let response: Response<u64> = serde_json::from_str(
            r#"{"id": 2, "error": {"code": -32000, "message": "missing required active authority", "data": null}}"#,
        )
        .unwrap();
        let err = response.data.into_result().unwrap_err();
        assert_eq!(err.code, -32000);
    }

    #[test]
    fn request_params_shape() {
        let request = Request::new(7, "get_config", crate::NO_PARAMS);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["method"], "get_config");
        assert_eq!(json["params"], serde_json::json!([]));
    }
}
