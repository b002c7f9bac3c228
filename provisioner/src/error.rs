//! Error taxonomy for the provisioning workflow

use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::rpc_request::{RpcError, RpcResponseErrorData};
use thiserror::Error;

/// A remote operation was rejected: network failure, RPC error, or
/// on-chain program rejection. For program-instruction calls that fail
/// preflight simulation, `logs` carries the program's diagnostic log
/// lines in emission order.
#[derive(Debug, Error)]
#[error("remote call failed during {step}: {message}")]
pub struct RemoteCallError {
    pub step: &'static str,
    pub message: String,
    pub logs: Vec<String>,
}

impl RemoteCallError {
    pub fn new(step: &'static str, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
            logs: Vec::new(),
        }
    }

    /// Convert a solana-client error, pulling out simulation logs when
    /// the transaction was rejected during preflight.
    pub fn from_client_error(step: &'static str, err: ClientError) -> Self {
        let logs = match &err.kind {
            ClientErrorKind::RpcError(RpcError::RpcResponseError {
                data: RpcResponseErrorData::SendTransactionPreflightFailure(sim),
                ..
            }) => sim.logs.clone().unwrap_or_default(),
            _ => Vec::new(),
        };

        Self {
            step,
            message: err.to_string(),
            logs,
        }
    }
}

/// Snapshot file could not be written. Logged at the call site and
/// swallowed; never aborts the process.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write snapshot file: {0}")]
    Write(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_message() {
        let err = RemoteCallError::new("create token mint 0", "connection refused");
        assert_eq!(err.step, "create token mint 0");
        assert!(err.logs.is_empty());
        assert_eq!(
            err.to_string(),
            "remote call failed during create token mint 0: connection refused"
        );
    }

    #[test]
    fn test_plain_client_error_has_no_logs() {
        let client_err = ClientError::from(ClientErrorKind::Custom("boom".to_string()));
        let err = RemoteCallError::from_client_error("execute swap", client_err);

        assert_eq!(err.step, "execute swap");
        assert!(!err.message.is_empty());
        assert!(err.logs.is_empty());
    }

    #[test]
    fn test_preflight_failure_extracts_logs() {
        use solana_client::rpc_response::RpcSimulateTransactionResult;

        let sim: RpcSimulateTransactionResult = serde_json::from_value(serde_json::json!({
            "logs": [
                "Program log: Instruction: Swap",
                "Program log: Error: insufficient output amount",
            ],
        }))
        .unwrap();
        let client_err = ClientError::from(ClientErrorKind::RpcError(
            RpcError::RpcResponseError {
                code: -32002,
                message: "Transaction simulation failed".to_string(),
                data: RpcResponseErrorData::SendTransactionPreflightFailure(sim),
            },
        ));

        let err = RemoteCallError::from_client_error("execute swap", client_err);
        assert_eq!(err.logs.len(), 2);
        assert!(err.logs[1].contains("insufficient output amount"));
    }
}
