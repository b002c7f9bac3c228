//! Snapshot persistence
//!
//! One JSON artifact per run capturing every address the workflow
//! produced, written after the sequence concludes. Failed runs get an
//! `error` object and a distinct filename so partial deployments are
//! easy to spot.

use crate::error::{PersistenceError, RemoteCallError};
use crate::workflow::{AddressBook, ProvisionReport};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub timestamp: String,
    pub network: String,
    pub addresses: AddressBook,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,
}

impl From<&RemoteCallError> for ErrorPayload {
    fn from(err: &RemoteCallError) -> Self {
        Self {
            message: err.to_string(),
            logs: err.logs.clone(),
        }
    }
}

impl Snapshot {
    pub fn from_report(report: &ProvisionReport, network: &str, timestamp: String) -> Self {
        Self {
            timestamp,
            network: network.to_string(),
            addresses: report.addresses.clone(),
            error: report.outcome.as_ref().err().map(ErrorPayload::from),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Current time as an ISO-8601 UTC string
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Snapshot filename for the given outcome. Colons in the timestamp
/// are replaced so the name is valid on every filesystem.
pub fn filename(network: &str, timestamp: &str, is_error: bool) -> String {
    let ts = timestamp.replace(':', "-");
    if is_error {
        format!("{}-addresses-error-{}.json", network, ts)
    } else {
        format!("{}-addresses-{}.json", network, ts)
    }
}

/// Write the snapshot into `dir`, pretty-printed. Attempted exactly
/// once per run.
pub fn save(dir: &str, snapshot: &Snapshot) -> Result<PathBuf, PersistenceError> {
    let path = Path::new(dir).join(filename(
        &snapshot.network,
        &snapshot.timestamp,
        snapshot.is_error(),
    ));

    let body = serde_json::to_string_pretty(snapshot)?;
    fs::write(&path, body)?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteCallError;
    use serde_json::Value;

    const SUCCESS_KEYS: [&str; 10] = [
        "programId",
        "tokenMint0",
        "tokenMint1",
        "userTokenAccount0",
        "userTokenAccount1",
        "poolState",
        "poolVault0",
        "poolVault1",
        "lastSwapTx",
        "walletAddress",
    ];

    fn book_through(count: usize) -> AddressBook {
        let mut book = AddressBook::default();
        for key in SUCCESS_KEYS.into_iter().take(count) {
            book.record(key, format!("addr-{}", key));
        }
        book
    }

    fn complete_report() -> ProvisionReport {
        ProvisionReport {
            addresses: book_through(10),
            outcome: Ok(()),
        }
    }

    #[test]
    fn test_success_snapshot_has_all_keys_and_no_error() {
        let snapshot = Snapshot::from_report(
            &complete_report(),
            "devnet",
            "2026-08-06T12:00:00.000Z".to_string(),
        );

        assert!(!snapshot.is_error());
        assert_eq!(snapshot.addresses.keys(), SUCCESS_KEYS.to_vec());

        let json: Value = serde_json::from_str(&serde_json::to_string(&snapshot).unwrap()).unwrap();
        assert_eq!(json["network"], "devnet");
        assert!(json.get("error").is_none());
        assert_eq!(json["addresses"].as_object().unwrap().len(), 10);
        for key in SUCCESS_KEYS {
            assert!(!json["addresses"][key].as_str().unwrap().is_empty());
        }
    }

    #[test]
    fn test_pool_init_failure_captures_six_keys() {
        // Failure during initialize pool: everything through the
        // locally generated pool address was already recorded
        let report = ProvisionReport {
            addresses: book_through(6),
            outcome: Err(RemoteCallError::new(
                "initialize pool",
                "custom program error: 0x1771",
            )),
        };

        let snapshot =
            Snapshot::from_report(&report, "devnet", "2026-08-06T12:00:00.000Z".to_string());

        assert!(snapshot.is_error());
        assert_eq!(snapshot.addresses.len(), 6);
        assert_eq!(snapshot.addresses.keys(), SUCCESS_KEYS[..6].to_vec());

        let json: Value = serde_json::from_str(&serde_json::to_string(&snapshot).unwrap()).unwrap();
        assert!(!json["error"]["message"].as_str().unwrap().is_empty());
        // no program logs attached: the logs array is omitted entirely
        assert!(json["error"].get("logs").is_none());
    }

    #[test]
    fn test_swap_failure_captures_eight_keys_and_logs() {
        let mut err = RemoteCallError::new("execute swap", "Transaction simulation failed");
        err.logs = vec![
            "Program log: Instruction: Swap".to_string(),
            "Program log: Error: insufficient output amount".to_string(),
        ];

        let report = ProvisionReport {
            addresses: book_through(8),
            outcome: Err(err),
        };

        let snapshot =
            Snapshot::from_report(&report, "devnet", "2026-08-06T12:00:00.000Z".to_string());

        assert_eq!(snapshot.addresses.len(), 8);
        assert_eq!(snapshot.addresses.keys(), SUCCESS_KEYS[..8].to_vec());

        let json: Value = serde_json::from_str(&serde_json::to_string(&snapshot).unwrap()).unwrap();
        let logs = json["error"]["logs"].as_array().unwrap();
        assert!(!logs.is_empty());
        assert!(logs[1].as_str().unwrap().contains("insufficient output"));
    }

    #[test]
    fn test_filenames_distinguish_outcome_and_scrub_colons() {
        let ts = "2026-08-06T12:34:56.789Z";
        let ok_name = filename("devnet", ts, false);
        let err_name = filename("devnet", ts, true);

        assert_eq!(ok_name, "devnet-addresses-2026-08-06T12-34-56.789Z.json");
        assert_eq!(
            err_name,
            "devnet-addresses-error-2026-08-06T12-34-56.789Z.json"
        );
        assert_ne!(ok_name, err_name);
        assert!(!ok_name.contains(':'));
    }

    #[test]
    fn test_filenames_differ_across_timestamps() {
        let a = filename("devnet", "2026-08-06T12:00:00.000Z", false);
        let b = filename("devnet", "2026-08-06T12:00:01.000Z", false);
        assert_ne!(a, b);
    }

    #[test]
    fn test_utc_timestamp_shape() {
        let ts = utc_timestamp();
        assert!(ts.ends_with('Z'));
        assert!(ts.contains('T'));
    }

    #[test]
    fn test_save_writes_file_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = Snapshot::from_report(
            &complete_report(),
            "devnet",
            "2026-08-06T12:00:00.000Z".to_string(),
        );

        let path = save(dir.path().to_str().unwrap(), &snapshot).unwrap();
        assert!(path.exists());

        let body = fs::read_to_string(&path).unwrap();
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["addresses"]["programId"], "addr-programId");
    }

    #[test]
    fn test_save_into_missing_dir_is_persistence_error() {
        let snapshot = Snapshot::from_report(
            &complete_report(),
            "devnet",
            "2026-08-06T12:00:00.000Z".to_string(),
        );

        let result = save("/nonexistent/provisioner-output", &snapshot);
        assert!(matches!(result, Err(PersistenceError::Write(_))));
    }
}
