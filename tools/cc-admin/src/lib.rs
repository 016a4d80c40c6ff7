//! CC-Admin: Custody-Chain operator CLI
//!
//! Opens a file-backed ledger store and feeds named operations to the
//! ledger dispatcher, printing one JSON response per operation.
//!
//! ```text
//! cc-admin call Collect L1 Plastic recyclable 100 R1
//! {"status":"ok","payload":null}
//! cc-admin call QueryLot L1
//! {"status":"ok","payload":{"id":"L1",...,"total_quantity":100}}
//! ```

pub mod cli;

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use cc_01_custody_ledger::{
    CustodyLedgerDependencies, CustodyLedgerService, FileBackedKVStore, KVStoreError,
    LedgerConfig, LedgerDispatcher, LedgerResponse, SystemTimeSource,
};
use thiserror::Error;

pub use cli::{Cli, Command};

/// Dispatcher over the on-disk store with the wall clock.
pub type FileDispatcher =
    LedgerDispatcher<CustodyLedgerService<FileBackedKVStore, SystemTimeSource>>;

/// Errors that stop the CLI before or between operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Failed to open store: {0}")]
    Store(#[from] KVStoreError),
    #[error("Failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("Script line {line}: {reason}")]
    Script { line: usize, reason: String },
}

/// Open (or create) the store at `path` and wrap it in a dispatcher.
pub fn open_dispatcher(path: &Path) -> Result<FileDispatcher, AdminError> {
    let store = FileBackedKVStore::open(path)?;
    tracing::info!(path = %path.display(), "[cc-admin] Store opened");

    Ok(LedgerDispatcher::new(CustodyLedgerService::new(
        CustodyLedgerDependencies {
            kv_store: Arc::new(store),
            time_source: SystemTimeSource,
        },
        LedgerConfig::default(),
    )))
}

/// Decode one script line. Blank lines and `#` comments yield `None`.
pub fn parse_script_line(line_no: usize, line: &str) -> Result<Option<Vec<String>>, AdminError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let words: Vec<String> =
        serde_json::from_str(trimmed).map_err(|e| AdminError::Script {
            line: line_no,
            reason: e.to_string(),
        })?;
    if words.is_empty() {
        return Err(AdminError::Script {
            line: line_no,
            reason: "empty operation".to_string(),
        });
    }
    Ok(Some(words))
}

/// Outcome counts of a batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Run every operation in `script`, handing each response to `emit`.
///
/// Stops at the first rejected operation unless `keep_going` is set.
pub fn run_batch<R, F>(
    dispatcher: &FileDispatcher,
    script: R,
    keep_going: bool,
    mut emit: F,
) -> Result<BatchSummary, AdminError>
where
    R: BufRead,
    F: FnMut(&LedgerResponse),
{
    let mut summary = BatchSummary::default();

    for (index, line) in script.lines().enumerate() {
        let line = line?;
        let Some(mut words) = parse_script_line(index + 1, &line)? else {
            continue;
        };
        let operation = words.remove(0);

        let response = dispatcher.dispatch(&operation, &words);
        emit(&response);

        if response.is_success() {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
            if !keep_going {
                break;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_script_line() {
        assert_eq!(parse_script_line(1, "   ").unwrap(), None);
        assert_eq!(parse_script_line(2, "# setup").unwrap(), None);
        assert_eq!(
            parse_script_line(3, r#"["QueryLot", "L1"]"#).unwrap(),
            Some(vec!["QueryLot".to_string(), "L1".to_string()])
        );
        assert!(matches!(
            parse_script_line(4, "QueryLot L1"),
            Err(AdminError::Script { line: 4, .. })
        ));
        assert!(matches!(
            parse_script_line(5, "[]"),
            Err(AdminError::Script { line: 5, .. })
        ));
    }

    #[test]
    fn test_batch_stops_at_first_rejection() {
        let dir = tempfile::TempDir::new().unwrap();
        let dispatcher = open_dispatcher(&dir.path().join("custody.db")).unwrap();

        let script = r#"
            ["RegisterCollector", "R1", "Acme"]
            ["Collect", "L1", "Plastic", "recyclable", "100", "R1"]
            ["Transfer", "R1", "P9", "L1", "10"]
            ["QueryLot", "L1"]
        "#;
        let mut responses = Vec::new();
        let summary = run_batch(&dispatcher, Cursor::new(script), false, |r| {
            responses.push(r.to_json())
        })
        .unwrap();

        assert_eq!(summary, BatchSummary { succeeded: 2, failed: 1 });
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[2]["kind"], "NotFound");
    }

    #[test]
    fn test_concurrent_run_on_same_store_is_refused() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custody.db");

        let first = open_dispatcher(&path).unwrap();
        let response =
            first.dispatch("RegisterCollector", &["R1".to_string(), "Acme".to_string()]);
        assert!(response.is_success());

        let err = open_dispatcher(&path).err().unwrap();
        assert!(matches!(err, AdminError::Store(KVStoreError::Locked { .. })));
        assert!(err.to_string().contains("custody.db.lock"));
    }

    #[test]
    fn test_batch_keep_going_and_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custody.db");

        {
            let dispatcher = open_dispatcher(&path).unwrap();
            let script = r#"
                ["RecyclerRegister", "R1", "Acme"]
                ["TrashEnroll", "L1", "Plastic", "recyclable", "0", "R1"]
                ["TrashEnroll", "L1", "Plastic", "recyclable", "7", "R1"]
            "#;
            let summary = run_batch(&dispatcher, Cursor::new(script), true, |_| {}).unwrap();
            assert_eq!(summary, BatchSummary { succeeded: 2, failed: 1 });
        }

        let dispatcher = open_dispatcher(&path).unwrap();
        let response = dispatcher.dispatch("QueryLot", &["L1".to_string()]);
        assert_eq!(response.to_json()["payload"]["total_quantity"], 7);
    }
}
