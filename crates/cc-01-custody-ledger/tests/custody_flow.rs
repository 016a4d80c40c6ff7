//! # End-to-End Custody Flow (cc-01)
//!
//! Drives the ledger through the named-operation dispatcher, as an operator
//! tool would.

use std::sync::Arc;

use cc_01_custody_ledger::{
    CustodyLedgerDependencies, CustodyLedgerService, InMemoryKVStore, KeyValueStore,
    LedgerConfig, LedgerDispatcher, LedgerErrorKind, LedgerResponse, SystemTimeSource,
};

// =============================================================================
// TEST HELPERS
// =============================================================================

fn make_dispatcher<KV: KeyValueStore>(
    store: Arc<KV>,
) -> LedgerDispatcher<CustodyLedgerService<KV, SystemTimeSource>> {
    LedgerDispatcher::new(CustodyLedgerService::new(
        CustodyLedgerDependencies {
            kv_store: store,
            time_source: SystemTimeSource,
        },
        LedgerConfig::default(),
    ))
}

fn call<KV: KeyValueStore>(
    dispatcher: &LedgerDispatcher<CustodyLedgerService<KV, SystemTimeSource>>,
    operation: &str,
    args: &[&str],
) -> LedgerResponse {
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    dispatcher.dispatch(operation, &args)
}

fn ok_json<KV: KeyValueStore>(
    dispatcher: &LedgerDispatcher<CustodyLedgerService<KV, SystemTimeSource>>,
    operation: &str,
    args: &[&str],
) -> serde_json::Value {
    let response = call(dispatcher, operation, args);
    let json = response.to_json();
    assert_eq!(json["status"], "ok", "{} {:?} -> {}", operation, args, json);
    json["payload"].clone()
}

fn error_kind<KV: KeyValueStore>(
    dispatcher: &LedgerDispatcher<CustodyLedgerService<KV, SystemTimeSource>>,
    operation: &str,
    args: &[&str],
) -> LedgerErrorKind {
    match call(dispatcher, operation, args) {
        LedgerResponse::Failure(e) => e.kind,
        LedgerResponse::Success { .. } => panic!("{} {:?} unexpectedly succeeded", operation, args),
    }
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn test_collect_transfer_process_scenario() {
    let d = make_dispatcher(Arc::new(InMemoryKVStore::new()));

    ok_json(&d, "RegisterCollector", &["R1", "Acme"]);
    ok_json(&d, "Collect", &["L1", "Plastic", "recyclable", "100", "R1"]);
    ok_json(&d, "RegisterProcessor", &["P1", "Proc"]);

    ok_json(&d, "Transfer", &["R1", "P1", "L1", "60"]);
    assert_eq!(ok_json(&d, "QueryCollector", &["R1"])["holdings"]["L1"], 40);
    assert_eq!(ok_json(&d, "QueryProcessor", &["P1"])["holdings"]["L1"], 60);
    assert_eq!(ok_json(&d, "QueryLot", &["L1"])["total_quantity"], 100);

    ok_json(&d, "Process", &["P1", "L1", "shred", "60"]);
    let processor = ok_json(&d, "QueryProcessor", &["P1"]);
    assert!(processor["holdings"].get("L1").is_none());
    assert_eq!(ok_json(&d, "QueryLot", &["L1"])["total_quantity"], 40);

    let history = ok_json(&d, "QueryProcessingHistory", &["P1"]);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["quantity"], 60);

    // Everything P1 received has been processed, so it can leave.
    ok_json(&d, "DeleteProcessor", &["P1"]);
    assert_eq!(error_kind(&d, "QueryProcessor", &["P1"]), LedgerErrorKind::NotFound);
}

#[test]
fn test_legacy_operation_names() {
    let d = make_dispatcher(Arc::new(InMemoryKVStore::new()));

    ok_json(&d, "RecyclerRegister", &["R1", "Acme"]);
    ok_json(&d, "ProcessorRegister", &["P1", "Proc"]);
    ok_json(&d, "TrashEnroll", &["L1", "Plastic", "recyclable", "10", "R1"]);
    ok_json(&d, "TrashTrans", &["R1", "P1", "L1", "4"]);
    ok_json(&d, "TrashProcess", &["P1", "L1", "melt", "4"]);

    assert_eq!(ok_json(&d, "queryRecyleHistory", &["R1", "L1"]).as_array().unwrap().len(), 1);
    assert_eq!(ok_json(&d, "queryTransHistory", &["L1"]).as_array().unwrap().len(), 1);
    assert_eq!(ok_json(&d, "queryProcessHistory", &["P1", "L1"]).as_array().unwrap().len(), 1);

    ok_json(&d, "ProcessorDelete", &["P1"]);
    ok_json(&d, "RecyclerDelete", &["R1"]);
    assert_eq!(error_kind(&d, "RecyclerQuery", &["R1"]), LedgerErrorKind::NotFound);
    // R1 held the last 6 units of L1.
    assert_eq!(error_kind(&d, "QueryLot", &["L1"]), LedgerErrorKind::NotFound);
}

#[test]
fn test_rejections_leave_store_untouched() {
    let store = Arc::new(InMemoryKVStore::new());
    let d = make_dispatcher(Arc::clone(&store));
    ok_json(&d, "RegisterCollector", &["R1", "Acme"]);
    ok_json(&d, "RegisterProcessor", &["P1", "Proc"]);
    ok_json(&d, "Collect", &["L1", "Plastic", "recyclable", "40", "R1"]);
    let before = store.snapshot();

    assert_eq!(
        error_kind(&d, "RegisterCollector", &["R1", "Again"]),
        LedgerErrorKind::AlreadyExists
    );
    assert_eq!(
        error_kind(&d, "Transfer", &["R1", "P1", "L1", "41"]),
        LedgerErrorKind::InsufficientQuantity
    );
    assert_eq!(
        error_kind(&d, "Transfer", &["R1", "P1", "L1", "1.5"]),
        LedgerErrorKind::InvalidArgument
    );
    assert_eq!(
        error_kind(&d, "Process", &["P1", "L1", "shred", "1"]),
        LedgerErrorKind::NoSuchHolding
    );
    assert_eq!(
        error_kind(&d, "Collect", &["L1", "Plastic", "recyclable", "0", "R1"]),
        LedgerErrorKind::InvalidArgument
    );
    assert_eq!(
        error_kind(&d, "QueryTransferHistory", &["L1", "", "P1"]),
        LedgerErrorKind::InvalidQuery
    );

    assert_eq!(store.snapshot(), before);
}

#[cfg(feature = "file-store")]
#[test]
fn test_file_store_survives_restart() {
    use cc_01_custody_ledger::FileBackedKVStore;

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("custody.db");

    {
        let d = make_dispatcher(Arc::new(FileBackedKVStore::open(&path).unwrap()));
        ok_json(&d, "RegisterCollector", &["R1", "Acme"]);
        ok_json(&d, "RegisterProcessor", &["P1", "Proc"]);
        ok_json(&d, "Collect", &["L1", "Plastic", "recyclable", "100", "R1"]);
        ok_json(&d, "Transfer", &["R1", "P1", "L1", "25"]);
    }

    let d = make_dispatcher(Arc::new(FileBackedKVStore::open(&path).unwrap()));
    assert_eq!(ok_json(&d, "QueryCollector", &["R1"])["holdings"]["L1"], 75);
    assert_eq!(ok_json(&d, "QueryTransferHistory", &["L1", "R1"]).as_array().unwrap().len(), 1);

    ok_json(&d, "Transfer", &["R1", "P1", "L1", "25"]);
    assert_eq!(ok_json(&d, "QueryTransferHistory", &["L1"]).as_array().unwrap().len(), 2);
}
