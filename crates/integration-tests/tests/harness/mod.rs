//! Shared test harness: mock upstream, config builder, running server

pub mod config;
pub mod mock_llm;
pub mod server;

use std::time::Duration;

use tollgate_store::{GatewayStore, MemoryStore, UsageRow};

/// Poll the ledger until `expected` rows exist for the chat
///
/// Reconciliation runs on a background task after the stream closes, so
/// tests wait for it rather than racing it.
pub async fn wait_for_ledger(store: &MemoryStore, id_chat: i64, expected: usize) -> Vec<UsageRow> {
    for _ in 0..200 {
        let rows = store.usage_for_chat(id_chat).await.unwrap();
        if rows.len() >= expected {
            return rows;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("ledger never reached {expected} rows for chat {id_chat}");
}
