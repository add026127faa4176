#![allow(clippy::must_use_candidate)]

//! Conversation, ledger, and balance persistence
//!
//! The core treats storage as an external collaborator: a handful of
//! record operations that must be atomic enough, with the engine left
//! unspecified. [`GatewayStore`] is that seam; [`MemoryStore`] is the
//! bundled backend used by tests and single-node deployments.

mod error;
mod memory;
mod types;

use async_trait::async_trait;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use types::{
    Charge, ChatSession, MessageKind, NewMessage, StoredMessage, UsageRow, UserBalance,
};

/// Model assigned lazily to a session that has none selected
pub const DEFAULT_CHAT_MODEL: &str = "neversleep/llama-3-lumimaid-70b";

/// Persistence operations the gateway core depends on
#[async_trait]
pub trait GatewayStore: Send + Sync {
    /// Create a new chat session for a user
    async fn create_chat(&self, id_user: i64) -> Result<ChatSession, StoreError>;

    /// Fetch a user's chat session
    ///
    /// A session without a selected model is assigned
    /// [`DEFAULT_CHAT_MODEL`] the first time it is read, and the
    /// assignment is persisted.
    async fn find_chat(&self, id_user: i64, id_chat: i64) -> Result<Option<ChatSession>, StoreError>;

    /// Delete a chat, cascading to its messages and ledger rows
    async fn delete_chat(&self, id_user: i64, id_chat: i64) -> Result<bool, StoreError>;

    /// Last `limit` messages of a session, oldest first
    async fn history(&self, id_chat: i64, limit: usize) -> Result<Vec<StoredMessage>, StoreError>;

    /// Append one message turn
    ///
    /// The client-supplied `uid` is an idempotency token: appending a
    /// second message with the same uid returns the existing row.
    async fn append_message(&self, message: NewMessage) -> Result<StoredMessage, StoreError>;

    /// Fetch a user's balance, creating it with the starter credit on
    /// first access
    async fn find_or_create_balance(&self, id_user: i64) -> Result<UserBalance, StoreError>;

    /// Fetch a user's balance without creating it
    async fn balance(&self, id_user: i64) -> Result<Option<UserBalance>, StoreError>;

    /// Apply one billing event as a single atomic unit: snapshot the
    /// balance, append the immutable ledger row carrying that snapshot,
    /// and debit the balance. The balance may go negative.
    async fn charge(&self, charge: Charge) -> Result<UsageRow, StoreError>;

    /// Ledger rows for one session, oldest first
    async fn usage_for_chat(&self, id_chat: i64) -> Result<Vec<UsageRow>, StoreError>;
}
