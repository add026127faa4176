use std::collections::HashMap;

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::types::{
    Charge, ChatSession, MessageKind, NewMessage, StoredMessage, UsageRow, UserBalance,
};
use crate::{DEFAULT_CHAT_MODEL, GatewayStore};

/// In-memory store backend
///
/// All tables live behind one async mutex, so every operation — in
/// particular [`GatewayStore::charge`] — is a single critical section.
/// That is what makes `balance_before` accurate under concurrent billing
/// for the same user.
pub struct MemoryStore {
    starter_credit: f64,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    chats: HashMap<i64, ChatSession>,
    messages: Vec<StoredMessage>,
    usage: Vec<UsageRow>,
    balances: HashMap<i64, f64>,
    next_chat_id: i64,
    next_message_id: i64,
    next_usage_id: i64,
}

impl MemoryStore {
    pub fn new(starter_credit: f64) -> Self {
        Self {
            starter_credit,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Overwrite a user's balance directly; test/seeding hook
    pub async fn set_balance(&self, id_user: i64, balance: f64) {
        self.inner.lock().await.balances.insert(id_user, balance);
    }
}

#[async_trait]
impl GatewayStore for MemoryStore {
    async fn create_chat(&self, id_user: i64) -> Result<ChatSession, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.next_chat_id += 1;
        let chat = ChatSession {
            id: inner.next_chat_id,
            id_user,
            uid: uuid::Uuid::new_v4().to_string(),
            name: None,
            system: None,
            model: None,
            metas: serde_json::Value::Object(serde_json::Map::new()),
            created: Timestamp::now(),
        };
        inner.chats.insert(chat.id, chat.clone());
        Ok(chat)
    }

    async fn find_chat(&self, id_user: i64, id_chat: i64) -> Result<Option<ChatSession>, StoreError> {
        let mut inner = self.inner.lock().await;
        let Some(chat) = inner.chats.get_mut(&id_chat) else {
            return Ok(None);
        };
        if chat.id_user != id_user {
            return Ok(None);
        }
        if chat.model.is_none() {
            chat.model = Some(DEFAULT_CHAT_MODEL.to_owned());
        }
        Ok(Some(chat.clone()))
    }

    async fn delete_chat(&self, id_user: i64, id_chat: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let owned = inner
            .chats
            .get(&id_chat)
            .is_some_and(|chat| chat.id_user == id_user);
        if !owned {
            return Ok(false);
        }
        inner.chats.remove(&id_chat);
        inner.messages.retain(|m| m.id_chat != id_chat);
        inner.usage.retain(|u| u.id_chat != id_chat);
        Ok(true)
    }

    async fn history(&self, id_chat: i64, limit: usize) -> Result<Vec<StoredMessage>, StoreError> {
        let inner = self.inner.lock().await;
        let all: Vec<StoredMessage> = inner
            .messages
            .iter()
            .filter(|m| m.id_chat == id_chat)
            .cloned()
            .collect();
        let skip = all.len().saturating_sub(limit);
        Ok(all.into_iter().skip(skip).collect())
    }

    async fn append_message(&self, message: NewMessage) -> Result<StoredMessage, StoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(existing) = inner
            .messages
            .iter()
            .find(|m| m.id_chat == message.id_chat && m.uid == message.uid)
        {
            return Ok(existing.clone());
        }
        inner.next_message_id += 1;
        let stored = StoredMessage {
            id: inner.next_message_id,
            id_chat: message.id_chat,
            id_user: message.id_user,
            kind: message.kind,
            content: message.content,
            uid: message.uid,
            response_to: message.response_to,
            created: Timestamp::now(),
        };
        inner.messages.push(stored.clone());
        Ok(stored)
    }

    async fn find_or_create_balance(&self, id_user: i64) -> Result<UserBalance, StoreError> {
        let mut inner = self.inner.lock().await;
        let balance = *inner.balances.entry(id_user).or_insert(self.starter_credit);
        Ok(UserBalance { id_user, balance })
    }

    async fn balance(&self, id_user: i64) -> Result<Option<UserBalance>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .balances
            .get(&id_user)
            .map(|&balance| UserBalance { id_user, balance }))
    }

    async fn charge(&self, charge: Charge) -> Result<UsageRow, StoreError> {
        let mut inner = self.inner.lock().await;
        // snapshot, append, and debit under one lock so no concurrent
        // charge for the same user can interleave
        let balance_before = *inner.balances.entry(charge.id_user).or_insert(0.0);
        inner.next_usage_id += 1;
        let row = UsageRow {
            id: inner.next_usage_id,
            id_user: charge.id_user,
            model: charge.model,
            id_chat: charge.id_chat,
            id_message: charge.id_message,
            tokens_used: charge.tokens_used,
            prompt_tokens: charge.prompt_tokens,
            completion_tokens: charge.completion_tokens,
            prompt_cost: charge.prompt_cost,
            completion_cost: charge.completion_cost,
            cost: charge.cost,
            balance_before,
            created: Timestamp::now(),
        };
        inner.usage.push(row.clone());
        inner
            .balances
            .insert(charge.id_user, balance_before - charge.cost);
        Ok(row)
    }

    async fn usage_for_chat(&self, id_chat: i64) -> Result<Vec<UsageRow>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .usage
            .iter()
            .filter(|u| u.id_chat == id_chat)
            .cloned()
            .collect())
    }
}
