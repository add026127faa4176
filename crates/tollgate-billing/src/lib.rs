#![allow(clippy::must_use_candidate)]

//! Turns final token counts into ledger entries
//!
//! Reconciliation happens once per request, after the stream has reached
//! a terminal state. A request that produced no attributable usage is
//! never billed and leaves no ledger row.

mod denial;

use std::sync::Arc;

use tracing::{debug, info};

use tollgate_catalog::ResolvedModel;
use tollgate_relay::TokenUsage;
use tollgate_store::{Charge, GatewayStore, StoreError, UsageRow};

pub use denial::insufficient_funds_body;

/// Settles one finished request against the user's balance
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn GatewayStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn GatewayStore>) -> Self {
        Self { store }
    }

    /// Price the usage at the model's marked-up unit costs and debit it
    ///
    /// Returns the ledger row written, or `None` when there was nothing
    /// to bill.
    pub async fn reconcile(
        &self,
        id_user: i64,
        id_chat: i64,
        id_message: Option<i64>,
        model: &ResolvedModel,
        usage: TokenUsage,
    ) -> Result<Option<UsageRow>, StoreError> {
        if usage.is_zero() {
            debug!(id_user, id_chat, model = %model.name, "no attributable usage, skipping billing");
            return Ok(None);
        }

        let prompt_cost = f64::from(usage.prompt_tokens) * model.input_cost;
        let completion_cost = f64::from(usage.completion_tokens) * model.output_cost;
        let cost = prompt_cost + completion_cost;

        let row = self
            .store
            .charge(Charge {
                id_user,
                model: model.name.clone(),
                id_chat,
                id_message,
                tokens_used: usage.total_tokens,
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                prompt_cost,
                completion_cost,
                cost,
            })
            .await?;

        info!(
            id_user,
            id_chat,
            model = %model.name,
            tokens_used = row.tokens_used,
            cost = row.cost,
            balance_before = row.balance_before,
            "usage reconciled"
        );
        Ok(Some(row))
    }
}
