use axum::extract::{Extension, Path, State};
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tollgate_core::Identity;
use tollgate_store::{ChatSession, StoreError, StoredMessage, UsageRow, UserBalance};

use crate::ai;
use crate::error::ApiError;
use crate::identity::require_identity;
use crate::state::AppState;
use crate::types::DeleteChatResponse;

/// Assemble the full router
///
/// Everything except the health probe sits behind the identity layer.
pub fn router(state: AppState) -> Router {
    let authed = Router::new()
        .route("/balance", get(balance))
        .route("/chats", post(create_chat))
        .route("/chats/{id_chat}", delete(delete_chat))
        .route("/chats/{id_chat}/history", get(chat_history))
        .route("/chats/{id_chat}/usage", get(chat_usage))
        .route("/ai/message", post(ai::send_message))
        .route("/ai/message/cancel", post(ai::cancel_message))
        .layer(middleware::from_fn(require_identity));

    Router::new()
        .route("/health", get(health))
        .merge(authed)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Creates the balance with the starter credit on first access
async fn balance(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<UserBalance>, ApiError> {
    let balance = state.store.find_or_create_balance(identity.id_user).await?;
    Ok(Json(balance))
}

async fn create_chat(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ChatSession>, ApiError> {
    let chat = state.store.create_chat(identity.id_user).await?;
    Ok(Json(chat))
}

/// Cascades to the chat's messages and ledger rows
async fn delete_chat(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id_chat): Path<i64>,
) -> Result<Json<DeleteChatResponse>, ApiError> {
    let deleted = state.store.delete_chat(identity.id_user, id_chat).await?;
    if !deleted {
        return Err(ApiError::Store(StoreError::ChatNotFound));
    }
    Ok(Json(DeleteChatResponse { deleted }))
}

async fn chat_history(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id_chat): Path<i64>,
) -> Result<Json<Vec<StoredMessage>>, ApiError> {
    // Ownership check first; history itself is keyed by chat alone.
    state
        .store
        .find_chat(identity.id_user, id_chat)
        .await?
        .ok_or(ApiError::Store(StoreError::ChatNotFound))?;
    let rows = state
        .store
        .history(id_chat, state.config.limits.history_window)
        .await?;
    Ok(Json(rows))
}

async fn chat_usage(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id_chat): Path<i64>,
) -> Result<Json<Vec<UsageRow>>, ApiError> {
    state
        .store
        .find_chat(identity.id_user, id_chat)
        .await?
        .ok_or(ApiError::Store(StoreError::ChatNotFound))?;
    let rows = state.store.usage_for_chat(id_chat).await?;
    Ok(Json(rows))
}
