use axum::Json;
use axum::body::Body;
use axum::extract::{Extension, State};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::header;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info};

use tollgate_billing::insufficient_funds_body;
use tollgate_catalog::ResolvedModel;
use tollgate_core::Identity;
use tollgate_relay::{
    CleanupLatch, RelayOutcome, RelayState, SamplingParams, build_payload,
};
use tollgate_store::{MessageKind, NewMessage, StoreError};
use tollgate_tokens::{ChatTurn, Role, shrink_to_budget};

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{CancelRequest, CancelResponse, SendMessageRequest};

/// Channel depth between the relay task and the client body
const RELAY_CHANNEL_CAPACITY: usize = 32;

/// `POST /ai/message` — run one chat turn as a streamed response
pub async fn send_message(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Response, ApiError> {
    validate(&body)?;

    let chat = state
        .store
        .find_chat(identity.id_user, body.id_chat)
        .await?
        .ok_or(ApiError::Store(StoreError::ChatNotFound))?;

    let model_name = body
        .model
        .as_deref()
        .or(chat.model.as_deref())
        .unwrap_or(tollgate_store::DEFAULT_CHAT_MODEL);
    let model = state.catalog.resolve(model_name)?;

    // Balance gate before anything touches the network or the store's
    // message tables.
    let balance = state.store.find_or_create_balance(identity.id_user).await?;
    if balance.balance <= 0.0 {
        info!(
            user = identity.id_user,
            id_request = %body.id_request,
            balance = balance.balance,
            "balance exhausted, short-circuiting without an upstream call"
        );
        let denial = insufficient_funds_body(
            &model.name,
            &state.config.billing.insufficient_funds_message,
        );
        return Ok(stream_response(Body::from(denial)));
    }

    // History is read before the new turn is appended so the prompt is
    // not duplicated inside it.
    let history: Vec<ChatTurn> = state
        .store
        .history(body.id_chat, state.config.limits.history_window)
        .await?
        .into_iter()
        .map(|row| {
            let role = match row.kind {
                MessageKind::User => Role::User,
                MessageKind::Assistant => Role::Assistant,
            };
            ChatTurn::new(role, row.content)
        })
        .collect();

    let user_row = state
        .store
        .append_message(NewMessage {
            id_chat: body.id_chat,
            id_user: identity.id_user,
            kind: MessageKind::User,
            content: body.prompt.clone(),
            uid: body.uid_message.clone(),
            response_to: None,
        })
        .await?;

    let system = body
        .system
        .clone()
        .or_else(|| chat.system.clone())
        .unwrap_or_default();
    let truncated = shrink_to_budget(
        &system,
        &history,
        &body.prompt,
        state.config.limits.prompt_budget_tokens,
    );

    let sampling = sampling_from(&body);
    let payload = build_payload(&model, &truncated, &sampling);

    // Opening failures are still synchronous from the client's point of
    // view; only after this point does the response commit to streaming.
    let upstream = state.relay.open(&model, &payload).await?;

    let token = state.registry.register(&body.id_request);
    let latch = CleanupLatch::new();
    let (tx, rx) = mpsc::channel::<Bytes>(RELAY_CHANNEL_CAPACITY);

    let task_state = state.clone();
    let task_model = model.clone();
    let id_request = body.id_request.clone();
    let assistant_uid = body.assistant_uid_message.clone();
    let prompt_estimate = truncated.estimate;
    let id_chat = body.id_chat;
    let id_user = identity.id_user;

    tokio::spawn(async move {
        let outcome = task_state
            .relay
            .relay(&task_model, upstream, prompt_estimate, &token, &tx)
            .await;
        drop(tx);

        if latch.acquire() {
            finalize(
                &task_state,
                id_user,
                id_chat,
                user_row.id,
                &assistant_uid,
                &id_request,
                &task_model,
                outcome,
            )
            .await;
        }
        task_state.registry.deregister(&id_request);
    });

    let stream = ReceiverStream::new(rx).map(Ok::<_, std::convert::Infallible>);
    Ok(stream_response(Body::from_stream(stream)))
}

/// `POST /ai/message/cancel`
pub async fn cancel_message(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<CancelRequest>,
) -> Result<Json<CancelResponse>, ApiError> {
    if body.id_request.is_empty() {
        return Err(ApiError::Validation("idRequest must not be empty".into()));
    }

    let cancelled = state.registry.cancel(&body.id_request);
    info!(
        user = identity.id_user,
        id_request = %body.id_request,
        cancelled,
        "cancel requested"
    );
    Ok(Json(CancelResponse { cancelled }))
}

fn validate(body: &SendMessageRequest) -> Result<(), ApiError> {
    for (value, field) in [
        (&body.id_request, "idRequest"),
        (&body.uid_message, "uidMessage"),
        (&body.assistant_uid_message, "assistantUidMessage"),
    ] {
        if value.is_empty() {
            return Err(ApiError::Validation(format!("{field} must not be empty")));
        }
    }
    Ok(())
}

fn sampling_from(body: &SendMessageRequest) -> SamplingParams {
    let defaults = SamplingParams::default();
    SamplingParams {
        temperature: body.temperature.unwrap_or(defaults.temperature),
        max_tokens: body.max_tokens.unwrap_or(defaults.max_tokens),
        top_p: body.top_p.unwrap_or(defaults.top_p),
        frequency_penalty: body.frequency_penalty.unwrap_or(defaults.frequency_penalty),
        presence_penalty: body.presence_penalty.unwrap_or(defaults.presence_penalty),
        stop: body.stop.clone(),
        json_mode: body.mode.as_deref() == Some("json"),
    }
}

fn stream_response(body: Body) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

/// Single post-stream cleanup path: persist the assistant turn, then
/// settle billing. Persistence failures here are logged, never surfaced;
/// the byte stream the client saw is already closed.
#[allow(clippy::too_many_arguments)]
async fn finalize(
    state: &AppState,
    id_user: i64,
    id_chat: i64,
    id_user_message: i64,
    assistant_uid: &str,
    id_request: &str,
    model: &ResolvedModel,
    outcome: RelayOutcome,
) {
    let assistant_row = if outcome.assistant_text.is_empty()
        && outcome.state != RelayState::Completed
    {
        None
    } else {
        match state
            .store
            .append_message(NewMessage {
                id_chat,
                id_user,
                kind: MessageKind::Assistant,
                content: outcome.assistant_text.clone(),
                uid: assistant_uid.to_owned(),
                response_to: Some(id_user_message),
            })
            .await
        {
            Ok(row) => Some(row),
            Err(err) => {
                error!(
                    user = id_user,
                    id_request = %id_request,
                    error = %err,
                    "failed to persist assistant message"
                );
                None
            }
        }
    };

    let result = state
        .reconciler
        .reconcile(
            id_user,
            id_chat,
            assistant_row.map(|row| row.id),
            model,
            outcome.usage,
        )
        .await;
    if let Err(err) = result {
        error!(
            user = id_user,
            id_request = %id_request,
            model = %model.name,
            error = %err,
            "failed to reconcile usage"
        );
    }
}
