use std::convert::Infallible;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::StreamExt;
use tracing::{debug, info};

use crate::{
    error::AppError,
    message::ChatRequest,
    services::{
        answer::{NO_MATCH_REPLY, reply_chunks},
        faq_store::FaqRecord,
    },
    state::SharedState,
};

/// Answer one question, streaming the reply as plain text.
pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Response, AppError> {
    let trimmed = payload.message.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("No message provided".to_string()));
    }

    let reply = match state.faq.best_match(trimmed).await? {
        Some(record) => {
            info!(faq_id = record.id, question = %record.question, "matched faq record");
            record.answer
        }
        None => {
            info!("no faq record matched");
            NO_MATCH_REPLY.to_string()
        }
    };

    let chunks = reply_chunks(&reply);
    debug!(chunks = chunks.len(), "streaming reply");

    let delay = state.stream_delay;
    let stream = futures::stream::iter(chunks).then(move |chunk| async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok::<_, Infallible>(Bytes::from(chunk))
    });

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    )
        .into_response())
}

pub async fn list_faq_handler(
    State(state): State<SharedState>,
) -> Result<Json<Vec<FaqRecord>>, AppError> {
    Ok(Json(state.faq.all().await?))
}
