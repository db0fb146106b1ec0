// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Modern REST host built on axum.
//!
//! The host's format is the only one configured: [`EncodedBody`] refuses any
//! other `Content-Type` and [`Encoded`] stamps the format's media type on the
//! response.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, DefaultBodyLimit, FromRequest, Path, Query, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;

use crate::payload::PayloadKind;
use crate::types::ItemCount;

use super::{EchoState, OperationError, MAX_REQUEST_BODY_BYTES};

/// Query string of the echo route.
#[derive(Debug, Deserialize)]
pub struct EchoQuery {
    #[serde(rename = "itemCount", default)]
    pub item_count: Option<u32>,
}

/// Raw request body whose `Content-Type` matched the host's format.
pub struct EncodedBody(pub Bytes);

impl FromRequest<Arc<EchoState>> for EncodedBody {
    type Rejection = OperationError;

    async fn from_request(req: Request, state: &Arc<EchoState>) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        state.check_content_type(content_type)?;

        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                OperationError::BodyTooLarge {
                    limit: MAX_REQUEST_BODY_BYTES,
                }
            } else {
                OperationError::BodyRead(rejection.body_text())
            }
        })?;

        Ok(Self(bytes))
    }
}

/// Encoded response body with its media type.
pub struct Encoded {
    content_type: &'static str,
    body: Vec<u8>,
}

impl IntoResponse for Encoded {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

impl IntoResponse for OperationError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, self.to_string()).into_response()
    }
}

/// Build the echo router for one host.
pub fn router(state: Arc<EchoState>) -> Router {
    Router::new()
        .route("/api/operation/{type_name}", post(echo))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub(super) async fn serve(
    listener: TcpListener,
    state: Arc<EchoState>,
    signal: oneshot::Receiver<()>,
) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = signal.await;
        })
        .await
}

async fn echo(
    State(state): State<Arc<EchoState>>,
    Path(type_name): Path<String>,
    query: Result<Query<EchoQuery>, QueryRejection>,
    body: Result<EncodedBody, OperationError>,
) -> Result<Encoded, OperationError> {
    let payload = PayloadKind::from_type_name(&type_name);

    let result = respond(&state, payload, type_name, query, body);
    if let Err(e) = &result {
        state.record_fault(payload, e);
    }

    result.map(|body| Encoded {
        content_type: state.format().content_type(),
        body,
    })
}

fn respond(
    state: &EchoState,
    payload: Option<PayloadKind>,
    type_name: String,
    query: Result<Query<EchoQuery>, QueryRejection>,
    body: Result<EncodedBody, OperationError>,
) -> Result<Vec<u8>, OperationError> {
    let payload = payload.ok_or(OperationError::UnknownType(type_name))?;
    let EncodedBody(bytes) = body?;
    let Query(query) = query.map_err(|e| OperationError::InvalidItemCount(e.body_text()))?;
    let count = query.item_count.map(ItemCount::new).unwrap_or_default();

    state.echo(payload, &bytes, count)
}
