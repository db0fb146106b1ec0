// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! First-generation REST host: bare hyper connections and a hand-routed
//! `service_fn`.

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinSet;

use crate::payload::PayloadKind;

use super::{item_count_from_query, route_payload, EchoState, OperationError, MAX_REQUEST_BODY_BYTES};

pub(super) async fn serve(
    listener: TcpListener,
    state: Arc<EchoState>,
    mut signal: oneshot::Receiver<()>,
) -> std::io::Result<()> {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed");
                        continue;
                    }
                };

                let state = state.clone();
                connections.spawn(async move {
                    let service = service_fn(move |req| handle(state.clone(), req));
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        tracing::debug!(%peer, error = %e, "Connection ended with error");
                    }
                });
            }
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            _ = &mut signal => break,
        }
    }

    // open keep-alive connections are dropped rather than drained
    connections.shutdown().await;
    Ok(())
}

async fn handle(
    state: Arc<EchoState>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let payload = route_payload(req.uri().path()).ok();

    let response = match respond(&state, req).await {
        Ok(body) => {
            let mut response = Response::new(Full::new(Bytes::from(body)));
            response.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static(state.format().content_type()),
            );
            response
        }
        Err(e) => {
            state.record_fault(payload, &e);
            error_response(&e)
        }
    };

    Ok(response)
}

async fn respond(state: &EchoState, req: Request<Incoming>) -> Result<Vec<u8>, OperationError> {
    let payload: PayloadKind = route_payload(req.uri().path())?;

    if req.method() != Method::POST {
        return Err(OperationError::MethodNotAllowed(req.method().to_string()));
    }

    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    state.check_content_type(content_type)?;

    let count = item_count_from_query(req.uri().query())?;

    let body = Limited::new(req.into_body(), MAX_REQUEST_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                OperationError::BodyTooLarge {
                    limit: MAX_REQUEST_BODY_BYTES,
                }
            } else {
                OperationError::BodyRead(e.to_string())
            }
        })?
        .to_bytes();

    state.echo(payload, &body, count)
}

fn error_response(err: &OperationError) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(err.to_string())));
    *response.status_mut() =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
