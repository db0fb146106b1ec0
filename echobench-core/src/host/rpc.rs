// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Legacy RPC host: length-delimited frames over persistent TCP connections.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tokio_util::codec::Framed;

use crate::frame::{self, RequestHeader};

use super::{EchoState, OperationError};

pub(super) async fn serve(
    listener: TcpListener,
    state: Arc<EchoState>,
    mut signal: oneshot::Receiver<()>,
) -> std::io::Result<()> {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let state = state.clone();
                    connections.spawn(async move {
                        if let Err(e) = serve_connection(stream, &state).await {
                            tracing::debug!(%peer, error = %e, "RPC connection ended with error");
                        }
                    });
                }
                Err(e) => tracing::warn!(error = %e, "Accept failed"),
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            _ = &mut signal => break,
        }
    }

    connections.shutdown().await;
    Ok(())
}

/// Answer frames in arrival order until the peer hangs up.
async fn serve_connection(stream: TcpStream, state: &EchoState) -> std::io::Result<()> {
    stream.set_nodelay(true)?;
    let mut framed = Framed::new(stream, frame::length_codec());

    while let Some(request) = framed.next().await {
        let request = request?;
        let response = match handle_frame(state, &request) {
            Ok(body) => frame::encode_ok(&body),
            Err(e) => frame::encode_fault(&e.to_string()),
        };
        framed.send(response).await?;
    }

    Ok(())
}

fn handle_frame(state: &EchoState, request: &[u8]) -> Result<Vec<u8>, OperationError> {
    let (header, body) = RequestHeader::decode(request).map_err(|e| {
        let err = OperationError::from(e);
        state.record_fault(None, &err);
        err
    })?;

    let result = if header.format != state.format() {
        Err(OperationError::FormatMismatch {
            expected: state.format(),
            actual: header.format,
        })
    } else {
        state.echo(header.payload, body, header.item_count)
    };

    if let Err(e) = &result {
        state.record_fault(Some(header.payload), e);
    }
    result
}
