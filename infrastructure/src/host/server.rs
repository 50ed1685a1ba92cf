//! Line-delimited JSON-RPC server for the Host side.
//!
//! The reader loop owns the input stream. Every request runs on its own
//! task in a [`JoinSet`]; finished responses go through an `mpsc` channel to
//! a single writer task, so lines never interleave. On cancellation in-flight
//! invocations are aborted (the orchestrator still records their outcome).

use super::protocol::{
    HostMethod, HostProtocolError, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST,
    IncomingMessage, JsonRpcResponseOut, METHOD_NOT_FOUND, PARSE_ERROR, RpcError,
    initialize_result, tool_call_result, tool_listing,
};
use bridge_application::{BridgeOrchestrator, MeshTransport};
use bridge_domain::ToolCall;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Caller identity used when none is configured
pub const DEFAULT_CALLER: &str = "host";

/// Serves the bridge's tools to one Host over a pair of byte streams.
pub struct StdioHostServer<T: MeshTransport + 'static> {
    orchestrator: Arc<BridgeOrchestrator<T>>,
    caller: Arc<str>,
}

impl<T: MeshTransport + 'static> Clone for StdioHostServer<T> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
            caller: Arc::clone(&self.caller),
        }
    }
}

impl<T: MeshTransport + 'static> StdioHostServer<T> {
    pub fn new(orchestrator: Arc<BridgeOrchestrator<T>>) -> Self {
        Self {
            orchestrator,
            caller: Arc::from(DEFAULT_CALLER),
        }
    }

    /// Caller identity attached to every invocation from this Host.
    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Arc::from(caller.into());
        self
    }

    pub fn caller(&self) -> &str {
        &self.caller
    }

    /// Run until the input ends or `cancel` fires.
    pub async fn serve<R, W>(
        &self,
        reader: R,
        writer: W,
        cancel: CancellationToken,
    ) -> Result<(), HostProtocolError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let writer_handle = tokio::spawn(Self::writer_loop(writer, rx));

        let mut lines = BufReader::new(reader).lines();
        let mut in_flight = JoinSet::new();
        let mut cancelled = false;

        info!(caller = %self.caller, "Host session started");

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                next = lines.next_line() => next,
            };

            let line = match next {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!("Host reader: read error: {}", e);
                    in_flight.abort_all();
                    drop(tx);
                    let _ = writer_handle.await;
                    return Err(e.into());
                }
            };

            if line.trim().is_empty() {
                continue;
            }
            trace!("Host received: {}", line);

            // Reap finished tasks so the set does not grow unbounded
            while in_flight.try_join_next().is_some() {}

            let server = self.clone();
            let tx = tx.clone();
            in_flight.spawn(async move {
                if let Some(response) = server.handle_line(&line).await {
                    let _ = tx.send(response);
                }
            });
        }

        if cancelled {
            debug!(pending = in_flight.len(), "Host session cancelled");
            in_flight.abort_all();
        }
        while in_flight.join_next().await.is_some() {}

        drop(tx);
        let written = writer_handle
            .await
            .map_err(|_| HostProtocolError::WriterClosed)?;
        info!(caller = %self.caller, "Host session ended");
        written
    }

    async fn writer_loop<W>(
        writer: W,
        mut rx: mpsc::UnboundedReceiver<String>,
    ) -> Result<(), HostProtocolError>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut writer = tokio::io::BufWriter::new(writer);
        while let Some(line) = rx.recv().await {
            trace!("Host send: {}", line);
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        writer.shutdown().await.ok();
        Ok(())
    }

    /// Handle one input line. Returns the serialized response, or `None`
    /// for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<IncomingMessage>(line) {
            Ok(message) => self.handle_message(message).await?,
            Err(e) => {
                debug!("Host: unparseable line: {}", e);
                JsonRpcResponseOut::failure(Value::Null, RpcError::new(PARSE_ERROR, "Parse error"))
            }
        };

        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Host: failed to serialize response: {}", e);
                None
            }
        }
    }

    async fn handle_message(&self, message: IncomingMessage) -> Option<JsonRpcResponseOut> {
        let Some(id) = message.id else {
            debug!(method = ?message.method, "Host notification ignored");
            return None;
        };

        let Some(method_name) = message.method.as_deref() else {
            return Some(JsonRpcResponseOut::failure(
                id,
                RpcError::new(INVALID_REQUEST, "Missing method"),
            ));
        };

        let Some(method) = HostMethod::from_name(method_name) else {
            return Some(JsonRpcResponseOut::failure(
                id,
                RpcError::new(METHOD_NOT_FOUND, format!("Method not found: {}", method_name)),
            ));
        };

        let response = match method {
            HostMethod::Initialize => {
                JsonRpcResponseOut::success(id, initialize_result(message.params.as_ref()))
            }
            HostMethod::Ping => JsonRpcResponseOut::success(id, json!({})),
            HostMethod::ListTools => {
                JsonRpcResponseOut::success(id, tool_listing(self.orchestrator.tool_spec()))
            }
            HostMethod::CallTool => self.call_tool(id, message.params).await,
        };
        Some(response)
    }

    async fn call_tool(&self, id: Value, params: Option<Value>) -> JsonRpcResponseOut {
        let call = match params.map(serde_json::from_value::<ToolCall>).transpose() {
            Ok(Some(call)) => call,
            Ok(None) => {
                return JsonRpcResponseOut::failure(
                    id,
                    RpcError::new(INVALID_PARAMS, "tools/call requires params"),
                );
            }
            Err(e) => {
                return JsonRpcResponseOut::failure(
                    id,
                    RpcError::new(INVALID_PARAMS, format!("Invalid tools/call params: {}", e)),
                );
            }
        };

        let response = self.orchestrator.handle(call, &self.caller).await;
        match tool_call_result(&response) {
            Ok(result) => JsonRpcResponseOut::success(id, result),
            Err(e) => JsonRpcResponseOut::failure(id, RpcError::new(INTERNAL_ERROR, e.to_string())),
        }
    }
}
