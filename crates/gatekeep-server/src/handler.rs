//! Per-connection handler: hello, join, and message pumping.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. WebSocket upgrade
//!   2. Receive `Hello` → identity and display name
//!   3. Join through the host actor (welcome and gate prompts are queued)
//!   4. Loop: forward outbound messages to the socket, and client frames
//!      to the actor, until the client leaves or the socket closes

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use gatekeep::GateError;
use gatekeep_protocol::{ClientMessage, Codec, Identity, JsonCodec, ServerMessage};
use gatekeep_session::SessionError;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::{HostHandle, ServerError};

/// How long a new connection has to send `Hello`.
const HELLO_TIMEOUT: Duration = Duration::from_secs(10);

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsSource = SplitStream<WebSocketStream<TcpStream>>;

/// Sends `Leave` for the player when the handler exits, however it exits.
///
/// `Drop` is synchronous, so the send is spawned.
struct LeaveGuard {
    identity: Identity,
    host: HostHandle,
}

impl Drop for LeaveGuard {
    fn drop(&mut self) {
        let identity = self.identity;
        let host = self.host.clone();
        tokio::spawn(async move {
            let _ = host.leave(identity).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    host: HostHandle,
    codec: JsonCodec,
) -> Result<(), ServerError> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut sink, mut source) = ws.split();
    tracing::debug!(%peer, "websocket connection accepted");

    // --- Step 1: Hello ---
    let hello = tokio::time::timeout(HELLO_TIMEOUT, recv_hello(&mut source, &codec)).await;
    let (identity, name) = match hello {
        Ok(Ok(hello)) => hello,
        Ok(Err(e)) => {
            let _ = send(&mut sink, &codec, &error_frame(400, &e.to_string())).await;
            return Err(e);
        }
        Err(_) => {
            tracing::info!(%peer, "no Hello before timeout");
            return Err(ServerError::Handshake("timed out waiting for Hello".into()));
        }
    };

    // --- Step 2: Join ---
    let (outbox, mut inbox) = mpsc::unbounded_channel();
    if let Err(e) = host.join(identity, name, outbox).await {
        tracing::info!(%peer, %identity, error = %e, "join refused");
        let code = join_refusal_code(&e);
        let _ = send(&mut sink, &codec, &error_frame(code, &e.to_string())).await;
        return Err(e);
    }
    let _guard = LeaveGuard {
        identity,
        host: host.clone(),
    };
    tracing::info!(%peer, %identity, "player connected");

    // --- Step 3: Message loop ---
    loop {
        tokio::select! {
            Some(message) = inbox.recv() => {
                send(&mut sink, &codec, &message).await?;
            }
            frame = source.next() => {
                let data = match frame {
                    Some(Ok(Message::Binary(data))) => data.to_vec(),
                    Some(Ok(Message::Text(text))) => text.as_bytes().to_vec(),
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!(%identity, "connection closed");
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        tracing::debug!(%identity, error = %e, "receive failed");
                        break;
                    }
                };

                let message: ClientMessage = match codec.decode(&data) {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::debug!(%identity, error = %e, "undecodable frame");
                        send(&mut sink, &codec, &error_frame(400, &e.to_string())).await?;
                        continue;
                    }
                };

                match message {
                    ClientMessage::Chat { text } => host.chat(identity, text).await?,
                    ClientMessage::Command { line } => host.command(identity, line).await?,
                    ClientMessage::Move { position } => host.move_to(identity, position).await?,
                    ClientMessage::Leave => {
                        tracing::info!(%identity, "player left");
                        break;
                    }
                    ClientMessage::Hello { .. } => {
                        send(&mut sink, &codec, &error_frame(400, "already joined")).await?;
                    }
                }
            }
        }
    }

    let _ = sink.close().await;
    // _guard drops here → Leave reaches the actor.
    Ok(())
}

/// Reads frames until the first data frame, which must be `Hello`.
async fn recv_hello(
    source: &mut WsSource,
    codec: &JsonCodec,
) -> Result<(Identity, String), ServerError> {
    loop {
        let data = match source.next().await {
            Some(Ok(Message::Binary(data))) => data.to_vec(),
            Some(Ok(Message::Text(text))) => text.as_bytes().to_vec(),
            Some(Ok(Message::Close(_))) | None => {
                return Err(ServerError::Handshake("closed before Hello".into()));
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e.into()),
        };

        return match codec.decode::<ClientMessage>(&data)? {
            ClientMessage::Hello { identity, name } => Ok((identity, name)),
            _ => Err(ServerError::Handshake("first message must be Hello".into())),
        };
    }
}

async fn send(
    sink: &mut WsSink,
    codec: &JsonCodec,
    message: &ServerMessage,
) -> Result<(), ServerError> {
    let bytes = codec.encode(message)?;
    sink.send(Message::Binary(bytes.into())).await?;
    Ok(())
}

/// 409 when the identity is already online; anything else is on our side.
fn join_refusal_code(error: &ServerError) -> u16 {
    match error {
        ServerError::Gate(GateError::Session(SessionError::AlreadyConnected(_))) => 409,
        ServerError::HostStopped => 503,
        _ => 500,
    }
}

fn error_frame(code: u16, message: &str) -> ServerMessage {
    ServerMessage::Error {
        code,
        message: message.to_string(),
    }
}
