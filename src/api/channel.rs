use std::io;
use std::net::TcpStream;
use std::time::Duration;

use log::{debug, info, warn};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use super::error::{ApiError, ApiResult};
use crate::models::{DownloadRequest, ProgressFrame};

// How long to wait for the server to acknowledge our close frame
const CLOSE_TIMEOUT: Duration = Duration::from_secs(3);

/// A live download progress stream.
pub trait ProgressChannel: Send {
    /// Next parsed frame, or `None` once the server has closed the stream.
    fn next_frame(&mut self) -> ApiResult<Option<ProgressFrame>>;

    fn close(&mut self);
}

pub struct WsChannel {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
    closed: bool,
}

impl WsChannel {
    pub fn connect(endpoint: &str) -> ApiResult<Self> {
        let (socket, _response) = tungstenite::connect(endpoint)?;
        info!("WebSocket connection established: {}", endpoint);
        Ok(Self {
            socket,
            closed: false,
        })
    }

    pub fn send_request(&mut self, request: &DownloadRequest<'_>) -> ApiResult<()> {
        let text = serde_json::to_string(request)?;
        debug!("sending download request: {}", text);
        self.socket.send(Message::Text(text))?;
        Ok(())
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        match self.socket.get_mut() {
            MaybeTlsStream::Plain(stream) => stream.set_read_timeout(timeout),
            MaybeTlsStream::Rustls(stream) => stream.get_ref().set_read_timeout(timeout),
            _ => Ok(()),
        }
    }
}

impl ProgressChannel for WsChannel {
    fn next_frame(&mut self) -> ApiResult<Option<ProgressFrame>> {
        loop {
            match self.socket.read() {
                Ok(Message::Text(text)) => match serde_json::from_str::<ProgressFrame>(&text) {
                    Ok(frame) => {
                        debug!("progress frame: {:?}", frame);
                        return Ok(Some(frame));
                    }
                    Err(e) => warn!("skipping malformed progress frame {:?}: {}", text, e),
                },
                Ok(Message::Close(_)) => {
                    info!("WebSocket connection closed by server");
                    self.closed = true;
                    return Ok(None);
                }
                Ok(_) => continue,
                Err(tungstenite::Error::ConnectionClosed)
                | Err(tungstenite::Error::AlreadyClosed) => {
                    self.closed = true;
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(e) = self.socket.close(None) {
            warn!("failed to close WebSocket: {}", e);
            return;
        }
        if let Err(e) = self.set_read_timeout(Some(CLOSE_TIMEOUT)) {
            warn!("failed to bound WebSocket close: {}", e);
            return;
        }
        // Drain until the server acknowledges the close frame or goes quiet
        while self.socket.read().is_ok() {}
        info!("WebSocket connection closed");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Frame(ProgressFrame),
    /// The server ended the stream without a terminal frame
    Closed,
    Failed(ApiError),
}

/// Forwards frames until a terminal status, closing the channel exactly once.
pub fn pump_progress<F>(channel: &mut dyn ProgressChannel, mut on_event: F)
where
    F: FnMut(ChannelEvent),
{
    loop {
        match channel.next_frame() {
            Ok(Some(frame)) => {
                let terminal = frame.status.is_terminal();
                on_event(ChannelEvent::Frame(frame));
                if terminal {
                    channel.close();
                    return;
                }
            }
            Ok(None) => {
                on_event(ChannelEvent::Closed);
                return;
            }
            Err(e) => {
                warn!("progress stream failed: {}", e);
                channel.close();
                on_event(ChannelEvent::Failed(e));
                return;
            }
        }
    }
}
