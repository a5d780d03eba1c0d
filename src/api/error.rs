// Error type shared by the HTTP calls and the progress socket

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The server could not be reached at all
    Unreachable,

    /// Non-success response carrying the backend's `detail` text
    Backend(String),

    /// Request failed in transit
    Transport(String),

    /// Body did not match the expected JSON shape
    Decode(String),

    /// WebSocket handshake, send or read failure
    Channel(String),

    /// Another error with a user-facing prefix, e.g. `API错误`
    Context(&'static str, Box<ApiError>),
}

impl ApiError {
    pub fn context(self, prefix: &'static str) -> Self {
        Self::Context(prefix, Box::new(self))
    }

    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Unreachable => true,
            Self::Context(_, inner) => inner.is_unreachable(),
            _ => false,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => write!(f, "无法连接到服务器，请检查网络连接"),
            Self::Backend(detail) => write!(f, "{}", detail),
            Self::Transport(msg) => write!(f, "{}", msg),
            Self::Decode(msg) => write!(f, "响应解析失败: {}", msg),
            Self::Channel(msg) => write!(f, "{}", msg),
            Self::Context(prefix, inner) => write!(f, "{}: {}", prefix, inner),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::Unreachable
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<tungstenite::Error> for ApiError {
    fn from(err: tungstenite::Error) -> Self {
        match &err {
            tungstenite::Error::Url(tungstenite::error::UrlError::UnableToConnect(_)) => {
                Self::Unreachable
            }
            tungstenite::Error::Io(io) if io.kind() == std::io::ErrorKind::ConnectionRefused => {
                Self::Unreachable
            }
            _ => Self::Channel(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
