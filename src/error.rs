//! Error types shared by every layer of the client.
//!
//! Local checks (input validation, missing or expired session) never touch
//! the network. Remote failures are split between `Transport`, where no
//! usable server answer exists, and `Api`, where the server returned a
//! well-formed error body.

use thiserror::Error;

/// Why a locally stored session cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("not signed up yet. Run 'be signup' to create an account")]
    NotSignedUp,

    #[error("token has expired. Run 'be signup' to refresh your token")]
    TokenExpired,
}

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed user input, detected before any request is made.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Connection failure, timeout or an unusable HTTP response.
    /// `status` is set when a status line arrived but the body could not be used.
    #[error("{}", transport_message(.status, .message))]
    Transport { status: Option<u16>, message: String },

    /// Error body returned by the server.
    #[error("API error: {message}")]
    Api {
        code: u16,
        short_error: String,
        message: String,
    },

    /// Interactive input could not be read from the terminal.
    #[error("failed to read {0}")]
    Input(String),

    /// Credential or settings file could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),
}

fn transport_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("HTTP {}: {}", code, message),
        None => format!("request failed: {}", message),
    }
}

impl Error {
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }

    pub fn is_api(&self) -> bool {
        matches!(self, Error::Api { .. })
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage(_))
    }

    pub(crate) fn transport(message: impl std::fmt::Display) -> Self {
        Error::Transport {
            status: None,
            message: message.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_server_message() {
        let err = Error::Api {
            code: 401,
            short_error: "unauthorized".into(),
            message: "token expired".into(),
        };
        assert_eq!(err.to_string(), "API error: token expired");
        assert!(err.is_api());
    }

    #[test]
    fn transport_error_includes_raw_status() {
        let err = Error::Transport {
            status: Some(502),
            message: "<html>bad gateway</html>".into(),
        };
        assert_eq!(err.to_string(), "HTTP 502: <html>bad gateway</html>");

        let err = Error::transport("connection refused");
        assert_eq!(err.to_string(), "request failed: connection refused");
    }

    #[test]
    fn input_error_is_not_validation() {
        let err = Error::Input("username: unexpected end of file".into());
        assert_eq!(err.to_string(), "failed to read username: unexpected end of file");
        assert!(!err.is_validation());
    }

    #[test]
    fn auth_kinds_convert() {
        let err: Error = AuthError::TokenExpired.into();
        assert!(err.is_auth());
        assert!(err.to_string().contains("expired"));
    }
}
