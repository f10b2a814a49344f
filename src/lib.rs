// Library root
// -----------
// This crate exposes the library surface behind the `be` binary.
//
// Module responsibilities:
// - `config`: Resolves the API base URL and the credential file location.
// - `session`: Reads, writes and clears the locally stored token and
//   decides whether it is still valid.
// - `api`: Encapsulates HTTP interactions with the backend (signup,
//   status, send, balance) and maps failures into `error::Error`.
// - `ops`: Signup/Status/Send/Balance/Logout as single calls combining
//   `session` and `api`.
// - `ui`: Command-line parsing, prompts and printing; the only place
//   errors are shown to the user.
pub mod api;
pub mod config;
pub mod error;
pub mod ops;
pub mod session;
pub mod types;
pub mod ui;

pub use error::{AuthError, Error, Result};
