// API client module: a small blocking HTTP client for the remote API.
// Every call is exactly one request; there are no retries and the only
// time bound is the client-wide timeout.

use crate::config::{Config, USER_AGENT};
use crate::error::{Error, Result};
use crate::types::{
    BalanceResponse, ErrorBody, SendRequest, SendResponse, SignupRequest, SignupResponse,
    StatusResponse,
};
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

const API_PREFIX: &str = "/api/v1";

/// Blocking API client holding the reqwest client, the base URL and an
/// optional bearer token for authenticated calls.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(ApiClient {
            client,
            base_url: config.api_url.clone(),
            token: None,
        })
    }

    /// Store a token for subsequent authenticated requests.
    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// Issue one request against `{base_url}/api/v1{path}` and decode the
    /// response as `R`.
    ///
    /// Status >= 400 is decoded as the server's error body when possible,
    /// giving [`Error::Api`]; otherwise the raw status and body come back as
    /// [`Error::Transport`].
    pub fn request<B, R>(&self, method: Method, path: &str, body: Option<&B>) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        let mut req = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| Error::transport(format!("failed to encode request body: {}", e)))?;
            req = req.body(bytes);
        }

        debug!("{} {}", method, url);
        let res = req.send().map_err(Error::transport)?;
        let status = res.status();
        let text = res
            .text()
            .map_err(|e| Error::transport(format!("failed to read response body: {}", e)))?;
        debug!("{} {} -> {}", method, url, status);

        if status.as_u16() >= 400 {
            return Err(match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => Error::Api {
                    code: if body.code == 0 { status.as_u16() } else { body.code },
                    short_error: body.error,
                    message: body.message,
                },
                Err(_) => Error::Transport {
                    status: Some(status.as_u16()),
                    message: text,
                },
            });
        }

        serde_json::from_str(&text)
            .map_err(|e| Error::transport(format!("failed to decode response: {}", e)))
    }

    /// `POST /signup`. Sent without a token.
    pub fn signup(&self, req: &SignupRequest) -> Result<SignupResponse> {
        self.request(Method::POST, "/signup", Some(req))
    }

    /// `GET /status` with the stored token.
    pub fn status(&self) -> Result<StatusResponse> {
        self.request::<(), _>(Method::GET, "/status", None)
    }

    /// `POST /send` with the stored token.
    pub fn send(&self, req: &SendRequest) -> Result<SendResponse> {
        self.request(Method::POST, "/send", Some(req))
    }

    /// `GET /balance` with the stored token.
    pub fn balance(&self) -> Result<BalanceResponse> {
        self.request::<(), _>(Method::GET, "/balance", None)
    }
}
