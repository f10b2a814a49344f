//! High-level operations combining the session store and the API client.
//!
//! Each operation loads the credential record once, performs its local
//! checks, and makes at most one request. Nothing is persisted when the
//! request fails.

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::{AuthError, Error, Result};
use crate::session::{is_valid, SessionStore};
use crate::types::{
    BalanceResponse, CredentialRecord, SendRequest, SendResponse, SignupRequest, StatusResponse,
};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Result of [`Operations::signup`].
#[derive(Debug, Clone)]
pub enum SignupOutcome {
    /// A valid session already existed; no request was made.
    AlreadySignedUp(CredentialRecord),
    /// A new account was created and its credentials stored.
    Created {
        record: CredentialRecord,
        message: String,
    },
}

impl SignupOutcome {
    pub fn record(&self) -> &CredentialRecord {
        match self {
            SignupOutcome::AlreadySignedUp(record) => record,
            SignupOutcome::Created { record, .. } => record,
        }
    }
}

pub struct Operations<'a> {
    config: &'a Config,
    store: SessionStore,
}

impl<'a> Operations<'a> {
    pub fn new(config: &'a Config) -> Self {
        Operations {
            config,
            store: SessionStore::new(&config.credentials_path),
        }
    }

    /// Create an account unless a valid session already exists.
    ///
    /// `collect` supplies the username and email and is only called when a
    /// new account is actually needed.
    pub fn signup<F>(&self, collect: F) -> Result<SignupOutcome>
    where
        F: FnOnce() -> Result<(String, String)>,
    {
        let mut record = self.store.load()?;
        if is_valid(&record, Utc::now()) {
            info!("Existing session for user {} is still valid", record.user_id);
            return Ok(SignupOutcome::AlreadySignedUp(record));
        }

        let (username, email) = collect()?;
        let req = validate_signup(&username, &email)?;

        let resp = ApiClient::new(self.config)?.signup(&req)?;

        record.api_token = resp.token;
        record.user_id = resp.user_id;
        record.expires_at = resp.expires_at;
        record.api_url = self.config.api_url.clone();
        record.created_at = Utc::now();
        self.store.save(&mut record)?;

        info!("Signed up as user {}", record.user_id);
        Ok(SignupOutcome::Created {
            record,
            message: resp.message,
        })
    }

    /// Query account status with the stored token.
    pub fn status(&self) -> Result<StatusResponse> {
        let (mut record, api) = self.authenticated()?;
        let resp = api.status()?;
        self.touch(&mut record);
        Ok(resp)
    }

    /// Submit a transfer of `amount` satoshis to `to_address`.
    pub fn send(&self, amount: i64, to_address: &str, message: Option<&str>) -> Result<SendResponse> {
        validate_amount(amount)?;
        let (mut record, api) = self.authenticated()?;

        let req = SendRequest {
            amount,
            to_address: to_address.to_string(),
            message: message.filter(|m| !m.is_empty()).map(str::to_string),
        };
        let resp = api.send(&req)?;
        self.touch(&mut record);

        info!("Submitted transaction {}", resp.transaction_id);
        Ok(resp)
    }

    /// Fetch the account balance with the stored token.
    pub fn balance(&self) -> Result<BalanceResponse> {
        let (mut record, api) = self.authenticated()?;
        let resp = api.balance()?;
        self.touch(&mut record);
        Ok(resp)
    }

    /// Forget the local session.
    pub fn logout(&self) -> Result<()> {
        self.store.clear()
    }

    /// Refresh `last_used` after a successful authenticated call. The
    /// request already took effect, so a failed write is only logged.
    fn touch(&self, record: &mut CredentialRecord) {
        if let Err(e) = self.store.save(record) {
            warn!("Could not update last-used time: {}", e);
        }
    }

    /// Load the record, require it to be valid and build a client carrying its token.
    fn authenticated(&self) -> Result<(CredentialRecord, ApiClient)> {
        let record = self.store.load()?;
        check_session(&record)?;

        let mut api = ApiClient::new(self.config)?;
        api.set_token(&record.api_token);
        Ok((record, api))
    }
}

fn check_session(record: &CredentialRecord) -> Result<()> {
    if record.api_token.is_empty() {
        debug!("No stored session");
        return Err(AuthError::NotSignedUp.into());
    }
    if !is_valid(record, Utc::now()) {
        debug!("Stored token expired at {}", record.expires_at);
        return Err(AuthError::TokenExpired.into());
    }
    Ok(())
}

/// Trim and check signup input.
pub fn validate_signup(username: &str, email: &str) -> Result<SignupRequest> {
    let username = username.trim();
    let email = email.trim();

    if username.is_empty() {
        return Err(Error::Validation("username cannot be empty".into()));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(Error::Validation("please enter a valid email address".into()));
    }

    Ok(SignupRequest {
        username: username.to_string(),
        email: email.to_string(),
    })
}

pub fn validate_amount(amount: i64) -> Result<()> {
    if amount <= 0 {
        return Err(Error::Validation("amount must be positive".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_input_is_trimmed() {
        let req = validate_signup("  alice ", " alice@example.com\n").unwrap();
        assert_eq!(req.username, "alice");
        assert_eq!(req.email, "alice@example.com");
    }

    #[test]
    fn signup_input_rejects_blank_username_and_bad_email() {
        assert!(validate_signup("   ", "a@b.c").unwrap_err().is_validation());
        assert!(validate_signup("alice", "").unwrap_err().is_validation());
        assert!(validate_signup("alice", "alice.example.com")
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(validate_amount(1).is_ok());
        assert!(validate_amount(0).unwrap_err().is_validation());
        assert!(validate_amount(-5).unwrap_err().is_validation());
    }

    #[test]
    fn empty_and_expired_sessions_are_rejected() {
        let err = check_session(&CredentialRecord::default()).unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::NotSignedUp)));

        let expired = CredentialRecord {
            api_token: "tok".into(),
            expires_at: Utc::now() - chrono::Duration::minutes(1),
            ..Default::default()
        };
        let err = check_session(&expired).unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::TokenExpired)));
    }
}
