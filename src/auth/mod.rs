/*!
 * # Login gate
 *
 * The dashboard has a single operator account. A [`Session`] compares the
 * submitted credentials against the configured ones and remembers whether
 * the operator is logged in. There are no roles, tokens or expiry.
 */

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::errors::ServiceError;

/// Operator credentials accepted by the login gate.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.admin_username.clone(), config.admin_password.clone())
    }

    fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    credentials: Credentials,
    logged_in: bool,
}

impl Session {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            logged_in: false,
        }
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<(), ServiceError> {
        if !self.credentials.matches(username, password) {
            warn!(username, "login rejected");
            return Err(ServiceError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        }
        self.logged_in = true;
        info!(username, "operator logged in");
        Ok(())
    }

    pub fn logout(&mut self) {
        if self.logged_in {
            info!(username = %self.credentials.username, "operator logged out");
        }
        self.logged_in = false;
    }

    pub fn is_authenticated(&self) -> bool {
        self.logged_in
    }

    /// Fails with `Unauthorized` unless someone is logged in.
    pub fn require_login(&self) -> Result<(), ServiceError> {
        if self.logged_in {
            Ok(())
        } else {
            Err(ServiceError::Unauthorized("Login required".to_string()))
        }
    }
}
