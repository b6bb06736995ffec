//! Authentication against the managed backend

mod guard;
mod session;

use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::ClientOptions;
use crate::error::Error;
use crate::fetch::Fetch;

pub use guard::{Access, SessionGuard, SessionState};
pub use session::Session;

/// The operator account behind a session
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Response of the token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: User,
}

/// Client for the authentication endpoints
pub struct Auth {
    url: String,
    key: String,
    client: Client,
    session: Arc<Mutex<Option<Session>>>,
    options: ClientOptions,
}

impl Auth {
    pub(crate) fn new(url: &str, key: &str, client: Client, options: ClientOptions) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            session: Arc::new(Mutex::new(None)),
            options,
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    /// Sign in with email and password, storing the session on success
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, Error> {
        let url = self.auth_url("/token?grant_type=password");

        let mut body = HashMap::new();
        body.insert("email".to_string(), email.to_string());
        body.insert("password".to_string(), password.to_string());

        let result = Fetch::post(&self.client, &url)
            .apikey(&self.key)
            .timeout(self.options.request_timeout)
            .json(&body)?
            .execute::<AuthResponse>()
            .await
            .map_err(|e| Error::auth(e))?;

        let session = Session::new(
            result.access_token,
            result.refresh_token,
            result.user.id,
            result.expires_in,
        );

        let mut current = self.session.lock().unwrap();
        *current = Some(session.clone());

        Ok(session)
    }

    /// Sign out, clearing the stored session
    pub async fn sign_out(&self) -> Result<(), Error> {
        let url = self.auth_url("/logout");

        let token = {
            let current = self.session.lock().unwrap();
            match *current {
                Some(ref session) => session.access_token.clone(),
                None => return Err(Error::auth("not signed in")),
            }
        };

        Fetch::post(&self.client, &url)
            .apikey(&self.key)
            .bearer_auth(&token)
            .timeout(self.options.request_timeout)
            .execute_raw()
            .await?;

        let mut current = self.session.lock().unwrap();
        *current = None;

        Ok(())
    }

    /// Fetch the user behind the current session
    pub async fn get_user(&self) -> Result<User, Error> {
        let url = self.auth_url("/user");

        let token = {
            let current = self.session.lock().unwrap();
            match *current {
                Some(ref session) => session.access_token.clone(),
                None => return Err(Error::auth("not signed in")),
            }
        };

        let user = Fetch::get(&self.client, &url)
            .apikey(&self.key)
            .bearer_auth(&token)
            .timeout(self.options.request_timeout)
            .execute::<User>()
            .await
            .map_err(|e| Error::auth(e))?;

        Ok(user)
    }

    /// Get the current session, if any
    pub fn get_session(&self) -> Option<Session> {
        let current = self.session.lock().unwrap();
        current.clone()
    }

    /// Replace the stored session (restored from persisted state)
    pub fn set_session(&self, session: Session) {
        let mut current = self.session.lock().unwrap();
        *current = Some(session);
    }

    /// Drop the stored session without a remote round-trip
    pub fn clear_session(&self) {
        let mut current = self.session.lock().unwrap();
        *current = None;
    }
}
