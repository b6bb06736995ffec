//! Municipal Resident Registry
//!
//! Application core of the resident-registry system: the record model, a
//! dual persistence gateway (remote table with a local-mirror fallback),
//! the session guard, the registration form, the report/export pipeline
//! and the dashboard aggregation.

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod form;
pub mod model;
pub mod report;
pub mod routes;
pub mod store;
pub mod validate;

use reqwest::Client;

use crate::auth::{Auth, SessionGuard};
use crate::config::ClientOptions;
use crate::store::{ResidentStore, TransferSlot};

/// The main entry point of the registry client
pub struct Cadastro {
    /// The base URL of the managed backend
    pub url: String,
    /// The anonymous API key of the project
    pub key: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Auth client for session management
    pub auth: Auth,
    /// Client options
    pub options: ClientOptions,
}

impl Cadastro {
    /// Create a new registry client
    ///
    /// # Example
    ///
    /// ```
    /// use cadastro_moradores::Cadastro;
    ///
    /// let cadastro = Cadastro::new("https://project.example.co", "anon-key");
    /// ```
    pub fn new(url: &str, key: &str) -> Self {
        Self::new_with_options(url, key, ClientOptions::default())
    }

    /// Create a new registry client with custom options
    pub fn new_with_options(url: &str, key: &str, options: ClientOptions) -> Self {
        let http_client = Client::new();

        let auth = Auth::new(url, key, http_client.clone(), options.clone());

        Self {
            url: url.to_string(),
            key: key.to_string(),
            http_client,
            auth,
            options,
        }
    }

    /// Get a reference to the auth client
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Create the persistence gateway for resident records
    ///
    /// The returned store is cheap to clone; clones share the change
    /// notification channel.
    pub fn store(&self) -> ResidentStore {
        ResidentStore::new(&self.url, &self.key, self.http_client.clone(), &self.options)
    }

    /// Create a session guard gating the protected views
    pub fn session_guard(&self) -> SessionGuard {
        SessionGuard::new()
    }

    /// The edit handoff slot shared by the report view and the form
    pub fn transfer_slot(&self) -> TransferSlot {
        TransferSlot::new(self.options.data_dir.clone())
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::{Access, SessionGuard, SessionState};
    pub use crate::config::ClientOptions;
    pub use crate::dashboard::{Dashboard, Stats};
    pub use crate::error::Error;
    pub use crate::form::RegistrationForm;
    pub use crate::model::{Resident, ResidentDraft, ResidentPatch};
    pub use crate::report::ReportView;
    pub use crate::routes::Route;
    pub use crate::store::{PersistMode, ResidentStore, StoreEvent, Stored};
    pub use crate::Cadastro;
}
