//! Configuration options for the registry client

use std::path::PathBuf;
use std::time::Duration;

/// Configuration options for the registry client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout applied to remote calls
    pub request_timeout: Option<Duration>,

    /// Directory holding the local mirror and the edit transfer slot
    pub data_dir: PathBuf,

    /// Namespace the mirror array is stored under (file stem)
    pub mirror_namespace: String,

    /// The database schema used by the remote table
    pub db_schema: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            data_dir: PathBuf::from(".cadastro"),
            mirror_namespace: "residents".to_string(),
            db_schema: "public".to_string(),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the directory used for the local mirror
    pub fn with_data_dir<P: Into<PathBuf>>(mut self, value: P) -> Self {
        self.data_dir = value.into();
        self
    }

    /// Set the mirror namespace
    pub fn with_mirror_namespace(mut self, value: &str) -> Self {
        self.mirror_namespace = value.to_string();
        self
    }

    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }
}
