//! The navigation surface of the application

/// Application routes; unmatched paths resolve to the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Residents,
    Reports,
    Login,
}

impl Route {
    /// Parse a path, falling back to the dashboard for unmatched paths
    pub fn parse(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "" => Route::Dashboard,
            "/residents" => Route::Residents,
            "/reports" => Route::Reports,
            "/login" => Route::Login,
            _ => Route::Dashboard,
        }
    }

    pub fn as_path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/",
            Route::Residents => "/residents",
            Route::Reports => "/reports",
            Route::Login => "/login",
        }
    }

    /// All routes except the login view require a session
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }
}
