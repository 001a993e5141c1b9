//! Shared application state.

use std::sync::Arc;

use quillpad_core::TextGenerator;
use quillpad_db::Database;

/// Global rate limiter type (direct quota, no keyed bucketing).
pub type GlobalRateLimiter = governor::RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// OAuth provider configuration for browser login.
///
/// Absent when `OAUTH_CLIENT_ID` is not configured; the login handler then
/// rejects provider logins.
#[derive(Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub redirect_uri: String,
}

impl OAuthConfig {
    /// Load from environment variables; `None` if no client id is set.
    pub fn from_env(site_url: &str) -> Option<Self> {
        let client_id = std::env::var("OAUTH_CLIENT_ID").ok()?;
        if client_id.is_empty() {
            return None;
        }
        Some(Self {
            client_id,
            client_secret: std::env::var("OAUTH_CLIENT_SECRET").unwrap_or_default(),
            authorize_url: std::env::var("OAUTH_AUTHORIZE_URL")
                .unwrap_or_else(|_| "https://accounts.google.com/o/oauth2/v2/auth".to_string()),
            token_url: std::env::var("OAUTH_TOKEN_URL")
                .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".to_string()),
            userinfo_url: std::env::var("OAUTH_USERINFO_URL").unwrap_or_else(|_| {
                "https://openidconnect.googleapis.com/v1/userinfo".to_string()
            }),
            redirect_uri: format!("{}/api/v1/auth/callback", site_url),
        })
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Text generation backend (summaries, completions).
    pub text: Arc<dyn TextGenerator>,
    /// Public base URL of this deployment (cookie-free redirects).
    pub site_url: String,
    /// OAuth provider configuration (None disables provider login).
    pub oauth: Option<OAuthConfig>,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}
