//! Authentication handlers: signup, login, OAuth callback, logout, and the
//! session extractor used by every protected route.

use axum::async_trait;
use axum::extract::{FromRequestParts, Query, State};
use axum::http::{header, request::Parts, HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Redirect};
use axum::Json;
use chrono::Duration;
use serde::Deserialize;
use tracing::{error, info, warn};

use quillpad_core::{defaults, User, UserStore};

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user extracted from the session cookie.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Missing session".to_string()))?;

        let user = state
            .db
            .users
            .resolve_session(&token)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid or expired session".to_string()))?;

        Ok(CurrentUser(user))
    }
}

/// Extract the session token from the Cookie header, if present.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == defaults::SESSION_COOKIE && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Build the Set-Cookie value for a freshly minted session token.
fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        defaults::SESSION_COOKIE,
        token,
        defaults::SESSION_TTL_HOURS * 3600
    )
}

/// Build the Set-Cookie value that clears the session cookie.
fn clear_session_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        defaults::SESSION_COOKIE
    )
}

#[derive(Debug, Deserialize)]
pub struct SignupBody {
    email: Option<String>,
    password: Option<String>,
}

/// POST /api/v1/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupBody>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    };
    if email.trim().is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest("A valid email is required".to_string()));
    }
    if password.len() < defaults::PASSWORD_MIN_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            defaults::PASSWORD_MIN_CHARS
        )));
    }

    let user = state.db.users.create_account(&email, &password).await?;
    info!(user_id = %user.id, "Account created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    email: Option<String>,
    password: Option<String>,
    provider: Option<String>,
}

/// POST /api/v1/auth/login
///
/// Password login sets the session cookie; `{"provider": "google"}` returns
/// the OAuth redirect URL for the browser to follow.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<axum::response::Response, ApiError> {
    if body.provider.as_deref() == Some("google") {
        let Some(oauth) = &state.oauth else {
            return Err(ApiError::BadRequest(
                "Provider login is not configured".to_string(),
            ));
        };

        let redirect = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            oauth.authorize_url,
            urlencoding::encode(&oauth.client_id),
            urlencoding::encode(&oauth.redirect_uri),
            urlencoding::encode("openid email"),
        );
        return Ok(Json(serde_json::json!({ "redirect": redirect })).into_response());
    }

    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    };

    let user = state
        .db
        .users
        .verify_credentials(&email, &password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let token = state
        .db
        .users
        .create_session(user.id, Duration::hours(defaults::SESSION_TTL_HOURS))
        .await?;

    info!(user_id = %user.id, "Login successful");

    Ok((
        AppendHeaders([(header::SET_COOKIE, session_cookie(&token))]),
        Json(serde_json::json!({ "success": true })),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
}

/// GET /api/v1/auth/callback
///
/// OAuth code exchange. Browser-facing: failures redirect back to the login
/// page with an error message instead of returning JSON.
pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> axum::response::Response {
    let next = query.next.unwrap_or_else(|| "/dashboard".to_string());

    let login_error = |msg: &str| {
        Redirect::to(&format!(
            "{}/login?error={}",
            state.site_url,
            urlencoding::encode(msg)
        ))
        .into_response()
    };

    let Some(oauth) = &state.oauth else {
        return login_error("Provider login is not configured");
    };
    let Some(code) = query.code else {
        warn!("OAuth callback without code");
        return login_error("No code provided");
    };

    let client = reqwest::Client::new();

    let token: TokenResponse = match client
        .post(&oauth.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("client_id", oauth.client_id.as_str()),
            ("client_secret", oauth.client_secret.as_str()),
            ("redirect_uri", oauth.redirect_uri.as_str()),
        ])
        .send()
        .await
        .and_then(|r| r.error_for_status())
    {
        Ok(resp) => match resp.json().await {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, "OAuth token response parse failed");
                return login_error("Provider returned an unexpected response");
            }
        },
        Err(e) => {
            error!(error = %e, "OAuth code exchange failed");
            return login_error("Code exchange failed");
        }
    };

    let userinfo: UserInfo = match client
        .get(&oauth.userinfo_url)
        .bearer_auth(&token.access_token)
        .send()
        .await
        .and_then(|r| r.error_for_status())
    {
        Ok(resp) => match resp.json().await {
            Ok(info) => info,
            Err(e) => {
                error!(error = %e, "OAuth userinfo parse failed");
                return login_error("Provider returned an unexpected response");
            }
        },
        Err(e) => {
            error!(error = %e, "OAuth userinfo fetch failed");
            return login_error("Could not fetch account details");
        }
    };

    let Some(email) = userinfo.email else {
        return login_error("Provider did not return an email address");
    };

    let session = async {
        let user = state.db.users.upsert_oauth_account(&email).await?;
        state
            .db
            .users
            .create_session(user.id, Duration::hours(defaults::SESSION_TTL_HOURS))
            .await
    }
    .await;

    match session {
        Ok(session_token) => {
            info!("OAuth login successful, redirecting to {}", next);
            (
                AppendHeaders([(header::SET_COOKIE, session_cookie(&session_token))]),
                Redirect::to(&format!("{}{}", state.site_url, next)),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to establish OAuth session");
            login_error("Unexpected error")
        }
    }
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = session_token(&headers) {
        state.db.users.delete_session(&token).await?;
    }

    Ok((
        AppendHeaders([(header::SET_COOKIE, clear_session_cookie())]),
        Json(serde_json::json!({ "success": true })),
    ))
}

/// GET /api/v1/auth/user
pub async fn current_user(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    Json(user)
}
