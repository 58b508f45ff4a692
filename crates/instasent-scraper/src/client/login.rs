use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::header::{HeaderMap, SET_COOKIE};

use super::{check_status, InstagramClient};
use crate::error::ScraperError;
use crate::response::LoginResponse;

const LOGIN_PAGE_PATH: &str = "accounts/login/";
const LOGIN_AJAX_PATH: &str = "api/v1/web/accounts/login/ajax/";

impl InstagramClient {
    /// Logs the session in with a username and password.
    ///
    /// Primes the cookie store with a `GET` of the login page to obtain the
    /// `csrftoken` cookie, then posts the credentials to the web login
    /// endpoint. Single attempt; a rejected login leaves the session
    /// anonymous.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::LoginFailed`] if no CSRF token is issued or
    /// the credentials are rejected, and [`ScraperError::Http`] or a status
    /// error for transport failures.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ScraperError> {
        let page_url = self.endpoint(LOGIN_PAGE_PATH)?;
        let page = self
            .client
            .get(page_url.clone())
            .header("X-IG-App-ID", &self.app_id)
            .send()
            .await?;
        check_status(&page, &page_url)?;
        let csrf_token = csrf_token_from_headers(page.headers()).ok_or_else(|| {
            ScraperError::LoginFailed("login page did not set a csrftoken cookie".to_owned())
        })?;

        let login_url = self.endpoint(LOGIN_AJAX_PATH)?;
        let enc_password = browser_password(password, unix_timestamp());
        let form = [
            ("username", username),
            ("enc_password", enc_password.as_str()),
            ("queryParams", "{}"),
            ("optIntoOneTap", "false"),
        ];
        let response = self
            .client
            .post(login_url.clone())
            .header("X-CSRFToken", &csrf_token)
            .header("X-IG-App-ID", &self.app_id)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(reqwest::header::REFERER, page_url.as_str())
            .form(&form)
            .send()
            .await?;

        // Rejected credentials come back as 400 with a JSON body explaining why.
        let status = response.status();
        if !status.is_success() && status != reqwest::StatusCode::BAD_REQUEST {
            check_status(&response, &login_url)?;
        }
        let body = response.text().await?;
        let parsed: LoginResponse =
            serde_json::from_str(&body).map_err(|e| ScraperError::Deserialize {
                context: "login response".to_owned(),
                source: e,
            })?;

        if parsed.authenticated != Some(true) {
            return Err(ScraperError::LoginFailed(parsed.failure_reason()));
        }

        tracing::info!(username, "instagram login succeeded");
        self.session_user = Some(username.to_owned());
        Ok(())
    }
}

/// Plain-text password envelope accepted by the web login endpoint.
fn browser_password(password: &str, timestamp: u64) -> String {
    format!("#PWD_INSTAGRAM_BROWSER:0:{timestamp}:{password}")
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// Reads `csrftoken` from the response's `Set-Cookie` headers.
fn csrf_token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookie| {
            let pair = cookie.split(';').next()?.trim();
            let (name, value) = pair.split_once('=')?;
            (name == "csrftoken" && !value.is_empty()).then(|| value.to_owned())
        })
}
