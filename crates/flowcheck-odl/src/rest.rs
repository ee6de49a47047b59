//! The HTTP transport seam.

use async_trait::async_trait;
use flowcheck_topology::ControllerInfo;
use std::time::Duration;
use tracing::debug;

/// Per-request timeout. The orchestration above imposes no deadline
/// of its own.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Issues a GET and returns the body, or nothing.
///
/// Transport failures and non-200 statuses both collapse to `None`;
/// callers treat a missing body as "this source has no data", never
/// as an error.
#[async_trait]
pub trait RestFetch: Send + Sync {
    async fn get(&self, url: &str) -> Option<String>;
}

/// [`RestFetch`] over reqwest with the controller's basic-auth
/// credentials. Controllers commonly run self-signed TLS, so
/// certificate validation is off.
pub struct HttpRestClient {
    http: reqwest::Client,
    user: String,
    password: String,
}

impl HttpRestClient {
    pub fn new(controller: &ControllerInfo) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(HttpRestClient {
            http,
            user: controller.user.clone(),
            password: controller.password.clone(),
        })
    }
}

#[async_trait]
impl RestFetch for HttpRestClient {
    async fn get(&self, url: &str) -> Option<String> {
        let response = match self
            .http
            .get(url)
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                debug!(url, error = %err, "request failed");
                return None;
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            debug!(url, status = %response.status(), "data not found");
            return None;
        }

        match response.text().await {
            Ok(body) => Some(body),
            Err(err) => {
                debug!(url, error = %err, "failed to read response body");
                None
            }
        }
    }
}
