//! Rate limited GET requests with retry, shared by the NCBI clients

use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};

use crate::error::{Result, TelehealthError};
use crate::rate_limit::RateLimiter;
use crate::retry::{RetryConfig, with_retry};

/// 5xx and 429 responses are worth another attempt
pub(crate) fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

pub(crate) fn status_error(status: StatusCode) -> TelehealthError {
    TelehealthError::ApiError {
        status: status.as_u16(),
        message: status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    }
}

/// Everything needed to issue a polite request to NCBI
pub(crate) struct RequestContext<'a> {
    pub client: &'a Client,
    pub rate_limiter: &'a RateLimiter,
    pub retry_config: &'a RetryConfig,
}

impl RequestContext<'_> {
    /// GET `url` with `params` appended as query parameters
    ///
    /// Every attempt waits for a rate limiter token. Transient statuses are
    /// retried; any other non-success status becomes an `ApiError`.
    pub(crate) async fn get(
        &self,
        url: &str,
        params: &[(String, String)],
        operation: &str,
    ) -> Result<Response> {
        let response = with_retry(
            || async {
                self.rate_limiter.acquire().await?;
                debug!(url, "Sending request");

                let response = self
                    .client
                    .get(url)
                    .query(params)
                    .send()
                    .await
                    .map_err(TelehealthError::from)?;

                if is_transient_status(response.status()) {
                    return Err(status_error(response.status()));
                }

                Ok(response)
            },
            self.retry_config,
            operation,
        )
        .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), operation, "Request failed");
            return Err(status_error(response.status()));
        }

        Ok(response)
    }
}
