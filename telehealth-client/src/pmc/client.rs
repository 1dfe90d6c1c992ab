use std::path::Path;

use futures_util::StreamExt;
use reqwest::{Client, Response};
use tokio::fs as tokio_fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use crate::common::PmcId;
use crate::config::ClientConfig;
use crate::error::{Result, TelehealthError};
use crate::http::RequestContext;
use crate::pdf::PDF_MAGIC;
use crate::pmc::oa::{PdfLink, parse_oa_response};
use crate::rate_limit::RateLimiter;

/// Client for the PMC Open Access service and PDF downloads
#[derive(Clone)]
pub struct PmcClient {
    client: Client,
    oa_base_url: String,
    rate_limiter: RateLimiter,
    config: ClientConfig,
}

impl PmcClient {
    /// Create a new PMC client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::new())
    }

    /// Create a new PMC client with custom configuration
    ///
    /// # Example
    ///
    /// ```
    /// use telehealth_client::{ClientConfig, PmcClient};
    ///
    /// let config = ClientConfig::new().with_email("researcher@university.edu");
    /// let client = PmcClient::with_config(config)?;
    /// # Ok::<(), telehealth_client::TelehealthError>(())
    /// ```
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let rate_limiter = config.create_rate_limiter();
        let oa_base_url = config.effective_oa_base_url().to_string();

        let client = Client::builder()
            .user_agent(config.effective_user_agent())
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            oa_base_url,
            rate_limiter,
            config,
        })
    }

    /// Share a rate limiter with another client talking to NCBI
    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// Look up the open-access PDF of a PMC article
    ///
    /// Returns `None` when the article is outside the OA subset or has no
    /// PDF package.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use telehealth_client::PmcClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = PmcClient::new()?;
    ///     if let Some(link) = client.find_pdf_link("PMC7906746").await? {
    ///         client.download_pdf(&link.url, "articles/33515491.pdf").await?;
    ///     }
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self), fields(pmcid = %pmcid))]
    pub async fn find_pdf_link(&self, pmcid: &str) -> Result<Option<PdfLink>> {
        let pmc_id = PmcId::parse(pmcid)?;

        let mut params = vec![("id".to_string(), pmc_id.to_string())];
        params.extend(self.config.build_api_params());

        debug!("Making OA API request");
        let response = self
            .request_context()
            .get(&self.oa_base_url, &params, "PMC OA request")
            .await?;
        let xml = response.text().await?;

        parse_oa_response(&xml, &pmc_id)
    }

    /// Stream a PDF to `dest`
    ///
    /// Parent directories are created. The body must start with the `%PDF-`
    /// signature; otherwise the partial file is removed and
    /// [`TelehealthError::InvalidPdf`] is returned. A failed transfer also
    /// removes the partial file.
    ///
    /// Returns the number of bytes written.
    #[instrument(skip(self, dest), fields(url = %url, dest = %dest.as_ref().display()))]
    pub async fn download_pdf<P: AsRef<Path>>(&self, url: &str, dest: P) -> Result<u64> {
        let dest = dest.as_ref();

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio_fs::create_dir_all(parent)
                .await
                .map_err(|e| TelehealthError::IoError {
                    message: format!("Failed to create output directory: {}", e),
                })?;
        }

        let response = self
            .request_context()
            .get(url, &[], "PDF download")
            .await?;

        match stream_to_file(response, dest).await {
            Ok(bytes) => {
                info!(bytes, "PDF downloaded");
                Ok(bytes)
            }
            Err(e) => {
                if let Err(remove_err) = tokio_fs::remove_file(dest).await {
                    debug!(error = %remove_err, "No partial file to remove");
                }
                Err(e)
            }
        }
    }

    fn request_context(&self) -> RequestContext<'_> {
        RequestContext {
            client: &self.client,
            rate_limiter: &self.rate_limiter,
            retry_config: &self.config.retry_config,
        }
    }
}

async fn stream_to_file(response: Response, dest: &Path) -> Result<u64> {
    let mut file = tokio_fs::File::create(dest)
        .await
        .map_err(|e| TelehealthError::IoError {
            message: format!("Failed to create {}: {}", dest.display(), e),
        })?;

    let mut header: Vec<u8> = Vec::with_capacity(PDF_MAGIC.len());
    let mut written: u64 = 0;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(TelehealthError::from)?;

        if header.len() < PDF_MAGIC.len() {
            let needed = PDF_MAGIC.len() - header.len();
            header.extend(chunk.iter().take(needed));
            if header.len() == PDF_MAGIC.len() && header.as_slice() != PDF_MAGIC {
                return Err(TelehealthError::InvalidPdf {
                    path: dest.display().to_string(),
                });
            }
        }

        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;

    if header.as_slice() != PDF_MAGIC {
        return Err(TelehealthError::InvalidPdf {
            path: dest.display().to_string(),
        });
    }

    Ok(written)
}
