mod elink;

use crate::common::PubMedId;
use crate::config::ClientConfig;
use crate::error::{Result, TelehealthError};
use crate::http::RequestContext;
use crate::pubmed::models::PubMedArticle;
use crate::pubmed::parser::parse_articles_from_xml;
use crate::pubmed::query::SortOrder;
use crate::pubmed::responses::ESearchResult;
use crate::rate_limit::RateLimiter;
use reqwest::{Client, Response};
use tracing::{debug, info, instrument, warn};

/// PubMed limits: retstart cannot exceed 9998 and retmax is capped at 9999
pub const MAX_RETRIEVABLE: usize = 9999;

/// NCBI recommends batches of up to 200 IDs per EFetch request
const BATCH_SIZE: usize = 200;

/// Client for the PubMed E-utilities (ESearch, EFetch, ELink)
#[derive(Clone)]
pub struct PubMedClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
    config: ClientConfig,
}

impl PubMedClient {
    /// Create a new PubMed client with default configuration
    ///
    /// Uses default NCBI rate limiting (3 requests/second) and no API key.
    ///
    /// # Errors
    ///
    /// Fails only if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::new())
    }

    /// Create a new PubMed client with custom configuration
    ///
    /// # Example
    ///
    /// ```
    /// use telehealth_client::{ClientConfig, PubMedClient};
    ///
    /// let config = ClientConfig::new()
    ///     .with_api_key("your_api_key_here")
    ///     .with_email("researcher@university.edu");
    ///
    /// let client = PubMedClient::with_config(config)?;
    /// # Ok::<(), telehealth_client::TelehealthError>(())
    /// ```
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let rate_limiter = config.create_rate_limiter();
        let base_url = config.effective_base_url().to_string();

        let client = Client::builder()
            .user_agent(config.effective_user_agent())
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            rate_limiter,
            config,
        })
    }

    /// Limiter shared by every request of this client
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Search PubMed and return the matching PMIDs
    ///
    /// An empty or whitespace-only query returns an empty list without
    /// contacting the API.
    ///
    /// # Errors
    ///
    /// * `TelehealthError::SearchLimitExceeded` - If `limit` exceeds 9,999
    /// * `TelehealthError::ApiError` - If NCBI reports an error for the query
    /// * `TelehealthError::RequestError` - If the HTTP request fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// use telehealth_client::PubMedClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = PubMedClient::new()?;
    ///     let pmids = client
    ///         .search_articles("telehealth utilization measures", 20, None)
    ///         .await?;
    ///     println!("Found {} articles", pmids.len());
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self, sort), fields(query = %query, limit = limit))]
    pub async fn search_articles(
        &self,
        query: &str,
        limit: usize,
        sort: Option<&SortOrder>,
    ) -> Result<Vec<String>> {
        if limit > MAX_RETRIEVABLE {
            return Err(TelehealthError::SearchLimitExceeded {
                requested: limit,
                maximum: MAX_RETRIEVABLE,
            });
        }

        if query.trim().is_empty() {
            debug!("Empty query provided, returning empty results");
            return Ok(Vec::new());
        }

        let mut params = vec![
            param("db", "pubmed"),
            param("term", query),
            param("retmax", limit),
            param("retstart", 0),
            param("retmode", "json"),
        ];
        if let Some(sort_order) = sort {
            params.push(param("sort", sort_order.as_api_param()));
        }

        debug!("Making ESearch API request");
        let response = self.eutils_get("esearch.fcgi", params).await?;
        let search_result: ESearchResult = response.json().await?;

        // NCBI sometimes returns 200 OK with an ERROR field
        if let Some(error_msg) = &search_result.esearchresult.error {
            return Err(TelehealthError::ApiError {
                status: 200,
                message: format!("NCBI ESearch API error: {}", error_msg),
            });
        }

        let total_count: usize = search_result
            .esearchresult
            .count
            .as_ref()
            .and_then(|c| c.parse().ok())
            .unwrap_or(0);

        info!(
            total_count,
            returned = search_result.esearchresult.idlist.len(),
            "ESearch completed"
        );

        Ok(search_result.esearchresult.idlist)
    }

    /// Fetch article metadata for the given PMIDs
    ///
    /// All PMIDs are validated before any request is made. IDs are sent in
    /// batches of up to 200; records that fail conversion are skipped and
    /// logged.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use telehealth_client::PubMedClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = PubMedClient::new()?;
    ///     let articles = client.fetch_articles(&["33515491", "32511443"]).await?;
    ///     for article in &articles {
    ///         println!("{}: {}", article.pmid, article.title);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self), fields(pmids_count = pmids.len()))]
    pub async fn fetch_articles(&self, pmids: &[&str]) -> Result<Vec<PubMedArticle>> {
        if pmids.is_empty() {
            return Ok(Vec::new());
        }

        let validated: Vec<u32> = pmids
            .iter()
            .map(|pmid| PubMedId::parse(pmid).map(|p| p.as_u32()))
            .collect::<Result<Vec<_>>>()?;

        let mut all_articles = Vec::with_capacity(pmids.len());

        for chunk in validated.chunks(BATCH_SIZE) {
            let id_list: String = chunk
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");

            let params = vec![
                param("db", "pubmed"),
                param("id", id_list),
                param("retmode", "xml"),
                param("rettype", "abstract"),
            ];

            debug!(batch_size = chunk.len(), "Making batch EFetch API request");
            let response = self.eutils_get("efetch.fcgi", params).await?;
            let xml_text = response.text().await?;

            if xml_text.trim().is_empty() {
                warn!(batch_size = chunk.len(), "EFetch returned an empty body");
                continue;
            }

            let articles = parse_articles_from_xml(&xml_text)?;
            info!(
                requested = chunk.len(),
                parsed = articles.len(),
                "Batch fetch completed"
            );
            all_articles.extend(articles);
        }

        Ok(all_articles)
    }

    /// Search and fetch article metadata in one call
    pub async fn search_and_fetch(
        &self,
        query: &str,
        limit: usize,
        sort: Option<&SortOrder>,
    ) -> Result<Vec<PubMedArticle>> {
        let pmids = self.search_articles(query, limit, sort).await?;

        let pmid_refs: Vec<&str> = pmids.iter().map(|s| s.as_str()).collect();
        self.fetch_articles(&pmid_refs).await
    }

    /// GET an E-utilities endpoint
    ///
    /// The API parameters (api_key, email, tool) are appended to `params`.
    pub(crate) async fn eutils_get(
        &self,
        endpoint: &str,
        mut params: Vec<(String, String)>,
    ) -> Result<Response> {
        params.extend(self.config.build_api_params());
        let url = format!("{}/{}", self.base_url, endpoint);

        RequestContext {
            client: &self.client,
            rate_limiter: &self.rate_limiter,
            retry_config: &self.config.retry_config,
        }
        .get(&url, &params, "NCBI API request")
        .await
    }
}

fn param<V: ToString>(key: &str, value: V) -> (String, String) {
    (key.to_string(), value.to_string())
}
