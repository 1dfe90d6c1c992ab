//! ELink API operations for PubMed to PMC cross-referencing

use crate::common::{PmcId, PubMedId};
use crate::error::Result;
use crate::pubmed::responses::ELinkResponse;
use tracing::{debug, info, instrument};

use super::{PubMedClient, param};

const PUBMED_PMC_LINK: &str = "pubmed_pmc";

impl PubMedClient {
    /// Look up the PubMed Central record of an article
    ///
    /// Returns the PMC ID (e.g. `PMC7092803`) when PubMed links the article
    /// to PMC, `None` otherwise.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use telehealth_client::PubMedClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = PubMedClient::new()?;
    ///     if let Some(pmcid) = client.check_pmc_availability("33515491").await? {
    ///         println!("Full text at {}", pmcid);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self), fields(pmid = %pmid))]
    pub async fn check_pmc_availability(&self, pmid: &str) -> Result<Option<PmcId>> {
        let pmid = PubMedId::parse(pmid)?;

        let elink_response = self.elink_request(pmid.as_u32(), PUBMED_PMC_LINK).await?;

        let pmc_id = elink_response
            .linksets
            .into_iter()
            .filter_map(|linkset| linkset.linkset_dbs)
            .flatten()
            .filter(|db| db.link_name == PUBMED_PMC_LINK && db.db_to == "pmc")
            .flat_map(|db| db.links)
            .find_map(|link| PmcId::parse(&link).ok());

        match &pmc_id {
            Some(pmcid) => info!(pmcid = %pmcid, "PMC record found"),
            None => debug!("No PMC record linked"),
        }

        Ok(pmc_id)
    }

    async fn elink_request(&self, pmid: u32, link_name: &str) -> Result<ELinkResponse> {
        let params = vec![
            param("dbfrom", "pubmed"),
            param("db", "pmc"),
            param("id", pmid),
            param("linkname", link_name),
            param("retmode", "json"),
        ];

        debug!("Making ELink API request");
        let response = self.eutils_get("elink.fcgi", params).await?;

        let elink_response: ELinkResponse = response.json().await?;
        Ok(elink_response)
    }
}
