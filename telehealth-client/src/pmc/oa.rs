//! PMC Open Access web service responses
//!
//! The OA service lists the downloadable packages of an article in the OA
//! subset. Records may carry several `<link>` elements (`tgz`, `pdf`); only
//! the PDF link is of interest here. Articles outside the OA subset get an
//! `<error>` element instead of records.

use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::debug;

use crate::common::PmcId;
use crate::error::{Result, TelehealthError};

const NCBI_FTP_PREFIX: &str = "ftp://ftp.ncbi.nlm.nih.gov/";
const NCBI_FTP_HTTPS_PREFIX: &str = "https://ftp.ncbi.nlm.nih.gov/";

#[derive(Debug, Deserialize)]
#[serde(rename = "OA")]
struct OaResponse {
    #[serde(rename = "error")]
    error: Option<OaError>,
    #[serde(rename = "records")]
    records: Option<OaRecords>,
}

#[derive(Debug, Deserialize)]
struct OaError {
    #[serde(rename = "@code")]
    code: Option<String>,
    #[serde(rename = "$text", default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct OaRecords {
    #[serde(rename = "record", default)]
    record: Vec<OaRecord>,
}

#[derive(Debug, Deserialize)]
struct OaRecord {
    #[serde(rename = "@license")]
    license: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<OaLink>,
}

#[derive(Debug, Deserialize)]
struct OaLink {
    #[serde(rename = "@format")]
    format: Option<String>,
    #[serde(rename = "@href")]
    href: Option<String>,
}

/// Downloadable PDF of an open-access article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfLink {
    pub pmcid: PmcId,
    /// HTTPS URL of the PDF
    pub url: String,
    pub license: Option<String>,
}

/// Rewrite NCBI FTP links to the equivalent HTTPS mirror
///
/// ```
/// use telehealth_client::pmc::rewrite_ftp_link;
///
/// assert_eq!(
///     rewrite_ftp_link("ftp://ftp.ncbi.nlm.nih.gov/pub/pmc/a/b/main.pdf"),
///     "https://ftp.ncbi.nlm.nih.gov/pub/pmc/a/b/main.pdf"
/// );
/// ```
pub fn rewrite_ftp_link(href: &str) -> String {
    match href.strip_prefix(NCBI_FTP_PREFIX) {
        Some(rest) => format!("{NCBI_FTP_HTTPS_PREFIX}{rest}"),
        None => href.to_string(),
    }
}

/// Parse an OA service response and pick the PDF link
///
/// Returns `Ok(None)` when the article is not in the OA subset or has no
/// PDF package.
pub fn parse_oa_response(xml: &str, pmcid: &PmcId) -> Result<Option<PdfLink>> {
    let oa_response: OaResponse = from_str(xml).map_err(|e| {
        debug!(pmcid = %pmcid, error = %e, "Failed to parse OA API response");
        TelehealthError::XmlError(format!("Failed to parse OA API response: {e}"))
    })?;

    if let Some(error) = oa_response.error {
        debug!(
            pmcid = %pmcid,
            code = error.code.as_deref().unwrap_or("unknown"),
            message = %error.message,
            "Article not in OA subset"
        );
        return Ok(None);
    }

    let link = oa_response
        .records
        .into_iter()
        .flat_map(|records| records.record)
        .find_map(|record| {
            let license = record.license;
            record
                .links
                .into_iter()
                .find(|link| link.format.as_deref() == Some("pdf"))
                .and_then(|link| link.href)
                .map(|href| PdfLink {
                    pmcid: *pmcid,
                    url: rewrite_ftp_link(&href),
                    license,
                })
        });

    if link.is_none() {
        debug!(pmcid = %pmcid, "OA record has no PDF link");
    }

    Ok(link)
}
