use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ESearchResult {
    pub esearchresult: ESearchData,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ESearchData {
    #[serde(default, rename = "ERROR")]
    pub error: Option<String>,
    #[serde(default)]
    pub count: Option<String>,
    #[serde(default)]
    pub retmax: Option<String>,
    #[serde(default)]
    pub retstart: Option<String>,
    #[serde(default)]
    pub idlist: Vec<String>,
    /// How PubMed interpreted and translated the search query
    #[serde(default)]
    pub querytranslation: Option<String>,
}

// ELink API response structures
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ELinkResponse {
    #[serde(rename = "linksets", default)]
    pub linksets: Vec<ELinkSet>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ELinkSet {
    #[serde(rename = "dbfrom", default)]
    pub db_from: String,
    #[serde(rename = "ids", default)]
    pub ids: Vec<String>,
    #[serde(rename = "linksetdbs", default)]
    pub linkset_dbs: Option<Vec<ELinkSetDb>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ELinkSetDb {
    #[serde(rename = "dbto")]
    pub db_to: String,
    #[serde(rename = "linkname")]
    pub link_name: String,
    #[serde(rename = "links", default)]
    pub links: Vec<String>,
}
