//! Shared fixtures and helpers for the integration suites
#![allow(dead_code)]

use std::time::Duration;

use telehealth_client::{ClientConfig, RetryConfig};
use wiremock::MockServer;

/// EFetch answer with two telehealth articles
///
/// The first one carries a PMC ID in its ArticleIdList, the second one
/// does not.
pub const EFETCH_TWO_ARTICLES: &str = r#"<?xml version="1.0" ?>
<PubmedArticleSet>
    <PubmedArticle>
        <MedlineCitation Status="MEDLINE" Owner="NLM">
            <PMID Version="1">33515491</PMID>
            <Article PubModel="Electronic">
                <Journal>
                    <JournalIssue CitedMedium="Internet">
                        <Volume>23</Volume>
                        <Issue>3</Issue>
                        <PubDate><Year>2021</Year><Month>Mar</Month><Day>1</Day></PubDate>
                    </JournalIssue>
                    <Title>Journal of medical Internet research</Title>
                </Journal>
                <ArticleTitle>Telehealth use among older adults during the <i>COVID-19</i> pandemic.</ArticleTitle>
                <ELocationID EIdType="doi" ValidYN="Y">10.2196/24531</ELocationID>
                <Abstract>
                    <AbstractText Label="BACKGROUND">Virtual care expanded rapidly in 2020.</AbstractText>
                    <AbstractText Label="RESULTS">Telehealth visits accounted for 45% of all encounters. The telemedicine adoption rate was 3.2 per 1000 patients.</AbstractText>
                </Abstract>
                <AuthorList CompleteYN="Y">
                    <Author ValidYN="Y"><LastName>Smith</LastName><ForeName>Jane</ForeName><Initials>J</Initials></Author>
                    <Author ValidYN="Y"><LastName>Lee</LastName><ForeName>Min</ForeName><Initials>M</Initials></Author>
                </AuthorList>
                <PublicationTypeList>
                    <PublicationType UI="D016428">Journal Article</PublicationType>
                </PublicationTypeList>
            </Article>
            <MeshHeadingList>
                <MeshHeading><DescriptorName UI="D017216" MajorTopicYN="Y">Telemedicine</DescriptorName></MeshHeading>
                <MeshHeading><DescriptorName UI="D057286" MajorTopicYN="N">Electronic Health Records</DescriptorName></MeshHeading>
            </MeshHeadingList>
        </MedlineCitation>
        <PubmedData>
            <ArticleIdList>
                <ArticleId IdType="pubmed">33515491</ArticleId>
                <ArticleId IdType="doi">10.2196/24531</ArticleId>
                <ArticleId IdType="pmc">PMC7906746</ArticleId>
            </ArticleIdList>
        </PubmedData>
    </PubmedArticle>
    <PubmedArticle>
        <MedlineCitation Status="MEDLINE" Owner="NLM">
            <PMID Version="1">32511443</PMID>
            <Article PubModel="Print">
                <Journal>
                    <JournalIssue CitedMedium="Print">
                        <PubDate><MedlineDate>2020 Nov-Dec</MedlineDate></PubDate>
                    </JournalIssue>
                    <Title>Telemedicine journal and e-health</Title>
                </Journal>
                <ArticleTitle>Video visit volume in primary care clinics.</ArticleTitle>
                <Abstract>
                    <AbstractText>We conducted a cross-sectional survey of 40 clinics. The number of video visits per clinic grew each month.</AbstractText>
                </Abstract>
                <AuthorList CompleteYN="Y">
                    <Author ValidYN="Y"><CollectiveName>Primary Care Telehealth Collaborative</CollectiveName></Author>
                </AuthorList>
                <PublicationTypeList>
                    <PublicationType UI="D016428">Journal Article</PublicationType>
                </PublicationTypeList>
            </Article>
        </MedlineCitation>
        <PubmedData>
            <ArticleIdList>
                <ArticleId IdType="pubmed">32511443</ArticleId>
            </ArticleIdList>
        </PubmedData>
    </PubmedArticle>
</PubmedArticleSet>"#;

/// ESearch JSON answer listing `ids`
pub fn esearch_response(ids: &[&str]) -> String {
    serde_json::json!({
        "header": {"type": "esearch", "version": "0.3"},
        "esearchresult": {
            "count": ids.len().to_string(),
            "retmax": ids.len().to_string(),
            "retstart": "0",
            "idlist": ids,
            "querytranslation": "telehealth[All Fields]"
        }
    })
    .to_string()
}

/// ELink JSON answer linking `pmid` to `pmc_links`
pub fn elink_response(pmid: &str, pmc_links: &[&str]) -> String {
    if pmc_links.is_empty() {
        return serde_json::json!({
            "header": {"type": "elink", "version": "0.3"},
            "linksets": [{"dbfrom": "pubmed", "ids": [pmid]}]
        })
        .to_string();
    }

    serde_json::json!({
        "header": {"type": "elink", "version": "0.3"},
        "linksets": [{
            "dbfrom": "pubmed",
            "ids": [pmid],
            "linksetdbs": [{"dbto": "pmc", "linkname": "pubmed_pmc", "links": pmc_links}]
        }]
    })
    .to_string()
}

/// OA service answer with a PDF link to `pdf_href`
pub fn oa_pdf_response(pmcid: &str, pdf_href: &str) -> String {
    format!(
        r#"<OA><responseDate>2026-01-02 10:45:39</responseDate><request id="{pmcid}">https://www.ncbi.nlm.nih.gov/pmc/utils/oa/oa.fcgi?id={pmcid}</request><records returned-count="1" total-count="1"><record id="{pmcid}" citation="J Med Internet Res. 2021; 23(3):e24531" license="CC BY" retracted="no"><link format="tgz" updated="2022-12-16 07:10:15" href="ftp://ftp.ncbi.nlm.nih.gov/pub/pmc/oa_package/f1/69/{pmcid}.tar.gz" /><link format="pdf" updated="2022-12-16 07:10:15" href="{pdf_href}" /></record></records></OA>"#
    )
}

/// OA service answer for an article outside the OA subset
pub fn oa_not_available_response(pmcid: &str) -> String {
    format!(
        r#"<OA><responseDate>2026-01-02 10:45:39</responseDate><request id="{pmcid}">https://www.ncbi.nlm.nih.gov/pmc/utils/oa/oa.fcgi?id={pmcid}</request><error code="idIsNotOpenAccess">identifier '{pmcid}' is not Open Access</error></OA>"#
    )
}

/// A one-page PDF whose text layer holds `lines`
///
/// Lines must not contain parentheses or backslashes.
pub fn pdf_with_text(lines: &[&str]) -> Vec<u8> {
    let mut content = String::from("BT\n/F1 12 Tf\n14 TL\n72 720 Td\n");
    for line in lines {
        content.push_str(&format!("({line}) Tj\nT*\n"));
    }
    content.push_str("ET\n");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>".to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        format!("<< /Length {} >>\nstream\n{}endstream", content.len(), content),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, object).as_bytes());
    }

    let xref_offset = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );

    pdf
}

/// Sentences of a short telehealth study used as PDF text
pub const STUDY_LINES: &[&str] = &[
    "Telehealth Utilization in Rural Primary Care Clinics",
    "We conducted a retrospective cohort study using electronic health record data.",
    "A total of 1,250 patients were included in the analysis.",
    "Telehealth visits accounted for 45% of all encounters during the study period.",
    "The study period spanned 18 months.",
];

/// Retry policy that keeps mocked tests fast
pub fn fast_retry_config() -> RetryConfig {
    RetryConfig::new()
        .with_max_retries(2)
        .with_initial_delay(Duration::from_millis(10))
        .with_max_delay(Duration::from_millis(50))
        .without_jitter()
}

/// Client configuration pointing every NCBI endpoint at `mock_server`
pub fn mock_config(mock_server: &MockServer) -> ClientConfig {
    ClientConfig::new()
        .with_base_url(mock_server.uri())
        .with_oa_base_url(format!("{}/oa.fcgi", mock_server.uri()))
        .with_rate_limit(100.0) // High rate limit for tests
        .with_retry_config(fast_retry_config())
}

pub mod integration_test_utils {
    use telehealth_client::{ClientConfig, PubMedClient};

    /// PMIDs of well-known open-access telehealth articles
    pub const TEST_PMIDS_STR: &[&str] = &["33515491", "32511443"];

    pub const TEST_SEARCH_QUERIES: &[&str] = &[
        "telehealth utilization measures",
        "telemedicine adoption rate",
        "video visit volume primary care",
    ];

    /// Real API tests run only with `TELEHEALTH_REAL_API_TESTS` set
    pub fn should_run_real_api_tests() -> bool {
        std::env::var("TELEHEALTH_REAL_API_TESTS").is_ok()
    }

    pub fn create_test_config() -> ClientConfig {
        let mut config = ClientConfig::new()
            .with_tool("telehealth-client-tests")
            .with_email("telehealth-tests@example.org");

        if let Ok(api_key) = std::env::var("NCBI_API_KEY") {
            config = config.with_api_key(api_key);
        }

        config
    }

    pub fn create_test_pubmed_client() -> PubMedClient {
        PubMedClient::with_config(create_test_config()).expect("client should build")
    }
}
