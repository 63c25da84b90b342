//! Minimal shape of a `GetPublishedFileDetails` JSON response.

use serde::Deserialize;

/// Top-level wrapper: `{ "response": { ... } }`.
#[derive(Debug, Deserialize)]
pub struct CatalogEnvelope {
    #[serde(default)]
    pub response: Option<CatalogResponse>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub publishedfiledetails: Option<Vec<PublishedFileDetails>>,
}

#[derive(Debug, Deserialize)]
pub struct PublishedFileDetails {
    #[serde(default)]
    pub publishedfileid: Option<String>,
    /// Catalog result code; 1 means found.
    #[serde(default)]
    pub result: Option<i64>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Reported as a string by some endpoints and as a number by others.
    #[serde(default)]
    pub file_size: Option<serde_json::Value>,
}

/// Pulls `response.publishedfiledetails[0]` out of a response body.
pub fn first_details(body: &[u8]) -> Result<PublishedFileDetails, String> {
    let envelope: CatalogEnvelope =
        serde_json::from_slice(body).map_err(|e| format!("invalid JSON: {}", e))?;
    envelope
        .response
        .ok_or_else(|| "no response object".to_string())?
        .publishedfiledetails
        .ok_or_else(|| "no publishedfiledetails".to_string())?
        .into_iter()
        .next()
        .ok_or_else(|| "publishedfiledetails is empty".to_string())
}
