//! Catalog lookup: published file id → download descriptor.
//!
//! The coordinator only depends on [`CatalogLookup`]; [`CatalogClient`] is the libcurl
//! implementation that POSTs a form to a `GetPublishedFileDetails`-style endpoint.

mod parse;

pub use parse::{CatalogEnvelope, CatalogResponse, PublishedFileDetails};

use crate::error::FetchError;
use std::time::Duration;

/// What the catalog says about one published file. Immutable for one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileDescriptor {
    /// Remote-relative path with forward slashes, e.g. `SubDir/arena_map.gbx`.
    pub filename: String,
    /// Absolute download URL.
    pub file_url: String,
}

/// Seam between the fetch coordinator and the remote catalog.
pub trait CatalogLookup {
    fn lookup(&self, id: &str) -> Result<RemoteFileDescriptor, FetchError>;
}

/// libcurl-backed catalog client.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    endpoint: String,
    connect_timeout: Duration,
}

impl CatalogClient {
    pub fn new(endpoint: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post(&self, body: &str) -> Result<Vec<u8>, FetchError> {
        let net = |e: curl::Error| FetchError::network(&self.endpoint, e);
        let mut response = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&self.endpoint).map_err(net)?;
        easy.post(true).map_err(net)?;
        easy.post_fields_copy(body.as_bytes()).map_err(net)?;
        easy.follow_location(true).map_err(net)?;
        easy.connect_timeout(self.connect_timeout).map_err(net)?;

        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    response.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(net)?;
            transfer.perform().map_err(net)?;
        }

        let code = easy.response_code().map_err(net)?;
        if !(200..300).contains(&code) {
            return Err(FetchError::network(
                &self.endpoint,
                format!("POST returned HTTP {}", code),
            ));
        }
        Ok(response)
    }
}

impl CatalogLookup for CatalogClient {
    fn lookup(&self, id: &str) -> Result<RemoteFileDescriptor, FetchError> {
        let body = form_body(id);
        tracing::debug!("sending catalog request to {} with body {}", self.endpoint, body);

        let response = self.post(&body)?;
        let details = parse::first_details(&response).map_err(|reason| FetchError::Lookup {
            id: id.to_string(),
            reason,
        })?;
        tracing::debug!(
            title = details.title.as_deref().unwrap_or("-"),
            result = ?details.result,
            "catalog details received"
        );
        descriptor_from(id, details)
    }
}

/// Form body for a single-item details request.
pub fn form_body(id: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("format", "json")
        .append_pair("itemcount", "1")
        .append_pair("publishedfileids[0]", id)
        .finish()
}

/// Keeps only details that can actually be downloaded.
pub fn descriptor_from(
    id: &str,
    details: PublishedFileDetails,
) -> Result<RemoteFileDescriptor, FetchError> {
    let missing = |field: &str| FetchError::Lookup {
        id: id.to_string(),
        reason: format!("details have no {}", field),
    };
    let filename = details
        .filename
        .filter(|s| !s.is_empty())
        .ok_or_else(|| missing("filename"))?;
    let file_url = details
        .file_url
        .filter(|s| !s.is_empty())
        .ok_or_else(|| missing("file_url"))?;
    Ok(RemoteFileDescriptor { filename, file_url })
}
