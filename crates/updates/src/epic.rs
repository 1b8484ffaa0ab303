//! Epic Games catalog client.
//!
//! Async HTTP client using `reqwest` against the public GraphQL endpoint.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_EPIC_GRAPHQL_URL;
use crate::error::UpdateError;

const CATALOG_OFFER_QUERY: &str = r#"query catalogQuery($namespace: String!, $itemId: String!) {
    Catalog {
        catalogOffer(namespace: $namespace, id: $itemId) {
            releaseDate
            expiryDate
        }
    }
}"#;

/// Release window of a catalog offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOffer {
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: OfferVariables<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OfferVariables<'a> {
    namespace: &'a str,
    item_id: &'a str,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<CatalogData>,
}

#[derive(Deserialize)]
struct CatalogData {
    #[serde(rename = "Catalog", default)]
    catalog: Option<Catalog>,
}

#[derive(Deserialize)]
struct Catalog {
    #[serde(rename = "catalogOffer", default)]
    catalog_offer: Option<CatalogOffer>,
}

/// Epic catalog GraphQL client.
#[derive(Clone)]
pub struct EpicCatalogClient {
    http: reqwest::Client,
    endpoint: String,
}

impl EpicCatalogClient {
    /// Creates a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, UpdateError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: DEFAULT_EPIC_GRAPHQL_URL.to_string(),
        })
    }

    /// Points the client at another GraphQL endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetches the release window for one catalog offer.
    ///
    /// Returns `Ok(None)` when the response carries no offer. Any status
    /// other than 200 is an error.
    pub async fn fetch_catalog_offer(
        &self,
        namespace: &str,
        item_id: &str,
    ) -> Result<Option<CatalogOffer>, UpdateError> {
        let request = GraphQlRequest {
            query: CATALOG_OFFER_QUERY,
            variables: OfferVariables { namespace, item_id },
        };

        let resp = self.http.post(&self.endpoint).json(&request).send().await?;
        let status = resp.status();

        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(UpdateError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await?;
        let parsed: GraphQlResponse = serde_json::from_slice(&body)?;

        Ok(parsed
            .data
            .and_then(|d| d.catalog)
            .and_then(|c| c.catalog_offer))
    }
}
