//! Read-only Firestore REST client for a restaurant's `reviews` sub-collection.

use std::collections::HashMap;

use reqwest::header::ACCEPT;

use super::types::{ListDocumentsResponse, ReviewDocument};
use super::StoreError;
use crate::config::StoreConfig;

/// Guard against a store that keeps handing out page tokens.
const MAX_PAGES: usize = 100;

/// Source of review documents (allows substituting the store in tests).
pub trait ReviewSource {
    /// All review documents for a restaurant. An empty list means "no reviews".
    fn fetch_reviews(&self, restaurant_id: &str) -> Result<Vec<ReviewDocument>, StoreError>;
}

/// Firestore REST reader.
pub struct FirestoreClient {
    config: StoreConfig,
    client: reqwest::blocking::Client,
}

impl FirestoreClient {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| StoreError::HttpClient(e.to_string()))?;
        Ok(Self { config, client })
    }

    /// Collection URL for one restaurant's reviews.
    pub fn reviews_url(&self, restaurant_id: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/restaurants/{}/reviews",
            self.config.base_url.trim_end_matches('/'),
            self.config.project_id,
            restaurant_id
        )
    }

    fn fetch_page(
        &self,
        url: &str,
        page_token: Option<&str>,
    ) -> Result<ListDocumentsResponse, StoreError> {
        let mut query = vec![("pageSize", self.config.page_size.to_string())];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .query(&query)
            .send()
            .map_err(|e| StoreError::HttpClient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StoreError::RetrievalFailed {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .map_err(|e| StoreError::ResponseParsing(e.to_string()))
    }
}

impl ReviewSource for FirestoreClient {
    fn fetch_reviews(&self, restaurant_id: &str) -> Result<Vec<ReviewDocument>, StoreError> {
        let url = self.reviews_url(restaurant_id);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 0..MAX_PAGES {
            let parsed = self.fetch_page(&url, page_token.as_deref())?;
            documents.extend(
                parsed
                    .documents
                    .unwrap_or_default()
                    .into_iter()
                    .map(ReviewDocument::from),
            );

            match parsed.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }

            if page + 1 == MAX_PAGES {
                tracing::warn!(restaurant_id, pages = MAX_PAGES, "Stopped paging reviews at page cap");
            }
        }

        tracing::info!(restaurant_id, documents = documents.len(), "Fetched reviews");
        Ok(documents)
    }
}

/// In-memory review source keyed by restaurant id.
#[derive(Debug, Default)]
pub struct InMemoryReviews {
    by_restaurant: HashMap<String, Vec<ReviewDocument>>,
}

impl InMemoryReviews {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reviews(mut self, restaurant_id: &str, documents: Vec<ReviewDocument>) -> Self {
        self.by_restaurant
            .insert(restaurant_id.to_string(), documents);
        self
    }
}

impl ReviewSource for InMemoryReviews {
    fn fetch_reviews(&self, restaurant_id: &str) -> Result<Vec<ReviewDocument>, StoreError> {
        Ok(self
            .by_restaurant
            .get(restaurant_id)
            .cloned()
            .unwrap_or_default())
    }
}
