//! Route data provider

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::{DataError, RouteDocument, RouteModel};

/// External source of route documents, keyed by test-centre name
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Fetch and validate the route for a location
    async fn fetch_route(&self, location_name: &str) -> Result<RouteModel, DataError>;
}

/// Provider over raw documents held in memory.
///
/// Documents stay untyped until fetched, the same way a remote document
/// store would hand them over.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRouteProvider {
    documents: HashMap<String, serde_json::Value>,
}

impl InMemoryRouteProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document under a location name
    pub fn insert(&mut self, key: impl Into<String>, document: serde_json::Value) {
        let key = key.into();
        debug!("Registering route document {}", key);
        self.documents.insert(key, document);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl RouteProvider for InMemoryRouteProvider {
    async fn fetch_route(&self, location_name: &str) -> Result<RouteModel, DataError> {
        let document = self
            .documents
            .get(location_name)
            .cloned()
            .ok_or_else(|| DataError::NotFound(location_name.to_string()))?;

        info!("Fetched route document for {}", location_name);
        let mut document: RouteDocument =
            serde_json::from_value(document).map_err(|e| DataError::Malformed(e.to_string()))?;
        if document.name.is_empty() {
            document.name = location_name.to_string();
        }
        RouteModel::from_document(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_known_route() {
        let mut provider = InMemoryRouteProvider::new();
        provider.insert(
            "Brampton",
            json!({
                "name": "Brampton Test Centre",
                "locations": [ { "latitude": 43.6768, "longitude": -79.8218, "instruction": "Start" } ]
            }),
        );

        let route = provider.fetch_route("Brampton").await.unwrap();
        assert_eq!(route.waypoints().len(), 1);
        assert_eq!(route.name(), "Brampton Test Centre");

        let err = provider.fetch_route("Brampton Test Centre").await.unwrap_err();
        assert!(matches!(err, DataError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_nameless_document_takes_location_name() {
        let mut provider = InMemoryRouteProvider::new();
        provider.insert(
            "Oakville",
            json!({
                "locations": [ { "latitude": 43.4675, "longitude": -79.6877, "instruction": "Start" } ]
            }),
        );

        let route = provider.fetch_route("Oakville").await.unwrap();
        assert_eq!(route.name(), "Oakville");
    }

    #[tokio::test]
    async fn test_fetch_unknown_route() {
        let provider = InMemoryRouteProvider::new();
        let err = provider.fetch_route("Mississauga").await.unwrap_err();
        assert!(matches!(err, DataError::NotFound(name) if name == "Mississauga"));
    }

    #[tokio::test]
    async fn test_fetch_empty_route() {
        let mut provider = InMemoryRouteProvider::new();
        provider.insert("Oakville", json!({ "locations": [] }));
        let err = provider.fetch_route("Oakville").await.unwrap_err();
        assert!(matches!(err, DataError::EmptyRoute(name) if name == "Oakville"));
    }
}
