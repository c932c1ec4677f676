use qdrant_http_core::{CollectionInfo, CollectionsList, Envelope};
use reqwest::Method;

use crate::request::{CallSite, NO_BODY};
use crate::{Client, Result};

impl Client {
    /// List all collections
    pub async fn list_collections(&self) -> Result<Envelope<CollectionsList>> {
        let call = CallSite::new("list_collections", Method::GET, "/collections");
        self.send_json(call, NO_BODY).await
    }

    /// Get detailed information about a collection
    pub async fn get_collection(&self, collection: &str) -> Result<Envelope<CollectionInfo>> {
        let call = CallSite::new(
            "get_collection",
            Method::GET,
            format!("/collections/{collection}"),
        );
        self.send_json(call, NO_BODY).await
    }
}
