use qdrant_http_core::{Envelope, ShardId, SnapshotDescription, SnapshotRecover};
use reqwest::Method;

use crate::request::{CallSite, NO_BODY};
use crate::stream::ByteStream;
use crate::{Client, Result};

fn recover_body(location: &str) -> SnapshotRecover {
    SnapshotRecover {
        location: location.to_string(),
    }
}

// Full storage snapshots

impl Client {
    /// Create a snapshot of the whole storage
    pub async fn create_full_snapshot(&self) -> Result<Envelope<SnapshotDescription>> {
        let call = CallSite::new("create_full_snapshot", Method::POST, "/snapshots");
        self.send_json(call, NO_BODY).await
    }

    pub async fn list_full_snapshots(&self) -> Result<Envelope<Vec<SnapshotDescription>>> {
        let call = CallSite::new("list_full_snapshots", Method::GET, "/snapshots");
        self.send_json(call, NO_BODY).await
    }

    pub async fn delete_full_snapshot(&self, snapshot: &str) -> Result<Envelope<bool>> {
        let call = CallSite::new(
            "delete_full_snapshot",
            Method::DELETE,
            format!("/snapshots/{snapshot}"),
        );
        self.send_json(call, NO_BODY).await
    }

    /// Restore the whole storage from a snapshot URL or server-local path
    pub async fn recover_full_snapshot(&self, location: &str) -> Result<Envelope<bool>> {
        let call = CallSite::new("recover_full_snapshot", Method::PUT, "/snapshots/upload");
        self.send_json(call, Some(&recover_body(location))).await
    }

    /// Download a full storage snapshot; the caller owns the returned stream
    pub async fn download_full_snapshot(&self, snapshot: &str) -> Result<ByteStream> {
        let call = CallSite::new(
            "download_full_snapshot",
            Method::GET,
            format!("/snapshots/{snapshot}"),
        );
        self.download(call).await
    }
}

// Collection snapshots

impl Client {
    pub async fn create_collection_snapshot(
        &self,
        collection: &str,
    ) -> Result<Envelope<SnapshotDescription>> {
        let call = CallSite::new(
            "create_collection_snapshot",
            Method::POST,
            format!("/collections/{collection}/snapshots"),
        );
        self.send_json(call, NO_BODY).await
    }

    pub async fn list_collection_snapshots(
        &self,
        collection: &str,
    ) -> Result<Envelope<Vec<SnapshotDescription>>> {
        let call = CallSite::new(
            "list_collection_snapshots",
            Method::GET,
            format!("/collections/{collection}/snapshots"),
        );
        self.send_json(call, NO_BODY).await
    }

    pub async fn delete_collection_snapshot(
        &self,
        collection: &str,
        snapshot: &str,
    ) -> Result<Envelope<bool>> {
        let call = CallSite::new(
            "delete_collection_snapshot",
            Method::DELETE,
            format!("/collections/{collection}/snapshots/{snapshot}"),
        );
        self.send_json(call, NO_BODY).await
    }

    /// Restore a collection from a snapshot URL or server-local path
    pub async fn recover_collection_snapshot(
        &self,
        collection: &str,
        location: &str,
    ) -> Result<Envelope<bool>> {
        let call = CallSite::new(
            "recover_collection_snapshot",
            Method::PUT,
            format!("/collections/{collection}/snapshots/upload"),
        );
        self.send_json(call, Some(&recover_body(location))).await
    }

    /// Download a collection snapshot; the caller owns the returned stream
    pub async fn download_collection_snapshot(
        &self,
        collection: &str,
        snapshot: &str,
    ) -> Result<ByteStream> {
        let call = CallSite::new(
            "download_collection_snapshot",
            Method::GET,
            format!("/collections/{collection}/snapshots/{snapshot}"),
        );
        self.download(call).await
    }
}

// Shard snapshots

impl Client {
    pub async fn create_shard_snapshot(
        &self,
        collection: &str,
        shard_id: ShardId,
    ) -> Result<Envelope<SnapshotDescription>> {
        let call = CallSite::new(
            "create_shard_snapshot",
            Method::POST,
            format!("/collections/{collection}/shards/{shard_id}/snapshots"),
        );
        self.send_json(call, NO_BODY).await
    }

    pub async fn list_shard_snapshots(
        &self,
        collection: &str,
        shard_id: ShardId,
    ) -> Result<Envelope<Vec<SnapshotDescription>>> {
        let call = CallSite::new(
            "list_shard_snapshots",
            Method::GET,
            format!("/collections/{collection}/shards/{shard_id}/snapshots"),
        );
        self.send_json(call, NO_BODY).await
    }

    pub async fn delete_shard_snapshot(
        &self,
        collection: &str,
        shard_id: ShardId,
        snapshot: &str,
    ) -> Result<Envelope<bool>> {
        let call = CallSite::new(
            "delete_shard_snapshot",
            Method::DELETE,
            format!("/collections/{collection}/shards/{shard_id}/snapshots/{snapshot}"),
        );
        self.send_json(call, NO_BODY).await
    }

    /// Restore one shard from a snapshot URL or server-local path
    pub async fn recover_shard_snapshot(
        &self,
        collection: &str,
        shard_id: ShardId,
        location: &str,
    ) -> Result<Envelope<bool>> {
        let call = CallSite::new(
            "recover_shard_snapshot",
            Method::PUT,
            format!("/collections/{collection}/shards/{shard_id}/snapshots/upload"),
        );
        self.send_json(call, Some(&recover_body(location))).await
    }

    /// Download a shard snapshot; the caller owns the returned stream
    pub async fn download_shard_snapshot(
        &self,
        collection: &str,
        shard_id: ShardId,
        snapshot: &str,
    ) -> Result<ByteStream> {
        let call = CallSite::new(
            "download_shard_snapshot",
            Method::GET,
            format!("/collections/{collection}/shards/{shard_id}/snapshots/{snapshot}"),
        );
        self.download(call).await
    }
}
