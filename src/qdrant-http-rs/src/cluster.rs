use qdrant_http_core::{
    ClusterInfo, ClusterOperation, CollectionClusterInfo, Envelope, MoveShard, PeerId,
    ShardId, ShardReplica,
};
use reqwest::Method;

use crate::request::{CallSite, NO_BODY};
use crate::{Client, Result};

impl Client {
    /// Get the state of the cluster as seen by the answering peer
    pub async fn cluster_info(&self) -> Result<Envelope<ClusterInfo>> {
        let call = CallSite::new("cluster_info", Method::GET, "/cluster");
        self.send_json(call, NO_BODY).await
    }

    /// Get shard placement and transfers for a collection
    pub async fn collection_cluster_info(
        &self,
        collection: &str,
    ) -> Result<Envelope<CollectionClusterInfo>> {
        let call = CallSite::new(
            "collection_cluster_info",
            Method::GET,
            format!("/collections/{collection}/cluster"),
        );
        self.send_json(call, NO_BODY).await
    }

    /// Apply one shard management operation to a collection
    pub async fn update_collection_cluster_setup(
        &self,
        collection: &str,
        operation: &ClusterOperation,
    ) -> Result<Envelope<bool>> {
        let call = CallSite::new(
            "update_collection_cluster_setup",
            Method::POST,
            format!("/collections/{collection}/cluster"),
        );
        self.send_json(call, Some(operation)).await
    }

    /// Move a shard from one peer to another
    pub async fn move_shard(
        &self,
        collection: &str,
        shard_id: ShardId,
        from_peer_id: PeerId,
        to_peer_id: PeerId,
    ) -> Result<Envelope<bool>> {
        let operation = ClusterOperation::MoveShard(MoveShard {
            shard_id,
            from_peer_id,
            to_peer_id,
        });
        self.update_collection_cluster_setup(collection, &operation)
            .await
    }

    /// Create a replica of a shard on a peer
    pub async fn replicate_shard(
        &self,
        collection: &str,
        shard_id: ShardId,
        peer_id: PeerId,
    ) -> Result<Envelope<bool>> {
        let operation = ClusterOperation::ReplicateShard(ShardReplica { shard_id, peer_id });
        self.update_collection_cluster_setup(collection, &operation)
            .await
    }

    /// Drop the replica of a shard held by a peer
    pub async fn drop_replica(
        &self,
        collection: &str,
        shard_id: ShardId,
        peer_id: PeerId,
    ) -> Result<Envelope<bool>> {
        let operation = ClusterOperation::DropReplica(ShardReplica { shard_id, peer_id });
        self.update_collection_cluster_setup(collection, &operation)
            .await
    }

    /// Abort an ongoing shard transfer
    pub async fn abort_transfer(
        &self,
        collection: &str,
        shard_id: ShardId,
        from_peer_id: PeerId,
        to_peer_id: PeerId,
    ) -> Result<Envelope<bool>> {
        let operation = ClusterOperation::AbortTransfer(MoveShard {
            shard_id,
            from_peer_id,
            to_peer_id,
        });
        self.update_collection_cluster_setup(collection, &operation)
            .await
    }

    pub async fn restart_transfer(
        &self,
        collection: &str,
        shard_id: ShardId,
        from_peer_id: PeerId,
        to_peer_id: PeerId,
    ) -> Result<Envelope<bool>> {
        let operation = ClusterOperation::RestartTransfer(MoveShard {
            shard_id,
            from_peer_id,
            to_peer_id,
        });
        self.update_collection_cluster_setup(collection, &operation)
            .await
    }
}
