use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::envelope::JsonMap;

pub type PeerId = u64;
pub type ShardId = u32;

/// CollectionDescription names one collection in a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDescription {
    pub name: String,
}

/// CollectionsList is the result of `GET /collections`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionsList {
    #[serde(default)]
    pub collections: Vec<CollectionDescription>,
}

/// CollectionInfo is the result of `GET /collections/{name}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// green, yellow, grey or red
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub optimizer_status: Option<serde_json::Value>,
    #[serde(default)]
    pub vectors_count: Option<u64>,
    #[serde(default)]
    pub indexed_vectors_count: Option<u64>,
    #[serde(default)]
    pub points_count: Option<u64>,
    #[serde(default)]
    pub segments_count: Option<u64>,
    #[serde(default)]
    pub config: JsonMap,
    #[serde(default)]
    pub payload_schema: JsonMap,
}

/// PeerInfo describes one cluster peer, keyed by peer id in the peers map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfo {
    pub uri: String,
}

/// RaftInfo is the consensus state of the answering peer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaftInfo {
    #[serde(default)]
    pub term: u64,
    #[serde(default)]
    pub commit: u64,
    #[serde(default)]
    pub pending_operations: u64,
    #[serde(default)]
    pub leader: Option<PeerId>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_voter: bool,
}

/// ClusterInfo is the result of `GET /cluster`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterInfo {
    /// "enabled" or "disabled"
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub peer_id: PeerId,
    #[serde(default)]
    pub peers: HashMap<String, PeerInfo>,
    #[serde(default)]
    pub raft_info: Option<RaftInfo>,
    #[serde(default)]
    pub consensus_thread_status: JsonMap,
    #[serde(default)]
    pub message_send_failures: HashMap<String, JsonMap>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalShardInfo {
    pub shard_id: ShardId,
    #[serde(default)]
    pub points_count: u64,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteShardInfo {
    pub shard_id: ShardId,
    pub peer_id: PeerId,
    pub state: String,
}

/// ShardTransferInfo is an in-flight shard transfer between two peers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardTransferInfo {
    pub shard_id: ShardId,
    pub from: PeerId,
    pub to: PeerId,
    /// True when the transfer is a replication rather than a move
    #[serde(default)]
    pub sync: bool,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// CollectionClusterInfo is the result of `GET /collections/{name}/cluster`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionClusterInfo {
    #[serde(default)]
    pub peer_id: PeerId,
    #[serde(default)]
    pub shard_count: u64,
    #[serde(default)]
    pub local_shards: Vec<LocalShardInfo>,
    #[serde(default)]
    pub remote_shards: Vec<RemoteShardInfo>,
    #[serde(default)]
    pub shard_transfers: Vec<ShardTransferInfo>,
}

/// MoveShard relocates a shard from one peer to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveShard {
    pub shard_id: ShardId,
    pub from_peer_id: PeerId,
    pub to_peer_id: PeerId,
}

/// ShardReplica targets one replica of a shard on one peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardReplica {
    pub shard_id: ShardId,
    pub peer_id: PeerId,
}

/// ClusterOperation is the body of `POST /collections/{name}/cluster`.
///
/// Serializes externally tagged, e.g. `{"move_shard": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterOperation {
    MoveShard(MoveShard),
    ReplicateShard(ShardReplica),
    DropReplica(ShardReplica),
    AbortTransfer(MoveShard),
    RestartTransfer(MoveShard),
}

/// SnapshotDescription describes a stored snapshot artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDescription {
    pub name: String,
    #[serde(default)]
    pub creation_time: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub checksum: Option<String>,
}

/// SnapshotRecover is the body of the `.../snapshots/upload` recover calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecover {
    /// URL or server-local path of the snapshot to restore
    pub location: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cluster_operations_are_externally_tagged() {
        let op = ClusterOperation::MoveShard(MoveShard {
            shard_id: 1,
            from_peer_id: 10,
            to_peer_id: 20,
        });
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({"move_shard": {"shard_id": 1, "from_peer_id": 10, "to_peer_id": 20}})
        );

        let op = ClusterOperation::DropReplica(ShardReplica {
            shard_id: 3,
            peer_id: 42,
        });
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({"drop_replica": {"shard_id": 3, "peer_id": 42}})
        );

        let op = ClusterOperation::RestartTransfer(MoveShard {
            shard_id: 0,
            from_peer_id: 1,
            to_peer_id: 2,
        });
        let value = serde_json::to_value(&op).unwrap();
        assert!(value.get("restart_transfer").is_some());
    }

    #[test]
    fn test_cluster_info_keeps_loose_fields() {
        let info: ClusterInfo = serde_json::from_value(json!({
            "status": "enabled",
            "peer_id": 7,
            "peers": {"7": {"uri": "http://qdrant-0:6335/"}},
            "raft_info": {
                "term": 2,
                "commit": 40,
                "pending_operations": 0,
                "leader": 7,
                "role": "Leader",
                "is_voter": true
            },
            "consensus_thread_status": {
                "consensus_thread_status": "working",
                "last_update": "2024-01-01T00:00:00Z"
            },
            "message_send_failures": {}
        }))
        .unwrap();

        assert_eq!(info.peer_id, 7);
        assert_eq!(info.peers["7"].uri, "http://qdrant-0:6335/");
        assert_eq!(info.raft_info.unwrap().leader, Some(7));
        assert_eq!(
            info.consensus_thread_status.get_str("consensus_thread_status"),
            Some("working")
        );
    }

    #[test]
    fn test_collection_info_tolerates_missing_counts() {
        let info: CollectionInfo = serde_json::from_value(json!({
            "status": "green",
            "points_count": 1200,
            "payload_schema": {"city": {"data_type": "keyword"}}
        }))
        .unwrap();

        assert_eq!(info.status, "green");
        assert_eq!(info.points_count, Some(1200));
        assert_eq!(info.vectors_count, None);
        assert!(info.payload_schema.contains_key("city"));
    }

    #[test]
    fn test_snapshot_description() {
        let snap: SnapshotDescription = serde_json::from_value(json!({
            "name": "test-123.snapshot",
            "creation_time": "2024-05-01T10:00:00",
            "size": 4096,
            "checksum": "abc"
        }))
        .unwrap();
        assert_eq!(snap.name, "test-123.snapshot");
        assert_eq!(snap.size, 4096);
    }
}
