use crate::id::{ConnectionId, ItemId};
use thiserror::Error;

/// Why a connection was rejected. Rejection never changes board state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("cannot connect item {0} to itself")]
    SelfLoop(ItemId),
    #[error("item {0} does not exist")]
    MissingEndpoint(ItemId),
    #[error("connection {0} does not exist")]
    UnknownConnection(ConnectionId),
}

/// Failure encoding or decoding a board snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("invalid snapshot json: {0}")]
    Json(#[from] serde_json::Error),
}
