//! Tile retrieval: the transport seam and per-cell mirror failover.

pub(crate) mod tile;
pub(crate) mod transport;
