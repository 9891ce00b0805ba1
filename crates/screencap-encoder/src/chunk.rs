//! Encoded chunk types.

use bytes::Bytes;
use std::time::{Duration, Instant};

/// Timestamp for a delivered chunk.
#[derive(Debug, Clone, Copy)]
pub struct ChunkTimestamp {
    /// Monotonic timestamp when the chunk was delivered.
    pub delivered_at: Instant,

    /// Offset from the start of the recording.
    pub offset: Duration,
}

impl ChunkTimestamp {
    /// Timestamp a delivery happening now.
    pub fn now(start_time: Instant) -> Self {
        let delivered_at = Instant::now();
        Self {
            delivered_at,
            offset: delivered_at.duration_since(start_time),
        }
    }

    /// Offset in milliseconds.
    pub fn offset_ms(&self) -> u64 {
        self.offset.as_millis() as u64
    }
}

/// One unit of encoded media delivered by a running encoder.
#[derive(Debug, Clone)]
pub struct MediaChunk {
    /// Encoded container bytes.
    pub data: Bytes,

    /// Delivery timestamp.
    pub timestamp: ChunkTimestamp,

    /// Monotonically increasing sequence number.
    pub sequence: u64,
}

impl MediaChunk {
    /// Create a new chunk.
    pub fn new(data: Bytes, timestamp: ChunkTimestamp, sequence: u64) -> Self {
        Self {
            data,
            timestamp,
            sequence,
        }
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Zero-length deliveries carry no media and are discarded by the session.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
