//! Chunk accounting
//!
//! A chunk grows one serialized record at a time. The threshold is checked
//! after every append, so a chunk is flushed at the first append that makes
//! the running measure reach the target. A single record larger than the
//! whole byte target is still accepted and flushed on its own.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Limit that triggers a chunk flush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    /// Flush once the buffered records reach this many encoded bytes
    Bytes(u64),
    /// Flush once this many records are buffered
    Records(usize),
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold::Bytes(2 * 1024 * 1024 * 1024) // 2 GiB
    }
}

impl Threshold {
    /// Reject thresholds that would flush an empty chunk
    pub fn validate(&self) -> Result<()> {
        match self {
            Threshold::Bytes(0) => Err(CoreError::InvalidThreshold {
                reason: "byte threshold must be greater than 0".to_string(),
            }),
            Threshold::Records(0) => Err(CoreError::InvalidThreshold {
                reason: "record threshold must be greater than 0".to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Unit name used in logs and reports
    pub fn unit(&self) -> &'static str {
        match self {
            Threshold::Bytes(_) => "bytes",
            Threshold::Records(_) => "records",
        }
    }

    /// Target value in the threshold's own unit
    pub fn target(&self) -> u64 {
        match *self {
            Threshold::Bytes(bytes) => bytes,
            Threshold::Records(count) => count as u64,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.target(), self.unit())
    }
}

/// Buffer of serialized records for the chunk being built
#[derive(Debug, Clone)]
pub struct ChunkAccumulator {
    threshold: Threshold,
    records: Vec<String>,
    bytes: u64,
}

impl ChunkAccumulator {
    /// Create an empty accumulator for a validated threshold
    pub fn new(threshold: Threshold) -> Result<Self> {
        threshold.validate()?;
        Ok(Self {
            threshold,
            records: Vec::new(),
            bytes: 0,
        })
    }

    /// The threshold this accumulator flushes at
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Add one serialized record to the current chunk
    pub fn append(&mut self, record: String) {
        self.bytes += record.len() as u64;
        self.records.push(record);
    }

    /// Whether the running measure has reached the threshold
    pub fn should_flush(&self) -> bool {
        self.measure() >= self.threshold.target()
    }

    /// Running measure in the threshold's unit
    pub fn measure(&self) -> u64 {
        match self.threshold {
            Threshold::Bytes(_) => self.bytes,
            Threshold::Records(_) => self.records.len() as u64,
        }
    }

    /// Buffered records in append order
    pub fn records(&self) -> &[String] {
        &self.records
    }

    /// Encoded size of the buffered records
    pub fn byte_len(&self) -> u64 {
        self.bytes
    }

    /// Number of buffered records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has been appended since the last reset
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop the buffered records and zero the measure
    pub fn reset(&mut self) {
        self.records.clear();
        self.bytes = 0;
    }
}
