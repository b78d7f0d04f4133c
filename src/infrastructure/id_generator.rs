// Preserve ID Generator - time-ordered IDs that stay within JavaScript's safe integer range

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::PreserveId;

/// Custom epoch (2024-01-01T00:00:00Z) in milliseconds
const EPOCH_MILLIS: u64 = 1_704_067_200_000;
const SEQUENCE_BITS: u32 = 12;
const TIMESTAMP_BITS: u32 = 41;
const MAX_SEQUENCE: u64 = (1 << SEQUENCE_BITS) - 1;
const TIMESTAMP_MASK: u64 = (1 << TIMESTAMP_BITS) - 1;

/// 53-bit ID format: [timestamp:41][sequence:12]
/// 41 bits of milliseconds covers ~69 years from the epoch, and 4096 IDs per millisecond
/// is far beyond what an administrator can produce.
#[derive(Debug, Default)]
pub struct PreserveIdGenerator {
    state: Mutex<GeneratorState>,
}

#[derive(Debug, Default)]
struct GeneratorState {
    last_timestamp: u64,
    sequence: u64,
}

impl PreserveIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the next unique ID
    pub fn next_id(&self) -> PreserveId {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut now = current_millis().max(state.last_timestamp);
        if now == state.last_timestamp {
            if state.sequence >= MAX_SEQUENCE {
                // Sequence exhausted for this millisecond - borrow the next one
                now += 1;
                state.sequence = 0;
            } else {
                state.sequence += 1;
            }
        } else {
            state.sequence = 0;
        }
        state.last_timestamp = now;

        let id = ((now & TIMESTAMP_MASK) << SEQUENCE_BITS) | state.sequence;
        // Sequence 0 at the epoch's first millisecond would yield 0; keep ids positive
        PreserveId::new((id.max(1)) as i64)
    }

    /// Extract the creation time (unix millis) embedded in an ID
    pub fn extract_timestamp(id: PreserveId) -> u64 {
        ((id.value() as u64) >> SEQUENCE_BITS) + EPOCH_MILLIS
    }

    /// Extract the per-millisecond sequence from an ID
    pub fn extract_sequence(id: PreserveId) -> u16 {
        ((id.value() as u64) & MAX_SEQUENCE) as u16
    }
}

fn current_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(EPOCH_MILLIS)
        .saturating_sub(EPOCH_MILLIS)
}
