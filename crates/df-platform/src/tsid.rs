//! TSID Generation
//!
//! Time-sorted identifiers encoded as 13-character Crockford Base32 strings.
//! Lexicographic order matches creation order, which keeps `_id` indexes
//! naturally clustered by insertion time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const CROCKFORD: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Bits reserved below the millisecond timestamp for a per-process sequence.
const SEQUENCE_BITS: u64 = 22;

static LAST: AtomicU64 = AtomicU64::new(0);

pub struct TsidGenerator;

impl TsidGenerator {
    /// Generate a new TSID.
    ///
    /// The value is (millis << 22) | sequence, forced to be strictly greater
    /// than the previously issued value so ids are unique and sortable even
    /// within the same millisecond.
    pub fn generate() -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let candidate = millis << SEQUENCE_BITS;

        let mut prev = LAST.load(Ordering::Relaxed);
        loop {
            let next = candidate.max(prev + 1);
            match LAST.compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => return encode(next),
                Err(actual) => prev = actual,
            }
        }
    }
}

fn encode(value: u64) -> String {
    // 13 chars * 5 bits = 65 bits; the top character only ever uses 4 bits.
    let mut out = String::with_capacity(13);
    for i in (0..13).rev() {
        let index = ((value >> (i * 5)) & 0x1F) as usize;
        out.push(CROCKFORD[index] as char);
    }
    out
}
