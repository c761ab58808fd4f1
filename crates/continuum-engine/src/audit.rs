//! Append-only audit log with a running hash.
//!
//! ```text
//! root_0 = [0; 32]
//! root_n = SHA-256("continuum:audit:v1:" || root_{n-1} || n-1 (u64 LE) || canonical(event))
//! ```
//!
//! Two engines that committed the same events in the same order hold the
//! same root, so replicas can be compared without shipping the full log.

use continuum_types::{EngineEvent, RecordedEvent};
use sha2::{Digest, Sha256};

const DOMAIN: &[u8] = b"continuum:audit:v1:";

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<RecordedEvent>,
    root: [u8; 32],
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and fold it into the root.
    pub fn record(&mut self, event: EngineEvent) -> &RecordedEvent {
        let sequence = self.events.len() as u64;
        self.root = chain(&self.root, sequence, &event);
        self.events.push(RecordedEvent {
            sequence,
            event,
            root: self.root,
        });
        &self.events[self.events.len() - 1]
    }

    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    #[must_use]
    pub fn root(&self) -> [u8; 32] {
        self.root
    }

    #[must_use]
    pub fn root_hex(&self) -> String {
        hex::encode(self.root)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Recompute every intermediate root and compare.
    #[must_use]
    pub fn verify(&self) -> bool {
        let mut root = [0u8; 32];
        for recorded in &self.events {
            root = chain(&root, recorded.sequence, &recorded.event);
            if root != recorded.root {
                return false;
            }
        }
        root == self.root
    }
}

fn chain(prev: &[u8; 32], sequence: u64, event: &EngineEvent) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN);
    hasher.update(prev);
    hasher.update(sequence.to_le_bytes());
    hasher.update(event.canonical_bytes());

    let digest = hasher.finalize();
    let mut root = [0u8; 32];
    root.copy_from_slice(&digest);
    root
}

/// Audit root of `events` recorded in order from an empty log.
#[must_use]
pub fn compute_audit_root(events: &[EngineEvent]) -> [u8; 32] {
    events
        .iter()
        .zip(0u64..)
        .fold([0u8; 32], |root, (event, sequence)| chain(&root, sequence, event))
}

#[must_use]
pub fn verify_audit_root(events: &[EngineEvent], expected_root: &[u8; 32]) -> bool {
    compute_audit_root(events) == *expected_root
}
