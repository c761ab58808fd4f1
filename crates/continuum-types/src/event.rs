//! Audit events emitted by the engine.
//!
//! Every committed state change produces an [`EngineEvent`]. Events are
//! immutable once recorded; the engine assigns each a sequence number and
//! folds its canonical bytes into a running audit hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, U256, amount_serde};

/// Reserve deposited, derivative minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintEvent {
    pub account: AccountId,
    #[serde(with = "amount_serde")]
    pub reserve_amount: U256,
    #[serde(with = "amount_serde")]
    pub derivative_amount: U256,
    pub at: DateTime<Utc>,
}

/// Derivative burned, reserve returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnEvent {
    pub account: AccountId,
    #[serde(with = "amount_serde")]
    pub reserve_amount: U256,
    #[serde(with = "amount_serde")]
    pub derivative_amount: U256,
    pub at: DateTime<Utc>,
}

/// Every auditable action of an engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    Mint(MintEvent),
    Burn(BurnEvent),
    /// Holder-to-holder derivative transfer.
    Transfer {
        from: AccountId,
        to: AccountId,
        #[serde(with = "amount_serde")]
        amount: U256,
    },
    /// Transfer forced by the override authority.
    OverrideTransfer {
        authority: AccountId,
        from: AccountId,
        to: AccountId,
        #[serde(with = "amount_serde")]
        amount: U256,
    },
    CooldownChanged {
        old_secs: i64,
        new_secs: i64,
    },
    AccountBanned {
        account: AccountId,
    },
    AccountUnbanned {
        account: AccountId,
    },
    OwnershipTransferStarted {
        owner: AccountId,
        pending: AccountId,
    },
    OwnershipTransferred {
        previous: AccountId,
        owner: AccountId,
    },
}

/// Discriminant of an [`EngineEvent`], for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Mint,
    Burn,
    Transfer,
    OverrideTransfer,
    CooldownChanged,
    AccountBanned,
    AccountUnbanned,
    OwnershipTransferStarted,
    OwnershipTransferred,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mint => write!(f, "MINT"),
            Self::Burn => write!(f, "BURN"),
            Self::Transfer => write!(f, "TRANSFER"),
            Self::OverrideTransfer => write!(f, "OVERRIDE_TRANSFER"),
            Self::CooldownChanged => write!(f, "COOLDOWN_CHANGED"),
            Self::AccountBanned => write!(f, "ACCOUNT_BANNED"),
            Self::AccountUnbanned => write!(f, "ACCOUNT_UNBANNED"),
            Self::OwnershipTransferStarted => write!(f, "OWNERSHIP_TRANSFER_STARTED"),
            Self::OwnershipTransferred => write!(f, "OWNERSHIP_TRANSFERRED"),
        }
    }
}

impl EngineEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Mint(_) => EventKind::Mint,
            Self::Burn(_) => EventKind::Burn,
            Self::Transfer { .. } => EventKind::Transfer,
            Self::OverrideTransfer { .. } => EventKind::OverrideTransfer,
            Self::CooldownChanged { .. } => EventKind::CooldownChanged,
            Self::AccountBanned { .. } => EventKind::AccountBanned,
            Self::AccountUnbanned { .. } => EventKind::AccountUnbanned,
            Self::OwnershipTransferStarted { .. } => EventKind::OwnershipTransferStarted,
            Self::OwnershipTransferred { .. } => EventKind::OwnershipTransferred,
        }
    }

    /// Canonical bytes folded into the audit hash.
    ///
    /// Format: `kind(utf8) || 0x00 || fields...` where accounts are raw
    /// 20-byte addresses, amounts are 32-byte big-endian, timestamps are
    /// little-endian `i64` seconds followed by `u32` nanoseconds.
    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(160);
        out.extend_from_slice(self.kind().to_string().as_bytes());
        out.push(0);
        match self {
            Self::Mint(MintEvent {
                account,
                reserve_amount,
                derivative_amount,
                at,
            })
            | Self::Burn(BurnEvent {
                account,
                reserve_amount,
                derivative_amount,
                at,
            }) => {
                out.extend_from_slice(account.as_bytes());
                put_amount(&mut out, *reserve_amount);
                put_amount(&mut out, *derivative_amount);
                out.extend_from_slice(&at.timestamp().to_le_bytes());
                out.extend_from_slice(&at.timestamp_subsec_nanos().to_le_bytes());
            }
            Self::Transfer { from, to, amount } => {
                out.extend_from_slice(from.as_bytes());
                out.extend_from_slice(to.as_bytes());
                put_amount(&mut out, *amount);
            }
            Self::OverrideTransfer {
                authority,
                from,
                to,
                amount,
            } => {
                out.extend_from_slice(authority.as_bytes());
                out.extend_from_slice(from.as_bytes());
                out.extend_from_slice(to.as_bytes());
                put_amount(&mut out, *amount);
            }
            Self::CooldownChanged { old_secs, new_secs } => {
                out.extend_from_slice(&old_secs.to_le_bytes());
                out.extend_from_slice(&new_secs.to_le_bytes());
            }
            Self::AccountBanned { account } | Self::AccountUnbanned { account } => {
                out.extend_from_slice(account.as_bytes());
            }
            Self::OwnershipTransferStarted { owner, pending } => {
                out.extend_from_slice(owner.as_bytes());
                out.extend_from_slice(pending.as_bytes());
            }
            Self::OwnershipTransferred { previous, owner } => {
                out.extend_from_slice(previous.as_bytes());
                out.extend_from_slice(owner.as_bytes());
            }
        }
        out
    }
}

fn put_amount(out: &mut Vec<u8>, amount: U256) {
    for word in amount.0.iter().rev() {
        out.extend_from_slice(&word.to_be_bytes());
    }
}

/// An event as stored in the engine's append-only log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// Position in the log, starting at zero.
    pub sequence: u64,
    pub event: EngineEvent,
    /// Audit root after folding in this event.
    pub root: [u8; 32],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens;

    fn mint() -> MintEvent {
        MintEvent {
            account: AccountId([1u8; 20]),
            reserve_amount: tokens(100),
            derivative_amount: tokens(23),
            at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn event_kind_display() {
        assert_eq!(format!("{}", EventKind::Mint), "MINT");
        assert_eq!(
            format!("{}", EventKind::OverrideTransfer),
            "OVERRIDE_TRANSFER"
        );
        assert_eq!(EngineEvent::Mint(mint()).kind(), EventKind::Mint);
    }

    #[test]
    fn canonical_bytes_distinguish_mint_and_burn() {
        let m = mint();
        let b = BurnEvent {
            account: m.account,
            reserve_amount: m.reserve_amount,
            derivative_amount: m.derivative_amount,
            at: m.at,
        };
        let mb = EngineEvent::Mint(m).canonical_bytes();
        let bb = EngineEvent::Burn(b).canonical_bytes();
        assert_ne!(mb, bb);
        assert!(mb.starts_with(b"MINT\0"));
        // kind + nul + account + two amounts + timestamp
        assert_eq!(mb.len(), 5 + 20 + 32 + 32 + 8 + 4);
    }

    #[test]
    fn engine_event_serde_is_tagged() {
        let ev = EngineEvent::Mint(mint());
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains("\"type\":\"mint\""), "Got: {json}");
        assert!(json.contains("\"100000000000000000000\""));
        let back: EngineEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }
}
