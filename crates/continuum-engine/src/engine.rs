//! The continuous-token engine.
//!
//! One engine instance owns one curve: its reserve accounting, cooldown
//! records, derivative balances, access-control state and audit log.
//! Every mutating call takes `&mut self`; callers that share an engine
//! wrap it in a single `Mutex`.
//!
//! Ordering rules:
//! - **mint** pulls the reserve in before touching any state
//! - **burn** commits the debit and reserve update, then pays out; a
//!   refused payout restores the committed state
//! - the caller-supplied clock must never go backwards

use chrono::{DateTime, Duration, Utc};
use continuum_access::{Denylist, OverrideAuthority, Ownership};
use continuum_curve::bonding_curve;
use continuum_types::{
    AccountId, BurnEvent, ContinuumError, CurveState, EngineConfig, EngineEvent, MintEvent,
    RecordedEvent, Result, U256,
};
use tracing::{debug, info, warn};

use crate::audit::EventLog;
use crate::cooldown::CooldownGuard;
use crate::derivative_ledger::DerivativeLedger;
use crate::reserve_asset::ReserveAsset;
use crate::reserve_ledger::ReserveLedger;

pub struct ContinuousTokenEngine<A: ReserveAsset> {
    /// The engine's own account on the reserve-asset ledger.
    custody: AccountId,
    reserve: ReserveLedger,
    cooldown: Duration,
    cooldowns: CooldownGuard,
    derivatives: DerivativeLedger,
    ownership: Ownership,
    denylist: Denylist,
    authority: OverrideAuthority,
    log: EventLog,
    asset: A,
    /// Latest timestamp seen by a committed call.
    last_seen: Option<DateTime<Utc>>,
}

impl<A: ReserveAsset> ContinuousTokenEngine<A> {
    /// Seed a curve from `config`. The initial supply is credited to the
    /// owner; the initial reserve is expected to sit in custody on `asset`.
    ///
    /// # Errors
    /// `Configuration` if the config does not validate.
    pub fn new(config: &EngineConfig, asset: A) -> Result<Self> {
        config.validate()?;
        let state = CurveState::new(
            config.initial_supply,
            config.initial_reserve,
            config.reserve_ratio_ppm,
        )?;
        let mut derivatives = DerivativeLedger::new();
        derivatives.credit(config.owner, config.initial_supply)?;

        info!(
            ratio_ppm = config.reserve_ratio_ppm,
            supply = %config.initial_supply,
            reserve = %config.initial_reserve,
            cooldown_secs = config.cooldown_secs,
            owner = %config.owner,
            "continuous-token engine created"
        );

        Ok(Self {
            custody: config.custody,
            reserve: ReserveLedger::new(state),
            cooldown: config.cooldown(),
            cooldowns: CooldownGuard::new(),
            derivatives,
            ownership: Ownership::new(config.owner),
            denylist: Denylist::new(),
            authority: OverrideAuthority::new(config.override_authority),
            log: EventLog::new(),
            asset,
            last_seen: None,
        })
    }

    // =================================================================
    // Mint / burn
    // =================================================================

    /// Deposit `deposit` of reserve from `account` and mint derivative.
    ///
    /// `account` must have approved the custody account for at least
    /// `deposit` on the reserve asset.
    ///
    /// # Errors
    /// - `InvalidAmount` for a zero or dust deposit
    /// - `ClockRegression` if `now` is earlier than a committed call
    /// - `AccountBanned` if `account` is on the denylist
    /// - `TransferFailed` if the allowance is short or the asset refuses
    /// - curve errors from the quote
    pub fn mint(&mut self, account: AccountId, deposit: U256, now: DateTime<Utc>) -> Result<U256> {
        if deposit.is_zero() {
            return Err(ContinuumError::invalid_amount(
                "deposit amount must be positive",
            ));
        }
        self.check_clock(now)?;
        self.denylist.ensure_allowed(account)?;

        let quoted = self.reserve.quote_mint(deposit)?;
        if quoted.is_zero() {
            return Err(ContinuumError::invalid_amount(format!(
                "deposit {deposit} is too small to mint a unit"
            )));
        }

        let allowance = self.asset.allowance(account, self.custody);
        if allowance < deposit {
            return Err(ContinuumError::transfer_failed(format!(
                "allowance {allowance} below deposit {deposit}"
            )));
        }
        if !self.asset.transfer_in(account, self.custody, deposit) {
            return Err(ContinuumError::transfer_failed(
                "reserve asset refused deposit",
            ));
        }

        let minted = match self.reserve.apply_mint(deposit) {
            Ok(minted) => minted,
            Err(e) => {
                self.refund(account, deposit);
                return Err(e);
            }
        };
        self.cooldowns.record_mint(account, now);
        self.derivatives.credit(account, minted)?;
        self.last_seen = Some(now);

        let recorded = self.log.record(EngineEvent::Mint(MintEvent {
            account,
            reserve_amount: deposit,
            derivative_amount: minted,
            at: now,
        }));
        info!(
            account = %account,
            deposit = %deposit,
            minted = %minted,
            seq = recorded.sequence,
            "mint committed"
        );
        Ok(minted)
    }

    /// Burn `amount` of `account`'s derivative and pay out reserve.
    ///
    /// # Errors
    /// - `InvalidAmount` for a zero amount or a burn of the whole supply
    /// - `ClockRegression` if `now` is earlier than a committed call
    /// - `AccountBanned` if `account` is on the denylist
    /// - `CooldownActive` if `account` minted less than a cooldown ago
    /// - `InsufficientBalance` if `account` holds less than `amount`
    /// - `TransferFailed` if the payout is refused (state restored)
    pub fn burn(&mut self, account: AccountId, amount: U256, now: DateTime<Utc>) -> Result<U256> {
        if amount.is_zero() {
            return Err(ContinuumError::invalid_amount(
                "burn amount must be positive",
            ));
        }
        self.check_clock(now)?;
        self.denylist.ensure_allowed(account)?;
        self.ensure_settled(account, now)?;
        let available = self.derivatives.balance_of(&account);
        if available < amount {
            return Err(ContinuumError::InsufficientBalance {
                needed: amount,
                available,
            });
        }

        let reserve_before = self.reserve.clone();
        self.derivatives.debit(account, amount)?;
        let returned = match self.reserve.apply_burn(amount) {
            Ok(returned) => returned,
            Err(e) => {
                self.derivatives.credit(account, amount)?;
                return Err(e);
            }
        };

        if !self.asset.transfer_out(self.custody, account, returned) {
            self.reserve = reserve_before;
            self.derivatives.credit(account, amount)?;
            warn!(account = %account, amount = %returned, "reserve payout refused, burn reverted");
            return Err(ContinuumError::transfer_failed(
                "reserve asset refused payout",
            ));
        }
        self.last_seen = Some(now);

        let recorded = self.log.record(EngineEvent::Burn(BurnEvent {
            account,
            reserve_amount: returned,
            derivative_amount: amount,
            at: now,
        }));
        info!(
            account = %account,
            burned = %amount,
            returned = %returned,
            seq = recorded.sequence,
            "burn committed"
        );
        Ok(returned)
    }

    // =================================================================
    // Read-only
    // =================================================================

    /// Derivative a deposit would mint against the current state.
    pub fn quote_mint(&self, deposit: U256) -> Result<U256> {
        let minted = self.reserve.quote_mint(deposit)?;
        debug!(deposit = %deposit, minted = %minted, "mint quoted");
        Ok(minted)
    }

    /// Reserve a burn would return against the current state.
    pub fn quote_burn(&self, amount: U256) -> Result<U256> {
        let returned = self.reserve.quote_burn(amount)?;
        debug!(amount = %amount, returned = %returned, "burn quoted");
        Ok(returned)
    }

    #[must_use]
    pub fn curve_state(&self) -> CurveState {
        self.reserve.state()
    }

    /// Reserve units per whole derivative token at the margin.
    pub fn spot_price(&self) -> Result<U256> {
        bonding_curve::spot_price(&self.reserve.state())
    }

    #[must_use]
    pub fn balance_of(&self, account: &AccountId) -> U256 {
        self.derivatives.balance_of(account)
    }

    #[must_use]
    pub fn last_mint_at(&self, account: &AccountId) -> Option<DateTime<Utc>> {
        self.cooldowns.last_mint_at(account)
    }

    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        self.log.events()
    }

    #[must_use]
    pub fn audit_root(&self) -> [u8; 32] {
        self.log.root()
    }

    #[must_use]
    pub fn owner(&self) -> AccountId {
        self.ownership.owner()
    }

    #[must_use]
    pub fn pending_owner(&self) -> Option<AccountId> {
        self.ownership.pending_owner()
    }

    #[must_use]
    pub fn is_banned(&self, account: &AccountId) -> bool {
        self.denylist.is_banned(account)
    }

    #[must_use]
    pub fn custody(&self) -> AccountId {
        self.custody
    }

    #[must_use]
    pub fn reserve_ledger(&self) -> &ReserveLedger {
        &self.reserve
    }

    #[must_use]
    pub fn asset(&self) -> &A {
        &self.asset
    }

    pub fn asset_mut(&mut self) -> &mut A {
        &mut self.asset
    }

    // =================================================================
    // Holder transfers
    // =================================================================

    /// Move derivative between holders. Neither side may be banned.
    ///
    /// A position still inside its cooldown cannot change hands; the
    /// recipient's own cooldown record is never touched.
    ///
    /// # Errors
    /// - `ClockRegression` if `now` is earlier than a committed call
    /// - `AccountBanned` if either side is on the denylist
    /// - `CooldownActive` if `from` minted less than a cooldown ago
    /// - `InsufficientBalance` if `from` holds less than `amount`
    pub fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: U256,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.check_clock(now)?;
        self.denylist.ensure_transfer_allowed(from, to)?;
        self.ensure_settled(from, now)?;
        self.derivatives.transfer(from, to, amount)?;
        self.last_seen = Some(now);
        self.log.record(EngineEvent::Transfer { from, to, amount });
        debug!(from = %from, to = %to, amount = %amount, "derivative transferred");
        Ok(())
    }

    /// Forced transfer by the override authority. Ignores the denylist but
    /// not the sender's cooldown.
    pub fn override_transfer(
        &mut self,
        caller: AccountId,
        from: AccountId,
        to: AccountId,
        amount: U256,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.authority.ensure_authorized(caller)?;
        self.check_clock(now)?;
        self.ensure_settled(from, now)?;
        self.derivatives.transfer(from, to, amount)?;
        self.last_seen = Some(now);
        self.log.record(EngineEvent::OverrideTransfer {
            authority: caller,
            from,
            to,
            amount,
        });
        info!(authority = %caller, from = %from, to = %to, amount = %amount, "override transfer");
        Ok(())
    }

    // =================================================================
    // Owner administration
    // =================================================================

    /// Change the mint-to-burn dwell time. Applies to existing records.
    pub fn set_cooldown(&mut self, caller: AccountId, cooldown: Duration) -> Result<()> {
        self.ownership.ensure_owner(caller)?;
        if cooldown < Duration::zero() {
            return Err(ContinuumError::invalid_amount(
                "cooldown must not be negative",
            ));
        }
        let old = std::mem::replace(&mut self.cooldown, cooldown);
        self.log.record(EngineEvent::CooldownChanged {
            old_secs: old.num_seconds(),
            new_secs: cooldown.num_seconds(),
        });
        info!(
            old_secs = old.num_seconds(),
            new_secs = cooldown.num_seconds(),
            "cooldown changed"
        );
        Ok(())
    }

    /// Add `account` to the denylist. Returns `false` if already listed.
    pub fn ban(&mut self, caller: AccountId, account: AccountId) -> Result<bool> {
        self.ownership.ensure_owner(caller)?;
        let added = self.denylist.ban(account);
        if added {
            self.log.record(EngineEvent::AccountBanned { account });
        }
        Ok(added)
    }

    /// Remove `account` from the denylist. Returns `false` if not listed.
    pub fn unban(&mut self, caller: AccountId, account: AccountId) -> Result<bool> {
        self.ownership.ensure_owner(caller)?;
        let removed = self.denylist.unban(account);
        if removed {
            self.log.record(EngineEvent::AccountUnbanned { account });
        }
        Ok(removed)
    }

    pub fn transfer_ownership(&mut self, caller: AccountId, new_owner: AccountId) -> Result<()> {
        self.ownership.transfer_ownership(caller, new_owner)?;
        self.log.record(EngineEvent::OwnershipTransferStarted {
            owner: caller,
            pending: new_owner,
        });
        Ok(())
    }

    pub fn accept_ownership(&mut self, caller: AccountId) -> Result<()> {
        let previous = self.ownership.accept_ownership(caller)?;
        self.log.record(EngineEvent::OwnershipTransferred {
            previous,
            owner: caller,
        });
        Ok(())
    }

    pub fn cancel_ownership_transfer(&mut self, caller: AccountId) -> Result<()> {
        self.ownership.cancel_transfer(caller)
    }

    // =================================================================
    // Invariant checks
    // =================================================================

    /// Reserve conservation plus custody coverage on the asset ledger.
    ///
    /// # Errors
    /// `ReserveConservationViolation` if the ledger history does not add up
    /// or custody holds less than the tracked reserve.
    pub fn verify_reserve(&self) -> Result<()> {
        self.reserve.verify_conservation()?;
        let tracked = self.reserve.state().reserve_balance;
        let held = self.asset.balance_of(self.custody);
        if held < tracked {
            return Err(ContinuumError::ReserveConservationViolation {
                reason: format!("custody holds {held}, ledger tracks {tracked}"),
            });
        }
        Ok(())
    }

    /// Holder balances must add up to the curve's total supply.
    ///
    /// # Errors
    /// `CurveInvariantViolation` on mismatch.
    pub fn verify_supply(&self) -> Result<()> {
        let issued = self.derivatives.total_issued();
        let supply = self.reserve.state().total_supply;
        if issued != supply {
            return Err(ContinuumError::CurveInvariantViolation {
                reason: format!("holders hold {issued}, curve supply is {supply}"),
            });
        }
        Ok(())
    }

    // =================================================================
    // Internals
    // =================================================================

    fn check_clock(&self, now: DateTime<Utc>) -> Result<()> {
        match self.last_seen {
            Some(last_seen) if now < last_seen => {
                Err(ContinuumError::ClockRegression { now, last_seen })
            }
            _ => Ok(()),
        }
    }

    /// The account's last mint is at least a cooldown old.
    fn ensure_settled(&self, account: AccountId, now: DateTime<Utc>) -> Result<()> {
        self.cooldowns
            .check_burn_allowed(account, now, self.cooldown)
            .inspect_err(|e| {
                warn!(account = %account, error = %e, "position inside cooldown rejected");
            })
    }

    /// Best-effort return of a deposit the ledger would not accept.
    fn refund(&mut self, account: AccountId, deposit: U256) {
        if !self.asset.transfer_out(self.custody, account, deposit) {
            warn!(account = %account, deposit = %deposit, "refund of rejected deposit failed");
        }
    }
}
