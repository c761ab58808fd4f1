//! Integration test: full mint / burn cycle
//!
//! Seed → approve → mint → wait out the cooldown → burn, with reserve
//! conservation and the audit log checked along the way.

use chrono::{DateTime, Duration, Utc};
use continuum_engine::{ContinuousTokenEngine, InMemoryReserveAsset, ReserveAsset};
use continuum_types::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
}

fn owner() -> AccountId {
    AccountId::from_label("owner")
}

fn custody() -> AccountId {
    AccountId::from_label("custody")
}

fn dec(s: &str) -> U256 {
    U256::from_dec_str(s).unwrap()
}

/// Reserve ledger that can be told to refuse payouts.
#[derive(Default)]
struct FlakyAsset {
    inner: InMemoryReserveAsset,
    refuse_out: bool,
}

impl ReserveAsset for FlakyAsset {
    fn transfer_in(&mut self, from: AccountId, to: AccountId, amount: U256) -> bool {
        self.inner.transfer_in(from, to, amount)
    }

    fn transfer_out(&mut self, from: AccountId, to: AccountId, amount: U256) -> bool {
        !self.refuse_out && self.inner.transfer_out(from, to, amount)
    }

    fn allowance(&self, owner: AccountId, spender: AccountId) -> U256 {
        self.inner.allowance(owner, spender)
    }

    fn balance_of(&self, account: AccountId) -> U256 {
        self.inner.balance_of(account)
    }
}

fn linear_engine() -> ContinuousTokenEngine<FlakyAsset> {
    let mut asset = FlakyAsset::default();
    asset.inner.mint_to(custody(), tokens(10));
    let config = EngineConfig::linear(tokens(10), tokens(10), owner(), custody());
    ContinuousTokenEngine::new(&config, asset).unwrap()
}

fn fund(engine: &mut ContinuousTokenEngine<FlakyAsset>, who: AccountId, amount: U256) {
    let custody = engine.custody();
    let asset = &mut engine.asset_mut().inner;
    asset.mint_to(who, amount);
    let allowance = asset.allowance(who, custody) + amount;
    asset.approve(who, custody, allowance);
}

#[test]
fn linear_curve_mint_matches_closed_form() {
    init_tracing();
    let mut engine = linear_engine();
    let alice = AccountId::from_label("alice");
    fund(&mut engine, alice, tokens(100));

    let minted = engine.mint(alice, tokens(100), at(0)).unwrap();

    // S * sqrt(1 + D/R) - S = 10 * sqrt(11) - 10
    let closed = (tokens(10) * tokens(10) * U256::from(11u64)).integer_sqrt() - tokens(10);
    assert_eq!(minted, dec("23166247903553998491"));
    assert!(closed - minted <= closed >> 32usize);

    let state = engine.curve_state();
    assert_eq!(state.total_supply, tokens(10) + minted);
    assert_eq!(state.reserve_balance, tokens(110));
    engine.verify_reserve().unwrap();
    engine.verify_supply().unwrap();
}

#[test]
fn burn_waits_for_cooldown_then_pays_quote() {
    init_tracing();
    let mut engine = linear_engine();
    let alice = AccountId::from_label("alice");
    fund(&mut engine, alice, tokens(100));
    let minted = engine.mint(alice, tokens(100), at(0)).unwrap();

    let err = engine.burn(alice, minted, at(0)).unwrap_err();
    assert!(matches!(
        err,
        ContinuumError::CooldownActive { account, ready_at }
            if account == alice && ready_at == at(900)
    ));
    assert_eq!(err.code(), "CT_ERR_300");

    let quoted = engine.quote_burn(minted).unwrap();
    let returned = engine
        .burn(alice, minted, at(0) + Duration::minutes(15))
        .unwrap();
    assert_eq!(returned, quoted);
    assert!(returned <= tokens(100), "round trip must not profit");
    assert_eq!(engine.balance_of(&alice), U256::zero());
    assert_eq!(engine.asset().balance_of(alice), returned);
    engine.verify_reserve().unwrap();
    engine.verify_supply().unwrap();
}

#[test]
fn overdrawn_burn_leaves_state_unchanged() {
    init_tracing();
    let mut engine = linear_engine();
    let alice = AccountId::from_label("alice");
    fund(&mut engine, alice, tokens(100));
    let minted = engine.mint(alice, tokens(100), at(0)).unwrap();

    let before = engine.curve_state();
    let events_before = engine.events().len();
    let root_before = engine.audit_root();

    let err = engine
        .burn(alice, minted + U256::one(), at(10_000))
        .unwrap_err();
    assert!(matches!(
        err,
        ContinuumError::InsufficientBalance { needed, available }
            if needed == minted + U256::one() && available == minted
    ));
    assert_eq!(engine.curve_state(), before);
    assert_eq!(engine.balance_of(&alice), minted);
    assert_eq!(engine.events().len(), events_before);
    assert_eq!(engine.audit_root(), root_before);
}

#[test]
fn refused_payout_restores_everything() {
    init_tracing();
    let mut engine = linear_engine();
    let alice = AccountId::from_label("alice");
    fund(&mut engine, alice, tokens(50));
    let minted = engine.mint(alice, tokens(50), at(0)).unwrap();

    let before = engine.curve_state();
    let ledger_before = engine.reserve_ledger().clone();
    engine.asset_mut().refuse_out = true;

    let err = engine.burn(alice, minted, at(1_000)).unwrap_err();
    assert!(matches!(err, ContinuumError::TransferFailed { .. }));
    assert_eq!(engine.curve_state(), before);
    assert_eq!(engine.reserve_ledger(), &ledger_before);
    assert_eq!(engine.balance_of(&alice), minted);
    assert_eq!(engine.events().len(), 1);

    engine.asset_mut().refuse_out = false;
    engine.burn(alice, minted, at(1_000)).unwrap();
    engine.verify_reserve().unwrap();
}

#[test]
fn audit_log_replays_to_same_root() {
    init_tracing();
    let mut engine = linear_engine();
    let alice = AccountId::from_label("alice");
    let bob = AccountId::from_label("bob");
    fund(&mut engine, alice, tokens(20));
    let minted = engine.mint(alice, tokens(20), at(0)).unwrap();
    engine
        .transfer(alice, bob, minted / U256::from(2u64), at(900))
        .unwrap();
    engine.ban(owner(), AccountId::from_label("mallory")).unwrap();

    let kinds: Vec<EventKind> = engine.events().iter().map(|r| r.event.kind()).collect();
    assert_eq!(
        kinds,
        vec![EventKind::Mint, EventKind::Transfer, EventKind::AccountBanned]
    );

    let replay: Vec<EngineEvent> = engine.events().iter().map(|r| r.event.clone()).collect();
    assert!(continuum_engine::verify_audit_root(
        &replay,
        &engine.audit_root()
    ));

    let json = serde_json::to_string(engine.events()).unwrap();
    let back: Vec<RecordedEvent> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, engine.events());
}

#[test]
fn engine_from_json_config() {
    init_tracing();
    let raw = serde_json::json!({
        "reserve_ratio_ppm": 200_000,
        "cooldown_secs": 60,
        "initial_supply": "1000000000000000000000",
        "initial_reserve": "500000000000000000000",
        "owner": owner(),
        "custody": custody(),
        "override_authority": owner()
    })
    .to_string();
    let config = EngineConfig::from_json(&raw).unwrap();
    let mut asset = InMemoryReserveAsset::new();
    asset.mint_to(custody(), config.initial_reserve);
    let engine = ContinuousTokenEngine::new(&config, asset).unwrap();

    assert_eq!(engine.cooldown(), Duration::seconds(60));
    assert_eq!(engine.curve_state().reserve_ratio_ppm, 200_000);
    // 500 / (1000 * 0.2) = 2.5 reserve per token
    assert_eq!(
        engine.spot_price().unwrap(),
        dec("2500000000000000000")
    );
}

#[test]
fn random_sequences_conserve_reserve() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(0x5EED);

    for ratio in [100_000u32, 333_333, 500_000, 1_000_000] {
        let mut asset = FlakyAsset::default();
        asset.inner.mint_to(custody(), tokens(1_000));
        let mut config = EngineConfig::linear(tokens(1_000), tokens(1_000), owner(), custody());
        config.reserve_ratio_ppm = ratio;
        let mut engine = ContinuousTokenEngine::new(&config, asset).unwrap();

        let holders: Vec<AccountId> = (0..5).map(|_| AccountId::random()).collect();
        let mut clock = 0i64;

        for _ in 0..200 {
            clock += rng.gen_range(0..600);
            let who = holders[rng.gen_range(0..holders.len())];
            let before = engine.curve_state();

            let outcome = if rng.gen_bool(0.5) {
                let deposit = U256::from(rng.gen_range(1u128..=50 * 10u128.pow(18)));
                fund(&mut engine, who, deposit);
                engine.mint(who, deposit, at(clock)).map(|_| ())
            } else {
                let held = engine.balance_of(&who);
                if held.is_zero() {
                    continue;
                }
                let amount = held / U256::from(rng.gen_range(1u64..=4)) + U256::one();
                engine.burn(who, amount.min(held), at(clock)).map(|_| ())
            };

            if outcome.is_err() {
                assert_eq!(engine.curve_state(), before, "failed call mutated state");
            }
            engine.verify_reserve().unwrap();
            engine.verify_supply().unwrap();
        }
    }
}
