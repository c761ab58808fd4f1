//! Integration test: sandwich defense
//!
//! An attacker mints right before other large mints and tries to burn
//! right after at the raised price. The cooldown must hold the back-run
//! leg until the window has passed.

use chrono::{DateTime, Duration, Utc};
use continuum_engine::{ContinuousTokenEngine, InMemoryReserveAsset};
use continuum_types::*;

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

fn engine() -> ContinuousTokenEngine<InMemoryReserveAsset> {
    let custody = AccountId::from_label("custody");
    let mut asset = InMemoryReserveAsset::new();
    asset.mint_to(custody, tokens(10));
    let config = EngineConfig::linear(tokens(10), tokens(10), owner(), custody);
    ContinuousTokenEngine::new(&config, asset).unwrap()
}

fn fund(engine: &mut ContinuousTokenEngine<InMemoryReserveAsset>, who: AccountId, n: u64) {
    let custody = engine.custody();
    let asset = engine.asset_mut();
    asset.mint_to(who, tokens(n));
    asset.approve(who, custody, tokens(n));
}

struct Actors {
    attacker: AccountId,
    victim_a: AccountId,
    victim_b: AccountId,
}

/// Attacker mints 10, two victims mint 100 each, all within three seconds.
fn front_run(engine: &mut ContinuousTokenEngine<InMemoryReserveAsset>) -> (Actors, U256) {
    let actors = Actors {
        attacker: AccountId::from_label("attacker"),
        victim_a: AccountId::from_label("victim-a"),
        victim_b: AccountId::from_label("victim-b"),
    };
    fund(engine, actors.attacker, 10);
    fund(engine, actors.victim_a, 100);
    fund(engine, actors.victim_b, 100);

    let price_before = engine.spot_price().unwrap();
    let position = engine.mint(actors.attacker, tokens(10), at(0)).unwrap();
    engine.mint(actors.victim_a, tokens(100), at(1)).unwrap();
    engine.mint(actors.victim_b, tokens(100), at(2)).unwrap();
    assert!(engine.spot_price().unwrap() > price_before);
    (actors, position)
}

#[test]
fn back_run_blocked_inside_window() {
    init_tracing();
    let mut engine = engine();
    let (actors, position) = front_run(&mut engine);

    let before = engine.curve_state();
    for secs in [3, 60, 899] {
        let err = engine.burn(actors.attacker, position, at(secs)).unwrap_err();
        assert!(
            matches!(err, ContinuumError::CooldownActive { account, .. } if account == actors.attacker),
            "burn at t={secs}s should be blocked, got {err}"
        );
    }
    assert_eq!(engine.curve_state(), before);
    assert_eq!(engine.balance_of(&actors.attacker), position);
}

#[test]
fn burn_after_window_reflects_intervening_mints() {
    init_tracing();
    let mut engine = engine();
    let (actors, position) = front_run(&mut engine);

    let quoted = engine.quote_burn(position).unwrap();
    let returned = engine
        .burn(actors.attacker, position, at(0) + Duration::minutes(15))
        .unwrap();
    assert_eq!(returned, quoted);
    // Two 100-token mints lifted the price well above the attacker's entry.
    assert!(returned > tokens(10));
    engine.verify_reserve().unwrap();
    engine.verify_supply().unwrap();

    // Victims are held to the same window as everyone else.
    let victim_position = engine.balance_of(&actors.victim_a);
    assert!(
        engine
            .burn(actors.victim_a, victim_position, at(900))
            .is_err()
    );
    engine
        .burn(actors.victim_a, victim_position, at(901))
        .unwrap();
    assert!(engine.balance_of(&actors.victim_b) > U256::zero());
}

#[test]
fn without_cooldown_the_sandwich_pays() {
    init_tracing();
    let mut engine = engine();
    engine.set_cooldown(owner(), Duration::zero()).unwrap();
    let (actors, position) = front_run(&mut engine);

    let returned = engine.burn(actors.attacker, position, at(3)).unwrap();
    assert!(returned > tokens(10), "unguarded back-run should profit");
}

#[test]
fn cooldown_keys_on_own_mints_only() {
    init_tracing();
    let mut engine = engine();
    let (_actors, _) = front_run(&mut engine);

    // The seeded owner never minted, so nothing holds its burn back.
    assert!(engine.last_mint_at(&owner()).is_none());
    let returned = engine.burn(owner(), tokens(1), at(3)).unwrap();
    assert!(returned > U256::zero());
}
