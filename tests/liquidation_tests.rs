//! Liquidation and PnL marking invariants at the engine level.

use league_core::*;

const USDC: TokenId = TokenId(1);
const SOL_FEED: FeedId = FeedId(1);
const ETH_FEED: FeedId = FeedId(2);
const ADMIN: UserId = UserId(1);
const CREATOR: UserId = UserId(2);
const TRADER: UserId = UserId(10);
const DECIMALS: u8 = 6;

fn bootstrap() -> (Engine, LeagueKey) {
    let mut engine = Engine::new(EngineConfig::default());
    engine.set_time(Timestamp::from_secs(1_000));
    let treasury = engine.create_token_account(USDC);
    engine
        .initialize(ADMIN, Bps::zero(), treasury, ADMIN)
        .unwrap();
    for (symbol, feed) in [("SOL/USDC", SOL_FEED), ("ETH/USDC", ETH_FEED)] {
        engine
            .list_market(
                ADMIN,
                Symbol::new(symbol),
                feed,
                USDC,
                DECIMALS,
                Leverage::new(20).unwrap(),
            )
            .unwrap();
    }

    let league = engine
        .create_league(
            CREATOR,
            0,
            LeagueParams {
                markets: vec![SOL_FEED, ETH_FEED],
                start_ts: Timestamp::from_secs(2_000),
                end_ts: Timestamp::from_secs(10_000),
                entry_token: USDC,
                entry_amount: 100,
                metadata_uri: String::new(),
                max_participants: 10,
                virtual_on_join: Quote::new(10_000_000_000), // $10k
                max_leverage: Leverage::new(10).unwrap(),
                k: 3,
            },
        )
        .unwrap();
    engine.start_league(CREATOR, league).unwrap();

    let wallet = engine.create_token_account(USDC);
    engine.mint_tokens(wallet, 1_000).unwrap();
    engine.join_league(TRADER, league, wallet, 100).unwrap();

    set_price(&mut engine, SOL_FEED, 100_000_000);
    set_price(&mut engine, ETH_FEED, 3_000_000_000);
    (engine, league)
}

fn set_price(engine: &mut Engine, feed: FeedId, price: i64) {
    let now = engine.time();
    engine.publish_price(feed, PriceQuote::new(Price::new_unchecked(price), DECIMALS, now));
}

fn lev(v: u8) -> Leverage {
    Leverage::new(v).unwrap()
}

#[test]
fn pnl_marking_reference_figures() {
    // entry 100_000_000, size 1_000_000, decimals 6, mark 110_000_000
    // => long +10_000_000, short -10_000_000
    let (mut engine, league) = bootstrap();
    engine
        .open_position(TRADER, league, SOL_FEED, Side::Long, 1_000_000, lev(5), 0)
        .unwrap();
    engine
        .open_position(TRADER, league, SOL_FEED, Side::Short, 1_000_000, lev(5), 1)
        .unwrap();

    set_price(&mut engine, SOL_FEED, 110_000_000);
    engine.refresh_participant(league, TRADER).unwrap();

    let long = engine
        .get_position(league.participant(TRADER).position(0))
        .unwrap();
    let short = engine
        .get_position(league.participant(TRADER).position(1))
        .unwrap();
    assert_eq!(long.unrealized_pnl.value(), 10_000_000);
    assert_eq!(short.unrealized_pnl.value(), -10_000_000);

    // the two legs cancel at the account level
    let participant = engine.get_participant(league, TRADER).unwrap();
    assert_eq!(participant.unrealized_pnl.value(), 0);
}

#[test]
fn liquidation_sweeps_across_markets() {
    let (mut engine, league) = bootstrap();
    // $6000 long SOL and $6000 long ETH at 10x
    engine
        .open_position(TRADER, league, SOL_FEED, Side::Long, 60_000_000, lev(10), 0)
        .unwrap();
    engine
        .open_position(TRADER, league, ETH_FEED, Side::Long, 2_000_000, lev(10), 1)
        .unwrap();

    // both legs collapse; combined loss far exceeds the virtual balance
    set_price(&mut engine, SOL_FEED, 1_000_000);
    set_price(&mut engine, ETH_FEED, 30_000_000);
    let result = engine.refresh_participant(league, TRADER).unwrap();

    assert!(result.liquidated);
    assert_eq!(result.closed_positions.len(), 2);

    let participant = engine.get_participant(league, TRADER).unwrap();
    assert_eq!(participant.used_margin.value(), 0);
    assert_eq!(participant.unrealized_pnl.value(), 0);
    assert!(participant.open_positions.is_empty());
    for seq in [0u64, 1] {
        let position = engine
            .get_position(league.participant(TRADER).position(seq))
            .unwrap();
        assert_eq!(position.size, 0);
        assert!(position.closed_at.is_some());
    }
}

#[test]
fn liquidation_never_fires_while_solvent() {
    let (mut engine, league) = bootstrap();
    engine
        .open_position(TRADER, league, SOL_FEED, Side::Long, 60_000_000, lev(10), 0)
        .unwrap();

    // a drawdown that keeps equity positive: lose 60 * $90 = $5400 of $10k
    set_price(&mut engine, SOL_FEED, 10_000_000);
    let result = engine.refresh_participant(league, TRADER).unwrap();
    assert!(!result.liquidated);
    assert_eq!(result.unrealized_pnl.value(), -5_400_000_000);

    let participant = engine.get_participant(league, TRADER).unwrap();
    assert_eq!(participant.open_positions.len(), 1);
    assert!(participant.equity().value() > 0);
}

#[test]
fn liquidated_volume_counts_closing_equity() {
    let (mut engine, league) = bootstrap();
    engine
        .open_position(TRADER, league, SOL_FEED, Side::Long, 120_000_000, lev(10), 0)
        .unwrap();
    let volume_before = engine
        .get_participant(league, TRADER)
        .unwrap()
        .total_volume;
    assert_eq!(volume_before.value(), 12_000_000_000);

    set_price(&mut engine, SOL_FEED, 100_000);
    engine.refresh_participant(league, TRADER).unwrap();

    // closing 120 tokens at $0.10 adds $12 of volume
    let participant = engine.get_participant(league, TRADER).unwrap();
    assert_eq!(participant.total_volume.value(), 12_000_000_000 + 12_000_000);
}

#[test]
fn staged_decreases_equal_one_full_close() {
    // two identical worlds; the league key is deterministic so it matches
    let (mut engine_a, league) = bootstrap();
    let (mut engine_b, _) = bootstrap();

    for engine in [&mut engine_a, &mut engine_b] {
        engine
            .open_position(TRADER, league, SOL_FEED, Side::Long, 9_000_000, lev(3), 0)
            .unwrap();
        set_price(engine, SOL_FEED, 107_000_000);
    }

    // A closes in three cuts, B in one
    engine_a.decrease_position(TRADER, league, 0, 3_000_000).unwrap();
    engine_a.decrease_position(TRADER, league, 0, 3_000_000).unwrap();
    engine_a.decrease_position(TRADER, league, 0, 3_000_000).unwrap();
    engine_b.decrease_position(TRADER, league, 0, 9_000_000).unwrap();

    let a = engine_a.get_participant(league, TRADER).unwrap();
    let b = engine_b.get_participant(league, TRADER).unwrap();
    assert_eq!(a.virtual_balance, b.virtual_balance);
    assert_eq!(a.used_margin, b.used_margin);
    assert_eq!(a.used_margin.value(), 0);
    assert!(a.open_positions.is_empty() && b.open_positions.is_empty());

    let pos_a = engine_a
        .get_position(league.participant(TRADER).position(0))
        .unwrap();
    let pos_b = engine_b
        .get_position(league.participant(TRADER).position(0))
        .unwrap();
    assert_eq!(pos_a.closed_pnl, pos_b.closed_pnl);
    assert_eq!(pos_a.closed_size, pos_b.closed_size);
    assert!(pos_a.closed_at.is_some() && pos_b.closed_at.is_some());
}

#[test]
fn refresh_after_liquidation_is_a_clean_no_op() {
    let (mut engine, league) = bootstrap();
    engine
        .open_position(TRADER, league, SOL_FEED, Side::Long, 120_000_000, lev(10), 0)
        .unwrap();
    set_price(&mut engine, SOL_FEED, 100_000);

    let first = engine.refresh_participant(league, TRADER).unwrap();
    assert!(first.liquidated);

    let second = engine.refresh_participant(league, TRADER).unwrap();
    assert!(!second.liquidated);
    assert_eq!(second.used_margin.value(), 0);
    assert_eq!(second.unrealized_pnl.value(), 0);
    assert_eq!(second.equity, first.equity);
}
