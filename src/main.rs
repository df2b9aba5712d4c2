//! Trading League Core Simulation.
//!
//! Walks the full competition lifecycle: protocol bootstrap, market listing,
//! league creation and joins, leveraged trading with PnL marking, a liquidation
//! cascade, and rank-weighted reward claims.

use league_core::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const USDC: TokenId = TokenId(1);
const SOL_FEED: FeedId = FeedId(1);
const ETH_FEED: FeedId = FeedId(2);
const ADMIN: UserId = UserId(1);
const CREATOR: UserId = UserId(2);
const DECIMALS: u8 = 6;

fn main() {
    println!("Trading League Core Engine Simulation");
    println!("Virtual Balances, Oracle Pricing, Top-K Rewards\n");

    scenario_1_bootstrap_and_listing();
    scenario_2_league_lifecycle();
    scenario_3_trading_and_pnl();
    scenario_4_liquidation_cascade();
    scenario_5_rewards();

    println!("\nAll simulations completed successfully.");
}

fn usd(raw: Quote) -> Decimal {
    Decimal::new(raw.value(), DECIMALS as u32)
}

fn publish(engine: &mut Engine, feed: FeedId, price: Decimal) {
    let now = engine.time();
    let quote = PriceQuote::from_decimal(price, DECIMALS, now).expect("positive price");
    engine.publish_price(feed, quote);
}

fn bootstrap() -> Engine {
    let mut engine = Engine::new(EngineConfig::default());
    engine.set_time(Timestamp::from_secs(1_000));

    let treasury = engine.create_token_account(USDC);
    engine
        .initialize(ADMIN, Bps::new(100).expect("valid bps"), treasury, ADMIN)
        .expect("bootstrap once");

    engine
        .list_market(
            ADMIN,
            Symbol::new("SOL/USDC"),
            SOL_FEED,
            USDC,
            DECIMALS,
            Leverage::new(20).expect("valid leverage"),
        )
        .expect("list SOL");
    engine
        .list_market(
            ADMIN,
            Symbol::new("ETH/USDC"),
            ETH_FEED,
            USDC,
            DECIMALS,
            Leverage::new(10).expect("valid leverage"),
        )
        .expect("list ETH");

    publish(&mut engine, SOL_FEED, dec!(100));
    publish(&mut engine, ETH_FEED, dec!(3000));
    engine
}

fn league_terms() -> LeagueParams {
    LeagueParams {
        markets: vec![SOL_FEED, ETH_FEED],
        start_ts: Timestamp::from_secs(2_000),
        end_ts: Timestamp::from_secs(100_000),
        entry_token: USDC,
        entry_amount: 200,
        metadata_uri: "https://example.com/summer-league.json".to_string(),
        max_participants: 50,
        virtual_on_join: Quote::new(10_000_000_000), // $10,000 paper
        max_leverage: Leverage::new(10).expect("valid leverage"),
        k: 3,
    }
}

fn join(engine: &mut Engine, league: LeagueKey, user: UserId) -> TokenAccount {
    let wallet = engine.create_token_account(USDC);
    engine.mint_tokens(wallet, 1_000).expect("faucet");
    engine.join_league(user, league, wallet, 200).expect("join");
    wallet
}

/// Protocol bootstrap and admin-gated market listing.
fn scenario_1_bootstrap_and_listing() {
    println!("Scenario 1: Bootstrap and Market Listing\n");

    let engine = bootstrap();
    let sol = engine.get_market(SOL_FEED).expect("SOL listed");
    let eth = engine.get_market(ETH_FEED).expect("ETH listed");

    println!("  Listed {} (max {})", sol.symbol, sol.max_leverage);
    println!("  Listed {} (max {})", eth.symbol, eth.max_leverage);
    println!("  Oracle: SOL at $100, ETH at $3000\n");
}

/// League creation, permissioned start, entry deposits.
fn scenario_2_league_lifecycle() {
    println!("Scenario 2: League Lifecycle\n");

    let mut engine = bootstrap();
    let league = engine
        .create_league(CREATOR, 0, league_terms())
        .expect("create league");

    println!("  League created (entry 200 USDC, $10,000 virtual, K=3)");

    engine.start_league(CREATOR, league).expect("creator starts early");
    println!("  Creator started the league before start_ts");

    for id in [10u64, 11, 12] {
        join(&mut engine, league, UserId(id));
    }
    let vault = engine.get_league(league).expect("league").reward_vault;
    println!(
        "  3 participants joined, reward vault holds {} USDC\n",
        engine.token_balance(vault)
    );
}

/// Open, increase, decrease, refresh: the accounting core.
fn scenario_3_trading_and_pnl() {
    println!("Scenario 3: Trading and PnL\n");

    let mut engine = bootstrap();
    let league = engine.create_league(CREATOR, 0, league_terms()).expect("create");
    engine.start_league(CREATOR, league).expect("start");
    let alice = UserId(10);
    join(&mut engine, league, alice);

    let lev5 = Leverage::new(5).expect("valid leverage");
    let open = engine
        .open_position(alice, league, SOL_FEED, Side::Long, 10_000_000, lev5, 0)
        .expect("open");
    println!(
        "  Alice longs 10 SOL at ${} (notional ${}, margin ${})",
        usd(Quote::new(open.entry_price.value())),
        usd(open.notional),
        usd(open.margin)
    );

    publish(&mut engine, SOL_FEED, dec!(120));
    engine.increase_position(alice, league, 0, 10_000_000).expect("increase");
    let position = engine
        .get_position(league.participant(alice).position(0))
        .expect("position");
    println!(
        "  Price rallies to $120; Alice doubles up, blended entry ${}",
        usd(Quote::new(position.entry_price.value()))
    );

    let reduced = engine
        .decrease_position(alice, league, 0, 5_000_000)
        .expect("decrease");
    println!(
        "  Alice trims 5 SOL, realizing ${}",
        usd(reduced.realized_pnl)
    );

    engine.advance_time(60);
    let refresh = engine.refresh_participant(league, alice).expect("refresh");
    println!(
        "  Refresh: equity ${}, uPnL ${}, margin ${}\n",
        usd(refresh.equity),
        usd(refresh.unrealized_pnl),
        usd(refresh.used_margin)
    );
}

/// A crash takes an over-levered account under; everything closes at once.
fn scenario_4_liquidation_cascade() {
    println!("Scenario 4: Liquidation Cascade\n");

    let mut engine = bootstrap();
    let league = engine.create_league(CREATOR, 0, league_terms()).expect("create");
    engine.start_league(CREATOR, league).expect("start");
    let bob = UserId(20);
    join(&mut engine, league, bob);

    let lev10 = Leverage::new(10).expect("valid leverage");
    engine
        .open_position(bob, league, SOL_FEED, Side::Long, 60_000_000, lev10, 0)
        .expect("open");
    engine
        .open_position(bob, league, SOL_FEED, Side::Long, 60_000_000, lev10, 1)
        .expect("open");
    println!("  Bob longs 120 SOL across two 10x positions ($12,000 notional)");

    publish(&mut engine, SOL_FEED, dec!(0.10));
    let refresh = engine.refresh_participant(league, bob).expect("refresh");
    println!(
        "  SOL collapses to $0.10; liquidated: {}, positions closed: {}",
        refresh.liquidated,
        refresh.closed_positions.len()
    );

    let bob_state = engine.get_participant(league, bob).expect("participant");
    println!(
        "  Post-liquidation equity ${}, used margin ${}\n",
        usd(bob_state.equity()),
        usd(bob_state.used_margin)
    );
}

/// Closure freezes the pool; claims follow the K-r weighting.
fn scenario_5_rewards() {
    println!("Scenario 5: Rank-Weighted Rewards\n");

    let mut engine = bootstrap();
    let league = engine.create_league(CREATOR, 0, league_terms()).expect("create");
    engine.start_league(CREATOR, league).expect("start");

    let users = [UserId(10), UserId(11), UserId(12)];
    let wallets: Vec<TokenAccount> = users
        .iter()
        .map(|&u| join(&mut engine, league, u))
        .collect();

    // spread the field: one long, one flat, one short into a rally
    let lev5 = Leverage::new(5).expect("valid leverage");
    engine
        .open_position(users[0], league, SOL_FEED, Side::Long, 10_000_000, lev5, 0)
        .expect("open");
    engine
        .open_position(users[2], league, SOL_FEED, Side::Short, 10_000_000, lev5, 0)
        .expect("open");
    publish(&mut engine, SOL_FEED, dec!(115));
    for &user in &users {
        engine.refresh_participant(league, user).expect("refresh");
    }

    engine.close_league(CREATOR, league).expect("close");
    let pool = engine.get_league(league).expect("league").reward_pool;
    println!("  League closed with a {} USDC pool", pool);

    for (&user, &wallet) in users.iter().zip(&wallets) {
        let claim = engine.claim_reward(user, league, wallet).expect("claim");
        println!(
            "  rank {} -> weight {}, share {} USDC (fee {})",
            claim.rank, claim.weight, claim.share, claim.fee
        );
    }

    let vault = engine.get_league(league).expect("league").reward_vault;
    println!("  Vault dust after all claims: {} USDC", engine.token_balance(vault));
}
