// league-core: leveraged virtual-balance trading competition engine.
// accounting-first architecture: margin math, liquidation, and rank-weighted
// payouts take priority. all computation is deterministic with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: ids, Side, Price, Quote, Leverage, entity keys
//   2.x  math.rs: fixed-point notional / pnl / average-price helpers
//   3.x  participant.rs: per-league margin account, equity, volume
//   4.x  position.rs: position struct, open/increase/reduce transitions
//   5.x  leaderboard.rs: bounded top-K rankings, delegation tag
//   7.x  config.rs: protocol singleton: admin, fee bps, treasury, delegate
//   8.x  engine/: coordinator: lifecycle, trading, refresh, claims
//   9.x  oracle.rs: price ingestion seam (host pushes reads)
//   9.2  token.rs: fungible token ledger seam (deposits, payouts)
//   10.x league.rs: league entity and status machine
//   11.x events.rs: state transition events for audit
//   12.x market.rs: admin-curated market registry

// core accounting modules
pub mod engine;
pub mod leaderboard;
pub mod league;
pub mod market;
pub mod math;
pub mod participant;
pub mod position;
pub mod types;

// protocol and audit modules
pub mod config;
pub mod events;

// collaborator seams
pub mod oracle;
pub mod token;

// re exports for convenience
pub use config::*;
pub use engine::*;
pub use events::*;
pub use leaderboard::*;
pub use league::*;
pub use market::*;
pub use math::*;
pub use oracle::*;
pub use participant::*;
pub use position::*;
pub use token::*;
pub use types::*;
