//! Shared, refreshable rate snapshots.

mod board;

pub use board::RateBoard;
