/// Maximum serialized block size, in bytes.
pub const BLOCK_SIZE_LIMIT: usize = 1_000_000;

/// Seconds between blocks the target adjustment aims for.
pub const BLOCK_FREQUENCY: u64 = 600;

/// Blocks this far ahead of the wall clock are deferred, not rejected.
pub const FUTURE_THRESHOLD: u64 = 3 * 60 * 60;

/// Blocks this far ahead of the wall clock are rejected outright.
pub const EXTREME_FUTURE_THRESHOLD: u64 = 6 * 60 * 60;

/// Number of ancestor timestamps the earliest-child-timestamp median is taken over.
pub const MEDIAN_TIMESTAMP_WINDOW: usize = 11;

/// Number of blocks before a delayed output enters the live set.
pub const MATURITY_DELAY: u64 = 50;

/// Total number of siafunds in existence.
pub const SIAFUND_COUNT: u64 = 10_000;

/// Portion of a file contract payout accrued to the siafund pool: payout / divisor.
pub const SIAFUND_FEE_DIVISOR: u64 = 25;

/// Base units per coin.
pub const COIN_PRECISION: u64 = 1_000_000;

/// Coinbase of the genesis block, in coins. Decays by one per block.
pub const INITIAL_COINBASE: u64 = 300_000;

/// Coinbase floor, in coins.
pub const MINIMUM_COINBASE: u64 = 30_000;
