pub const VAULT_SEED: &[u8] = b"vault";
pub const POSITION_SEED: &[u8] = b"position";
pub const DEPOSIT_REQUEST_SEED: &[u8] = b"deposit_request";
pub const REDEEM_REQUEST_SEED: &[u8] = b"redeem_request";

/// Fixed-point scale of the cumulative reward-per-share index.
pub const REWARD_PRECISION: u128 = 1_000_000_000_000_000_000;

pub const MAX_REWARD_TOKENS: usize = 8;
pub const MAX_LOTS: usize = 16;
pub const MAX_OPERATORS: usize = 4;

/// Upper bound for cliff, unlock duration and shares lock time (10 years).
pub const MAX_LOCK_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;
