//! Cliff + linear vesting of deposit lots.

use crate::state::Lot;

/// Shares of a lot that the schedule has released at `now`.
///
/// Zero before `deposit_time + cliff`, the full amount from
/// `deposit_time + cliff + unlock_duration`, linear (rounded down) in between.
pub fn unlocked_amount(
    amount: u64,
    deposit_time: i64,
    now: i64,
    cliff: i64,
    unlock_duration: i64,
) -> u64 {
    let vest_start = deposit_time.saturating_add(cliff);
    if now < vest_start {
        return 0;
    }

    let elapsed = now.saturating_sub(vest_start);
    if unlock_duration <= 0 || elapsed >= unlock_duration {
        return amount;
    }

    // elapsed < unlock_duration, so the quotient is strictly below `amount`
    ((amount as u128) * (elapsed as u128) / (unlock_duration as u128)) as u64
}

/// Shares of `lot` that can still be burned at `now`.
pub fn redeemable(lot: &Lot, now: i64, cliff: i64, unlock_duration: i64) -> u64 {
    unlocked_amount(lot.amount, lot.deposit_time, now, cliff, unlock_duration)
        .saturating_sub(lot.redeemed)
}

/// True once every share of the lot has vested.
pub fn fully_vested(lot: &Lot, now: i64, cliff: i64, unlock_duration: i64) -> bool {
    unlocked_amount(lot.amount, lot.deposit_time, now, cliff, unlock_duration) == lot.amount
}

/// A timestamp at which a lot deposited would already be fully vested at `now`.
pub fn vested_since(now: i64, cliff: i64, unlock_duration: i64) -> i64 {
    now.saturating_sub(cliff).saturating_sub(unlock_duration)
}
