//! Share balances and per-deposit vesting lots.
//!
//! Callers settle rewards (`rewards::settle`) on every position passed in here
//! before calling a mutating function; the ledger itself never touches reward
//! state.

use anchor_lang::prelude::*;

use crate::{
    constants::MAX_LOTS,
    engine::schedule::{fully_vested, redeemable, vested_since},
    error::{limit_exceeded, VaultError},
    state::{Lot, Position, RewardVault},
};

pub fn balance_of(position: &Position) -> u64 {
    position.share_balance
}

pub fn total_shares(vault: &RewardVault) -> u64 {
    vault.total_shares
}

/// Shares of the position that could be burned right now.
pub fn unlocked_shares(vault: &RewardVault, position: &Position, now: i64) -> u64 {
    position
        .lots
        .iter()
        .map(|lot| redeemable(lot, now, vault.cliff, vault.unlock_duration))
        .fold(0u64, |acc, x| acc.saturating_add(x))
}

/// Credit `amount` shares to the position as a new lot vesting from `timestamp`.
pub fn mint(
    vault: &mut RewardVault,
    position: &mut Position,
    amount: u64,
    timestamp: i64,
) -> Result<()> {
    credit(vault, position, amount, timestamp, timestamp)
}

/// Add a lot stamped `deposit_time`, compacting the position as of `now`.
///
/// A lot that is already fully vested at `now` joins the vested front lot.
fn credit(
    vault: &mut RewardVault,
    position: &mut Position,
    amount: u64,
    deposit_time: i64,
    now: i64,
) -> Result<()> {
    require!(amount > 0, VaultError::ZeroShares);

    compact(vault, position, now);

    let (cliff, unlock_duration) = (vault.cliff, vault.unlock_duration);
    let incoming = Lot::new(amount, deposit_time);
    let front_vested = position
        .lots
        .first()
        .is_some_and(|lot| fully_vested(lot, now, cliff, unlock_duration));

    if front_vested && fully_vested(&incoming, now, cliff, unlock_duration) {
        let front = &mut position.lots[0];
        front.deposit_time = front.deposit_time.min(deposit_time);
        front.amount = front.amount.checked_add(amount).ok_or(VaultError::MathOverflow)?;
    } else {
        insert_lot(position, incoming)?;
    }

    position.share_balance = position
        .share_balance
        .checked_add(amount)
        .ok_or(VaultError::MathOverflow)?;
    vault.total_shares = vault
        .total_shares
        .checked_add(amount)
        .ok_or(VaultError::MathOverflow)?;

    Ok(())
}

fn insert_lot(position: &mut Position, incoming: Lot) -> Result<()> {
    // keep lots sorted by deposit time, oldest first
    let index = position
        .lots
        .partition_point(|lot| lot.deposit_time < incoming.deposit_time);
    match position.lots.get_mut(index) {
        Some(lot) if lot.deposit_time == incoming.deposit_time => {
            lot.amount = lot
                .amount
                .checked_add(incoming.amount)
                .ok_or(VaultError::MathOverflow)?;
        }
        _ => {
            require!(position.lots.len() < MAX_LOTS, VaultError::TooManyLots);
            position.lots.insert(index, incoming);
        }
    }
    Ok(())
}

/// Burn `amount` unlocked shares, consuming the oldest lots first.
///
/// A partially consumed lot keeps its deposit time.
pub fn burn(vault: &mut RewardVault, position: &mut Position, amount: u64, now: i64) -> Result<()> {
    let available = unlocked_shares(vault, position, now);
    if amount > available {
        return Err(limit_exceeded(
            VaultError::InsufficientUnlockedShares,
            position.owner,
            amount,
            available,
        ));
    }

    let mut remaining = amount;
    for lot in position.lots.iter_mut() {
        if remaining == 0 {
            break;
        }
        let take = redeemable(lot, now, vault.cliff, vault.unlock_duration).min(remaining);
        lot.redeemed = lot.redeemed.checked_add(take).ok_or(VaultError::MathOverflow)?;
        remaining -= take;
    }
    position.lots.retain(|lot| lot.remaining() > 0);

    position.share_balance = position
        .share_balance
        .checked_sub(amount)
        .ok_or(VaultError::MathOverflow)?;
    vault.total_shares = vault
        .total_shares
        .checked_sub(amount)
        .ok_or(VaultError::MathOverflow)?;

    Ok(())
}

/// Move unlocked shares between positions. The recipient's lot is already
/// fully vested, so the shares stay redeemable after the transfer.
pub fn transfer(
    vault: &mut RewardVault,
    from: &mut Position,
    to: &mut Position,
    amount: u64,
    now: i64,
) -> Result<()> {
    require!(amount > 0, VaultError::ZeroShares);

    burn(vault, from, amount, now)?;
    let vested = vested_since(now, vault.cliff, vault.unlock_duration);
    credit(vault, to, amount, vested, now)
}

/// Merge every fully vested lot into a single lot at the front.
fn compact(vault: &RewardVault, position: &mut Position, now: i64) {
    let (vested, vesting): (Vec<Lot>, Vec<Lot>) = position
        .lots
        .iter()
        .copied()
        .filter(|lot| lot.remaining() > 0)
        .partition(|lot| fully_vested(lot, now, vault.cliff, vault.unlock_duration));

    if vested.len() <= 1 && vesting.len() + vested.len() == position.lots.len() {
        return;
    }

    let mut lots = Vec::with_capacity(vesting.len() + 1);
    if let Some(earliest) = vested.iter().map(|lot| lot.deposit_time).min() {
        let amount = vested.iter().map(Lot::remaining).sum();
        lots.push(Lot::new(amount, earliest));
    }
    lots.extend(vesting);
    position.lots = lots;
}
