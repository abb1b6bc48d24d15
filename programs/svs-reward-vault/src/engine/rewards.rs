//! Cumulative reward-per-share accounting for any number of reward tokens.
//!
//! Each reward token carries a monotonic index (reward per share, scaled by
//! `REWARD_PRECISION`). A holder's entitlement is its share balance times the
//! index growth since its checkpoint, so `settle` must run against the
//! balance *before* it changes.

use anchor_lang::prelude::*;

use crate::{
    constants::MAX_REWARD_TOKENS,
    error::VaultError,
    math::{reward_owed, reward_per_share},
    state::{Position, RewardBalance, RewardCheckpoint, RewardToken, RewardVault},
};

/// Add `mint` to the allowlist. Registering an existing mint is a no-op.
pub fn register(vault: &mut RewardVault, mint: Pubkey, reward_account: Pubkey) -> Result<()> {
    require!(mint != vault.asset_mint, VaultError::RewardTokenIsUnderlying);

    if vault.reward_token(&mint).is_some() {
        return Ok(());
    }
    require!(
        vault.reward_tokens.len() < MAX_REWARD_TOKENS,
        VaultError::TooManyRewardTokens
    );
    vault.reward_tokens.push(RewardToken::new(mint, reward_account));
    Ok(())
}

/// Distribute `amount` of `mint` across all outstanding shares.
///
/// `can_register` lets the vault authority introduce a first-time token at
/// this call site; anyone else needs the token to be registered already.
/// Returns the index increment.
pub fn add_reward(
    vault: &mut RewardVault,
    mint: Pubkey,
    reward_account: Pubkey,
    amount: u64,
    can_register: bool,
) -> Result<u128> {
    require!(vault.total_shares > 0, VaultError::NoSharesStaked);
    require!(amount > 0, VaultError::ZeroRewardAmount);
    require!(mint != vault.asset_mint, VaultError::RewardTokenIsUnderlying);

    if vault.reward_token(&mint).is_none() {
        require!(can_register, VaultError::UnknownRewardToken);
        register(vault, mint, reward_account)?;
    }

    // dust below one unit per share stays in the reward account
    let increment = reward_per_share(amount, vault.total_shares)?;
    let token = vault
        .reward_token_mut(&mint)
        .ok_or(VaultError::UnknownRewardToken)?;
    token.cumulative_reward_per_share = token
        .cumulative_reward_per_share
        .checked_add(increment)
        .ok_or(VaultError::MathOverflow)?;
    token.total_received = token
        .total_received
        .checked_add(amount)
        .ok_or(VaultError::MathOverflow)?;

    Ok(increment)
}

/// Bring every checkpoint of `position` up to the current indices.
pub fn settle(vault: &RewardVault, position: &mut Position) -> Result<()> {
    let balance = position.share_balance;

    for token in vault.reward_tokens.iter() {
        let index = token.cumulative_reward_per_share;
        let slot = match position.rewards.iter().position(|c| c.mint == token.mint) {
            Some(slot) => slot,
            None => {
                position.rewards.push(RewardCheckpoint {
                    mint: token.mint,
                    index: 0,
                    accrued: 0,
                });
                position.rewards.len() - 1
            }
        };

        let checkpoint = &mut position.rewards[slot];
        let delta = index
            .checked_sub(checkpoint.index)
            .ok_or(VaultError::RewardIndexUnderflow)?;
        let owed = reward_owed(balance, delta)?;

        checkpoint.accrued = checkpoint
            .accrued
            .checked_add(owed)
            .ok_or(VaultError::MathOverflow)?;
        checkpoint.index = index;
    }

    Ok(())
}

/// Release accrued `mint` rewards of the position.
///
/// `amount` of `None` claims everything; a larger request is clamped to what
/// has accrued. An unregistered mint or nothing accrued yields 0.
pub fn claim(
    vault: &mut RewardVault,
    position: &mut Position,
    mint: &Pubkey,
    amount: Option<u64>,
) -> Result<u64> {
    settle(vault, position)?;

    let Some(checkpoint) = position.rewards.iter_mut().find(|c| c.mint == *mint) else {
        return Ok(0);
    };
    let claimed = amount.map_or(checkpoint.accrued, |a| a.min(checkpoint.accrued));
    if claimed == 0 {
        return Ok(0);
    }
    checkpoint.accrued -= claimed;

    let token = vault
        .reward_token_mut(mint)
        .ok_or(VaultError::UnknownRewardToken)?;
    token.total_claimed = token
        .total_claimed
        .checked_add(claimed)
        .ok_or(VaultError::MathOverflow)?;

    Ok(claimed)
}

/// Claim every reward token from `start_index` on, in registration order.
///
/// Entries with nothing accrued are returned with an amount of 0 so callers
/// can line them up with per-token accounts.
pub fn claim_all(
    vault: &mut RewardVault,
    position: &mut Position,
    start_index: usize,
) -> Result<Vec<RewardBalance>> {
    let mints: Vec<Pubkey> = vault
        .reward_tokens
        .iter()
        .skip(start_index)
        .map(|t| t.mint)
        .collect();

    mints
        .into_iter()
        .map(|mint| {
            let amount = claim(vault, position, &mint, None)?;
            Ok(RewardBalance { mint, amount })
        })
        .collect()
}

/// Accrued plus not-yet-settled reward of `mint`, without mutating anything.
pub fn pending_reward(vault: &RewardVault, position: &Position, mint: &Pubkey) -> Result<u64> {
    let Some(token) = vault.reward_token(mint) else {
        return Ok(0);
    };
    let (index, accrued) = position
        .checkpoint(mint)
        .map_or((0, 0), |c| (c.index, c.accrued));

    let delta = token
        .cumulative_reward_per_share
        .checked_sub(index)
        .ok_or(VaultError::RewardIndexUnderflow)?;
    let owed = reward_owed(position.share_balance, delta)?;

    Ok(accrued.checked_add(owed).ok_or(VaultError::MathOverflow)?)
}

/// `pending_reward` for every registered token, in registration order.
pub fn all_rewards(vault: &RewardVault, position: &Position) -> Result<Vec<RewardBalance>> {
    vault
        .reward_tokens
        .iter()
        .map(|t| {
            Ok(RewardBalance {
                mint: t.mint,
                amount: pending_reward(vault, position, &t.mint)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{
        ledger,
        test_support::{error_code, vault},
    };

    fn position(vault_key: Pubkey) -> Position {
        Position::new(vault_key, Pubkey::new_unique(), 255)
    }

    fn deposit(vault: &mut RewardVault, holder: &mut Position, shares: u64) {
        settle(vault, holder).unwrap();
        ledger::mint(vault, holder, shares, 0).unwrap();
    }

    #[test]
    fn test_add_reward_requires_stakers() {
        let mut vault = vault(0, 0);
        let mint = Pubkey::new_unique();
        let err = add_reward(&mut vault, mint, Pubkey::new_unique(), 100, true).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::NoSharesStaked));
    }

    #[test]
    fn test_add_reward_validation() {
        let mut vault = vault(0, 0);
        let mut alice = position(Pubkey::new_unique());
        deposit(&mut vault, &mut alice, 100);

        let mint = Pubkey::new_unique();
        let err = add_reward(&mut vault, mint, Pubkey::new_unique(), 0, true).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::ZeroRewardAmount));

        let underlying = vault.asset_mint;
        let err = add_reward(&mut vault, underlying, Pubkey::new_unique(), 10, true).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::RewardTokenIsUnderlying));

        let err = add_reward(&mut vault, mint, Pubkey::new_unique(), 10, false).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::UnknownRewardToken));

        add_reward(&mut vault, mint, Pubkey::new_unique(), 10, true).unwrap();
        add_reward(&mut vault, mint, Pubkey::new_unique(), 10, false).unwrap();
        assert_eq!(vault.reward_tokens.len(), 1);
        assert_eq!(vault.reward_tokens[0].total_received, 20);
    }

    #[test]
    fn test_allowlist_is_bounded() {
        let mut vault = vault(0, 0);
        for _ in 0..MAX_REWARD_TOKENS {
            register(&mut vault, Pubkey::new_unique(), Pubkey::new_unique()).unwrap();
        }
        let err = register(&mut vault, Pubkey::new_unique(), Pubkey::new_unique()).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::TooManyRewardTokens));
    }

    #[test]
    fn test_late_depositor_does_not_dilute_earlier_reward() {
        let mut vault = vault(0, 0);
        let mint = Pubkey::new_unique();
        let mut alice = position(Pubkey::new_unique());
        let mut bob = position(Pubkey::new_unique());

        deposit(&mut vault, &mut alice, 100);
        add_reward(&mut vault, mint, Pubkey::new_unique(), 1_000, true).unwrap();
        deposit(&mut vault, &mut bob, 100);
        add_reward(&mut vault, mint, Pubkey::new_unique(), 1_000, true).unwrap();

        assert_eq!(pending_reward(&vault, &alice, &mint).unwrap(), 1_500);
        assert_eq!(pending_reward(&vault, &bob, &mint).unwrap(), 500);
    }

    #[test]
    fn test_settle_is_idempotent() {
        let mut vault = vault(0, 0);
        let mint = Pubkey::new_unique();
        let mut alice = position(Pubkey::new_unique());
        deposit(&mut vault, &mut alice, 3);
        add_reward(&mut vault, mint, Pubkey::new_unique(), 10, true).unwrap();

        settle(&vault, &mut alice).unwrap();
        settle(&vault, &mut alice).unwrap();
        assert_eq!(alice.checkpoint(&mint).unwrap().accrued, 9);
    }

    #[test]
    fn test_claim_is_tolerant() {
        let mut vault = vault(0, 0);
        let mut alice = position(Pubkey::new_unique());
        deposit(&mut vault, &mut alice, 100);

        // unknown token
        assert_eq!(claim(&mut vault, &mut alice, &Pubkey::new_unique(), None).unwrap(), 0);
        // start index past the allowlist
        assert!(claim_all(&mut vault, &mut alice, 5).unwrap().is_empty());
    }

    #[test]
    fn test_partial_claim_is_clamped() {
        let mut vault = vault(0, 0);
        let mint = Pubkey::new_unique();
        let mut alice = position(Pubkey::new_unique());
        deposit(&mut vault, &mut alice, 100);
        add_reward(&mut vault, mint, Pubkey::new_unique(), 1_000, true).unwrap();

        assert_eq!(claim(&mut vault, &mut alice, &mint, Some(400)).unwrap(), 400);
        assert_eq!(claim(&mut vault, &mut alice, &mint, Some(10_000)).unwrap(), 600);
        assert_eq!(claim(&mut vault, &mut alice, &mint, None).unwrap(), 0);
        assert_eq!(vault.reward_tokens[0].total_claimed, 1_000);
    }

    #[test]
    fn test_claim_all_keeps_registration_order() {
        let mut vault = vault(0, 0);
        let mut alice = position(Pubkey::new_unique());
        deposit(&mut vault, &mut alice, 10);

        let mints: Vec<Pubkey> = (0..3).map(|_| Pubkey::new_unique()).collect();
        for (i, mint) in mints.iter().enumerate() {
            add_reward(&mut vault, *mint, Pubkey::new_unique(), 100 * (i as u64 + 1), true)
                .unwrap();
        }

        let claimed = claim_all(&mut vault, &mut alice, 1).unwrap();
        assert_eq!(
            claimed,
            vec![
                RewardBalance { mint: mints[1], amount: 200 },
                RewardBalance { mint: mints[2], amount: 300 },
            ]
        );
        assert_eq!(pending_reward(&vault, &alice, &mints[0]).unwrap(), 100);
    }

    #[test]
    fn test_token_registered_after_deposit() {
        let mut vault = vault(0, 0);
        let mut alice = position(Pubkey::new_unique());
        deposit(&mut vault, &mut alice, 50);

        let mint = Pubkey::new_unique();
        add_reward(&mut vault, mint, Pubkey::new_unique(), 500, true).unwrap();

        let all = all_rewards(&vault, &alice).unwrap();
        assert_eq!(all, vec![RewardBalance { mint, amount: 500 }]);
    }
}
