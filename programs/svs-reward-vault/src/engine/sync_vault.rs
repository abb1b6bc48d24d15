//! Immediate deposit / mint / withdraw / redeem.
//!
//! Rounding always favors the vault: deposit and redeem round down what the
//! user receives, mint and withdraw round up what the user pays.

use anchor_lang::prelude::*;

use crate::{
    engine::{ledger, rewards},
    error::{limit_exceeded, VaultError},
    math::{convert_to_assets, convert_to_shares, Rounding},
    state::{Position, RewardVault, VaultMode},
};

fn require_open(vault: &RewardVault) -> Result<()> {
    vault.require_mode(VaultMode::Synchronous)?;
    require!(!vault.paused, VaultError::VaultPaused);
    Ok(())
}

pub fn preview_deposit(vault: &RewardVault, assets: u64) -> Result<u64> {
    convert_to_shares(assets, vault.total_assets, vault.total_shares, Rounding::Floor)
}

pub fn preview_mint(vault: &RewardVault, shares: u64) -> Result<u64> {
    convert_to_assets(shares, vault.total_assets, vault.total_shares, Rounding::Ceiling)
}

pub fn preview_withdraw(vault: &RewardVault, assets: u64) -> Result<u64> {
    convert_to_shares(assets, vault.total_assets, vault.total_shares, Rounding::Ceiling)
}

pub fn preview_redeem(vault: &RewardVault, shares: u64) -> Result<u64> {
    convert_to_assets(shares, vault.total_assets, vault.total_shares, Rounding::Floor)
}

/// u64::MAX while the vault accepts deposits, 0 otherwise
pub fn max_deposit(vault: &RewardVault) -> u64 {
    if vault.paused || vault.mode != VaultMode::Synchronous {
        0
    } else {
        u64::MAX
    }
}

pub fn max_mint(vault: &RewardVault) -> u64 {
    max_deposit(vault)
}

/// Unlocked shares of `owner`, valued at the current rate (floor).
pub fn max_withdraw(vault: &RewardVault, owner: &Position, now: i64) -> Result<u64> {
    let shares = max_redeem(vault, owner, now);
    let assets = convert_to_assets(shares, vault.total_assets, vault.total_shares, Rounding::Floor)?;
    Ok(assets.min(vault.total_assets))
}

pub fn max_redeem(vault: &RewardVault, owner: &Position, now: i64) -> u64 {
    if vault.paused {
        return 0;
    }
    ledger::unlocked_shares(vault, owner, now)
}

/// Deposit exact `assets`, returns shares minted to `receiver`.
pub fn deposit(
    vault: &mut RewardVault,
    receiver: &mut Position,
    receiver_key: &Pubkey,
    assets: u64,
    now: i64,
) -> Result<u64> {
    require_open(vault)?;
    require!(*receiver_key != Pubkey::default(), VaultError::InvalidReceiver);

    let shares = preview_deposit(vault, assets)?;
    require!(shares > 0, VaultError::ZeroShares);

    rewards::settle(vault, receiver)?;
    ledger::mint(vault, receiver, shares, now)?;
    vault.total_assets = vault
        .total_assets
        .checked_add(assets)
        .ok_or(VaultError::MathOverflow)?;

    Ok(shares)
}

/// Mint exact `shares`, returns assets the caller has to pay.
pub fn mint(
    vault: &mut RewardVault,
    receiver: &mut Position,
    receiver_key: &Pubkey,
    shares: u64,
    now: i64,
) -> Result<u64> {
    require_open(vault)?;
    require!(*receiver_key != Pubkey::default(), VaultError::InvalidReceiver);
    require!(shares > 0, VaultError::ZeroShares);

    let assets = preview_mint(vault, shares)?;

    rewards::settle(vault, receiver)?;
    ledger::mint(vault, receiver, shares, now)?;
    vault.total_assets = vault
        .total_assets
        .checked_add(assets)
        .ok_or(VaultError::MathOverflow)?;

    Ok(assets)
}

/// Withdraw exact `assets` from `owner`, returns shares burned.
pub fn withdraw(
    vault: &mut RewardVault,
    owner: &mut Position,
    caller: &Pubkey,
    receiver_key: &Pubkey,
    assets: u64,
    now: i64,
) -> Result<u64> {
    require_open(vault)?;
    require!(*receiver_key != Pubkey::default(), VaultError::InvalidReceiver);
    owner.require_authorized(caller)?;
    require!(assets > 0, VaultError::ZeroAmount);

    let max = max_withdraw(vault, owner, now)?;
    if assets > max {
        return Err(limit_exceeded(VaultError::ExceededMaxWithdraw, owner.owner, assets, max));
    }

    let shares = preview_withdraw(vault, assets)?;
    require!(shares > 0, VaultError::ZeroShares);

    burn_for(vault, owner, shares, assets, now)?;
    Ok(shares)
}

/// Redeem exact `shares` of `owner`, returns assets released.
pub fn redeem(
    vault: &mut RewardVault,
    owner: &mut Position,
    caller: &Pubkey,
    receiver_key: &Pubkey,
    shares: u64,
    now: i64,
) -> Result<u64> {
    require_open(vault)?;
    require!(*receiver_key != Pubkey::default(), VaultError::InvalidReceiver);
    owner.require_authorized(caller)?;
    require!(shares > 0, VaultError::ZeroShares);

    let max = max_redeem(vault, owner, now);
    if shares > max {
        return Err(limit_exceeded(VaultError::ExceededMaxRedeem, owner.owner, shares, max));
    }

    let assets = preview_redeem(vault, shares)?;
    burn_for(vault, owner, shares, assets, now)?;
    Ok(assets)
}

fn burn_for(
    vault: &mut RewardVault,
    owner: &mut Position,
    shares: u64,
    assets: u64,
    now: i64,
) -> Result<()> {
    require!(assets <= vault.total_assets, VaultError::InsufficientAssets);

    rewards::settle(vault, owner)?;
    ledger::burn(vault, owner, shares, now)?;
    vault.total_assets -= assets;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{error_code, vault, vault_with_mode};

    fn holder() -> Position {
        Position::new(Pubkey::new_unique(), Pubkey::new_unique(), 255)
    }

    #[test]
    fn test_first_deposit_is_one_to_one() {
        let mut vault = vault(0, 0);
        let mut alice = holder();
        let key = alice.owner;

        let shares = deposit(&mut vault, &mut alice, &key, 1_000, 0).unwrap();
        assert_eq!(shares, 1_000);
        assert_eq!(vault.total_assets, 1_000);
        assert_eq!(vault.total_shares, 1_000);
    }

    #[test]
    fn test_deposit_after_yield() {
        let mut vault = vault(0, 0);
        let mut alice = holder();
        let mut bob = holder();
        let (a, b) = (alice.owner, bob.owner);

        deposit(&mut vault, &mut alice, &a, 1_000, 0).unwrap();
        vault.total_assets = 2_000;

        assert_eq!(deposit(&mut vault, &mut bob, &b, 500, 0).unwrap(), 250);
        assert_eq!(preview_redeem(&vault, 250).unwrap(), 500);
    }

    #[test]
    fn test_deposit_rejects_null_receiver_and_zero_shares() {
        let mut vault = vault(0, 0);
        let mut alice = holder();
        let key = alice.owner;

        let err = deposit(&mut vault, &mut alice, &Pubkey::default(), 10, 0).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::InvalidReceiver));

        let err = deposit(&mut vault, &mut alice, &key, 0, 0).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::ZeroShares));

        // 1 asset buys no shares at 3 assets per share
        deposit(&mut vault, &mut alice, &key, 100, 0).unwrap();
        vault.total_assets = 300;
        let err = deposit(&mut vault, &mut alice, &key, 1, 0).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::ZeroShares));
    }

    #[test]
    fn test_mint_rounds_assets_up() {
        let mut vault = vault(0, 0);
        let mut alice = holder();
        let key = alice.owner;
        deposit(&mut vault, &mut alice, &key, 333, 0).unwrap();
        vault.total_assets = 1_000;

        assert_eq!(mint(&mut vault, &mut alice, &key, 10, 0).unwrap(), 31);

        let err = mint(&mut vault, &mut alice, &key, 0, 0).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::ZeroShares));
    }

    #[test]
    fn test_withdraw_respects_vesting() {
        let mut vault = vault(100, 500);
        let mut alice = holder();
        let key = alice.owner;
        deposit(&mut vault, &mut alice, &key, 170, 0).unwrap();

        let err = withdraw(&mut vault, &mut alice, &key, &key, 170, 50).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::ExceededMaxWithdraw));

        assert_eq!(max_withdraw(&vault, &alice, 100).unwrap(), 0);
        assert_eq!(max_withdraw(&vault, &alice, 600).unwrap(), 170);

        let burned = withdraw(&mut vault, &mut alice, &key, &key, 170, 600).unwrap();
        assert_eq!(burned, 170);
        assert_eq!(vault.total_assets, 0);
        assert_eq!(vault.total_shares, 0);
        assert_eq!(alice.share_balance, 0);
    }

    #[test]
    fn test_redeem_partial_vesting() {
        let mut vault = vault(100, 500);
        let mut alice = holder();
        let key = alice.owner;
        deposit(&mut vault, &mut alice, &key, 1_000, 0).unwrap();

        assert_eq!(max_redeem(&vault, &alice, 350), 500);
        let err = redeem(&mut vault, &mut alice, &key, &key, 501, 350).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::ExceededMaxRedeem));

        assert_eq!(redeem(&mut vault, &mut alice, &key, &key, 500, 350).unwrap(), 500);
        assert_eq!(max_redeem(&vault, &alice, 350), 0);
        assert_eq!(max_redeem(&vault, &alice, 600), 500);
    }

    #[test]
    fn test_withdraw_by_operator_only() {
        let mut vault = vault(0, 0);
        let mut alice = holder();
        let key = alice.owner;
        deposit(&mut vault, &mut alice, &key, 100, 0).unwrap();

        let operator = Pubkey::new_unique();
        let err = redeem(&mut vault, &mut alice, &operator, &operator, 10, 0).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::Unauthorized));

        alice.set_operator(operator, true).unwrap();
        assert_eq!(redeem(&mut vault, &mut alice, &operator, &operator, 10, 0).unwrap(), 10);

        let err = withdraw(&mut vault, &mut alice, &key, &Pubkey::default(), 10, 0).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::InvalidReceiver));
    }

    #[test]
    fn test_wrong_mode_and_pause() {
        let mut vault = vault_with_mode(0, 0, VaultMode::Asynchronous);
        let mut alice = holder();
        let key = alice.owner;

        let err = deposit(&mut vault, &mut alice, &key, 100, 0).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::WrongVaultMode));
        assert_eq!(max_deposit(&vault), 0);

        vault.mode = VaultMode::Synchronous;
        vault.paused = true;
        let err = deposit(&mut vault, &mut alice, &key, 100, 0).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::VaultPaused));
        assert_eq!(max_mint(&vault), 0);
    }

    #[test]
    fn test_deposit_settles_before_minting() {
        let mut vault = vault(0, 0);
        let reward = Pubkey::new_unique();
        let mut alice = holder();
        let key = alice.owner;

        deposit(&mut vault, &mut alice, &key, 100, 0).unwrap();
        rewards::add_reward(&mut vault, reward, Pubkey::new_unique(), 1_000, true).unwrap();
        deposit(&mut vault, &mut alice, &key, 900, 1).unwrap();

        // the second deposit must not earn anything from the first injection
        assert_eq!(rewards::pending_reward(&vault, &alice, &reward).unwrap(), 1_000);
        assert_eq!(alice.checkpoint(&reward).unwrap().accrued, 1_000);
    }
}
