//! Vault accounting, independent of account loading and token CPIs.
//!
//! Instruction handlers read the clock, call into these modules, and only
//! then move tokens. Nothing in here touches sysvars or other programs.

pub mod async_vault;
pub mod ledger;
pub mod rewards;
pub mod schedule;
pub mod sync_vault;

use anchor_lang::prelude::*;

use crate::{
    error::VaultError,
    state::{Position, RewardVault},
};

/// Move unlocked shares from one position to another (either vault mode).
/// Both sides are settled against their pre-transfer balances.
pub fn transfer_shares(
    vault: &mut RewardVault,
    from: &mut Position,
    to: &mut Position,
    caller: &Pubkey,
    amount: u64,
    now: i64,
) -> Result<()> {
    require!(!vault.paused, VaultError::VaultPaused);
    require!(to.owner != Pubkey::default(), VaultError::InvalidReceiver);
    from.require_authorized(caller)?;

    rewards::settle(vault, from)?;
    rewards::settle(vault, to)?;
    ledger::transfer(vault, from, to, amount, now)
}

/// Settle and check that nothing is left on the position before its account
/// is closed.
pub fn release_position(vault: &RewardVault, position: &mut Position) -> Result<()> {
    rewards::settle(vault, position)?;
    require!(position.is_empty(), VaultError::PositionNotEmpty);
    Ok(())
}

/// Flip the circuit breaker. Setting the flag it already has is an error so
/// a stale pause or unpause can't be mistaken for a state change.
pub fn set_paused(vault: &mut RewardVault, paused: bool) -> Result<()> {
    require!(vault.paused != paused, VaultError::VaultPaused);
    vault.paused = paused;
    Ok(())
}

/// Hand the vault to `new_authority`; returns the previous authority.
pub fn hand_over_authority(vault: &mut RewardVault, new_authority: Pubkey) -> Result<Pubkey> {
    require!(new_authority != Pubkey::default(), VaultError::InvalidOwner);
    Ok(std::mem::replace(&mut vault.authority, new_authority))
}

/// Recompute `total_assets` from the asset account balance, leaving escrowed
/// request amounts out. Returns the previous total.
pub fn sync_total_assets(vault: &mut RewardVault, asset_balance: u64) -> Result<u64> {
    let escrowed = vault
        .pending_deposit_assets
        .checked_add(vault.pending_redeem_assets)
        .ok_or(VaultError::MathOverflow)?;
    let live = asset_balance
        .checked_sub(escrowed)
        .ok_or(VaultError::InsufficientAssets)?;

    let previous = vault.total_assets;
    vault.total_assets = live;
    Ok(previous)
}

#[cfg(test)]
pub(crate) mod test_support {
    use anchor_lang::error::Error;
    use anchor_lang::prelude::Pubkey;

    use crate::state::{RewardVault, VaultMode};

    pub const ONE_DAY: i64 = 24 * 60 * 60;

    pub fn vault(cliff: i64, unlock_duration: i64) -> RewardVault {
        vault_with_mode(cliff, unlock_duration, VaultMode::Synchronous)
    }

    pub fn vault_with_mode(cliff: i64, unlock_duration: i64, mode: VaultMode) -> RewardVault {
        RewardVault {
            authority: Pubkey::new_unique(),
            asset_mint: Pubkey::new_unique(),
            asset_vault: Pubkey::new_unique(),
            total_shares: 0,
            total_assets: 0,
            pending_deposit_assets: 0,
            pending_redeem_assets: 0,
            cliff,
            unlock_duration,
            shares_lock_time: 0,
            mode,
            paused: false,
            bump: 255,
            vault_id: 0,
            reward_tokens: Vec::new(),
            _reserved: [0u8; 64],
        }
    }

    pub fn error_code(err: &Error) -> u32 {
        match err {
            Error::AnchorError(e) => e.error_code_number,
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::{error_code, vault};

    #[test]
    fn test_transfer_requires_owner_or_operator() {
        let mut vault = vault(0, 0);
        let mut alice = Position::new(Pubkey::new_unique(), Pubkey::new_unique(), 255);
        let mut bob = Position::new(Pubkey::new_unique(), Pubkey::new_unique(), 255);
        ledger::mint(&mut vault, &mut alice, 100, 0).unwrap();

        let stranger = Pubkey::new_unique();
        let err = transfer_shares(&mut vault, &mut alice, &mut bob, &stranger, 10, 0).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::Unauthorized));

        alice.set_operator(stranger, true).unwrap();
        transfer_shares(&mut vault, &mut alice, &mut bob, &stranger, 10, 0).unwrap();
        assert_eq!(bob.share_balance, 10);
    }

    #[test]
    fn test_transfer_settles_both_sides() {
        let mut vault = vault(0, 0);
        let mint = Pubkey::new_unique();
        let mut alice = Position::new(Pubkey::new_unique(), Pubkey::new_unique(), 255);
        let mut bob = Position::new(Pubkey::new_unique(), Pubkey::new_unique(), 255);
        ledger::mint(&mut vault, &mut alice, 100, 0).unwrap();
        rewards::add_reward(&mut vault, mint, Pubkey::new_unique(), 1_000, true).unwrap();

        let owner = alice.owner;
        transfer_shares(&mut vault, &mut alice, &mut bob, &owner, 100, 0).unwrap();
        rewards::add_reward(&mut vault, mint, Pubkey::new_unique(), 1_000, false).unwrap();

        assert_eq!(rewards::pending_reward(&vault, &alice, &mint).unwrap(), 1_000);
        assert_eq!(rewards::pending_reward(&vault, &bob, &mint).unwrap(), 1_000);
    }

    #[test]
    fn test_release_requires_empty_position() {
        let mut vault = vault(0, 0);
        let mint = Pubkey::new_unique();
        let mut alice = Position::new(Pubkey::new_unique(), Pubkey::new_unique(), 255);
        ledger::mint(&mut vault, &mut alice, 100, 0).unwrap();

        let err = release_position(&vault, &mut alice).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::PositionNotEmpty));

        rewards::add_reward(&mut vault, mint, Pubkey::new_unique(), 500, true).unwrap();
        rewards::settle(&vault, &mut alice).unwrap();
        ledger::burn(&mut vault, &mut alice, 100, 0).unwrap();
        let err = release_position(&vault, &mut alice).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::PositionNotEmpty));

        assert_eq!(rewards::claim(&mut vault, &mut alice, &mint, None).unwrap(), 500);
        release_position(&vault, &mut alice).unwrap();
    }

    #[test]
    fn test_pause_toggles_once() {
        let mut vault = vault(0, 0);
        let mut alice = Position::new(Pubkey::new_unique(), Pubkey::new_unique(), 255);
        let mut bob = Position::new(Pubkey::new_unique(), Pubkey::new_unique(), 255);
        ledger::mint(&mut vault, &mut alice, 100, 0).unwrap();
        let owner = alice.owner;

        let err = set_paused(&mut vault, false).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::VaultPaused));

        set_paused(&mut vault, true).unwrap();
        let err = set_paused(&mut vault, true).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::VaultPaused));
        let err = transfer_shares(&mut vault, &mut alice, &mut bob, &owner, 10, 0).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::VaultPaused));

        set_paused(&mut vault, false).unwrap();
        transfer_shares(&mut vault, &mut alice, &mut bob, &owner, 10, 0).unwrap();
    }

    #[test]
    fn test_hand_over_authority() {
        let mut vault = vault(0, 0);
        let original = vault.authority;

        let err = hand_over_authority(&mut vault, Pubkey::default()).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::InvalidOwner));
        assert_eq!(vault.authority, original);

        let next = Pubkey::new_unique();
        assert_eq!(hand_over_authority(&mut vault, next).unwrap(), original);
        assert_eq!(vault.authority, next);
    }

    #[test]
    fn test_sync_excludes_escrow() {
        let mut vault = vault(0, 0);
        vault.total_assets = 1_000;
        vault.pending_deposit_assets = 200;
        vault.pending_redeem_assets = 50;

        let previous = sync_total_assets(&mut vault, 1_500).unwrap();
        assert_eq!(previous, 1_000);
        assert_eq!(vault.total_assets, 1_250);

        let err = sync_total_assets(&mut vault, 100).unwrap_err();
        assert_eq!(error_code(&err), u32::from(VaultError::InsufficientAssets));
    }
}
