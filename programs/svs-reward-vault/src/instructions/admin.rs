use anchor_lang::prelude::*;
use anchor_spl::token_interface::TokenAccount;

use crate::{
    engine,
    error::VaultError,
    events::{AuthorityTransferred, VaultStatusChanged, VaultSynced},
    state::RewardVault,
};

/// Signed by the vault's current authority.
#[derive(Accounts)]
pub struct VaultAuthority<'info> {
    pub authority: Signer<'info>,

    #[account(mut, has_one = authority @ VaultError::Unauthorized)]
    pub vault: Account<'info, RewardVault>,
}

#[derive(Accounts)]
pub struct SyncAssets<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        has_one = authority @ VaultError::Unauthorized,
        has_one = asset_vault,
    )]
    pub vault: Account<'info, RewardVault>,

    pub asset_vault: InterfaceAccount<'info, TokenAccount>,
}

/// Stop or resume deposits, withdrawals, requests and share transfers.
/// Rewards, views and admin instructions keep working while paused.
pub fn set_paused(ctx: Context<VaultAuthority>, paused: bool) -> Result<()> {
    let vault = &mut ctx.accounts.vault;
    engine::set_paused(vault, paused)?;

    msg!("Vault {} paused: {}", vault.key(), paused);
    emit!(VaultStatusChanged {
        vault: vault.key(),
        paused,
    });
    Ok(())
}

pub fn transfer_authority(ctx: Context<VaultAuthority>, new_authority: Pubkey) -> Result<()> {
    let vault = &mut ctx.accounts.vault;
    let previous_authority = engine::hand_over_authority(vault, new_authority)?;

    emit!(AuthorityTransferred {
        vault: vault.key(),
        previous_authority,
        new_authority,
    });
    Ok(())
}

/// Re-read the asset account so yield or donations sent straight to it
/// raise the share price. Request escrow stays out of `total_assets`.
pub fn sync(ctx: Context<SyncAssets>) -> Result<()> {
    let balance = ctx.accounts.asset_vault.amount;
    let vault = &mut ctx.accounts.vault;
    let previous_total = engine::sync_total_assets(vault, balance)?;

    msg!(
        "Synced vault {}: {} -> {} (escrow {} + {})",
        vault.key(),
        previous_total,
        vault.total_assets,
        vault.pending_deposit_assets,
        vault.pending_redeem_assets
    );
    emit!(VaultSynced {
        vault: vault.key(),
        previous_total,
        new_total: vault.total_assets,
    });
    Ok(())
}
