use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::{
    constants::{POSITION_SEED, VAULT_SEED},
    engine::sync_vault,
    error::VaultError,
    events::Withdraw as WithdrawEvent,
    state::{Position, RewardVault},
};

#[derive(Accounts)]
pub struct Redeem<'info> {
    /// Position owner or one of its operators
    pub user: Signer<'info>,

    #[account(
        mut,
        constraint = !vault.paused @ VaultError::VaultPaused,
    )]
    pub vault: Account<'info, RewardVault>,

    #[account(
        constraint = asset_mint.key() == vault.asset_mint,
    )]
    pub asset_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        has_one = vault,
        seeds = [POSITION_SEED, vault.key().as_ref(), owner_position.owner.as_ref()],
        bump = owner_position.bump,
    )]
    pub owner_position: Account<'info, Position>,

    #[account(
        mut,
        constraint = receiver_asset_account.mint == vault.asset_mint,
    )]
    pub receiver_asset_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        constraint = asset_vault.key() == vault.asset_vault,
    )]
    pub asset_vault: InterfaceAccount<'info, TokenAccount>,

    pub asset_token_program: Interface<'info, TokenInterface>,
}

/// Redeem unlocked shares for assets (floor rounding)
pub fn handler(ctx: Context<Redeem>, shares: u64, min_assets_out: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let caller = ctx.accounts.user.key();
    let receiver = ctx.accounts.receiver_asset_account.owner;

    let assets = sync_vault::redeem(
        &mut ctx.accounts.vault,
        &mut ctx.accounts.owner_position,
        &caller,
        &receiver,
        shares,
        now,
    )?;
    require!(assets >= min_assets_out, VaultError::SlippageExceeded);

    let asset_mint_key = ctx.accounts.vault.asset_mint;
    let vault_id_bytes = ctx.accounts.vault.vault_id.to_le_bytes();
    let bump = ctx.accounts.vault.bump;
    let signer_seeds: &[&[&[u8]]] = &[&[
        VAULT_SEED,
        asset_mint_key.as_ref(),
        vault_id_bytes.as_ref(),
        &[bump],
    ]];

    transfer_checked(
        CpiContext::new_with_signer(
            ctx.accounts.asset_token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.asset_vault.to_account_info(),
                to: ctx.accounts.receiver_asset_account.to_account_info(),
                mint: ctx.accounts.asset_mint.to_account_info(),
                authority: ctx.accounts.vault.to_account_info(),
            },
            signer_seeds,
        ),
        assets,
        ctx.accounts.asset_mint.decimals,
    )?;

    emit!(WithdrawEvent {
        vault: ctx.accounts.vault.key(),
        caller,
        receiver,
        owner: ctx.accounts.owner_position.owner,
        assets,
        shares,
    });

    Ok(())
}
