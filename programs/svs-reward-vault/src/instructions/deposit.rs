use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::{
    constants::POSITION_SEED,
    engine::sync_vault,
    error::VaultError,
    events::Deposit as DepositEvent,
    state::{Position, RewardVault},
};

#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(mut)]
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
        constraint = user_asset_account.mint == vault.asset_mint,
        constraint = user_asset_account.owner == user.key(),
    )]
    pub user_asset_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        constraint = asset_vault.key() == vault.asset_vault,
    )]
    pub asset_vault: InterfaceAccount<'info, TokenAccount>,

    /// CHECK: Share recipient, only used to derive its position
    pub receiver: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = user,
        space = Position::LEN,
        seeds = [POSITION_SEED, vault.key().as_ref(), receiver.key().as_ref()],
        bump
    )]
    pub receiver_position: Account<'info, Position>,

    pub asset_token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

/// Deposit exact assets, shares vest on the receiver's position (floor rounding)
pub fn handler(ctx: Context<Deposit>, assets: u64, min_shares_out: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault_key = ctx.accounts.vault.key();
    let receiver_key = ctx.accounts.receiver.key();

    let position = &mut ctx.accounts.receiver_position;
    position.ensure_initialized(vault_key, receiver_key, ctx.bumps.receiver_position);

    let shares = sync_vault::deposit(&mut ctx.accounts.vault, position, &receiver_key, assets, now)?;
    require!(shares >= min_shares_out, VaultError::SlippageExceeded);

    transfer_checked(
        CpiContext::new(
            ctx.accounts.asset_token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.user_asset_account.to_account_info(),
                to: ctx.accounts.asset_vault.to_account_info(),
                mint: ctx.accounts.asset_mint.to_account_info(),
                authority: ctx.accounts.user.to_account_info(),
            },
        ),
        assets,
        ctx.accounts.asset_mint.decimals,
    )?;

    emit!(DepositEvent {
        vault: vault_key,
        caller: ctx.accounts.user.key(),
        owner: receiver_key,
        assets,
        shares,
    });

    Ok(())
}
