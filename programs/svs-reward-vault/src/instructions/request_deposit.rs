use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::{
    constants::DEPOSIT_REQUEST_SEED,
    engine::async_vault,
    error::VaultError,
    events::DepositRequested,
    state::{PendingRequest, RequestKind, RewardVault},
};

#[derive(Accounts)]
pub struct RequestDeposit<'info> {
    /// Asset owner, pays for the request account on first use
    #[account(mut)]
    pub owner: Signer<'info>,

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
        constraint = owner_asset_account.mint == vault.asset_mint,
        constraint = owner_asset_account.owner == owner.key(),
    )]
    pub owner_asset_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        constraint = asset_vault.key() == vault.asset_vault,
    )]
    pub asset_vault: InterfaceAccount<'info, TokenAccount>,

    /// CHECK: Principal entitled to claim the request
    pub controller: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = owner,
        space = PendingRequest::LEN,
        seeds = [DEPOSIT_REQUEST_SEED, vault.key().as_ref(), controller.key().as_ref()],
        bump
    )]
    pub request: Account<'info, PendingRequest>,

    pub asset_token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

/// Escrow assets for a controller; they stay out of the exchange rate until claimed
pub fn handler(ctx: Context<RequestDeposit>, assets: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault_key = ctx.accounts.vault.key();
    let controller = ctx.accounts.controller.key();
    let owner = ctx.accounts.owner.key();

    let request = &mut ctx.accounts.request;
    request.ensure_initialized(vault_key, controller, RequestKind::Deposit, ctx.bumps.request);

    async_vault::request_deposit(&mut ctx.accounts.vault, request, &controller, &owner, assets, now)?;

    transfer_checked(
        CpiContext::new(
            ctx.accounts.asset_token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.owner_asset_account.to_account_info(),
                to: ctx.accounts.asset_vault.to_account_info(),
                mint: ctx.accounts.asset_mint.to_account_info(),
                authority: ctx.accounts.owner.to_account_info(),
            },
        ),
        assets,
        ctx.accounts.asset_mint.decimals,
    )?;

    emit!(DepositRequested {
        vault: vault_key,
        controller,
        owner,
        assets,
        pending: ctx.accounts.request.pending_amount,
    });

    Ok(())
}
