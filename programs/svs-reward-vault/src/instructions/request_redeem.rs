use anchor_lang::prelude::*;

use crate::{
    constants::{POSITION_SEED, REDEEM_REQUEST_SEED},
    engine::async_vault,
    error::VaultError,
    events::RedeemRequested,
    state::{PendingRequest, Position, RequestKind, RewardVault},
};

#[derive(Accounts)]
pub struct RequestRedeem<'info> {
    /// Share owner or one of its operators, pays for the request account
    #[account(mut)]
    pub caller: Signer<'info>,

    #[account(
        mut,
        constraint = !vault.paused @ VaultError::VaultPaused,
    )]
    pub vault: Account<'info, RewardVault>,

    #[account(
        mut,
        has_one = vault,
        seeds = [POSITION_SEED, vault.key().as_ref(), owner_position.owner.as_ref()],
        bump = owner_position.bump,
    )]
    pub owner_position: Account<'info, Position>,

    /// CHECK: Principal entitled to claim the request
    pub controller: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = caller,
        space = PendingRequest::LEN,
        seeds = [REDEEM_REQUEST_SEED, vault.key().as_ref(), controller.key().as_ref()],
        bump
    )]
    pub request: Account<'info, PendingRequest>,

    pub system_program: Program<'info, System>,
}

/// Burn unlocked shares now and escrow their assets (floor rounding) until
/// the shares lock time has passed
pub fn handler(ctx: Context<RequestRedeem>, shares: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault_key = ctx.accounts.vault.key();
    let controller = ctx.accounts.controller.key();
    let caller = ctx.accounts.caller.key();

    let accounts = &mut *ctx.accounts;
    accounts
        .request
        .ensure_initialized(vault_key, controller, RequestKind::Redeem, ctx.bumps.request);

    let assets = async_vault::request_redeem(
        &mut accounts.vault,
        &mut accounts.request,
        &mut accounts.owner_position,
        &caller,
        &controller,
        shares,
        now,
    )?;

    emit!(RedeemRequested {
        vault: vault_key,
        controller,
        owner: accounts.owner_position.owner,
        shares,
        assets,
        claimable_at: accounts.request.claimable_at,
    });

    Ok(())
}
