use anchor_lang::prelude::*;

use crate::{
    constants::{DEPOSIT_REQUEST_SEED, POSITION_SEED},
    engine::async_vault,
    error::VaultError,
    events::DepositClaimed,
    state::{PendingRequest, Position, RewardVault},
};

#[derive(Accounts)]
pub struct ClaimDeposit<'info> {
    /// Controller or one of its operators
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
        seeds = [DEPOSIT_REQUEST_SEED, vault.key().as_ref(), request.controller.as_ref()],
        bump = request.bump,
    )]
    pub request: Account<'info, PendingRequest>,

    /// Needed only when the caller claims as an operator of the controller
    #[account(
        has_one = vault,
        seeds = [POSITION_SEED, vault.key().as_ref(), request.controller.as_ref()],
        bump = controller_position.bump,
    )]
    pub controller_position: Option<Account<'info, Position>>,

    /// CHECK: Share recipient, only used to derive its position
    pub receiver: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = caller,
        space = Position::LEN,
        seeds = [POSITION_SEED, vault.key().as_ref(), receiver.key().as_ref()],
        bump
    )]
    pub receiver_position: Account<'info, Position>,

    pub system_program: Program<'info, System>,
}

/// Convert `assets` of a claimable deposit request into shares (floor rounding)
pub fn handler(mut ctx: Context<ClaimDeposit>, assets: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let receiver = prepare(&mut ctx)?;

    let accounts = &mut *ctx.accounts;
    let shares = async_vault::claim_deposit(
        &mut accounts.vault,
        &mut accounts.request,
        &mut accounts.receiver_position,
        &receiver,
        assets,
        now,
    )?;

    emit_claimed(accounts, receiver, assets, shares);
    Ok(())
}

/// Mint exact `shares` out of a claimable deposit request (ceiling rounding on assets)
pub fn mint_handler(mut ctx: Context<ClaimDeposit>, shares: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let receiver = prepare(&mut ctx)?;

    let accounts = &mut *ctx.accounts;
    let assets = async_vault::claim_mint(
        &mut accounts.vault,
        &mut accounts.request,
        &mut accounts.receiver_position,
        &receiver,
        shares,
        now,
    )?;

    emit_claimed(accounts, receiver, assets, shares);
    Ok(())
}

fn prepare(ctx: &mut Context<ClaimDeposit>) -> Result<Pubkey> {
    let vault_key = ctx.accounts.vault.key();
    let receiver = ctx.accounts.receiver.key();

    async_vault::require_controller(
        &ctx.accounts.request,
        &ctx.accounts.caller.key(),
        ctx.accounts.controller_position.as_deref(),
    )?;
    ctx.accounts.receiver_position.ensure_initialized(
        vault_key,
        receiver,
        ctx.bumps.receiver_position,
    );

    Ok(receiver)
}

fn emit_claimed(accounts: &ClaimDeposit, receiver: Pubkey, assets: u64, shares: u64) {
    emit!(DepositClaimed {
        vault: accounts.vault.key(),
        controller: accounts.request.controller,
        receiver,
        assets,
        shares,
        remaining: accounts.request.pending_amount,
    });
}
