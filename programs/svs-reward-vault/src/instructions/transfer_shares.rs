use anchor_lang::prelude::*;

use crate::{
    constants::POSITION_SEED,
    engine,
    error::VaultError,
    events::SharesTransferred,
    state::{Position, RewardVault},
};

#[derive(Accounts)]
pub struct TransferShares<'info> {
    /// Sender or one of its operators, pays for the recipient position
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
        seeds = [POSITION_SEED, vault.key().as_ref(), from_position.owner.as_ref()],
        bump = from_position.bump,
    )]
    pub from_position: Account<'info, Position>,

    /// CHECK: Share recipient, only used to derive its position
    #[account(
        constraint = receiver.key() != from_position.owner @ VaultError::InvalidReceiver,
    )]
    pub receiver: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = caller,
        space = Position::LEN,
        seeds = [POSITION_SEED, vault.key().as_ref(), receiver.key().as_ref()],
        bump
    )]
    pub to_position: Account<'info, Position>,

    pub system_program: Program<'info, System>,
}

/// Move unlocked shares to another holder, settling rewards on both sides
pub fn handler(ctx: Context<TransferShares>, shares: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault_key = ctx.accounts.vault.key();
    let receiver = ctx.accounts.receiver.key();
    let caller = ctx.accounts.caller.key();

    let accounts = &mut *ctx.accounts;
    accounts
        .to_position
        .ensure_initialized(vault_key, receiver, ctx.bumps.to_position);

    engine::transfer_shares(
        &mut accounts.vault,
        &mut accounts.from_position,
        &mut accounts.to_position,
        &caller,
        shares,
        now,
    )?;

    emit!(SharesTransferred {
        vault: vault_key,
        from: accounts.from_position.owner,
        to: receiver,
        shares,
    });

    Ok(())
}
