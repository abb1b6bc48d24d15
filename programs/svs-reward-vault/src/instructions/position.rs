use anchor_lang::prelude::*;

use crate::{
    constants::POSITION_SEED,
    engine::{self, rewards},
    events::OperatorSet,
    state::{Position, RewardVault},
};

#[derive(Accounts)]
pub struct OpenPosition<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    pub vault: Account<'info, RewardVault>,

    #[account(
        init,
        payer = owner,
        space = Position::LEN,
        seeds = [POSITION_SEED, vault.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub position: Account<'info, Position>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct SetOperator<'info> {
    pub owner: Signer<'info>,

    pub vault: Account<'info, RewardVault>,

    #[account(
        mut,
        has_one = vault,
        has_one = owner,
        seeds = [POSITION_SEED, vault.key().as_ref(), owner.key().as_ref()],
        bump = position.bump,
    )]
    pub position: Account<'info, Position>,
}

#[derive(Accounts)]
pub struct ClosePosition<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    pub vault: Account<'info, RewardVault>,

    #[account(
        mut,
        close = owner,
        has_one = vault,
        has_one = owner,
        seeds = [POSITION_SEED, vault.key().as_ref(), owner.key().as_ref()],
        bump = position.bump,
    )]
    pub position: Account<'info, Position>,
}

/// Create an empty position, checkpointed at the current reward indices
pub fn open(ctx: Context<OpenPosition>) -> Result<()> {
    let vault = &ctx.accounts.vault;
    let mut position = Position::new(vault.key(), ctx.accounts.owner.key(), ctx.bumps.position);
    rewards::settle(vault, &mut position)?;
    ctx.accounts.position.set_inner(position);
    Ok(())
}

/// Approve or revoke an operator for the owner's shares and requests
pub fn set_operator(ctx: Context<SetOperator>, operator: Pubkey, approved: bool) -> Result<()> {
    let position = &mut ctx.accounts.position;
    position.set_operator(operator, approved)?;

    emit!(OperatorSet {
        vault: ctx.accounts.vault.key(),
        owner: position.owner,
        operator,
        approved,
    });

    Ok(())
}

/// Close an empty position and return its rent
pub fn close(ctx: Context<ClosePosition>) -> Result<()> {
    engine::release_position(&ctx.accounts.vault, &mut ctx.accounts.position)
}
