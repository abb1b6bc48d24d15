use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{Mint, TokenAccount, TokenInterface},
};

use crate::{
    engine::rewards, error::VaultError, events::RewardTokenRegistered, state::RewardVault,
};

#[derive(Accounts)]
pub struct RegisterRewardToken<'info> {
    #[account(
        mut,
        constraint = authority.key() == vault.authority @ VaultError::Unauthorized,
    )]
    pub authority: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, RewardVault>,

    #[account(
        constraint = reward_mint.key() != vault.asset_mint @ VaultError::RewardTokenIsUnderlying,
    )]
    pub reward_mint: InterfaceAccount<'info, Mint>,

    #[account(
        init_if_needed,
        payer = authority,
        associated_token::mint = reward_mint,
        associated_token::authority = vault,
        associated_token::token_program = reward_token_program,
    )]
    pub reward_account: InterfaceAccount<'info, TokenAccount>,

    pub reward_token_program: Interface<'info, TokenInterface>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

/// Add a reward token to the vault allowlist (idempotent)
pub fn handler(ctx: Context<RegisterRewardToken>) -> Result<()> {
    let mint = ctx.accounts.reward_mint.key();
    let reward_account = ctx.accounts.reward_account.key();
    let vault = &mut ctx.accounts.vault;

    if vault.reward_token(&mint).is_some() {
        msg!("Reward token {} already registered", mint);
        return Ok(());
    }

    rewards::register(vault, mint, reward_account)?;

    emit!(RewardTokenRegistered {
        vault: vault.key(),
        mint,
        reward_account,
    });

    Ok(())
}
