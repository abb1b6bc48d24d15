use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked},
};

use crate::{
    engine::rewards,
    error::VaultError,
    events::{RewardAdded, RewardTokenRegistered},
    state::RewardVault,
};

#[derive(Accounts)]
pub struct AddReward<'info> {
    #[account(mut)]
    pub funder: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, RewardVault>,

    pub reward_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        constraint = funder_reward_account.mint == reward_mint.key(),
        constraint = funder_reward_account.owner == funder.key(),
    )]
    pub funder_reward_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        init_if_needed,
        payer = funder,
        associated_token::mint = reward_mint,
        associated_token::authority = vault,
        associated_token::token_program = reward_token_program,
    )]
    pub reward_account: InterfaceAccount<'info, TokenAccount>,

    pub reward_token_program: Interface<'info, TokenInterface>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

/// Distribute `amount` of a reward token pro rata over all outstanding shares
pub fn handler(ctx: Context<AddReward>, amount: u64) -> Result<()> {
    let funder = ctx.accounts.funder.key();
    let mint = ctx.accounts.reward_mint.key();
    let reward_account = ctx.accounts.reward_account.key();

    let vault = &mut ctx.accounts.vault;
    let can_register = funder == vault.authority;
    let newly_registered = vault.reward_token(&mint).is_none();

    rewards::add_reward(vault, mint, reward_account, amount, can_register)?;
    if let Some(token) = vault.reward_token(&mint) {
        require_keys_eq!(
            token.reward_account,
            reward_account,
            VaultError::RewardAccountMismatch
        );
    }

    transfer_checked(
        CpiContext::new(
            ctx.accounts.reward_token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.funder_reward_account.to_account_info(),
                to: ctx.accounts.reward_account.to_account_info(),
                mint: ctx.accounts.reward_mint.to_account_info(),
                authority: ctx.accounts.funder.to_account_info(),
            },
        ),
        amount,
        ctx.accounts.reward_mint.decimals,
    )?;

    let vault = &ctx.accounts.vault;
    if newly_registered {
        emit!(RewardTokenRegistered {
            vault: vault.key(),
            mint,
            reward_account,
        });
    }

    let cumulative_reward_per_share = vault
        .reward_token(&mint)
        .map_or(0, |t| t.cumulative_reward_per_share);
    emit!(RewardAdded {
        vault: vault.key(),
        mint,
        funder,
        amount,
        cumulative_reward_per_share,
    });

    Ok(())
}
