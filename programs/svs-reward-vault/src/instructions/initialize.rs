use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{Mint, TokenAccount, TokenInterface},
};

use crate::{
    constants::{MAX_LOCK_SECONDS, VAULT_SEED},
    error::VaultError,
    events::VaultInitialized,
    state::{RewardVault, VaultMode},
};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitializeParams {
    pub vault_id: u64,
    pub mode: VaultMode,
    pub cliff: i64,
    pub unlock_duration: i64,
    pub shares_lock_time: i64,
}

impl InitializeParams {
    pub fn validate(&self) -> Result<()> {
        for value in [self.cliff, self.unlock_duration, self.shares_lock_time] {
            require!(
                (0..=MAX_LOCK_SECONDS).contains(&value),
                VaultError::InvalidLockSchedule
            );
        }
        if self.mode == VaultMode::Synchronous {
            require!(self.shares_lock_time == 0, VaultError::InvalidLockSchedule);
        }
        Ok(())
    }
}

#[derive(Accounts)]
#[instruction(params: InitializeParams)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        init,
        payer = authority,
        space = RewardVault::LEN,
        seeds = [VAULT_SEED, asset_mint.key().as_ref(), &params.vault_id.to_le_bytes()],
        bump
    )]
    pub vault: Account<'info, RewardVault>,

    pub asset_mint: InterfaceAccount<'info, Mint>,

    #[account(
        init,
        payer = authority,
        associated_token::mint = asset_mint,
        associated_token::authority = vault,
        associated_token::token_program = asset_token_program,
    )]
    pub asset_vault: InterfaceAccount<'info, TokenAccount>,

    pub asset_token_program: Interface<'info, TokenInterface>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>, params: InitializeParams) -> Result<()> {
    params.validate()?;

    let vault = &mut ctx.accounts.vault;
    vault.authority = ctx.accounts.authority.key();
    vault.asset_mint = ctx.accounts.asset_mint.key();
    vault.asset_vault = ctx.accounts.asset_vault.key();
    vault.total_shares = 0;
    vault.total_assets = 0;
    vault.pending_deposit_assets = 0;
    vault.pending_redeem_assets = 0;
    vault.cliff = params.cliff;
    vault.unlock_duration = params.unlock_duration;
    vault.shares_lock_time = params.shares_lock_time;
    vault.mode = params.mode;
    vault.paused = false;
    vault.bump = ctx.bumps.vault;
    vault.vault_id = params.vault_id;
    vault.reward_tokens = Vec::new();
    vault._reserved = [0u8; 64];

    emit!(VaultInitialized {
        vault: vault.key(),
        authority: vault.authority,
        asset_mint: vault.asset_mint,
        vault_id: params.vault_id,
        mode: params.mode,
        cliff: params.cliff,
        unlock_duration: params.unlock_duration,
        shares_lock_time: params.shares_lock_time,
    });

    msg!(
        "Vault initialized: cliff={}s unlock={}s lock={}s",
        params.cliff,
        params.unlock_duration,
        params.shares_lock_time
    );

    Ok(())
}
