use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::{
    constants::{POSITION_SEED, REDEEM_REQUEST_SEED, VAULT_SEED},
    engine::async_vault,
    error::VaultError,
    events::RedeemClaimed,
    state::{PendingRequest, Position, RewardVault},
};

#[derive(Accounts)]
pub struct ClaimRedeem<'info> {
    /// Controller or one of its operators
    pub caller: Signer<'info>,

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
        seeds = [REDEEM_REQUEST_SEED, vault.key().as_ref(), request.controller.as_ref()],
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

/// Claim `shares` of a claimable redeem request for their escrowed assets
pub fn handler(ctx: Context<ClaimRedeem>, shares: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let receiver = ctx.accounts.receiver_asset_account.owner;
    require_controller(&ctx.accounts)?;

    let assets = async_vault::claim_redeem(
        &mut ctx.accounts.vault,
        &mut ctx.accounts.request,
        &receiver,
        shares,
        now,
    )?;

    release(&ctx.accounts, assets)?;
    emit_claimed(&ctx.accounts, receiver, assets, shares);
    Ok(())
}

/// Claim exact `assets` of a claimable redeem request (ceiling rounding on shares)
pub fn withdraw_handler(ctx: Context<ClaimRedeem>, assets: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let receiver = ctx.accounts.receiver_asset_account.owner;
    require_controller(&ctx.accounts)?;

    let shares = async_vault::claim_withdraw(
        &mut ctx.accounts.vault,
        &mut ctx.accounts.request,
        &receiver,
        assets,
        now,
    )?;

    release(&ctx.accounts, assets)?;
    emit_claimed(&ctx.accounts, receiver, assets, shares);
    Ok(())
}

fn require_controller(accounts: &ClaimRedeem) -> Result<()> {
    async_vault::require_controller(
        &accounts.request,
        &accounts.caller.key(),
        accounts.controller_position.as_deref(),
    )
}

fn release(accounts: &ClaimRedeem, assets: u64) -> Result<()> {
    let asset_mint_key = accounts.vault.asset_mint;
    let vault_id_bytes = accounts.vault.vault_id.to_le_bytes();
    let bump = accounts.vault.bump;
    let signer_seeds: &[&[&[u8]]] = &[&[
        VAULT_SEED,
        asset_mint_key.as_ref(),
        vault_id_bytes.as_ref(),
        &[bump],
    ]];

    transfer_checked(
        CpiContext::new_with_signer(
            accounts.asset_token_program.to_account_info(),
            TransferChecked {
                from: accounts.asset_vault.to_account_info(),
                to: accounts.receiver_asset_account.to_account_info(),
                mint: accounts.asset_mint.to_account_info(),
                authority: accounts.vault.to_account_info(),
            },
            signer_seeds,
        ),
        assets,
        accounts.asset_mint.decimals,
    )
}

fn emit_claimed(accounts: &ClaimRedeem, receiver: Pubkey, assets: u64, shares: u64) {
    emit!(RedeemClaimed {
        vault: accounts.vault.key(),
        controller: accounts.request.controller,
        receiver,
        assets,
        shares,
        remaining: accounts.request.pending_amount,
    });
}
