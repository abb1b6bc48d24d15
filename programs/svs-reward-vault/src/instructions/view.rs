use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::set_return_data;

use crate::{
    engine::{async_vault, ledger, rewards, sync_vault},
    math::{convert_to_assets, convert_to_shares, Rounding},
    state::{PendingRequest, Position, RequestKind, RewardBalance, RewardVault, VaultMode},
};

#[derive(Accounts)]
pub struct VaultView<'info> {
    pub vault: Account<'info, RewardVault>,
}

#[derive(Accounts)]
pub struct PositionView<'info> {
    pub vault: Account<'info, RewardVault>,

    #[account(has_one = vault)]
    pub position: Account<'info, Position>,
}

/// Limits for a principal: sync vaults read its position, async vaults its
/// request of the matching kind. Either may be omitted when it doesn't exist.
#[derive(Accounts)]
pub struct VaultViewWithOwner<'info> {
    pub vault: Account<'info, RewardVault>,

    #[account(has_one = vault)]
    pub position: Option<Account<'info, Position>>,

    #[account(has_one = vault)]
    pub request: Option<Account<'info, PendingRequest>>,
}

#[derive(Accounts)]
pub struct RequestView<'info> {
    pub vault: Account<'info, RewardVault>,

    #[account(has_one = vault)]
    pub request: Account<'info, PendingRequest>,
}

/// Preview how many shares would be minted for given assets (floor rounding)
pub fn preview_deposit(ctx: Context<VaultView>, assets: u64) -> Result<()> {
    let shares = sync_vault::preview_deposit(&ctx.accounts.vault, assets)?;
    set_return_data(&shares.to_le_bytes());
    Ok(())
}

/// Preview how many assets are required to mint exact shares (ceiling rounding)
pub fn preview_mint(ctx: Context<VaultView>, shares: u64) -> Result<()> {
    let assets = sync_vault::preview_mint(&ctx.accounts.vault, shares)?;
    set_return_data(&assets.to_le_bytes());
    Ok(())
}

/// Preview how many shares must be burned to withdraw exact assets (ceiling rounding)
pub fn preview_withdraw(ctx: Context<VaultView>, assets: u64) -> Result<()> {
    let shares = sync_vault::preview_withdraw(&ctx.accounts.vault, assets)?;
    set_return_data(&shares.to_le_bytes());
    Ok(())
}

/// Preview how many assets would be received for redeeming shares (floor rounding)
pub fn preview_redeem(ctx: Context<VaultView>, shares: u64) -> Result<()> {
    let assets = sync_vault::preview_redeem(&ctx.accounts.vault, shares)?;
    set_return_data(&assets.to_le_bytes());
    Ok(())
}

/// Convert assets to shares (floor rounding)
pub fn convert_to_shares_view(ctx: Context<VaultView>, assets: u64) -> Result<()> {
    let vault = &ctx.accounts.vault;
    let shares = convert_to_shares(assets, vault.total_assets, vault.total_shares, Rounding::Floor)?;
    set_return_data(&shares.to_le_bytes());
    Ok(())
}

/// Convert shares to assets (floor rounding)
pub fn convert_to_assets_view(ctx: Context<VaultView>, shares: u64) -> Result<()> {
    let vault = &ctx.accounts.vault;
    let assets = convert_to_assets(shares, vault.total_assets, vault.total_shares, Rounding::Floor)?;
    set_return_data(&assets.to_le_bytes());
    Ok(())
}

/// Assets backing live shares (request escrow excluded)
pub fn get_total_assets(ctx: Context<VaultView>) -> Result<()> {
    set_return_data(&ctx.accounts.vault.total_assets.to_le_bytes());
    Ok(())
}

pub fn total_supply(ctx: Context<VaultView>) -> Result<()> {
    set_return_data(&ledger::total_shares(&ctx.accounts.vault).to_le_bytes());
    Ok(())
}

pub fn balance_of(ctx: Context<PositionView>) -> Result<()> {
    set_return_data(&ledger::balance_of(&ctx.accounts.position).to_le_bytes());
    Ok(())
}

/// Sync: u64::MAX unless paused. Async: assets claimable from the deposit request.
pub fn max_deposit(ctx: Context<VaultViewWithOwner>) -> Result<()> {
    let vault = &ctx.accounts.vault;
    let max_assets = match vault.mode {
        VaultMode::Synchronous => sync_vault::max_deposit(vault),
        VaultMode::Asynchronous => {
            let now = Clock::get()?.unix_timestamp;
            deposit_request(&ctx.accounts).map_or(0, |r| async_vault::max_deposit(r, now))
        }
    };
    set_return_data(&max_assets.to_le_bytes());
    Ok(())
}

/// Sync: u64::MAX unless paused. Async: shares the deposit request converts to.
pub fn max_mint(ctx: Context<VaultViewWithOwner>) -> Result<()> {
    let vault = &ctx.accounts.vault;
    let max_shares = match vault.mode {
        VaultMode::Synchronous => sync_vault::max_mint(vault),
        VaultMode::Asynchronous => {
            let now = Clock::get()?.unix_timestamp;
            match deposit_request(&ctx.accounts) {
                Some(request) => async_vault::max_mint(vault, request, now)?,
                None => 0,
            }
        }
    };
    set_return_data(&max_shares.to_le_bytes());
    Ok(())
}

/// Sync: unlocked shares valued at the current rate. Async: claimable escrowed assets.
pub fn max_withdraw(ctx: Context<VaultViewWithOwner>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault = &ctx.accounts.vault;
    let max_assets = match vault.mode {
        VaultMode::Synchronous => match ctx.accounts.position.as_deref() {
            Some(position) => sync_vault::max_withdraw(vault, position, now)?,
            None => 0,
        },
        VaultMode::Asynchronous => {
            redeem_request(&ctx.accounts).map_or(0, |r| async_vault::max_withdraw(r, now))
        }
    };
    set_return_data(&max_assets.to_le_bytes());
    Ok(())
}

/// Sync: unlocked shares. Async: claimable shares of the redeem request.
pub fn max_redeem(ctx: Context<VaultViewWithOwner>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault = &ctx.accounts.vault;
    let max_shares = match vault.mode {
        VaultMode::Synchronous => ctx
            .accounts
            .position
            .as_deref()
            .map_or(0, |p| sync_vault::max_redeem(vault, p, now)),
        VaultMode::Asynchronous => {
            redeem_request(&ctx.accounts).map_or(0, |r| async_vault::max_redeem(r, now))
        }
    };
    set_return_data(&max_shares.to_le_bytes());
    Ok(())
}

/// Accrued plus unsettled reward of one token
pub fn get_user_reward(ctx: Context<PositionView>, mint: Pubkey) -> Result<()> {
    let amount = rewards::pending_reward(&ctx.accounts.vault, &ctx.accounts.position, &mint)?;
    set_return_data(&amount.to_le_bytes());
    Ok(())
}

/// Accrued plus unsettled reward of every registered token, in registration order
pub fn get_all_rewards(ctx: Context<PositionView>) -> Result<Vec<RewardBalance>> {
    rewards::all_rewards(&ctx.accounts.vault, &ctx.accounts.position)
}

/// Outstanding amount of a request (assets for deposits, shares for redeems)
pub fn pending_request(ctx: Context<RequestView>) -> Result<()> {
    set_return_data(&ctx.accounts.request.pending_amount.to_le_bytes());
    Ok(())
}

/// Part of a request that can be claimed right now
pub fn claimable_request(ctx: Context<RequestView>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let amount = async_vault::claimable_amount(&ctx.accounts.request, now);
    set_return_data(&amount.to_le_bytes());
    Ok(())
}

fn deposit_request<'a>(accounts: &'a VaultViewWithOwner) -> Option<&'a PendingRequest> {
    accounts
        .request
        .as_deref()
        .filter(|r| r.kind == RequestKind::Deposit)
}

fn redeem_request<'a>(accounts: &'a VaultViewWithOwner) -> Option<&'a PendingRequest> {
    accounts
        .request
        .as_deref()
        .filter(|r| r.kind == RequestKind::Redeem)
}
