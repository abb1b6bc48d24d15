use anchor_lang::prelude::*;

pub mod constants;
pub mod engine;
pub mod error;
pub mod events;
pub mod instructions;
pub mod math;
pub mod state;

use instructions::*;
use state::RewardBalance;

declare_id!("7gSmoowKmbTbWCefhjSYZG15GA56zrMJyFCxmLkQK8Uz");

#[program]
pub mod svs_reward_vault {
    use super::*;

    /// Initialize a new vault for the given asset with its lock schedule
    pub fn initialize(ctx: Context<Initialize>, params: InitializeParams) -> Result<()> {
        instructions::initialize::handler(ctx, params)
    }

    /// Add a reward token to the allowlist (authority only)
    pub fn register_reward_token(ctx: Context<RegisterRewardToken>) -> Result<()> {
        instructions::register_reward_token::handler(ctx)
    }

    /// Create an empty position for the signer
    pub fn open_position(ctx: Context<OpenPosition>) -> Result<()> {
        instructions::position::open(ctx)
    }

    /// Approve or revoke an operator on the signer's position
    pub fn set_operator(ctx: Context<SetOperator>, operator: Pubkey, approved: bool) -> Result<()> {
        instructions::position::set_operator(ctx, operator, approved)
    }

    /// Close an empty position and reclaim rent
    pub fn close_position(ctx: Context<ClosePosition>) -> Result<()> {
        instructions::position::close(ctx)
    }

    // ============ Synchronous vault ============

    /// Deposit assets and receive vesting shares
    /// Returns shares minted (floor rounding - favors vault)
    pub fn deposit(ctx: Context<Deposit>, assets: u64, min_shares_out: u64) -> Result<()> {
        instructions::deposit::handler(ctx, assets, min_shares_out)
    }

    /// Mint exact shares by depositing required assets
    /// Pays assets (ceiling rounding - favors vault)
    pub fn mint(ctx: Context<MintShares>, shares: u64, max_assets_in: u64) -> Result<()> {
        instructions::mint::handler(ctx, shares, max_assets_in)
    }

    /// Withdraw exact assets by burning unlocked shares
    /// Burns shares (ceiling rounding - favors vault)
    pub fn withdraw(ctx: Context<Withdraw>, assets: u64, max_shares_in: u64) -> Result<()> {
        instructions::withdraw::handler(ctx, assets, max_shares_in)
    }

    /// Redeem unlocked shares for assets
    /// Receives assets (floor rounding - favors vault)
    pub fn redeem(ctx: Context<Redeem>, shares: u64, min_assets_out: u64) -> Result<()> {
        instructions::redeem::handler(ctx, shares, min_assets_out)
    }

    // ============ Asynchronous vault ============

    /// Escrow assets into a deposit request for a controller
    pub fn request_deposit(ctx: Context<RequestDeposit>, assets: u64) -> Result<()> {
        instructions::request_deposit::handler(ctx, assets)
    }

    /// Claim assets of a deposit request as shares
    pub fn claim_deposit(ctx: Context<ClaimDeposit>, assets: u64) -> Result<()> {
        instructions::claim_deposit::handler(ctx, assets)
    }

    /// Claim exact shares out of a deposit request
    pub fn claim_mint(ctx: Context<ClaimDeposit>, shares: u64) -> Result<()> {
        instructions::claim_deposit::mint_handler(ctx, shares)
    }

    /// Burn unlocked shares into a redeem request
    pub fn request_redeem(ctx: Context<RequestRedeem>, shares: u64) -> Result<()> {
        instructions::request_redeem::handler(ctx, shares)
    }

    /// Claim exact assets of a redeem request
    pub fn claim_withdraw(ctx: Context<ClaimRedeem>, assets: u64) -> Result<()> {
        instructions::claim_redeem::withdraw_handler(ctx, assets)
    }

    /// Claim shares of a redeem request for their escrowed assets
    pub fn claim_redeem(ctx: Context<ClaimRedeem>, shares: u64) -> Result<()> {
        instructions::claim_redeem::handler(ctx, shares)
    }

    // ============ Shares and rewards ============

    /// Move unlocked shares to another holder
    pub fn transfer_shares(ctx: Context<TransferShares>, shares: u64) -> Result<()> {
        instructions::transfer_shares::handler(ctx, shares)
    }

    /// Distribute a reward over all outstanding shares
    pub fn add_reward(ctx: Context<AddReward>, amount: u64) -> Result<()> {
        instructions::add_reward::handler(ctx, amount)
    }

    /// Claim accrued rewards of one token (all of it when `amount` is None)
    pub fn claim_reward(ctx: Context<ClaimReward>, amount: Option<u64>) -> Result<()> {
        instructions::claim_reward::handler(ctx, amount)
    }

    /// Claim every reward token from `start_index` on
    pub fn claim_all_reward<'info>(
        ctx: Context<'_, '_, 'info, 'info, ClaimAllReward<'info>>,
        start_index: u32,
        receiver: Pubkey,
    ) -> Result<()> {
        instructions::claim_reward::claim_all(ctx, start_index, receiver)
    }

    // ============ Admin ============

    /// Halt deposits, withdrawals, requests and share transfers (emergency)
    pub fn pause(ctx: Context<VaultAuthority>) -> Result<()> {
        instructions::admin::set_paused(ctx, true)
    }

    /// Resume vault operations
    pub fn unpause(ctx: Context<VaultAuthority>) -> Result<()> {
        instructions::admin::set_paused(ctx, false)
    }

    /// Transfer vault authority
    pub fn transfer_authority(ctx: Context<VaultAuthority>, new_authority: Pubkey) -> Result<()> {
        instructions::admin::transfer_authority(ctx, new_authority)
    }

    /// Recompute total_assets from the asset account, net of request escrow
    pub fn sync(ctx: Context<SyncAssets>) -> Result<()> {
        instructions::admin::sync(ctx)
    }

    // ============ View Functions (CPI composable) ============

    /// Preview shares for deposit (floor rounding)
    pub fn preview_deposit(ctx: Context<VaultView>, assets: u64) -> Result<()> {
        instructions::view::preview_deposit(ctx, assets)
    }

    /// Preview assets required for mint (ceiling rounding)
    pub fn preview_mint(ctx: Context<VaultView>, shares: u64) -> Result<()> {
        instructions::view::preview_mint(ctx, shares)
    }

    /// Preview shares to burn for withdraw (ceiling rounding)
    pub fn preview_withdraw(ctx: Context<VaultView>, assets: u64) -> Result<()> {
        instructions::view::preview_withdraw(ctx, assets)
    }

    /// Preview assets for redeem (floor rounding)
    pub fn preview_redeem(ctx: Context<VaultView>, shares: u64) -> Result<()> {
        instructions::view::preview_redeem(ctx, shares)
    }

    /// Convert assets to shares (floor rounding)
    pub fn convert_to_shares(ctx: Context<VaultView>, assets: u64) -> Result<()> {
        instructions::view::convert_to_shares_view(ctx, assets)
    }

    /// Convert shares to assets (floor rounding)
    pub fn convert_to_assets(ctx: Context<VaultView>, shares: u64) -> Result<()> {
        instructions::view::convert_to_assets_view(ctx, shares)
    }

    /// Get total assets backing live shares
    pub fn total_assets(ctx: Context<VaultView>) -> Result<()> {
        instructions::view::get_total_assets(ctx)
    }

    /// Get shares outstanding
    pub fn total_supply(ctx: Context<VaultView>) -> Result<()> {
        instructions::view::total_supply(ctx)
    }

    /// Get a position's share balance
    pub fn balance_of(ctx: Context<PositionView>) -> Result<()> {
        instructions::view::balance_of(ctx)
    }

    /// Max assets depositable (or claimable from a deposit request)
    pub fn max_deposit(ctx: Context<VaultViewWithOwner>) -> Result<()> {
        instructions::view::max_deposit(ctx)
    }

    /// Max shares mintable (or claimable from a deposit request)
    pub fn max_mint(ctx: Context<VaultViewWithOwner>) -> Result<()> {
        instructions::view::max_mint(ctx)
    }

    /// Max assets owner can withdraw
    pub fn max_withdraw(ctx: Context<VaultViewWithOwner>) -> Result<()> {
        instructions::view::max_withdraw(ctx)
    }

    /// Max shares owner can redeem
    pub fn max_redeem(ctx: Context<VaultViewWithOwner>) -> Result<()> {
        instructions::view::max_redeem(ctx)
    }

    /// Pending reward of one token for a position
    pub fn get_user_reward(ctx: Context<PositionView>, mint: Pubkey) -> Result<()> {
        instructions::view::get_user_reward(ctx, mint)
    }

    /// Pending rewards of every registered token for a position
    pub fn get_all_rewards(ctx: Context<PositionView>) -> Result<Vec<RewardBalance>> {
        instructions::view::get_all_rewards(ctx)
    }

    /// Outstanding amount of a request
    pub fn pending_request(ctx: Context<RequestView>) -> Result<()> {
        instructions::view::pending_request(ctx)
    }

    /// Claimable amount of a request
    pub fn claimable_request(ctx: Context<RequestView>) -> Result<()> {
        instructions::view::claimable_request(ctx)
    }
}
