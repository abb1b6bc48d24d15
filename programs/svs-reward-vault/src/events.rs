use anchor_lang::prelude::*;

use crate::state::VaultMode;

#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub authority: Pubkey,
    pub asset_mint: Pubkey,
    pub vault_id: u64,
    pub mode: VaultMode,
    pub cliff: i64,
    pub unlock_duration: i64,
    pub shares_lock_time: i64,
}

#[event]
pub struct Deposit {
    pub vault: Pubkey,
    pub caller: Pubkey,
    pub owner: Pubkey,
    pub assets: u64,
    pub shares: u64,
}

#[event]
pub struct Withdraw {
    pub vault: Pubkey,
    pub caller: Pubkey,
    pub receiver: Pubkey,
    pub owner: Pubkey,
    pub assets: u64,
    pub shares: u64,
}

#[event]
pub struct DepositRequested {
    pub vault: Pubkey,
    pub controller: Pubkey,
    pub owner: Pubkey,
    pub assets: u64,
    pub pending: u64,
}

#[event]
pub struct RedeemRequested {
    pub vault: Pubkey,
    pub controller: Pubkey,
    pub owner: Pubkey,
    pub shares: u64,
    pub assets: u64,
    pub claimable_at: i64,
}

#[event]
pub struct DepositClaimed {
    pub vault: Pubkey,
    pub controller: Pubkey,
    pub receiver: Pubkey,
    pub assets: u64,
    pub shares: u64,
    pub remaining: u64,
}

#[event]
pub struct RedeemClaimed {
    pub vault: Pubkey,
    pub controller: Pubkey,
    pub receiver: Pubkey,
    pub assets: u64,
    pub shares: u64,
    pub remaining: u64,
}

#[event]
pub struct SharesTransferred {
    pub vault: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub shares: u64,
}

#[event]
pub struct RewardTokenRegistered {
    pub vault: Pubkey,
    pub mint: Pubkey,
    pub reward_account: Pubkey,
}

#[event]
pub struct RewardAdded {
    pub vault: Pubkey,
    pub mint: Pubkey,
    pub funder: Pubkey,
    pub amount: u64,
    pub cumulative_reward_per_share: u128,
}

#[event]
pub struct RewardClaimed {
    pub vault: Pubkey,
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub receiver: Pubkey,
    pub amount: u64,
}

#[event]
pub struct OperatorSet {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub operator: Pubkey,
    pub approved: bool,
}

#[event]
pub struct VaultSynced {
    pub vault: Pubkey,
    pub previous_total: u64,
    pub new_total: u64,
}

#[event]
pub struct VaultStatusChanged {
    pub vault: Pubkey,
    pub paused: bool,
}

#[event]
pub struct AuthorityTransferred {
    pub vault: Pubkey,
    pub previous_authority: Pubkey,
    pub new_authority: Pubkey,
}
