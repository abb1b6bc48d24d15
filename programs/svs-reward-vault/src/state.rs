use anchor_lang::prelude::*;

use crate::{
    constants::{MAX_LOTS, MAX_OPERATORS, MAX_REWARD_TOKENS},
    error::VaultError,
};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum VaultMode {
    /// Deposits and redemptions settle in the same instruction
    Synchronous,
    /// Deposits and redemptions go through request / claim
    Asynchronous,
}

#[account]
pub struct RewardVault {
    /// Vault admin: pause/unpause, authority transfer, reward allowlist
    pub authority: Pubkey,
    /// Underlying asset mint
    pub asset_mint: Pubkey,
    /// Token account holding assets (live, escrowed deposits and escrowed redemptions)
    pub asset_vault: Pubkey,
    /// Shares outstanding across all positions
    pub total_shares: u64,
    /// Assets backing the live shares (drives the exchange rate)
    pub total_assets: u64,
    /// Assets escrowed by deposit requests, not yet converted to shares
    pub pending_deposit_assets: u64,
    /// Assets escrowed for redeem requests, shares already burned
    pub pending_redeem_assets: u64,
    /// Seconds after a deposit before any of it unlocks
    pub cliff: i64,
    /// Seconds over which a lot unlocks linearly after the cliff
    pub unlock_duration: i64,
    /// Minimum delay between a redeem request and its claim (async only)
    pub shares_lock_time: i64,
    pub mode: VaultMode,
    /// Emergency pause flag
    pub paused: bool,
    /// PDA bump seed
    pub bump: u8,
    /// Unique vault identifier (allows multiple vaults per asset)
    pub vault_id: u64,
    /// Registered reward tokens, in registration order
    pub reward_tokens: Vec<RewardToken>,
    /// Reserved for future upgrades
    pub _reserved: [u8; 64],
}

impl RewardVault {
    pub const LEN: usize = 8 +  // discriminator
        32 +  // authority
        32 +  // asset_mint
        32 +  // asset_vault
        8 +   // total_shares
        8 +   // total_assets
        8 +   // pending_deposit_assets
        8 +   // pending_redeem_assets
        8 +   // cliff
        8 +   // unlock_duration
        8 +   // shares_lock_time
        1 +   // mode
        1 +   // paused
        1 +   // bump
        8 +   // vault_id
        4 + MAX_REWARD_TOKENS * RewardToken::LEN + // reward_tokens
        64; // _reserved

    pub fn reward_token(&self, mint: &Pubkey) -> Option<&RewardToken> {
        self.reward_tokens.iter().find(|t| t.mint == *mint)
    }

    pub fn reward_token_mut(&mut self, mint: &Pubkey) -> Option<&mut RewardToken> {
        self.reward_tokens.iter_mut().find(|t| t.mint == *mint)
    }

    pub fn require_mode(&self, mode: VaultMode) -> Result<()> {
        require!(self.mode == mode, VaultError::WrongVaultMode);
        Ok(())
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct RewardToken {
    pub mint: Pubkey,
    /// Vault-owned token account holding this reward
    pub reward_account: Pubkey,
    /// Monotonic index, scaled by REWARD_PRECISION
    pub cumulative_reward_per_share: u128,
    pub total_received: u64,
    pub total_claimed: u64,
}

impl RewardToken {
    pub const LEN: usize = 32 + 32 + 16 + 8 + 8;

    pub fn new(mint: Pubkey, reward_account: Pubkey) -> Self {
        Self {
            mint,
            reward_account,
            cumulative_reward_per_share: 0,
            total_received: 0,
            total_claimed: 0,
        }
    }
}

/// A deposit tagged with its timestamp: the unit of vesting.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lot {
    /// Shares the lot vests over
    pub amount: u64,
    /// Shares already consumed from the lot
    pub redeemed: u64,
    pub deposit_time: i64,
}

impl Lot {
    pub const LEN: usize = 8 + 8 + 8;

    pub fn new(amount: u64, deposit_time: i64) -> Self {
        Self {
            amount,
            redeemed: 0,
            deposit_time,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.amount.saturating_sub(self.redeemed)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardCheckpoint {
    pub mint: Pubkey,
    /// Index value at the holder's last settlement
    pub index: u128,
    /// Settled, not yet claimed
    pub accrued: u64,
}

impl RewardCheckpoint {
    pub const LEN: usize = 32 + 16 + 8;
}

/// Per-holder share balance, vesting lots and reward checkpoints.
#[account]
pub struct Position {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub share_balance: u64,
    /// Oldest first
    pub lots: Vec<Lot>,
    pub rewards: Vec<RewardCheckpoint>,
    /// Principals allowed to withdraw, redeem and claim on the owner's behalf
    pub operators: Vec<Pubkey>,
    pub bump: u8,
}

impl Position {
    pub const LEN: usize = 8 + // discriminator
        32 + // vault
        32 + // owner
        8 +  // share_balance
        4 + MAX_LOTS * Lot::LEN +
        4 + MAX_REWARD_TOKENS * RewardCheckpoint::LEN +
        4 + MAX_OPERATORS * 32 +
        1; // bump

    pub fn new(vault: Pubkey, owner: Pubkey, bump: u8) -> Self {
        Self {
            vault,
            owner,
            share_balance: 0,
            lots: Vec::new(),
            rewards: Vec::new(),
            operators: Vec::new(),
            bump,
        }
    }

    /// Fill in identity fields of a freshly created (`init_if_needed`) position.
    pub fn ensure_initialized(&mut self, vault: Pubkey, owner: Pubkey, bump: u8) {
        if self.owner == Pubkey::default() {
            self.vault = vault;
            self.owner = owner;
            self.bump = bump;
        }
    }

    pub fn checkpoint(&self, mint: &Pubkey) -> Option<&RewardCheckpoint> {
        self.rewards.iter().find(|c| c.mint == *mint)
    }

    pub fn is_authorized(&self, caller: &Pubkey) -> bool {
        self.owner == *caller || self.operators.contains(caller)
    }

    pub fn require_authorized(&self, caller: &Pubkey) -> Result<()> {
        require!(self.is_authorized(caller), VaultError::Unauthorized);
        Ok(())
    }

    pub fn set_operator(&mut self, operator: Pubkey, approved: bool) -> Result<()> {
        let existing = self.operators.iter().position(|o| *o == operator);
        match (existing, approved) {
            (None, true) => {
                require!(
                    self.operators.len() < MAX_OPERATORS,
                    VaultError::TooManyOperators
                );
                self.operators.push(operator);
            }
            (Some(i), false) => {
                self.operators.remove(i);
            }
            _ => {}
        }
        Ok(())
    }

    /// A position with no shares, no lots and nothing left to claim.
    pub fn is_empty(&self) -> bool {
        self.share_balance == 0 && self.lots.is_empty() && self.rewards.iter().all(|c| c.accrued == 0)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    Deposit,
    Redeem,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestState {
    None,
    Pending,
    Claimable,
}

/// Outstanding asynchronous request of one kind for one controller.
#[account]
pub struct PendingRequest {
    pub vault: Pubkey,
    pub controller: Pubkey,
    pub kind: RequestKind,
    /// Assets for a deposit request, shares for a redeem request
    pub pending_amount: u64,
    /// Redeem only: assets escrowed at request time for `pending_amount` shares
    pub pending_assets: u64,
    pub requested_at: i64,
    pub claimable_at: i64,
    pub bump: u8,
}

impl PendingRequest {
    pub const LEN: usize = 8 + // discriminator
        32 + // vault
        32 + // controller
        1 +  // kind
        8 +  // pending_amount
        8 +  // pending_assets
        8 +  // requested_at
        8 +  // claimable_at
        1; // bump

    pub fn new(vault: Pubkey, controller: Pubkey, kind: RequestKind, bump: u8) -> Self {
        Self {
            vault,
            controller,
            kind,
            pending_amount: 0,
            pending_assets: 0,
            requested_at: 0,
            claimable_at: 0,
            bump,
        }
    }

    pub fn ensure_initialized(
        &mut self,
        vault: Pubkey,
        controller: Pubkey,
        kind: RequestKind,
        bump: u8,
    ) {
        if self.controller == Pubkey::default() {
            self.vault = vault;
            self.controller = controller;
            self.kind = kind;
            self.bump = bump;
        }
    }

    pub fn state(&self, now: i64) -> RequestState {
        if self.pending_amount == 0 {
            RequestState::None
        } else if now < self.claimable_at {
            RequestState::Pending
        } else {
            RequestState::Claimable
        }
    }
}

/// One entry of `get_all_rewards`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardBalance {
    pub mint: Pubkey,
    pub amount: u64,
}
