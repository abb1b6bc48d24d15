use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::{
    constants::{POSITION_SEED, VAULT_SEED},
    engine::rewards,
    error::VaultError,
    events::RewardClaimed,
    state::{Position, RewardVault},
};

#[derive(Accounts)]
pub struct ClaimReward<'info> {
    /// Position owner or one of its operators
    pub caller: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, RewardVault>,

    #[account(
        mut,
        has_one = vault,
        seeds = [POSITION_SEED, vault.key().as_ref(), position.owner.as_ref()],
        bump = position.bump,
    )]
    pub position: Account<'info, Position>,

    pub reward_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        token::mint = reward_mint,
        token::authority = vault,
        token::token_program = reward_token_program,
    )]
    pub reward_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        constraint = receiver_reward_account.mint == reward_mint.key(),
    )]
    pub receiver_reward_account: InterfaceAccount<'info, TokenAccount>,

    pub reward_token_program: Interface<'info, TokenInterface>,
}

/// Accounts for every reward token are passed in `remaining_accounts` as
/// `[mint, vault reward account, receiver token account]` triples, in
/// registration order starting at `start_index`.
#[derive(Accounts)]
pub struct ClaimAllReward<'info> {
    /// Position owner or one of its operators
    pub caller: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, RewardVault>,

    #[account(
        mut,
        has_one = vault,
        seeds = [POSITION_SEED, vault.key().as_ref(), position.owner.as_ref()],
        bump = position.bump,
    )]
    pub position: Account<'info, Position>,

    pub reward_token_program: Interface<'info, TokenInterface>,
}

/// Claim accrued rewards of one token; `None` claims everything accrued.
/// An unregistered token or nothing accrued is a no-op.
pub fn handler(ctx: Context<ClaimReward>, amount: Option<u64>) -> Result<()> {
    let caller = ctx.accounts.caller.key();
    let mint = ctx.accounts.reward_mint.key();
    let receiver = ctx.accounts.receiver_reward_account.owner;
    require!(receiver != Pubkey::default(), VaultError::InvalidReceiver);
    ctx.accounts.position.require_authorized(&caller)?;

    if let Some(token) = ctx.accounts.vault.reward_token(&mint) {
        require_keys_eq!(
            token.reward_account,
            ctx.accounts.reward_account.key(),
            VaultError::RewardAccountMismatch
        );
    }

    let claimed = rewards::claim(
        &mut ctx.accounts.vault,
        &mut ctx.accounts.position,
        &mint,
        amount,
    )?;
    if claimed == 0 {
        msg!("Nothing to claim for {}", mint);
        return Ok(());
    }

    let vault = &ctx.accounts.vault;
    let asset_mint_key = vault.asset_mint;
    let vault_id_bytes = vault.vault_id.to_le_bytes();
    let bump = vault.bump;
    let signer_seeds: &[&[&[u8]]] = &[&[
        VAULT_SEED,
        asset_mint_key.as_ref(),
        vault_id_bytes.as_ref(),
        &[bump],
    ]];

    transfer_checked(
        CpiContext::new_with_signer(
            ctx.accounts.reward_token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.reward_account.to_account_info(),
                to: ctx.accounts.receiver_reward_account.to_account_info(),
                mint: ctx.accounts.reward_mint.to_account_info(),
                authority: vault.to_account_info(),
            },
            signer_seeds,
        ),
        claimed,
        ctx.accounts.reward_mint.decimals,
    )?;

    emit!(RewardClaimed {
        vault: vault.key(),
        mint,
        owner: ctx.accounts.position.owner,
        receiver,
        amount: claimed,
    });

    Ok(())
}

/// Claim every reward token from `start_index` on, paying each one to
/// `receiver`'s token account.
pub fn claim_all<'info>(
    ctx: Context<'_, '_, 'info, 'info, ClaimAllReward<'info>>,
    start_index: u32,
    receiver: Pubkey,
) -> Result<()> {
    let caller = ctx.accounts.caller.key();
    require!(receiver != Pubkey::default(), VaultError::InvalidReceiver);
    ctx.accounts.position.require_authorized(&caller)?;

    let start = start_index as usize;
    let expected = ctx.accounts.vault.reward_tokens.len().saturating_sub(start);
    require!(
        ctx.remaining_accounts.len() == expected * 3,
        VaultError::InvalidRemainingAccounts
    );

    let balances = rewards::claim_all(
        &mut ctx.accounts.vault,
        &mut ctx.accounts.position,
        start,
    )?;

    let vault = &ctx.accounts.vault;
    let asset_mint_key = vault.asset_mint;
    let vault_id_bytes = vault.vault_id.to_le_bytes();
    let bump = vault.bump;
    let signer_seeds: &[&[&[u8]]] = &[&[
        VAULT_SEED,
        asset_mint_key.as_ref(),
        vault_id_bytes.as_ref(),
        &[bump],
    ]];

    for (balance, accounts) in balances.iter().zip(ctx.remaining_accounts.chunks(3)) {
        let token = vault
            .reward_token(&balance.mint)
            .ok_or(VaultError::UnknownRewardToken)?;
        let [mint_info, reward_info, receiver_info] = accounts else {
            return err!(VaultError::InvalidRemainingAccounts);
        };
        require_keys_eq!(*mint_info.key, token.mint, VaultError::InvalidRemainingAccounts);
        require_keys_eq!(
            *reward_info.key,
            token.reward_account,
            VaultError::InvalidRemainingAccounts
        );

        let mint = InterfaceAccount::<Mint>::try_from(mint_info)?;
        let receiver_account = InterfaceAccount::<TokenAccount>::try_from(receiver_info)?;
        require!(
            receiver_account.mint == token.mint && receiver_account.owner == receiver,
            VaultError::InvalidRemainingAccounts
        );

        if balance.amount == 0 {
            continue;
        }

        transfer_checked(
            CpiContext::new_with_signer(
                ctx.accounts.reward_token_program.to_account_info(),
                TransferChecked {
                    from: reward_info.clone(),
                    to: receiver_info.clone(),
                    mint: mint_info.clone(),
                    authority: vault.to_account_info(),
                },
                signer_seeds,
            ),
            balance.amount,
            mint.decimals,
        )?;

        emit!(RewardClaimed {
            vault: vault.key(),
            mint: balance.mint,
            owner: ctx.accounts.position.owner,
            receiver,
            amount: balance.amount,
        });
    }

    Ok(())
}
