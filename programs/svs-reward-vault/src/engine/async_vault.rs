//! Two-phase request / claim settlement.
//!
//! Every `(controller, kind)` pair owns one `PendingRequest` that moves
//! through `None -> Pending -> Claimable -> None`. Deposit requests are
//! claimable as soon as they are made and convert at the rate of the claim.
//! Redeem requests burn shares up front, escrow the assets they were worth
//! at request time, and become claimable once `shares_lock_time` has passed.

use anchor_lang::prelude::*;

use crate::{
    engine::{ledger, rewards},
    error::{limit_exceeded, VaultError},
    math::{convert_to_assets, convert_to_shares, mul_div, Rounding},
    state::{PendingRequest, Position, RequestState, RewardVault, VaultMode},
};

fn require_open(vault: &RewardVault) -> Result<()> {
    vault.require_mode(VaultMode::Asynchronous)?;
    require!(!vault.paused, VaultError::VaultPaused);
    Ok(())
}

/// The controller itself, or an operator approved on the controller's position.
pub fn require_controller(
    request: &PendingRequest,
    caller: &Pubkey,
    controller_position: Option<&Position>,
) -> Result<()> {
    if request.controller == *caller {
        return Ok(());
    }
    match controller_position {
        Some(position) if position.owner == request.controller && position.is_authorized(caller) => {
            Ok(())
        }
        _ => err!(VaultError::Unauthorized),
    }
}

/// Amount that can be claimed right now: the pending amount once claimable.
pub fn claimable_amount(request: &PendingRequest, now: i64) -> u64 {
    match request.state(now) {
        RequestState::Claimable => request.pending_amount,
        RequestState::None | RequestState::Pending => 0,
    }
}

/// Escrow `assets` from `owner` for `controller`.
pub fn request_deposit(
    vault: &mut RewardVault,
    request: &mut PendingRequest,
    controller: &Pubkey,
    owner: &Pubkey,
    assets: u64,
    now: i64,
) -> Result<()> {
    require_open(vault)?;
    require!(assets > 0, VaultError::InvalidAssetAmount);
    require!(
        *controller != Pubkey::default() && *owner != Pubkey::default(),
        VaultError::InvalidOwner
    );

    request.pending_amount = request
        .pending_amount
        .checked_add(assets)
        .ok_or(VaultError::MathOverflow)?;
    request.requested_at = now;
    request.claimable_at = now;

    vault.pending_deposit_assets = vault
        .pending_deposit_assets
        .checked_add(assets)
        .ok_or(VaultError::MathOverflow)?;

    Ok(())
}

/// Claim `assets` of a deposit request as shares at the current rate.
pub fn claim_deposit(
    vault: &mut RewardVault,
    request: &mut PendingRequest,
    receiver: &mut Position,
    receiver_key: &Pubkey,
    assets: u64,
    now: i64,
) -> Result<u64> {
    require_open(vault)?;
    require!(*receiver_key != Pubkey::default(), VaultError::InvalidReceiver);
    require!(assets > 0, VaultError::InvalidAssetAmount);

    let available = claimable_amount(request, now);
    if assets > available {
        return Err(limit_exceeded(
            VaultError::MaxDepositRequestExceeded,
            request.controller,
            assets,
            available,
        ));
    }

    let shares = convert_to_shares(assets, vault.total_assets, vault.total_shares, Rounding::Floor)?;
    require!(shares > 0, VaultError::ZeroShares);

    settle_deposit_claim(vault, request, receiver, assets, shares, now)?;
    Ok(shares)
}

/// Claim exact `shares` out of a deposit request; returns assets consumed.
pub fn claim_mint(
    vault: &mut RewardVault,
    request: &mut PendingRequest,
    receiver: &mut Position,
    receiver_key: &Pubkey,
    shares: u64,
    now: i64,
) -> Result<u64> {
    require_open(vault)?;
    require!(*receiver_key != Pubkey::default(), VaultError::InvalidReceiver);
    require!(shares > 0, VaultError::ZeroShares);

    let assets = convert_to_assets(shares, vault.total_assets, vault.total_shares, Rounding::Ceiling)?;
    let available = claimable_amount(request, now);
    if assets > available {
        return Err(limit_exceeded(
            VaultError::MaxDepositRequestExceeded,
            request.controller,
            assets,
            available,
        ));
    }

    settle_deposit_claim(vault, request, receiver, assets, shares, now)?;
    Ok(assets)
}

fn settle_deposit_claim(
    vault: &mut RewardVault,
    request: &mut PendingRequest,
    receiver: &mut Position,
    assets: u64,
    shares: u64,
    now: i64,
) -> Result<()> {
    rewards::settle(vault, receiver)?;
    ledger::mint(vault, receiver, shares, now)?;

    request.pending_amount -= assets;
    vault.pending_deposit_assets = vault
        .pending_deposit_assets
        .checked_sub(assets)
        .ok_or(VaultError::MathOverflow)?;
    vault.total_assets = vault
        .total_assets
        .checked_add(assets)
        .ok_or(VaultError::MathOverflow)?;

    Ok(())
}

/// Burn unlocked `shares` of `owner` into a redeem request for `controller`.
/// Returns the assets escrowed for them.
pub fn request_redeem(
    vault: &mut RewardVault,
    request: &mut PendingRequest,
    owner: &mut Position,
    caller: &Pubkey,
    controller: &Pubkey,
    shares: u64,
    now: i64,
) -> Result<u64> {
    require_open(vault)?;
    require!(shares > 0, VaultError::InvalidSharesAmount);
    require!(
        *controller != Pubkey::default() && owner.owner != Pubkey::default(),
        VaultError::InvalidOwner
    );
    owner.require_authorized(caller)?;

    let available = ledger::unlocked_shares(vault, owner, now);
    if shares > available {
        return Err(limit_exceeded(
            VaultError::MaxRedeemRequestExceeded,
            *controller,
            shares,
            available,
        ));
    }

    let assets = convert_to_assets(shares, vault.total_assets, vault.total_shares, Rounding::Floor)?;
    require!(assets <= vault.total_assets, VaultError::InsufficientAssets);

    rewards::settle(vault, owner)?;
    ledger::burn(vault, owner, shares, now)?;

    vault.total_assets -= assets;
    vault.pending_redeem_assets = vault
        .pending_redeem_assets
        .checked_add(assets)
        .ok_or(VaultError::MathOverflow)?;

    request.pending_amount = request
        .pending_amount
        .checked_add(shares)
        .ok_or(VaultError::MathOverflow)?;
    request.pending_assets = request
        .pending_assets
        .checked_add(assets)
        .ok_or(VaultError::MathOverflow)?;
    request.requested_at = now;
    request.claimable_at = now
        .checked_add(vault.shares_lock_time)
        .ok_or(VaultError::MathOverflow)?;

    Ok(assets)
}

fn require_redeem_claimable(request: &PendingRequest, requested: u64, now: i64) -> Result<()> {
    match request.state(now) {
        RequestState::Claimable => Ok(()),
        RequestState::None | RequestState::Pending => Err(limit_exceeded(
            VaultError::MaxRedeemRequestExceeded,
            request.controller,
            requested,
            0,
        )),
    }
}

/// Claim `shares` of a redeem request; returns the escrowed assets released.
pub fn claim_redeem(
    vault: &mut RewardVault,
    request: &mut PendingRequest,
    receiver_key: &Pubkey,
    shares: u64,
    now: i64,
) -> Result<u64> {
    require_open(vault)?;
    require!(*receiver_key != Pubkey::default(), VaultError::InvalidReceiver);
    require!(shares > 0, VaultError::InvalidSharesAmount);
    require_redeem_claimable(request, shares, now)?;

    if shares > request.pending_amount {
        return Err(limit_exceeded(
            VaultError::ExceededMaxRedeem,
            request.controller,
            shares,
            request.pending_amount,
        ));
    }

    let assets = if shares == request.pending_amount {
        request.pending_assets
    } else {
        mul_div(shares, request.pending_assets, request.pending_amount, Rounding::Floor)?
    };

    release_redeem_claim(vault, request, shares, assets)?;
    Ok(assets)
}

/// Claim exact `assets` of a redeem request; returns the request shares consumed.
pub fn claim_withdraw(
    vault: &mut RewardVault,
    request: &mut PendingRequest,
    receiver_key: &Pubkey,
    assets: u64,
    now: i64,
) -> Result<u64> {
    require_open(vault)?;
    require!(*receiver_key != Pubkey::default(), VaultError::InvalidReceiver);
    require!(assets > 0, VaultError::InvalidAssetAmount);
    require_redeem_claimable(request, assets, now)?;

    if assets > request.pending_assets {
        return Err(limit_exceeded(
            VaultError::ExceededMaxWithdraw,
            request.controller,
            assets,
            request.pending_assets,
        ));
    }

    let shares = if assets == request.pending_assets {
        request.pending_amount
    } else {
        mul_div(assets, request.pending_amount, request.pending_assets, Rounding::Ceiling)?
    };

    // A partial claim must leave at least one request share behind the remaining assets
    if assets < request.pending_assets && shares >= request.pending_amount {
        let partial = mul_div(
            request.pending_amount.saturating_sub(1),
            request.pending_assets,
            request.pending_amount,
            Rounding::Floor,
        )?;
        return Err(limit_exceeded(
            VaultError::ExceededMaxWithdraw,
            request.controller,
            assets,
            partial,
        ));
    }

    release_redeem_claim(vault, request, shares, assets)?;
    Ok(shares)
}

fn release_redeem_claim(
    vault: &mut RewardVault,
    request: &mut PendingRequest,
    shares: u64,
    assets: u64,
) -> Result<()> {
    request.pending_amount = request
        .pending_amount
        .checked_sub(shares)
        .ok_or(VaultError::MathOverflow)?;
    request.pending_assets = request
        .pending_assets
        .checked_sub(assets)
        .ok_or(VaultError::MathOverflow)?;
    vault.pending_redeem_assets = vault
        .pending_redeem_assets
        .checked_sub(assets)
        .ok_or(VaultError::MathOverflow)?;
    // escrow never outlives the request shares that claim it
    require!(
        request.pending_amount > 0 || request.pending_assets == 0,
        VaultError::MathOverflow
    );
    Ok(())
}

/// Assets a controller can claim from its deposit request right now.
pub fn max_deposit(request: &PendingRequest, now: i64) -> u64 {
    claimable_amount(request, now)
}

/// Shares a controller can mint from its deposit request right now.
pub fn max_mint(vault: &RewardVault, request: &PendingRequest, now: i64) -> Result<u64> {
    convert_to_shares(
        claimable_amount(request, now),
        vault.total_assets,
        vault.total_shares,
        Rounding::Floor,
    )
}

/// Shares a controller can redeem from its redeem request right now.
pub fn max_redeem(request: &PendingRequest, now: i64) -> u64 {
    claimable_amount(request, now)
}

/// Assets a controller can withdraw from its redeem request right now.
pub fn max_withdraw(request: &PendingRequest, now: i64) -> u64 {
    match request.state(now) {
        RequestState::Claimable => request.pending_assets,
        RequestState::None | RequestState::Pending => 0,
    }
}
