use anchor_lang::prelude::*;

use crate::{constants::REWARD_PRECISION, error::VaultError};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rounding {
    Floor,
    Ceiling,
}

/// Convert assets to shares at the vault's current exchange rate.
///
/// Formula: shares = assets × total_shares / total_assets
///
/// An empty vault (no shares, or no backing assets) converts 1:1.
pub fn convert_to_shares(
    assets: u64,
    total_assets: u64,
    total_shares: u64,
    rounding: Rounding,
) -> Result<u64> {
    if total_shares == 0 || total_assets == 0 {
        return Ok(assets);
    }
    mul_div(assets, total_shares, total_assets, rounding)
}

/// Convert shares to assets at the vault's current exchange rate.
///
/// Formula: assets = shares × total_assets / total_shares
pub fn convert_to_assets(
    shares: u64,
    total_assets: u64,
    total_shares: u64,
    rounding: Rounding,
) -> Result<u64> {
    if total_shares == 0 {
        return Ok(shares);
    }
    mul_div(shares, total_assets, total_shares, rounding)
}

/// Safe multiplication then division with configurable rounding.
///
/// Computes: (value × numerator) / denominator
/// Uses u128 intermediate to prevent overflow.
pub fn mul_div(value: u64, numerator: u64, denominator: u64, rounding: Rounding) -> Result<u64> {
    require!(denominator > 0, VaultError::DivisionByZero);

    let product = (value as u128)
        .checked_mul(numerator as u128)
        .ok_or(VaultError::MathOverflow)?;

    let result = match rounding {
        Rounding::Floor => product / (denominator as u128),
        Rounding::Ceiling => {
            let denom = denominator as u128;
            product
                .checked_add(denom)
                .ok_or(VaultError::MathOverflow)?
                .checked_sub(1)
                .ok_or(VaultError::MathOverflow)?
                / denom
        }
    };

    require!(result <= u64::MAX as u128, VaultError::MathOverflow);
    Ok(result as u64)
}

/// Index increment for a reward injection: amount × PRECISION / total_shares, floor.
pub fn reward_per_share(amount: u64, total_shares: u64) -> Result<u128> {
    require!(total_shares > 0, VaultError::DivisionByZero);

    let scaled = (amount as u128)
        .checked_mul(REWARD_PRECISION)
        .ok_or(VaultError::MathOverflow)?;

    Ok(scaled / total_shares as u128)
}

/// Reward owed to `shares` for an index delta: shares × delta / PRECISION, floor.
pub fn reward_owed(shares: u64, index_delta: u128) -> Result<u64> {
    let owed = (shares as u128)
        .checked_mul(index_delta)
        .ok_or(VaultError::MathOverflow)?
        / REWARD_PRECISION;

    u64::try_from(owed).map_err(|_| error!(VaultError::MathOverflow))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_floor() {
        assert_eq!(mul_div(100, 3, 2, Rounding::Floor).unwrap(), 150);
        assert_eq!(mul_div(100, 1, 3, Rounding::Floor).unwrap(), 33);
    }

    #[test]
    fn test_mul_div_ceiling() {
        assert_eq!(mul_div(100, 3, 2, Rounding::Ceiling).unwrap(), 150);
        assert_eq!(mul_div(100, 1, 3, Rounding::Ceiling).unwrap(), 34);
    }

    #[test]
    fn test_convert_to_shares_empty_vault() {
        // First depositor gets shares 1:1
        let shares = convert_to_shares(1_000_000, 0, 0, Rounding::Floor).unwrap();
        assert_eq!(shares, 1_000_000);
    }

    #[test]
    fn test_convert_to_shares_after_yield() {
        // 2000 assets back 1000 shares: 500 assets buy 250 shares
        let shares = convert_to_shares(500, 2000, 1000, Rounding::Floor).unwrap();
        assert_eq!(shares, 250);
    }

    #[test]
    fn test_convert_to_assets_after_yield() {
        let assets = convert_to_assets(500, 2000, 1000, Rounding::Floor).unwrap();
        assert_eq!(assets, 1000);
    }

    #[test]
    fn test_rounding_favors_vault() {
        // 1000 assets back 333 shares
        let deposit_shares = convert_to_shares(100, 1000, 333, Rounding::Floor).unwrap();
        let withdraw_shares = convert_to_shares(100, 1000, 333, Rounding::Ceiling).unwrap();
        assert_eq!(deposit_shares, 33);
        assert_eq!(withdraw_shares, 34);

        let redeem_assets = convert_to_assets(10, 1000, 333, Rounding::Floor).unwrap();
        let mint_assets = convert_to_assets(10, 1000, 333, Rounding::Ceiling).unwrap();
        assert_eq!(redeem_assets, 30);
        assert_eq!(mint_assets, 31);
    }

    #[test]
    fn test_division_by_zero() {
        assert!(mul_div(100, 100, 0, Rounding::Floor).is_err());
        assert!(reward_per_share(100, 0).is_err());
    }

    #[test]
    fn test_reward_index_roundtrip_never_overpays() {
        // 10 reward over 3 shares: each share is owed 3, one unit of dust stays behind
        let delta = reward_per_share(10, 3).unwrap();
        assert_eq!(reward_owed(1, delta).unwrap(), 3);
        assert_eq!(reward_owed(3, delta).unwrap(), 9);
    }

    #[test]
    fn test_max_values() {
        let large = u64::MAX / 2;
        assert!(convert_to_shares(large, large, large, Rounding::Floor).is_ok());
        assert!(reward_per_share(u64::MAX, 1).is_ok());
    }
}
