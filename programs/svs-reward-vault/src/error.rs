use anchor_lang::prelude::*;

#[error_code]
pub enum VaultError {
    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Operation would mint or burn zero shares")]
    ZeroShares,

    #[msg("Receiver cannot be the null address")]
    InvalidReceiver,

    #[msg("Controller and owner cannot be the null address")]
    InvalidOwner,

    #[msg("Requested asset amount must be greater than zero")]
    InvalidAssetAmount,

    #[msg("Requested share amount must be greater than zero")]
    InvalidSharesAmount,

    #[msg("Slippage tolerance exceeded")]
    SlippageExceeded,

    #[msg("Vault is paused")]
    VaultPaused,

    #[msg("Instruction is not available in this vault mode")]
    WrongVaultMode,

    #[msg("Cliff, unlock duration or shares lock time out of range")]
    InvalidLockSchedule,

    #[msg("Arithmetic overflow")]
    MathOverflow,

    #[msg("Division by zero")]
    DivisionByZero,

    #[msg("Reward index fell below a holder checkpoint")]
    RewardIndexUnderflow,

    #[msg("Unauthorized - caller is not the owner, controller or an approved operator")]
    Unauthorized,

    #[msg("Withdraw exceeds the owner's unlocked assets")]
    ExceededMaxWithdraw,

    #[msg("Redeem exceeds the owner's unlocked shares")]
    ExceededMaxRedeem,

    #[msg("Not enough unlocked shares across vesting lots")]
    InsufficientUnlockedShares,

    #[msg("Insufficient assets in vault")]
    InsufficientAssets,

    #[msg("Claim exceeds the controller's pending deposit request")]
    MaxDepositRequestExceeded,

    #[msg("Redeem request exceeds the available or claimable amount")]
    MaxRedeemRequestExceeded,

    #[msg("Reward token cannot be the underlying asset")]
    RewardTokenIsUnderlying,

    #[msg("Reward token is not registered with this vault")]
    UnknownRewardToken,

    #[msg("Reward amount must be greater than zero")]
    ZeroRewardAmount,

    #[msg("Cannot add reward while no shares are staked")]
    NoSharesStaked,

    #[msg("Reward token allowlist is full")]
    TooManyRewardTokens,

    #[msg("Position holds too many vesting lots")]
    TooManyLots,

    #[msg("Operator list is full")]
    TooManyOperators,

    #[msg("Remaining accounts do not match the reward token list")]
    InvalidRemainingAccounts,

    #[msg("Position still holds shares or unclaimed rewards")]
    PositionNotEmpty,

    #[msg("Token account is not the vault's account for this reward token")]
    RewardAccountMismatch,
}

/// Builds a policy error that carries the offending principal and both
/// quantities so the caller can retry with a valid amount.
pub fn limit_exceeded(
    kind: VaultError,
    principal: Pubkey,
    requested: u64,
    available: u64,
) -> Error {
    msg!(
        "{}: principal={} requested={} available={}",
        kind,
        principal,
        requested,
        available
    );
    error!(kind).with_values((requested, available))
}
