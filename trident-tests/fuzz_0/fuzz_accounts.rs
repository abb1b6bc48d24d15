use trident_fuzz::fuzzing::*;

/// Storage for all account addresses used in fuzz testing.
///
/// Docs: https://ackee.xyz/trident/docs/latest/trident-api-macro/trident-types/fuzz-accounts/
#[derive(Default)]
pub struct AccountAddresses {
    pub authority: AddressStorage,

    pub vault: AddressStorage,

    pub asset_mint: AddressStorage,

    pub asset_vault: AddressStorage,

    pub reward_mint: AddressStorage,

    pub reward_account: AddressStorage,

    pub holder: AddressStorage,

    pub position: AddressStorage,

    pub request: AddressStorage,

    pub asset_token_program: AddressStorage,

    pub associated_token_program: AddressStorage,

    pub system_program: AddressStorage,
}
