pub mod add_reward;
pub mod admin;
pub mod claim_deposit;
pub mod claim_redeem;
pub mod claim_reward;
pub mod deposit;
pub mod initialize;
pub mod mint;
pub mod position;
pub mod redeem;
pub mod register_reward_token;
pub mod request_deposit;
pub mod request_redeem;
pub mod transfer_shares;
pub mod view;
pub mod withdraw;

#[allow(ambiguous_glob_reexports)]
pub use add_reward::*;
#[allow(ambiguous_glob_reexports)]
pub use admin::*;
#[allow(ambiguous_glob_reexports)]
pub use claim_deposit::*;
#[allow(ambiguous_glob_reexports)]
pub use claim_redeem::*;
#[allow(ambiguous_glob_reexports)]
pub use claim_reward::*;
#[allow(ambiguous_glob_reexports)]
pub use deposit::*;
#[allow(ambiguous_glob_reexports)]
pub use initialize::*;
#[allow(ambiguous_glob_reexports)]
pub use mint::*;
#[allow(ambiguous_glob_reexports)]
pub use position::*;
#[allow(ambiguous_glob_reexports)]
pub use redeem::*;
#[allow(ambiguous_glob_reexports)]
pub use register_reward_token::*;
#[allow(ambiguous_glob_reexports)]
pub use request_deposit::*;
#[allow(ambiguous_glob_reexports)]
pub use request_redeem::*;
#[allow(ambiguous_glob_reexports)]
pub use transfer_shares::*;
#[allow(ambiguous_glob_reexports)]
pub use view::*;
#[allow(ambiguous_glob_reexports)]
pub use withdraw::*;
