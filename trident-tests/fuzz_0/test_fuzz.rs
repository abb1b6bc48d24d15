use anchor_lang::prelude::Pubkey;
use fuzz_accounts::*;
use svs_reward_vault::{
    engine::{self, async_vault, ledger, rewards, sync_vault},
    state::{PendingRequest, Position, RequestKind, RewardVault, VaultMode},
};
use trident_fuzz::fuzzing::*;
mod fuzz_accounts;

const HOLDERS: usize = 3;
const CLIFF: i64 = 3_600;
const UNLOCK_DURATION: i64 = 86_400;
const SHARES_LOCK_TIME: i64 = 7_200;

fn new_vault(mode: VaultMode) -> RewardVault {
    RewardVault {
        authority: Pubkey::new_unique(),
        asset_mint: Pubkey::new_unique(),
        asset_vault: Pubkey::new_unique(),
        total_shares: 0,
        total_assets: 0,
        pending_deposit_assets: 0,
        pending_redeem_assets: 0,
        cliff: CLIFF,
        unlock_duration: UNLOCK_DURATION,
        shares_lock_time: match mode {
            VaultMode::Synchronous => 0,
            VaultMode::Asynchronous => SHARES_LOCK_TIME,
        },
        mode,
        paused: false,
        bump: 255,
        vault_id: 0,
        reward_tokens: Vec::new(),
        _reserved: [0u8; 64],
    }
}

fn new_positions(vault_key: Pubkey) -> Vec<Position> {
    (0..HOLDERS)
        .map(|_| Position::new(vault_key, Pubkey::new_unique(), 255))
        .collect()
}

/// Engine state plus the token balances the instructions would have moved
struct VaultTracker {
    vault: RewardVault,
    positions: Vec<Position>,
    reward_mint: Pubkey,
    /// Balance of the vault's asset token account
    asset_balance: u64,
    now: i64,
}

impl Default for VaultTracker {
    fn default() -> Self {
        Self {
            vault: new_vault(VaultMode::Synchronous),
            positions: new_positions(Pubkey::new_unique()),
            reward_mint: Pubkey::new_unique(),
            asset_balance: 0,
            now: 0,
        }
    }
}

/// Asynchronous vault with one deposit and one redeem request per holder.
/// Each holder is its own controller.
struct RequestTracker {
    vault: RewardVault,
    positions: Vec<Position>,
    deposits: Vec<PendingRequest>,
    redeems: Vec<PendingRequest>,
    /// Balance of the asset account, escrow included
    asset_balance: u64,
}

impl Default for RequestTracker {
    fn default() -> Self {
        let vault_key = Pubkey::new_unique();
        let positions = new_positions(vault_key);
        let requests = |kind: RequestKind| -> Vec<PendingRequest> {
            positions
                .iter()
                .map(|p| PendingRequest::new(vault_key, p.owner, kind, 255))
                .collect()
        };
        let deposits = requests(RequestKind::Deposit);
        let redeems = requests(RequestKind::Redeem);
        Self {
            vault: new_vault(VaultMode::Asynchronous),
            positions,
            deposits,
            redeems,
            asset_balance: 0,
        }
    }
}

#[derive(FuzzTestMethods)]
struct FuzzTest {
    trident: Trident,
    fuzz_accounts: AccountAddresses,
    vault_tracker: VaultTracker,
    request_tracker: RequestTracker,
}

#[flow_executor]
impl FuzzTest {
    fn new() -> Self {
        Self {
            trident: Trident::default(),
            fuzz_accounts: AccountAddresses::default(),
            vault_tracker: VaultTracker::default(),
            request_tracker: RequestTracker::default(),
        }
    }

    #[init]
    fn start(&mut self) {
        self.vault_tracker = VaultTracker::default();
        self.request_tracker = RequestTracker::default();
    }

    /// Deposit fuzzed assets for a random holder
    #[flow]
    fn flow_deposit(&mut self) {
        let t = &mut self.vault_tracker;
        let i = rand::random::<usize>() % HOLDERS;
        let assets = (rand::random::<u64>() % 1_000_000_000_000).max(1);
        let key = t.positions[i].owner;

        if let Ok(shares) = sync_vault::deposit(&mut t.vault, &mut t.positions[i], &key, assets, t.now) {
            t.asset_balance += assets;
            assert!(shares > 0, "Invariant: positive deposit should yield positive shares");
        }
        self.check_invariants();
    }

    /// Redeem a fuzzed part of a holder's unlocked shares
    #[flow]
    fn flow_redeem(&mut self) {
        let t = &mut self.vault_tracker;
        let i = rand::random::<usize>() % HOLDERS;
        let unlocked = ledger::unlocked_shares(&t.vault, &t.positions[i], t.now);
        if unlocked == 0 {
            return;
        }
        let shares = (rand::random::<u64>() % unlocked).max(1);
        let key = t.positions[i].owner;

        let assets = sync_vault::redeem(&mut t.vault, &mut t.positions[i], &key, &key, shares, t.now)
            .expect("unlocked shares must be redeemable");
        assert!(assets <= t.asset_balance, "Invariant: cannot redeem more assets than available");
        t.asset_balance -= assets;
        self.check_invariants();
    }

    /// Locked shares can never leave a position
    #[flow]
    fn flow_redeem_locked(&mut self) {
        let t = &mut self.vault_tracker;
        let i = rand::random::<usize>() % HOLDERS;
        let unlocked = ledger::unlocked_shares(&t.vault, &t.positions[i], t.now);
        if t.positions[i].share_balance == unlocked {
            return;
        }
        let key = t.positions[i].owner;
        let result =
            sync_vault::redeem(&mut t.vault, &mut t.positions[i], &key, &key, unlocked + 1, t.now);
        assert!(result.is_err(), "Invariant: locked shares are not redeemable");
    }

    /// Both vaults share one clock
    #[flow]
    fn flow_advance_time(&mut self) {
        self.vault_tracker.now += (rand::random::<u64>() % (UNLOCK_DURATION as u64 / 4)) as i64;
    }

    #[flow]
    fn flow_add_reward(&mut self) {
        let t = &mut self.vault_tracker;
        let amount = (rand::random::<u64>() % 1_000_000_000).max(1);
        let mint = t.reward_mint;
        let result = rewards::add_reward(&mut t.vault, mint, Pubkey::new_unique(), amount, true);
        assert_eq!(result.is_ok(), t.vault.total_shares > 0);
        self.check_invariants();
    }

    #[flow]
    fn flow_claim(&mut self) {
        let t = &mut self.vault_tracker;
        let i = rand::random::<usize>() % HOLDERS;
        let mint = t.reward_mint;
        rewards::claim(&mut t.vault, &mut t.positions[i], &mint, None).expect("claim is tolerant");
        self.check_invariants();
    }

    #[flow]
    fn flow_transfer(&mut self) {
        let t = &mut self.vault_tracker;
        let from = rand::random::<usize>() % HOLDERS;
        let to = (from + 1) % HOLDERS;
        let unlocked = ledger::unlocked_shares(&t.vault, &t.positions[from], t.now);
        if unlocked == 0 {
            return;
        }
        let shares = (rand::random::<u64>() % unlocked).max(1);
        let caller = t.positions[from].owner;

        let (left, right) = t.positions.split_at_mut(from.max(to));
        let (sender, recipient) = if from < to {
            (&mut left[from], &mut right[0])
        } else {
            (&mut right[0], &mut left[to])
        };
        engine::transfer_shares(&mut t.vault, sender, recipient, &caller, shares, t.now)
            .expect("unlocked shares must be transferable");
        self.check_invariants();
    }

    /// Round trip through the exchange rate never creates assets
    #[flow]
    fn flow_conversion_check(&mut self) {
        let vault = &self.vault_tracker.vault;
        let test_amount = (rand::random::<u64>() % 1_000_000_000).max(1);

        let shares = sync_vault::preview_deposit(vault, test_amount).unwrap_or(0);
        if shares > 0 {
            let assets_back = sync_vault::preview_redeem(vault, shares).unwrap_or(0);
            assert!(assets_back <= test_amount, "Invariant: round-trip should not create free assets");
        }
    }

    #[flow]
    fn flow_request_deposit(&mut self) {
        let now = self.vault_tracker.now;
        let t = &mut self.request_tracker;
        let i = rand::random::<usize>() % HOLDERS;
        let assets = (rand::random::<u64>() % 1_000_000_000_000).max(1);
        let key = t.positions[i].owner;

        async_vault::request_deposit(&mut t.vault, &mut t.deposits[i], &key, &key, assets, now)
            .expect("positive deposit request is accepted");
        t.asset_balance += assets;
        self.check_request_invariants();
    }

    /// Claim part of a deposit request either by assets or by shares
    #[flow]
    fn flow_claim_deposit(&mut self) {
        let now = self.vault_tracker.now;
        let t = &mut self.request_tracker;
        let i = rand::random::<usize>() % HOLDERS;
        let available = async_vault::max_deposit(&t.deposits[i], now);
        if available == 0 {
            return;
        }
        let key = t.positions[i].owner;
        let before = t.deposits[i].pending_amount;

        let consumed = if rand::random::<bool>() {
            let assets = rand::random::<u64>() % available + 1;
            async_vault::claim_deposit(
                &mut t.vault,
                &mut t.deposits[i],
                &mut t.positions[i],
                &key,
                assets,
                now,
            )
            .map(|_| assets)
        } else {
            let max_shares = async_vault::max_mint(&t.vault, &t.deposits[i], now).unwrap_or(0);
            if max_shares == 0 {
                return;
            }
            let shares = rand::random::<u64>() % max_shares + 1;
            async_vault::claim_mint(
                &mut t.vault,
                &mut t.deposits[i],
                &mut t.positions[i],
                &key,
                shares,
                now,
            )
        };

        match consumed {
            Ok(assets) => assert_eq!(
                t.deposits[i].pending_amount,
                before - assets,
                "Invariant: a claim consumes exactly its assets"
            ),
            Err(_) => assert_eq!(
                t.deposits[i].pending_amount, before,
                "Invariant: a failed claim leaves the request untouched"
            ),
        }
        self.check_request_invariants();
    }

    #[flow]
    fn flow_request_redeem(&mut self) {
        let now = self.vault_tracker.now;
        let t = &mut self.request_tracker;
        let i = rand::random::<usize>() % HOLDERS;
        let unlocked = ledger::unlocked_shares(&t.vault, &t.positions[i], now);
        if unlocked == 0 {
            return;
        }
        let shares = rand::random::<u64>() % unlocked + 1;
        let key = t.positions[i].owner;

        async_vault::request_redeem(
            &mut t.vault,
            &mut t.redeems[i],
            &mut t.positions[i],
            &key,
            &key,
            shares,
            now,
        )
        .expect("unlocked shares can be requested for redemption");
        self.check_request_invariants();
    }

    /// Claim part of a redeem request either by shares or by assets
    #[flow]
    fn flow_claim_redeem(&mut self) {
        let now = self.vault_tracker.now;
        let t = &mut self.request_tracker;
        let i = rand::random::<usize>() % HOLDERS;
        let max_shares = async_vault::max_redeem(&t.redeems[i], now);
        if max_shares == 0 {
            return;
        }
        let key = t.positions[i].owner;
        let max_assets = async_vault::max_withdraw(&t.redeems[i], now);
        let before = (t.redeems[i].pending_amount, t.redeems[i].pending_assets);

        let released = if rand::random::<bool>() || max_assets == 0 {
            let shares = rand::random::<u64>() % max_shares + 1;
            async_vault::claim_redeem(&mut t.vault, &mut t.redeems[i], &key, shares, now)
        } else {
            let assets = rand::random::<u64>() % max_assets + 1;
            async_vault::claim_withdraw(&mut t.vault, &mut t.redeems[i], &key, assets, now)
                .map(|_| assets)
        };

        match released {
            Ok(assets) => {
                assert!(assets <= before.1, "Invariant: claims stay within escrow");
                t.asset_balance -= assets;
            }
            Err(_) => assert_eq!(
                (t.redeems[i].pending_amount, t.redeems[i].pending_assets),
                before,
                "Invariant: a failed claim leaves the request untouched"
            ),
        }
        self.check_request_invariants();
    }

    /// Yield lands on the asynchronous vault's asset account
    #[flow]
    fn flow_request_vault_yield(&mut self) {
        let t = &mut self.request_tracker;
        t.asset_balance += rand::random::<u64>() % 1_000_000_000;
        engine::sync_total_assets(&mut t.vault, t.asset_balance).expect("escrow is always funded");
        self.check_request_invariants();
    }

    #[end]
    fn end(&mut self) {
        self.check_invariants();
        self.check_request_invariants();
    }

    fn check_invariants(&self) {
        let t = &self.vault_tracker;

        let shares: u64 = t.positions.iter().map(|p| p.share_balance).sum();
        assert_eq!(shares, t.vault.total_shares, "Invariant: ledger total matches positions");
        for position in t.positions.iter() {
            let lots: u64 = position.lots.iter().map(|l| l.remaining()).sum();
            assert_eq!(lots, position.share_balance, "Invariant: lots cover the balance");
        }

        assert_eq!(
            t.vault.total_assets, t.asset_balance,
            "Invariant: total assets match the asset account"
        );

        for token in t.vault.reward_tokens.iter() {
            let owed: u64 = t
                .positions
                .iter()
                .map(|p| rewards::pending_reward(&t.vault, p, &token.mint).unwrap_or(0))
                .sum();
            assert!(
                owed + token.total_claimed <= token.total_received,
                "Invariant: rewards never over-distributed"
            );
        }
    }

    fn check_request_invariants(&self) {
        let t = &self.request_tracker;

        let shares: u64 = t.positions.iter().map(|p| p.share_balance).sum();
        assert_eq!(shares, t.vault.total_shares, "Invariant: ledger total matches positions");

        let deposit_escrow: u64 = t.deposits.iter().map(|r| r.pending_amount).sum();
        assert_eq!(
            deposit_escrow, t.vault.pending_deposit_assets,
            "Invariant: deposit escrow matches the requests"
        );

        let redeem_escrow: u64 = t.redeems.iter().map(|r| r.pending_assets).sum();
        assert_eq!(
            redeem_escrow, t.vault.pending_redeem_assets,
            "Invariant: redeem escrow matches the requests"
        );
        for request in t.redeems.iter() {
            assert!(
                request.pending_amount > 0 || request.pending_assets == 0,
                "Invariant: escrowed assets always have request shares"
            );
        }

        assert_eq!(
            t.vault.total_assets + t.vault.pending_deposit_assets + t.vault.pending_redeem_assets,
            t.asset_balance,
            "Invariant: live assets plus escrow match the asset account"
        );
    }
}

fn main() {
    // Run 1000 iterations with up to 100 flows per iteration
    FuzzTest::fuzz(1000, 100);
}
