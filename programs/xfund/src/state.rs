//! State accounts for the xFund program
//! A single FundState PDA owns the fee ledger, role table, pool governor
//! state and the mirrored share supply

use anchor_lang::prelude::*;

use crate::constants::MAX_POOL_SLOT;
use crate::error::FundError;

/// Which external object the issuance (collateralization) ratio is read from.
/// Both sources must report the same numeric ratio at any protocol state;
/// the toggle exists because the registry migrates the value between them.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum RatioSource {
  LegacyState,
  SystemSettings,
}

/// Outcome of an owner pool proposal. The very first proposal activates
/// directly (there is nothing to protect yet); later proposals only stage a
/// pending address for the validator to confirm.
#[derive(PartialEq, Eq, Debug)]
pub enum PoolProposal {
  Activated,
  Pending,
}

/// Global fund state - single source of truth for the ledger and wiring.
/// Singleton PDA, one per fund deployment.
#[account]
pub struct FundState {
  /// Fund owner (full control)
  pub authority: Pubkey,

  /// May call hedge, nothing else
  pub manager: Pubkey,

  /// May confirm a pending pool address, nothing else
  pub address_validator: Pubkey,

  pub share_mint: Pubkey,

  pub capital_mint: Pubkey,

  pub reserve_mint: Pubkey,

  pub synth_mint: Pubkey,

  /// Pyth price feeds
  pub reserve_feed: Pubkey,
  pub capital_feed: Pubkey,
  pub synth_feed: Pubkey,

  /// External debt-issuance registry wiring
  pub debt_registry_program: Pubkey,
  pub registry_position: Pubkey,
  pub legacy_registry_state: Pubkey,
  pub system_settings: Pubkey,

  /// External venues
  pub router_program: Pubkey,
  pub fee_pool: Pubkey,
  pub reward_escrow: Pubkey,

  /// Stable-swap pool governor state
  pub active_pool: Pubkey,
  pub pending_pool: Pubkey,
  /// [synth slot, capital-stable slot] inside the active pool
  pub active_slots: [u8; 2],
  pub pending_slots: [u8; 2],
  pub pool_confirmed: bool,

  /// Mirrored share supply, reconciled against the mint after every
  /// mint/burn CPI
  pub total_supply: u64,

  /// Fee ledger - strictly additive, decremented only by withdraw_fees
  pub withdrawable_capital_fees: u64,
  pub withdrawable_synth_fees: u64,

  /// fee = amount / fee_divisor (floor); never zero
  pub fee_divisor: u64,

  pub max_price_age_secs: u64,

  pub paused: bool,

  /// Reentrancy lock; must be false between instructions
  pub locked: bool,

  pub ratio_from_system_settings: bool,

  pub _reserved: [u64; 8],
}

impl FundState {
  pub const LEN: usize = 8 +  // discriminator
    32 * 19 +                 // pubkeys
    2 + 2 + 1 +               // slot configs + pool_confirmed
    8 + 8 + 8 + 8 + 8 +       // supply, two fee counters, fee_divisor, max_price_age
    1 + 1 + 1 +               // paused, locked, ratio flag
    64;                       // _reserved

  // Role checks. Authorization is a pure function of (caller, role table).

  pub fn assert_owner(&self, caller: &Pubkey) -> Result<()> {
    require_keys_eq!(*caller, self.authority, FundError::Unauthorized);
    Ok(())
  }

  pub fn assert_owner_or_manager(&self, caller: &Pubkey) -> Result<()> {
    require!(
      *caller == self.authority || *caller == self.manager,
      FundError::Unauthorized
    );
    Ok(())
  }

  pub fn assert_validator(&self, caller: &Pubkey) -> Result<()> {
    require_keys_eq!(*caller, self.address_validator, FundError::Unauthorized);
    Ok(())
  }

  // Reentrancy lock. A failed instruction rolls the flag back with the rest
  // of the transaction, so acquire/release bracketing is enough.

  pub fn acquire_lock(&mut self) -> Result<()> {
    require!(!self.locked, FundError::Reentrancy);
    self.locked = true;
    Ok(())
  }

  pub fn release_lock(&mut self) {
    self.locked = false;
  }

  // Fee ledger

  pub fn accrue_capital_fee(&mut self, fee: u64) -> Result<()> {
    self.withdrawable_capital_fees = self
      .withdrawable_capital_fees
      .checked_add(fee)
      .ok_or(FundError::MathOverflow)?;
    Ok(())
  }

  pub fn accrue_synth_fee(&mut self, fee: u64) -> Result<()> {
    self.withdrawable_synth_fees = self
      .withdrawable_synth_fees
      .checked_add(fee)
      .ok_or(FundError::MathOverflow)?;
    Ok(())
  }

  /// Drain both fee counters, returning (capital, synth) amounts owed to
  /// the administrator. Zero on either side is a no-op for that side.
  pub fn take_fees(&mut self) -> (u64, u64) {
    let capital = self.withdrawable_capital_fees;
    let synth = self.withdrawable_synth_fees;
    self.withdrawable_capital_fees = 0;
    self.withdrawable_synth_fees = 0;
    (capital, synth)
  }

  // Issuance ratio source

  pub fn ratio_source(&self) -> RatioSource {
    if self.ratio_from_system_settings {
      RatioSource::SystemSettings
    } else {
      RatioSource::LegacyState
    }
  }

  pub fn toggle_ratio_source(&mut self) {
    self.ratio_from_system_settings = !self.ratio_from_system_settings;
  }

  // Pool address governor - two-party commit, no timelock.

  /// Owner proposal step. Does not touch the active address except on the
  /// very first proposal of a fund's life.
  pub fn propose_pool(&mut self, pool: Pubkey, slots: [u8; 2]) -> Result<PoolProposal> {
    require!(pool != Pubkey::default(), FundError::InvalidParameter);
    require!(
      slots[0] <= MAX_POOL_SLOT && slots[1] <= MAX_POOL_SLOT && slots[0] != slots[1],
      FundError::InvalidPoolSlots
    );

    if self.active_pool == Pubkey::default() {
      // Initial deployment: nothing to protect, activate directly
      self.active_pool = pool;
      self.active_slots = slots;
      self.pool_confirmed = true;
      return Ok(PoolProposal::Activated);
    }

    self.pending_pool = pool;
    self.pending_slots = slots;
    self.pool_confirmed = false;
    Ok(PoolProposal::Pending)
  }

  /// Validator confirmation step. Activates the pending address only when
  /// the validator names exactly that address.
  pub fn confirm_pool(&mut self, pool: Pubkey) -> Result<()> {
    require!(self.pending_pool != Pubkey::default(), FundError::NoPendingPool);
    require!(pool == self.pending_pool, FundError::PendingPoolMismatch);

    self.active_pool = self.pending_pool;
    self.active_slots = self.pending_slots;
    self.pending_pool = Pubkey::default();
    self.pending_slots = [0; 2];
    self.pool_confirmed = true;
    Ok(())
  }

  pub fn has_active_pool(&self) -> bool {
    self.active_pool != Pubkey::default() && self.pool_confirmed
  }
}

pub const FUND_STATE_SEED: &[u8] = b"fund_state";

pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";

#[cfg(test)]
mod tests {
  use super::*;

  fn mock_state() -> FundState {
    FundState {
      authority: Pubkey::new_unique(),
      manager: Pubkey::new_unique(),
      address_validator: Pubkey::new_unique(),
      share_mint: Pubkey::default(),
      capital_mint: Pubkey::default(),
      reserve_mint: Pubkey::default(),
      synth_mint: Pubkey::default(),
      reserve_feed: Pubkey::default(),
      capital_feed: Pubkey::default(),
      synth_feed: Pubkey::default(),
      debt_registry_program: Pubkey::default(),
      registry_position: Pubkey::default(),
      legacy_registry_state: Pubkey::default(),
      system_settings: Pubkey::default(),
      router_program: Pubkey::default(),
      fee_pool: Pubkey::default(),
      reward_escrow: Pubkey::default(),
      active_pool: Pubkey::default(),
      pending_pool: Pubkey::default(),
      active_slots: [0; 2],
      pending_slots: [0; 2],
      pool_confirmed: false,
      total_supply: 0,
      withdrawable_capital_fees: 0,
      withdrawable_synth_fees: 0,
      fee_divisor: 286,
      max_price_age_secs: 60,
      paused: false,
      locked: false,
      ratio_from_system_settings: false,
      _reserved: [0; 8],
    }
  }

  #[test]
  fn test_role_checks() {
    let state = mock_state();
    let outsider = Pubkey::new_unique();

    assert!(state.assert_owner(&state.authority).is_ok());
    assert!(state.assert_owner(&state.manager).is_err());

    assert!(state.assert_owner_or_manager(&state.authority).is_ok());
    assert!(state.assert_owner_or_manager(&state.manager).is_ok());
    assert!(state.assert_owner_or_manager(&outsider).is_err());

    assert!(state.assert_validator(&state.address_validator).is_ok());
    assert!(state.assert_validator(&state.authority).is_err());
  }

  #[test]
  fn test_reentrancy_lock() {
    let mut state = mock_state();
    assert!(state.acquire_lock().is_ok());
    assert!(state.acquire_lock().is_err());
    state.release_lock();
    assert!(state.acquire_lock().is_ok());
  }

  #[test]
  fn test_fee_ledger_accrues_and_drains() {
    let mut state = mock_state();
    state.accrue_capital_fee(100).unwrap();
    state.accrue_capital_fee(50).unwrap();
    state.accrue_synth_fee(7).unwrap();
    assert_eq!(state.withdrawable_capital_fees, 150);
    assert_eq!(state.withdrawable_synth_fees, 7);

    let (capital, synth) = state.take_fees();
    assert_eq!((capital, synth), (150, 7));
    assert_eq!(state.withdrawable_capital_fees, 0);
    assert_eq!(state.withdrawable_synth_fees, 0);

    // draining twice is a no-op, never a fault
    assert_eq!(state.take_fees(), (0, 0));
  }

  #[test]
  fn test_first_pool_proposal_activates_directly() {
    let mut state = mock_state();
    let pool = Pubkey::new_unique();

    let outcome = state.propose_pool(pool, [1, 3]).unwrap();
    assert_eq!(outcome, PoolProposal::Activated);
    assert_eq!(state.active_pool, pool);
    assert_eq!(state.active_slots, [1, 3]);
    assert!(state.has_active_pool());
  }

  #[test]
  fn test_second_proposal_stays_pending_until_confirmed() {
    let mut state = mock_state();
    let first = Pubkey::new_unique();
    let second = Pubkey::new_unique();

    state.propose_pool(first, [1, 3]).unwrap();
    let outcome = state.propose_pool(second, [0, 2]).unwrap();
    assert_eq!(outcome, PoolProposal::Pending);

    // active address untouched by the proposal
    assert_eq!(state.active_pool, first);
    assert_eq!(state.active_slots, [1, 3]);

    state.confirm_pool(second).unwrap();
    assert_eq!(state.active_pool, second);
    assert_eq!(state.active_slots, [0, 2]);
    assert_eq!(state.pending_pool, Pubkey::default());
  }

  #[test]
  fn test_confirming_wrong_address_rejected() {
    let mut state = mock_state();
    let first = Pubkey::new_unique();
    let second = Pubkey::new_unique();
    let wrong = Pubkey::new_unique();

    state.propose_pool(first, [1, 3]).unwrap();
    state.propose_pool(second, [1, 3]).unwrap();

    let err = state.confirm_pool(wrong).unwrap_err();
    assert_eq!(err, FundError::PendingPoolMismatch.into());
    assert_eq!(state.active_pool, first);

    // nothing pending -> confirm fails
    state.confirm_pool(second).unwrap();
    let err = state.confirm_pool(second).unwrap_err();
    assert_eq!(err, FundError::NoPendingPool.into());
  }

  #[test]
  fn test_pool_slots_validated() {
    let mut state = mock_state();
    let pool = Pubkey::new_unique();
    assert!(state.propose_pool(pool, [1, 1]).is_err());
    assert!(state.propose_pool(pool, [5, 1]).is_err());
    assert!(state.propose_pool(Pubkey::default(), [1, 3]).is_err());
  }

  #[test]
  fn test_ratio_source_toggle() {
    let mut state = mock_state();
    assert_eq!(state.ratio_source(), RatioSource::LegacyState);
    state.toggle_ratio_source();
    assert_eq!(state.ratio_source(), RatioSource::SystemSettings);
    state.toggle_ratio_source();
    assert_eq!(state.ratio_source(), RatioSource::LegacyState);
  }
}
