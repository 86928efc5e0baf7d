//! Invariant assertions for the fund
//! Non-negotiable rules every state-changing instruction checks before
//! committing.

use anchor_lang::prelude::*;

use crate::error::FundError;

/// The mirrored supply and the actual share mint supply must agree after
/// every mint/burn CPI.
pub fn assert_supply_reconciled(state_supply: u64, mint_supply: u64) -> Result<()> {
  require!(state_supply == mint_supply, FundError::BalanceSheetViolation);
  Ok(())
}

/// Accrued withdrawable fees may never exceed what the matching vault
/// actually holds.
pub fn assert_fees_backed(withdrawable: u64, vault_balance: u64) -> Result<()> {
  require!(withdrawable <= vault_balance, FundError::BalanceSheetViolation);
  Ok(())
}

/// fee = amount / divisor; a zero divisor is a divide-by-zero fault and is
/// rejected at the setter, and again here before any division.
pub fn assert_fee_divisor_valid(fee_divisor: u64) -> Result<()> {
  require!(fee_divisor >= 1, FundError::InvalidFeeDivisor);
  Ok(())
}

/// A redemption may only be paid out of capital the fee ledger does not
/// already lay claim to.
pub fn assert_redemption_liquidity(
  vault_balance: u64,
  withdrawable_fees: u64,
  payout: u64,
) -> Result<()> {
  let free = vault_balance
    .checked_sub(withdrawable_fees)
    .ok_or(FundError::BalanceSheetViolation)?;
  require!(payout <= free, FundError::InsufficientLiquidity);
  Ok(())
}

/// Uses stack height instead of instruction index, so normal setup
/// instructions in the same tnx are allowed.
pub fn assert_not_cpi_context() -> Result<()> {
  let stack_height = anchor_lang::solana_program::instruction::get_stack_height();

  require!(
    stack_height <= anchor_lang::solana_program::instruction::TRANSACTION_LEVEL_STACK_HEIGHT,
    FundError::InvalidCPIContext
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_supply_reconciled_exact() {
    assert!(assert_supply_reconciled(1_000, 1_000).is_ok());
    assert!(assert_supply_reconciled(1_000, 999).is_err());
    assert!(assert_supply_reconciled(999, 1_000).is_err());
  }

  #[test]
  fn test_fees_backed() {
    assert!(assert_fees_backed(100, 100).is_ok());
    assert!(assert_fees_backed(100, 150).is_ok());
    assert!(assert_fees_backed(151, 150).is_err());
  }

  #[test]
  fn test_fee_divisor_bounds() {
    assert!(assert_fee_divisor_valid(1).is_ok());
    assert!(assert_fee_divisor_valid(286).is_ok());
    assert!(assert_fee_divisor_valid(0).is_err());
  }

  #[test]
  fn test_redemption_cannot_touch_fees() {
    // vault 1000, fees 100 => at most 900 payable
    assert!(assert_redemption_liquidity(1_000, 100, 900).is_ok());
    assert!(assert_redemption_liquidity(1_000, 100, 901).is_err());
    // fee counter exceeding the vault is itself a violation
    assert!(assert_redemption_liquidity(50, 100, 0).is_err());
  }
}
