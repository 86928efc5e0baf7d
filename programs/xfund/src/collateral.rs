//! Collateralization-ratio controller
//! Sizes the debt reduction needed to restore the protocol-mandated
//! issuance ratio before a fee claim may proceed.

use crate::constants::WAD;
use crate::valuation::{mul_div_down, ValuationError};

/// Synth debt to burn so that debt_value <= reserve_value * ratio / WAD.
///
/// `issuance_ratio` is WAD-scaled (125000000000000000 = 0.125, i.e. an
/// 800% collateralization requirement). Returns 0 when already compliant,
/// otherwise the exact shortfall in synth base units.
pub fn synth_to_burn_to_fix_ratio(
  debt_value: u128,
  reserve_value: u128,
  issuance_ratio: u128,
) -> core::result::Result<u64, ValuationError> {
  let max_debt =
    mul_div_down(reserve_value, issuance_ratio, WAD).ok_or(ValuationError::Overflow)?;

  if debt_value <= max_debt {
    return Ok(0);
  }

  let shortfall = debt_value - max_debt;
  u64::try_from(shortfall).map_err(|_| ValuationError::Overflow)
}

/// Resolve the amount actually burned on the repair step.
///
/// The caller-supplied amount is a hint captured before the call landed;
/// the freshly recomputed requirement is authoritative. Trusting the hint
/// would let a caller shrink or inflate the repair between observation and
/// execution.
pub fn repair_amount(fresh_requirement: u64, _caller_hint: u64) -> u64 {
  fresh_requirement
}

#[cfg(test)]
mod tests {
  use super::*;

  const RATIO: u128 = 125_000_000_000_000_000; // 0.125 = 800% c-ratio

  #[test]
  fn test_returns_zero_when_compliant() {
    // reserve 800, ratio 0.125 => max debt 100
    let burn = synth_to_burn_to_fix_ratio(100, 800, RATIO).unwrap();
    assert_eq!(burn, 0);

    let burn = synth_to_burn_to_fix_ratio(99, 800, RATIO).unwrap();
    assert_eq!(burn, 0);
  }

  #[test]
  fn test_restores_exact_compliance() {
    let reserve_value = 800_000u128;
    let debt_value = 130_000u128;

    let burn = synth_to_burn_to_fix_ratio(debt_value, reserve_value, RATIO).unwrap();
    assert_eq!(burn, 30_000);

    // after burning, the position is exactly at the threshold
    let remaining = debt_value - burn as u128;
    assert_eq!(
      synth_to_burn_to_fix_ratio(remaining, reserve_value, RATIO).unwrap(),
      0
    );
  }

  #[test]
  fn test_zero_collateral_requires_full_burn() {
    let burn = synth_to_burn_to_fix_ratio(50_000, 0, RATIO).unwrap();
    assert_eq!(burn, 50_000);
  }

  #[test]
  fn test_caller_hint_is_not_authoritative() {
    assert_eq!(repair_amount(30_000, 0), 30_000);
    assert_eq!(repair_amount(30_000, 90_000), 30_000);
    assert_eq!(repair_amount(0, 90_000), 0);
  }
}
