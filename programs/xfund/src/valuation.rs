//! Pure valuation functions for the fund
//! All functions are deterministic fixed-point arithmetic over u128 with a
//! 1e18 (WAD) scale, floor division throughout. No external dependencies,
//! fully testable in isolation.
//!
//! Unit conventions: token amounts are u64 base units; rates are WAD-scaled
//! u128 (capital base units per one base unit of the priced asset, times
//! WAD); values are u128 capital base units.

use anchor_lang::prelude::*;

use crate::constants::{PERCENT, REDEMPTION_SLIPPAGE_NUMERATOR, WAD};
use crate::error::FundError;

/// Faults a valuation can produce. Negative intermediate values are a
/// distinct, fatal condition - never clamped to zero.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ValuationError {
  Overflow,
  NegativeNav,
  ZeroSupply,
}

impl From<ValuationError> for Error {
  fn from(e: ValuationError) -> Self {
    match e {
      ValuationError::Overflow => FundError::MathOverflow.into(),
      ValuationError::NegativeNav => FundError::NegativeNav.into(),
      ValuationError::ZeroSupply => FundError::ZeroSupply.into(),
    }
  }
}

type Valuation<T> = core::result::Result<T, ValuationError>;

/// Multiply two u128 values and divide by a third, rounding down.
/// Returns None on overflow or a zero divisor.
pub fn mul_div_down(a: u128, b: u128, c: u128) -> Option<u128> {
  if c == 0 {
    return None;
  }

  a.checked_mul(b)?.checked_div(c)
}

/// Multiply two u128 values and divide by a third, rounding up.
/// Used where rounding must favor the fund.
pub fn mul_div_up(a: u128, b: u128, c: u128) -> Option<u128> {
  if c == 0 {
    return None;
  }

  a.checked_mul(b)?.checked_add(c - 1)?.checked_div(c)
}

/// Value of the reserve holding in capital base units.
pub fn reserve_value_in_capital(reserve_balance: u64, capital_per_reserve: u128) -> Valuation<u128> {
  mul_div_down(reserve_balance as u128, capital_per_reserve, WAD).ok_or(ValuationError::Overflow)
}

/// Value of the outstanding synth debt in capital base units.
pub fn debt_value_in_capital(debt_synth: u64, capital_per_synth: u128) -> Valuation<u128> {
  mul_div_down(debt_synth as u128, capital_per_synth, WAD).ok_or(ValuationError::Overflow)
}

/// Sum of the non-reserve component assets (held capital plus held synth)
/// converted to capital base units.
pub fn non_reserve_asset_value(
  capital_balance: u64,
  synth_balance: u64,
  capital_per_synth: u128,
) -> Valuation<u128> {
  let synth_value =
    mul_div_down(synth_balance as u128, capital_per_synth, WAD).ok_or(ValuationError::Overflow)?;

  (capital_balance as u128)
    .checked_add(synth_value)
    .ok_or(ValuationError::Overflow)
}

/// NAV at mint time:
/// reserve_balance * rate / WAD + non_reserve_value - debt_value
///
/// A result that would go negative means debt exceeds asset value; that is
/// surfaced as NegativeNav, never saturated.
pub fn nav_on_mint(
  capital_per_reserve: u128,
  reserve_balance: u64,
  non_reserve_value: u128,
  debt_value_capital: u128,
) -> Valuation<u128> {
  let reserve_value = reserve_value_in_capital(reserve_balance, capital_per_reserve)?;

  reserve_value
    .checked_add(non_reserve_value)
    .ok_or(ValuationError::Overflow)?
    .checked_sub(debt_value_capital)
    .ok_or(ValuationError::NegativeNav)
}

/// NAV at redeem time. Identical shape to nav_on_mint; callers pass the
/// slippage-discounted rate and only the reserve balance the fund owns
/// outright (escrowed reserve never enters this figure).
pub fn nav_on_redeem(
  discounted_capital_per_reserve: u128,
  reserve_balance_owned: u64,
  non_reserve_value: u128,
  debt_value_capital: u128,
) -> Valuation<u128> {
  nav_on_mint(
    discounted_capital_per_reserve,
    reserve_balance_owned,
    non_reserve_value,
    debt_value_capital,
  )
}

/// Execution rate implied by a capital-funded reserve purchase.
pub fn implied_capital_per_reserve(capital_spent: u64, reserve_acquired: u64) -> Valuation<u128> {
  mul_div_down(capital_spent as u128, WAD, reserve_acquired as u128)
    .ok_or(ValuationError::Overflow)
}

/// Oracle cross rate: capital base units per base unit of the priced asset
/// (reserve or synth), from the two USD feed prices.
pub fn oracle_cross_rate(asset_usd: u128, capital_usd: u128) -> Valuation<u128> {
  mul_div_down(asset_usd, WAD, capital_usd).ok_or(ValuationError::Overflow)
}

/// Oracle rate discounted by the fixed redemption slippage factor (99/100).
pub fn redemption_rate(capital_per_reserve: u128) -> Valuation<u128> {
  mul_div_down(capital_per_reserve, REDEMPTION_SLIPPAGE_NUMERATOR, PERCENT)
    .ok_or(ValuationError::Overflow)
}

/// WAD-scaled price of one share on the issue path.
/// Undefined at zero supply - the seed branch never calls this.
pub fn issue_token_price(nav: u128, total_supply: u64) -> Valuation<u128> {
  if total_supply == 0 {
    return Err(ValuationError::ZeroSupply);
  }

  mul_div_down(nav, WAD, total_supply as u128).ok_or(ValuationError::Overflow)
}

/// Shares minted for a given capital contribution at a WAD share price.
pub fn tokens_to_mint(capital_used: u64, price_per_token: u128) -> Valuation<u64> {
  let tokens = mul_div_down(capital_used as u128, WAD, price_per_token)
    .ok_or(ValuationError::Overflow)?;

  u64::try_from(tokens).map_err(|_| ValuationError::Overflow)
}

/// First-mint seed: one share per capital base unit. An explicit branch so
/// zero supply is never a division fault.
pub fn tokens_to_mint_seed(capital_used: u64) -> u64 {
  capital_used
}

/// WAD-scaled price of one share on the redeem path.
pub fn redeem_token_price(total_supply: u64, nav_on_redeem: u128) -> Valuation<u128> {
  if total_supply == 0 {
    return Err(ValuationError::ZeroSupply);
  }

  mul_div_down(nav_on_redeem, WAD, total_supply as u128).ok_or(ValuationError::Overflow)
}

/// Capital owed for a number of shares at a WAD redeem price.
pub fn redemption_value(price_per_token: u128, tokens_to_redeem: u64) -> Valuation<u64> {
  let value = mul_div_down(price_per_token, tokens_to_redeem as u128, WAD)
    .ok_or(ValuationError::Overflow)?;

  u64::try_from(value).map_err(|_| ValuationError::Overflow)
}

/// Apply the divisor fee to an amount: fee = amount / divisor (floor).
/// Returns (net, fee). A zero divisor is a divide-by-zero fault.
pub fn apply_fee(amount: u64, fee_divisor: u64) -> Valuation<(u64, u64)> {
  if fee_divisor == 0 {
    return Err(ValuationError::Overflow);
  }

  let fee = amount / fee_divisor;
  let net = amount.checked_sub(fee).ok_or(ValuationError::Overflow)?;
  Ok((net, fee))
}
