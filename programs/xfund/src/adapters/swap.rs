//! Exchange venue adapters
//! Manual CPIs against the primary exchange router and the governed
//! stable-swap pool. Output is measured as the destination vault's balance
//! delta and checked against the caller's minimum; a short fill fails the
//! whole transaction.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::invoke_signed;
use anchor_spl::token_interface::TokenAccount;

use crate::constants::{POOL_EXCHANGE_IX, ROUTER_SWAP_IX, WAD};
use crate::error::FundError;
use crate::valuation::mul_div_down;

/// Minimum acceptable output for `amount_in` at a WAD-scaled minimum rate.
/// A zero rate means "no minimum" (the venue's own execution stands).
pub fn min_out_for(amount_in: u64, min_rate_wad: u128) -> Result<u64> {
  if min_rate_wad == 0 {
    return Ok(0);
  }

  let min_out =
    mul_div_down(amount_in as u128, min_rate_wad, WAD).ok_or(FundError::MathOverflow)?;
  u64::try_from(min_out).map_err(|_| FundError::MathOverflow.into())
}

fn build_metas(accounts: &[AccountInfo], fund_authority: &Pubkey) -> Vec<AccountMeta> {
  accounts
    .iter()
    .map(|acc| {
      let is_signer = acc.is_signer || acc.key == fund_authority;
      if acc.is_writable {
        AccountMeta::new(*acc.key, is_signer)
      } else {
        AccountMeta::new_readonly(*acc.key, is_signer)
      }
    })
    .collect()
}

fn invoke_venue<'info>(
  program_id: Pubkey,
  data: Vec<u8>,
  accounts: &[AccountInfo<'info>],
  fund_authority: &Pubkey,
  signer_seeds: &[&[&[u8]]],
) -> Result<()> {
  require!(!accounts.is_empty(), FundError::SwapCpiFailed);

  let ix = Instruction {
    program_id,
    accounts: build_metas(accounts, fund_authority),
    data,
  };

  invoke_signed(&ix, accounts, signer_seeds).map_err(|e| {
    msg!("venue CPI failed: {:?}", e);
    FundError::SwapCpiFailed
  })?;

  Ok(())
}

/// Swap `amount_in` through the primary router. Returns the amount the
/// destination vault actually received.
pub fn swap_via_router<'info>(
  router_program: &AccountInfo<'info>,
  expected_program: &Pubkey,
  route_accounts: &[AccountInfo<'info>],
  destination: &mut InterfaceAccount<'info, TokenAccount>,
  fund_authority: &Pubkey,
  amount_in: u64,
  min_out: u64,
  signer_seeds: &[&[&[u8]]],
) -> Result<u64> {
  require_keys_eq!(*router_program.key, *expected_program, FundError::InvalidAccountOwner);

  let mut data = Vec::with_capacity(24);
  data.extend_from_slice(&ROUTER_SWAP_IX);
  data.extend_from_slice(&amount_in.to_le_bytes());
  data.extend_from_slice(&min_out.to_le_bytes());

  let balance_before = destination.amount;

  invoke_venue(
    *router_program.key,
    data,
    route_accounts,
    fund_authority,
    signer_seeds,
  )?;

  destination.reload()?;
  let received = destination
    .amount
    .checked_sub(balance_before)
    .ok_or(FundError::MathOverflow)?;

  require!(received >= min_out, FundError::SlippageExceeded);
  Ok(received)
}

/// Exchange `amount_in` through the active stable pool between the two
/// governed token slots. Returns the amount received.
#[allow(clippy::too_many_arguments)]
pub fn exchange_via_pool<'info>(
  pool_program: &AccountInfo<'info>,
  active_pool: &Pubkey,
  slots: [u8; 2],
  pool_accounts: &[AccountInfo<'info>],
  destination: &mut InterfaceAccount<'info, TokenAccount>,
  fund_authority: &Pubkey,
  amount_in: u64,
  min_out: u64,
  signer_seeds: &[&[&[u8]]],
) -> Result<u64> {
  // only the governor-confirmed pool may be used
  require_keys_eq!(*pool_program.key, *active_pool, FundError::NoActivePool);

  let mut data = Vec::with_capacity(26);
  data.extend_from_slice(&POOL_EXCHANGE_IX);
  data.push(slots[0]);
  data.push(slots[1]);
  data.extend_from_slice(&amount_in.to_le_bytes());
  data.extend_from_slice(&min_out.to_le_bytes());

  let balance_before = destination.amount;

  invoke_venue(
    *pool_program.key,
    data,
    pool_accounts,
    fund_authority,
    signer_seeds,
  )?;

  destination.reload()?;
  let received = destination
    .amount
    .checked_sub(balance_before)
    .ok_or(FundError::MathOverflow)?;

  require!(received >= min_out, FundError::SlippageExceeded);
  Ok(received)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_min_out_scales_by_rate() {
    // 1000 in at a 0.5 rate => at least 500 out
    assert_eq!(min_out_for(1_000, WAD / 2).unwrap(), 500);
    assert_eq!(min_out_for(1_000, WAD).unwrap(), 1_000);
  }

  #[test]
  fn test_zero_rate_means_no_minimum() {
    assert_eq!(min_out_for(1_000, 0).unwrap(), 0);
  }
}
