//! Fee-pool and reward-escrow adapters
//! Both collaborators expose a claim-style instruction that pays accrued
//! assets to the fund; the amount received is measured as the destination
//! vault's balance delta.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::invoke_signed;
use anchor_spl::token_interface::TokenAccount;

use crate::constants::{ESCROW_VEST_IX, FEE_POOL_CLAIM_IX};
use crate::error::FundError;

fn claim_external<'info>(
  program: &AccountInfo<'info>,
  expected_program: &Pubkey,
  disc: [u8; 8],
  claim_accounts: &[AccountInfo<'info>],
  destination: &mut InterfaceAccount<'info, TokenAccount>,
  fund_authority: &Pubkey,
  signer_seeds: &[&[&[u8]]],
) -> Result<u64> {
  require_keys_eq!(*program.key, *expected_program, FundError::InvalidAccountOwner);
  require!(!claim_accounts.is_empty(), FundError::ClaimCpiFailed);

  let account_metas: Vec<AccountMeta> = claim_accounts
    .iter()
    .map(|acc| {
      let is_signer = acc.is_signer || acc.key == fund_authority;
      if acc.is_writable {
        AccountMeta::new(*acc.key, is_signer)
      } else {
        AccountMeta::new_readonly(*acc.key, is_signer)
      }
    })
    .collect();

  let ix = Instruction {
    program_id: *program.key,
    accounts: account_metas,
    data: disc.to_vec(),
  };

  let balance_before = destination.amount;

  invoke_signed(&ix, claim_accounts, signer_seeds).map_err(|e| {
    msg!("claim CPI failed: {:?}", e);
    FundError::ClaimCpiFailed
  })?;

  destination.reload()?;
  destination
    .amount
    .checked_sub(balance_before)
    .ok_or_else(|| FundError::MathOverflow.into())
}

/// Claim accrued synth fees from the external fee pool into the fund's
/// synth vault. Returns the synth received (possibly zero).
pub fn claim_fee_pool<'info>(
  fee_pool_program: &AccountInfo<'info>,
  expected_program: &Pubkey,
  claim_accounts: &[AccountInfo<'info>],
  synth_vault: &mut InterfaceAccount<'info, TokenAccount>,
  fund_authority: &Pubkey,
  signer_seeds: &[&[&[u8]]],
) -> Result<u64> {
  claim_external(
    fee_pool_program,
    expected_program,
    FEE_POOL_CLAIM_IX,
    claim_accounts,
    synth_vault,
    fund_authority,
    signer_seeds,
  )
}

/// Vest matured escrowed reserve from the reward escrow into the fund's
/// reserve vault. Returns the reserve received (possibly zero).
pub fn vest_reward_escrow<'info>(
  escrow_program: &AccountInfo<'info>,
  expected_program: &Pubkey,
  vest_accounts: &[AccountInfo<'info>],
  reserve_vault: &mut InterfaceAccount<'info, TokenAccount>,
  fund_authority: &Pubkey,
  signer_seeds: &[&[&[u8]]],
) -> Result<u64> {
  claim_external(
    escrow_program,
    expected_program,
    ESCROW_VEST_IX,
    vest_accounts,
    reserve_vault,
    fund_authority,
    signer_seeds,
  )
}
