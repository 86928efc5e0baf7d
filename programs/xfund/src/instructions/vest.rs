//! Vest instruction - pulls matured reserve out of the reward escrow
//! Permissionless; vesting only ever adds assets to the fund.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{TokenAccount, TokenInterface};

use crate::adapters::rewards;
use crate::error::FundError;
use crate::events::RewardsVested;
use crate::invariants::assert_not_cpi_context;
use crate::state::*;

pub fn handler<'info>(ctx: Context<'_, '_, '_, 'info, VestRewards<'info>>) -> Result<()> {
  assert_not_cpi_context()?;

  {
    let fund_state = &mut ctx.accounts.fund_state;
    fund_state.acquire_lock()?;
  }

  let vault_seeds = &[VAULT_AUTHORITY_SEED, &[ctx.bumps.vault_authority]];
  let signer: &[&[&[u8]]] = &[&vault_seeds[..]];

  let reserve_received = rewards::vest_reward_escrow(
    &ctx.accounts.escrow_program,
    &ctx.accounts.fund_state.reward_escrow,
    ctx.remaining_accounts,
    &mut ctx.accounts.reserve_vault,
    ctx.accounts.vault_authority.key,
    signer,
  )?;

  msg!("Reserve vested: {}", reserve_received);

  emit!(RewardsVested {
    reserve_received,
    timestamp: ctx.accounts.clock.unix_timestamp,
  });

  let fund_state = &mut ctx.accounts.fund_state;
  fund_state.release_lock();

  Ok(())
}

#[derive(Accounts)]
pub struct VestRewards<'info> {
  pub caller: Signer<'info>,

  #[account(
    mut,
    seeds = [FUND_STATE_SEED],
    bump,
    constraint = fund_state.to_account_info().owner == &crate::ID @ FundError::InvalidAccountOwner,
  )]
  pub fund_state: Box<Account<'info, FundState>>,

  #[account(
    mut,
    token::mint = fund_state.reserve_mint,
    token::authority = vault_authority,
  )]
  pub reserve_vault: Box<InterfaceAccount<'info, TokenAccount>>,

  /// CHECK: PDA validated by seeds
  #[account(
    seeds = [VAULT_AUTHORITY_SEED],
    bump,
  )]
  pub vault_authority: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring before the CPI
  pub escrow_program: UncheckedAccount<'info>,

  pub token_program: Interface<'info, TokenInterface>,

  pub clock: Sysvar<'info, Clock>,
  // remaining_accounts: the escrow's vest accounts
}
