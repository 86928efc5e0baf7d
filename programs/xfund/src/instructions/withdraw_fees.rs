//! Withdraw-fees instruction - drains the fee ledger to the administrator
//! Both counters are zeroed atomically; a zero counter is a no-op for that
//! side, never an error.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{self, Mint, TokenAccount, TokenInterface, TransferChecked};

use crate::error::FundError;
use crate::events::FeesWithdrawn;
use crate::invariants::*;
use crate::state::*;

pub fn handler(ctx: Context<WithdrawFees>) -> Result<()> {
  assert_not_cpi_context()?;

  let (capital_fees, synth_fees);
  {
    let fund_state = &mut ctx.accounts.fund_state;
    fund_state.assert_owner(ctx.accounts.authority.key)?;
    fund_state.acquire_lock()?;

    // Counters come off the ledger before any transfer leaves the vaults
    (capital_fees, synth_fees) = fund_state.take_fees();
  }

  require!(
    ctx.accounts.capital_vault.amount >= capital_fees,
    FundError::BalanceSheetViolation
  );
  require!(
    ctx.accounts.synth_vault.amount >= synth_fees,
    FundError::BalanceSheetViolation
  );

  let vault_seeds = &[VAULT_AUTHORITY_SEED, &[ctx.bumps.vault_authority]];
  let signer: &[&[&[u8]]] = &[&vault_seeds[..]];

  if capital_fees > 0 {
    let transfer_capital = TransferChecked {
      from: ctx.accounts.capital_vault.to_account_info(),
      mint: ctx.accounts.capital_mint.to_account_info(),
      to: ctx.accounts.authority_capital_account.to_account_info(),
      authority: ctx.accounts.vault_authority.to_account_info(),
    };
    token_interface::transfer_checked(
      CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        transfer_capital,
        signer,
      ),
      capital_fees,
      ctx.accounts.capital_mint.decimals,
    )?;
  }

  if synth_fees > 0 {
    let transfer_synth = TransferChecked {
      from: ctx.accounts.synth_vault.to_account_info(),
      mint: ctx.accounts.synth_mint.to_account_info(),
      to: ctx.accounts.authority_synth_account.to_account_info(),
      authority: ctx.accounts.vault_authority.to_account_info(),
    };
    token_interface::transfer_checked(
      CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        transfer_synth,
        signer,
      ),
      synth_fees,
      ctx.accounts.synth_mint.decimals,
    )?;
  }

  msg!("Fees withdrawn: {} capital, {} synth", capital_fees, synth_fees);

  emit!(FeesWithdrawn {
    authority: ctx.accounts.authority.key(),
    capital_fees,
    synth_fees,
    timestamp: ctx.accounts.clock.unix_timestamp,
  });

  let fund_state = &mut ctx.accounts.fund_state;
  fund_state.release_lock();

  Ok(())
}

#[derive(Accounts)]
pub struct WithdrawFees<'info> {
  pub authority: Signer<'info>,

  #[account(
    mut,
    seeds = [FUND_STATE_SEED],
    bump,
    has_one = capital_mint,
    has_one = synth_mint,
    constraint = fund_state.to_account_info().owner == &crate::ID @ FundError::InvalidAccountOwner,
  )]
  pub fund_state: Box<Account<'info, FundState>>,

  pub capital_mint: Box<InterfaceAccount<'info, Mint>>,

  pub synth_mint: Box<InterfaceAccount<'info, Mint>>,

  #[account(
    mut,
    token::mint = fund_state.capital_mint,
    token::authority = vault_authority,
  )]
  pub capital_vault: Box<InterfaceAccount<'info, TokenAccount>>,

  #[account(
    mut,
    token::mint = fund_state.synth_mint,
    token::authority = vault_authority,
  )]
  pub synth_vault: Box<InterfaceAccount<'info, TokenAccount>>,

  #[account(
    mut,
    token::mint = capital_mint,
    token::authority = authority,
  )]
  pub authority_capital_account: Box<InterfaceAccount<'info, TokenAccount>>,

  #[account(
    mut,
    token::mint = synth_mint,
    token::authority = authority,
  )]
  pub authority_synth_account: Box<InterfaceAccount<'info, TokenAccount>>,

  /// CHECK: PDA validated by seeds
  #[account(
    seeds = [VAULT_AUTHORITY_SEED],
    bump,
  )]
  pub vault_authority: UncheckedAccount<'info>,

  pub token_program: Interface<'info, TokenInterface>,

  pub clock: Sysvar<'info, Clock>,
}
