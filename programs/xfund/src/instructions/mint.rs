//! Mint instruction - issues fund shares for external capital
//! The contribution is charged the divisor fee, the remainder buys reserve
//! through the router, and shares are priced off the balances observed
//! before the swap.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
  self, Mint, TokenAccount, TokenInterface, MintTo, TransferChecked,
};

use crate::adapters::{debt_registry, oracle, swap};
use crate::constants::MIN_CAPITAL_DEPOSIT;
use crate::error::FundError;
use crate::events::SharesMinted;
use crate::invariants::*;
use crate::state::*;
use crate::valuation::*;

pub fn handler<'info>(
  ctx: Context<'_, '_, '_, 'info, MintShares<'info>>,
  capital_amount: u64,
  min_reserve_out: u64,
) -> Result<()> {
  assert_not_cpi_context()?;

  {
    let fund_state = &mut ctx.accounts.fund_state;
    fund_state.acquire_lock()?;
  }

  let fund_state = &ctx.accounts.fund_state;

  // Input validations
  require!(!fund_state.paused, FundError::MintPaused);
  require!(capital_amount > 0, FundError::ZeroAmount);
  require!(capital_amount >= MIN_CAPITAL_DEPOSIT, FundError::AmountTooSmall);
  require!(
    ctx.accounts.user_capital_account.amount >= capital_amount,
    FundError::InsufficientBalance
  );
  assert_fee_divisor_valid(fund_state.fee_divisor)?;

  // Snapshot pre-contribution balances; share pricing must not see the
  // incoming capital or the swap it funds
  let supply_before = fund_state.total_supply;
  let reserve_before = ctx.accounts.reserve_vault.amount;
  let capital_before = ctx.accounts.capital_vault.amount;
  let synth_balance = ctx.accounts.synth_vault.amount;
  let capital_fees_before = fund_state.withdrawable_capital_fees;
  let synth_fees = fund_state.withdrawable_synth_fees;

  // Fee comes off the top and accrues to the withdrawable ledger
  let (capital_for_reserve, fee) = apply_fee(capital_amount, fund_state.fee_divisor)?;
  require!(capital_for_reserve > 0, FundError::AmountTooSmall);

  msg!("Capital in: {} (fee {})", capital_amount, fee);

  {
    let fund_state = &mut ctx.accounts.fund_state;
    fund_state.accrue_capital_fee(fee)?;
  }

  // Pull the full contribution into the capital vault
  let transfer_in = TransferChecked {
    from: ctx.accounts.user_capital_account.to_account_info(),
    mint: ctx.accounts.capital_mint.to_account_info(),
    to: ctx.accounts.capital_vault.to_account_info(),
    authority: ctx.accounts.user.to_account_info(),
  };
  token_interface::transfer_checked(
    CpiContext::new(ctx.accounts.token_program.to_account_info(), transfer_in),
    capital_amount,
    ctx.accounts.capital_mint.decimals,
  )?;

  // Acquire reserve through the router; min_reserve_out is the caller's
  // absolute floor on the fill
  let vault_seeds = &[VAULT_AUTHORITY_SEED, &[ctx.bumps.vault_authority]];
  let signer: &[&[&[u8]]] = &[&vault_seeds[..]];

  let reserve_acquired = swap::swap_via_router(
    &ctx.accounts.router_program,
    &ctx.accounts.fund_state.router_program,
    ctx.remaining_accounts,
    &mut ctx.accounts.reserve_vault,
    ctx.accounts.vault_authority.key,
    capital_for_reserve,
    min_reserve_out,
    signer,
  )?;
  require!(reserve_acquired > 0, FundError::SlippageExceeded);

  msg!("Reserve acquired: {}", reserve_acquired);

  // Valuation off pre-swap balances
  let fund_state = &ctx.accounts.fund_state;
  let clock = &ctx.accounts.clock;

  let synth_usd = oracle::read_usd_price_wad(
    &ctx.accounts.synth_feed,
    &fund_state.synth_feed,
    clock,
    fund_state.max_price_age_secs,
  )?;
  let capital_usd = oracle::read_usd_price_wad(
    &ctx.accounts.capital_feed,
    &fund_state.capital_feed,
    clock,
    fund_state.max_price_age_secs,
  )?;
  let capital_per_synth = oracle_cross_rate(synth_usd, capital_usd)?;

  let debt_synth = debt_registry::current_debt(
    &ctx.accounts.registry_position,
    &fund_state.registry_position,
    &fund_state.debt_registry_program,
    ctx.accounts.vault_authority.key,
  )?;
  let debt_value = debt_value_in_capital(debt_synth, capital_per_synth)?;

  // Fund-owned balances exclude accrued fees
  let capital_owned = capital_before
    .checked_sub(capital_fees_before)
    .ok_or(FundError::BalanceSheetViolation)?;
  let synth_owned = synth_balance
    .checked_sub(synth_fees)
    .ok_or(FundError::BalanceSheetViolation)?;

  let non_reserve = non_reserve_asset_value(capital_owned, synth_owned, capital_per_synth)?;

  // Rate implied by the trade just executed
  let capital_per_reserve = implied_capital_per_reserve(capital_for_reserve, reserve_acquired)?;

  let shares_to_mint;
  let nav;
  if supply_before == 0 {
    // First mint: seed price, no division by the zero supply
    nav = 0;
    shares_to_mint = tokens_to_mint_seed(capital_for_reserve);
  } else {
    nav = nav_on_mint(capital_per_reserve, reserve_before, non_reserve, debt_value)?;
    let price = issue_token_price(nav, supply_before)?;
    shares_to_mint = tokens_to_mint(capital_for_reserve, price)?;
  }
  require!(shares_to_mint > 0, FundError::AmountTooSmall);

  msg!("NAV: {}", nav);
  msg!("Shares to mint: {}", shares_to_mint);

  // Commit state before the share mint CPI
  let new_supply;
  {
    let fund_state = &mut ctx.accounts.fund_state;
    new_supply = fund_state
      .total_supply
      .checked_add(shares_to_mint)
      .ok_or(FundError::MathOverflow)?;
    fund_state.total_supply = new_supply;
  }

  let state_seeds = &[FUND_STATE_SEED, &[ctx.bumps.fund_state]];
  let state_signer: &[&[&[u8]]] = &[&state_seeds[..]];

  let mint_to_user = MintTo {
    mint: ctx.accounts.share_mint.to_account_info(),
    to: ctx.accounts.user_share_account.to_account_info(),
    authority: ctx.accounts.fund_state.to_account_info(),
  };
  token_interface::mint_to(
    CpiContext::new_with_signer(
      ctx.accounts.token_program.to_account_info(),
      mint_to_user,
      state_signer,
    ),
    shares_to_mint,
  )?;

  // Reconcile bookkeeping against reality
  ctx.accounts.share_mint.reload()?;
  ctx.accounts.capital_vault.reload()?;

  assert_supply_reconciled(new_supply, ctx.accounts.share_mint.supply)?;
  assert_fees_backed(
    ctx.accounts.fund_state.withdrawable_capital_fees,
    ctx.accounts.capital_vault.amount,
  )?;

  emit!(SharesMinted {
    user: ctx.accounts.user.key(),
    capital_in: capital_amount,
    fee,
    reserve_acquired,
    shares_minted: shares_to_mint,
    nav,
    total_supply: new_supply,
    timestamp: ctx.accounts.clock.unix_timestamp,
  });

  let fund_state = &mut ctx.accounts.fund_state;
  fund_state.release_lock();

  Ok(())
}

#[derive(Accounts)]
pub struct MintShares<'info> {
  #[account(mut)]
  pub user: Signer<'info>,

  /// FundState PDA
  #[account(
    mut,
    seeds = [FUND_STATE_SEED],
    bump,
    has_one = share_mint,
    has_one = capital_mint,
    constraint = fund_state.to_account_info().owner == &crate::ID @ FundError::InvalidAccountOwner,
  )]
  pub fund_state: Box<Account<'info, FundState>>,

  /// Share mint
  #[account(
    mut,
    constraint = share_mint.mint_authority == anchor_lang::solana_program::program_option::COption::Some(fund_state.key()) @ FundError::InvalidMintAuthority,
  )]
  pub share_mint: Box<InterfaceAccount<'info, Mint>>,

  pub capital_mint: Box<InterfaceAccount<'info, Mint>>,

  /// User's share token account (receives minted shares)
  #[account(
    mut,
    token::mint = share_mint,
    token::authority = user,
  )]
  pub user_share_account: Box<InterfaceAccount<'info, TokenAccount>>,

  /// User's capital token account (source of the contribution)
  #[account(
    mut,
    token::mint = capital_mint,
    token::authority = user,
  )]
  pub user_capital_account: Box<InterfaceAccount<'info, TokenAccount>>,

  #[account(
    mut,
    token::mint = fund_state.capital_mint,
    token::authority = vault_authority,
  )]
  pub capital_vault: Box<InterfaceAccount<'info, TokenAccount>>,

  #[account(
    mut,
    token::mint = fund_state.reserve_mint,
    token::authority = vault_authority,
  )]
  pub reserve_vault: Box<InterfaceAccount<'info, TokenAccount>>,

  #[account(
    token::mint = fund_state.synth_mint,
    token::authority = vault_authority,
  )]
  pub synth_vault: Box<InterfaceAccount<'info, TokenAccount>>,

  /// CHECK: PDA validated by seeds
  #[account(
    seeds = [VAULT_AUTHORITY_SEED],
    bump,
  )]
  pub vault_authority: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring in the oracle adapter
  pub capital_feed: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring in the oracle adapter
  pub synth_feed: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring in the registry adapter
  pub registry_position: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring before the CPI
  pub router_program: UncheckedAccount<'info>,

  pub token_program: Interface<'info, TokenInterface>,

  pub clock: Sysvar<'info, Clock>,
  // remaining_accounts: the router's route accounts, in the order the
  // router expects
}
