//! Claim instruction - collects accrued synth fees and staking rewards
//! Order is fixed: repair the collateralization ratio, claim from the fee
//! pool, optionally vest the reward escrow, then convert the net synth
//! proceeds to capital through the active pool (or the router when no pool
//! is confirmed).

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{TokenAccount, TokenInterface};

use crate::adapters::{debt_registry, oracle, rewards, swap};
use crate::collateral::{repair_amount, synth_to_burn_to_fix_ratio};
use crate::constants::WAD;
use crate::error::FundError;
use crate::events::FeesClaimed;
use crate::invariants::*;
use crate::state::*;
use crate::valuation::*;

#[allow(clippy::too_many_arguments)]
pub fn handler<'info>(
  ctx: Context<'_, '_, '_, 'info, ClaimFees<'info>>,
  synth_burn_hint: u64,
  router_min_rates: [u128; 2],
  pool_min_rates: [u128; 2],
  claim_rewards: bool,
  registry_accounts_len: u8,
  fee_pool_accounts_len: u8,
  escrow_accounts_len: u8,
) -> Result<()> {
  assert_not_cpi_context()?;

  {
    let fund_state = &mut ctx.accounts.fund_state;
    fund_state.assert_owner(ctx.accounts.caller.key)?;
    fund_state.acquire_lock()?;
  }

  let fund_state = &ctx.accounts.fund_state;
  assert_fee_divisor_valid(fund_state.fee_divisor)?;

  // Slice the forwarded accounts into the four CPI groups
  let ra = ctx.remaining_accounts;
  let registry_end = registry_accounts_len as usize;
  let fee_pool_end = registry_end
    .checked_add(fee_pool_accounts_len as usize)
    .ok_or(FundError::InvalidParameter)?;
  let escrow_end = fee_pool_end
    .checked_add(escrow_accounts_len as usize)
    .ok_or(FundError::InvalidParameter)?;
  require!(ra.len() >= escrow_end, FundError::InvalidParameter);

  let registry_accounts = &ra[..registry_end];
  let fee_pool_accounts = &ra[registry_end..fee_pool_end];
  let escrow_accounts = &ra[fee_pool_end..escrow_end];
  let swap_accounts = &ra[escrow_end..];

  let clock = &ctx.accounts.clock;
  let reserve_usd = oracle::read_usd_price_wad(
    &ctx.accounts.reserve_feed,
    &fund_state.reserve_feed,
    clock,
    fund_state.max_price_age_secs,
  )?;
  let capital_usd = oracle::read_usd_price_wad(
    &ctx.accounts.capital_feed,
    &fund_state.capital_feed,
    clock,
    fund_state.max_price_age_secs,
  )?;
  let synth_usd = oracle::read_usd_price_wad(
    &ctx.accounts.synth_feed,
    &fund_state.synth_feed,
    clock,
    fund_state.max_price_age_secs,
  )?;

  let capital_per_reserve = oracle_cross_rate(reserve_usd, capital_usd)?;
  let capital_per_synth = oracle_cross_rate(synth_usd, capital_usd)?;

  // Step 1: repair the issuance ratio. The hint is advisory; the burn is
  // sized off fresh registry reads.
  let ratio = debt_registry::issuance_ratio(
    fund_state.ratio_source(),
    &ctx.accounts.legacy_registry_state,
    &ctx.accounts.system_settings,
    &fund_state.legacy_registry_state,
    &fund_state.system_settings,
    &fund_state.debt_registry_program,
  )?;
  let debt_synth = debt_registry::current_debt(
    &ctx.accounts.registry_position,
    &fund_state.registry_position,
    &fund_state.debt_registry_program,
    ctx.accounts.vault_authority.key,
  )?;

  // Ratio check is done in synth units so the burn size needs no further
  // conversion
  let reserve_value_capital =
    reserve_value_in_capital(ctx.accounts.reserve_vault.amount, capital_per_reserve)?;
  let reserve_value_synth = mul_div_down(reserve_value_capital, WAD, capital_per_synth)
    .ok_or(FundError::MathOverflow)?;

  let fresh_burn = synth_to_burn_to_fix_ratio(debt_synth as u128, reserve_value_synth, ratio)?;
  let synth_to_burn = repair_amount(fresh_burn, synth_burn_hint);

  let vault_seeds = &[VAULT_AUTHORITY_SEED, &[ctx.bumps.vault_authority]];
  let signer: &[&[&[u8]]] = &[&vault_seeds[..]];

  if synth_to_burn > 0 {
    // The repair pulls from fund-owned synth only; accrued fees are not
    // available for it
    let synth_owned = ctx
      .accounts
      .synth_vault
      .amount
      .checked_sub(fund_state.withdrawable_synth_fees)
      .ok_or(FundError::BalanceSheetViolation)?;
    require!(synth_owned >= synth_to_burn, FundError::InsufficientBalance);

    msg!("Burning {} synth to restore ratio", synth_to_burn);

    debt_registry::adjust_debt(
      &ctx.accounts.registry_program,
      &fund_state.debt_registry_program,
      registry_accounts,
      ctx.accounts.vault_authority.key,
      false,
      synth_to_burn,
      signer,
    )?;
  }

  // The registry burn moved synth out of the vault; refresh before the
  // claim's delta measurement
  ctx.accounts.synth_vault.reload()?;

  // Step 2: claim accrued synth fees
  let synth_claimed = rewards::claim_fee_pool(
    &ctx.accounts.fee_pool_program,
    &fund_state.fee_pool,
    fee_pool_accounts,
    &mut ctx.accounts.synth_vault,
    ctx.accounts.vault_authority.key,
    signer,
  )?;

  msg!("Synth claimed: {}", synth_claimed);

  // Step 3: vest matured rewards when asked
  let mut reserve_vested = 0;
  if claim_rewards {
    reserve_vested = rewards::vest_reward_escrow(
      &ctx.accounts.escrow_program,
      &fund_state.reward_escrow,
      escrow_accounts,
      &mut ctx.accounts.reserve_vault,
      ctx.accounts.vault_authority.key,
      signer,
    )?;
    msg!("Reserve vested: {}", reserve_vested);
  }

  // Step 4: take the fund fee off the claim and convert the rest
  let (synth_to_convert, synth_fee) = apply_fee(synth_claimed, fund_state.fee_divisor)?;

  {
    let fund_state = &mut ctx.accounts.fund_state;
    fund_state.accrue_synth_fee(synth_fee)?;
  }

  let mut capital_received = 0;
  if synth_to_convert > 0 {
    let fund_state = &ctx.accounts.fund_state;
    capital_received = if fund_state.has_active_pool() {
      let min_out = swap::min_out_for(synth_to_convert, pool_min_rates[0])?;
      swap::exchange_via_pool(
        &ctx.accounts.exchange_program,
        &fund_state.active_pool,
        fund_state.active_slots,
        swap_accounts,
        &mut ctx.accounts.capital_vault,
        ctx.accounts.vault_authority.key,
        synth_to_convert,
        min_out,
        signer,
      )?
    } else {
      let min_out = swap::min_out_for(synth_to_convert, router_min_rates[0])?;
      swap::swap_via_router(
        &ctx.accounts.exchange_program,
        &fund_state.router_program,
        swap_accounts,
        &mut ctx.accounts.capital_vault,
        ctx.accounts.vault_authority.key,
        synth_to_convert,
        min_out,
        signer,
      )?
    };
    msg!("Capital received: {}", capital_received);
  }

  ctx.accounts.synth_vault.reload()?;
  ctx.accounts.capital_vault.reload()?;

  let fund_state = &ctx.accounts.fund_state;
  assert_fees_backed(
    fund_state.withdrawable_synth_fees,
    ctx.accounts.synth_vault.amount,
  )?;
  assert_fees_backed(
    fund_state.withdrawable_capital_fees,
    ctx.accounts.capital_vault.amount,
  )?;

  emit!(FeesClaimed {
    synth_claimed,
    synth_fee_accrued: synth_fee,
    capital_received,
    synth_burned_for_ratio: synth_to_burn,
    rewards_claimed: claim_rewards,
    reserve_vested,
    timestamp: ctx.accounts.clock.unix_timestamp,
  });

  let fund_state = &mut ctx.accounts.fund_state;
  fund_state.release_lock();

  Ok(())
}

#[derive(Accounts)]
pub struct ClaimFees<'info> {
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
    mut,
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
  pub reserve_feed: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring in the oracle adapter
  pub capital_feed: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring in the oracle adapter
  pub synth_feed: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring in the registry adapter
  pub registry_position: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring in the registry adapter
  pub legacy_registry_state: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring in the registry adapter
  pub system_settings: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring before the CPI
  pub registry_program: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring before the CPI
  pub fee_pool_program: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring before the CPI
  pub escrow_program: UncheckedAccount<'info>,

  /// CHECK: the active pool when one is confirmed, the router otherwise;
  /// the swap adapter checks the key either way
  pub exchange_program: UncheckedAccount<'info>,

  pub token_program: Interface<'info, TokenInterface>,

  pub clock: Sysvar<'info, Clock>,
  // remaining_accounts: [registry burn | fee pool claim | escrow vest |
  // swap leg] account groups, lengths given by the instruction args
}
