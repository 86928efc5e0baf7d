//! Hedge instruction - resizes the synth debt position
//! A positive adjustment issues synth against the reserve and converts the
//! proceeds to capital across the router and the active pool; a negative
//! adjustment acquires synth as needed and repays debt. The plan's phase
//! machine enforces the ordering inside the instruction.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{TokenAccount, TokenInterface};

use crate::adapters::{debt_registry, swap};
use crate::error::FundError;
use crate::events::Hedged;
use crate::hedge::HedgePlan;
use crate::invariants::*;
use crate::state::*;

#[allow(clippy::too_many_arguments)]
pub fn handler<'info>(
  ctx: Context<'_, '_, '_, 'info, Hedge<'info>>,
  debt_adjustment: i64,
  router_min_rates: [u128; 2],
  pool_min_rates: [u128; 2],
  router_allocation: u64,
  registry_accounts_len: u8,
  router_accounts_len: u8,
) -> Result<()> {
  assert_not_cpi_context()?;

  {
    let fund_state = &mut ctx.accounts.fund_state;
    fund_state.assert_owner_or_manager(ctx.accounts.caller.key)?;
    fund_state.acquire_lock()?;
  }

  let mut plan = HedgePlan::new(
    debt_adjustment,
    router_min_rates,
    pool_min_rates,
    router_allocation,
  )?;

  // Slice the forwarded accounts into the three CPI groups
  let ra = ctx.remaining_accounts;
  let registry_end = registry_accounts_len as usize;
  let router_end = registry_end
    .checked_add(router_accounts_len as usize)
    .ok_or(FundError::InvalidParameter)?;
  require!(ra.len() >= router_end, FundError::InvalidParameter);

  let registry_accounts = &ra[..registry_end];
  let router_accounts = &ra[registry_end..router_end];
  let pool_accounts = &ra[router_end..];

  let vault_seeds = &[VAULT_AUTHORITY_SEED, &[ctx.bumps.vault_authority]];
  let signer: &[&[&[u8]]] = &[&vault_seeds[..]];

  let synth_delta;
  let router_leg_out;
  let pool_leg_out;

  if plan.is_issue() {
    // Issue synth against the reserve position
    plan.begin_sizing()?;

    let synth_before = ctx.accounts.synth_vault.amount;
    debt_registry::adjust_debt(
      &ctx.accounts.registry_program,
      &ctx.accounts.fund_state.debt_registry_program,
      registry_accounts,
      ctx.accounts.vault_authority.key,
      true,
      plan.debt_delta(),
      signer,
    )?;
    ctx.accounts.synth_vault.reload()?;
    synth_delta = ctx
      .accounts
      .synth_vault
      .amount
      .checked_sub(synth_before)
      .ok_or(FundError::MathOverflow)?;
    require!(synth_delta > 0, FundError::RegistryCpiFailed);

    msg!("Synth issued: {}", synth_delta);

    plan.begin_swapping(synth_delta)?;
    let (router_leg, pool_leg) = plan.issue_legs()?;

    router_leg_out = if router_leg > 0 {
      let min_out = swap::min_out_for(router_leg, plan.router_min_rates[0])?;
      swap::swap_via_router(
        &ctx.accounts.router_program,
        &ctx.accounts.fund_state.router_program,
        router_accounts,
        &mut ctx.accounts.capital_vault,
        ctx.accounts.vault_authority.key,
        router_leg,
        min_out,
        signer,
      )?
    } else {
      0
    };

    pool_leg_out = if pool_leg > 0 {
      let fund_state = &ctx.accounts.fund_state;
      require!(fund_state.has_active_pool(), FundError::NoActivePool);
      let min_out = swap::min_out_for(pool_leg, plan.pool_min_rates[0])?;
      swap::exchange_via_pool(
        &ctx.accounts.pool_program,
        &fund_state.active_pool,
        fund_state.active_slots,
        pool_accounts,
        &mut ctx.accounts.capital_vault,
        ctx.accounts.vault_authority.key,
        pool_leg,
        min_out,
        signer,
      )?
    } else {
      0
    };

    plan.settle()?;
  } else {
    // Repay: acquire synth first when the caller dedicated capital to it
    plan.begin_sizing()?;

    let mut synth_acquired = 0;
    let mut acquired_via_pool = false;
    if plan.router_allocation > 0 {
      let fund_state = &ctx.accounts.fund_state;
      synth_acquired = if fund_state.has_active_pool() {
        acquired_via_pool = true;
        // capital -> synth runs the pool slots in reverse
        let slots = [fund_state.active_slots[1], fund_state.active_slots[0]];
        let min_out = swap::min_out_for(plan.router_allocation, plan.pool_min_rates[1])?;
        swap::exchange_via_pool(
          &ctx.accounts.pool_program,
          &fund_state.active_pool,
          slots,
          pool_accounts,
          &mut ctx.accounts.synth_vault,
          ctx.accounts.vault_authority.key,
          plan.router_allocation,
          min_out,
          signer,
        )?
      } else {
        let min_out = swap::min_out_for(plan.router_allocation, plan.router_min_rates[1])?;
        swap::swap_via_router(
          &ctx.accounts.router_program,
          &fund_state.router_program,
          router_accounts,
          &mut ctx.accounts.synth_vault,
          ctx.accounts.vault_authority.key,
          plan.router_allocation,
          min_out,
          signer,
        )?
      };
      msg!("Synth acquired: {}", synth_acquired);
    }

    plan.begin_swapping(synth_acquired)?;

    // The burn pulls fund-owned synth only
    let fund_state = &ctx.accounts.fund_state;
    let synth_owned = ctx
      .accounts
      .synth_vault
      .amount
      .checked_sub(fund_state.withdrawable_synth_fees)
      .ok_or(FundError::BalanceSheetViolation)?;
    require!(synth_owned >= plan.debt_delta(), FundError::InsufficientBalance);

    debt_registry::adjust_debt(
      &ctx.accounts.registry_program,
      &fund_state.debt_registry_program,
      registry_accounts,
      ctx.accounts.vault_authority.key,
      false,
      plan.debt_delta(),
      signer,
    )?;

    msg!("Synth repaid: {}", plan.debt_delta());

    synth_delta = plan.debt_delta();
    let (router_leg, pool_leg) = crate::hedge::repay_legs(synth_acquired, acquired_via_pool);
    router_leg_out = router_leg;
    pool_leg_out = pool_leg;

    plan.settle()?;
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

  emit!(Hedged {
    caller: ctx.accounts.caller.key(),
    debt_adjustment,
    synth_delta,
    router_leg: router_leg_out,
    pool_leg: pool_leg_out,
    timestamp: ctx.accounts.clock.unix_timestamp,
  });

  let fund_state = &mut ctx.accounts.fund_state;
  fund_state.release_lock();

  Ok(())
}

#[derive(Accounts)]
pub struct Hedge<'info> {
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

  /// CHECK: validated against fund_state wiring before the CPI
  pub registry_program: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring before the CPI
  pub router_program: UncheckedAccount<'info>,

  /// CHECK: checked against the governor-confirmed active pool before use
  pub pool_program: UncheckedAccount<'info>,

  pub token_program: Interface<'info, TokenInterface>,

  pub clock: Sysvar<'info, Clock>,
  // remaining_accounts: [registry | router | pool] account groups, lengths
  // given by the instruction args
}
