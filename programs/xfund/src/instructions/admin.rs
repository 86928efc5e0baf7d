//! Administrative instructions
//! Owner-gated parameter and role updates, the mint pause switch, the
//! issuance-ratio source toggle, and the two-party pool rotation.

use anchor_lang::prelude::*;

use crate::error::FundError;
use crate::events::*;
use crate::invariants::assert_fee_divisor_valid;
use crate::state::*;

pub fn set_fee_divisor(ctx: Context<AdminOnly>, new_divisor: u64) -> Result<()> {
  let fund_state = &mut ctx.accounts.fund_state;
  fund_state.assert_owner(ctx.accounts.authority.key)?;
  assert_fee_divisor_valid(new_divisor)?;

  let old = fund_state.fee_divisor;
  fund_state.fee_divisor = new_divisor;

  msg!("Fee divisor: {} -> {}", old, new_divisor);

  emit!(ParametersUpdated {
    authority: ctx.accounts.authority.key(),
    old_fee_divisor: old,
    new_fee_divisor: new_divisor,
    timestamp: ctx.accounts.clock.unix_timestamp,
  });

  Ok(())
}

pub fn set_manager(ctx: Context<AdminOnly>, manager: Pubkey) -> Result<()> {
  let fund_state = &mut ctx.accounts.fund_state;
  fund_state.assert_owner(ctx.accounts.authority.key)?;

  require!(manager != Pubkey::default(), FundError::InvalidParameter);
  fund_state.manager = manager;

  emit!(RolesUpdated {
    authority: ctx.accounts.authority.key(),
    manager: fund_state.manager,
    address_validator: fund_state.address_validator,
    timestamp: ctx.accounts.clock.unix_timestamp,
  });

  Ok(())
}

pub fn set_address_validator(ctx: Context<AdminOnly>, address_validator: Pubkey) -> Result<()> {
  let fund_state = &mut ctx.accounts.fund_state;
  fund_state.assert_owner(ctx.accounts.authority.key)?;

  require!(address_validator != Pubkey::default(), FundError::InvalidParameter);
  fund_state.address_validator = address_validator;

  emit!(RolesUpdated {
    authority: ctx.accounts.authority.key(),
    manager: fund_state.manager,
    address_validator: fund_state.address_validator,
    timestamp: ctx.accounts.clock.unix_timestamp,
  });

  Ok(())
}

pub fn set_paused(ctx: Context<AdminOnly>, paused: bool) -> Result<()> {
  let fund_state = &mut ctx.accounts.fund_state;
  fund_state.assert_owner(ctx.accounts.authority.key)?;

  fund_state.paused = paused;
  msg!("Paused: {}", paused);

  emit!(EmergencyPause {
    authority: ctx.accounts.authority.key(),
    paused,
    timestamp: ctx.accounts.clock.unix_timestamp,
  });

  Ok(())
}

pub fn toggle_ratio_source(ctx: Context<AdminOnly>) -> Result<()> {
  let fund_state = &mut ctx.accounts.fund_state;
  fund_state.assert_owner(ctx.accounts.authority.key)?;

  fund_state.toggle_ratio_source();

  emit!(RatioSourceToggled {
    authority: ctx.accounts.authority.key(),
    from_system_settings: fund_state.ratio_from_system_settings,
    timestamp: ctx.accounts.clock.unix_timestamp,
  });

  Ok(())
}

/// Owner half of the pool rotation. The first proposal of a fund's life
/// activates directly; later ones stage a pending address.
pub fn propose_pool(ctx: Context<AdminOnly>, pool: Pubkey, slots: [u8; 2]) -> Result<()> {
  let fund_state = &mut ctx.accounts.fund_state;
  fund_state.assert_owner(ctx.accounts.authority.key)?;

  let outcome = fund_state.propose_pool(pool, slots)?;
  let activated_directly = outcome == PoolProposal::Activated;

  msg!("Pool proposed: {} (direct: {})", pool, activated_directly);

  emit!(PoolProposed {
    authority: ctx.accounts.authority.key(),
    pool,
    slots,
    activated_directly,
    timestamp: ctx.accounts.clock.unix_timestamp,
  });

  Ok(())
}

/// Validator half of the pool rotation. Must name the pending address
/// exactly.
pub fn confirm_pool(ctx: Context<ValidatorOnly>, pool: Pubkey) -> Result<()> {
  let fund_state = &mut ctx.accounts.fund_state;
  fund_state.assert_validator(ctx.accounts.validator.key)?;

  fund_state.confirm_pool(pool)?;

  msg!("Pool confirmed: {}", pool);

  emit!(PoolConfirmed {
    validator: ctx.accounts.validator.key(),
    pool,
    slots: fund_state.active_slots,
    timestamp: ctx.accounts.clock.unix_timestamp,
  });

  Ok(())
}

#[derive(Accounts)]
pub struct AdminOnly<'info> {
  pub authority: Signer<'info>,

  #[account(
    mut,
    seeds = [FUND_STATE_SEED],
    bump,
    constraint = fund_state.to_account_info().owner == &crate::ID @ FundError::InvalidAccountOwner,
  )]
  pub fund_state: Account<'info, FundState>,

  pub clock: Sysvar<'info, Clock>,
}

#[derive(Accounts)]
pub struct ValidatorOnly<'info> {
  pub validator: Signer<'info>,

  #[account(
    mut,
    seeds = [FUND_STATE_SEED],
    bump,
    constraint = fund_state.to_account_info().owner == &crate::ID @ FundError::InvalidAccountOwner,
  )]
  pub fund_state: Account<'info, FundState>,

  pub clock: Sysvar<'info, Clock>,
}
