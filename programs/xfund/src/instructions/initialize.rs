//! Initialize instruction - sets up the fund
//! Creates the FundState PDA, the share mint and the three asset vaults,
//! and wires the external collaborator addresses.

use anchor_lang::prelude::*;
use anchor_spl::{
  associated_token::AssociatedToken,
  token_interface::{Mint, TokenAccount, TokenInterface},
};

use crate::constants::DEFAULT_FEE_DIVISOR;
use crate::error::FundError;
use crate::events::FundInitialized;
use crate::invariants::assert_fee_divisor_valid;
use crate::state::*;

/// External wiring supplied at deployment. Address tables and deploy
/// scripts live off-chain; the program only records what it is told.
#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct InitializeParams {
  pub manager: Pubkey,
  pub address_validator: Pubkey,
  pub reserve_feed: Pubkey,
  pub capital_feed: Pubkey,
  pub synth_feed: Pubkey,
  pub debt_registry_program: Pubkey,
  pub registry_position: Pubkey,
  pub legacy_registry_state: Pubkey,
  pub system_settings: Pubkey,
  pub router_program: Pubkey,
  pub fee_pool: Pubkey,
  pub reward_escrow: Pubkey,
  pub fee_divisor: u64,
  pub max_price_age_secs: u64,
}

pub fn handler(ctx: Context<Initialize>, params: InitializeParams) -> Result<()> {
  let fee_divisor = if params.fee_divisor == 0 {
    DEFAULT_FEE_DIVISOR
  } else {
    params.fee_divisor
  };
  assert_fee_divisor_valid(fee_divisor)?;

  require!(params.manager != Pubkey::default(), FundError::InvalidParameter);
  require!(
    params.address_validator != Pubkey::default(),
    FundError::InvalidParameter
  );
  require!(params.max_price_age_secs > 0, FundError::InvalidParameter);

  let fund_state = &mut ctx.accounts.fund_state;

  fund_state.authority = ctx.accounts.authority.key();
  fund_state.manager = params.manager;
  fund_state.address_validator = params.address_validator;

  fund_state.share_mint = ctx.accounts.share_mint.key();
  fund_state.capital_mint = ctx.accounts.capital_mint.key();
  fund_state.reserve_mint = ctx.accounts.reserve_mint.key();
  fund_state.synth_mint = ctx.accounts.synth_mint.key();

  fund_state.reserve_feed = params.reserve_feed;
  fund_state.capital_feed = params.capital_feed;
  fund_state.synth_feed = params.synth_feed;

  fund_state.debt_registry_program = params.debt_registry_program;
  fund_state.registry_position = params.registry_position;
  fund_state.legacy_registry_state = params.legacy_registry_state;
  fund_state.system_settings = params.system_settings;

  fund_state.router_program = params.router_program;
  fund_state.fee_pool = params.fee_pool;
  fund_state.reward_escrow = params.reward_escrow;

  fund_state.active_pool = Pubkey::default();
  fund_state.pending_pool = Pubkey::default();
  fund_state.active_slots = [0; 2];
  fund_state.pending_slots = [0; 2];
  fund_state.pool_confirmed = false;

  fund_state.total_supply = 0;
  fund_state.withdrawable_capital_fees = 0;
  fund_state.withdrawable_synth_fees = 0;
  fund_state.fee_divisor = fee_divisor;
  fund_state.max_price_age_secs = params.max_price_age_secs;

  fund_state.paused = false;
  fund_state.locked = false;
  fund_state.ratio_from_system_settings = false;

  fund_state._reserved = [0; 8];

  msg!("Fund initialized");
  msg!("Share mint: {}", fund_state.share_mint);
  msg!("Reserve mint: {}", fund_state.reserve_mint);
  msg!("Fee divisor: {}", fee_divisor);

  emit!(FundInitialized {
    authority: fund_state.authority,
    share_mint: fund_state.share_mint,
    capital_mint: fund_state.capital_mint,
    reserve_mint: fund_state.reserve_mint,
    synth_mint: fund_state.synth_mint,
    fee_divisor,
    timestamp: ctx.accounts.clock.unix_timestamp,
  });

  Ok(())
}

#[derive(Accounts)]
pub struct Initialize<'info> {
  #[account(mut)]
  pub authority: Signer<'info>,

  /// FundState PDA - the fund's single source of truth
  #[account(
    init,
    payer = authority,
    space = FundState::LEN,
    seeds = [FUND_STATE_SEED],
    bump
  )]
  pub fund_state: Account<'info, FundState>,

  /// Fund share mint, controlled by the FundState PDA
  #[account(
    init,
    payer = authority,
    mint::decimals = 9,
    mint::authority = fund_state,
    mint::token_program = token_program,
  )]
  pub share_mint: InterfaceAccount<'info, Mint>,

  pub capital_mint: InterfaceAccount<'info, Mint>,

  pub reserve_mint: InterfaceAccount<'info, Mint>,

  pub synth_mint: InterfaceAccount<'info, Mint>,

  /// Capital vault - deterministic ATA owned by vault_authority
  #[account(
    init,
    payer = authority,
    associated_token::mint = capital_mint,
    associated_token::authority = vault_authority,
  )]
  pub capital_vault: InterfaceAccount<'info, TokenAccount>,

  #[account(
    init,
    payer = authority,
    associated_token::mint = reserve_mint,
    associated_token::authority = vault_authority,
  )]
  pub reserve_vault: InterfaceAccount<'info, TokenAccount>,

  #[account(
    init,
    payer = authority,
    associated_token::mint = synth_mint,
    associated_token::authority = vault_authority,
  )]
  pub synth_vault: InterfaceAccount<'info, TokenAccount>,

  /// CHECK: PDA validated by seeds
  #[account(
    seeds = [VAULT_AUTHORITY_SEED],
    bump
  )]
  pub vault_authority: UncheckedAccount<'info>,

  pub token_program: Interface<'info, TokenInterface>,
  pub associated_token_program: Program<'info, AssociatedToken>,
  pub system_program: Program<'info, System>,

  pub clock: Sysvar<'info, Clock>,
}
