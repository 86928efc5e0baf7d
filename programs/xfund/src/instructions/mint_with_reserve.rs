//! Mint-with-reserve instruction - issues fund shares for a contribution
//! made directly in the reserve asset
//! No swap happens; the contribution is valued at the oracle cross rate and
//! the divisor fee is charged in shares, minted to the administrator
//! (same treasury pattern as capital mints use for their capital fee).

use anchor_lang::prelude::*;
use anchor_spl::{
  associated_token::AssociatedToken,
  token_interface::{self, Mint, TokenAccount, TokenInterface, MintTo, TransferChecked},
};

use crate::adapters::{debt_registry, oracle};
use crate::error::FundError;
use crate::events::SharesMintedWithReserve;
use crate::invariants::*;
use crate::state::*;
use crate::valuation::*;

pub fn handler(
  ctx: Context<MintSharesWithReserve>,
  reserve_amount: u64,
  min_shares_out: u64,
) -> Result<()> {
  assert_not_cpi_context()?;

  {
    let fund_state = &mut ctx.accounts.fund_state;
    fund_state.acquire_lock()?;
  }

  let fund_state = &ctx.accounts.fund_state;

  require!(!fund_state.paused, FundError::MintPaused);
  require!(reserve_amount > 0, FundError::ZeroAmount);
  require!(
    ctx.accounts.user_reserve_account.amount >= reserve_amount,
    FundError::InsufficientBalance
  );
  assert_fee_divisor_valid(fund_state.fee_divisor)?;

  // Pre-contribution snapshot
  let supply_before = fund_state.total_supply;
  let reserve_before = ctx.accounts.reserve_vault.amount;
  let capital_balance = ctx.accounts.capital_vault.amount;
  let synth_balance = ctx.accounts.synth_vault.amount;
  let capital_fees = fund_state.withdrawable_capital_fees;
  let synth_fees = fund_state.withdrawable_synth_fees;

  // Oracle-derived rates; no trade happens on this path
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

  let debt_synth = debt_registry::current_debt(
    &ctx.accounts.registry_position,
    &fund_state.registry_position,
    &fund_state.debt_registry_program,
    ctx.accounts.vault_authority.key,
  )?;
  let debt_value = debt_value_in_capital(debt_synth, capital_per_synth)?;

  let capital_owned = capital_balance
    .checked_sub(capital_fees)
    .ok_or(FundError::BalanceSheetViolation)?;
  let synth_owned = synth_balance
    .checked_sub(synth_fees)
    .ok_or(FundError::BalanceSheetViolation)?;
  let non_reserve = non_reserve_asset_value(capital_owned, synth_owned, capital_per_synth)?;

  // Capital-equivalent of the contribution at the oracle rate
  let proxy_capital = mul_div_down(reserve_amount as u128, capital_per_reserve, crate::constants::WAD)
    .ok_or(FundError::MathOverflow)?;
  let proxy_capital = u64::try_from(proxy_capital).map_err(|_| FundError::MathOverflow)?;
  require!(proxy_capital > 0, FundError::AmountTooSmall);

  let shares_gross;
  let nav;
  if supply_before == 0 {
    nav = 0;
    shares_gross = tokens_to_mint_seed(proxy_capital);
  } else {
    nav = nav_on_mint(capital_per_reserve, reserve_before, non_reserve, debt_value)?;
    let price = issue_token_price(nav, supply_before)?;
    shares_gross = tokens_to_mint(proxy_capital, price)?;
  }

  // Fee is charged in shares and minted to the administrator
  let (shares_net, fee_shares) = apply_fee(shares_gross, fund_state.fee_divisor)?;
  require!(shares_net > 0, FundError::AmountTooSmall);
  require!(shares_net >= min_shares_out, FundError::SlippageExceeded);

  msg!("Reserve in: {}", reserve_amount);
  msg!("Shares: {} net to user, {} fee", shares_net, fee_shares);

  // Commit state before external calls
  let new_supply;
  {
    let fund_state = &mut ctx.accounts.fund_state;
    new_supply = fund_state
      .total_supply
      .checked_add(shares_gross)
      .ok_or(FundError::MathOverflow)?;
    fund_state.total_supply = new_supply;
  }

  // Pull the reserve contribution into the vault
  let transfer_in = TransferChecked {
    from: ctx.accounts.user_reserve_account.to_account_info(),
    mint: ctx.accounts.reserve_mint.to_account_info(),
    to: ctx.accounts.reserve_vault.to_account_info(),
    authority: ctx.accounts.user.to_account_info(),
  };
  token_interface::transfer_checked(
    CpiContext::new(ctx.accounts.token_program.to_account_info(), transfer_in),
    reserve_amount,
    ctx.accounts.reserve_mint.decimals,
  )?;

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
    shares_net,
  )?;

  if fee_shares > 0 {
    let mint_to_admin = MintTo {
      mint: ctx.accounts.share_mint.to_account_info(),
      to: ctx.accounts.authority_share_account.to_account_info(),
      authority: ctx.accounts.fund_state.to_account_info(),
    };
    token_interface::mint_to(
      CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        mint_to_admin,
        state_signer,
      ),
      fee_shares,
    )?;
  }

  ctx.accounts.share_mint.reload()?;
  assert_supply_reconciled(new_supply, ctx.accounts.share_mint.supply)?;

  emit!(SharesMintedWithReserve {
    user: ctx.accounts.user.key(),
    reserve_in: reserve_amount,
    fee_shares,
    shares_minted: shares_net,
    nav,
    total_supply: new_supply,
    timestamp: ctx.accounts.clock.unix_timestamp,
  });

  let fund_state = &mut ctx.accounts.fund_state;
  fund_state.release_lock();

  Ok(())
}

#[derive(Accounts)]
pub struct MintSharesWithReserve<'info> {
  #[account(mut)]
  pub user: Signer<'info>,

  #[account(
    mut,
    seeds = [FUND_STATE_SEED],
    bump,
    has_one = share_mint,
    has_one = reserve_mint,
    constraint = fund_state.to_account_info().owner == &crate::ID @ FundError::InvalidAccountOwner,
  )]
  pub fund_state: Box<Account<'info, FundState>>,

  #[account(
    mut,
    constraint = share_mint.mint_authority == anchor_lang::solana_program::program_option::COption::Some(fund_state.key()) @ FundError::InvalidMintAuthority,
  )]
  pub share_mint: Box<InterfaceAccount<'info, Mint>>,

  pub reserve_mint: Box<InterfaceAccount<'info, Mint>>,

  #[account(
    mut,
    token::mint = share_mint,
    token::authority = user,
  )]
  pub user_share_account: Box<InterfaceAccount<'info, TokenAccount>>,

  #[account(
    mut,
    token::mint = reserve_mint,
    token::authority = user,
  )]
  pub user_reserve_account: Box<InterfaceAccount<'info, TokenAccount>>,

  /// Administrator's share account (receives the share fee)
  #[account(
    init_if_needed,
    payer = user,
    associated_token::mint = share_mint,
    associated_token::authority = authority,
    associated_token::token_program = token_program,
  )]
  pub authority_share_account: Box<InterfaceAccount<'info, TokenAccount>>,

  /// CHECK: must be the fund owner recorded in state
  #[account(constraint = authority.key() == fund_state.authority @ FundError::Unauthorized)]
  pub authority: UncheckedAccount<'info>,

  #[account(
    mut,
    token::mint = fund_state.reserve_mint,
    token::authority = vault_authority,
  )]
  pub reserve_vault: Box<InterfaceAccount<'info, TokenAccount>>,

  #[account(
    token::mint = fund_state.capital_mint,
    token::authority = vault_authority,
  )]
  pub capital_vault: Box<InterfaceAccount<'info, TokenAccount>>,

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
  pub reserve_feed: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring in the oracle adapter
  pub capital_feed: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring in the oracle adapter
  pub synth_feed: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring in the registry adapter
  pub registry_position: UncheckedAccount<'info>,

  pub token_program: Interface<'info, TokenInterface>,
  pub associated_token_program: Program<'info, AssociatedToken>,
  pub system_program: Program<'info, System>,

  pub clock: Sysvar<'info, Clock>,
}
