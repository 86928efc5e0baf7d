//! Burn instruction - redeems fund shares for capital
//! Pricing uses the pre-burn supply and the slippage-discounted oracle
//! rate; the payout comes from the capital vault and may never dip into
//! accrued fees.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
  self, Mint, TokenAccount, TokenInterface, Burn, TransferChecked,
};

use crate::adapters::{debt_registry, oracle};
use crate::constants::MIN_SHARE_BURN;
use crate::error::FundError;
use crate::events::SharesBurned;
use crate::invariants::*;
use crate::state::*;
use crate::valuation::*;

pub fn handler(ctx: Context<BurnShares>, share_amount: u64, min_capital_out: u64) -> Result<()> {
  assert_not_cpi_context()?;

  {
    let fund_state = &mut ctx.accounts.fund_state;
    fund_state.acquire_lock()?;
  }

  let fund_state = &ctx.accounts.fund_state;

  require!(share_amount > 0, FundError::ZeroAmount);
  require!(share_amount >= MIN_SHARE_BURN, FundError::AmountTooSmall);
  require!(
    ctx.accounts.user_share_account.amount >= share_amount,
    FundError::InsufficientBalance
  );
  assert_fee_divisor_valid(fund_state.fee_divisor)?;

  // Pre-burn snapshot; the redeem price divides by the supply that still
  // includes the shares being burned
  let supply_before = fund_state.total_supply;
  require!(supply_before >= share_amount, FundError::InsufficientBalance);

  let reserve_balance = ctx.accounts.reserve_vault.amount;
  let capital_balance = ctx.accounts.capital_vault.amount;
  let synth_balance = ctx.accounts.synth_vault.amount;
  let capital_fees_before = fund_state.withdrawable_capital_fees;
  let synth_fees = fund_state.withdrawable_synth_fees;

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
    .checked_sub(capital_fees_before)
    .ok_or(FundError::BalanceSheetViolation)?;
  let synth_owned = synth_balance
    .checked_sub(synth_fees)
    .ok_or(FundError::BalanceSheetViolation)?;
  let non_reserve = non_reserve_asset_value(capital_owned, synth_owned, capital_per_synth)?;

  // Redemption values the reserve at 99/100 of the oracle rate
  let discounted = redemption_rate(capital_per_reserve)?;
  let nav = nav_on_redeem(discounted, reserve_balance, non_reserve, debt_value)?;
  let price = redeem_token_price(supply_before, nav)?;
  let proceeds_gross = redemption_value(price, share_amount)?;
  require!(proceeds_gross > 0, FundError::AmountTooSmall);

  // Fee stays in the vault and moves onto the withdrawable ledger
  let (proceeds_net, fee) = apply_fee(proceeds_gross, fund_state.fee_divisor)?;
  require!(proceeds_net >= min_capital_out, FundError::SlippageExceeded);

  // Payout plus the fee must be free capital, never fee-ledger backing
  assert_redemption_liquidity(capital_balance, capital_fees_before, proceeds_gross)?;

  msg!("Shares in: {}", share_amount);
  msg!("NAV: {}", nav);
  msg!("Capital out: {} (fee {})", proceeds_net, fee);

  // Commit state before the CPIs
  let new_supply;
  {
    let fund_state = &mut ctx.accounts.fund_state;
    new_supply = fund_state
      .total_supply
      .checked_sub(share_amount)
      .ok_or(FundError::MathOverflow)?;
    fund_state.total_supply = new_supply;
    fund_state.accrue_capital_fee(fee)?;
  }

  // Burn with the user's own authority
  let burn_shares = Burn {
    mint: ctx.accounts.share_mint.to_account_info(),
    from: ctx.accounts.user_share_account.to_account_info(),
    authority: ctx.accounts.user.to_account_info(),
  };
  token_interface::burn(
    CpiContext::new(ctx.accounts.token_program.to_account_info(), burn_shares),
    share_amount,
  )?;

  // Pay out of the capital vault
  let vault_seeds = &[VAULT_AUTHORITY_SEED, &[ctx.bumps.vault_authority]];
  let signer: &[&[&[u8]]] = &[&vault_seeds[..]];

  let transfer_out = TransferChecked {
    from: ctx.accounts.capital_vault.to_account_info(),
    mint: ctx.accounts.capital_mint.to_account_info(),
    to: ctx.accounts.user_capital_account.to_account_info(),
    authority: ctx.accounts.vault_authority.to_account_info(),
  };
  token_interface::transfer_checked(
    CpiContext::new_with_signer(
      ctx.accounts.token_program.to_account_info(),
      transfer_out,
      signer,
    ),
    proceeds_net,
    ctx.accounts.capital_mint.decimals,
  )?;

  ctx.accounts.share_mint.reload()?;
  ctx.accounts.capital_vault.reload()?;

  assert_supply_reconciled(new_supply, ctx.accounts.share_mint.supply)?;
  assert_fees_backed(
    ctx.accounts.fund_state.withdrawable_capital_fees,
    ctx.accounts.capital_vault.amount,
  )?;

  emit!(SharesBurned {
    user: ctx.accounts.user.key(),
    shares_burned: share_amount,
    capital_out: proceeds_net,
    fee,
    nav,
    total_supply: new_supply,
    timestamp: ctx.accounts.clock.unix_timestamp,
  });

  let fund_state = &mut ctx.accounts.fund_state;
  fund_state.release_lock();

  Ok(())
}

#[derive(Accounts)]
pub struct BurnShares<'info> {
  #[account(mut)]
  pub user: Signer<'info>,

  #[account(
    mut,
    seeds = [FUND_STATE_SEED],
    bump,
    has_one = share_mint,
    has_one = capital_mint,
    constraint = fund_state.to_account_info().owner == &crate::ID @ FundError::InvalidAccountOwner,
  )]
  pub fund_state: Box<Account<'info, FundState>>,

  #[account(
    mut,
    constraint = share_mint.mint_authority == anchor_lang::solana_program::program_option::COption::Some(fund_state.key()) @ FundError::InvalidMintAuthority,
  )]
  pub share_mint: Box<InterfaceAccount<'info, Mint>>,

  pub capital_mint: Box<InterfaceAccount<'info, Mint>>,

  #[account(
    mut,
    token::mint = share_mint,
    token::authority = user,
  )]
  pub user_share_account: Box<InterfaceAccount<'info, TokenAccount>>,

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
  pub reserve_feed: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring in the oracle adapter
  pub capital_feed: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring in the oracle adapter
  pub synth_feed: UncheckedAccount<'info>,

  /// CHECK: validated against fund_state wiring in the registry adapter
  pub registry_position: UncheckedAccount<'info>,

  pub token_program: Interface<'info, TokenInterface>,

  pub clock: Sysvar<'info, Clock>,
}
