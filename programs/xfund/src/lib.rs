use anchor_lang::prelude::*;

pub mod adapters;
pub mod collateral;
pub mod constants;
pub mod error;
pub mod events;
pub mod hedge;
pub mod instructions;
pub mod invariants;
pub mod state;
pub mod valuation;

use instructions::*;

declare_id!("6WYZJNKsyrUkMjNDp6vFd7o2ATGgXc3DfjZTEaY6tTxp");

#[program]
pub mod xfund {
  use super::*;

  pub fn initialize(ctx: Context<Initialize>, params: InitializeParams) -> Result<()> {
    instructions::initialize::handler(ctx, params)
  }

  /// Mint fund shares against a capital contribution; the net amount is
  /// swapped to reserve through the router
  pub fn mint_shares<'info>(
    ctx: Context<'_, '_, '_, 'info, MintShares<'info>>,
    capital_amount: u64,
    min_reserve_out: u64,
  ) -> Result<()> {
    instructions::mint::handler(ctx, capital_amount, min_reserve_out)
  }

  /// Mint fund shares against a direct reserve contribution, valued at the
  /// oracle cross rate
  pub fn mint_shares_with_reserve(
    ctx: Context<MintSharesWithReserve>,
    reserve_amount: u64,
    min_shares_out: u64,
  ) -> Result<()> {
    instructions::mint_with_reserve::handler(ctx, reserve_amount, min_shares_out)
  }

  /// Redeem fund shares for capital at the slippage-discounted NAV
  pub fn burn_shares(
    ctx: Context<BurnShares>,
    share_amount: u64,
    min_capital_out: u64,
  ) -> Result<()> {
    instructions::burn::handler(ctx, share_amount, min_capital_out)
  }

  /// Repair the collateralization ratio, claim accrued synth fees, vest
  /// rewards and convert the proceeds
  #[allow(clippy::too_many_arguments)]
  pub fn claim_fees<'info>(
    ctx: Context<'_, '_, '_, 'info, ClaimFees<'info>>,
    synth_burn_hint: u64,
    router_min_rates: [u128; 2],
    pool_min_rates: [u128; 2],
    claim_rewards: bool,
    registry_accounts_len: u8,
    fee_pool_accounts_len: u8,
    escrow_accounts_len: u8,
  ) -> Result<()> {
    instructions::claim::handler(
      ctx,
      synth_burn_hint,
      router_min_rates,
      pool_min_rates,
      claim_rewards,
      registry_accounts_len,
      fee_pool_accounts_len,
      escrow_accounts_len,
    )
  }

  /// Resize the synth debt position and rebalance the proceeds across the
  /// router and the active pool
  #[allow(clippy::too_many_arguments)]
  pub fn hedge<'info>(
    ctx: Context<'_, '_, '_, 'info, Hedge<'info>>,
    debt_adjustment: i64,
    router_min_rates: [u128; 2],
    pool_min_rates: [u128; 2],
    router_allocation: u64,
    registry_accounts_len: u8,
    router_accounts_len: u8,
  ) -> Result<()> {
    instructions::hedge::handler(
      ctx,
      debt_adjustment,
      router_min_rates,
      pool_min_rates,
      router_allocation,
      registry_accounts_len,
      router_accounts_len,
    )
  }

  /// Vest matured reserve from the reward escrow; callable by anyone
  pub fn vest_rewards<'info>(ctx: Context<'_, '_, '_, 'info, VestRewards<'info>>) -> Result<()> {
    instructions::vest::handler(ctx)
  }

  /// Drain the fee ledger to the administrator
  pub fn withdraw_fees(ctx: Context<WithdrawFees>) -> Result<()> {
    instructions::withdraw_fees::handler(ctx)
  }

  pub fn set_fee_divisor(ctx: Context<AdminOnly>, new_divisor: u64) -> Result<()> {
    instructions::admin::set_fee_divisor(ctx, new_divisor)
  }

  pub fn set_manager(ctx: Context<AdminOnly>, manager: Pubkey) -> Result<()> {
    instructions::admin::set_manager(ctx, manager)
  }

  pub fn set_address_validator(
    ctx: Context<AdminOnly>,
    address_validator: Pubkey,
  ) -> Result<()> {
    instructions::admin::set_address_validator(ctx, address_validator)
  }

  pub fn set_paused(ctx: Context<AdminOnly>, paused: bool) -> Result<()> {
    instructions::admin::set_paused(ctx, paused)
  }

  pub fn toggle_ratio_source(ctx: Context<AdminOnly>) -> Result<()> {
    instructions::admin::toggle_ratio_source(ctx)
  }

  /// Owner step of the two-party pool rotation
  pub fn propose_pool(ctx: Context<AdminOnly>, pool: Pubkey, slots: [u8; 2]) -> Result<()> {
    instructions::admin::propose_pool(ctx, pool, slots)
  }

  /// Validator step of the two-party pool rotation
  pub fn confirm_pool(ctx: Context<ValidatorOnly>, pool: Pubkey) -> Result<()> {
    instructions::admin::confirm_pool(ctx, pool)
  }
}
