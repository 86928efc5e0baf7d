use anchor_lang::prelude::*;

#[event]
pub struct FundInitialized {
  pub authority: Pubkey,
  pub share_mint: Pubkey,
  pub capital_mint: Pubkey,
  pub reserve_mint: Pubkey,
  pub synth_mint: Pubkey,
  pub fee_divisor: u64,
  pub timestamp: i64,
}

#[event]
pub struct SharesMinted {
  pub user: Pubkey,
  pub capital_in: u64,
  pub fee: u64,
  pub reserve_acquired: u64,
  pub shares_minted: u64,
  pub nav: u128,
  pub total_supply: u64,
  pub timestamp: i64,
}

#[event]
pub struct SharesMintedWithReserve {
  pub user: Pubkey,
  pub reserve_in: u64,
  pub fee_shares: u64,
  pub shares_minted: u64,
  pub nav: u128,
  pub total_supply: u64,
  pub timestamp: i64,
}

#[event]
pub struct SharesBurned {
  pub user: Pubkey,
  pub shares_burned: u64,
  pub capital_out: u64,
  pub fee: u64,
  pub nav: u128,
  pub total_supply: u64,
  pub timestamp: i64,
}

#[event]
pub struct FeesClaimed {
  pub synth_claimed: u64,
  pub synth_fee_accrued: u64,
  pub capital_received: u64,
  pub synth_burned_for_ratio: u64,
  pub rewards_claimed: bool,
  pub reserve_vested: u64,
  pub timestamp: i64,
}

#[event]
pub struct Hedged {
  pub caller: Pubkey,
  pub debt_adjustment: i64,
  pub synth_delta: u64,
  pub router_leg: u64,
  pub pool_leg: u64,
  pub timestamp: i64,
}

#[event]
pub struct FeesWithdrawn {
  pub authority: Pubkey,
  pub capital_fees: u64,
  pub synth_fees: u64,
  pub timestamp: i64,
}

#[event]
pub struct RewardsVested {
  pub reserve_received: u64,
  pub timestamp: i64,
}

#[event]
pub struct PoolProposed {
  pub authority: Pubkey,
  pub pool: Pubkey,
  pub slots: [u8; 2],
  pub activated_directly: bool,
  pub timestamp: i64,
}

#[event]
pub struct PoolConfirmed {
  pub validator: Pubkey,
  pub pool: Pubkey,
  pub slots: [u8; 2],
  pub timestamp: i64,
}

#[event]
pub struct RatioSourceToggled {
  pub authority: Pubkey,
  pub from_system_settings: bool,
  pub timestamp: i64,
}

#[event]
pub struct ParametersUpdated {
  pub authority: Pubkey,
  pub old_fee_divisor: u64,
  pub new_fee_divisor: u64,
  pub timestamp: i64,
}

#[event]
pub struct RolesUpdated {
  pub authority: Pubkey,
  pub manager: Pubkey,
  pub address_validator: Pubkey,
  pub timestamp: i64,
}

#[event]
pub struct EmergencyPause {
  pub authority: Pubkey,
  pub paused: bool,
  pub timestamp: i64,
}
