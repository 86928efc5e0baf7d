use anchor_lang::prelude::*;

#[error_code]
#[derive(PartialEq,Eq)]
pub enum FundError {
  #[msg("Caller lacks the role required for this operation")]
  Unauthorized,

  #[msg("Minting is currently paused by the fund administrator")]
  MintPaused,

  #[msg("Amount must be greater than zero")]
  ZeroAmount,

  #[msg("Amount too small - below minimum dust threshold")]
  AmountTooSmall,

  #[msg("Math overflow occurred - values exceeded fixed-point bounds")]
  MathOverflow,

  #[msg("Net asset value is negative - debt exceeds asset value, fund is insolvent")]
  NegativeNav,

  #[msg("Cannot price shares when total supply is zero outside the seed branch")]
  ZeroSupply,

  #[msg("Fee divisor must be at least 1")]
  InvalidFeeDivisor,

  #[msg("Insufficient share balance to burn - check your balance")]
  InsufficientBalance,

  #[msg("Capital vault cannot cover this redemption without touching accrued fees")]
  InsufficientLiquidity,

  #[msg("Slippage tolerance exceeded - actual output is below your minimum")]
  SlippageExceeded,

  #[msg("Reentrancy detected - operation blocked")]
  Reentrancy,

  #[msg("No pending pool address to confirm")]
  NoPendingPool,

  #[msg("Confirmed address does not match the pending pool address")]
  PendingPoolMismatch,

  #[msg("Pool slot index out of range for the stable pool")]
  InvalidPoolSlots,

  #[msg("No active stable pool configured for this leg")]
  NoActivePool,

  #[msg("Invalid parameter value provided")]
  InvalidParameter,

  #[msg("Oracle price is stale or unavailable")]
  StalePrice,

  #[msg("Oracle account is not the configured price feed")]
  InvalidOracleAccount,

  #[msg("Debt registry account failed validation")]
  InvalidRegistryAccount,

  #[msg("Swap CPI to external venue failed")]
  SwapCpiFailed,

  #[msg("Claim CPI to fee pool or reward escrow failed")]
  ClaimCpiFailed,

  #[msg("Debt registry CPI failed")]
  RegistryCpiFailed,

  #[msg("Invalid account owner - account is not owned by the expected program")]
  InvalidAccountOwner,

  #[msg("Invalid mint authority - share mint must be controlled by the fund state PDA")]
  InvalidMintAuthority,

  #[msg("Share supply bookkeeping diverged from the mint supply")]
  BalanceSheetViolation,

  #[msg("Invalid CPI context - instruction must be called directly, not via CPI")]
  InvalidCPIContext,

  #[msg("Hedge plan transition requested out of order")]
  InvalidHedgePhase,

  #[msg("Router allocation exceeds the settlement amount being swapped")]
  InvalidAllocation,
}
