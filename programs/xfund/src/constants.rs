//! Protocol-wide constants
//! Centralized location for all configuration values

// PRECISION CONSTANTS
pub const WAD: u128 = 1_000_000_000_000_000_000; // 1e18 fixed point for all valuation math
pub const PERCENT: u128 = 100;

// Redemption rate discount applied to the oracle rate so redeemers are not
// paid above achievable execution price (99/100)
pub const REDEMPTION_SLIPPAGE_NUMERATOR: u128 = 99;

// MINIMUM AMOUNTS
pub const MIN_CAPITAL_DEPOSIT: u64 = 10_000;    // dust floor on mint contributions
pub const MIN_SHARE_BURN: u64 = 1_000;          // dust floor on redemptions

// FEE CONFIGURATION
// fee = amount / fee_divisor (floor). Smaller divisor = larger fee.
// 286 ~= 0.35%, the divisor the fund launches with.
pub const DEFAULT_FEE_DIVISOR: u64 = 286;

// Stable pool slots are token indices inside the pool; 4-token pools are the
// largest the governor accepts.
pub const MAX_POOL_SLOT: u8 = 3;

// VENUE INSTRUCTION DISCRIMINATORS
// 8-byte Anchor discriminators of the external venue instructions, taken
// from the venues' published IDLs. The venue programs themselves are not
// linked; CPIs are built manually.
pub const ROUTER_SWAP_IX: [u8; 8] = [0xf8, 0xc6, 0x9e, 0x91, 0xe1, 0x75, 0x87, 0xc8];
pub const POOL_EXCHANGE_IX: [u8; 8] = [0x2b, 0x04, 0xed, 0x0b, 0x1a, 0xc9, 0x1e, 0x62];
pub const REGISTRY_ISSUE_IX: [u8; 8] = [0x81, 0xbe, 0x48, 0x2f, 0x27, 0xa3, 0x1e, 0x47];
pub const REGISTRY_BURN_IX: [u8; 8] = [0x74, 0x17, 0x34, 0x7b, 0x9a, 0x5c, 0xd2, 0x1f];
pub const FEE_POOL_CLAIM_IX: [u8; 8] = [0x3e, 0xc6, 0xd6, 0xc1, 0xd5, 0x9f, 0x6c, 0xd2];
pub const ESCROW_VEST_IX: [u8; 8] = [0x4d, 0x56, 0xf6, 0x3a, 0x9b, 0x26, 0xc8, 0x8f];
