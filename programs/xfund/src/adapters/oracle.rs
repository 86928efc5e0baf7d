//! Price oracle adapter
//! Wraps the Pyth feeds the fund is wired to and normalizes their prices
//! to WAD-scaled USD values. Staleness is bounded by the configured
//! max_price_age_secs; a stale or non-positive price fails the call.

use anchor_lang::prelude::*;
use pyth_sdk_solana::state::SolanaPriceAccount;

use crate::constants::WAD;
use crate::error::FundError;

/// Scale a Pyth (price, expo) pair to WAD fixed point.
fn scale_to_wad(price: i64, expo: i32) -> Option<u128> {
  let p = u128::try_from(price).ok()?;

  if expo >= 0 {
    let m = 10u128.checked_pow(u32::try_from(expo).ok()?)?;
    p.checked_mul(m)?.checked_mul(WAD)
  } else {
    let d = 10u128.checked_pow(u32::try_from(-(expo as i64)).ok()?)?;
    p.checked_mul(WAD)?.checked_div(d)
  }
}

/// Read one configured feed and return its USD price in WAD.
///
/// The account must be the exact feed the fund state is wired to; a
/// different Pyth account fails even if it is a valid feed.
pub fn read_usd_price_wad(
  feed: &AccountInfo,
  expected_feed: &Pubkey,
  clock: &Clock,
  max_age_secs: u64,
) -> Result<u128> {
  require_keys_eq!(*feed.key, *expected_feed, FundError::InvalidOracleAccount);

  let price_feed = SolanaPriceAccount::account_info_to_feed(feed)
    .map_err(|_| FundError::InvalidOracleAccount)?;

  let price = price_feed
    .get_price_no_older_than(clock.unix_timestamp, max_age_secs)
    .ok_or(FundError::StalePrice)?;

  require!(price.price > 0, FundError::InvalidOracleAccount);

  scale_to_wad(price.price, price.expo).ok_or_else(|| FundError::MathOverflow.into())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_scale_to_wad_negative_expo() {
    // typical Pyth quote: 200 USD at expo -8
    let wad = scale_to_wad(200_0000_0000, -8).unwrap();
    assert_eq!(wad, 200 * WAD);
  }

  #[test]
  fn test_scale_to_wad_zero_and_positive_expo() {
    assert_eq!(scale_to_wad(7, 0).unwrap(), 7 * WAD);
    assert_eq!(scale_to_wad(7, 2).unwrap(), 700 * WAD);
  }

  #[test]
  fn test_scale_to_wad_rejects_negative_price() {
    assert_eq!(scale_to_wad(-1, -8), None);
  }
}
