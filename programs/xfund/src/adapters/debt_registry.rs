//! Debt-issuance registry adapter
//! Reads the fund's outstanding synth debt and the protocol issuance ratio
//! from the external registry, and drives issue/burn CPIs against it.
//!
//! The registry accounts are foreign wire formats, parsed at fixed offsets
//! behind an owner check. The issuance ratio lives in one of two registry
//! objects (the legacy state object or the newer system-settings object);
//! which one is read is selected by the fund's ratio-source flag, and both
//! must agree numerically at any given protocol state.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::invoke_signed;

use crate::constants::{REGISTRY_BURN_IX, REGISTRY_ISSUE_IX};
use crate::error::FundError;
use crate::state::RatioSource;

// Foreign account layouts: [8-byte discriminator | payload]
const DISC_LEN: usize = 8;
const POSITION_HOLDER_OFFSET: usize = DISC_LEN;
const POSITION_DEBT_OFFSET: usize = DISC_LEN + 32;
const RATIO_OFFSET: usize = DISC_LEN;

fn read_u64_le(data: &[u8], offset: usize) -> Result<u64> {
  let end = offset
    .checked_add(8)
    .ok_or(FundError::InvalidRegistryAccount)?;
  let bytes: [u8; 8] = data
    .get(offset..end)
    .ok_or(FundError::InvalidRegistryAccount)?
    .try_into()
    .map_err(|_| FundError::InvalidRegistryAccount)?;
  Ok(u64::from_le_bytes(bytes))
}

fn read_u128_le(data: &[u8], offset: usize) -> Result<u128> {
  let end = offset
    .checked_add(16)
    .ok_or(FundError::InvalidRegistryAccount)?;
  let bytes: [u8; 16] = data
    .get(offset..end)
    .ok_or(FundError::InvalidRegistryAccount)?
    .try_into()
    .map_err(|_| FundError::InvalidRegistryAccount)?;
  Ok(u128::from_le_bytes(bytes))
}

fn assert_registry_account(
  account: &AccountInfo,
  expected_key: &Pubkey,
  registry_program: &Pubkey,
) -> Result<()> {
  require_keys_eq!(*account.key, *expected_key, FundError::InvalidRegistryAccount);
  require_keys_eq!(*account.owner, *registry_program, FundError::InvalidAccountOwner);
  Ok(())
}

/// Outstanding synth debt of the fund's registry position.
pub fn current_debt(
  position: &AccountInfo,
  expected_position: &Pubkey,
  registry_program: &Pubkey,
  holder: &Pubkey,
) -> Result<u64> {
  assert_registry_account(position, expected_position, registry_program)?;

  let data = position.try_borrow_data()?;
  let position_holder = Pubkey::try_from(
    data
      .get(POSITION_HOLDER_OFFSET..POSITION_HOLDER_OFFSET + 32)
      .ok_or(FundError::InvalidRegistryAccount)?,
  )
  .map_err(|_| FundError::InvalidRegistryAccount)?;
  require_keys_eq!(position_holder, *holder, FundError::InvalidRegistryAccount);

  read_u64_le(&data, POSITION_DEBT_OFFSET)
}

/// WAD-scaled issuance ratio from the selected source object.
pub fn issuance_ratio<'info>(
  source: RatioSource,
  legacy_state: &AccountInfo<'info>,
  system_settings: &AccountInfo<'info>,
  expected_legacy: &Pubkey,
  expected_settings: &Pubkey,
  registry_program: &Pubkey,
) -> Result<u128> {
  let account = match source {
    RatioSource::LegacyState => {
      assert_registry_account(legacy_state, expected_legacy, registry_program)?;
      legacy_state
    }
    RatioSource::SystemSettings => {
      assert_registry_account(system_settings, expected_settings, registry_program)?;
      system_settings
    }
  };

  let data = account.try_borrow_data()?;
  let ratio = read_u128_le(&data, RATIO_OFFSET)?;
  require!(ratio > 0, FundError::InvalidRegistryAccount);
  Ok(ratio)
}

/// Resize the debt position by `amount` synth base units.
///
/// The registry program is not linked; the CPI is built manually from the
/// caller-forwarded registry accounts, with the fund authority PDA signing.
/// Issued synth lands in the fund's synth vault; burns pull from it.
pub fn adjust_debt<'info>(
  registry_program: &AccountInfo<'info>,
  expected_program: &Pubkey,
  registry_accounts: &[AccountInfo<'info>],
  fund_authority: &Pubkey,
  issue: bool,
  amount: u64,
  signer_seeds: &[&[&[u8]]],
) -> Result<()> {
  require_keys_eq!(*registry_program.key, *expected_program, FundError::InvalidAccountOwner);
  require!(!registry_accounts.is_empty(), FundError::InvalidRegistryAccount);

  let disc = if issue { REGISTRY_ISSUE_IX } else { REGISTRY_BURN_IX };
  let mut data = Vec::with_capacity(16);
  data.extend_from_slice(&disc);
  data.extend_from_slice(&amount.to_le_bytes());

  // The fund authority PDA signs via invoke_signed; its meta must be
  // marked as a signer for the privilege to extend into the CPI.
  let account_metas: Vec<AccountMeta> = registry_accounts
    .iter()
    .map(|acc| {
      let is_signer = acc.is_signer || acc.key == fund_authority;
      if acc.is_writable {
        AccountMeta::new(*acc.key, is_signer)
      } else {
        AccountMeta::new_readonly(*acc.key, is_signer)
      }
    })
    .collect();

  let ix = Instruction {
    program_id: *registry_program.key,
    accounts: account_metas,
    data,
  };

  invoke_signed(&ix, registry_accounts, signer_seeds).map_err(|e| {
    msg!("registry CPI failed: {:?}", e);
    FundError::RegistryCpiFailed
  })?;

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  const RATIO: u128 = 125_000_000_000_000_000; // 0.125 = 800% c-ratio

  struct RegistryFixture {
    key: Pubkey,
    owner: Pubkey,
    lamports: u64,
    data: Vec<u8>,
  }

  impl RegistryFixture {
    fn ratio_object(owner: Pubkey, ratio: u128) -> Self {
      let mut data = vec![0u8; RATIO_OFFSET + 16];
      data[RATIO_OFFSET..RATIO_OFFSET + 16].copy_from_slice(&ratio.to_le_bytes());
      Self { key: Pubkey::new_unique(), owner, lamports: 0, data }
    }

    fn position_object(owner: Pubkey, holder: Pubkey, debt: u64) -> Self {
      let mut data = vec![0u8; POSITION_DEBT_OFFSET + 8];
      data[POSITION_HOLDER_OFFSET..POSITION_HOLDER_OFFSET + 32]
        .copy_from_slice(holder.as_ref());
      data[POSITION_DEBT_OFFSET..POSITION_DEBT_OFFSET + 8]
        .copy_from_slice(&debt.to_le_bytes());
      Self { key: Pubkey::new_unique(), owner, lamports: 0, data }
    }

    fn to_info(&mut self) -> AccountInfo<'_> {
      AccountInfo::new(
        &self.key,
        false,
        false,
        &mut self.lamports,
        &mut self.data,
        &self.owner,
        false,
        0,
      )
    }
  }

  #[test]
  fn test_both_ratio_sources_agree() {
    let registry_program = Pubkey::new_unique();
    let mut legacy = RegistryFixture::ratio_object(registry_program, RATIO);
    let mut settings = RegistryFixture::ratio_object(registry_program, RATIO);
    let legacy_key = legacy.key;
    let settings_key = settings.key;

    let legacy_info = legacy.to_info();
    let settings_info = settings.to_info();

    let from_legacy = issuance_ratio(
      RatioSource::LegacyState,
      &legacy_info,
      &settings_info,
      &legacy_key,
      &settings_key,
      &registry_program,
    )
    .unwrap();
    let from_settings = issuance_ratio(
      RatioSource::SystemSettings,
      &legacy_info,
      &settings_info,
      &legacy_key,
      &settings_key,
      &registry_program,
    )
    .unwrap();

    assert_eq!(from_legacy, RATIO);
    assert_eq!(from_legacy, from_settings);
  }

  #[test]
  fn test_zero_ratio_rejected() {
    let registry_program = Pubkey::new_unique();
    let mut legacy = RegistryFixture::ratio_object(registry_program, 0);
    let mut settings = RegistryFixture::ratio_object(registry_program, RATIO);
    let legacy_key = legacy.key;
    let settings_key = settings.key;

    let legacy_info = legacy.to_info();
    let settings_info = settings.to_info();

    assert!(issuance_ratio(
      RatioSource::LegacyState,
      &legacy_info,
      &settings_info,
      &legacy_key,
      &settings_key,
      &registry_program,
    )
    .is_err());
  }

  #[test]
  fn test_current_debt_reads_position() {
    let registry_program = Pubkey::new_unique();
    let holder = Pubkey::new_unique();
    let mut position = RegistryFixture::position_object(registry_program, holder, 1_234_567);
    let position_key = position.key;

    let info = position.to_info();
    let debt = current_debt(&info, &position_key, &registry_program, &holder).unwrap();
    assert_eq!(debt, 1_234_567);
  }

  #[test]
  fn test_current_debt_rejects_wrong_holder() {
    let registry_program = Pubkey::new_unique();
    let holder = Pubkey::new_unique();
    let mut position = RegistryFixture::position_object(registry_program, holder, 500);
    let position_key = position.key;

    let info = position.to_info();
    let other = Pubkey::new_unique();
    assert!(current_debt(&info, &position_key, &registry_program, &other).is_err());
  }

  #[test]
  fn test_wrong_owner_rejected() {
    let registry_program = Pubkey::new_unique();
    let imposter = Pubkey::new_unique();
    let holder = Pubkey::new_unique();
    let mut position = RegistryFixture::position_object(imposter, holder, 500);
    let position_key = position.key;

    let info = position.to_info();
    assert!(current_debt(&info, &position_key, &registry_program, &holder).is_err());
  }
}
