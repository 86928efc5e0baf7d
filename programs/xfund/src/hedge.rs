//! Hedge plan state machine
//! A hedge resizes the synth debt position and converts the resulting
//! settlement-asset delta across the primary router and the active stable
//! pool. The plan advances Idle -> Sizing -> Swapping -> Settled inside a
//! single instruction; transaction atomicity makes the whole operation
//! all-or-nothing.

use crate::error::FundError;
use anchor_lang::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HedgePhase {
  Idle,
  Sizing,
  Swapping,
  Settled,
}

/// One hedge operation in flight. Never persisted; a fresh plan starts at
/// Idle on every hedge call.
#[derive(Debug)]
pub struct HedgePlan {
  pub phase: HedgePhase,

  /// Positive = issue synth debt, negative = repay
  pub debt_adjustment: i64,

  /// Minimum-acceptable WAD rates for the router leg:
  /// [0] synth -> capital, [1] capital -> synth
  pub router_min_rates: [u128; 2],

  /// Minimum-acceptable WAD rates for the stable-pool leg, same layout
  pub pool_min_rates: [u128; 2],

  /// Capital (on repay) or synth (on issue) amount dedicated to the
  /// router leg; the remainder of an issue goes through the stable pool
  pub router_allocation: u64,

  /// Settlement asset produced by the sizing step
  pub synth_delta: u64,
}

impl HedgePlan {
  pub fn new(
    debt_adjustment: i64,
    router_min_rates: [u128; 2],
    pool_min_rates: [u128; 2],
    router_allocation: u64,
  ) -> Result<Self> {
    require!(debt_adjustment != 0, FundError::ZeroAmount);

    Ok(Self {
      phase: HedgePhase::Idle,
      debt_adjustment,
      router_min_rates,
      pool_min_rates,
      router_allocation,
      synth_delta: 0,
    })
  }

  pub fn is_issue(&self) -> bool {
    self.debt_adjustment > 0
  }

  /// Magnitude of the debt change in synth base units.
  pub fn debt_delta(&self) -> u64 {
    self.debt_adjustment.unsigned_abs()
  }

  /// Idle -> Sizing: the debt resize has been submitted.
  pub fn begin_sizing(&mut self) -> Result<()> {
    require!(self.phase == HedgePhase::Idle, FundError::InvalidHedgePhase);
    self.phase = HedgePhase::Sizing;
    Ok(())
  }

  /// Sizing -> Swapping: record the settlement asset produced and fix the
  /// split across venues.
  pub fn begin_swapping(&mut self, synth_delta: u64) -> Result<()> {
    require!(self.phase == HedgePhase::Sizing, FundError::InvalidHedgePhase);

    if self.is_issue() {
      require!(
        self.router_allocation <= synth_delta,
        FundError::InvalidAllocation
      );
    }

    self.synth_delta = synth_delta;
    self.phase = HedgePhase::Swapping;
    Ok(())
  }

  /// Router and pool leg sizes for an issue hedge. The router receives the
  /// explicit allocation; the stable pool takes the remainder.
  pub fn issue_legs(&self) -> Result<(u64, u64)> {
    require!(self.phase == HedgePhase::Swapping, FundError::InvalidHedgePhase);

    let router_leg = self.router_allocation;
    let pool_leg = self
      .synth_delta
      .checked_sub(router_leg)
      .ok_or(FundError::InvalidAllocation)?;

    Ok((router_leg, pool_leg))
  }

  /// Swapping -> Settled. Terminal.
  pub fn settle(&mut self) -> Result<()> {
    require!(self.phase == HedgePhase::Swapping, FundError::InvalidHedgePhase);
    self.phase = HedgePhase::Settled;
    Ok(())
  }
}

/// Venue attribution for a repay-side acquisition: the whole acquired
/// amount belongs to whichever venue executed it, as (router, pool).
pub fn repay_legs(synth_acquired: u64, via_pool: bool) -> (u64, u64) {
  if via_pool {
    (0, synth_acquired)
  } else {
    (synth_acquired, 0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn plan(adjustment: i64, allocation: u64) -> HedgePlan {
    HedgePlan::new(adjustment, [0, 0], [0, 0], allocation).unwrap()
  }

  #[test]
  fn test_phases_advance_in_order() {
    let mut p = plan(1_000, 400);
    assert_eq!(p.phase, HedgePhase::Idle);

    p.begin_sizing().unwrap();
    assert_eq!(p.phase, HedgePhase::Sizing);

    p.begin_swapping(1_000).unwrap();
    assert_eq!(p.phase, HedgePhase::Swapping);

    p.settle().unwrap();
    assert_eq!(p.phase, HedgePhase::Settled);
  }

  #[test]
  fn test_out_of_order_transitions_rejected() {
    let mut p = plan(1_000, 0);
    assert!(p.begin_swapping(1_000).is_err());
    assert!(p.settle().is_err());

    p.begin_sizing().unwrap();
    assert!(p.begin_sizing().is_err());
    assert!(p.settle().is_err());

    p.begin_swapping(1_000).unwrap();
    p.settle().unwrap();
    // terminal: nothing advances out of Settled
    assert!(p.begin_sizing().is_err());
    assert!(p.begin_swapping(0).is_err());
    assert!(p.settle().is_err());
  }

  #[test]
  fn test_zero_adjustment_rejected() {
    assert!(HedgePlan::new(0, [0, 0], [0, 0], 0).is_err());
  }

  #[test]
  fn test_issue_legs_split_by_allocation() {
    let mut p = plan(1_000, 400);
    p.begin_sizing().unwrap();
    p.begin_swapping(1_000).unwrap();

    let (router_leg, pool_leg) = p.issue_legs().unwrap();
    assert_eq!(router_leg, 400);
    assert_eq!(pool_leg, 600);
  }

  #[test]
  fn test_allocation_larger_than_proceeds_rejected() {
    let mut p = plan(1_000, 1_500);
    p.begin_sizing().unwrap();
    assert!(p.begin_swapping(1_000).is_err());
  }

  #[test]
  fn test_repay_legs_attribute_the_executing_venue() {
    assert_eq!(repay_legs(750, false), (750, 0));
    assert_eq!(repay_legs(750, true), (0, 750));
    assert_eq!(repay_legs(0, true), (0, 0));
  }

  #[test]
  fn test_repay_plan_signs() {
    let p = plan(-750, 0);
    assert!(!p.is_issue());
    assert_eq!(p.debt_delta(), 750);

    let p = plan(750, 0);
    assert!(p.is_issue());
    assert_eq!(p.debt_delta(), 750);
  }
}
