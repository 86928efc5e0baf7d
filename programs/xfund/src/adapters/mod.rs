//! Adapters over the fund's external collaborators
//! The oracle, debt registry, exchange venues, fee pool and reward escrow
//! are independent programs; these modules wrap reads and manual CPIs
//! against them behind typed, validated entry points.

pub mod debt_registry;
pub mod oracle;
pub mod rewards;
pub mod swap;
