pub mod admin;
pub mod burn;
pub mod claim;
pub mod hedge;
pub mod initialize;
pub mod mint;
pub mod mint_with_reserve;
pub mod vest;
pub mod withdraw_fees;

pub use admin::*;
pub use burn::*;
pub use claim::*;
pub use hedge::*;
pub use initialize::*;
pub use mint::*;
pub use mint_with_reserve::*;
pub use vest::*;
pub use withdraw_fees::*;
