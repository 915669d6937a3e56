pub mod bidding_engine;
pub mod ui;

pub use self::{bidding_engine::*, ui::*};
