mod fund_world;
mod setups;
mod steps;

pub use fund_world::{FundSystem, FundWorld};
