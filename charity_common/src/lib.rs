mod amount;
mod helpers;

pub mod op;

pub use amount::{Amount, AmountConversionError};
pub use helpers::parse_boolean_flag;
