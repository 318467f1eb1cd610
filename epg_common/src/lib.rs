mod amount;
pub mod helpers;
mod secret;

pub use amount::{decimal_places, Amount, AmountConversionError, MAX_DECIMAL_PLACES};
pub use secret::Secret;
