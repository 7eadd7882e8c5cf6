//! Player attributes from the market-valuation profile page.

pub mod market_value;
pub mod parser;

pub use market_value::parse_market_value;
pub use parser::{is_profile_url, parse_profile, resolve_profile_url};
