//! Provider adapters.
//!
//! Each adapter turns one upstream market-data API into normalized
//! [`KlineRecord`](crate::domain::KlineRecord) sequences through an
//! injectable [`HttpClient`](crate::http_client::HttpClient) transport.

mod eastmoney;
mod yahoo;

pub use eastmoney::EastmoneyProvider;
pub use yahoo::YahooProvider;
