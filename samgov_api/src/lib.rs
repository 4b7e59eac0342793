mod client;
mod endpoints;
mod errors;
mod query;
pub mod types;
pub use self::client::{Client, RawResponse, API_KEY_HEADER};
pub use self::endpoints::{ApiVersion, EndpointSet, DEFAULT_BASE_URL};
pub use self::errors::Error;
pub use self::query::{DateRange, DetailParams, Query, SearchParams, DATE_FORMAT};
pub use reqwest::header::HeaderMap;
