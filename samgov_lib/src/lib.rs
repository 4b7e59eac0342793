//! Library layer for the SAM.gov opportunity client: quota-aware, cached
//! search, direct lookup and attachment discovery.
//!
//! Wraps the `samgov_api` transport crate with a shared quota guard,
//! bounded 5xx back-off, one-way endpoint-family fallback, an on-disk TTL
//! cache and record normalization.

pub mod attachments;
pub mod cache;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod lookup;
pub mod parser;
pub mod query;
pub mod quota;
pub mod record;
pub mod router;
pub mod search;
pub mod validation;

pub use samgov_api;
pub use samgov_api::ApiVersion;

pub use cache::{CacheEntry, ResponseCache};
pub use client::OpportunityClient;
pub use config::{ClientConfig, RetryPolicy};
pub use credentials::{CredentialResolver, DotenvSecrets, SecretsLookup, StaticSecrets, API_KEY_VAR};
pub use error::SearchError;
pub use lookup::classify_id;
pub use parser::OpportunityParser;
pub use query::{LookupId, OpportunitySearchQuery};
pub use quota::{QuotaGuard, QuotaState};
pub use record::{AttachmentReference, AttachmentSource, OpportunityRecord};
pub use router::EndpointRouter;
