//! Retrieval of paginated JSON from the IFRC GO API.
//!
//! The provider returns `{"results": [...], "next": <url|null>}` envelopes.
//! [`fetch_all`] follows the `next` chain and hands each record to a
//! [`RecordSink`]; the [`Retriever`] trait separates that walk from the
//! transport so saved page sets can be replayed.

#![deny(unsafe_code)]

pub mod error;
pub mod paginate;
pub mod retriever;

pub use error::{FetchError, Result};
pub use paginate::{FetchStats, Page, RecordSink, fetch_all};
pub use retriever::{HttpRetriever, MemoryRetriever, RetrieveMode, Retriever, read_json_file};
