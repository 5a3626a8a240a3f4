//! Cache eviction signalled through a reserved field of a mutation result.
//!
//! A mutation resolver returns its payload plus a `__evictions` list of
//! `[operationType, fieldName, keyArguments]` tuples. A response handler
//! ([`forwarder::Forwarder`]) removes the list and calls the cache's
//! eviction primitive once per entry. The rest of the crate is a small
//! in-process platform (table, response cache, HTTP endpoint) to run the
//! convention end to end.

pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod domain;
pub mod forwarder;
pub mod services;
pub mod store;
