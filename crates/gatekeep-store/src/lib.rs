//! Durable credential storage for gatekeep.
//!
//! [`CredentialStore`] keeps exactly one secret per [`Identity`]:
//!
//! - loaded once at startup ([`CredentialStore::load`]), a missing or
//!   unreadable file means an empty store;
//! - written once per identity ([`CredentialStore::set`]), flushed to
//!   disk before returning;
//! - checked with [`CredentialStore::verify`].
//!
//! The on-disk format is a `.properties` file with one
//! `identity=secret` line per account.
//!
//! [`Identity`]: gatekeep_protocol::Identity

mod error;
mod properties;
mod store;

pub use error::StoreError;
pub use store::CredentialStore;
