//! Lock-free noun storage
//!
//! This crate stores nouns in a filesystem-like namespace without taking any
//! locks. Immutable collections are content-addressed and write-once;
//! mutable collections are replaced atomically by rename. Alongside them live
//! membership sets (restrictions, friends) and private per-user properties.
//!
//! # Layout
//!
//! ```text
//! immutable/thing/<tag>.<ext>
//! immutable/media/<tag>.<ext>
//! mutable/owner/<tag>.json
//! mutable/place/[!]<tag>.json
//! mutable/restriction/<place>/<user>
//! mutable/friend/<owner>/<user>
//! mutable/userProperties/<user>/<property>
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use bytes::Bytes;
//! use common::prelude::Sha256Identity;
//! use store::NounStore;
//!
//! # async fn example() -> store::Result<()> {
//! let store = NounStore::open("/tmp/nouns", Arc::new(Sha256Identity)).await?;
//! store
//!     .owners()
//!     .put("user", "json", Bytes::from_static(b"{}"), None, None)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod immutable;
mod key;
mod mutable;
pub mod namespace;
mod nouns;
mod properties;
mod sets;

pub use error::{Result, StoreError};
pub use immutable::{ImmutableCollection, PutOutcome};
pub use key::Key;
pub use mutable::MutableCollection;
pub use nouns::NounStore;
pub use properties::PrivatePropertyStore;
pub use sets::SetStore;
