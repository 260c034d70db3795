/**
 * The four noun collections and how they are
 *  stored (write-once vs. atomically replaced).
 */
pub mod collection;
/**
 * JSON noun bodies, split into identity and
 *  non-identity data, with canonical serialization.
 */
pub mod envelope;
/**
 * Content digests and per-write tokens.
 *  Swappable behind a single trait.
 */
pub mod identity;
/**
 * What a write answers with.
 */
pub mod receipt;

pub mod prelude {
    pub use crate::collection::{Collection, Mutability, UnknownCollection};
    pub use crate::envelope::{Envelope, EnvelopeError};
    pub use crate::identity::{is_user_tag, IdentityProvider, Sha256Identity, USER_TAG_LEN};
    pub use crate::receipt::{now_millis, Receipt};
}
