//! Kind-tagged wrappers around [`ContentHash`].
//!
//! Each wrapper carries no state beyond the hash; the type itself records
//! which kind of entity the hash identifies so that, for example, a commit id
//! cannot be passed where a map id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hash::ContentHash;

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(ContentHash);

        impl $name {
            pub const EMPTY: Self = Self(ContentHash::EMPTY);

            pub const fn new(hash: ContentHash) -> Self {
                Self(hash)
            }

            pub fn hash(&self) -> ContentHash {
                self.0
            }
        }

        impl From<ContentHash> for $name {
            fn from(hash: ContentHash) -> Self {
                Self(hash)
            }
        }

        impl From<$name> for ContentHash {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0.short_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

typed_id!(
    /// Identity of an opaque byte payload.
    BlobId
);
typed_id!(
    /// Identity of a serialized `TreeMap`.
    MapId
);
typed_id!(
    /// Identity of a serialized `TreeList`.
    ListId
);
typed_id!(
    /// Identity of a serialized `TreeSet`.
    SetId
);
typed_id!(
    /// Identity of a serialized commit.
    CommitId
);

impl BlobId {
    /// Identity of `data` stored as a blob.
    pub fn of(data: &[u8]) -> Self {
        Self(ContentHash::hash(data))
    }
}
