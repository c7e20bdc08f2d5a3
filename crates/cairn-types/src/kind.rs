use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The kind of entity a [`TreeRef`](crate::TreeRef) points at.
///
/// The discriminants are the wire tags used by every codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum NodeKind {
    Blob = 1,
    Map = 2,
    List = 3,
    Set = 4,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [Self::Blob, Self::Map, Self::List, Self::Set];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Blob => "Blob",
            Self::Map => "Map",
            Self::List => "List",
            Self::Set => "Set",
        }
    }
}

impl TryFrom<u8> for NodeKind {
    type Error = TypeError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(Self::Blob),
            2 => Ok(Self::Map),
            3 => Ok(Self::List),
            4 => Ok(Self::Set),
            other => Err(TypeError::InvalidKind(other)),
        }
    }
}

impl From<NodeKind> for u8 {
    fn from(kind: NodeKind) -> Self {
        kind.tag()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
