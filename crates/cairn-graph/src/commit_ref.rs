use std::fmt;

use serde::{Deserialize, Serialize};

use cairn_types::CommitId;

use crate::error::{GraphError, GraphResult};

/// A named, mutable pointer to a commit.
///
/// The pointer itself is a plain value; the only way to move the stored
/// pointer is the compare-and-swap write offered by the repository.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitRef {
    name: String,
    commit_id: CommitId,
}

impl CommitRef {
    pub fn new(name: impl Into<String>, commit_id: CommitId) -> GraphResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GraphError::BlankName { field: "ref name" });
        }
        Ok(Self { name, commit_id })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn commit_id(&self) -> CommitId {
        self.commit_id
    }
}

impl fmt::Display for CommitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.name, self.commit_id.hash().short_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_types::ContentHash;

    #[test]
    fn requires_a_name() {
        let id = CommitId::new(ContentHash::hash_str("c"));
        assert_eq!(
            CommitRef::new(" ", id),
            Err(GraphError::BlankName { field: "ref name" })
        );
        let r = CommitRef::new("main", id).unwrap();
        assert_eq!(r.name(), "main");
        assert_eq!(r.commit_id(), id);
        assert_eq!(r.to_string(), format!("main -> {}", id.hash().short_hex()));
    }
}
