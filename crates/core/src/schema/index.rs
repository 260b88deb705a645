//! Index definitions.

use serde::{Deserialize, Serialize};

/// What an index is keyed on, by attribute position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexKind {
    /// A single attribute; the key is its value.
    Attribute(usize),
    /// A string attribute followed by an integer attribute.
    Composite { text: usize, number: usize },
}

/// A named index declared by a schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDef {
    name: String,
    kind: IndexKind,
}

impl IndexDef {
    pub(crate) fn new(name: impl Into<String>, kind: IndexKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> IndexKind {
        self.kind
    }

    /// Returns the attribute positions the key is built from.
    pub fn positions(&self) -> Vec<usize> {
        match self.kind {
            IndexKind::Attribute(pos) => vec![pos],
            IndexKind::Composite { text, number } => vec![text, number],
        }
    }

    /// Returns true if the key depends on the attribute at `pos`.
    pub fn covers(&self, pos: usize) -> bool {
        match self.kind {
            IndexKind::Attribute(p) => p == pos,
            IndexKind::Composite { text, number } => text == pos || number == pos,
        }
    }
}
