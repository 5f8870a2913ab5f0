use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffKind {
    Create,
    Update,
    Delete,
}

impl DiffKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            DiffKind::Create => "+",
            DiffKind::Update => "~",
            DiffKind::Delete => "-",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            DiffKind::Create => "✨",
            DiffKind::Update => "🔄",
            DiffKind::Delete => "🗑️",
        }
    }

    /// Past tense, as shown for applied changes.
    pub fn done(&self) -> &'static str {
        match self {
            DiffKind::Create => "Created",
            DiffKind::Update => "Updated",
            DiffKind::Delete => "Deleted",
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            DiffKind::Create => "create",
            DiffKind::Update => "update",
            DiffKind::Delete => "delete",
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
