//! Nested package-dependency records as reported by tools like `pipdeptree`.
//!
//! # Shapes
//!
//! A forest is a JSON array of records. Every record may carry any of:
//!
//! ```text
//! { "package": { "key": "requests", ... },      wrapped record (pipdeptree --json)
//!   "key": "requests", "package_name": ...,     the node's own fields
//!   "dependencies": [ ... ] | null }            children, nested arbitrarily deep
//! ```
//!
//! Leaf dependencies are usually bare (`{"key": "idna", ...}`), roots usually
//! wrapped, and `--json-tree` output nests both. A missing or `null`
//! dependency list means no children.
//!
//! Keys are optional at the serde layer. A record without a usable key still
//! deserializes, and key resolution fails later in [`crate::extract`] with the
//! node's position attached.
//!
//! Parsing, dropping, and extracting do not recurse on the call stack, so
//! report depth is bounded by memory only.

use serde::{Deserialize, Deserializer, Serialize};

/// The traversal roots.
pub type Forest = Vec<ForestNode>;

/// Identity of one installed package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Normalised package key; the identity used for edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_version: Option<String>,
    /// Version constraint of the parent on this package (dependency entries only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_version: Option<String>,
}

impl PackageRecord {
    /// Record with only a key set.
    #[must_use]
    pub fn keyed(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }
}

/// One node of a dependency forest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestNode {
    /// Wrapped record; its key wins over the node's own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageRecord>,
    /// Fields set directly on the node.
    #[serde(flatten)]
    pub record: PackageRecord,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub dependencies: Vec<ForestNode>,
}

impl ForestNode {
    /// Bare leaf with the given key.
    #[must_use]
    pub fn leaf(key: impl Into<String>) -> Self {
        Self {
            package: None,
            record: PackageRecord::keyed(key),
            dependencies: Vec::new(),
        }
    }

    /// Wrapped record with the given key and children.
    #[must_use]
    pub fn tree(key: impl Into<String>, dependencies: Vec<Self>) -> Self {
        Self {
            package: Some(PackageRecord::keyed(key)),
            record: PackageRecord::default(),
            dependencies,
        }
    }

    /// Resolve the node's identifying key.
    ///
    /// `package.key` wins when it is non-empty, then the node's own `key`.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.package
            .as_ref()
            .and_then(|package| non_empty(package.key.as_deref()))
            .or_else(|| non_empty(self.record.key.as_deref()))
    }

    /// Direct children.
    #[must_use]
    pub fn dependencies(&self) -> &[Self] {
        &self.dependencies
    }
}

impl Drop for ForestNode {
    fn drop(&mut self) {
        // Flatten the subtree into a worklist so each node drops childless.
        let mut pending = std::mem::take(&mut self.dependencies);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.dependencies);
        }
    }
}

fn non_empty(key: Option<&str>) -> Option<&str> {
    key.filter(|k| !k.is_empty())
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ForestNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<ForestNode>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Parse a forest from JSON text.
///
/// Nesting depth is unlimited: `serde_json`'s recursion limit is lifted and
/// `serde_stacker` grows the stack on the heap as deeper records are read.
///
/// # Errors
///
/// Returns the `serde_json` error when the text is not a JSON array of
/// record objects.
pub fn parse_forest(json: &str) -> Result<Forest, serde_json::Error> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    deserializer.disable_recursion_limit();
    let forest = Forest::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(forest)
}
