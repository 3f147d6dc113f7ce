//! Typed git object records.
//!
//! Objects are parsed from the textual dump printed by `git cat-file -p`.
//! Only the fields needed to draw the object graph are retained: a commit's
//! tree, parents and summary line, a tree's entries, and nothing but the hash
//! for a blob.
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use thiserror::Error;

use crate::hash::ObjectHash;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("unsupported object kind `{0}`")]
    UnsupportedKind(String),
    #[error("malformed commit: missing `tree` header")]
    MissingTree,
    #[error("malformed commit: more than one `tree` header")]
    DuplicateTree,
    #[error("malformed commit: missing message summary")]
    MissingSummary,
    #[error("malformed commit: invalid `{field}` header {line:?}")]
    InvalidHeader { field: &'static str, line: String },
    #[error("malformed tree: invalid entry {0:?}")]
    InvalidTreeEntry(String),
}

impl ParseError {
    /// Whether the error is due to an object not matching the shape of its kind.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::UnsupportedKind(_))
    }
}

/// The kind of an object, as reported by the object store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Commit,
    Tree,
    Blob,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Tree => "tree",
            Self::Blob => "blob",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();

        if tag.eq_ignore_ascii_case("commit") {
            Ok(Self::Commit)
        } else if tag.eq_ignore_ascii_case("tree") {
            Ok(Self::Tree)
        } else if tag.eq_ignore_ascii_case("blob") {
            Ok(Self::Blob)
        } else {
            Err(ParseError::UnsupportedKind(tag.to_owned()))
        }
    }
}

/// A commit record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    /// The root tree of the commit.
    pub tree: ObjectHash,
    /// Parents, in header order. Duplicates are kept.
    pub parents: Vec<ObjectHash>,
    /// First line of the commit message.
    pub summary: String,
}

impl FromStr for Commit {
    type Err = ParseError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let (header, message) = content
            .split_once("\n\n")
            .ok_or(ParseError::MissingSummary)?;
        let mut tree = None;
        let mut parents = Vec::new();

        for line in header.lines() {
            let (name, value) = line.split_once(' ').unwrap_or((line, ""));

            match name {
                "tree" => {
                    if tree.is_some() {
                        return Err(ParseError::DuplicateTree);
                    }
                    tree = Some(header_value("tree", line, value)?);
                }
                "parent" => {
                    parents.push(header_value("parent", line, value)?);
                }
                // Author, committer, signatures and their continuation lines.
                _ => {}
            }
        }
        let tree = tree.ok_or(ParseError::MissingTree)?;
        let summary = message
            .lines()
            .next()
            .filter(|l| !l.is_empty())
            .ok_or(ParseError::MissingSummary)?;

        Ok(Self {
            tree,
            parents,
            summary: summary.to_owned(),
        })
    }
}

fn header_value(field: &'static str, line: &str, value: &str) -> Result<ObjectHash, ParseError> {
    value.trim_end().parse().map_err(|_| ParseError::InvalidHeader {
        field,
        line: line.to_owned(),
    })
}

/// A tree record, mapping entry names to the objects they point to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    entries: IndexMap<String, ObjectHash>,
}

impl Tree {
    /// Iterate over the entries, in record order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ObjectHash)> {
        self.entries.iter().map(|(name, hash)| (name.as_str(), hash))
    }

    /// Get the target of a named entry.
    pub fn get(&self, name: &str) -> Option<&ObjectHash> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for Tree {
    type Err = ParseError;

    /// Parse lines of the form `<mode> <kind> <hash>\t<name>`.
    ///
    /// Only the hash immediately preceding the tab, and the name, are used.
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let mut entries = IndexMap::new();

        for line in content.lines().filter(|l| !l.is_empty()) {
            let invalid = || ParseError::InvalidTreeEntry(line.to_owned());
            let (meta, name) = line.split_once('\t').ok_or_else(invalid)?;
            let hash = meta
                .len()
                .checked_sub(crate::hash::HEX_LEN)
                .and_then(|start| meta.get(start..))
                .ok_or_else(invalid)?
                .parse::<ObjectHash>()
                .map_err(|_| invalid())?;

            // Re-inserting a name keeps its position and replaces the target.
            entries.insert(name.to_owned(), hash);
        }
        Ok(Self { entries })
    }
}

/// The kind-specific payload of an object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Data {
    Commit(Commit),
    Tree(Tree),
    /// Blob contents are never retained.
    Blob,
}

impl Data {
    /// Parse an object dump according to its kind.
    pub fn parse(kind: Kind, content: &str) -> Result<Self, ParseError> {
        match kind {
            Kind::Commit => content.parse().map(Self::Commit),
            Kind::Tree => content.parse().map(Self::Tree),
            Kind::Blob => Ok(Self::Blob),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Commit(_) => Kind::Commit,
            Self::Tree(_) => Kind::Tree,
            Self::Blob => Kind::Blob,
        }
    }
}

/// A git object, as a node of the object graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Object {
    hash: ObjectHash,
    delta: Option<ObjectHash>,
    data: Data,
}

impl Object {
    pub fn new(hash: ObjectHash, data: Data, delta: Option<ObjectHash>) -> Self {
        Self { hash, delta, data }
    }

    /// Parse an object from its kind and textual dump.
    ///
    /// The `delta` base is only known for objects found in a pack.
    pub fn parse(
        hash: ObjectHash,
        kind: Kind,
        content: &str,
        delta: Option<ObjectHash>,
    ) -> Result<Self, ParseError> {
        Ok(Self::new(hash, Data::parse(kind, content)?, delta))
    }

    pub fn hash(&self) -> &ObjectHash {
        &self.hash
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn kind(&self) -> Kind {
        self.data.kind()
    }

    /// The object this one was delta-encoded against, if any.
    pub fn delta_base(&self) -> Option<&ObjectHash> {
        self.delta.as_ref()
    }

    pub fn is_delta_derived(&self) -> bool {
        self.delta.is_some()
    }
}
