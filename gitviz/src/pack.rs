//! Pack verification reports.
//!
//! `git verify-pack -v` prints one line per packed object:
//!
//! ```text
//! <hash> <kind> <size> <size-in-pack> <offset> [<depth> <base-hash>]
//! ```
//!
//! where `<kind>` is padded to six characters. The object lines are followed
//! by a histogram of delta chain lengths and a trailer, which are not entries.
use crate::hash::{ObjectHash, HEX_LEN};
use crate::object::{Kind, ParseError};

/// Width of the kind column.
const KIND_LEN: usize = 6;

/// Delta information of a packed object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delta {
    /// Length of the delta chain up to this object.
    pub depth: u64,
    /// The object this one is encoded against.
    pub base: ObjectHash,
}

/// A single object entry of a pack report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub hash: ObjectHash,
    /// The kind column, with its padding removed.
    pub tag: String,
    pub size: u64,
    pub packed_size: u64,
    pub offset: u64,
    pub delta: Option<Delta>,
}

impl Entry {
    /// Parse a report line, returning `None` if it isn't an object entry.
    pub fn parse(line: &str) -> Option<Self> {
        let hash = line.get(..HEX_LEN)?.parse().ok()?;
        let rest = line.get(HEX_LEN..)?.strip_prefix(' ')?;
        let tag = rest.get(..KIND_LEN)?;
        let rest = rest.get(KIND_LEN..)?.strip_prefix(' ')?;
        let mut fields = rest.split_whitespace();

        let size = fields.next()?.parse().ok()?;
        let packed_size = fields.next()?.parse().ok()?;
        let offset = fields.next()?.parse().ok()?;
        let delta = match (fields.next(), fields.next()) {
            (None, _) => None,
            (Some(depth), Some(base)) => Some(Delta {
                depth: depth.parse().ok()?,
                base: base.parse().ok()?,
            }),
            (Some(_), None) => return None,
        };
        if fields.next().is_some() {
            return None;
        }

        Some(Self {
            hash,
            tag: tag.trim_end().to_owned(),
            size,
            packed_size,
            offset,
            delta,
        })
    }

    /// The object kind.
    pub fn kind(&self) -> Result<Kind, ParseError> {
        self.tag.parse()
    }

    /// The delta base, if this object is stored as a delta.
    pub fn base(&self) -> Option<&ObjectHash> {
        self.delta.as_ref().map(|d| &d.base)
    }
}

/// Iterate over the object entries of a pack report.
///
/// Iteration stops at the first line that isn't an object entry.
pub fn entries(report: &str) -> impl Iterator<Item = Entry> + '_ {
    report.lines().map_while(Entry::parse)
}

#[cfg(test)]
mod test {
    use super::*;

    const REPORT: &str = "\
b1f3d4f4bfc5d3e2cbf1a8d5b0aefd7b7bbdbb7d commit 223 152 12
5716ca5987cbf97d6bb54920bea6adde242d87e6 blob   10 19 164
8ab686eafeb1f44702738c8b0f24f2567c36da6d tree   37 47 183
e69de29bb2d1d6434b8b29ae775ad8c2e48c5391 blob   7 18 230 1 5716ca5987cbf97d6bb54920bea6adde242d87e6
non delta: 3 objects
chain length = 1: 1 object
.git/objects/pack/pack-0b6e8d.pack: ok
";

    #[test]
    fn test_entries() {
        let entries = entries(REPORT).collect::<Vec<_>>();

        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].kind(), Ok(Kind::Commit));
        assert_eq!(entries[0].offset, 12);
        assert_eq!(entries[1].kind(), Ok(Kind::Blob));
        assert_eq!(entries[1].tag, "blob");
        assert_eq!(entries[2].kind(), Ok(Kind::Tree));
        assert!(entries[..3].iter().all(|e| e.delta.is_none()));
        assert_eq!(
            entries[3].delta,
            Some(Delta {
                depth: 1,
                base: "5716ca5987cbf97d6bb54920bea6adde242d87e6".parse().unwrap(),
            })
        );
        assert_eq!(entries[3].base(), Some(&entries[1].hash));
    }

    #[test]
    fn test_stops_at_trailer() {
        let report = "\
5716ca5987cbf97d6bb54920bea6adde242d87e6 blob   10 19 164
non delta: 1 object
e69de29bb2d1d6434b8b29ae775ad8c2e48c5391 blob   7 18 230
";
        assert_eq!(entries(report).count(), 1);
        assert_eq!(entries("").count(), 0);
    }

    #[test]
    fn test_not_an_entry() {
        for line in [
            "non delta: 3 objects",
            "5716ca5987cbf97d6bb54920bea6adde242d87e6 blob   10 19",
            "5716ca5987cbf97d6bb54920bea6adde242d87e6 blob   10 19 164 1",
            "5716ca5987cbf97d6bb54920bea6adde242d87e6 blob   10 19 164 1 5716ca",
            "5716ca5987cbf97d6bb54920bea6adde242d87e6 blob 10 19 164",
            "5716ca blob   10 19 164",
        ] {
            assert_eq!(Entry::parse(line), None, "{line:?}");
        }
    }

    #[test]
    fn test_unsupported_kind() {
        let entry = Entry::parse("5716ca5987cbf97d6bb54920bea6adde242d87e6 tag    140 132 300")
            .unwrap();

        assert_eq!(
            entry.kind(),
            Err(ParseError::UnsupportedKind("tag".to_owned()))
        );
    }
}
