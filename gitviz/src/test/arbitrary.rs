use std::iter;

use qcheck::Arbitrary;

use crate::hash::{ObjectHash, HEX_LEN};
use crate::object::Kind;
use crate::test::store::{self, MockStore};

const HEX: &[u8] = b"0123456789abcdef";

/// A random object hash.
pub fn hash() -> ObjectHash {
    hash_with(&mut fastrand::Rng::new())
}

fn hash_with(rng: &mut fastrand::Rng) -> ObjectHash {
    iter::repeat_with(|| HEX[rng.usize(..HEX.len())] as char)
        .take(HEX_LEN)
        .collect::<String>()
        .parse()
        .unwrap()
}

impl Arbitrary for ObjectHash {
    fn arbitrary(g: &mut qcheck::Gen) -> Self {
        let mut rng = fastrand::Rng::with_seed(u64::arbitrary(g));

        hash_with(&mut rng)
    }
}

/// An object dump of an arbitrary kind, as printed by `git cat-file -p`.
#[derive(Clone, Debug)]
pub struct Dump {
    pub hash: ObjectHash,
    pub kind: Kind,
    pub content: String,
}

impl Arbitrary for Dump {
    fn arbitrary(g: &mut qcheck::Gen) -> Self {
        let mut rng = fastrand::Rng::with_seed(u64::arbitrary(g));
        let kind = *g.choose(&[Kind::Commit, Kind::Tree, Kind::Blob]).unwrap();
        let content = match kind {
            Kind::Commit => commit(&mut rng),
            Kind::Tree => tree(&mut rng),
            Kind::Blob => String::arbitrary(g),
        };

        Self {
            hash: hash_with(&mut rng),
            kind,
            content,
        }
    }
}

/// A commit dump whose parents may repeat.
fn commit(rng: &mut fastrand::Rng) -> String {
    let tree = hash_with(rng);
    let count = rng.usize(0..4);
    let mut parents = iter::repeat_with(|| hash_with(rng))
        .take(count)
        .collect::<Vec<_>>();
    if let Some(first) = parents.first().cloned() {
        if rng.bool() {
            parents.push(first);
        }
    }
    let mut summary = String::from(rng.alphanumeric());
    for _ in 0..rng.usize(0..16) {
        summary.push(if rng.u8(..8) == 0 { ' ' } else { rng.alphanumeric() });
    }
    let parents = parents.iter().collect::<Vec<_>>();

    store::commit(&tree, &parents, &format!("{summary}\n\nBody\n"))
}

/// A tree dump with up to seven blob entries.
fn tree(rng: &mut fastrand::Rng) -> String {
    let count = rng.usize(0..8);
    let hashes = iter::repeat_with(|| hash_with(rng))
        .take(count)
        .collect::<Vec<_>>();
    let names = hashes
        .iter()
        .map(|_| {
            let len = rng.usize(1..4);
            iter::repeat_with(|| rng.alphanumeric())
                .take(len)
                .collect::<String>()
        })
        .collect::<Vec<_>>();
    let entries = names
        .iter()
        .zip(hashes.iter())
        .map(|(name, hash)| (name.as_str(), Kind::Blob, hash))
        .collect::<Vec<_>>();

    store::tree(&entries)
}

impl Arbitrary for MockStore {
    /// A linear history where each commit has a tree of one or two blobs.
    /// Some of the objects are packed, some of those as deltas.
    fn arbitrary(g: &mut qcheck::Gen) -> Self {
        let mut rng = fastrand::Rng::with_seed(u64::arbitrary(g));
        let mut store = MockStore::default();
        let mut packed = Vec::new();
        let mut blobs: Vec<ObjectHash> = Vec::new();
        let mut parent: Option<ObjectHash> = None;

        for i in 0..rng.usize(1..6) {
            let blob = hash_with(&mut rng);
            let base = blobs.last().cloned();
            let mut entries = vec![("README", Kind::Blob, &blob)];
            if let Some(base) = &base {
                entries.push(("README.orig", Kind::Blob, base));
            }
            let tree = hash_with(&mut rng);
            let commit = hash_with(&mut rng);
            let parents = parent.iter().collect::<Vec<_>>();
            let message = format!("Commit \"{i}\" of a random history\n\nBody\n");

            store.insert(&blob, "blob", "");
            store.loose(&tree, "tree", store::tree(&entries));
            store.loose(&commit, "commit", store::commit(&tree, &parents, &message));

            if rng.bool() {
                packed.push((blob.clone(), String::from("blob"), base));
            } else {
                store.loose.push(blob.clone());
            }
            blobs.push(blob);
            parent = Some(commit);
        }
        store.pack("pack-arbitrary", &packed);
        store
    }
}
