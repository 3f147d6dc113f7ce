//! The object graph of a repository.
use indexmap::IndexMap;
use thiserror::Error;

use crate::hash::ObjectHash;
use crate::object::{self, Commit, Data, Kind, Object};
use crate::pack;
use crate::store::{self, ObjectStore};

/// An object that could not be added to the graph.
///
/// These errors are recorded during discovery. They never abort it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("object {hash}: {err}")]
    Store {
        hash: ObjectHash,
        #[source]
        err: store::Error,
    },
    #[error("object {hash}: {err}")]
    Parse {
        hash: ObjectHash,
        #[source]
        err: object::ParseError,
    },
    #[error("pack {pack}: {err}")]
    Pack {
        pack: String,
        #[source]
        err: store::Error,
    },
}

impl Error {
    /// The object the error is about, if any.
    pub fn hash(&self) -> Option<&ObjectHash> {
        match self {
            Self::Store { hash, .. } | Self::Parse { hash, .. } => Some(hash),
            Self::Pack { .. } => None,
        }
    }
}

/// Objects keyed by hash, in discovery order.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: IndexMap<ObjectHash, Object>,
    errors: Vec<Error>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from all loose objects, then all packed objects.
    pub fn discover<S: ObjectStore>(store: &S) -> Result<Self, store::Error> {
        let mut graph = Self::new();

        graph.discover_loose(store)?;
        graph.discover_packed(store)?;

        Ok(graph)
    }

    /// Add every loose object of the store. Returns the number of objects added.
    ///
    /// Only a failure to list the objects is returned as an error.
    pub fn discover_loose<S: ObjectStore>(&mut self, store: &S) -> Result<usize, store::Error> {
        let hashes = store.loose_objects()?;
        let mut added = 0;

        for hash in hashes {
            let object = store
                .kind(&hash)
                .map_err(|err| Error::Store {
                    hash: hash.clone(),
                    err,
                })
                .and_then(|tag| load(store, hash.clone(), &tag, None));

            added += self.record(object) as usize;
        }
        log::info!(target: "gitviz", "Found {added} loose object(s)");

        Ok(added)
    }

    /// Add every object of every pack in the store. Returns the number of objects added.
    ///
    /// Packed objects replace loose ones with the same hash, since only the pack
    /// knows about delta bases.
    pub fn discover_packed<S: ObjectStore>(&mut self, store: &S) -> Result<usize, store::Error> {
        let mut added = 0;

        for pack in store.packs()? {
            let report = match store.verify_pack(&pack) {
                Ok(report) => report,
                Err(err) => {
                    let err = Error::Pack {
                        pack: pack.to_string(),
                        err,
                    };
                    log::warn!(target: "gitviz", "Skipping {err}");
                    self.errors.push(err);

                    continue;
                }
            };
            log::debug!(target: "gitviz", "Reading pack {pack}..");

            for entry in pack::entries(&report) {
                let base = entry.base().cloned();
                let object = load(store, entry.hash, &entry.tag, base);

                added += self.record(object) as usize;
            }
        }
        log::info!(target: "gitviz", "Found {added} packed object(s)");

        Ok(added)
    }

    /// Insert an object, replacing any object with the same hash.
    ///
    /// A replaced object keeps its position in the iteration order.
    pub fn insert(&mut self, object: Object) -> Option<Object> {
        self.nodes.insert(object.hash().clone(), object)
    }

    pub fn get(&self, hash: &ObjectHash) -> Option<&Object> {
        self.nodes.get(hash)
    }

    pub fn contains(&self, hash: &ObjectHash) -> bool {
        self.nodes.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all objects, in discovery order.
    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.nodes.values()
    }

    /// Iterate over commits, in discovery order.
    pub fn commits(&self) -> impl Iterator<Item = (&ObjectHash, &Commit)> {
        self.nodes.iter().filter_map(|(hash, object)| match object.data() {
            Data::Commit(commit) => Some((hash, commit)),
            _ => None,
        })
    }

    /// Objects that were skipped during discovery.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    fn record(&mut self, result: Result<Object, Error>) -> bool {
        match result {
            Ok(object) => {
                log::debug!(
                    target: "gitviz",
                    "Found {} {}{}",
                    object.kind(),
                    object.hash().short(),
                    if object.is_delta_derived() { " (delta)" } else { "" }
                );
                self.insert(object);

                true
            }
            Err(err) => {
                log::warn!(target: "gitviz", "Skipping {err}");
                self.errors.push(err);

                false
            }
        }
    }
}

/// Fetch and parse a single object.
fn load<S: ObjectStore>(
    store: &S,
    hash: ObjectHash,
    tag: &str,
    delta: Option<ObjectHash>,
) -> Result<Object, Error> {
    let kind = tag.parse::<Kind>().map_err(|err| Error::Parse {
        hash: hash.clone(),
        err,
    })?;
    let content = store.content(&hash).map_err(|err| Error::Store {
        hash: hash.clone(),
        err,
    })?;

    Object::parse(hash.clone(), kind, &content, delta).map_err(|err| Error::Parse { hash, err })
}
