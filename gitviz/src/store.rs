//! Access to a repository's object database.
//!
//! The graph is built from the textual output of the git tooling rather than
//! by decoding objects, so the store hands out object kinds, `cat-file`
//! dumps and `verify-pack` reports as strings.
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::{fmt, fs, io, iter};

use thiserror::Error;

use crate::hash::{ObjectHash, HEX_LEN};

#[derive(Error, Debug)]
pub enum Error {
    /// The path is not the root of a git repository.
    #[error("`{path}` is not a git repository root: {err}")]
    Unavailable {
        path: PathBuf,
        #[source]
        err: git2::Error,
    },
    /// The object is not known to the store.
    #[error("object {0} not found")]
    NotFound(ObjectHash),
    /// A git child process exited with an error.
    #[error("`git {args}` failed: {stderr}")]
    Command { args: String, stderr: String },
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// A source of git objects.
pub trait ObjectStore {
    /// Identifies a pack within the store.
    type Pack: fmt::Display;

    /// List the hashes of all loose objects.
    fn loose_objects(&self) -> Result<Vec<ObjectHash>, Error>;
    /// Get the kind tag of an object, eg. `commit`.
    fn kind(&self, hash: &ObjectHash) -> Result<String, Error>;
    /// Get the textual dump of an object.
    fn content(&self, hash: &ObjectHash) -> Result<String, Error>;
    /// List all packs.
    fn packs(&self) -> Result<Vec<Self::Pack>, Error>;
    /// Get the verification report of a pack, listing its entries.
    fn verify_pack(&self, pack: &Self::Pack) -> Result<String, Error>;
}

/// A pack of a [`GitStore`], identified by the path of its index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Pack(PathBuf);

impl Pack {
    pub fn path(&self) -> &Path {
        self.0.as_path()
    }
}

impl fmt::Display for Pack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Object store backed by the `git` command-line tool.
///
/// Every command is run with the repository root as its working directory.
#[derive(Debug, Clone)]
pub struct GitStore {
    root: PathBuf,
    objects: PathBuf,
}

impl GitStore {
    /// Open the repository at the given root. Parent directories are not searched.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, Error> {
        let root = root.as_ref();
        let repo = git2::Repository::open_ext(
            root,
            git2::RepositoryOpenFlags::NO_SEARCH,
            iter::empty::<&OsStr>(),
        )
        .map_err(|err| Error::Unavailable {
            path: root.to_path_buf(),
            err,
        })?;
        let objects = repo.path().join("objects");

        Ok(Self {
            root: root.to_path_buf(),
            objects,
        })
    }

    /// The repository root.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    fn git<S: AsRef<OsStr>>(&self, args: impl IntoIterator<Item = S>) -> Result<String, Error> {
        run(&self.root, args)
    }
}

impl ObjectStore for GitStore {
    type Pack = Pack;

    fn loose_objects(&self) -> Result<Vec<ObjectHash>, Error> {
        let mut hashes = Vec::new();

        for dir in fs::read_dir(&self.objects)? {
            let dir = dir?;
            let prefix = dir.file_name();
            let Some(prefix) = prefix.to_str() else {
                continue;
            };
            if prefix.len() != 2 || !dir.file_type()?.is_dir() {
                continue;
            }
            for file in fs::read_dir(dir.path())? {
                let file = file?.file_name();
                let Some(suffix) = file.to_str() else {
                    continue;
                };
                if suffix.len() != HEX_LEN - 2 {
                    continue;
                }
                // Skips temporary files and anything else that isn't an object.
                if let Ok(hash) = format!("{prefix}{suffix}").parse() {
                    hashes.push(hash);
                }
            }
        }
        hashes.sort();

        Ok(hashes)
    }

    fn kind(&self, hash: &ObjectHash) -> Result<String, Error> {
        self.git(["cat-file", "-t", hash.as_str()])
            .map(|out| out.trim().to_owned())
    }

    fn content(&self, hash: &ObjectHash) -> Result<String, Error> {
        self.git(["cat-file", "-p", hash.as_str()])
    }

    fn packs(&self) -> Result<Vec<Pack>, Error> {
        let dir = self.objects.join("pack");
        if !dir.is_dir() {
            return Ok(vec![]);
        }
        let mut packs = Vec::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension() == Some(OsStr::new("idx")) {
                packs.push(Pack(path));
            }
        }
        packs.sort();

        Ok(packs)
    }

    fn verify_pack(&self, pack: &Pack) -> Result<String, Error> {
        self.git([OsStr::new("verify-pack"), OsStr::new("-v"), pack.path().as_os_str()])
    }
}

/// Run a git command in the given directory and return its standard output.
pub fn run<S: AsRef<OsStr>>(
    dir: &Path,
    args: impl IntoIterator<Item = S>,
) -> Result<String, Error> {
    let args = args
        .into_iter()
        .map(|a| a.as_ref().to_os_string())
        .collect::<Vec<_>>();
    let output = Command::new("git").current_dir(dir).args(&args).output()?;

    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into());
    }

    Err(Error::Command {
        args: args
            .iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" "),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::object::{Data, Kind, Object};
    use crate::pack;
    use crate::test::fixtures;

    #[test]
    fn test_open_not_a_repository() {
        let tmp = tempfile::tempdir().unwrap();
        let err = GitStore::open(tmp.path()).unwrap_err();

        assert!(matches!(err, Error::Unavailable { .. }));
        assert!(matches!(
            GitStore::open(tmp.path().join("missing")),
            Err(Error::Unavailable { .. })
        ));
    }

    #[test]
    fn test_open_does_not_search_parents() {
        let tmp = tempfile::tempdir().unwrap();
        fixtures::repository(tmp.path());
        let nested = tmp.path().join("nested");
        std::fs::create_dir(&nested).unwrap();

        assert!(GitStore::open(tmp.path()).is_ok());
        assert!(matches!(
            GitStore::open(&nested),
            Err(Error::Unavailable { .. })
        ));
    }

    #[test]
    fn test_loose_objects() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = fixtures::repository(tmp.path());
        let store = GitStore::open(tmp.path()).unwrap();
        let loose = store.loose_objects().unwrap();

        let mut expected = repo.objects();
        expected.sort();

        assert_eq!(loose, expected);
        assert!(store.packs().unwrap().is_empty());
    }

    #[test]
    fn test_kind_and_content() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = fixtures::repository(tmp.path());
        let store = GitStore::open(tmp.path()).unwrap();

        let head = &repo.commits[1];
        assert_eq!(store.kind(head).unwrap(), "commit");

        let content = store.content(head).unwrap();
        let commit = Object::parse(head.clone(), Kind::Commit, &content, None).unwrap();
        let Data::Commit(commit) = commit.data() else {
            panic!("expected a commit");
        };
        assert_eq!(commit.parents, vec![repo.commits[0].clone()]);
        assert_eq!(commit.tree, repo.trees[1]);
        assert_eq!(commit.summary, "Second commit");

        let tree = &repo.trees[1];
        assert_eq!(store.kind(tree).unwrap(), "tree");
        let tree = Object::parse(tree.clone(), Kind::Tree, &store.content(tree).unwrap(), None)
            .unwrap();
        let Data::Tree(tree) = tree.data() else {
            panic!("expected a tree");
        };
        assert_eq!(tree.get(fixtures::FILE), Some(&repo.blobs[1]));
    }

    #[test]
    fn test_missing_object() {
        let tmp = tempfile::tempdir().unwrap();
        fixtures::repository(tmp.path());
        let store = GitStore::open(tmp.path()).unwrap();
        let missing: ObjectHash = "0000000000000000000000000000000000000001".parse().unwrap();

        assert!(matches!(
            store.kind(&missing),
            Err(Error::Command { .. })
        ));
    }

    #[test]
    fn test_packs() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = fixtures::repository(tmp.path());
        fixtures::repack(tmp.path());

        let store = GitStore::open(tmp.path()).unwrap();
        assert!(store.loose_objects().unwrap().is_empty());

        let packs = store.packs().unwrap();
        assert_eq!(packs.len(), 1);
        assert_eq!(packs[0].path().extension(), Some(OsStr::new("idx")));
        assert_eq!(packs[0].to_string(), packs[0].path().display().to_string());

        let report = store.verify_pack(&packs[0]).unwrap();
        let entries = pack::entries(&report).collect::<Vec<_>>();
        let mut hashes = entries.iter().map(|e| e.hash.clone()).collect::<Vec<_>>();
        let mut expected = repo.objects();
        hashes.sort();
        expected.sort();

        assert_eq!(hashes, expected);
        assert!(entries.iter().any(|e| e.delta.is_some()));
    }
}
