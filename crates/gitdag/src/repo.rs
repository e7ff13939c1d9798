//! Git repository handle.

use crate::commit::CommitInfo;
use crate::error::{Error, Result};
use git2::{Oid, Repository};
use std::path::Path;

/// A read-only handle to a Git repository.
///
/// The handle is opened once, validated eagerly, and dropped when the owner
/// is done with it; dropping releases the underlying libgit2 resources on
/// every exit path. A `GitRepo` never mutates the repository.
///
/// Concurrent readers should each open their own handle over the same path;
/// independent handles share nothing and need no locking.
///
/// # Example
///
/// ```no_run
/// use gitdag::GitRepo;
///
/// let repo = GitRepo::open(".")?;
/// println!("Repository at: {}", repo.path());
/// # Ok::<(), gitdag::Error>(())
/// ```
pub struct GitRepo {
    repo: Repository,
    path: String,
}

impl GitRepo {
    /// Opens the Git repository at the given path.
    ///
    /// Uses `git2::Repository::discover`, so nested directories within a
    /// repository work. The repository must have a HEAD that resolves to a
    /// commit; a path without one has no history to expose.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRepository`] if no repository is found or its
    /// HEAD does not reach a commit.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let repo = Repository::discover(path_ref).map_err(|e| {
            tracing::debug!("failed to open {}: {}", path_ref.display(), e);
            Error::InvalidRepository(path_ref.display().to_string())
        })?;

        if let Err(e) = repo.head().and_then(|head| head.peel_to_commit()) {
            tracing::debug!("HEAD of {} does not resolve: {}", path_ref.display(), e);
            return Err(Error::InvalidRepository(format!(
                "{} has no reachable HEAD",
                path_ref.display()
            )));
        }

        let workdir = repo
            .workdir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| repo.path().display().to_string());

        Ok(Self {
            repo,
            path: workdir,
        })
    }

    /// Returns the working directory path of the repository.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns a reference to the underlying `git2::Repository`.
    pub fn inner(&self) -> &Repository {
        &self.repo
    }

    /// The commit HEAD currently resolves to.
    pub fn head_commit(&self) -> Result<CommitInfo> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(CommitInfo::from(&commit))
    }

    /// Loads a commit by object id.
    pub fn find_commit(&self, id: Oid) -> Result<CommitInfo> {
        let commit = self
            .repo
            .find_commit(id)
            .map_err(|e| not_found(id.to_string(), e))?;
        Ok(CommitInfo::from(&commit))
    }

    /// Loads a commit from its full 40-character hex hash.
    ///
    /// The hash must match exactly; abbreviations and case variants do not
    /// resolve here (use [`resolve_rev`](Self::resolve_rev) for those).
    pub fn find_commit_by_hash(&self, hash: &str) -> Result<CommitInfo> {
        let id = Oid::from_str(hash).map_err(|_| Error::ObjectNotFound(hash.to_string()))?;
        let commit = self.find_commit(id)?;
        // Oid::from_str zero-pads short input, which would alias distinct
        // hashes; require the round trip to match.
        if commit.hash() != hash {
            return Err(Error::ObjectNotFound(hash.to_string()));
        }
        Ok(commit)
    }

    /// Resolves any revspec (hash, branch, tag, `HEAD~2`, ...) to a commit.
    pub fn resolve_rev(&self, rev: &str) -> Result<CommitInfo> {
        let object = self
            .repo
            .revparse_single(rev)
            .map_err(|e| not_found(rev.to_string(), e))?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| Error::ObjectNotFound(rev.to_string()))?;
        Ok(CommitInfo::from(&commit))
    }

    /// True when `ancestor` is reachable from `descendant` (or equal to it).
    pub fn in_history(&self, descendant: Oid, ancestor: Oid) -> Result<bool> {
        if descendant == ancestor {
            return Ok(true);
        }
        Ok(self.repo.graph_descendant_of(descendant, ancestor)?)
    }
}

fn not_found(what: String, err: git2::Error) -> Error {
    if err.code() == git2::ErrorCode::NotFound {
        Error::ObjectNotFound(what)
    } else {
        Error::Git(err)
    }
}
