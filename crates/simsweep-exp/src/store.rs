use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use simsweep_core::errors::SweepError;

/// Destination for generated scripts, logs and manifests.
pub trait ArtifactStore {
    /// Persists `contents` under `name`, returning where it ended up.
    fn write_artifact(
        &mut self,
        name: &str,
        contents: &[u8],
        executable: bool,
    ) -> Result<PathBuf, SweepError>;
}

/// Writes artifacts as files under one directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Creates `root` (and parents) if missing.
    pub fn create<P: AsRef<Path>>(root: P) -> Result<Self, SweepError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|err| SweepError::io("store.create_dir", root.display(), err))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactStore for DirectoryStore {
    fn write_artifact(
        &mut self,
        name: &str,
        contents: &[u8],
        executable: bool,
    ) -> Result<PathBuf, SweepError> {
        let path = self.root.join(name);
        fs::write(&path, contents).map_err(|err| SweepError::io("store.write", path.display(), err))?;
        if executable {
            mark_executable(&path)?;
        }
        Ok(path)
    }
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<(), SweepError> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)
        .map_err(|err| SweepError::io("store.metadata", path.display(), err))?
        .permissions();
    permissions.set_mode(permissions.mode() | 0o100);
    fs::set_permissions(path, permissions)
        .map_err(|err| SweepError::io("store.chmod", path.display(), err))
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<(), SweepError> {
    Ok(())
}

/// Artifact held by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub contents: Vec<u8>,
    pub executable: bool,
}

impl StoredArtifact {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.contents).into_owned()
    }
}

/// Keeps artifacts in memory; used by dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    artifacts: BTreeMap<String, StoredArtifact>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&StoredArtifact> {
        self.artifacts.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.artifacts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl ArtifactStore for MemoryStore {
    fn write_artifact(
        &mut self,
        name: &str,
        contents: &[u8],
        executable: bool,
    ) -> Result<PathBuf, SweepError> {
        self.artifacts.insert(
            name.to_string(),
            StoredArtifact {
                contents: contents.to_vec(),
                executable,
            },
        );
        Ok(PathBuf::from(name))
    }
}
