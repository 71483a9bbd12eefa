use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, instrument};

use crate::storage::index::list_notes;
use crate::storage::{CaseSensitivity, Error, Result};

/// A validated handle to the root directory holding the notes.
///
/// Required for any operation that allocates a new path. The handle also
/// carries the [`CaseSensitivity`] policy used for collision checks, since
/// that is a property of the filesystem the folder lives on.
#[derive(Debug, Clone)]
pub struct Notebook {
    // Absolute path to the notes folder
    root: PathBuf,
    case_sensitivity: CaseSensitivity,
}

impl Notebook {
    /// Opens an existing notes folder.
    ///
    /// Checks that the path exists and is a directory, and canonicalizes it
    /// so saved notes always carry a stable absolute path.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub async fn open(path: &Path) -> Result<Self> {
        debug!("Attempting to open notebook");

        let meta = fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::DirectoryNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        if !meta.is_dir() {
            return Err(Error::NotADirectory(path.to_path_buf()));
        }

        let root = fs::canonicalize(path).await.map_err(Error::Io)?;
        debug!("Notebook opened at {}", root.display());
        Ok(Notebook { root, case_sensitivity: CaseSensitivity::default() })
    }

    /// Creates the notes folder (and any missing parents) if needed, then
    /// opens it. Verifies the directory is actually readable.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub async fn create(path: &Path) -> Result<Self> {
        fs::create_dir_all(path).await.map_err(Error::Io)?;
        let notebook = Notebook::open(path).await?;
        // The folder may be provider-backed (e.g. cloud sync); confirm we can
        // list it before reporting success.
        notebook.list().await?;
        Ok(notebook)
    }

    /// Overrides the collision-check case policy.
    pub fn with_case_sensitivity(mut self, case_sensitivity: CaseSensitivity) -> Self {
        self.case_sensitivity = case_sensitivity;
        self
    }

    /// Returns the root path of the notebook.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.case_sensitivity
    }

    /// Lists the notebook's note files, most recently modified first.
    pub async fn list(&self) -> Result<Vec<PathBuf>> {
        list_notes(&self.root).await
    }
}
