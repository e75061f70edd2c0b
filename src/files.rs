//! Staging of the local working set: media copies, generated text files, and
//! discovery of the resulting upload tasks.

use crate::err::{self, Error};
use crate::upload::UploadTask;
use rand::Rng;
use snafu::ResultExt;
use std::path::{Path, PathBuf};

/// Scratch directory holding the files for one roundtrip run.
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create the staging directory (and any missing parents).
    pub fn create(root: PathBuf) -> Result<Self, Error> {
        std::fs::create_dir_all(&root).context(err::Io {
            description: root.display().to_string(),
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copy the named media files from `source_dir` into the workspace.
    /// A missing or unreadable source is logged and skipped rather than
    /// sinking the staging step. Returns how many files were copied.
    pub async fn stage_media(&self, source_dir: &Path, names: &[String]) -> usize {
        let mut copied = 0;
        for name in names {
            let src = source_dir.join(name);
            let dst = self.root.join(name);
            match tokio::fs::copy(&src, &dst).await {
                Ok(_) => copied += 1,
                Err(e) => tracing::warn!(file = %src.display(), error = %e, "skipping media file"),
            }
        }
        copied
    }

    /// Generate `count` text files named `file{i}.txt`, each with a random
    /// number of lines between 5 and 100.
    pub async fn write_text_files(&self, count: usize) -> Result<(), Error> {
        for i in 0..count {
            let path = self.root.join(format!("file{}.txt", i));
            let lines = rand::thread_rng().gen_range(5..=100);
            let mut content = String::new();
            for line in 1..=lines {
                content.push_str(&format!("File {} Line {}\n", i, line));
            }
            tokio::fs::write(&path, content).await.context(err::Io {
                description: path.display().to_string(),
            })?;
        }
        Ok(())
    }

    /// One [`UploadTask`] per regular file under the workspace, with a key
    /// equal to the file's path with the workspace root stripped away and
    /// `key_prefix` prepended.
    pub fn upload_tasks(&self, key_prefix: PathBuf) -> impl Iterator<Item = UploadTask> {
        let root = self.root.clone();
        walkdir::WalkDir::new(&self.root)
            .into_iter()
            .filter_map(move |entry| {
                let root = root.clone();
                let key_prefix = key_prefix.clone();
                entry.ok().and_then(move |entry| {
                    if entry.file_type().is_file() {
                        let path = entry.path().to_owned();
                        let key_suffix = path.strip_prefix(&root).unwrap().to_path_buf();
                        let key = key_prefix.join(&key_suffix);
                        Some(UploadTask::new(path, key.to_string_lossy().to_string()))
                    } else {
                        None
                    }
                })
            })
    }

    /// Remove the staging directory and everything in it.
    pub async fn cleanup(self) -> Result<(), Error> {
        tokio::fs::remove_dir_all(&self.root)
            .await
            .context(err::Io {
                description: self.root.display().to_string(),
            })
    }
}
