use crate::config::UploadConfig;
use crate::err::{self, Error, TaskError};
use crate::store::ObjectStore;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use snafu::ResultExt;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// A unit of work pairing one local file with the key it should get in the
/// remote container. Immutable once created; its outcome is reported as an
/// [`UploadResult`].
#[derive(Clone, Debug)]
pub struct UploadTask {
    pub path: PathBuf,
    pub key: String,
}
impl UploadTask {
    pub fn new(path: PathBuf, key: String) -> Self {
        Self { path, key }
    }
}

/// Outcome of one [`UploadTask`]. Exactly one is produced per submitted
/// task, whether the upload succeeded or not.
#[derive(Debug)]
pub struct UploadResult {
    pub key: String,
    pub error: Option<TaskError>,
}
impl UploadResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Clone)]
pub struct BulkUploader<S> {
    store: S,
    config: UploadConfig,
}
impl<S> BulkUploader<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: UploadConfig::default(),
        }
    }
    pub fn with_config(store: S, config: UploadConfig) -> Self {
        Self { store, config }
    }
}

impl<S: ObjectStore + Clone + Send + Sync + 'static> BulkUploader<S> {
    /// Upload `tasks` to `container`, keeping at most `config.parallelism`
    /// put requests in flight at any instant.
    ///
    /// Every submitted task is accounted for in the returned map, keyed by
    /// remote key (keys are expected to be unique within one call). A failed
    /// local read or remote call is recorded in that task's entry and does
    /// not cancel its siblings; a task whose file cannot be read causes no
    /// remote call at all. The call itself only fails when the parallelism
    /// limit is zero, before any work has started.
    ///
    /// Completion order among the in-flight slots is unspecified. The future
    /// resolves once every task has finished.
    pub async fn upload_files<I>(
        &self,
        container: String,
        tasks: I,
    ) -> Result<HashMap<String, UploadResult>, Error>
    where
        I: IntoIterator<Item = UploadTask>,
    {
        let parallelism = self.config.parallelism;
        if parallelism == 0 {
            return err::InvalidParallelism {
                requested: parallelism,
            }
            .fail();
        }

        let container = Arc::new(container);
        let store = self.store.clone();
        let jobs = tasks.into_iter().map(move |task| {
            let (store, container) = (store.clone(), container.clone());
            async move { upload_one(&store, container.as_str(), task).await }
        });

        // All results funnel through this one collect on the caller's task,
        // so the aggregation needs no lock.
        let results = stream::iter(jobs)
            .buffer_unordered(parallelism)
            .collect::<Vec<UploadResult>>()
            .await;

        Ok(results
            .into_iter()
            .map(|result| (result.key.clone(), result))
            .collect())
    }
}

/// Run a single task to completion, turning both local and remote failures
/// into the task's recorded outcome.
async fn upload_one<S: ObjectStore>(store: &S, container: &str, task: UploadTask) -> UploadResult {
    let UploadTask { path, key } = task;
    let body = match tokio::fs::read(&path)
        .await
        .context(err::LocalRead { path: path.clone() })
    {
        Ok(bytes) => Bytes::from(bytes),
        Err(error) => {
            return UploadResult {
                key,
                error: Some(error),
            }
        }
    };
    let error = store
        .put_object(container, &key, body)
        .await
        .context(err::RemoteUpload { key: key.clone() })
        .err();
    UploadResult { key, error }
}
