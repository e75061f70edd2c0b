//! The `ObjectStore` trait is the seam between the algorithms and the remote
//! store: the real client is [`S3Store`], tests substitute instrumented
//! in-memory doubles.

use crate::err::{self, Error};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use snafu::futures::TryFutureExt;

/// The client surface consumed by the upload and teardown operations.
///
/// `list_objects` always returns the complete key set; implementations are
/// responsible for any paging the backing store requires.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn create_container(&self, name: &str) -> Result<(), Error>;
    async fn put_object(&self, container: &str, key: &str, body: Bytes) -> Result<(), Error>;
    async fn list_objects(&self, container: &str) -> Result<Vec<String>, Error>;
    async fn delete_object(&self, container: &str, key: &str) -> Result<(), Error>;
    async fn delete_container(&self, name: &str) -> Result<(), Error>;
}

/// `ObjectStore` over the AWS SDK S3 client.
#[derive(Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Client from the ambient AWS configuration (environment, profile,
    /// instance metadata), with an optional region override.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;
        Self::new(Client::new(&config))
    }

    /// Client against a local S3-compatible endpoint such as minio on port
    /// 9000, for integration testing.
    pub async fn local(endpoint: impl Into<String>) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .endpoint_url(endpoint.into())
            .region(aws_config::Region::new("minio"))
            .load()
            .await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn create_container(&self, name: &str) -> Result<(), Error> {
        self.client
            .create_bucket()
            .bucket(name)
            .send()
            .context(err::CreateBucket {
                bucket: name.to_string(),
            })
            .await
            .map(drop)
    }

    async fn put_object(&self, container: &str, key: &str, body: Bytes) -> Result<(), Error> {
        self.client
            .put_object()
            .bucket(container)
            .key(key)
            .content_length(body.len() as i64)
            .body(ByteStream::from(body))
            .send()
            .context(err::PutObject {
                key: key.to_string(),
            })
            .await
            .map(drop)
    }

    async fn list_objects(&self, container: &str) -> Result<Vec<String>, Error> {
        let mut keys = Vec::new();
        // Follow continuation tokens until the listing is exhausted, so
        // callers never see a truncated page.
        let mut continuation: Option<String> = None;
        loop {
            let response = self
                .client
                .list_objects_v2()
                .bucket(container)
                .set_continuation_token(continuation.take())
                .send()
                .context(err::ListObjectsV2)
                .await?;
            keys.extend(
                response
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_owned)),
            );
            match response.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }
        Ok(keys)
    }

    async fn delete_object(&self, container: &str, key: &str) -> Result<(), Error> {
        self.client
            .delete_object()
            .bucket(container)
            .key(key)
            .send()
            .context(err::DeleteObject {
                key: key.to_string(),
            })
            .await
            .map(drop)
    }

    async fn delete_container(&self, name: &str) -> Result<(), Error> {
        self.client
            .delete_bucket()
            .bucket(name)
            .send()
            .context(err::DeleteBucket {
                bucket: name.to_string(),
            })
            .await
            .map(drop)
    }
}

/// Empty a container by listing every object and deleting them one call at a
/// time. Returns the deleted keys in listing order.
pub async fn delete_all_objects<S: ObjectStore + ?Sized>(
    store: &S,
    container: &str,
) -> Result<Vec<String>, Error> {
    let keys = store.list_objects(container).await?;
    for key in &keys {
        store.delete_object(container, key).await?;
    }
    Ok(keys)
}
