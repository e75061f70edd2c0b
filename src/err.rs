use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::operation::delete_bucket::DeleteBucketError;
use aws_sdk_s3::operation::delete_object::DeleteObjectError;
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Error;
use aws_sdk_s3::operation::put_object::PutObjectError;
use snafu::{Backtrace, Snafu};
use std::io;
use std::path::PathBuf;

/// Failure of a whole operation, as opposed to [`TaskError`] which is
/// recorded per upload task.
#[derive(Snafu, Debug)]
#[snafu(visibility = "pub")]
pub enum Error {
    #[snafu(display("Io error: {}: {}", description, source))]
    Io {
        source: io::Error,
        description: String,
        backtrace: Backtrace,
    },

    /// A bulk upload was requested with a zero parallelism limit.
    #[snafu(display("Upload parallelism must be at least 1 (got {})", requested))]
    InvalidParallelism { requested: usize },

    #[snafu(display("S3 'create bucket' error on '{}': {}", bucket, source))]
    CreateBucket {
        source: SdkError<CreateBucketError>,
        bucket: String,
    },

    #[snafu(display("S3 'put object' error on key '{}': {}", key, source))]
    PutObject {
        source: SdkError<PutObjectError>,
        key: String,
        backtrace: Backtrace,
    },

    #[snafu(display("Error listing objects in S3: {:?}", source))]
    ListObjectsV2 {
        source: SdkError<ListObjectsV2Error>,
    },

    #[snafu(display("S3 'delete object' error on key '{}': {}", key, source))]
    DeleteObject {
        source: SdkError<DeleteObjectError>,
        key: String,
    },

    #[snafu(display("S3 'delete bucket' error on '{}': {}", bucket, source))]
    DeleteBucket {
        source: SdkError<DeleteBucketError>,
        bucket: String,
    },

    AnyError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Outcome detail of a single failed upload task. Never aborts the batch;
/// the failing task's result carries it instead.
#[derive(Snafu, Debug)]
#[snafu(visibility = "pub")]
pub enum TaskError {
    #[snafu(display("Cannot read local file {}: {}", path.display(), source))]
    LocalRead { source: io::Error, path: PathBuf },

    #[snafu(display("Upload of key '{}' failed: {}", key, source))]
    RemoteUpload { source: Error, key: String },
}
