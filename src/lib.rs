//! # S3 bucket roundtrip
//! Demo harness for an S3 account: provision a scratch bucket, stage a local
//! file set, bulk-upload it under a bounded parallelism limit, then list,
//! empty and remove the bucket again.
//!
//! - Upload multiple files with [`BulkUploader::upload_files`], which
//!   reports one [`UploadResult`] per task instead of aborting the batch on
//!   the first failure.
//! - Container lifecycle and listing go through the [`ObjectStore`] seam,
//!   implemented for the AWS SDK client by [`S3Store`].
//! - The `roundtrip` binary runs the whole sequence end to end.

mod config;
pub mod err;
mod files;
mod store;
mod upload;

pub use config::*;
pub use err::{Error, TaskError};
pub use files::*;
pub use store::*;
pub use upload::*;

#[cfg(test)]
mod mock;
