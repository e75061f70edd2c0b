use clap::Parser;
use s3_roundtrip::{
    delete_all_objects, BulkUploader, ObjectStore, S3Store, UploadConfig, Workspace,
};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Provision a scratch bucket, fill it with staged files, and tear it all
/// down again.
#[derive(Parser)]
#[clap(name = "roundtrip", version)]
struct Opt {
    /// Prefix for the scratch bucket name; a unix timestamp is appended.
    #[clap(long, default_value = "deletebucket")]
    bucket_prefix: String,

    /// AWS region override.
    #[clap(long)]
    region: Option<String>,

    /// Directory to copy media files from.
    #[clap(long)]
    media_source: Option<PathBuf>,

    /// Media file name to copy from the media source (repeatable).
    #[clap(long = "media", requires = "media_source")]
    media_files: Vec<String>,

    /// Number of generated text files.
    #[clap(long, default_value_t = 10)]
    text_files: usize,

    /// Maximum number of concurrent uploads.
    #[clap(long, default_value_t = 20)]
    parallelism: usize,

    /// Local staging directory.
    #[clap(long, default_value = "files")]
    staging_dir: PathBuf,

    /// Leave the bucket and its objects in place instead of deleting them.
    #[clap(long)]
    keep_bucket: bool,
}

#[tokio::main]
async fn main() -> Result<(), s3_roundtrip::Error> {
    tracing_subscriber::fmt::init();
    let opt = Opt::parse();

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs();
    let bucket = format!("{}-{}", opt.bucket_prefix, stamp);

    let store = S3Store::from_env(opt.region.clone()).await;

    tracing::info!(%bucket, "creating bucket");
    store.create_container(&bucket).await?;

    let workspace = Workspace::create(opt.staging_dir.clone())?;
    if let Some(source) = &opt.media_source {
        let copied = workspace.stage_media(source, &opt.media_files).await;
        tracing::info!(copied, "staged media files");
    }
    workspace.write_text_files(opt.text_files).await?;

    let tasks: Vec<_> = workspace.upload_tasks(PathBuf::new()).collect();
    tracing::info!(
        files = tasks.len(),
        parallelism = opt.parallelism,
        %bucket,
        "uploading"
    );

    let uploader = BulkUploader::with_config(
        store.clone(),
        UploadConfig {
            parallelism: opt.parallelism,
        },
    );
    let results = uploader.upload_files(bucket.clone(), tasks).await?;

    let mut failed = 0usize;
    for result in results.values() {
        match &result.error {
            None => tracing::info!(key = %result.key, "uploaded"),
            Some(e) => {
                failed += 1;
                tracing::error!(key = %result.key, error = %e, "upload failed");
            }
        }
    }
    tracing::info!(ok = results.len() - failed, failed, "upload finished");

    if opt.keep_bucket {
        tracing::info!(%bucket, "keeping bucket");
    } else {
        let deleted = delete_all_objects(&store, &bucket).await?;
        tracing::info!(objects = deleted.len(), "emptied bucket");
        store.delete_container(&bucket).await?;
        tracing::info!(%bucket, "bucket deleted");
    }

    workspace.cleanup().await?;
    Ok(())
}
