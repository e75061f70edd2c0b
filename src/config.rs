use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Maximum number of simultaneous put requests.
    /// Values below 1 are rejected when the upload starts.
    pub parallelism: usize,
}
impl Default for UploadConfig {
    fn default() -> Self {
        Self { parallelism: 20 }
    }
}
