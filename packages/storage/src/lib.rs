#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cloudflare R2 object storage for uploaded videos.
//!
//! Uploaded video bytes live under `videos/{id}/{filename}` in the
//! configured bucket. Playback goes through short-lived presigned GET
//! URLs so the dashboard player streams directly from storage instead
//! of proxying bytes through the API server.
//!
//! # Environment Variables
//!
//! | Variable | Required | Description |
//! |---|---|---|
//! | `CLOUDFLARE_ACCOUNT_ID` | Yes | Cloudflare account ID (builds the R2 endpoint) |
//! | `R2_ACCESS_KEY_ID` | Yes | S3-compatible access key for R2 |
//! | `R2_SECRET_ACCESS_KEY` | Yes | S3-compatible secret key for R2 |
//! | `VIDEO_BUCKET` | No | Bucket name, defaults to `crowdwatch-videos` |

use std::time::Duration;

use aws_config::Region;
use aws_sdk_s3::config::{Credentials, StalledStreamProtectionConfig};
use aws_sdk_s3::presigning::PresigningConfig;
use uuid::Uuid;

/// Default R2 bucket name for uploaded videos.
const DEFAULT_BUCKET: &str = "crowdwatch-videos";

/// How long presigned playback URLs stay valid.
const PLAYBACK_URL_TTL: Duration = Duration::from_secs(3600);

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Missing required environment variable.
    #[error("Missing environment variable: {name}")]
    MissingEnv {
        /// Name of the missing environment variable.
        name: String,
    },

    /// S3 `PutObject` failed.
    #[error("Failed to upload s3://{bucket}/{key}: {source}")]
    Upload {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
        /// Underlying SDK error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// S3 `HeadObject` failed.
    #[error("Failed to head s3://{bucket}/{key}: {source}")]
    Head {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
        /// Underlying SDK error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// S3 `DeleteObject` failed.
    #[error("Failed to delete s3://{bucket}/{key}: {source}")]
    Delete {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
        /// Underlying SDK error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Presigned URL generation failed.
    #[error("Failed to presign s3://{bucket}/{key}: {source}")]
    Presign {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
        /// Underlying SDK error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Client for storing and serving uploaded videos from R2.
pub struct VideoStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl VideoStore {
    /// Creates a new video store from environment variables.
    ///
    /// Reads `CLOUDFLARE_ACCOUNT_ID`, `R2_ACCESS_KEY_ID`, and
    /// `R2_SECRET_ACCESS_KEY` from the environment; the bucket name
    /// comes from `VIDEO_BUCKET` when set.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MissingEnv`] if any required variable is
    /// unset.
    pub fn from_env() -> Result<Self, StorageError> {
        let account_id = require_env("CLOUDFLARE_ACCOUNT_ID")?;
        let access_key = require_env("R2_ACCESS_KEY_ID")?;
        let secret_key = require_env("R2_SECRET_ACCESS_KEY")?;
        let bucket =
            std::env::var("VIDEO_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string());

        let endpoint = format!("https://{account_id}.r2.cloudflarestorage.com");
        let creds = Credentials::new(&access_key, &secret_key, None, None, "r2-env");

        let config = aws_sdk_s3::Config::builder()
            .endpoint_url(&endpoint)
            .region(Region::new("auto"))
            .credentials_provider(creds)
            .force_path_style(true)
            .stalled_stream_protection(StalledStreamProtectionConfig::disabled())
            .build();

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(config),
            bucket,
        })
    }

    /// Uploads video bytes under the given key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Upload`] on S3 failures.
    pub async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let size = data.len();
        #[allow(clippy::cast_precision_loss)] // display-only MB value
        let mb = size as f64 / 1_048_576.0;
        log::info!("Uploading s3://{}/{key} ({mb:.1} MB)", self.bucket);

        let body = aws_sdk_s3::primitives::ByteStream::from(data);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                source: Box::new(e),
            })?;

        log::info!("  uploaded {key}");
        Ok(())
    }

    /// Generates a presigned GET URL for playback.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Presign`] if URL generation fails.
    pub async fn presigned_playback_url(&self, key: &str) -> Result<String, StorageError> {
        let config = PresigningConfig::expires_in(PLAYBACK_URL_TTL).map_err(|e| {
            StorageError::Presign {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                source: Box::new(e),
            }
        })?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(|e| StorageError::Presign {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                source: Box::new(e),
            })?;

        Ok(request.uri().to_string())
    }

    /// Checks whether an object exists.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Head`] on S3 failures other than
    /// `NotFound`.
    pub async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) => {
                // NotFound is not an error — it means the object doesn't exist
                let service_err = err.as_service_error();
                if service_err
                    .is_some_and(aws_sdk_s3::operation::head_object::HeadObjectError::is_not_found)
                {
                    return Ok(false);
                }
                Err(StorageError::Head {
                    bucket: self.bucket.clone(),
                    key: key.to_string(),
                    source: Box::new(err),
                })
            }
        }
    }

    /// Deletes an object.
    ///
    /// Silently succeeds if the object doesn't exist (S3 `DeleteObject`
    /// is idempotent).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Delete`] on S3 failures.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        log::info!("Deleting s3://{}/{key}", self.bucket);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                source: Box::new(e),
            })?;

        Ok(())
    }

    /// Returns the configured bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Returns the object key a video's bytes are stored under.
#[must_use]
pub fn video_key(video_id: Uuid, file_name: &str) -> String {
    format!("videos/{video_id}/{file_name}")
}

/// Reads a required environment variable.
fn require_env(name: &str) -> Result<String, StorageError> {
    std::env::var(name).map_err(|_| StorageError::MissingEnv {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_keys_are_namespaced_per_video() {
        let id = Uuid::new_v4();
        let key = video_key(id, "lobby.mp4");
        assert_eq!(key, format!("videos/{id}/lobby.mp4"));
    }

    #[test]
    fn missing_env_error_names_the_variable() {
        let err = require_env("CROWDWATCH_TEST_UNSET_VARIABLE").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing environment variable: CROWDWATCH_TEST_UNSET_VARIABLE"
        );
    }
}
