use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::config::Config;
use crate::error::{Error, Result};

/// Object storage for company logos and resumes, S3-compatible with
/// path-style addressing. Uploaded objects are served from a public base URL.
#[derive(Clone)]
pub struct StorageService {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl StorageService {
    pub fn new(config: &Config) -> Self {
        let credentials = Credentials::new(
            &config.storage_access_key_id,
            &config.storage_secret_access_key,
            None,
            None,
            "projecthire",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.storage_endpoint_url)
            .region(Region::new(config.storage_region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            bucket: config.storage_bucket.clone(),
            public_base_url: config.storage_public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn upload_bytes(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|err| Error::Storage(format!("upload of {} failed: {}", key, err)))?;

        tracing::debug!(key, "object uploaded");
        Ok(self.public_url(key))
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}
