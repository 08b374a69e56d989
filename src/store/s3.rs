//! S3 implementation of the [ObjectStore] trait.

use std::io::{Cursor, Read};

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tokio::runtime::Runtime;

use crate::config::S3Config;
use crate::store::{ObjectStore, StoreError};

/// Blocking facade over the async AWS SDK, scoped to one bucket.
///
/// All calls run to completion on an owned current-thread runtime, matching
/// the one-operation-at-a-time model of the rest of the tool.
pub struct S3Store {
    runtime: Runtime,
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    pub fn new(cfg: &S3Config) -> Result<Self, StoreError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::new(e.to_string()))?;

        let credentials = Credentials::new(
            cfg.access_key_id.clone(),
            cfg.secret_access_key.clone(),
            None,
            None,
            "pg_backup",
        );

        // the region is meaningless for path-style S3-compatible endpoints
        // but the SDK insists on one
        let conf = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url(cfg.endpoint_url())
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let client = aws_sdk_s3::Client::from_conf(conf);

        Ok(Self {
            runtime,
            client,
            bucket: cfg.bucket.clone(),
        })
    }
}

impl ObjectStore for S3Store {
    fn put(&self, name: &str, data: &mut dyn Read) -> Result<(), StoreError> {
        let mut blob = Vec::new();
        data.read_to_end(&mut blob)
            .map_err(|e| StoreError::new(e.to_string()))?;

        log::debug!(target: "store::s3", "Uploading {name} ({} bytes)", blob.len());
        self.runtime
            .block_on(
                self.client
                    .put_object()
                    .bucket(&self.bucket)
                    .key(name)
                    .body(ByteStream::from(blob))
                    .send(),
            )
            .map_err(|e| StoreError::new(DisplayErrorContext(e).to_string()))?;

        Ok(())
    }

    fn get(&self, name: &str) -> Result<Box<dyn Read>, StoreError> {
        log::debug!(target: "store::s3", "Downloading {name}");
        let resp = self
            .runtime
            .block_on(
                self.client
                    .get_object()
                    .bucket(&self.bucket)
                    .key(name)
                    .send(),
            )
            .map_err(|e| StoreError::new(DisplayErrorContext(e).to_string()))?;

        let blob = self
            .runtime
            .block_on(resp.body.collect())
            .map_err(|e| StoreError::new(e.to_string()))?;

        Ok(Box::new(Cursor::new(blob.into_bytes())))
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(&self.bucket);
            if let Some(token) = &continuation {
                request = request.continuation_token(token);
            }

            let resp = self
                .runtime
                .block_on(request.send())
                .map_err(|e| StoreError::new(DisplayErrorContext(e).to_string()))?;

            names.extend(
                resp.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            match resp.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }

        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<(), StoreError> {
        log::debug!(target: "store::s3", "Deleting {name}");
        self.runtime
            .block_on(
                self.client
                    .delete_object()
                    .bucket(&self.bucket)
                    .key(name)
                    .send(),
            )
            .map_err(|e| StoreError::new(DisplayErrorContext(e).to_string()))?;

        Ok(())
    }
}
