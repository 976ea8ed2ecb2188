//! S3-compatible bucket (AWS or any host speaking the S3 API).

use super::{Listing, ObjectEntry, ObjectMetadata, ObjectStore, StoredObject};
use crate::error::AppError;
use crate::settings::StorageSettings;
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    public_base: String,
}

fn storage_err<E>(op: &str, e: E) -> AppError
where
    E: std::error::Error + Send + Sync + 'static,
{
    AppError::Storage(format!("{}: {}", op, DisplayErrorContext(e)))
}

fn to_chrono(dt: &aws_sdk_s3::primitives::DateTime) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

/// User metadata travels as `x-amz-meta-*` headers, so values are percent-encoded on
/// write and decoded on read. Values that do not decode are returned unchanged.
fn encode_metadata(metadata: &ObjectMetadata) -> ObjectMetadata {
    metadata
        .iter()
        .map(|(k, v)| (k.clone(), urlencoding::encode(v).into_owned()))
        .collect()
}

fn decode_metadata(metadata: Option<&ObjectMetadata>) -> ObjectMetadata {
    metadata
        .into_iter()
        .flatten()
        .map(|(k, v)| {
            let value = urlencoding::decode(v).map(|d| d.into_owned()).unwrap_or_else(|_| v.clone());
            (k.clone(), value)
        })
        .collect()
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: impl Into<String>, public_base: impl Into<String>) -> Self {
        S3ObjectStore {
            client,
            bucket: bucket.into(),
            public_base: public_base.into(),
        }
    }

    /// Client from settings: static credentials when both keys are set, otherwise the
    /// default AWS provider chain; custom endpoint for S3-compatible hosts.
    pub async fn from_settings(settings: &StorageSettings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));
        if let (Some(id), Some(secret)) = (&settings.access_key_id, &settings.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                id.clone(),
                secret.clone(),
                None,
                None,
                "portfolio-settings",
            ));
        }
        let shared = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared).force_path_style(settings.force_path_style);
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        let client = Client::from_conf(builder.build());
        tracing::info!(bucket = %settings.bucket, endpoint = ?settings.endpoint, "object storage configured");
        Self::new(client, settings.bucket.clone(), settings.public_base_url())
    }

    /// Listing does not carry user metadata; fetch it per object. This costs one
    /// HEAD request per listed object on top of the list pages.
    async fn head(&self, key: &str) -> Result<(Option<String>, ObjectMetadata), AppError> {
        let head = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| storage_err("head_object", e))?;
        Ok((
            head.content_type().map(String::from),
            decode_metadata(head.metadata()),
        ))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list(&self, prefix: &str) -> Result<Listing, AppError> {
        let mut listing = Listing::default();
        let mut token: Option<String> = None;
        loop {
            let out = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .delimiter("/")
                .set_continuation_token(token.take())
                .send()
                .await
                .map_err(|e| storage_err("list_objects_v2", e))?;
            for obj in out.contents() {
                let Some(key) = obj.key() else { continue };
                let (content_type, metadata) = self.head(key).await?;
                listing.objects.push(ObjectEntry {
                    key: key.to_string(),
                    size: obj.size().unwrap_or(0).max(0) as u64,
                    last_modified: obj.last_modified().and_then(to_chrono),
                    content_type,
                    metadata,
                });
            }
            listing
                .prefixes
                .extend(out.common_prefixes().iter().filter_map(|p| p.prefix().map(String::from)));
            match out.next_continuation_token() {
                Some(next) if out.is_truncated().unwrap_or(false) => token = Some(next.to_string()),
                _ => break,
            }
        }
        tracing::debug!(prefix, objects = listing.objects.len(), prefixes = listing.prefixes.len(), "listed");
        Ok(listing)
    }

    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
        metadata: &ObjectMetadata,
    ) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .set_content_type(content_type.map(String::from))
            .set_metadata(Some(encode_metadata(metadata)))
            .send()
            .await
            .map_err(|e| storage_err("put_object", e))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, AppError> {
        let out = match self.client.get_object().bucket(&self.bucket).key(key).send().await {
            Ok(out) => out,
            Err(e) => {
                if e.as_service_error().map(|s| s.is_no_such_key()).unwrap_or(false) {
                    return Err(AppError::NotFound(format!("object {}", key)));
                }
                return Err(storage_err("get_object", e));
            }
        };
        let content_type = out.content_type().map(String::from);
        let metadata = decode_metadata(out.metadata());
        let body = out
            .body
            .collect()
            .await
            .map_err(|e| AppError::Storage(format!("get_object body: {}", e)))?
            .into_bytes()
            .to_vec();
        Ok(StoredObject {
            body,
            content_type,
            metadata,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| storage_err("delete_object", e))?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base.trim_end_matches('/'), key)
    }
}
