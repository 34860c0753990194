//! S3-backed object storage for uploaded images and PDFs. Rows store the
//! public object URL; deletes derive the key back from that URL.

use crate::error::AppError;
use crate::settings::Settings;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use uuid::Uuid;

#[derive(Clone)]
pub struct ObjectStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
    region: String,
}

impl ObjectStorage {
    pub async fn connect(settings: &Settings) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(settings.aws_region.clone()))
            .load()
            .await;
        ObjectStorage {
            client: aws_sdk_s3::Client::new(&config),
            bucket: settings.aws_bucket.clone(),
            region: settings.aws_region.clone(),
        }
    }

    /// Public URL for a key in the configured bucket.
    pub fn object_url(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket, self.region, key
        )
    }

    /// Upload one object and return its public URL.
    pub async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("put {key}: {}", DisplayErrorContext(&e))))?;
        tracing::debug!(key, "object stored");
        Ok(self.object_url(key))
    }

    /// Delete the object a stored URL points at. URLs that do not look like
    /// bucket URLs are skipped with a warning so row deletes still go through.
    pub async fn delete_url(&self, url: &str) -> Result<(), AppError> {
        let Some(key) = key_from_url(url) else {
            tracing::warn!(url, "no object key in stored url; skipping delete");
            return Ok(());
        };
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("delete {key}: {}", DisplayErrorContext(&e))))?;
        tracing::debug!(key, "object deleted");
        Ok(())
    }

    /// Delete on cleanup paths that must not fail the request; failures are
    /// logged and dropped.
    pub async fn delete_url_logged(&self, url: &str) {
        if let Err(e) = self.delete_url(url).await {
            tracing::warn!(url, error = %e, "object delete failed");
        }
    }
}

/// Object key from a stored public URL.
pub fn key_from_url(url: &str) -> Option<&str> {
    url.split_once(".com/").map(|(_, key)| key)
}

/// Extension of an uploaded file name, including the dot. Dotless names and
/// bare dotfiles yield an empty extension.
pub fn file_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => "",
        Some(i) => &file_name[i..],
    }
}

/// Random object name that keeps the upload's extension.
pub fn unique_object_name(file_name: &str) -> String {
    format!("{}{}", Uuid::new_v4(), file_extension(file_name))
}

/// Object name prefixed with an underscored title, for documents that should
/// stay recognizable in the bucket listing.
pub fn titled_object_name(title: &str, file_name: &str) -> String {
    let slug: Vec<&str> = title.split_whitespace().collect();
    format!(
        "{}_{}{}",
        slug.join("_"),
        Uuid::new_v4(),
        file_extension(file_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_keeps_the_dot() {
        assert_eq!(file_extension("photo.png"), ".png");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
    }

    #[test]
    fn dotless_and_hidden_names_have_no_extension() {
        assert_eq!(file_extension("README"), "");
        assert_eq!(file_extension(".env"), "");
    }

    #[test]
    fn unique_names_preserve_extension() {
        let name = unique_object_name("paper.pdf");
        assert!(name.ends_with(".pdf"));
        assert_eq!(name.len(), 36 + ".pdf".len());
    }

    #[test]
    fn titled_names_underscore_whitespace() {
        let name = titled_object_name("Model Paper 2024", "q.pdf");
        assert!(name.starts_with("Model_Paper_2024_"));
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn key_round_trips_through_url() {
        let url = "https://bucket.s3.ap-south-1.amazonaws.com/banners/abc.png";
        assert_eq!(key_from_url(url), Some("banners/abc.png"));
        assert_eq!(key_from_url("not a url"), None);
    }
}
