use async_trait::async_trait;
use aws_sdk_s3::{
    operation::{
        create_bucket::builders::CreateBucketFluentBuilder,
        put_object::builders::PutObjectFluentBuilder,
    },
    primitives::ByteStream,
    types::{
        BucketLocationConstraint, CreateBucketConfiguration, ObjectCannedAcl, ObjectOwnership,
        OwnershipControls,
    },
    Client,
};
use tracing::{debug, info, warn};

use crate::{
    application::services::IconStorage,
    domain::{
        config::app::CloudStorageConfig,
        models::icon::{is_svg_name, StorageBackend, StoredIcon, SVG_MIME_TYPE},
    },
    services::error::StorageError,
};

/// Icon storage on an S3-compatible bucket. Objects are written public-read
/// so the returned URLs can be handed straight to browsers.
pub struct S3IconStorage {
    client: Client,
    bucket: String,
    region: String,
    key_prefix: String,
    public_base_url: String,
}

impl S3IconStorage {
    pub async fn connect(config: &CloudStorageConfig) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder =
            aws_sdk_s3::config::Builder::from(&sdk_config).force_path_style(config.force_path_style);
        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self::new(Client::from_conf(builder.build()), config)
    }

    pub fn new(client: Client, config: &CloudStorageConfig) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            key_prefix: config.key_prefix.clone(),
            public_base_url: config.public_base_url(),
        }
    }

    /// Makes sure the bucket exists and accepts public-read objects, creating
    /// it when missing.
    pub async fn ensure_bucket(&self) -> Result<(), StorageError> {
        info!("Checking bucket '{}'...", self.bucket);

        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => info!("Bucket '{}' is reachable", self.bucket),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => {
                info!("Bucket '{}' does not exist, creating...", self.bucket);
                self.create_bucket_request().send().await?;
                info!("Bucket '{}' created", self.bucket);
            }
            Err(e) => return Err(e.into()),
        }

        self.make_public().await;
        Ok(())
    }

    /// New buckets keep ACLs enabled; the uploads rely on `public-read`.
    fn create_bucket_request(&self) -> CreateBucketFluentBuilder {
        let mut request = self
            .client
            .create_bucket()
            .bucket(&self.bucket)
            .object_ownership(ObjectOwnership::ObjectWriter);
        if self.region != "us-east-1" {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }
        request
    }

    /// Lifts the public access block and warns when the bucket refuses ACLs.
    /// Neither step is fatal: a bucket that stays private only sends uploads
    /// to the local fallback.
    async fn make_public(&self) {
        info!("Making bucket '{}' public...", self.bucket);

        match self
            .client
            .delete_public_access_block()
            .bucket(&self.bucket)
            .send()
            .await
        {
            Ok(_) => info!("Bucket '{}' is now public", self.bucket),
            Err(e) => warn!(
                "Could not remove public access block on '{}': {}",
                self.bucket,
                StorageError::from(e)
            ),
        }

        match self
            .client
            .get_bucket_ownership_controls()
            .bucket(&self.bucket)
            .send()
            .await
        {
            Ok(output) if output.ownership_controls().is_some_and(acls_disabled) => warn!(
                "Bucket '{}' enforces bucket-owner ACLs, public-read uploads will fall back \
                 to local storage",
                self.bucket
            ),
            Ok(_) => {}
            Err(e) => debug!(
                "Could not read ownership controls of '{}': {}",
                self.bucket,
                StorageError::from(e)
            ),
        }
    }

    fn put_object_request(&self, key: &str, content: &[u8]) -> PutObjectFluentBuilder {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(content.to_vec()))
            .content_type(SVG_MIME_TYPE)
            .acl(ObjectCannedAcl::PublicRead)
    }

    fn object_key(&self, provider: &str, filename: &str) -> String {
        join_key(&[&self.key_prefix, provider, filename])
    }

    fn list_prefix(&self, provider: Option<&str>) -> String {
        match provider {
            Some(provider) => format!("{}/", join_key(&[&self.key_prefix, provider])),
            None if self.key_prefix.is_empty() => String::new(),
            None => format!("{}/", self.key_prefix),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    /// Splits `{prefix}/{provider}/.../{name}` into `(provider, name)`.
    fn parse_key<'a>(&self, key: &'a str) -> Option<(&'a str, &'a str)> {
        let relative = if self.key_prefix.is_empty() {
            key
        } else {
            key.strip_prefix(self.key_prefix.as_str())?.strip_prefix('/')?
        };

        let (provider, rest) = relative.split_once('/')?;
        let name = rest.rsplit('/').next()?;
        if provider.is_empty() || name.is_empty() {
            return None;
        }
        Some((provider, name))
    }
}

fn acls_disabled(controls: &OwnershipControls) -> bool {
    controls
        .rules()
        .iter()
        .any(|rule| *rule.object_ownership() == ObjectOwnership::BucketOwnerEnforced)
}

fn join_key(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl IconStorage for S3IconStorage {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Cloud
    }

    async fn store(
        &self,
        provider: &str,
        filename: &str,
        content: &[u8],
    ) -> Result<String, StorageError> {
        let key = self.object_key(provider, filename);

        self.put_object_request(&key, content).send().await?;

        Ok(self.public_url(&key))
    }

    async fn list(&self, provider: Option<&str>) -> Result<Vec<StoredIcon>, StorageError> {
        let prefix = self.list_prefix(provider);
        let mut icons = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let response = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&prefix)
                .set_continuation_token(continuation_token.take())
                .send()
                .await?;

            for object in response.contents() {
                let Some(key) = object.key() else { continue };
                match self.parse_key(key) {
                    Some((provider, name)) if is_svg_name(name) => icons.push(StoredIcon {
                        name: name.to_string(),
                        provider: provider.to_string(),
                        url: self.public_url(key),
                        storage: StorageBackend::Cloud,
                    }),
                    Some(_) => {}
                    None => warn!("Ignoring object outside provider layout: {}", key),
                }
            }

            match response.next_continuation_token() {
                Some(token) => continuation_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(icons)
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_s3::{
        config::{BehaviorVersion, Credentials, Region},
        types::OwnershipControlsRule,
    };

    use super::*;

    fn storage(prefix: &str) -> S3IconStorage {
        storage_in(prefix, "us-east-1")
    }

    fn storage_in(prefix: &str, region: &str) -> S3IconStorage {
        let conf = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(Credentials::new("test", "test", None, None, "tests"))
            .build();

        let config = CloudStorageConfig {
            bucket: "aiicons".to_string(),
            key_prefix: prefix.to_string(),
            region: region.to_string(),
            endpoint: Some("https://storage.googleapis.com".to_string()),
            public_url: None,
            force_path_style: true,
        };

        S3IconStorage::new(Client::from_conf(conf), &config)
    }

    #[test]
    fn keys_are_scoped_by_prefix_and_provider() {
        let s = storage("cloudicons");
        assert_eq!(s.object_key("aws", "lambda.svg"), "cloudicons/aws/lambda.svg");
        assert_eq!(s.list_prefix(Some("aws")), "cloudicons/aws/");
        assert_eq!(s.list_prefix(None), "cloudicons/");
    }

    #[test]
    fn empty_prefix_uses_bucket_root() {
        let s = storage("");
        assert_eq!(s.object_key("aws", "lambda.svg"), "aws/lambda.svg");
        assert_eq!(s.list_prefix(Some("aws")), "aws/");
        assert_eq!(s.list_prefix(None), "");
    }

    #[test]
    fn public_urls_point_at_the_bucket() {
        let s = storage("cloudicons");
        assert_eq!(
            s.public_url("cloudicons/aws/lambda.svg"),
            "https://storage.googleapis.com/aiicons/cloudicons/aws/lambda.svg"
        );
    }

    #[test]
    fn parses_provider_and_name_from_keys() {
        let s = storage("cloudicons");
        assert_eq!(
            s.parse_key("cloudicons/aws/lambda.svg"),
            Some(("aws", "lambda.svg"))
        );
        assert_eq!(
            s.parse_key("cloudicons/aws/nested/lambda.svg"),
            Some(("aws", "lambda.svg"))
        );
        assert_eq!(s.parse_key("cloudicons/stray.svg"), None);
        assert_eq!(s.parse_key("other/aws/lambda.svg"), None);
        assert_eq!(s.parse_key("cloudiconsx/aws/lambda.svg"), None);
    }

    #[test]
    fn new_buckets_keep_acls_enabled() {
        let s = storage("cloudicons");
        let request = s.create_bucket_request();
        let input = request.as_input();

        assert_eq!(input.get_bucket().as_deref(), Some("aiicons"));
        assert_eq!(
            input.get_object_ownership(),
            &Some(ObjectOwnership::ObjectWriter)
        );
        assert!(input.get_create_bucket_configuration().is_none());
    }

    #[test]
    fn buckets_outside_us_east_1_carry_a_location() {
        let s = storage_in("cloudicons", "eu-west-1");
        let request = s.create_bucket_request();

        let location = request
            .as_input()
            .get_create_bucket_configuration()
            .as_ref()
            .and_then(|c| c.location_constraint().cloned());
        assert_eq!(location, Some(BucketLocationConstraint::EuWest1));
    }

    #[test]
    fn objects_are_written_public_read_as_svg() {
        let s = storage("cloudicons");
        let request = s.put_object_request("cloudicons/aws/lambda.svg", b"<svg/>");
        let input = request.as_input();

        assert_eq!(input.get_key().as_deref(), Some("cloudicons/aws/lambda.svg"));
        assert_eq!(input.get_acl(), &Some(ObjectCannedAcl::PublicRead));
        assert_eq!(input.get_content_type().as_deref(), Some(SVG_MIME_TYPE));
    }

    #[test]
    fn detects_buckets_with_acls_disabled() {
        let controls = |ownership: ObjectOwnership| {
            OwnershipControls::builder()
                .rules(
                    OwnershipControlsRule::builder()
                        .object_ownership(ownership)
                        .build()
                        .unwrap(),
                )
                .build()
                .unwrap()
        };

        assert!(acls_disabled(&controls(ObjectOwnership::BucketOwnerEnforced)));
        assert!(!acls_disabled(&controls(ObjectOwnership::ObjectWriter)));
        assert!(!acls_disabled(&controls(ObjectOwnership::BucketOwnerPreferred)));
    }
}
