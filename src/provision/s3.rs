use std::time::Duration;

use chrono::Utc;
use url::Url;

use crate::core::StorageSettings;
use crate::error::ProvisionError;

use super::ObjectStore;
use super::sigv4::{Credentials, encode_segment, sha256_hex, sign_request};

/// S3-compatible store (MinIO in the stock deployment), path-style addressing
pub(crate) struct S3ObjectStore {
    endpoint: String,
    region: String,
    access_key: Option<String>,
    secret_key: Option<String>,
    agent: ureq::Agent,
}

impl S3ObjectStore {
    pub(crate) fn new(settings: &StorageSettings, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            endpoint: settings.endpoint.clone(),
            region: settings.region.clone(),
            access_key: settings.access_key.clone(),
            secret_key: settings.secret_key.clone(),
            agent,
        }
    }

    fn endpoint_error(&self, reason: impl Into<String>) -> ProvisionError {
        ProvisionError::Endpoint {
            endpoint: self.endpoint.clone(),
            reason: reason.into(),
        }
    }

    /// Request URL plus the host header value S3 will see
    fn object_url(&self, bucket: &str, key: &str) -> Result<(Url, String), ProvisionError> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| self.endpoint_error(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(self.endpoint_error("scheme must be http or https"));
        }
        let host = url
            .host_str()
            .ok_or_else(|| self.endpoint_error("missing host"))?
            .to_string();
        // Url drops default ports, and so does the Host header ureq sends
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host,
        };

        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base}{}", canonical_path(bucket, key)));
        url.set_query(None);
        Ok((url, host))
    }
}

/// `/bucket/segment/.../` with every segment encoded and slashes kept
fn canonical_path(bucket: &str, key: &str) -> String {
    let encoded_key: Vec<String> = key.split('/').map(encode_segment).collect();
    format!("/{}/{}", encode_segment(bucket), encoded_key.join("/"))
}

impl ObjectStore for S3ObjectStore {
    fn put_marker(&self, bucket: &str, key: &str) -> Result<(), ProvisionError> {
        let (url, host) = self.object_url(bucket, key)?;
        let mut request = self.agent.put(url.as_str());

        match (&self.access_key, &self.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                let signed = sign_request(
                    "PUT",
                    &host,
                    url.path(),
                    b"",
                    &self.region,
                    &Credentials {
                        access_key,
                        secret_key,
                    },
                    Utc::now(),
                );
                request = request
                    .header("x-amz-date", &signed.amz_date)
                    .header("x-amz-content-sha256", &signed.content_sha256)
                    .header("authorization", &signed.authorization);
            }
            _ => {
                tracing::debug!("no object store credentials, sending unsigned request");
                request = request.header("x-amz-content-sha256", &sha256_hex(b""));
            }
        }

        match request.send_empty() {
            Ok(_) => Ok(()),
            Err(ureq::Error::StatusCode(status)) => Err(ProvisionError::StorageStatus {
                bucket: bucket.to_string(),
                key: key.to_string(),
                status,
            }),
            Err(source) => Err(ProvisionError::StorageTransport {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source,
            }),
        }
    }
}
