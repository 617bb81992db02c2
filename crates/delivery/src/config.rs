use std::time::Duration;

/// Default endpoint used when `SINK_ENDPOINT_URL` is unset.
pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:8000/api/v1/upload-annotations";

/// Default endpoint request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default bucket region.
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub url: String,
    pub timeout: Duration,
}

/// Static credentials that bypass the default AWS provider chain.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketConfig {
    pub bucket: String,
    pub region: String,
    /// S3-compatible endpoint (MinIO, R2, ...). Enables path-style addressing.
    pub endpoint_url: Option<String>,
    pub credentials: Option<StaticCredentials>,
}

/// Remote sink selection, read once at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkConfig {
    Endpoint(EndpointConfig),
    Bucket(BucketConfig),
}

impl SinkConfig {
    /// Load the sink configuration from environment variables.
    ///
    /// | Env Var                | Default                                            |
    /// |------------------------|----------------------------------------------------|
    /// | `SINK_KIND`            | `endpoint` (`endpoint` or `s3`)                    |
    /// | `SINK_ENDPOINT_URL`    | `http://localhost:8000/api/v1/upload-annotations`  |
    /// | `SINK_TIMEOUT_SECS`    | `30`                                               |
    /// | `S3_BUCKET`            | required for `s3`                                  |
    /// | `S3_REGION`            | `us-east-1`                                        |
    /// | `S3_ENDPOINT_URL`      | unset                                              |
    /// | `S3_ACCESS_KEY_ID`     | unset (default AWS credential chain)               |
    /// | `S3_SECRET_ACCESS_KEY` | unset (default AWS credential chain)               |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let kind = get("SINK_KIND").unwrap_or_else(|| "endpoint".into());

        match kind.to_ascii_lowercase().as_str() {
            "endpoint" => {
                let url = get("SINK_ENDPOINT_URL").unwrap_or_else(|| DEFAULT_ENDPOINT_URL.into());
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::Invalid {
                        var: "SINK_ENDPOINT_URL",
                        value: url,
                        reason: "must start with http:// or https://",
                    });
                }

                let timeout_secs = match get("SINK_TIMEOUT_SECS") {
                    Some(raw) => raw.parse::<u64>().ok().filter(|s| *s > 0).ok_or(
                        ConfigError::Invalid {
                            var: "SINK_TIMEOUT_SECS",
                            value: raw,
                            reason: "must be a positive integer",
                        },
                    )?,
                    None => DEFAULT_TIMEOUT_SECS,
                };

                Ok(Self::Endpoint(EndpointConfig {
                    url,
                    timeout: Duration::from_secs(timeout_secs),
                }))
            }
            "s3" => {
                let bucket = get("S3_BUCKET").ok_or(ConfigError::Missing("S3_BUCKET"))?;
                let region = get("S3_REGION").unwrap_or_else(|| DEFAULT_REGION.into());
                let endpoint_url = get("S3_ENDPOINT_URL");

                let credentials = match (get("S3_ACCESS_KEY_ID"), get("S3_SECRET_ACCESS_KEY")) {
                    (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                        access_key_id,
                        secret_access_key,
                    }),
                    (None, None) => None,
                    (Some(_), None) => return Err(ConfigError::Missing("S3_SECRET_ACCESS_KEY")),
                    (None, Some(_)) => return Err(ConfigError::Missing("S3_ACCESS_KEY_ID")),
                };

                Ok(Self::Bucket(BucketConfig {
                    bucket,
                    region,
                    endpoint_url,
                    credentials,
                }))
            }
            _ => Err(ConfigError::Invalid {
                var: "SINK_KIND",
                value: kind,
                reason: "must be 'endpoint' or 's3'",
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
