use std::env;
use std::path::PathBuf;

/// Connection settings for an S3-compatible bucket
#[derive(Clone, Debug, PartialEq)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for self-hosted services; AWS when absent
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

/// Where blobs (covers, thumbnails, assets) are kept
#[derive(Clone, Debug, PartialEq)]
pub enum StorageBackend {
    Filesystem { root: PathBuf },
    S3(S3Settings),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub storage: StorageBackend,
    pub seed_demo_data: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://barn.db?mode=rwc".to_string());

        let storage = match env::var("STORAGE_BACKEND").as_deref() {
            Ok("s3") => StorageBackend::S3(S3Settings {
                bucket: env::var("AWS_STORAGE_BUCKET_NAME").unwrap_or_else(|_| "barn".to_string()),
                region: env::var("AWS_S3_REGION_NAME").unwrap_or_else(|_| "us-east-1".to_string()),
                endpoint: env::var("AWS_S3_ENDPOINT_URL").ok(),
                access_key: env::var("AWS_ACCESS_KEY_ID").ok(),
                secret_key: env::var("AWS_SECRET_ACCESS_KEY").ok(),
            }),
            _ => StorageBackend::Filesystem {
                root: env::var("MEDIA_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./media")),
            },
        };

        Self {
            database_url,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(5),
            storage,
            seed_demo_data: env::var("SEED_DEMO_DATA")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 10] = [
        "DATABASE_URL",
        "DATABASE_MAX_CONNECTIONS",
        "STORAGE_BACKEND",
        "MEDIA_ROOT",
        "AWS_STORAGE_BUCKET_NAME",
        "AWS_S3_REGION_NAME",
        "AWS_S3_ENDPOINT_URL",
        "AWS_ACCESS_KEY_ID",
        "AWS_SECRET_ACCESS_KEY",
        "SEED_DEMO_DATA",
    ];

    fn clear_env() {
        for var in VARS {
            // SAFETY: tests touching the environment are serialized
            unsafe { env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn defaults_to_local_sqlite_and_filesystem() {
        clear_env();
        let config = Config::from_env();
        assert_eq!(config.database_url, "sqlite://barn.db?mode=rwc");
        assert_eq!(config.max_connections, 5);
        assert_eq!(
            config.storage,
            StorageBackend::Filesystem {
                root: PathBuf::from("./media")
            }
        );
        assert!(!config.seed_demo_data);
    }

    #[test]
    #[serial]
    fn reads_s3_settings() {
        clear_env();
        unsafe {
            env::set_var("STORAGE_BACKEND", "s3");
            env::set_var("AWS_STORAGE_BUCKET_NAME", "library-media");
            env::set_var("AWS_S3_ENDPOINT_URL", "http://localhost:9000");
            env::set_var("SEED_DEMO_DATA", "true");
        }
        let config = Config::from_env();
        match config.storage {
            StorageBackend::S3(settings) => {
                assert_eq!(settings.bucket, "library-media");
                assert_eq!(settings.region, "us-east-1");
                assert_eq!(settings.endpoint.as_deref(), Some("http://localhost:9000"));
                assert_eq!(settings.access_key, None);
            }
            other => panic!("expected S3 backend, got {:?}", other),
        }
        assert!(config.seed_demo_data);
        clear_env();
    }
}
