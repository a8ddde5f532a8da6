use crate::app_config::{AppConfig, Environment, MediaCredentials};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("HEMCAT_ENV", "development"));
    let log_level = or_default("HEMCAT_LOG_LEVEL", "info");

    let catalogues_path = PathBuf::from(or_default(
        "HEMCAT_CATALOGUES_PATH",
        "./config/catalogues.yaml",
    ));
    let overlay_path = PathBuf::from(or_default(
        "HEMCAT_OVERLAY_PATH",
        "./data/products_db.json",
    ));
    let legacy_custom_path = PathBuf::from(or_default(
        "HEMCAT_LEGACY_CUSTOM_PATH",
        "./custom_products.json",
    ));

    let media = match (
        optional("CLOUDINARY_CLOUD_NAME"),
        optional("CLOUDINARY_API_KEY"),
    ) {
        (Some(cloud_name), Some(api_key)) => Some(MediaCredentials {
            cloud_name,
            api_key,
            api_secret: optional("CLOUDINARY_API_SECRET"),
        }),
        (None, None) => None,
        (Some(_), None) => {
            return Err(ConfigError::MissingEnvVar("CLOUDINARY_API_KEY".to_string()))
        }
        (None, Some(_)) => {
            return Err(ConfigError::MissingEnvVar(
                "CLOUDINARY_CLOUD_NAME".to_string(),
            ))
        }
    };

    let media_api_base = or_default("HEMCAT_MEDIA_API_BASE", "https://api.cloudinary.com/v1_1");
    let media_request_timeout_secs = parse_u64("HEMCAT_MEDIA_REQUEST_TIMEOUT_SECS", "10")?;
    let image_timeout_secs = parse_u64("HEMCAT_IMAGE_TIMEOUT_SECS", "8")?;
    let media_max_retries = parse_u32("HEMCAT_MEDIA_MAX_RETRIES", "2")?;
    let media_retry_backoff_ms = parse_u64("HEMCAT_MEDIA_RETRY_BACKOFF_MS", "500")?;
    let media_page_size = parse_u32("HEMCAT_MEDIA_PAGE_SIZE", "500")?;
    let media_user_agent = or_default("HEMCAT_MEDIA_USER_AGENT", "hemcat/0.1 (catalogue-sync)");
    let image_transform = or_default("HEMCAT_IMAGE_TRANSFORM", "w_800,q_auto");
    let image_concurrency = parse_usize("HEMCAT_IMAGE_CONCURRENCY", "4")?;
    let backup_public_id = or_default("HEMCAT_BACKUP_PUBLIC_ID", "app_data/products_db");

    if media_page_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "HEMCAT_MEDIA_PAGE_SIZE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if image_concurrency == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "HEMCAT_IMAGE_CONCURRENCY".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        catalogues_path,
        overlay_path,
        legacy_custom_path,
        media,
        media_api_base,
        media_request_timeout_secs,
        image_timeout_secs,
        media_max_retries,
        media_retry_backoff_ms,
        media_page_size,
        media_user_agent,
        image_transform,
        image_concurrency,
        backup_public_id,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
