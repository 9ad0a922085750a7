//! Configuration validation module.
//!
//! Validates every section at load time and reports all problems at once,
//! failing fast on invalid configuration rather than at runtime.

use crate::AppConfig;
use std::fmt;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Pool size configuration is invalid (min must be <= max).
    InvalidPoolSize { min: u32, max: u32 },
    /// Pool size exceeds maximum allowed.
    PoolSizeTooLarge { value: u32, maximum: u32 },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Timeout value must be positive.
    NonPositiveTimeout { name: String, value: u64 },
    /// A count or width that must be at least one is zero.
    ZeroLimit { name: String },
    /// Order number prefix is empty or contains whitespace.
    InvalidOrderPrefix { value: String },
    /// Cache key prefix is empty.
    EmptyCacheKeyPrefix,
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPoolSize { min, max } => {
                write!(
                    f,
                    "Invalid pool size: min ({}) cannot be greater than max ({})",
                    min, max
                )
            }
            Self::PoolSizeTooLarge { value, maximum } => {
                write!(f, "Pool size {} exceeds maximum allowed ({})", value, maximum)
            }
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {} URL: {}", url_type, message)
            }
            Self::NonPositiveTimeout { name, value } => {
                write!(f, "Timeout '{}' must be positive, got {}", name, value)
            }
            Self::ZeroLimit { name } => write!(f, "'{}' must be at least 1", name),
            Self::InvalidOrderPrefix { value } => {
                write!(
                    f,
                    "Invalid order number prefix '{}' (must be non-empty without whitespace)",
                    value
                )
            }
            Self::EmptyCacheKeyPrefix => write!(f, "Cache key prefix cannot be empty"),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Maximum connection pool size.
    const MAX_POOL_SIZE: u32 = 1000;

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_database(&config.database, &mut errors);
        Self::validate_redis(&config.redis, &mut errors);
        Self::validate_cache(&config.cache, &mut errors);
        Self::validate_sequence(&config.sequence, &mut errors);
        Self::validate_wishlist(&config.wishlist, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_database(config: &crate::DatabaseConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.url.is_empty() {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        } else if !config.url.starts_with("mysql://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URL must start with mysql://".to_string(),
            });
        }

        if config.min_connections > config.max_connections {
            errors.push(ConfigValidationError::InvalidPoolSize {
                min: config.min_connections,
                max: config.max_connections,
            });
        }
        if config.max_connections > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                value: config.max_connections,
                maximum: Self::MAX_POOL_SIZE,
            });
        }

        if config.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "database.connect_timeout_secs".to_string(),
                value: 0,
            });
        }
    }

    fn validate_redis(config: &crate::RedisConfig, errors: &mut Vec<ConfigValidationError>) {
        if !config.enabled {
            return;
        }

        if !config.url.starts_with("redis://") && !config.url.starts_with("rediss://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: "URL must start with redis:// or rediss://".to_string(),
            });
        }

        if config.pool_size > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                value: config.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }
    }

    fn validate_cache(config: &crate::CacheConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.key_prefix.is_empty() {
            errors.push(ConfigValidationError::EmptyCacheKeyPrefix);
        }
        if config.catalog_ttl_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "cache.catalog_ttl_secs".to_string(),
                value: 0,
            });
        }
    }

    fn validate_sequence(config: &crate::SequenceConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.prefix.is_empty() || config.prefix.chars().any(char::is_whitespace) {
            errors.push(ConfigValidationError::InvalidOrderPrefix {
                value: config.prefix.clone(),
            });
        }
        if config.pad_width == 0 {
            errors.push(ConfigValidationError::ZeroLimit {
                name: "sequence.pad_width".to_string(),
            });
        }
        if config.max_attempts == 0 {
            errors.push(ConfigValidationError::ZeroLimit {
                name: "sequence.max_attempts".to_string(),
            });
        }
    }

    fn validate_wishlist(config: &crate::WishlistConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.max_items == 0 {
            errors.push(ConfigValidationError::ZeroLimit {
                name: "wishlist.max_items".to_string(),
            });
        }
    }
}
