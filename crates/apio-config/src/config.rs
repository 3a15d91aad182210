//! The top-level [`ApioConfig`] and its builder.

use apio_routes::PaginationDefaults;
use apio_telemetry::logging::create_env_filter;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, TelemetryConfigSection};

/// Complete Apio application configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use apio_config::ApioConfig;
///
/// let config = ApioConfig::default();
/// assert_eq!(config.pagination.items_per_page, 30);
/// assert_eq!(config.pagination.max_items_per_page, 100);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ApioConfig {
    /// Defaults applied to collection requests without paging parameters.
    #[serde(default)]
    pub pagination: PaginationDefaults,

    /// Telemetry configuration (metrics and logging).
    #[serde(default)]
    pub telemetry: TelemetryConfigSection,
}

impl ApioConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use apio_config::ApioConfig;
    /// use apio_routes::PaginationDefaults;
    ///
    /// let config = ApioConfig::builder()
    ///     .pagination(PaginationDefaults {
    ///         items_per_page: 10,
    ///         max_items_per_page: 50,
    ///     })
    ///     .build();
    ///
    /// assert_eq!(config.pagination.items_per_page, 10);
    /// ```
    #[must_use]
    pub fn builder() -> ApioConfigBuilder {
        ApioConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if:
    /// - A page size is zero, or the default exceeds the maximum
    /// - The service name is blank
    /// - The log level is not a valid filter directive
    /// - Enabled metrics have empty or unordered duration buckets
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pagination = &self.pagination;
        if pagination.items_per_page == 0 {
            return Err(ConfigError::invalid_value(
                "pagination.items_per_page",
                "must be greater than zero",
            ));
        }
        if pagination.max_items_per_page == 0 {
            return Err(ConfigError::invalid_value(
                "pagination.max_items_per_page",
                "must be greater than zero",
            ));
        }
        if pagination.items_per_page > pagination.max_items_per_page {
            return Err(ConfigError::invalid_value(
                "pagination.items_per_page",
                format!(
                    "{} exceeds max_items_per_page ({})",
                    pagination.items_per_page, pagination.max_items_per_page
                ),
            ));
        }

        if self.telemetry.service_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "telemetry.service_name",
                "must not be blank",
            ));
        }

        if self.telemetry.logging.enabled {
            create_env_filter(&self.telemetry.logging.level).map_err(|e| {
                ConfigError::invalid_value("telemetry.logging.level", e.to_string())
            })?;
        }

        let buckets = &self.telemetry.metrics.duration_buckets;
        if self.telemetry.metrics.enabled
            && (buckets.is_empty() || buckets.windows(2).any(|pair| pair[0] >= pair[1]))
        {
            return Err(ConfigError::invalid_value(
                "telemetry.metrics.duration_buckets",
                "must be a non-empty, strictly increasing list",
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// - Pretty log formatting with ANSI colors and source locations
    /// - Debug log level
    ///
    /// # Example
    ///
    /// ```
    /// use apio_config::ApioConfig;
    ///
    /// let config = ApioConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.ansi_enabled = true;
        config.telemetry.logging.include_location = true;
        config.telemetry.environment = "development".to_string();

        config
    }

    /// Create a production configuration preset.
    ///
    /// - JSON log formatting at info level
    ///
    /// # Example
    ///
    /// ```
    /// use apio_config::{ApioConfig, LogFormat};
    ///
    /// let config = ApioConfig::production();
    /// assert_eq!(config.telemetry.logging.format, LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.logging.ansi_enabled = false;
        config.telemetry.environment = "production".to_string();

        config
    }
}

/// Builder for [`ApioConfig`].
#[derive(Debug, Default)]
pub struct ApioConfigBuilder {
    pagination: Option<PaginationDefaults>,
    telemetry: Option<TelemetryConfigSection>,
}

impl ApioConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pagination defaults.
    #[must_use]
    pub fn pagination(mut self, pagination: PaginationDefaults) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Set the telemetry configuration.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetryConfigSection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> ApioConfig {
        ApioConfig {
            pagination: self.pagination.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<ApioConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
