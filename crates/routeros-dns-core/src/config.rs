//! Configuration types for the RouterOS DNS provider
//!
//! This module defines all configuration structures used throughout the crate.
//! Construction never talks to the router; [`ProviderConfig::validate`] only
//! checks that the values are usable so bad settings fail fast at startup.

use serde::{Deserialize, Serialize};

/// Environment variable prefix used by [`ProviderConfig::from_env`]
pub const ENV_PREFIX: &str = "EXTERNAL_DNS_ROUTEROS_PROVIDER_";

/// Main provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Router connection settings
    pub router: RouterConfig,

    /// Domains external-dns should act on
    #[serde(default)]
    pub domain_filter: DomainFilterConfig,
}

impl ProviderConfig {
    /// Create a configuration with an empty domain filter
    pub fn new(router: RouterConfig) -> Self {
        Self {
            router,
            domain_filter: DomainFilterConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.router.validate()?;
        self.domain_filter.validate()?;
        Ok(())
    }

    /// Load configuration from the process environment
    ///
    /// ## Variables
    ///
    /// - `EXTERNAL_DNS_ROUTEROS_PROVIDER_ROUTEROS_ADDRESS`: `<host>:<port>`
    /// - `EXTERNAL_DNS_ROUTEROS_PROVIDER_ROUTEROS_USERNAME`
    /// - `EXTERNAL_DNS_ROUTEROS_PROVIDER_ROUTEROS_PASSWORD`
    /// - `EXTERNAL_DNS_ROUTEROS_PROVIDER_FILTER_INCLUDE`: comma separated
    /// - `EXTERNAL_DNS_ROUTEROS_PROVIDER_FILTER_EXCLUDE`: comma separated
    /// - `EXTERNAL_DNS_ROUTEROS_PROVIDER_FILTER_REGEX_INCLUDE`
    /// - `EXTERNAL_DNS_ROUTEROS_PROVIDER_FILTER_REGEX_EXCLUDE`
    pub fn from_env() -> Result<Self, crate::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// `lookup` receives the full variable name including [`ENV_PREFIX`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, crate::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.is_empty());
        let list = |name: &str| {
            var(name)
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect::<Vec<String>>()
                })
                .unwrap_or_default()
        };

        let address = var("ROUTEROS_ADDRESS").ok_or_else(|| {
            crate::Error::config(format!("{ENV_PREFIX}ROUTEROS_ADDRESS is required"))
        })?;

        let config = Self {
            router: RouterConfig {
                address,
                username: var("ROUTEROS_USERNAME").unwrap_or_default(),
                password: var("ROUTEROS_PASSWORD").unwrap_or_default(),
            },
            domain_filter: DomainFilterConfig {
                include: list("FILTER_INCLUDE"),
                exclude: list("FILTER_EXCLUDE"),
                regex_include: var("FILTER_REGEX_INCLUDE"),
                regex_exclude: var("FILTER_REGEX_EXCLUDE"),
            },
        };

        config.validate()?;
        Ok(config)
    }
}

/// Router connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// API address in `<host>:<port>` form
    pub address: String,

    /// API username
    #[serde(default)]
    pub username: String,

    /// API password
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub password: String,
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterConfig")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

impl RouterConfig {
    /// Create router settings
    pub fn new(
        address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Validate the address
    ///
    /// The address must split into exactly a host and a port, and the port
    /// must fit an unsigned 16-bit number.
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.host_port().map(|_| ())
    }

    /// Split the address into host and port
    pub fn host_port(&self) -> Result<(&str, u16), crate::Error> {
        let parts: Vec<&str> = self.address.split(':').collect();
        let [host, port] = parts.as_slice() else {
            return Err(crate::Error::config(format!(
                "address not <host>:<port> format: {:?}",
                self.address
            )));
        };

        if host.is_empty() {
            return Err(crate::Error::config(format!(
                "address has an empty host: {:?}",
                self.address
            )));
        }

        let port: u16 = port
            .parse()
            .map_err(|e| crate::Error::config(format!("port invalid: {port:?}: {e}")))?;

        Ok((*host, port))
    }
}

/// Domain filter settings
///
/// When either regex is set the lists are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainFilterConfig {
    /// Domains to include
    #[serde(default)]
    pub include: Vec<String>,

    /// Domains to exclude
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Regex of domains to include
    #[serde(default)]
    pub regex_include: Option<String>,

    /// Regex of domains to exclude
    #[serde(default)]
    pub regex_exclude: Option<String>,
}

impl DomainFilterConfig {
    /// Validate the filter (regexes must compile)
    pub fn validate(&self) -> Result<(), crate::Error> {
        crate::filter::DomainFilter::try_from(self).map(|_| ())
    }

    /// Whether a regex filter is configured
    pub fn uses_regex(&self) -> bool {
        self.regex_include.is_some() || self.regex_exclude.is_some()
    }
}
