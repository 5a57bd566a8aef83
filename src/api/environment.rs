use std::fmt;

use strum::{Display, EnumString};
use tracing::warn;

/// The API version used when none (or an empty one) is given.
pub const DEFAULT_API_VERSION: &str = "v2";

const SANDBOX_DOMAIN: &str = "https://sandbox-api.dexcom.com";
const SANDBOX_DOMAIN_OUS: &str = "https://sandbox-api.dexcom.eu";
const PRODUCTION_DOMAIN: &str = "https://api.dexcom.com";
const PRODUCTION_DOMAIN_OUS: &str = "https://api.dexcom.eu";

/// Which Dexcom environment requests are sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// Test data, issued to registered developer applications.
    Sandbox,
    /// Live patient data.
    #[default]
    Production,
}

impl Mode {
    /// Parses a mode name, falling back to production for anything unrecognized.
    pub fn parse_lossy(mode: &str) -> Self {
        mode.parse().unwrap_or_default()
    }

    /// The fixed domain for this mode, in the US or outside-US region.
    pub fn domain_url(self, is_ous: bool) -> &'static str {
        match (self, is_ous) {
            (Mode::Sandbox, false) => SANDBOX_DOMAIN,
            (Mode::Sandbox, true) => SANDBOX_DOMAIN_OUS,
            (Mode::Production, false) => PRODUCTION_DOMAIN,
            (Mode::Production, true) => PRODUCTION_DOMAIN_OUS,
        }
    }
}

/// Everything a [`Client`](super::Client) needs to know about where and how to send requests.
///
/// The domain and versioned base URL are derived together from the mode,
/// API version and region, and are only ever replaced as a pair.
/// Reconfiguring produces a new value rather than mutating in place.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    access_token: Option<String>,
    mode: Mode,
    api_version: String,
    is_ous: bool,
    /// Set when pointed somewhere other than the four Dexcom domains.
    custom_domain: bool,
    domain_url: String,
    base_url: String,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("mode", &self.mode)
            .field("api_version", &self.api_version)
            .field("is_ous", &self.is_ous)
            .field("custom_domain", &self.custom_domain)
            .field("domain_url", &self.domain_url)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("", Mode::Production, DEFAULT_API_VERSION, false)
    }
}

impl ClientConfig {
    /// Creates a configuration. An empty token means no token; an empty version means `v2`.
    pub fn new(access_token: &str, mode: Mode, api_version: &str, is_ous: bool) -> Self {
        let mut config = Self {
            access_token: None,
            mode,
            api_version: String::new(),
            is_ous,
            custom_domain: false,
            domain_url: String::new(),
            base_url: String::new(),
        }
        .with_access_token(access_token);
        config.derive_urls(mode, Some(api_version), is_ous);
        config
    }

    /// Re-derives the domain and base URL for the given mode, version and region.
    ///
    /// An omitted version falls back to the default, and an omitted region keeps the current one.
    /// Any custom domain set through [`with_domain_url`](Self::with_domain_url) is discarded.
    pub fn with_base_url(
        mut self,
        mode: Mode,
        api_version: Option<&str>,
        is_ous: Option<bool>,
    ) -> Self {
        let is_ous = is_ous.unwrap_or(self.is_ous);
        self.derive_urls(mode, api_version, is_ous);
        self
    }

    /// Replaces the bearer token. An empty string clears it.
    pub fn with_access_token(mut self, access_token: &str) -> Self {
        self.access_token = if access_token.is_empty() {
            None
        } else {
            Some(access_token.to_string())
        };
        self
    }

    /// Replaces the region flag without touching the derived URLs.
    ///
    /// Call [`with_base_url`](Self::with_base_url) afterwards for the change to
    /// reach outgoing requests; [`is_region_stale`](Self::is_region_stale) reports
    /// whether that is still needed.
    pub fn with_ous(mut self, is_ous: bool) -> Self {
        self.is_ous = is_ous;
        if self.is_region_stale() {
            warn!(
                is_ous,
                domain_url = %self.domain_url,
                "region flag changed but base URL was not re-derived"
            );
        }
        self
    }

    /// Points requests at an arbitrary domain, such as a proxy or a mock server.
    ///
    /// The configured API version is still appended to form the base URL.
    pub fn with_domain_url(mut self, domain_url: &str) -> Self {
        self.custom_domain = true;
        self.domain_url = domain_url.trim_end_matches('/').to_string();
        self.base_url = format!("{}/{}", self.domain_url, self.api_version);
        self
    }

    /// Whether the region flag disagrees with the domain requests currently go to.
    pub fn is_region_stale(&self) -> bool {
        !self.custom_domain && self.domain_url != self.mode.domain_url(self.is_ous)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn is_ous(&self) -> bool {
        self.is_ous
    }

    /// The scheme and host, e.g. `https://api.dexcom.com`.
    pub fn domain_url(&self) -> &str {
        &self.domain_url
    }

    /// The domain plus version segment, e.g. `https://api.dexcom.com/v2`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn derive_urls(&mut self, mode: Mode, api_version: Option<&str>, is_ous: bool) {
        let api_version = match api_version {
            Some(version) if !version.is_empty() => version,
            _ => DEFAULT_API_VERSION,
        };

        self.mode = mode;
        self.api_version = api_version.to_string();
        self.is_ous = is_ous;
        self.custom_domain = false;
        self.domain_url = mode.domain_url(is_ous).to_string();
        self.base_url = format!("{}/{}", self.domain_url, self.api_version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_default_is_production_us_v2() {
        let config = ClientConfig::default();
        assert_eq!(config.mode(), Mode::Production);
        assert_eq!(config.domain_url(), "https://api.dexcom.com");
        assert_eq!(config.base_url(), "https://api.dexcom.com/v2");
        assert_eq!(config.access_token(), None);
        assert!(!config.is_ous());
    }

    #[test]
    fn test_every_mode_and_region() {
        let cases = [
            (Mode::Sandbox, false, "https://sandbox-api.dexcom.com"),
            (Mode::Sandbox, true, "https://sandbox-api.dexcom.eu"),
            (Mode::Production, false, "https://api.dexcom.com"),
            (Mode::Production, true, "https://api.dexcom.eu"),
        ];

        for (mode, is_ous, domain) in cases {
            let config = ClientConfig::default().with_base_url(mode, Some("v3"), Some(is_ous));
            assert_eq!(config.domain_url(), domain);
            assert_eq!(config.base_url(), format!("{domain}/v3"));
            assert!(!config.is_region_stale());
        }
    }

    #[test]
    fn test_omitted_version_falls_back_to_default() {
        let config = ClientConfig::new("", Mode::Sandbox, "v3", false)
            .with_base_url(Mode::Sandbox, None, None);
        assert_eq!(config.api_version(), "v2");
        assert_eq!(config.base_url(), "https://sandbox-api.dexcom.com/v2");

        let config = ClientConfig::new("", Mode::Sandbox, "", false);
        assert_eq!(config.base_url(), "https://sandbox-api.dexcom.com/v2");
    }

    #[test]
    fn test_omitted_region_keeps_current() {
        let config = ClientConfig::new("", Mode::Sandbox, "v2", true)
            .with_base_url(Mode::Production, None, None);
        assert_eq!(config.base_url(), "https://api.dexcom.eu/v2");
    }

    #[test]
    fn test_unknown_mode_falls_back_to_production() {
        assert_eq!(Mode::parse_lossy("sandbox"), Mode::Sandbox);
        assert_eq!(Mode::parse_lossy("production"), Mode::Production);
        assert_eq!(Mode::parse_lossy("staging"), Mode::Production);
        assert_eq!(Mode::parse_lossy(""), Mode::Production);
        assert_eq!(Mode::Sandbox.to_string(), "sandbox");
    }

    #[test]
    fn test_empty_token_is_no_token() {
        let config = ClientConfig::default().with_access_token("abc");
        assert_eq!(config.access_token(), Some("abc"));
        assert_eq!(config.with_access_token("").access_token(), None);
    }

    #[test]
    #[traced_test]
    fn test_region_change_does_not_rederive_urls() {
        let config = ClientConfig::default().with_ous(true);
        assert!(config.is_ous());
        assert_eq!(config.base_url(), "https://api.dexcom.com/v2");
        assert!(config.is_region_stale());
        assert!(logs_contain("region flag changed but base URL was not re-derived"));

        let config = config.with_base_url(Mode::Production, None, None);
        assert_eq!(config.base_url(), "https://api.dexcom.eu/v2");
        assert!(!config.is_region_stale());
    }

    #[test]
    fn test_debug_hides_access_token() {
        let config = ClientConfig::default().with_access_token("very-secret-token");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("very-secret-token"));
        assert!(rendered.contains("access_token: Some(\"<redacted>\")"));

        let rendered = format!("{:?}", ClientConfig::default());
        assert!(rendered.contains("access_token: None"));
    }

    #[test]
    fn test_custom_domain() {
        let config = ClientConfig::new("", Mode::Sandbox, "v3", false)
            .with_domain_url("http://127.0.0.1:8080/");
        assert_eq!(config.domain_url(), "http://127.0.0.1:8080");
        assert_eq!(config.base_url(), "http://127.0.0.1:8080/v3");
        assert!(!config.with_ous(true).is_region_stale());
    }
}
