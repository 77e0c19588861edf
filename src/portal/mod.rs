//! Portal environments and base address resolution

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Deployment target the portal is reached at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    #[default]
    Production,
    Europe,
    Staging,
    Qa,
    Development,
    /// Use the caller-supplied custom URL verbatim.
    Custom,
}

impl Environment {
    /// Every environment with a built-in address.
    pub const NAMED: [Environment; 5] = [
        Environment::Production,
        Environment::Europe,
        Environment::Staging,
        Environment::Qa,
        Environment::Development,
    ];

    /// Built-in address for this environment, `None` for `Custom`.
    ///
    /// Scheme and port here are not authoritative: `PortalAddress::resolve`
    /// always forces HTTPS on 443.
    pub fn base_url(self) -> Option<&'static str> {
        match self {
            Environment::Production => Some("https://portal.solverglobal.com"),
            Environment::Europe => Some("https://eu.portal.solverglobal.com"),
            Environment::Staging => Some("https://staging.portal.solverglobal.com"),
            Environment::Qa => Some("https://qa.portal.solverglobal.com"),
            Environment::Development => Some("http://dev.portal.solverglobal.com:8080"),
            Environment::Custom => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Europe => "europe",
            Environment::Staging => "staging",
            Environment::Qa => "qa",
            Environment::Development => "development",
            Environment::Custom => "custom",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "europe" | "eu" => Ok(Environment::Europe),
            "staging" => Ok(Environment::Staging),
            "qa" => Ok(Environment::Qa),
            "development" | "dev" => Ok(Environment::Development),
            "custom" => Ok(Environment::Custom),
            other => Err(Error::InvalidConfiguration(format!(
                "unknown environment '{}'. Use: production, europe, staging, qa, development, custom",
                other
            ))),
        }
    }
}

/// Resolved portal base address, always `https` on port 443.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalAddress {
    base: Url,
}

impl PortalAddress {
    /// Resolve the base address for `environment`.
    ///
    /// `custom_url` is only consulted for `Environment::Custom`. Whatever
    /// scheme and port the source address carries, the result uses HTTPS
    /// on 443.
    pub fn resolve(environment: Environment, custom_url: Option<&str>) -> Result<Self> {
        let source = match environment.base_url() {
            Some(url) => url,
            None => custom_url.unwrap_or_default(),
        }
        .trim();

        if source.is_empty() {
            return Err(Error::InvalidConfiguration(format!(
                "no portal address configured for environment '{}'",
                environment
            )));
        }

        let mut base = parse_address(source).ok_or_else(|| {
            Error::InvalidConfiguration(format!("'{}' is not a valid portal address", source))
        })?;

        if base.scheme() != "https" {
            base.set_scheme("https").map_err(|()| {
                Error::InvalidConfiguration(format!("cannot use HTTPS for '{}'", source))
            })?;
        }
        base.set_port(Some(443)).map_err(|()| {
            Error::InvalidConfiguration(format!("cannot use port 443 for '{}'", source))
        })?;
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Join an endpoint path onto the base address.
    ///
    /// Exactly one `/` separates the base path from `path`, whether or not
    /// either side carries one. A query string in `path` is kept.
    pub fn endpoint(&self, path: &str) -> Url {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };

        let mut url = self.base.clone();
        let joined = format!(
            "{}/{}",
            self.base.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url.set_query(query);
        url
    }
}

impl fmt::Display for PortalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base.as_str())
    }
}

/// Parse an absolute address, treating a bare host as `https://host`.
fn parse_address(source: &str) -> Option<Url> {
    let parsed = if source.contains("://") {
        Url::parse(source).ok()
    } else {
        Url::parse(&format!("https://{}", source)).ok()
    };
    parsed.filter(|url| url.host_str().is_some_and(|host| !host.is_empty()))
}
