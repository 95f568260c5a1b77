use std::fmt;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use url::Url;

pub mod http;

/// A validated http/https URL to be measured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    url: Url,
}

impl Target {
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|e| anyhow!("cannot parse {} as url: {}", raw, e))?;
        match url.scheme() {
            "http" | "https" => Ok(Self { url }),
            _ => bail!("unsupported url scheme in {}", raw),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single request attempt.
#[derive(Debug)]
pub struct RequestOutcome {
    /// Position of the target within its round.
    pub slot: usize,
    pub target: Target,
    pub elapsed: Duration,
    pub error: Option<anyhow::Error>,
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        let t = Target::parse("http://example.com").unwrap();
        assert_eq!(t.as_str(), "http://example.com/");
        assert!(Target::parse("https://example.com/health?x=1").is_ok());
    }

    #[test]
    fn rejects_malformed_url() {
        let err = Target::parse("not a url").unwrap_err();
        assert!(err.to_string().contains("cannot parse not a url as url"));
    }

    #[test]
    fn rejects_unsupported_scheme() {
        let err = Target::parse("ftp://example.com/file").unwrap_err();
        assert!(err.to_string().contains("unsupported url scheme"));
    }
}
