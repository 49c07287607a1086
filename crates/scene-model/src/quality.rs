//! Renderer quality selectors and resolution tokens.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use scenecast_common::error::{ScenecastError, ScenecastResult};

/// Renderer quality selector.
///
/// Unrecognized tokens are kept as [`Quality::Custom`] and handed to the
/// renderer verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Quality {
    /// `l`: 854x480 at 15fps.
    Low,
    /// `m`: 1280x720 at 30fps.
    Medium,
    /// `h`: 1920x1080 at 60fps.
    #[default]
    High,
    /// `k`: 3840x2160 at 60fps.
    Production,
    Custom(String),
}

impl Quality {
    /// Parse a quality token. Never fails.
    pub fn parse(token: &str) -> Self {
        match token {
            "l" => Self::Low,
            "m" => Self::Medium,
            "h" => Self::High,
            "k" => Self::Production,
            other => {
                tracing::warn!(
                    token = other,
                    "Unrecognized quality token, passing it to the renderer unchanged"
                );
                Self::Custom(other.to_string())
            }
        }
    }

    /// The bare token (`l`, `m`, `h`, `k`, or the custom text).
    pub fn token(&self) -> &str {
        match self {
            Self::Low => "l",
            Self::Medium => "m",
            Self::High => "h",
            Self::Production => "k",
            Self::Custom(token) => token,
        }
    }

    /// Renderer command-line flag, e.g. `-qh`.
    pub fn flag(&self) -> String {
        format!("-q{}", self.token())
    }

    /// Output directory name the renderer uses for this quality.
    pub fn resolution_token(&self) -> Option<ResolutionToken> {
        let token = match self {
            Self::Low => "480p15",
            Self::Medium => "720p30",
            Self::High => "1080p60",
            Self::Production => "2160p60",
            Self::Custom(_) => return None,
        };
        Some(ResolutionToken(token.to_string()))
    }
}

impl FromStr for Quality {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Resolution/frame-rate directory name, e.g. `1080p60`.
///
/// Substituted as a single path segment, so it may not be empty or contain
/// separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolutionToken(String);

impl ResolutionToken {
    pub const DEFAULT: &'static str = "1080p60";

    pub fn new(token: impl Into<String>) -> ScenecastResult<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(ScenecastError::invalid_argument(
                "resolution token must not be empty",
            ));
        }
        if token == "." || token == ".." || token.contains(['/', '\\']) {
            return Err(ScenecastError::invalid_argument(format!(
                "resolution token must be a single path segment, got {token:?}"
            )));
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ResolutionToken {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl FromStr for ResolutionToken {
    type Err = ScenecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for ResolutionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_tokens() {
        for (token, quality) in [
            ("l", Quality::Low),
            ("m", Quality::Medium),
            ("h", Quality::High),
            ("k", Quality::Production),
        ] {
            assert_eq!(Quality::parse(token), quality);
            assert_eq!(quality.token(), token);
        }
    }

    #[test]
    fn test_default_is_high() {
        assert_eq!(Quality::default(), Quality::High);
        assert_eq!(Quality::default().flag(), "-qh");
    }

    #[test]
    fn test_custom_token_passes_through() {
        let q = Quality::parse("x");
        assert_eq!(q, Quality::Custom("x".to_string()));
        assert_eq!(q.flag(), "-qx");
        assert!(q.resolution_token().is_none());
    }

    #[test]
    fn test_resolution_mapping() {
        assert_eq!(
            Quality::Medium.resolution_token().unwrap().as_str(),
            "720p30"
        );
        assert_eq!(
            Quality::High.resolution_token().unwrap(),
            ResolutionToken::default()
        );
    }

    #[test]
    fn test_resolution_token_rejects_path_segments() {
        assert!(ResolutionToken::new("").is_err());
        assert!(ResolutionToken::new("..").is_err());
        assert!(ResolutionToken::new("1080p60/../x").is_err());
        assert!(ResolutionToken::new("720p30").is_ok());
    }

    proptest! {
        #[test]
        fn prop_quality_token_roundtrips(token in "[a-z0-9]{1,6}") {
            let q = Quality::parse(&token);
            prop_assert_eq!(q.token(), token.as_str());
            prop_assert_eq!(q.flag(), format!("-q{token}"));
        }
    }
}
