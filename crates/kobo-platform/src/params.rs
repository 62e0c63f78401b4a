//! Startup parameters handed to the platform integration.

/// Environment variable carrying the platform spec, e.g. `kobo:debug`.
pub const PLATFORM_ENV: &str = "QT_QPA_PLATFORM";

const PLUGIN_NAME: &str = "kobo";

/// Ordered startup tokens
///
/// Tokens are kept verbatim; interpretation belongs to the parsers, which
/// ignore anything they do not recognise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformParams {
    tokens: Vec<String>,
}

impl PlatformParams {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a platform spec such as `kobo:touchscreen_rotate=90:debug`.
    ///
    /// The leading plugin name is dropped; empty segments are skipped.
    pub fn from_spec(spec: &str) -> Self {
        let mut segments = spec.split(':').peekable();
        if segments.peek().map(|first| first.trim()) == Some(PLUGIN_NAME) {
            segments.next();
        }
        Self::new(segments.filter(|segment| !segment.is_empty()))
    }

    /// Read the spec from [`PLATFORM_ENV`]; empty when unset.
    pub fn from_env() -> Self {
        match std::env::var(PLATFORM_ENV) {
            Ok(spec) => Self::from_spec(&spec),
            Err(_) => Self::default(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
