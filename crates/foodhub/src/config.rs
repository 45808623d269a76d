use crate::{Error, Result};

/// Connection settings for the application database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Connection URI (`mongodb://`, `mongodb+srv://`, or `memory://`)
    pub uri: String,

    /// Database name. When `None`, the name in the URI path is used, falling
    /// back to `foodhub`.
    pub database: Option<String>,
}

impl Config {
    /// Environment variable holding the connection URI
    pub const URI_VAR: &'static str = "MONGO_URI";

    /// Environment variable holding the database name
    pub const DATABASE_VAR: &'static str = "MONGO_DB_NAME";

    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: None,
        }
    }

    /// Set the database name
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Load the configuration from `MONGO_URI` and `MONGO_DB_NAME`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the configuration through `lookup`, which maps a variable name to
    /// its value. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|value: &String| !value.trim().is_empty());

        let Some(uri) = get(Self::URI_VAR) else {
            return Err(Error::invalid_connection_url(format!(
                "`{}` is not set",
                Self::URI_VAR
            )));
        };

        Ok(Self {
            uri,
            database: get(Self::DATABASE_VAR),
        })
    }

    /// The URI with any password replaced by `***`, safe to log.
    pub fn redacted_uri(&self) -> String {
        redact_url_password(&self.uri)
    }
}

/// Redact the password portion of a database URL for safe display.
///
/// If the URL can be parsed and contains a password, replaces it with `***`.
/// If parsing fails (e.g. a multi-host MongoDB URI), the credentials between
/// `://` and `@` are masked by hand.
pub fn redact_url_password(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("***"));
            }
            parsed.to_string()
        }
        Err(_) => redact_unparsed(url),
    }
}

fn redact_unparsed(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };

    let authority_end = rest.find('/').unwrap_or(rest.len());
    let Some(at) = rest[..authority_end].rfind('@') else {
        return url.to_string();
    };

    match rest[..at].split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***{}", &rest[at..]),
        None => url.to_string(),
    }
}
