use crate::error::{Error, Result};
use serde::Deserialize;
use std::{fmt, fs, path::Path};

pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";

/// Basic-auth credentials for the `AnswerHub` REST API
#[derive(Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Credentials {
    #[serde(rename = "answerHubBaseURL", default)]
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// Values given on the command line (or environment), each one optional
#[derive(Debug, Clone, Default)]
pub struct CredentialOverrides {
    pub url: Option<String>,
    pub user: Option<String>,
    pub pass: Option<String>,
}

impl CredentialOverrides {
    const fn is_complete(&self) -> bool {
        self.url.is_some() && self.user.is_some() && self.pass.is_some()
    }
}

impl Credentials {
    /// Read credentials from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file can't be read or parsed
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;

        serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("invalid credentials in {}: {e}", path.display())))
    }

    /// Merge the file with the overrides, flags win field by field.
    ///
    /// The file is only read when at least one override is missing.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file is needed but unreadable, or if a
    /// field is still empty after merging
    pub fn resolve(path: &Path, overrides: CredentialOverrides) -> Result<Self> {
        let base = if overrides.is_complete() {
            Self::default()
        } else {
            Self::from_file(path)?
        };

        let credentials = Self {
            base_url: overrides.url.unwrap_or(base.base_url),
            username: overrides.user.unwrap_or(base.username),
            password: overrides.pass.unwrap_or(base.password),
        }
        .normalized();

        credentials.validate()?;

        Ok(credentials)
    }

    fn normalized(mut self) -> Self {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        self
    }

    fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("answerHubBaseURL", &self.base_url),
            ("username", &self.username),
            ("password", &self.password),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "missing credential fields: {}",
                missing.join(", ")
            )))
        }
    }

    /// Versioned API root, every resource path is appended to it
    #[must_use]
    pub fn api_root(&self) -> String {
        format!("{}/services/v2/", self.base_url)
    }
}
