use log::info;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Every Enlighten token is a JWT, whose base64 header always starts like this.
/// A reference carrying it is taken as the token itself, anything else as a path.
pub const LITERAL_TOKEN_PREFIX: &str = "eyJ";

/// Bearer token for the device.
///
/// Formatting only ever shows the redacted form, so a credential can be
/// logged or put into a `Debug` dump without leaking it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First and last four characters, or a mask for tokens too short to show any
    pub fn redacted(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "****".to_string();
        }

        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.redacted()).finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("No token configured, pass a token or the path of a token file")]
    Missing,
    #[error("Unable to read token file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Token file {0:?} is empty")]
    Empty(PathBuf),
}

/// Turns the configured token reference into the token used for every request.
///
/// References starting with [`LITERAL_TOKEN_PREFIX`] are returned as they are
/// without touching the filesystem. Everything else is read as a file, e.g. a
/// secret mounted by the container runtime or systemd's `LoadCredential=`.
pub fn resolve(reference: &str) -> Result<Credential, CredentialError> {
    if reference.is_empty() {
        return Err(CredentialError::Missing);
    }

    let credential = if reference.starts_with(LITERAL_TOKEN_PREFIX) {
        Credential(reference.to_string())
    } else {
        let path = PathBuf::from(reference);
        let contents = fs::read_to_string(&path).map_err(|source| CredentialError::Read {
            path: path.clone(),
            source,
        })?;

        let token = contents.trim();
        if token.is_empty() {
            return Err(CredentialError::Empty(path));
        }
        Credential(token.to_string())
    };

    info!("Using token {}", credential.redacted());
    Ok(credential)
}
