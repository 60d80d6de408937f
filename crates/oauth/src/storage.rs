use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    error::{Error, Result},
    types::Credential,
};

/// Default credential file name, relative to the working directory.
pub const CREDENTIAL_FILE_NAME: &str = ".inkctl";

/// Environment override naming the credential file location.
pub const HOME_ENV: &str = "INKCTL_HOME";

/// Owns the on-disk credential record.
///
/// The store does no cross-process locking; concurrent invocations racing
/// on the same path are an accepted limitation of a single-operator CLI.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Resolve the store path: `INKCTL_HOME` if set and non-empty, else
    /// `.inkctl` in the current working directory.
    pub fn resolve() -> Result<Self> {
        if let Ok(path) = std::env::var(HOME_ENV)
            && !path.is_empty()
        {
            return Ok(Self { path: path.into() });
        }
        let cwd = std::env::current_dir().map_err(Error::Persist)?;
        Ok(Self {
            path: cwd.join(CREDENTIAL_FILE_NAME),
        })
    }

    /// A store at a specific path (tests).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and deserialize the stored credential.
    ///
    /// A missing file means the operator has not authorized yet and is
    /// reported distinctly from other I/O failures.
    pub fn read(&self) -> Result<Credential> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::CredentialNotFound);
            },
            Err(e) => return Err(Error::Persist(e)),
        };
        serde_json::from_str(&data).map_err(Error::CredentialCorrupt)
    }

    /// Serialize and persist `credential`, replacing any existing record.
    ///
    /// Writes to a sibling temp file and renames it into place so a crash
    /// mid-write never leaves a torn record behind.
    pub fn write(&self, credential: &Credential) -> Result<()> {
        let data = serde_json::to_string_pretty(credential)
            .map_err(|e| Error::Persist(io::Error::other(e)))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, &data).map_err(Error::Persist)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))
                .map_err(Error::Persist)?;
        }
        fs::rename(&tmp, &self.path).map_err(Error::Persist)?;

        debug!(path = %self.path.display(), "credential written");
        Ok(())
    }

    /// Invalidate the stored credential. Ok when no record exists.
    pub fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Persist(e)),
        }
    }
}
