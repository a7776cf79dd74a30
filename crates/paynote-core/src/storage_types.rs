use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Backends that can hold the archive folders and the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Google Drive for folders and files, Google Sheets for the ledger
    Google,
    /// Local directories and a tab-separated ledger file (development)
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" | "gdrive" => Ok(StorageBackend::Google),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Google => write!(f, "google"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend() {
        assert_eq!("google".parse::<StorageBackend>().unwrap(), StorageBackend::Google);
        assert_eq!("LOCAL".parse::<StorageBackend>().unwrap(), StorageBackend::Local);
        assert!("s3".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        let backend = StorageBackend::Local;
        assert_eq!(backend.to_string().parse::<StorageBackend>().unwrap(), backend);
    }
}
