//! Load client records from JSON files
//!
//! A file may hold a single client object or an array of clients.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::ClientRecord;

#[derive(Debug, Error)]
pub enum ClientLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<ClientRecord>),
    One(Box<ClientRecord>),
}

/// Parse one client or an array of clients from JSON text
pub fn parse_clients(json: &str) -> Result<Vec<ClientRecord>, serde_json::Error> {
    Ok(match serde_json::from_str::<OneOrMany>(json)? {
        OneOrMany::Many(clients) => clients,
        OneOrMany::One(client) => vec![*client],
    })
}

/// Load every client from a JSON file
pub fn load_clients(path: &Path) -> Result<Vec<ClientRecord>, ClientLoadError> {
    let text = fs::read_to_string(path).map_err(|source| ClientLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_clients(&text).map_err(|source| ClientLoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a single client; a file holding several clients yields the first
pub fn load_client(path: &Path) -> Result<ClientRecord, ClientLoadError> {
    let mut clients = load_clients(path)?;
    if clients.is_empty() {
        return Err(ClientLoadError::Json {
            path: path.to_path_buf(),
            source: serde::de::Error::custom("file contains no clients"),
        });
    }
    Ok(clients.swap_remove(0))
}

/// Load clients from every `.json` file in a directory, sorted by file name
pub fn load_clients_from_dir(dir: &Path) -> Result<Vec<ClientRecord>, ClientLoadError> {
    let entries = fs::read_dir(dir).map_err(|source| ClientLoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ClientLoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut clients = Vec::new();
    for path in paths {
        clients.extend(load_clients(&path)?);
    }
    Ok(clients)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_and_array() {
        let one = parse_clients(r#"{"name": "A", "currentAge": 40}"#).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].current_age, Some(40));

        let many = parse_clients(r#"[{"name": "A"}, {"name": "B"}]"#).unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many[1].name.as_deref(), Some("B"));
    }

    #[test]
    fn test_load_bundled_sample() {
        let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data/clients/sample_client.json"));
        let client = load_client(path).unwrap();
        assert!(client.current_age.is_some());
    }

    #[test]
    fn test_missing_file() {
        let err = load_client(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ClientLoadError::Io { .. }));
    }
}
