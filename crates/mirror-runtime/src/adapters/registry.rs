//! # Address Book Registry
//!
//! Node membership from the network's published address book, a JSON
//! array of `{ "id": 3, "public_key": "<64 hex chars>" }` entries. The
//! file is re-read on every call, so an operator can rotate keys or
//! change membership by replacing the file; the pipeline picks it up at
//! the next cycle boundary.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use shared_types::{NodeId, NodeIdentity, PublicKey};

use crate::errors::RegistryError;
use crate::ports::outbound::NodeRegistry;

#[derive(Debug, Deserialize)]
struct AddressBookEntry {
    id: u64,
    public_key: String,
}

/// Registry backed by an address book file.
#[derive(Debug, Clone)]
pub struct AddressBookRegistry {
    path: PathBuf,
}

impl AddressBookRegistry {
    /// Registry reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl NodeRegistry for AddressBookRegistry {
    async fn current_nodes(&self) -> Result<Vec<NodeIdentity>, RegistryError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|err| {
            RegistryError::Unavailable(format!("{}: {err}", self.path.display()))
        })?;
        let entries: Vec<AddressBookEntry> = serde_json::from_str(&raw)
            .map_err(|err| RegistryError::Malformed(err.to_string()))?;

        entries
            .into_iter()
            .map(|entry| {
                let bytes = hex::decode(&entry.public_key).map_err(|err| {
                    RegistryError::Malformed(format!("node {}: bad key hex: {err}", entry.id))
                })?;
                let public_key: PublicKey = bytes.try_into().map_err(|_| {
                    RegistryError::Malformed(format!("node {}: key must be 32 bytes", entry.id))
                })?;
                Ok(NodeIdentity {
                    id: NodeId(entry.id),
                    public_key,
                })
            })
            .collect()
    }
}
