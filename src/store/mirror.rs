//! Local mirror of the remote table and the edit transfer slot
//!
//! The mirror is one serialized array under a fixed namespace inside the
//! configured data directory. It is the fallback medium when the remote
//! store is unreachable and is rewritten to match after every successful
//! remote operation.

use std::fs;
use std::path::PathBuf;

use uuid::Uuid;

use crate::error::Error;
use crate::model::Resident;

/// Serialized resident array under a fixed storage key
#[derive(Debug, Clone)]
pub struct LocalMirror {
    path: PathBuf,
}

impl LocalMirror {
    pub fn new(data_dir: PathBuf, namespace: &str) -> Self {
        let path = data_dir.join(format!("{}.json", namespace));
        Self { path }
    }

    /// Read the mirrored array; a missing or unreadable file reads as empty
    pub fn read(&self) -> Result<Vec<Resident>, Error> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(records) => Ok(records),
            Err(e) => {
                log::warn!("local mirror at {:?} is corrupt, reading as empty: {}", self.path, e);
                Ok(Vec::new())
            }
        }
    }

    /// Replace the mirrored array
    pub fn write(&self, records: &[Resident]) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec(records)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Insert or replace one record by id
    pub fn upsert(&self, resident: &Resident) -> Result<(), Error> {
        let mut records = self.read()?;
        match records.iter_mut().find(|r| r.id == resident.id) {
            Some(existing) => *existing = resident.clone(),
            None => records.push(resident.clone()),
        }
        self.write(&records)
    }

    /// Remove one record by id; removing an absent id is a no-op
    pub fn remove(&self, id: Uuid) -> Result<(), Error> {
        let mut records = self.read()?;
        records.retain(|r| r.id != id);
        self.write(&records)
    }

    /// Find one record by id
    pub fn find(&self, id: Uuid) -> Result<Option<Resident>, Error> {
        Ok(self.read()?.into_iter().find(|r| r.id == id))
    }
}

/// Write-once/read-once handoff slot carrying a record from the report view
/// into the registration form for editing
#[derive(Debug, Clone)]
pub struct TransferSlot {
    path: PathBuf,
}

impl TransferSlot {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join("editing-resident.json"),
        }
    }

    /// Place a record into the slot, replacing any previous occupant
    pub fn put(&self, resident: &Resident) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec(resident)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Drain the slot; the consumer clears it after reading
    pub fn take(&self) -> Result<Option<Resident>, Error> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let resident = serde_json::from_slice(&bytes)?;
        fs::remove_file(&self.path)?;
        Ok(Some(resident))
    }
}
