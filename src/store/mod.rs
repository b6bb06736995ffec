//! Persistence gateway: remote table first, local mirror as fallback
//!
//! Every operation attempts the remote store, keeps the local mirror in sync
//! on success, and degrades to the mirror alone when the remote call fails.
//! Callers always learn which medium served them through [`PersistMode`];
//! the degradation itself is logged, never thrown.

mod mirror;
mod remote;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::config::ClientOptions;
use crate::error::Error;
use crate::model::{Resident, ResidentDraft, ResidentPatch};
use crate::validate;

pub use mirror::{LocalMirror, TransferSlot};
pub use remote::RemoteTable;

/// Durability of the result of a gateway operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistMode {
    /// The remote store confirmed the operation; the mirror matches it
    RemoteConfirmed,
    /// The remote store was unreachable; only the local mirror was touched
    LocalOnly,
}

impl PersistMode {
    pub fn is_degraded(&self) -> bool {
        matches!(self, PersistMode::LocalOnly)
    }
}

/// A gateway result together with the medium that produced it
#[derive(Debug, Clone)]
pub struct Stored<T> {
    pub value: T,
    pub mode: PersistMode,
}

impl<T> Stored<T> {
    fn remote(value: T) -> Self {
        Self {
            value,
            mode: PersistMode::RemoteConfirmed,
        }
    }

    fn local(value: T) -> Self {
        Self {
            value,
            mode: PersistMode::LocalOnly,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Change notification fired after every successful mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Created(Uuid),
    Updated(Uuid),
    Deleted(Uuid),
}

/// A backing store for resident records
///
/// The remote table and the local mirror both satisfy this interface; the
/// gateway treats them as primary and fallback.
#[async_trait]
pub trait ResidentBackend {
    async fn fetch_all(&self) -> Result<Vec<Resident>, Error>;
    async fn store(&self, resident: &Resident) -> Result<Resident, Error>;
    async fn patch(&self, id: Uuid, patch: &ResidentPatch) -> Result<Resident, Error>;
    async fn remove(&self, id: Uuid) -> Result<(), Error>;
}

#[async_trait]
impl ResidentBackend for RemoteTable {
    async fn fetch_all(&self) -> Result<Vec<Resident>, Error> {
        self.list().await
    }

    async fn store(&self, resident: &Resident) -> Result<Resident, Error> {
        self.insert(resident).await
    }

    async fn patch(&self, id: Uuid, patch: &ResidentPatch) -> Result<Resident, Error> {
        self.update(id, patch).await
    }

    async fn remove(&self, id: Uuid) -> Result<(), Error> {
        self.delete(id).await
    }
}

#[async_trait]
impl ResidentBackend for LocalMirror {
    async fn fetch_all(&self) -> Result<Vec<Resident>, Error> {
        self.read()
    }

    async fn store(&self, resident: &Resident) -> Result<Resident, Error> {
        self.upsert(resident)?;
        Ok(resident.clone())
    }

    async fn patch(&self, id: Uuid, patch: &ResidentPatch) -> Result<Resident, Error> {
        let mut resident = self
            .find(id)?
            .ok_or_else(|| Error::database(format!("no record with id {} in local mirror", id)))?;
        patch.apply_to(&mut resident);
        validate::validate_draft(&resident.to_draft()).map_err(Error::Validation)?;
        self.upsert(&resident)?;
        Ok(resident)
    }

    async fn remove(&self, id: Uuid) -> Result<(), Error> {
        LocalMirror::remove(self, id)
    }
}

/// The persistence gateway for resident records
#[derive(Clone)]
pub struct ResidentStore {
    remote: RemoteTable,
    mirror: LocalMirror,
    events: broadcast::Sender<StoreEvent>,
}

impl ResidentStore {
    pub(crate) fn new(url: &str, key: &str, client: Client, options: &ClientOptions) -> Self {
        let remote = RemoteTable::new(
            url,
            key,
            "residents",
            &options.db_schema,
            client,
            options.request_timeout,
        );
        let mirror = LocalMirror::new(options.data_dir.clone(), &options.mirror_namespace);
        let (events, _) = broadcast::channel(64);
        Self {
            remote,
            mirror,
            events,
        }
    }

    /// Subscribe to change notifications; drop the receiver to unsubscribe
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// The local mirror backing this store
    pub fn mirror(&self) -> &LocalMirror {
        &self.mirror
    }

    fn emit(&self, event: StoreEvent) {
        let _ = self.events.send(event);
    }

    fn sort_newest_first(records: &mut [Resident]) {
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }

    /// Fetch every record, newest first
    pub async fn list(&self) -> Result<Stored<Vec<Resident>>, Error> {
        match self.remote.fetch_all().await {
            Ok(mut records) => {
                Self::sort_newest_first(&mut records);
                self.mirror.write(&records)?;
                Ok(Stored::remote(records))
            }
            Err(e) => {
                log::warn!("remote list failed, reading local mirror: {}", e);
                let mut records = self.mirror.fetch_all().await?;
                Self::sort_newest_first(&mut records);
                Ok(Stored::local(records))
            }
        }
    }

    /// Create a record from a validated draft
    ///
    /// Identity and `createdAt` are assigned here, before the remote attempt,
    /// so the fallback record carries the same id the remote one would have.
    pub async fn create(&self, draft: ResidentDraft) -> Result<Stored<Resident>, Error> {
        validate::validate_draft(&draft).map_err(Error::Validation)?;

        let resident = draft.into_resident(Uuid::new_v4(), Utc::now());

        let stored = match self.remote.store(&resident).await {
            Ok(confirmed) => {
                self.mirror.upsert(&confirmed)?;
                Stored::remote(confirmed)
            }
            Err(e) => {
                log::warn!("remote create failed, writing local mirror only: {}", e);
                self.mirror.store(&resident).await?;
                Stored::local(resident)
            }
        };

        self.emit(StoreEvent::Created(stored.value.id));
        Ok(stored)
    }

    /// Apply a partial update; `updatedAt` is stamped by the gateway
    pub async fn update(&self, id: Uuid, patch: ResidentPatch) -> Result<Stored<Resident>, Error> {
        validate::validate_patch(&patch).map_err(Error::Validation)?;

        let mut patch = patch;
        patch.updated_at = Some(Utc::now());

        let stored = match self.remote_update(id, &patch).await {
            Ok(confirmed) => {
                self.mirror.upsert(&confirmed)?;
                Stored::remote(confirmed)
            }
            // invariant failures are not a reachability problem
            Err(e @ Error::Validation(_)) => return Err(e),
            Err(e) => {
                log::warn!("remote update failed, patching local mirror only: {}", e);
                let merged = ResidentBackend::patch(&self.mirror, id, &patch).await?;
                Stored::local(merged)
            }
        };

        self.emit(StoreEvent::Updated(id));
        Ok(stored)
    }

    /// Update through the remote table, validating the merged record first
    ///
    /// A partial patch can be self-consistent yet inconsistent with the
    /// stored record, so the merge is checked against the full draft rules
    /// before anything is sent, the same check the mirror applies.
    async fn remote_update(&self, id: Uuid, patch: &ResidentPatch) -> Result<Resident, Error> {
        let mut merged = self
            .remote
            .fetch(id)
            .await?
            .ok_or_else(|| Error::database(format!("no record with id {}", id)))?;
        patch.apply_to(&mut merged);
        validate::validate_draft(&merged.to_draft()).map_err(Error::Validation)?;

        self.remote.update(id, patch).await
    }

    /// Delete a record; deleting a nonexistent id succeeds
    pub async fn delete(&self, id: Uuid) -> Result<Stored<()>, Error> {
        let stored = match self.remote.remove(id).await {
            Ok(()) => {
                self.mirror.remove(id)?;
                Stored::remote(())
            }
            Err(e) => {
                log::warn!("remote delete failed, removing from local mirror only: {}", e);
                ResidentBackend::remove(&self.mirror, id).await?;
                Stored::local(())
            }
        };

        self.emit(StoreEvent::Deleted(id));
        Ok(stored)
    }
}
