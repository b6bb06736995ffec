//! Dashboard aggregation over the full record set

use chrono::{NaiveDate, Utc};
use tokio::sync::broadcast;

use crate::error::Error;
use crate::model::Resident;
use crate::store::{ResidentStore, StoreEvent};

/// The four landing-view counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Registered records
    pub total: usize,
    /// Records with the elderly flag set
    pub elderly: usize,
    /// Records carrying a non-blank diagnosis code
    pub pcd: usize,
    /// Records created on the given calendar day
    pub today: usize,
}

impl Stats {
    /// Recompute every count; idempotent, so concurrent triggers converge
    ///
    /// Both persistence paths compare UTC calendar dates, matching the
    /// convention `createdAt` is stamped with.
    pub fn compute(records: &[Resident], today: NaiveDate) -> Self {
        Self {
            total: records.len(),
            elderly: records.iter().filter(|r| r.elderly).count(),
            pcd: records
                .iter()
                .filter(|r| r.cid.as_deref().map(|c| !c.trim().is_empty()).unwrap_or(false))
                .count(),
            today: records
                .iter()
                .filter(|r| r.created_at.date_naive() == today)
                .count(),
        }
    }
}

/// Landing view holding the counts; `None` until the first computation
pub struct Dashboard {
    stats: Option<Stats>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self { stats: None }
    }

    /// The current counts, or `None` while the loading placeholder shows
    pub fn stats(&self) -> Option<Stats> {
        self.stats
    }

    /// Recompute the counts from a full gateway read
    pub async fn refresh(&mut self, store: &ResidentStore) -> Result<Stats, Error> {
        let records = store.list().await?.into_value();
        let stats = Stats::compute(&records, Utc::now().date_naive());
        self.stats = Some(stats);
        Ok(stats)
    }

    /// Recompute on every store change notification until the channel closes
    pub async fn watch(
        &mut self,
        store: &ResidentStore,
        events: &mut broadcast::Receiver<StoreEvent>,
    ) -> Result<(), Error> {
        loop {
            match events.recv().await {
                Ok(_) => {
                    self.refresh(store).await?;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::debug!("dashboard missed {} store events, recomputing", skipped);
                    self.refresh(store).await?;
                }
                Err(broadcast::error::RecvError::Closed) => return Ok(()),
            }
        }
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Housing, ResidentDraft};
    use chrono::Duration;
    use uuid::Uuid;

    fn resident(name: &str) -> Resident {
        ResidentDraft {
            name: name.into(),
            cpf: "123.456.789-00".into(),
            rg: "12.345.678-9".into(),
            phone: "(24) 99999-0000".into(),
            email: "a@b.com".into(),
            address: "Rua A, 1".into(),
            housing: Housing::Owned,
            residents: 1,
            ..Default::default()
        }
        .into_resident(Uuid::new_v4(), Utc::now())
    }

    #[test]
    fn counts_cover_all_four_metrics() {
        let now = Utc::now();
        let mut records = vec![resident("A"), resident("B"), resident("C")];
        records[0].elderly = true;
        records[0].elderly_age = Some(65);
        records[1].has_disability = true;
        records[1].cid = Some("F20".into());
        records[2].created_at = now - Duration::days(3);

        let stats = Stats::compute(&records, now.date_naive());
        assert_eq!(stats.total, 3);
        assert_eq!(stats.elderly, 1);
        assert_eq!(stats.pcd, 1);
        assert_eq!(stats.today, 2);
    }

    #[test]
    fn blank_diagnosis_code_does_not_count_as_pcd() {
        let mut record = resident("A");
        record.cid = Some("   ".into());
        let stats = Stats::compute(&[record], Utc::now().date_naive());
        assert_eq!(stats.pcd, 0);
    }

    #[test]
    fn placeholder_shows_until_first_computation() {
        let dashboard = Dashboard::new();
        assert!(dashboard.stats().is_none());
    }

    #[test]
    fn recompute_is_idempotent() {
        let records = vec![resident("A")];
        let today = Utc::now().date_naive();
        assert_eq!(Stats::compute(&records, today), Stats::compute(&records, today));
    }
}
