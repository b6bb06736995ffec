//! Report view: list, search, paginate, edit handoff, delete, export

mod excel;
mod format;
mod pdf;

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::Error;
use crate::model::Resident;
use crate::routes::Route;
use crate::store::{PersistMode, ResidentStore, TransferSlot};

pub use format::{FormattedRow, ALL_COLUMNS, DETAIL_COLUMNS, ESSENTIAL_COLUMNS};

/// Fixed page size of the report table
pub const PAGE_SIZE: usize = 10;

/// A pending delete awaiting the user's confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a pending delete has no effect until confirmed"]
pub struct DeleteConfirmation {
    pub id: Uuid,
}

/// Read-only cached copy of the record set with search and pagination state
pub struct ReportView {
    records: Vec<Resident>,
    mode: PersistMode,
    search_term: String,
    page: usize,
}

/// Case-insensitive substring match against every display field
fn matches_search(resident: &Resident, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    let contains = |value: &str| value.to_lowercase().contains(&needle);

    contains(&resident.name)
        || contains(&resident.cpf)
        || contains(&resident.rg)
        || contains(&resident.phone)
        || contains(&resident.email)
        || contains(&resident.address)
        || (resident.has_disability
            && resident.cid.as_deref().map(contains).unwrap_or(false))
        || (resident.has_disability
            && resident
                .disability_description
                .as_deref()
                .map(contains)
                .unwrap_or(false))
        || (resident.elderly
            && resident
                .elderly_age
                .map(|age| age.to_string().contains(term))
                .unwrap_or(false))
        || (resident.is_foreigner
            && resident
                .foreign_doc_number
                .as_deref()
                .map(contains)
                .unwrap_or(false))
        || (resident.has_government_assistance
            && resident
                .government_assistance
                .iter()
                .any(|a| contains(&a.kind) || contains(&a.value)))
        || resident.dependents.iter().any(|d| {
            contains(d.age_range.as_str())
                || (d.has_disability && d.cid.as_deref().map(contains).unwrap_or(false))
                || (d.has_disability
                    && d.disability_description
                        .as_deref()
                        .map(contains)
                        .unwrap_or(false))
        })
}

impl ReportView {
    /// Load every record through the gateway, newest first
    pub async fn load(store: &ResidentStore) -> Result<Self, Error> {
        let stored = store.list().await?;
        Ok(Self {
            records: stored.value,
            mode: stored.mode,
            search_term: String::new(),
            page: 1,
        })
    }

    /// Reload from the gateway, keeping search and clamping the page
    pub async fn refresh(&mut self, store: &ResidentStore) -> Result<(), Error> {
        let stored = store.list().await?;
        self.records = stored.value;
        self.mode = stored.mode;
        let last = self.total_pages().max(1);
        if self.page > last {
            self.page = last;
        }
        Ok(())
    }

    /// The medium the current snapshot came from
    pub fn mode(&self) -> PersistMode {
        self.mode
    }

    /// Every loaded record, unfiltered
    pub fn records(&self) -> &[Resident] {
        &self.records
    }

    /// Change the search term; filtering resets to the first page
    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.to_string();
        self.page = 1;
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Records matching the current search term
    pub fn filtered(&self) -> Vec<&Resident> {
        self.records
            .iter()
            .filter(|r| matches_search(r, &self.search_term))
            .collect()
    }

    pub fn total_pages(&self) -> usize {
        let count = self.filtered().len();
        count.div_ceil(PAGE_SIZE)
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    /// The records of the current page
    pub fn page_records(&self) -> Vec<&Resident> {
        let start = (self.page - 1) * PAGE_SIZE;
        self.filtered()
            .into_iter()
            .skip(start)
            .take(PAGE_SIZE)
            .collect()
    }

    /// Whether the next-page button is enabled
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Whether the previous-page button is enabled
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn next_page(&mut self) {
        if self.has_next() {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.has_prev() {
            self.page -= 1;
        }
    }

    /// Place a record into the transfer slot and hand off to the form
    pub fn begin_edit(&self, id: Uuid, slot: &TransferSlot) -> Result<Option<Route>, Error> {
        match self.records.iter().find(|r| r.id == id) {
            Some(resident) => {
                slot.put(resident)?;
                Ok(Some(Route::Residents))
            }
            None => Ok(None),
        }
    }

    /// Open the delete confirmation for one record
    pub fn request_delete(&self, id: Uuid) -> DeleteConfirmation {
        DeleteConfirmation { id }
    }

    /// Confirm a pending delete: remove the record and refresh the list
    pub async fn confirm_delete(
        &mut self,
        confirmation: DeleteConfirmation,
        store: &ResidentStore,
    ) -> Result<(), Error> {
        store.delete(confirmation.id).await?;
        self.refresh(store).await
    }

    /// Dismiss a pending delete; no effect
    pub fn cancel_delete(&self, _confirmation: DeleteConfirmation) {}

    /// Export every loaded record to `cadastro-moradores.xlsx` in `dir`
    pub fn export_excel(&self, dir: &Path) -> Result<PathBuf, Error> {
        excel::export(&self.records, dir)
    }

    /// Export every loaded record to `cadastro-moradores.pdf` in `dir`
    pub fn export_pdf(&self, dir: &Path) -> Result<PathBuf, Error> {
        pdf::export(&self.records, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AgeRange, Dependent, Housing, ResidentDraft};
    use chrono::{Duration, Utc};

    fn resident(name: &str, cpf: &str) -> Resident {
        ResidentDraft {
            name: name.into(),
            cpf: cpf.into(),
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

    fn view_with(records: Vec<Resident>) -> ReportView {
        ReportView {
            records,
            mode: PersistMode::LocalOnly,
            search_term: String::new(),
            page: 1,
        }
    }

    #[test]
    fn search_matches_partial_cpf() {
        let mut view = view_with(vec![
            resident("Maria", "123.456.789-00"),
            resident("João", "987.654.321-00"),
        ]);
        view.set_search_term("123.456");
        let filtered = view.filtered();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Maria");

        view.set_search_term("nowhere-to-be-found");
        assert!(view.filtered().is_empty());
    }

    #[test]
    fn search_is_case_insensitive() {
        let mut view = view_with(vec![resident("Maria da Silva", "111")]);
        view.set_search_term("MARIA");
        assert_eq!(view.filtered().len(), 1);
    }

    #[test]
    fn conditional_fields_match_only_when_flagged() {
        let mut flagged = resident("Ana", "111");
        flagged.has_disability = true;
        flagged.cid = Some("F20".into());
        let mut unflagged = resident("Bia", "222");
        unflagged.has_disability = false;
        unflagged.cid = Some("F20".into());

        let mut view = view_with(vec![flagged, unflagged]);
        view.set_search_term("f20");
        let filtered = view.filtered();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Ana");
    }

    #[test]
    fn dependents_age_band_is_searchable() {
        let mut with_dep = resident("Carla", "333");
        with_dep.dependents.push(Dependent::new(AgeRange::Teen));
        let mut view = view_with(vec![with_dep, resident("Dora", "444")]);
        view.set_search_term("13-17");
        assert_eq!(view.filtered().len(), 1);
    }

    #[test]
    fn pagination_over_25_records() {
        let records: Vec<_> = (0..25)
            .map(|i| resident(&format!("Pessoa {}", i), &format!("{:011}", i)))
            .collect();
        let mut view = view_with(records);

        assert_eq!(view.total_pages(), 3);
        assert_eq!(view.page_records().len(), 10);
        assert!(!view.has_prev());

        view.next_page();
        view.next_page();
        assert_eq!(view.current_page(), 3);
        assert_eq!(view.page_records().len(), 5);
        assert!(!view.has_next());

        // navigating past the last page is disallowed
        view.next_page();
        assert_eq!(view.current_page(), 3);
    }

    #[test]
    fn changing_search_resets_to_first_page() {
        let records: Vec<_> = (0..25)
            .map(|i| resident(&format!("Pessoa {}", i), &format!("{:011}", i)))
            .collect();
        let mut view = view_with(records);
        view.next_page();
        assert_eq!(view.current_page(), 2);
        view.set_search_term("Pessoa");
        assert_eq!(view.current_page(), 1);
    }

    #[test]
    fn records_are_sorted_newest_first_after_load() {
        // load() relies on the gateway sort; refresh keeps the page clamped
        let now = Utc::now();
        let mut older = resident("Velha", "111");
        older.created_at = now - Duration::days(2);
        let mut newer = resident("Nova", "222");
        newer.created_at = now;
        let mut records = vec![older, newer];
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let view = view_with(records);
        assert_eq!(view.records()[0].name, "Nova");
    }
}
