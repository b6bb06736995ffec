//! Registration form: builds one resident record as a mutable draft
//!
//! Numeric inputs are held as raw text and coerced on submit, the way the
//! form fields capture them. Repeatable sub-sections (assistance entries,
//! dependents) are keyed by a stable entry id assigned at append time, so
//! removing one entry never shifts the identity of the others.

use uuid::Uuid;

use crate::error::Error;
use crate::model::{AgeRange, AssistanceEntry, Dependent, Housing, Resident, ResidentDraft, ResidentPatch};
use crate::routes::Route;
use crate::store::{ResidentStore, Stored, TransferSlot};
use crate::validate::{self, Violation};

/// Stable identifier of one repeatable form entry
pub type EntryId = u64;

/// One repeatable form entry with its stable id
#[derive(Debug, Clone, PartialEq)]
pub struct FormEntry<T> {
    pub id: EntryId,
    pub value: T,
}

/// A dependent as captured by the form; the age band starts unselected
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependentFields {
    pub age_range: Option<AgeRange>,
    pub has_disability: bool,
    pub cid: String,
    pub disability_description: String,
}

/// The in-progress draft of one resident record
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationForm {
    pub name: String,
    pub cpf: String,
    pub rg: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub housing: Housing,
    /// Raw occupant-count input, coerced on submit
    pub residents_input: String,
    pub has_disability: bool,
    pub cid: String,
    pub disability_description: String,
    pub elderly: bool,
    /// Raw age input, coerced on submit
    pub elderly_age_input: String,
    pub is_foreigner: bool,
    pub foreign_doc_number: String,
    pub has_government_assistance: bool,
    assistance: Vec<FormEntry<AssistanceEntry>>,
    dependents: Vec<FormEntry<DependentFields>>,
    editing_id: Option<Uuid>,
    next_entry_id: EntryId,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            cpf: String::new(),
            rg: String::new(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            housing: Housing::Owned,
            residents_input: "1".to_string(),
            has_disability: false,
            cid: String::new(),
            disability_description: String::new(),
            elderly: false,
            elderly_age_input: String::new(),
            is_foreigner: false,
            foreign_doc_number: String::new(),
            has_government_assistance: false,
            assistance: Vec::new(),
            dependents: Vec::new(),
            editing_id: None,
            next_entry_id: 0,
        }
    }
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the form will update an existing record on submit
    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    fn next_id(&mut self) -> EntryId {
        let id = self.next_entry_id;
        self.next_entry_id += 1;
        id
    }

    /// Toggle the disability section; hiding it clears its fields
    pub fn set_has_disability(&mut self, value: bool) {
        self.has_disability = value;
        if !value {
            self.cid.clear();
            self.disability_description.clear();
        }
    }

    /// Toggle the elderly section; hiding it clears the age input
    pub fn set_elderly(&mut self, value: bool) {
        self.elderly = value;
        if !value {
            self.elderly_age_input.clear();
        }
    }

    /// Toggle the foreign-national section; hiding it clears the document
    pub fn set_is_foreigner(&mut self, value: bool) {
        self.is_foreigner = value;
        if !value {
            self.foreign_doc_number.clear();
        }
    }

    /// Toggle the assistance section; hiding it removes its entries
    pub fn set_has_government_assistance(&mut self, value: bool) {
        self.has_government_assistance = value;
        if !value {
            self.assistance.clear();
        }
    }

    /// Append an empty assistance entry and return its stable id
    pub fn add_assistance(&mut self) -> EntryId {
        let id = self.next_id();
        self.assistance.push(FormEntry {
            id,
            value: AssistanceEntry::default(),
        });
        id
    }

    /// Mutable access to one assistance entry by id
    pub fn assistance_mut(&mut self, id: EntryId) -> Option<&mut AssistanceEntry> {
        self.assistance
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.value)
    }

    /// Remove one assistance entry; other entries keep their ids
    pub fn remove_assistance(&mut self, id: EntryId) {
        self.assistance.retain(|e| e.id != id);
    }

    /// Assistance entries in insertion order
    pub fn assistance(&self) -> &[FormEntry<AssistanceEntry>] {
        &self.assistance
    }

    /// Append an empty dependent and return its stable id
    pub fn add_dependent(&mut self) -> EntryId {
        let id = self.next_id();
        self.dependents.push(FormEntry {
            id,
            value: DependentFields::default(),
        });
        id
    }

    /// Mutable access to one dependent by id
    pub fn dependent_mut(&mut self, id: EntryId) -> Option<&mut DependentFields> {
        self.dependents
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.value)
    }

    /// Remove one dependent; other dependents keep their ids
    pub fn remove_dependent(&mut self, id: EntryId) {
        self.dependents.retain(|e| e.id != id);
    }

    /// Dependents in insertion order
    pub fn dependents(&self) -> &[FormEntry<DependentFields>] {
        &self.dependents
    }

    /// Drain the edit transfer slot into the draft, if a record is waiting
    pub fn take_handoff(&mut self, slot: &TransferSlot) -> Result<bool, Error> {
        match slot.take()? {
            Some(resident) => {
                self.load_record(resident);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Populate the draft from an existing record for editing
    pub fn load_record(&mut self, resident: Resident) {
        *self = Self::default();
        self.editing_id = Some(resident.id);
        self.name = resident.name;
        self.cpf = resident.cpf;
        self.rg = resident.rg;
        self.phone = resident.phone;
        self.email = resident.email;
        self.address = resident.address;
        self.housing = resident.housing;
        self.residents_input = resident.residents.to_string();
        self.has_disability = resident.has_disability;
        self.cid = resident.cid.unwrap_or_default();
        self.disability_description = resident.disability_description.unwrap_or_default();
        self.elderly = resident.elderly;
        self.elderly_age_input = resident
            .elderly_age
            .map(|a| a.to_string())
            .unwrap_or_default();
        self.is_foreigner = resident.is_foreigner;
        self.foreign_doc_number = resident.foreign_doc_number.unwrap_or_default();
        self.has_government_assistance = resident.has_government_assistance;
        for entry in resident.government_assistance {
            let id = self.next_id();
            self.assistance.push(FormEntry { id, value: entry });
        }
        for dependent in resident.dependents {
            let id = self.next_id();
            self.dependents.push(FormEntry {
                id,
                value: DependentFields {
                    age_range: Some(dependent.age_range),
                    has_disability: dependent.has_disability,
                    cid: dependent.cid.unwrap_or_default(),
                    disability_description: dependent.disability_description.unwrap_or_default(),
                },
            });
        }
    }

    fn optional(value: &str) -> Option<String> {
        if value.trim().is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    /// Coerce the inputs into a draft, collecting every violation
    pub fn build_draft(&self) -> Result<ResidentDraft, Vec<Violation>> {
        let mut violations = Vec::new();

        let residents = match self.residents_input.trim().parse::<u32>() {
            Ok(n) => n,
            Err(_) => {
                violations.push(Violation {
                    field: "residents".to_string(),
                    message: "número de moradores inválido".to_string(),
                });
                0
            }
        };

        let elderly_age = if self.elderly {
            match self.elderly_age_input.trim().parse::<u32>() {
                Ok(age) => Some(age),
                Err(_) => {
                    violations.push(Violation {
                        field: "elderlyAge".to_string(),
                        message: "idade inválida".to_string(),
                    });
                    None
                }
            }
        } else {
            None
        };

        let mut dependents = Vec::with_capacity(self.dependents.len());
        for (i, entry) in self.dependents.iter().enumerate() {
            let fields = &entry.value;
            let age_range = match fields.age_range {
                Some(band) => band,
                None => {
                    violations.push(Violation {
                        field: format!("dependents[{}].ageRange", i),
                        message: "selecione a faixa etária".to_string(),
                    });
                    continue;
                }
            };
            dependents.push(Dependent {
                age_range,
                has_disability: fields.has_disability,
                cid: if fields.has_disability {
                    Self::optional(&fields.cid)
                } else {
                    None
                },
                disability_description: if fields.has_disability {
                    Self::optional(&fields.disability_description)
                } else {
                    None
                },
            });
        }

        let draft = ResidentDraft {
            name: self.name.clone(),
            cpf: self.cpf.clone(),
            rg: self.rg.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            housing: self.housing,
            residents,
            has_disability: self.has_disability,
            cid: if self.has_disability {
                Self::optional(&self.cid)
            } else {
                None
            },
            disability_description: if self.has_disability {
                Self::optional(&self.disability_description)
            } else {
                None
            },
            elderly: self.elderly,
            elderly_age,
            is_foreigner: self.is_foreigner,
            foreign_doc_number: if self.is_foreigner {
                Self::optional(&self.foreign_doc_number)
            } else {
                None
            },
            has_government_assistance: self.has_government_assistance,
            government_assistance: if self.has_government_assistance {
                self.assistance.iter().map(|e| e.value.clone()).collect()
            } else {
                Vec::new()
            },
            dependents,
        };

        if let Err(more) = validate::validate_draft(&draft) {
            violations.extend(more);
        }

        if violations.is_empty() {
            Ok(draft)
        } else {
            Err(violations)
        }
    }

    /// Submit the draft through the gateway
    ///
    /// Creates a new record, or updates the one received through the edit
    /// handoff. On success the form is reset and the report route returned
    /// for navigation; on failure the draft is preserved for retry.
    pub async fn submit(&mut self, store: &ResidentStore) -> Result<(Stored<Resident>, Route), Error> {
        let draft = self.build_draft().map_err(Error::Validation)?;

        let stored = match self.editing_id {
            Some(id) => store.update(id, ResidentPatch::from_draft(draft)).await?,
            None => store.create(draft).await?,
        };

        *self = Self::default();
        Ok((stored, Route::Reports))
    }
}
