//! The canonical shape of a resident record and its nested structures
//!
//! Field names are camelCase on the wire to match the columns of the remote
//! `residents` table; the local mirror stores the same shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Housing situation of the registered household
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Housing {
    Owned,
    Rented,
}

impl Housing {
    /// Display label used by the report and export views
    pub fn label(&self) -> &'static str {
        match self {
            Housing::Owned => "Própria",
            Housing::Rented => "Alugada",
        }
    }
}

impl Default for Housing {
    fn default() -> Self {
        Housing::Owned
    }
}

/// Age band of a dependent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeRange {
    #[serde(rename = "0-12")]
    Child,
    #[serde(rename = "13-17")]
    Teen,
    #[serde(rename = "18-29")]
    YoungAdult,
    #[serde(rename = "30-59")]
    Adult,
    #[serde(rename = "60+")]
    Senior,
}

impl AgeRange {
    /// The wire value ("0-12", "13-17", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeRange::Child => "0-12",
            AgeRange::Teen => "13-17",
            AgeRange::YoungAdult => "18-29",
            AgeRange::Adult => "30-59",
            AgeRange::Senior => "60+",
        }
    }

    /// Display label used by the report view
    pub fn label(&self) -> String {
        format!("{} anos", self.as_str())
    }
}

/// One government assistance entry (type and monthly value)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistanceEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// One dependent of the household head
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependent {
    pub age_range: AgeRange,
    pub has_disability: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disability_description: Option<String>,
}

impl Dependent {
    pub fn new(age_range: AgeRange) -> Self {
        Self {
            age_range,
            has_disability: false,
            cid: None,
            disability_description: None,
        }
    }
}

/// A registered household head
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    pub id: Uuid,
    pub name: String,
    pub cpf: String,
    pub rg: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub housing: Housing,
    /// Household occupant count
    pub residents: u32,
    pub has_disability: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disability_description: Option<String>,
    pub elderly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elderly_age: Option<u32>,
    pub is_foreigner: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_doc_number: Option<String>,
    pub has_government_assistance: bool,
    #[serde(default)]
    pub government_assistance: Vec<AssistanceEntry>,
    #[serde(default)]
    pub dependents: Vec<Dependent>,
    /// Set once, at creation
    pub created_at: DateTime<Utc>,
    /// Set on every update, absent until the first one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resident {
    /// The draft view of the record, for re-validation after a merge
    pub fn to_draft(&self) -> ResidentDraft {
        ResidentDraft {
            name: self.name.clone(),
            cpf: self.cpf.clone(),
            rg: self.rg.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            housing: self.housing,
            residents: self.residents,
            has_disability: self.has_disability,
            cid: self.cid.clone(),
            disability_description: self.disability_description.clone(),
            elderly: self.elderly,
            elderly_age: self.elderly_age,
            is_foreigner: self.is_foreigner,
            foreign_doc_number: self.foreign_doc_number.clone(),
            has_government_assistance: self.has_government_assistance,
            government_assistance: self.government_assistance.clone(),
            dependents: self.dependents.clone(),
        }
    }
}

/// A resident record before identity and timestamps are assigned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentDraft {
    pub name: String,
    pub cpf: String,
    pub rg: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub housing: Housing,
    pub residents: u32,
    pub has_disability: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disability_description: Option<String>,
    pub elderly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elderly_age: Option<u32>,
    pub is_foreigner: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_doc_number: Option<String>,
    pub has_government_assistance: bool,
    #[serde(default)]
    pub government_assistance: Vec<AssistanceEntry>,
    #[serde(default)]
    pub dependents: Vec<Dependent>,
}

impl ResidentDraft {
    /// Promote the draft to a full record with an assigned identity
    pub fn into_resident(self, id: Uuid, created_at: DateTime<Utc>) -> Resident {
        Resident {
            id,
            name: self.name,
            cpf: self.cpf,
            rg: self.rg,
            phone: self.phone,
            email: self.email,
            address: self.address,
            housing: self.housing,
            residents: self.residents,
            has_disability: self.has_disability,
            cid: self.cid,
            disability_description: self.disability_description,
            elderly: self.elderly,
            elderly_age: self.elderly_age,
            is_foreigner: self.is_foreigner,
            foreign_doc_number: self.foreign_doc_number,
            has_government_assistance: self.has_government_assistance,
            government_assistance: self.government_assistance,
            dependents: self.dependents,
            created_at,
            updated_at: None,
        }
    }
}

/// Partial update for an existing record
///
/// Absent fields are left unchanged. The conditional sub-fields are doubly
/// optional so a patch can clear them: the outer level distinguishes "not in
/// the patch" from an explicit clear, which serializes as `null` and nulls
/// the column on the remote table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub housing: Option<Housing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residents: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_disability: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disability_description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elderly: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elderly_age: Option<Option<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_foreigner: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_doc_number: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_government_assistance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub government_assistance: Option<Vec<AssistanceEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependents: Option<Vec<Dependent>>,
    /// Stamped by the gateway, never by callers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ResidentPatch {
    /// A full patch carrying every field of the draft, as the form submits
    ///
    /// Conditional sub-fields the draft leaves empty become explicit clears,
    /// so unchecking a flag on edit removes the stale values it governed.
    pub fn from_draft(draft: ResidentDraft) -> Self {
        Self {
            name: Some(draft.name),
            cpf: Some(draft.cpf),
            rg: Some(draft.rg),
            phone: Some(draft.phone),
            email: Some(draft.email),
            address: Some(draft.address),
            housing: Some(draft.housing),
            residents: Some(draft.residents),
            has_disability: Some(draft.has_disability),
            cid: Some(draft.cid),
            disability_description: Some(draft.disability_description),
            elderly: Some(draft.elderly),
            elderly_age: Some(draft.elderly_age),
            is_foreigner: Some(draft.is_foreigner),
            foreign_doc_number: Some(draft.foreign_doc_number),
            has_government_assistance: Some(draft.has_government_assistance),
            government_assistance: Some(draft.government_assistance),
            dependents: Some(draft.dependents),
            updated_at: None,
        }
    }

    /// Merge the patch into an existing record; absent fields keep their value
    pub fn apply_to(&self, resident: &mut Resident) {
        if let Some(v) = &self.name {
            resident.name = v.clone();
        }
        if let Some(v) = &self.cpf {
            resident.cpf = v.clone();
        }
        if let Some(v) = &self.rg {
            resident.rg = v.clone();
        }
        if let Some(v) = &self.phone {
            resident.phone = v.clone();
        }
        if let Some(v) = &self.email {
            resident.email = v.clone();
        }
        if let Some(v) = &self.address {
            resident.address = v.clone();
        }
        if let Some(v) = self.housing {
            resident.housing = v;
        }
        if let Some(v) = self.residents {
            resident.residents = v;
        }
        if let Some(v) = self.has_disability {
            resident.has_disability = v;
        }
        if let Some(v) = &self.cid {
            resident.cid = v.clone();
        }
        if let Some(v) = &self.disability_description {
            resident.disability_description = v.clone();
        }
        if let Some(v) = self.elderly {
            resident.elderly = v;
        }
        if let Some(v) = self.elderly_age {
            resident.elderly_age = v;
        }
        if let Some(v) = self.is_foreigner {
            resident.is_foreigner = v;
        }
        if let Some(v) = &self.foreign_doc_number {
            resident.foreign_doc_number = v.clone();
        }
        if let Some(v) = self.has_government_assistance {
            resident.has_government_assistance = v;
        }
        if let Some(v) = &self.government_assistance {
            resident.government_assistance = v.clone();
        }
        if let Some(v) = &self.dependents {
            resident.dependents = v.clone();
        }
        if let Some(v) = self.updated_at {
            resident.updated_at = Some(v);
        }

        // a cleared flag takes its sub-fields with it
        if self.has_disability == Some(false) {
            resident.cid = None;
            resident.disability_description = None;
        }
        if self.elderly == Some(false) {
            resident.elderly_age = None;
        }
        if self.is_foreigner == Some(false) {
            resident.foreign_doc_number = None;
        }
        if self.has_government_assistance == Some(false) {
            resident.government_assistance.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_draft() -> ResidentDraft {
        ResidentDraft {
            name: "Maria da Silva".into(),
            cpf: "123.456.789-00".into(),
            rg: "12.345.678-9".into(),
            phone: "(24) 99999-0000".into(),
            email: "maria@example.com".into(),
            address: "Rua das Flores, 10".into(),
            housing: Housing::Rented,
            residents: 3,
            ..Default::default()
        }
    }

    #[test]
    fn record_serializes_with_camel_case_columns() {
        let resident = sample_draft().into_resident(Uuid::new_v4(), Utc::now());
        let value = serde_json::to_value(&resident).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("hasDisability").is_some());
        assert_eq!(value["housing"], "rented");
        // updatedAt is absent until the first update
        assert!(value.get("updatedAt").is_none());
    }

    #[test]
    fn assistance_entry_uses_type_column() {
        let entry = AssistanceEntry {
            kind: "Bolsa Família".into(),
            value: "600,00".into(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "Bolsa Família");
    }

    #[test]
    fn age_range_round_trips_wire_values() {
        for band in [
            AgeRange::Child,
            AgeRange::Teen,
            AgeRange::YoungAdult,
            AgeRange::Adult,
            AgeRange::Senior,
        ] {
            let json = serde_json::to_string(&band).unwrap();
            assert_eq!(json, format!("\"{}\"", band.as_str()));
            let back: AgeRange = serde_json::from_str(&json).unwrap();
            assert_eq!(back, band);
        }
    }

    #[test]
    fn full_patch_carries_explicit_clears_for_empty_conditionals() {
        let patch = ResidentPatch::from_draft(sample_draft());
        assert_eq!(patch.cid, Some(None));
        assert_eq!(patch.elderly_age, Some(None));
        assert_eq!(patch.foreign_doc_number, Some(None));

        // the clear reaches the remote column as an explicit null
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value["cid"], serde_json::Value::Null);
    }

    #[test]
    fn clearing_a_flag_clears_its_stored_subfields() {
        let mut resident = sample_draft().into_resident(Uuid::new_v4(), Utc::now());
        resident.has_disability = true;
        resident.cid = Some("F20".into());
        resident.disability_description = Some("Esquizofrenia".into());
        resident.elderly = true;
        resident.elderly_age = Some(70);

        let mut draft = resident.to_draft();
        draft.has_disability = false;
        draft.cid = None;
        draft.disability_description = None;
        let patch = ResidentPatch::from_draft(draft);
        patch.apply_to(&mut resident);

        assert!(!resident.has_disability);
        assert!(resident.cid.is_none());
        assert!(resident.disability_description.is_none());
        // the untouched elderly section survives
        assert_eq!(resident.elderly_age, Some(70));
    }

    #[test]
    fn flag_only_patch_still_drops_the_subfields() {
        let mut resident = sample_draft().into_resident(Uuid::new_v4(), Utc::now());
        resident.is_foreigner = true;
        resident.foreign_doc_number = Some("RNE 123".into());

        let patch = ResidentPatch {
            is_foreigner: Some(false),
            ..Default::default()
        };
        patch.apply_to(&mut resident);
        assert!(resident.foreign_doc_number.is_none());
    }

    #[test]
    fn patch_preserves_absent_fields() {
        let mut resident = sample_draft().into_resident(Uuid::new_v4(), Utc::now());
        let patch = ResidentPatch {
            phone: Some("(24) 98888-1111".into()),
            updated_at: Some(Utc::now()),
            ..Default::default()
        };
        patch.apply_to(&mut resident);
        assert_eq!(resident.phone, "(24) 98888-1111");
        assert_eq!(resident.name, "Maria da Silva");
        assert_eq!(resident.residents, 3);
        assert!(resident.updated_at.is_some());
    }
}
