//! Central validation pass applied before every persistence call
//!
//! The form enforces these rules interactively, but the gateway re-checks
//! them so an inconsistent record cannot be stored regardless of entry path.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Dependent, ResidentDraft, ResidentPatch};

/// One rule violation, addressed by field path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn opt_blank(value: &Option<String>) -> bool {
    value.as_deref().map(is_blank).unwrap_or(true)
}

/// Absent and explicitly-cleared patch fields both count as blank
fn patch_blank(value: &Option<Option<String>>) -> bool {
    value.as_ref().map(opt_blank).unwrap_or(true)
}

fn check_required(violations: &mut Vec<Violation>, field: &str, value: &str) {
    if is_blank(value) {
        violations.push(Violation::new(field, "campo obrigatório"));
    }
}

fn check_dependent(violations: &mut Vec<Violation>, index: usize, dependent: &Dependent) {
    if dependent.has_disability {
        if opt_blank(&dependent.cid) {
            violations.push(Violation::new(
                &format!("dependents[{}].cid", index),
                "CID obrigatório para dependente PCD",
            ));
        }
        if opt_blank(&dependent.disability_description) {
            violations.push(Violation::new(
                &format!("dependents[{}].disabilityDescription", index),
                "descrição obrigatória para dependente PCD",
            ));
        }
    }
}

/// Validate a complete draft; returns every violation found
pub fn validate_draft(draft: &ResidentDraft) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    check_required(&mut violations, "name", &draft.name);
    check_required(&mut violations, "cpf", &draft.cpf);
    check_required(&mut violations, "rg", &draft.rg);
    check_required(&mut violations, "phone", &draft.phone);
    check_required(&mut violations, "email", &draft.email);
    check_required(&mut violations, "address", &draft.address);

    if draft.residents < 1 {
        violations.push(Violation::new("residents", "deve ser ao menos 1"));
    }

    if draft.has_disability {
        if opt_blank(&draft.cid) {
            violations.push(Violation::new("cid", "CID obrigatório para titular PCD"));
        }
        if opt_blank(&draft.disability_description) {
            violations.push(Violation::new(
                "disabilityDescription",
                "descrição obrigatória para titular PCD",
            ));
        }
    }

    if draft.elderly {
        match draft.elderly_age {
            Some(age) if age >= 60 => {}
            Some(_) => violations.push(Violation::new("elderlyAge", "idade mínima de 60 anos")),
            None => violations.push(Violation::new("elderlyAge", "idade obrigatória para idoso")),
        }
    }

    if draft.is_foreigner && opt_blank(&draft.foreign_doc_number) {
        violations.push(Violation::new(
            "foreignDocNumber",
            "documento obrigatório para estrangeiro",
        ));
    }

    if draft.has_government_assistance {
        if draft.government_assistance.is_empty() {
            violations.push(Violation::new(
                "governmentAssistance",
                "informe ao menos um auxílio",
            ));
        }
        for (i, entry) in draft.government_assistance.iter().enumerate() {
            if is_blank(&entry.kind) {
                violations.push(Violation::new(
                    &format!("governmentAssistance[{}].type", i),
                    "tipo obrigatório",
                ));
            }
            if is_blank(&entry.value) {
                violations.push(Violation::new(
                    &format!("governmentAssistance[{}].value", i),
                    "valor obrigatório",
                ));
            }
        }
    }

    for (i, dependent) in draft.dependents.iter().enumerate() {
        check_dependent(&mut violations, i, dependent);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Validate the fields a partial update carries
///
/// Only rules whose fields are all present in the patch are checked; the
/// gateway validates the fully merged record when it has it (fallback path).
pub fn validate_patch(patch: &ResidentPatch) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    for (field, value) in [
        ("name", &patch.name),
        ("cpf", &patch.cpf),
        ("rg", &patch.rg),
        ("phone", &patch.phone),
        ("email", &patch.email),
        ("address", &patch.address),
    ] {
        if let Some(v) = value {
            check_required(&mut violations, field, v);
        }
    }

    if let Some(residents) = patch.residents {
        if residents < 1 {
            violations.push(Violation::new("residents", "deve ser ao menos 1"));
        }
    }

    if patch.has_disability == Some(true) {
        if patch_blank(&patch.cid) {
            violations.push(Violation::new("cid", "CID obrigatório para titular PCD"));
        }
        if patch_blank(&patch.disability_description) {
            violations.push(Violation::new(
                "disabilityDescription",
                "descrição obrigatória para titular PCD",
            ));
        }
    }

    if patch.elderly == Some(true) {
        match patch.elderly_age.flatten() {
            Some(age) if age >= 60 => {}
            Some(_) => violations.push(Violation::new("elderlyAge", "idade mínima de 60 anos")),
            None => violations.push(Violation::new("elderlyAge", "idade obrigatória para idoso")),
        }
    }

    if patch.is_foreigner == Some(true) && patch_blank(&patch.foreign_doc_number) {
        violations.push(Violation::new(
            "foreignDocNumber",
            "documento obrigatório para estrangeiro",
        ));
    }

    if patch.has_government_assistance == Some(true) {
        let empty = patch
            .government_assistance
            .as_ref()
            .map(|v| v.is_empty())
            .unwrap_or(true);
        if empty {
            violations.push(Violation::new(
                "governmentAssistance",
                "informe ao menos um auxílio",
            ));
        }
    }

    if let Some(entries) = &patch.government_assistance {
        for (i, entry) in entries.iter().enumerate() {
            if is_blank(&entry.kind) {
                violations.push(Violation::new(
                    &format!("governmentAssistance[{}].type", i),
                    "tipo obrigatório",
                ));
            }
            if is_blank(&entry.value) {
                violations.push(Violation::new(
                    &format!("governmentAssistance[{}].value", i),
                    "valor obrigatório",
                ));
            }
        }
    }

    if let Some(dependents) = &patch.dependents {
        for (i, dependent) in dependents.iter().enumerate() {
            check_dependent(&mut violations, i, dependent);
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
