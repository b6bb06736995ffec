//! Formatting of records into the labeled export row
//!
//! Both export artifacts share one flat row of Portuguese-labeled columns;
//! the PDF additionally splits it into an essential and a detail group.

use chrono::{DateTime, Utc};

use crate::model::Resident;

/// Every column of the flat export row, in output order
pub const ALL_COLUMNS: [&str; 20] = [
    "Nome",
    "CPF",
    "RG",
    "Telefone",
    "Email",
    "Endereço",
    "Tipo de Moradia",
    "Número de Moradores",
    "É PCD",
    "CID",
    "Descrição da Deficiência",
    "É Idoso",
    "Idade (se idoso)",
    "É Estrangeiro",
    "Documento Estrangeiro",
    "Recebe Auxílio",
    "Auxílios",
    "Dependentes",
    "Data de Cadastro",
    "Última Atualização",
];

/// The summary-table columns of the PDF export
pub const ESSENTIAL_COLUMNS: [&str; 12] = [
    "Nome",
    "CPF",
    "RG",
    "Telefone",
    "Email",
    "Endereço",
    "Tipo de Moradia",
    "Número de Moradores",
    "É PCD",
    "É Idoso",
    "É Estrangeiro",
    "Recebe Auxílio",
];

/// The per-record detail-table columns of the PDF export
pub const DETAIL_COLUMNS: [&str; 7] = [
    "CID",
    "Idade (se idoso)",
    "Documento Estrangeiro",
    "Auxílios",
    "Dependentes",
    "Data de Cadastro",
    "Última Atualização",
];

fn yes_no(value: bool) -> &'static str {
    if value {
        "Sim"
    } else {
        "Não"
    }
}

fn date_br(value: &DateTime<Utc>) -> String {
    value.format("%d/%m/%Y").to_string()
}

/// One record rendered as the flat labeled row
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedRow {
    pub name: String,
    pub cpf: String,
    pub rg: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub housing: String,
    pub residents: String,
    pub is_pcd: String,
    pub cid: String,
    pub disability_description: String,
    pub is_elderly: String,
    pub elderly_age: String,
    pub is_foreigner: String,
    pub foreign_doc: String,
    pub has_assistance: String,
    pub assistance: String,
    pub dependents: String,
    pub registered_at: String,
    pub updated_at: String,
}

impl FormattedRow {
    /// Format one record; every record is exported, not just the filtered page
    pub fn from_resident(resident: &Resident) -> Self {
        let assistance = if resident.has_government_assistance {
            resident
                .government_assistance
                .iter()
                .map(|a| format!("{}: R$ {}", a.kind, a.value))
                .collect::<Vec<_>>()
                .join("; ")
        } else {
            "-".to_string()
        };

        let dependents = if resident.dependents.is_empty() {
            "-".to_string()
        } else {
            resident
                .dependents
                .iter()
                .map(|d| {
                    let mut text = format!("Faixa: {}", d.age_range.as_str());
                    if d.has_disability {
                        text.push_str(&format!(
                            ", PCD (CID: {} - {})",
                            d.cid.as_deref().unwrap_or("-"),
                            d.disability_description.as_deref().unwrap_or("-"),
                        ));
                    }
                    text
                })
                .collect::<Vec<_>>()
                .join("; ")
        };

        Self {
            name: resident.name.clone(),
            cpf: resident.cpf.clone(),
            rg: resident.rg.clone(),
            phone: resident.phone.clone(),
            email: resident.email.clone(),
            address: resident.address.clone(),
            housing: resident.housing.label().to_string(),
            residents: resident.residents.to_string(),
            is_pcd: yes_no(resident.has_disability).to_string(),
            cid: resident.cid.clone().unwrap_or_else(|| "-".to_string()),
            disability_description: resident
                .disability_description
                .clone()
                .unwrap_or_else(|| "-".to_string()),
            is_elderly: yes_no(resident.elderly).to_string(),
            elderly_age: resident
                .elderly_age
                .filter(|_| resident.elderly)
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".to_string()),
            is_foreigner: yes_no(resident.is_foreigner).to_string(),
            foreign_doc: resident
                .foreign_doc_number
                .clone()
                .unwrap_or_else(|| "-".to_string()),
            has_assistance: yes_no(resident.has_government_assistance).to_string(),
            assistance,
            dependents,
            registered_at: date_br(&resident.created_at),
            updated_at: resident
                .updated_at
                .as_ref()
                .map(date_br)
                .unwrap_or_else(|| "-".to_string()),
        }
    }

    /// The value of one labeled column
    pub fn value(&self, column: &str) -> &str {
        match column {
            "Nome" => &self.name,
            "CPF" => &self.cpf,
            "RG" => &self.rg,
            "Telefone" => &self.phone,
            "Email" => &self.email,
            "Endereço" => &self.address,
            "Tipo de Moradia" => &self.housing,
            "Número de Moradores" => &self.residents,
            "É PCD" => &self.is_pcd,
            "CID" => &self.cid,
            "Descrição da Deficiência" => &self.disability_description,
            "É Idoso" => &self.is_elderly,
            "Idade (se idoso)" => &self.elderly_age,
            "É Estrangeiro" => &self.is_foreigner,
            "Documento Estrangeiro" => &self.foreign_doc,
            "Recebe Auxílio" => &self.has_assistance,
            "Auxílios" => &self.assistance,
            "Dependentes" => &self.dependents,
            "Data de Cadastro" => &self.registered_at,
            "Última Atualização" => &self.updated_at,
            _ => "",
        }
    }
}
