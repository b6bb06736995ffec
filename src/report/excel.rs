//! Spreadsheet export of the full record set

use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};

use super::format::{FormattedRow, ALL_COLUMNS};
use crate::error::Error;
use crate::model::Resident;

/// File name of the spreadsheet artifact
pub const EXCEL_FILE_NAME: &str = "cadastro-moradores.xlsx";

/// Write every record as one labeled row on a single "Moradores" sheet
///
/// The workbook is rendered to a buffer first; the file is only written
/// after generation succeeds, so no partial download is left behind.
pub(super) fn export(records: &[Resident], dir: &Path) -> Result<PathBuf, Error> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Moradores").map_err(Error::export)?;

    let header = Format::new().set_bold();
    for (col, label) in ALL_COLUMNS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *label, &header)
            .map_err(Error::export)?;
    }

    for (i, resident) in records.iter().enumerate() {
        let row = FormattedRow::from_resident(resident);
        for (col, label) in ALL_COLUMNS.iter().enumerate() {
            worksheet
                .write_string((i + 1) as u32, col as u16, row.value(label))
                .map_err(Error::export)?;
        }
    }

    let buffer = workbook.save_to_buffer().map_err(Error::export)?;

    fs::create_dir_all(dir)?;
    let path = dir.join(EXCEL_FILE_NAME);
    fs::write(&path, buffer)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Housing, ResidentDraft};
    use chrono::Utc;
    use uuid::Uuid;

    fn sample(name: &str) -> Resident {
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
    fn writes_a_workbook_to_the_target_directory() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![sample("Maria"), sample("João")];
        let path = export(&records, dir.path()).unwrap();

        assert_eq!(path.file_name().unwrap(), EXCEL_FILE_NAME);
        let bytes = fs::read(&path).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn exports_an_empty_record_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = export(&[], dir.path()).unwrap();
        assert!(path.exists());
    }
}
