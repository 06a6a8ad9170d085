use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use calamine::{open_workbook_auto, Data, Reader};
use regex::Regex;

use crate::error::TableError;
use crate::models::record::{Record, Table};

/// 从 Excel 工作簿的第一个工作表加载表格
///
/// 第一行是表头；全空的行会被跳过；文本单元格中的 HTML 标签会被去掉。
pub fn load_table(path: &Path) -> Result<Table, TableError> {
    let path_str = path.display().to_string();

    if !path.exists() {
        return Err(TableError::NotFound { path: path_str });
    }

    let mut workbook = open_workbook_auto(path).map_err(|source| TableError::OpenFailed {
        path: path_str.clone(),
        source,
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| TableError::NoWorksheet {
            path: path_str.clone(),
        })?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|source| TableError::OpenFailed {
            path: path_str.clone(),
            source,
        })?;

    let mut rows_iter = range.rows();
    let header_row = rows_iter.next().ok_or_else(|| TableError::EmptyWorksheet {
        path: path_str.clone(),
    })?;

    let columns = unique_headers(header_row.iter().enumerate().map(|(index, cell)| {
        let name = cell_to_string(cell).trim().to_string();
        if name.is_empty() {
            format!("Columna_{}", index + 1)
        } else {
            name
        }
    }));

    let mut rows = Vec::new();
    for row in rows_iter {
        let values: Vec<String> = row.iter().map(|cell| strip_html(&cell_to_string(cell))).collect();
        if values.iter().all(|value| value.trim().is_empty()) {
            continue;
        }

        let record: Record = columns
            .iter()
            .zip(values)
            .filter(|(_, value)| !value.is_empty())
            .map(|(column, value)| (column.clone(), value))
            .collect();
        rows.push(record);
    }

    tracing::info!(
        "已加载工作表 '{}': {} 列, {} 行",
        sheet_name,
        columns.len(),
        rows.len()
    );

    Ok(Table::new(columns, rows))
}

/// 重复的表头依次加后缀 `.1`、`.2`……，保证每列都有独立的名字
fn unique_headers(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut columns = Vec::new();
    for name in names {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", name, suffix);
            suffix += 1;
        }
        seen.insert(candidate.clone());
        columns.push(candidate);
    }
    columns
}

/// 去掉文本中的 HTML 标签
pub fn strip_html(text: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let tag = TAG.get_or_init(|| Regex::new(r"(?s)<.*?>").expect("固定正则"));
    tag.replace_all(text, "").into_owned()
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        // 整数值的浮点单元格（如年级 3.0）按整数输出
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", *value as i64)
        }
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::Error(_) => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hola <b>mundo</b></p>"), "Hola mundo");
        assert_eq!(strip_html("<span\nclass=\"x\">a</span>"), "a");
        assert_eq!(strip_html("3 < 4"), "3 < 4");
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Float(3.0)), "3");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::String("B".to_string())), "B");
    }

    #[test]
    fn test_duplicate_headers_get_suffixes() {
        let names = ["ItemId", "Nota", "Nota", "Nota.1", "Nota"].map(String::from);
        assert_eq!(
            unique_headers(names.into_iter()),
            vec!["ItemId", "Nota", "Nota.1", "Nota.1.1", "Nota.2"]
        );
    }

    #[test]
    fn test_duplicate_header_columns_keep_their_own_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duplicados.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, value) in ["ItemId", "Nota", "Nota"].iter().enumerate() {
            sheet.write_string(0, col as u16, *value).unwrap();
        }
        for (col, value) in ["IT-1", "primera", "segunda"].iter().enumerate() {
            sheet.write_string(1, col as u16, *value).unwrap();
        }
        workbook.save(&path).unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table.columns, vec!["ItemId", "Nota", "Nota.1"]);
        assert_eq!(table.rows[0].get("Nota"), Some("primera"));
        assert_eq!(table.rows[0].get("Nota.1"), Some("segunda"));
    }

    #[test]
    fn test_missing_workbook() {
        let err = load_table(Path::new("no_existe.xlsx")).unwrap_err();
        assert!(matches!(err, TableError::NotFound { .. }));
    }
}
