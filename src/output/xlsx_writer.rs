//! 增强后的表格写出为 XLSX

use std::path::Path;

use rust_xlsxwriter::Workbook;
use tracing::{debug, info};

use crate::error::TableError;
use crate::models::record::Table;

/// 输出工作表名
pub const SHEET_NAME: &str = "Datos Enriquecidos";

/// XLSX 单元格最多容纳的字符数
pub const MAX_CELL_CHARS: usize = 32_767;

/// 写出整张表：第一行为表头，列顺序与 [`Table::columns`] 一致
pub fn write_table(table: &Table, path: &Path) -> Result<(), TableError> {
    let path_str = path.display().to_string();
    let to_error = |source| TableError::WriteFailed {
        path: path_str.clone(),
        source,
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(to_error)?;

    for (col, name) in table.columns.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, name.as_str())
            .map_err(to_error)?;
    }

    let mut truncated = 0usize;
    for (row, record) in table.rows.iter().enumerate() {
        for (col, value) in table.row_values(record).enumerate() {
            if value.is_empty() {
                continue;
            }
            let cell = fit_cell(value);
            if cell.len() != value.len() {
                truncated += 1;
            }
            worksheet
                .write_string(row as u32 + 1, col as u16, cell)
                .map_err(to_error)?;
        }
    }

    if truncated > 0 {
        debug!("{} 个单元格超出长度上限，已截断", truncated);
    }

    workbook.save(path).map_err(to_error)?;
    info!("✓ 已写出 {} 行到 {}", table.len(), path_str);
    Ok(())
}

/// 超过单元格上限的文本按字符截断
fn fit_cell(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((byte_index, _)) => &value[..byte_index],
        None => value,
    }
}
