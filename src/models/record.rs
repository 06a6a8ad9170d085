use std::collections::HashMap;

use crate::models::fields::DerivedFields;

/// 表格中的一行
///
/// 单元格按列名存取；空单元格等同于不存在。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    cells: HashMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取单元格
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// 读取单元格，缺失时返回空字符串
    pub fn get_or_empty(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(column.into(), value.into());
    }

    /// 写回派生字段
    pub fn apply(&mut self, fields: &DerivedFields) {
        for (column, value) in fields.iter() {
            self.set(column, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.set(column, value);
        }
        record
    }
}

/// 有序的表格：列名顺序 + 行
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// 追加缺失的列，并把这些列在每一行初始化为空字符串
    pub fn ensure_columns<'a>(&mut self, columns: impl IntoIterator<Item = &'a str>) {
        for column in columns {
            if self.has_column(column) {
                continue;
            }
            self.columns.push(column.to_string());
            for row in &mut self.rows {
                row.set(column, "");
            }
        }
    }

    /// 按列顺序取出一行的值，缺失值为空字符串
    pub fn row_values<'a>(&'a self, record: &'a Record) -> impl Iterator<Item = &'a str> + 'a {
        self.columns.iter().map(move |c| record.get_or_empty(c))
    }
}
