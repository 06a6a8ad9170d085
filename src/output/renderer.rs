//! 文档渲染
//!
//! 每条记录渲染一份文档，上下文是该行的全部列，缺失值统一为空字符串。

use std::path::Path;

use tera::{Context, Tera};

use crate::error::OutputError;
use crate::models::record::{Record, Table};

/// 文档渲染器
pub trait DocumentRenderer {
    /// 渲染一条记录
    fn render(&self, table: &Table, record: &Record) -> Result<Vec<u8>, OutputError>;

    /// 生成文档的扩展名（不含点）
    fn extension(&self) -> &str;
}

/// 基于 Tera 的文本模板渲染器
pub struct TeraRenderer {
    tera: Tera,
    extension: String,
}

impl TeraRenderer {
    const TEMPLATE_NAME: &'static str = "ficha";

    pub fn from_source(source: &str, extension: impl Into<String>) -> Result<Self, OutputError> {
        let mut tera = Tera::default();
        tera.add_raw_template(Self::TEMPLATE_NAME, source)?;
        Ok(Self {
            tera,
            extension: extension.into(),
        })
    }

    /// 从模板文件创建，扩展名沿用模板文件的扩展名
    pub async fn from_file(path: &Path) -> Result<Self, OutputError> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| OutputError::ReadFailed {
                path: path.display().to_string(),
                source,
            })?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("txt");
        Self::from_source(&source, extension)
    }
}

impl DocumentRenderer for TeraRenderer {
    fn render(&self, table: &Table, record: &Record) -> Result<Vec<u8>, OutputError> {
        let mut context = Context::new();
        for (column, value) in table.columns.iter().zip(table.row_values(record)) {
            context.insert(column.as_str(), value);
        }
        let rendered = self.tera.render(Self::TEMPLATE_NAME, &context)?;
        Ok(rendered.into_bytes())
    }

    fn extension(&self) -> &str {
        &self.extension
    }
}
