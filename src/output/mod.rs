//! 输出
//!
//! - `xlsx_writer` - 增强后的表格写出为工作簿
//! - `renderer` - 每条记录渲染一份文档
//! - `packaging` - 把渲染好的文档打成压缩包或写入目录

pub mod packaging;
pub mod renderer;
pub mod xlsx_writer;

pub use packaging::{assemble_documents, document_name, DirectorySink, PackagingSink, ZipSink};
pub use renderer::{DocumentRenderer, TeraRenderer};
pub use xlsx_writer::write_table;
