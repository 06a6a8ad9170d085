//! 文档打包
//!
//! 渲染好的文档按名称交给 [`PackagingSink`]：默认打成一个 zip 压缩包，也可以直接写入目录。

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::OutputError;
use crate::models::record::{Record, Table};
use crate::orchestrator::batch_processor::{BatchProgress, ProgressReporter};
use crate::output::renderer::DocumentRenderer;

/// 收集命名的文档
pub trait PackagingSink {
    /// 加入一份文档；同名文档直接覆盖
    fn add(&mut self, name: &str, bytes: &[u8]) -> Result<(), OutputError>;

    /// 已收集的文档数量（同名只算一份）
    fn count(&self) -> usize;

    /// 全部加入后调用一次
    fn finish(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}

/// 打成 zip 压缩包
///
/// 文档先留在内存里，`finish` 时一次写出，这样同名文档可以被后来者覆盖。
pub struct ZipSink {
    path: PathBuf,
    entries: Vec<(String, Vec<u8>)>,
}

impl ZipSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn archive_error(&self, source: zip::result::ZipError) -> OutputError {
        OutputError::ArchiveFailed {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl PackagingSink for ZipSink {
    fn add(&mut self, name: &str, bytes: &[u8]) -> Result<(), OutputError> {
        match self.entries.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, content)) => {
                debug!("覆盖同名文档: {}", name);
                *content = bytes.to_vec();
            }
            None => self.entries.push((name.to_string(), bytes.to_vec())),
        }
        Ok(())
    }

    fn count(&self) -> usize {
        self.entries.len()
    }

    fn finish(&mut self) -> Result<(), OutputError> {
        let path_str = self.path.display().to_string();
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| OutputError::write_failed(parent.display().to_string(), e))?;
        }

        let file =
            File::create(&self.path).map_err(|e| OutputError::write_failed(path_str.clone(), e))?;
        let mut archive = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, bytes) in &self.entries {
            archive
                .start_file(name.as_str(), options)
                .map_err(|e| self.archive_error(e))?;
            archive
                .write_all(bytes)
                .map_err(|e| OutputError::write_failed(path_str.clone(), e))?;
        }

        archive.finish().map_err(|e| self.archive_error(e))?;
        info!("✓ 压缩包已写出: {} ({} 份文档)", path_str, self.entries.len());
        Ok(())
    }
}

/// 写入目录
pub struct DirectorySink {
    dir: PathBuf,
    names: HashSet<String>,
}

impl DirectorySink {
    /// 创建目录（已存在则复用）
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, OutputError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| OutputError::write_failed(dir.display().to_string(), e))?;
        Ok(Self {
            dir,
            names: HashSet::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl PackagingSink for DirectorySink {
    fn add(&mut self, name: &str, bytes: &[u8]) -> Result<(), OutputError> {
        let path = self.dir.join(name);
        fs::write(&path, bytes)
            .map_err(|e| OutputError::write_failed(path.display().to_string(), e))?;
        debug!("写入文档: {}", path.display());
        self.names.insert(name.to_string());
        Ok(())
    }

    fn count(&self) -> usize {
        self.names.len()
    }
}

/// 文档名：标识列的值（`/` 和 `\` 替换为 `_`），缺失时为 `ficha_{行号}`
pub fn document_name(record: &Record, row_number: usize, id_column: &str, extension: &str) -> String {
    let base = record
        .get(id_column)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| id.replace(['/', '\\'], "_"))
        .unwrap_or_else(|| format!("ficha_{}", row_number));
    format!("{}.{}", base, extension)
}

/// 为每条记录渲染文档并交给打包器，返回文档数量
///
/// 任何一份文档渲染或写入失败都会中止整个装配过程。
pub fn assemble_documents(
    table: &Table,
    renderer: &dyn DocumentRenderer,
    sink: &mut dyn PackagingSink,
    id_column: &str,
    reporter: &dyn ProgressReporter,
) -> Result<usize, OutputError> {
    let total = table.len();
    info!("📄 开始装配 {} 份文档...", total);

    for (index, record) in table.rows.iter().enumerate() {
        let name = document_name(record, index + 1, id_column, renderer.extension());
        let bytes = renderer.render(table, record)?;
        sink.add(&name, &bytes)?;
        reporter.report(
            BatchProgress {
                completed: index + 1,
                total,
            },
            &name,
        );
    }

    sink.finish()?;
    reporter.finish("装配完成");
    Ok(sink.count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::batch_processor::NoProgress;
    use crate::output::renderer::TeraRenderer;
    use std::io::Read;

    fn sample_table() -> Table {
        Table::new(
            vec!["ItemId".to_string(), "Que_Evalua".to_string()],
            vec![
                Record::from_iter([("ItemId", "IT-1"), ("Que_Evalua", "Inferir")]),
                Record::from_iter([("Que_Evalua", "Comparar")]),
                // 与第一条同名，覆盖
                Record::from_iter([("ItemId", "IT-1"), ("Que_Evalua", "Deducir")]),
            ],
        )
    }

    fn read_entry(archive: &mut zip::ZipArchive<File>, name: &str) -> String {
        let mut content = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
    }

    #[test]
    fn test_document_name() {
        let record = Record::from_iter([("ItemId", "LC/07\\b")]);
        assert_eq!(document_name(&record, 1, "ItemId", "txt"), "LC_07_b.txt");

        let record = Record::from_iter([("Otro", "x")]);
        assert_eq!(document_name(&record, 3, "ItemId", "docx"), "ficha_3.docx");
    }

    #[test]
    fn test_assemble_into_zip_archive() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("fichas_tecnicas_generadas.zip");
        let renderer = TeraRenderer::from_source("{{ Que_Evalua }}", "txt").unwrap();
        let mut sink = ZipSink::new(&zip_path);

        let count =
            assemble_documents(&sample_table(), &renderer, &mut sink, "ItemId", &NoProgress)
                .unwrap();
        assert_eq!(count, 2);

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(read_entry(&mut archive, "IT-1.txt"), "Deducir");
        assert_eq!(read_entry(&mut archive, "ficha_2.txt"), "Comparar");
    }

    #[test]
    fn test_zip_sink_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("salida").join("fichas.zip");
        let mut sink = ZipSink::new(&zip_path);

        sink.add("a.txt", b"uno").unwrap();
        sink.finish().unwrap();

        assert!(sink.path().exists());
    }

    #[test]
    fn test_assemble_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = TeraRenderer::from_source("{{ Que_Evalua }}", "txt").unwrap();
        let mut sink = DirectorySink::create(dir.path().join("fichas")).unwrap();

        let count =
            assemble_documents(&sample_table(), &renderer, &mut sink, "ItemId", &NoProgress)
                .unwrap();

        assert_eq!(count, 2);
        let first = fs::read_to_string(sink.dir().join("IT-1.txt")).unwrap();
        assert_eq!(first, "Deducir");
        let second = fs::read_to_string(sink.dir().join("ficha_2.txt")).unwrap();
        assert_eq!(second, "Comparar");
    }
}
