use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{AppError, AppResult, FileError};
use crate::models::document::SourceDocument;

/// 从文件加载原文并转换为 SourceDocument 对象
///
/// - `.pdf`：用 `pdf-extract` 提取文本（在阻塞线程中执行）
/// - `.txt` / `.md`：按 UTF-8 读取
///
/// 文档 ID 和标题都取文件名（不含扩展名）。
pub async fn load_source_document(path: &Path) -> AppResult<SourceDocument> {
    let path_str = path.display().to_string();

    if !fs::try_exists(path).await.unwrap_or(false) {
        return Err(FileError::NotFound { path: path_str }.into());
    }

    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);

    let text = match extension.as_deref() {
        Some("pdf") => extract_pdf_text(path.to_path_buf()).await?,
        Some("txt") | Some("md") => fs::read_to_string(path)
            .await
            .map_err(|e| AppError::file_read_failed(&path_str, e))?,
        _ => return Err(FileError::UnsupportedType { path: path_str }.into()),
    };

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    tracing::info!(
        "成功加载文档 {}，共 {} 个字符",
        path_str,
        text.chars().count()
    );

    Ok(SourceDocument::new(stem.clone(), stem, text))
}

async fn extract_pdf_text(path: PathBuf) -> AppResult<String> {
    let path_str = path.display().to_string();
    let joined = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path))
        .await
        .map_err(|e| AppError::Other(format!("PDF 提取任务异常退出: {}", e)))?;

    joined.map_err(|e| {
        AppError::File(FileError::PdfExtractFailed {
            path: path_str,
            message: e.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_text_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lecture-notes.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Ownership is Rust's most unique feature.").unwrap();

        let doc = load_source_document(&path).await.unwrap();
        assert_eq!(doc.id, "lecture-notes");
        assert_eq!(doc.title, "lecture-notes");
        assert!(doc.text.starts_with("Ownership"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = load_source_document(Path::new("/definitely/not/here.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::File(FileError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slides.pptx");
        std::fs::write(&path, b"binary").unwrap();

        let err = load_source_document(&path).await.unwrap_err();
        assert!(matches!(err, AppError::File(FileError::UnsupportedType { .. })));
    }
}
