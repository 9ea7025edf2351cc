//! 取得したレポートの判定・保存

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::cds501::{self, Cds501Row};
use crate::client::{Extract, ReportFormat};
use crate::error::CdsError;
use crate::transport::PortalResponse;

/// OLE2 (xls)
pub const SPREADSHEET_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Access (Jet DB)
pub const DATABASE_MAGIC: &[u8] = b"\x00\x01\x00\x00Standard Jet DB\x00\x01\x00\x00";

const PREVIEW_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportKind {
    Csv,
    Spreadsheet,
    Database,
    /// 印刷形式 (検証なし)
    Document,
}

impl ReportKind {
    pub fn of(extract: Extract, format: ReportFormat) -> Self {
        match (extract, format) {
            (Extract::Cds501, _) => ReportKind::Csv,
            (Extract::Cds510, _) => ReportKind::Database,
            (_, ReportFormat::Excel) => ReportKind::Spreadsheet,
            (_, ReportFormat::Print) => ReportKind::Document,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ReportKind::Csv => "txt",
            ReportKind::Spreadsheet => "xls",
            ReportKind::Database => "mdb",
            ReportKind::Document => "html",
        }
    }
}

/// 抽出結果
#[derive(Debug, Clone)]
pub struct ExtractResponse {
    pub extract: Extract,
    pub format: ReportFormat,
    pub response: PortalResponse,
}

impl ExtractResponse {
    pub fn new(response: PortalResponse, extract: Extract, format: ReportFormat) -> Self {
        Self {
            extract,
            format,
            response,
        }
    }

    pub fn kind(&self) -> ReportKind {
        ReportKind::of(self.extract, self.format)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.response.body
    }

    /// 内容が要求した種類か確認する
    ///
    /// サーバーがエラーページを返した場合は `UnexpectedContentType` (再試行可)。
    pub fn verify(&self) -> Result<(), CdsError> {
        let body = self.bytes();
        if body.is_empty() {
            return Err(CdsError::EmptyResponse(format!(
                "{} のレスポンスが空です ({})",
                self.extract, self.response.url
            )));
        }
        let valid = match self.kind() {
            ReportKind::Spreadsheet => body.starts_with(SPREADSHEET_MAGIC),
            ReportKind::Database => body.starts_with(DATABASE_MAGIC),
            ReportKind::Csv => !looks_like_html(body),
            ReportKind::Document => true,
        };
        if valid {
            Ok(())
        } else {
            Err(CdsError::UnexpectedContentType {
                expected: format!("{:?}", self.kind()),
                preview: preview(body),
            })
        }
    }

    pub fn filename(&self) -> String {
        self.response
            .attachment_filename()
            .unwrap_or_else(|| format!("{}.{}", self.extract, self.kind().extension()))
    }

    /// `dir` に保存してパスを返す
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf, CdsError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        // ディレクトリ外への書き込みを防ぐ
        let filename = self.filename();
        let name = Path::new(&filename)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| format!("{}.{}", self.extract, self.kind().extension()).into());
        let path = dir.join(name);
        std::fs::write(&path, self.bytes())?;
        info!("{} を保存しました: {} ({}bytes)", self.extract, path.display(), self.bytes().len());
        Ok(path)
    }

    /// CDS501 の行として読む
    pub fn records(&self) -> Result<Vec<Cds501Row>, CdsError> {
        if self.kind() != ReportKind::Csv {
            return Err(CdsError::UnexpectedContentType {
                expected: "Csv".to_string(),
                preview: format!("{:?}", self.kind()),
            });
        }
        self.verify()?;
        cds501::read(self.bytes())
    }
}

fn looks_like_html(body: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&body[..body.len().min(PREVIEW_LEN)]).to_ascii_lowercase();
    let head = head.trim_start();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

fn preview(body: &[u8]) -> String {
    String::from_utf8_lossy(&body[..body.len().min(PREVIEW_LEN)]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &[u8]) -> PortalResponse {
        PortalResponse::new(200, "https://cds.test/sig/TVC/Reports/Download.aspx").with_body(body)
    }

    #[test]
    fn test_kind_by_extract_and_format() {
        assert_eq!(ReportKind::of(Extract::Cds501, ReportFormat::Excel), ReportKind::Csv);
        assert_eq!(ReportKind::of(Extract::Cds510, ReportFormat::Excel), ReportKind::Database);
        assert_eq!(
            ReportKind::of(Extract::Cds150, ReportFormat::Excel),
            ReportKind::Spreadsheet
        );
        assert_eq!(ReportKind::of(Extract::Rrr, ReportFormat::Print), ReportKind::Document);
    }

    #[test]
    fn test_spreadsheet_magic() {
        let mut body = SPREADSHEET_MAGIC.to_vec();
        body.extend_from_slice(b"rest of workbook");
        let ok = ExtractResponse::new(response(&body), Extract::Cds150, ReportFormat::Excel);
        assert!(ok.verify().is_ok());

        let html = ExtractResponse::new(
            response(b"<html><body>Error</body></html>"),
            Extract::Cds150,
            ReportFormat::Excel,
        );
        let err = html.verify().unwrap_err();
        assert!(matches!(err, CdsError::UnexpectedContentType { ref preview, .. } if preview.contains("Error")));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_database_magic() {
        let mut body = DATABASE_MAGIC.to_vec();
        body.extend_from_slice(b"tables");
        let ok = ExtractResponse::new(response(&body), Extract::Cds510, ReportFormat::Excel);
        assert!(ok.verify().is_ok());

        // "Standard Jet DB\0" の後ろの4バイトまで一致が必要
        let mut truncated = b"\x00\x01\x00\x00Standard Jet DB\x00".to_vec();
        truncated.extend_from_slice(&[0x02, 0x00, 0x00, 0x00]);
        let wrong_version =
            ExtractResponse::new(response(&truncated), Extract::Cds510, ReportFormat::Excel);
        assert!(matches!(
            wrong_version.verify(),
            Err(CdsError::UnexpectedContentType { .. })
        ));

        let bad = ExtractResponse::new(response(SPREADSHEET_MAGIC), Extract::Cds510, ReportFormat::Excel);
        assert!(bad.verify().is_err());
    }

    #[test]
    fn test_csv_rejects_html_and_empty() {
        let page = ExtractResponse::new(
            response(b"  <!DOCTYPE html><html></html>"),
            Extract::Cds501,
            ReportFormat::Excel,
        );
        assert!(page.verify().is_err());

        let empty = ExtractResponse::new(response(b""), Extract::Cds501, ReportFormat::Excel);
        assert!(matches!(empty.verify(), Err(CdsError::EmptyResponse(_))));
    }

    #[test]
    fn test_filename_and_save() {
        let with_name = ExtractResponse::new(
            response(b"1,1").with_header("Content-Disposition", "attachment; filename=CDS501.txt"),
            Extract::Cds501,
            ReportFormat::Excel,
        );
        assert_eq!(with_name.filename(), "CDS501.txt");

        let fallback = ExtractResponse::new(response(b"x"), Extract::Cds510, ReportFormat::Excel);
        assert_eq!(fallback.filename(), "CDS510.mdb");

        let dir = tempfile::tempdir().unwrap();
        let path = with_name.save(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("CDS501.txt"));
        assert_eq!(std::fs::read(path).unwrap(), b"1,1");
    }

    #[test]
    fn test_save_strips_directories_from_filename() {
        let sneaky = ExtractResponse::new(
            response(b"x").with_header("Content-Disposition", "attachment; filename=../../evil.txt"),
            Extract::Cds501,
            ReportFormat::Excel,
        );
        let dir = tempfile::tempdir().unwrap();
        let path = sneaky.save(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("evil.txt"));
    }
}
