//! CDS501 抽出 (事故・車両・当事者の生データ) のデコード
//!
//! 1行は152列で、`rec_typ_cd` によって事故 / 車両 / 当事者のいずれかを表す。

mod columns;
mod shapes;

use serde::Serialize;
use tracing::debug;

use crate::error::CdsError;

use columns::RECORD_TYPE;

pub use columns::{position, ColumnType, COLUMNS, COLUMN_COUNT};
pub use shapes::{split, to_tables, Crash, Participant, Record, Shape, Split, Table, Tables, Vehicle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordType {
    Crash,
    Vehicle,
    Participant,
}

impl RecordType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(RecordType::Crash),
            "2" => Some(RecordType::Vehicle),
            "3" => Some(RecordType::Participant),
            _ => None,
        }
    }
}

/// CDS501 の1行 (列順どおりの文字列)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cds501Row {
    values: Vec<String>,
}

impl Cds501Row {
    /// 末尾の空列が省略されている場合は補う
    pub fn new(mut values: Vec<String>) -> Result<Self, CdsError> {
        if values.len() > COLUMN_COUNT {
            return Err(CdsError::UnexpectedContentType {
                expected: format!("CDS501 ({} columns)", COLUMN_COUNT),
                preview: values.iter().take(8).cloned().collect::<Vec<_>>().join(","),
            });
        }
        values.resize(COLUMN_COUNT, String::new());
        Ok(Self { values })
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// 空欄は `None`
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values
            .get(index)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// 列名で取得 (重複する列名は最初の列)
    pub fn get(&self, name: &str) -> Option<&str> {
        position(name).and_then(|index| self.value(index))
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    pub fn decimal(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(parse_flag)
    }

    pub fn crash_id(&self) -> Option<i64> {
        self.int("crash_id")
    }

    pub fn record_type(&self) -> Option<RecordType> {
        self.value(RECORD_TYPE).and_then(RecordType::from_code)
    }

    pub fn vhcl_id(&self) -> Option<i64> {
        self.int("vhcl_id")
    }

    pub fn partic_id(&self) -> Option<i64> {
        self.int("partic_id")
    }
}

pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_uppercase().as_str() {
        "1" | "Y" | "YES" | "TRUE" => Some(true),
        "0" | "N" | "NO" | "FALSE" => Some(false),
        _ => None,
    }
}

/// CSV をデコードする (先頭のヘッダー行は読み飛ばす)
pub fn read(bytes: &[u8]) -> Result<Vec<Cds501Row>, CdsError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let first = record.get(0).unwrap_or("").trim();
        if line == 0 && first.parse::<i64>().is_err() {
            debug!("Skipping CDS501 header row starting with {:?}", first);
            continue;
        }
        rows.push(Cds501Row::new(record.iter().map(str::to_string).collect())?);
    }
    debug!("Decoded {} CDS501 rows", rows.len());
    Ok(rows)
}
