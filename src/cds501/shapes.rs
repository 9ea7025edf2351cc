//! 事故 / 車両 / 当事者 への射影

use std::io::Write;

use serde::Serialize;
use tracing::{debug, warn};

use super::columns::{crash_indices, participant_indices, vehicle_indices, COLUMNS};
use super::{Cds501Row, RecordType};
use crate::error::CdsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Shape {
    Crash,
    Vehicle,
    Participant,
}

impl Shape {
    /// CDS501 上の列位置
    pub fn indices(self) -> Vec<usize> {
        match self {
            Shape::Crash => crash_indices().collect(),
            Shape::Vehicle => vehicle_indices().collect(),
            Shape::Participant => participant_indices().collect(),
        }
    }

    pub fn column_names(self) -> Vec<&'static str> {
        self.indices().into_iter().map(|i| COLUMNS[i].0).collect()
    }

    fn project(self, row: &Cds501Row) -> Vec<String> {
        self.indices()
            .into_iter()
            .map(|i| row.values()[i].trim().to_string())
            .collect()
    }
}

/// 射影済みレコード共通の操作
pub trait Record {
    const SHAPE: Shape;

    fn values(&self) -> &[String];

    /// 列名で取得 (空欄は `None`)
    fn get(&self, name: &str) -> Option<&str> {
        let position = Self::SHAPE
            .column_names()
            .iter()
            .position(|column| *column == name)?;
        self.values()
            .get(position)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crash {
    pub crash_id: i64,
    values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    pub crash_id: i64,
    pub vhcl_id: i64,
    values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub crash_id: i64,
    /// 歩行者などは車両を持たない
    pub vhcl_id: Option<i64>,
    pub partic_id: i64,
    values: Vec<String>,
}

impl Record for Crash {
    const SHAPE: Shape = Shape::Crash;

    fn values(&self) -> &[String] {
        &self.values
    }
}

impl Record for Vehicle {
    const SHAPE: Shape = Shape::Vehicle;

    fn values(&self) -> &[String] {
        &self.values
    }
}

impl Record for Participant {
    const SHAPE: Shape = Shape::Participant;

    fn values(&self) -> &[String] {
        &self.values
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Split {
    pub crashes: Vec<Crash>,
    pub vehicles: Vec<Vehicle>,
    pub participants: Vec<Participant>,
}

/// レコード種別ごとに振り分け、それぞれの列集合に射影する
///
/// キーとなるIDを欠く行と種別不明の行は捨てる。
pub fn split<'a>(rows: impl IntoIterator<Item = &'a Cds501Row>) -> Split {
    let mut split = Split::default();
    for row in rows {
        let Some(crash_id) = row.crash_id() else {
            warn!("Skipping CDS501 row without crash_id");
            continue;
        };
        match row.record_type() {
            Some(RecordType::Crash) => split.crashes.push(Crash {
                crash_id,
                values: Shape::Crash.project(row),
            }),
            Some(RecordType::Vehicle) => match row.vhcl_id() {
                Some(vhcl_id) => split.vehicles.push(Vehicle {
                    crash_id,
                    vhcl_id,
                    values: Shape::Vehicle.project(row),
                }),
                None => warn!("Skipping vehicle row without vhcl_id (crash {})", crash_id),
            },
            Some(RecordType::Participant) => match row.partic_id() {
                Some(partic_id) => split.participants.push(Participant {
                    crash_id,
                    vhcl_id: row.vhcl_id(),
                    partic_id,
                    values: Shape::Participant.project(row),
                }),
                None => warn!("Skipping participant row without partic_id (crash {})", crash_id),
            },
            None => debug!("Unknown record type {:?} (crash {})", row.get("rec_typ_cd"), crash_id),
        }
    }
    split
}

/// 列名付きの表
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn of<R: Record>(records: &[R]) -> Self {
        Self {
            columns: R::SHAPE.column_names(),
            rows: records.iter().map(|r| r.values().to_vec()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// ヘッダー付きCSVとして書き出す
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), CdsError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tables {
    pub crash: Table,
    pub vehicle: Table,
    pub participant: Table,
}

impl Split {
    pub fn to_tables(&self) -> Tables {
        Tables {
            crash: Table::of(&self.crashes),
            vehicle: Table::of(&self.vehicles),
            participant: Table::of(&self.participants),
        }
    }
}

pub fn to_tables<'a>(rows: impl IntoIterator<Item = &'a Cds501Row>) -> Tables {
    split(rows).to_tables()
}
