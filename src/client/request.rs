//! 抽出リクエストのパラメータ

use std::fmt;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CdsError;
use crate::form::FieldId;

/// 市外を表す市コード / ラベル
pub const OUTSIDE_CITY_LIMITS: [&str; 2] = ["000", "Outside City Limits"];

/// 道路種別タブ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoadType {
    All,
    Highway,
    Local,
}

impl RoadType {
    pub fn label(self) -> &'static str {
        match self {
            RoadType::All => "All Roads",
            RoadType::Highway => "Highways",
            RoadType::Local => "Local Roads",
        }
    }

    /// このタブで取得できるレポート
    pub fn extracts(self) -> &'static [Extract] {
        match self {
            RoadType::All => &[
                Extract::Cds150,
                Extract::Cds160,
                Extract::Cds200,
                Extract::Cds250,
                Extract::Cds280,
                Extract::Cds501,
                Extract::Cds510,
            ],
            RoadType::Local => &[
                Extract::Cds150,
                Extract::Cds160,
                Extract::Cds190b,
                Extract::Cds380,
                Extract::Cds390,
                Extract::Cds501,
                Extract::Cds510,
            ],
            RoadType::Highway => &[
                Extract::Cds150,
                Extract::Cds380,
                Extract::Cds390,
                Extract::Cds501,
                Extract::Cds510,
                Extract::Direction,
                Extract::Rrr,
            ],
        }
    }
}

impl fmt::Display for RoadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// レポート / 抽出の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Extract {
    Cds150,
    Cds160,
    Cds190b,
    Cds200,
    Cds250,
    Cds280,
    Cds380,
    Cds390,
    /// 事故・車両・当事者の生データ (CSV)
    Cds501,
    /// 参照テーブル (Access DB)
    Cds510,
    Direction,
    Rrr,
}

impl Extract {
    pub const ALL: [Extract; 12] = [
        Extract::Cds150,
        Extract::Cds160,
        Extract::Cds190b,
        Extract::Cds200,
        Extract::Cds250,
        Extract::Cds280,
        Extract::Cds380,
        Extract::Cds390,
        Extract::Cds501,
        Extract::Cds510,
        Extract::Direction,
        Extract::Rrr,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Extract::Cds150 => "CDS150",
            Extract::Cds160 => "CDS160",
            Extract::Cds190b => "CDS190b",
            Extract::Cds200 => "CDS200",
            Extract::Cds250 => "CDS250",
            Extract::Cds280 => "CDS280",
            Extract::Cds380 => "CDS380",
            Extract::Cds390 => "CDS390",
            Extract::Cds501 => "CDS501",
            Extract::Cds510 => "CDS510",
            Extract::Direction => "DIRECTION",
            Extract::Rrr => "RRR",
        }
    }
}

impl fmt::Display for Extract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// タブとレポートに対応するボタン
///
/// タブで提供されない組み合わせは通信前にエラーにする。
pub fn command_field(road_type: RoadType, extract: Extract) -> Result<FieldId, CdsError> {
    use Extract::*;
    let field = match (road_type, extract) {
        (RoadType::All, Cds150) => Some(FieldId::AllRoadsCds150),
        (RoadType::All, Cds160) => Some(FieldId::AllRoadsCds160),
        (RoadType::All, Cds200) => Some(FieldId::AllRoadsCds200),
        (RoadType::All, Cds250) => Some(FieldId::AllRoadsCds250),
        (RoadType::All, Cds280) => Some(FieldId::AllRoadsCds280),
        (RoadType::All, Cds501) => Some(FieldId::AllRoadsCds501),
        (RoadType::All, Cds510) => Some(FieldId::AllRoadsCds510),
        (RoadType::Local, Cds150) => Some(FieldId::LocalRoadsCds150),
        (RoadType::Local, Cds160) => Some(FieldId::LocalRoadsCds160),
        (RoadType::Local, Cds190b) => Some(FieldId::LocalRoadsCds190b),
        (RoadType::Local, Cds380) => Some(FieldId::LocalRoadsCds380),
        (RoadType::Local, Cds390) => Some(FieldId::LocalRoadsCds390),
        (RoadType::Local, Cds501) => Some(FieldId::LocalRoadsCds501),
        (RoadType::Local, Cds510) => Some(FieldId::LocalRoadsCds510),
        (RoadType::Highway, Cds150) => Some(FieldId::HighwaysCds150),
        (RoadType::Highway, Cds380) => Some(FieldId::HighwaysCds380),
        (RoadType::Highway, Cds390) => Some(FieldId::HighwaysCds390),
        (RoadType::Highway, Cds501) => Some(FieldId::HighwaysCds501),
        (RoadType::Highway, Cds510) => Some(FieldId::HighwaysCds510),
        (RoadType::Highway, Direction) => Some(FieldId::HighwaysDirection),
        (RoadType::Highway, Rrr) => Some(FieldId::HighwaysRrr),
        _ => None,
    };
    field.ok_or_else(|| CdsError::InvalidRoadTypeExtract {
        extract: extract.to_string(),
        road_type: road_type.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighwayType {
    All,
    FrontageRoad,
    Mainline,
    Connection,
    Spur,
}

impl HighwayType {
    pub(crate) fn checkbox(self) -> FieldId {
        match self {
            HighwayType::All => FieldId::HighwaysAllTypes,
            HighwayType::FrontageRoad => FieldId::HighwaysFrontageRoads,
            HighwayType::Mainline => FieldId::HighwaysMainline,
            HighwayType::Connection => FieldId::HighwaysConnections,
            HighwayType::Spur => FieldId::HighwaysSpur,
        }
    }
}

/// 出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportFormat {
    Excel,
    Print,
}

impl ReportFormat {
    /// Excel 形式のラジオボタンコード
    pub(crate) fn excel_code(road_type: RoadType) -> &'static str {
        match road_type {
            RoadType::All => "rdoSumReportFormatXLS",
            RoadType::Local => "rdoLclReportFormatXLS",
            RoadType::Highway => "rdoHwyReportFormatXLS",
        }
    }
}

/// 直近の完了した暦年 (`today` が12/31ならその年)
pub fn last_complete_year(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let year = if today.month() == 12 && today.day() == 31 {
        today.year()
    } else {
        today.year() - 1
    };
    // 12/31 と 1/1 は常に有効な日付
    let begin = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(today);
    let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(today);
    (begin, end)
}

/// 抽出リクエスト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub road_type: RoadType,
    pub extract: Extract,
    /// `County` / `City` (All Roads タブのみ)
    pub jurisdiction: String,
    pub county: String,
    pub city: String,
    pub street: String,
    pub cross_street: String,
    /// 空ならタブと市から決める
    pub query_type: String,
    pub begin_date: NaiveDate,
    pub end_date: NaiveDate,
    pub highway: String,
    pub begin_mile_point: Option<f64>,
    pub end_mile_point: Option<f64>,
    pub highway_type: HighwayType,
    pub z_mile_points: bool,
    pub add_mileage: bool,
    pub non_add_mileage: bool,
    /// この番号から5000件
    pub record_number: Option<u32>,
    pub display_instructions: bool,
    pub report_format: ReportFormat,
}

impl Default for ExtractRequest {
    fn default() -> Self {
        Self::new(RoadType::All, Extract::Cds501)
    }
}

impl ExtractRequest {
    pub fn new(road_type: RoadType, extract: Extract) -> Self {
        let (begin_date, end_date) = last_complete_year(Local::now().date_naive());
        Self {
            road_type,
            extract,
            jurisdiction: String::new(),
            county: String::new(),
            city: String::new(),
            street: String::new(),
            cross_street: String::new(),
            query_type: String::new(),
            begin_date,
            end_date,
            highway: String::new(),
            begin_mile_point: None,
            end_mile_point: None,
            highway_type: HighwayType::All,
            z_mile_points: true,
            add_mileage: true,
            non_add_mileage: true,
            record_number: None,
            display_instructions: false,
            report_format: ReportFormat::Excel,
        }
    }

    pub fn with_jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.jurisdiction = jurisdiction.into();
        self
    }

    pub fn with_county(mut self, county: impl Into<String>) -> Self {
        self.county = county.into();
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn with_street(mut self, street: impl Into<String>) -> Self {
        self.street = street.into();
        self
    }

    pub fn with_cross_street(mut self, cross_street: impl Into<String>) -> Self {
        self.cross_street = cross_street.into();
        self
    }

    pub fn with_query_type(mut self, query_type: impl Into<String>) -> Self {
        self.query_type = query_type.into();
        self
    }

    pub fn with_dates(mut self, begin_date: NaiveDate, end_date: NaiveDate) -> Self {
        self.begin_date = begin_date;
        self.end_date = end_date;
        self
    }

    pub fn with_highway(mut self, highway: impl Into<String>) -> Self {
        self.highway = highway.into();
        self
    }

    pub fn with_mile_points(mut self, begin: f64, end: f64) -> Self {
        self.begin_mile_point = Some(begin);
        self.end_mile_point = Some(end);
        self
    }

    pub fn with_highway_type(mut self, highway_type: HighwayType) -> Self {
        self.highway_type = highway_type;
        self
    }

    pub fn with_z_mile_points(mut self, z_mile_points: bool) -> Self {
        self.z_mile_points = z_mile_points;
        self
    }

    pub fn with_mileage(mut self, add_mileage: bool, non_add_mileage: bool) -> Self {
        self.add_mileage = add_mileage;
        self.non_add_mileage = non_add_mileage;
        self
    }

    pub fn with_record_number(mut self, record_number: u32) -> Self {
        self.record_number = Some(record_number);
        self
    }

    pub fn with_display_instructions(mut self, display_instructions: bool) -> Self {
        self.display_instructions = display_instructions;
        self
    }

    pub fn with_report_format(mut self, report_format: ReportFormat) -> Self {
        self.report_format = report_format;
        self
    }

    /// 押すべきボタン (組み合わせの検証を兼ねる)
    pub fn command(&self) -> Result<FieldId, CdsError> {
        command_field(self.road_type, self.extract)
    }

    /// 実際に使うクエリ種別
    pub fn effective_query_type(&self) -> &str {
        if !self.query_type.is_empty() {
            return &self.query_type;
        }
        match self.road_type {
            RoadType::All => "All Roads",
            RoadType::Local if OUTSIDE_CITY_LIMITS.contains(&self.city.as_str()) => {
                "Mile-Pointed County Road"
            }
            RoadType::Local => "Street Segment & Intersectional",
            RoadType::Highway => "",
        }
    }

    /// 走行方向のラジオボタンコード
    pub fn mileage_code(&self) -> &'static str {
        match (self.add_mileage, self.non_add_mileage) {
            (true, true) => "B",
            (true, false) => "Y",
            (false, true) => "N",
            (false, false) => "",
        }
    }
}

/// 0 / 未指定は空文字
pub(crate) fn optional_number<N: PartialEq + Default + ToString>(value: Option<N>) -> String {
    match value {
        Some(n) if n != N::default() => n.to_string(),
        _ => String::new(),
    }
}
