//! タブごとのフィールド設定と抽出の実行

use tracing::{info, warn};

use super::request::{optional_number, Extract, ExtractRequest, ReportFormat, RoadType};
use super::Client;
use crate::error::CdsError;
use crate::form::FieldId;
use crate::report::ExtractResponse;
use crate::traits::Transport;

/// 抽出の結果
#[derive(Debug, Clone)]
pub enum ExtractOutcome {
    Ready(ExtractResponse),
    /// 指定されたパラメータではボタンが無効 (レポートが存在しない)
    Unavailable {
        extract: Extract,
        road_type: RoadType,
        field: String,
    },
}

impl ExtractOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, ExtractOutcome::Ready(_))
    }

    pub fn into_response(self) -> Option<ExtractResponse> {
        match self {
            ExtractOutcome::Ready(response) => Some(response),
            ExtractOutcome::Unavailable { .. } => None,
        }
    }
}

impl<T: Transport> Client<T> {
    /// レポート / 抽出を取得する
    ///
    /// タブとレポートの組み合わせは通信前に検証する。
    pub async fn extract(&mut self, request: &ExtractRequest) -> Result<ExtractOutcome, CdsError> {
        let command = request.command()?;
        info!("抽出開始: {} ({})", request.extract, request.road_type);

        self.reset_form_fields().await?;
        match request.road_type {
            RoadType::All => self.set_all_roads_fields(request).await?,
            RoadType::Local => self.set_local_roads_fields(request).await?,
            RoadType::Highway => self.set_highways_fields(request).await?,
        }

        match self.click(command) {
            Ok(()) => {}
            Err(CdsError::DisabledFormElement { field }) => {
                warn!(
                    "{} is not available from {} for these parameters",
                    request.extract, request.road_type
                );
                return Ok(ExtractOutcome::Unavailable {
                    extract: request.extract,
                    road_type: request.road_type,
                    field,
                });
            }
            Err(e) => return Err(e),
        }

        let response = self.submit().await?;
        info!(
            "レポート受信: {} ({}bytes, status={})",
            request.extract,
            response.body.len(),
            response.status
        );
        Ok(ExtractOutcome::Ready(ExtractResponse::new(
            response,
            request.extract,
            request.report_format,
        )))
    }

    /// 出力形式ラジオボタンのコード
    fn format_code(&self, id: FieldId, request: &ExtractRequest) -> Result<String, CdsError> {
        let excel = ReportFormat::excel_code(request.road_type);
        match request.report_format {
            ReportFormat::Excel => Ok(excel.to_string()),
            ReportFormat::Print => self
                .fields
                .get(id)
                .options
                .codes()
                .find(|code| !code.is_empty() && *code != excel)
                .map(str::to_string)
                .ok_or_else(|| CdsError::NotFound {
                    kind: "Report format".to_string(),
                    query: "Print".to_string(),
                }),
        }
    }

    async fn set_all_roads_fields(&mut self, request: &ExtractRequest) -> Result<(), CdsError> {
        self.update_field(FieldId::AllRoadsJurisdiction, &request.jurisdiction)
            .await?;
        self.update_field(FieldId::AllRoadsCounty, &request.county)
            .await?;
        self.update_field(FieldId::AllRoadsCity, &request.city).await?;
        self.update_field(FieldId::AllRoadsQueryType, request.effective_query_type())
            .await?;
        self.update_field(FieldId::AllRoadsBeginDate, request.begin_date)
            .await?;
        self.update_field(FieldId::AllRoadsEndDate, request.end_date)
            .await?;
        let format = self.format_code(FieldId::AllRoadsFormat, request)?;
        self.update_field(FieldId::AllRoadsFormat, format).await
    }

    async fn set_local_roads_fields(&mut self, request: &ExtractRequest) -> Result<(), CdsError> {
        self.update_field(FieldId::LocalRoadsCounty, &request.county)
            .await?;
        self.update_field(FieldId::LocalRoadsCity, &request.city)
            .await?;
        self.update_field(FieldId::LocalRoadsQueryType, request.effective_query_type())
            .await?;
        self.update_field(FieldId::LocalRoadsStreet, &request.street)
            .await?;
        self.update_field(FieldId::LocalRoadsCrossStreet, &request.cross_street)
            .await?;
        self.update_field(
            FieldId::LocalRoadsBeginMilePoint,
            optional_number(request.begin_mile_point),
        )
        .await?;
        self.update_field(
            FieldId::LocalRoadsEndMilePoint,
            optional_number(request.end_mile_point),
        )
        .await?;
        self.update_field(FieldId::LocalRoadsBeginDate, request.begin_date)
            .await?;
        self.update_field(FieldId::LocalRoadsEndDate, request.end_date)
            .await?;
        let format = self.format_code(FieldId::LocalRoadsFormat, request)?;
        self.update_field(FieldId::LocalRoadsFormat, format).await?;
        self.update_field(
            FieldId::LocalRoadsRecordNumber,
            optional_number(request.record_number),
        )
        .await?;
        self.update_field(
            FieldId::LocalRoadsDisplayInstructions,
            request.display_instructions,
        )
        .await
    }

    async fn set_highways_fields(&mut self, request: &ExtractRequest) -> Result<(), CdsError> {
        self.update_field(FieldId::HighwaysHighway, &request.highway)
            .await?;

        // 国道のコードは `番号,枝番,開始マイル,終了マイル`
        let highway = self.fields.get(FieldId::HighwaysHighway).value().to_string();
        let parts: Vec<&str> = highway.split(',').collect();
        let (first, last) = match parts.len() {
            n if n >= 2 => (parts[n - 2], parts[n - 1]),
            _ => ("", ""),
        };
        let begin = Some(optional_number(request.begin_mile_point))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| first.to_string());
        let end = Some(optional_number(request.end_mile_point))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| last.to_string());
        self.update_field(FieldId::HighwaysBeginMilePoint, begin)
            .await?;
        self.update_field(FieldId::HighwaysEndMilePoint, end).await?;

        self.update_field(request.highway_type.checkbox(), true)
            .await?;
        self.update_field(FieldId::HighwaysZMilePoints, request.z_mile_points)
            .await?;
        self.update_field(FieldId::HighwaysAddMileage, request.mileage_code())
            .await?;
        self.update_field(FieldId::HighwaysBeginDate, request.begin_date)
            .await?;
        self.update_field(FieldId::HighwaysEndDate, request.end_date)
            .await?;
        let format = self.format_code(FieldId::HighwaysFormat, request)?;
        self.update_field(FieldId::HighwaysFormat, format).await?;
        self.update_field(
            FieldId::HighwaysRecordNumber,
            optional_number(request.record_number),
        )
        .await?;
        self.update_field(
            FieldId::HighwaysDisplayInstructions,
            request.display_instructions,
        )
        .await
    }
}
