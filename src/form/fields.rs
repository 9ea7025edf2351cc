//! CDS フォームのコントロール一覧

use super::field::{ControlKind, FormField};
use crate::transport::FormData;

macro_rules! highways {
    ($name:literal) => {
        concat!("ctl00$MainBodyContent$MainTabs$TabHighways$", $name)
    };
}

macro_rules! local_roads {
    ($name:literal) => {
        concat!("ctl00$MainBodyContent$MainTabs$TabLocalRoads$", $name)
    };
}

macro_rules! all_roads {
    ($name:literal) => {
        concat!("ctl00$MainBodyContent$MainTabs$TabAllRoads$", $name)
    };
}

macro_rules! form_fields {
    ($($id:ident => ($kind:ident, $name:expr)),+ $(,)?) => {
        /// フォームのコントロール識別子 (宣言順 = 送信順)
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum FieldId {
            $($id),+
        }

        impl FieldId {
            pub const ALL: &'static [FieldId] = &[$(FieldId::$id),+];

            /// HTML の `name` 属性
            pub fn name(self) -> &'static str {
                match self {
                    $(FieldId::$id => $name),+
                }
            }

            pub fn kind(self) -> ControlKind {
                match self {
                    $(FieldId::$id => ControlKind::$kind),+
                }
            }
        }
    };
}

form_fields! {
    ScriptManagerState => (Hidden, "ctl00_MainBodyContent_ToolkitScriptManager1_HiddenField"),
    EventTarget => (Hidden, "__EVENTTARGET"),
    EventArgument => (Hidden, "__EVENTARGUMENT"),
    TabsClientState => (Hidden, "ctl00_MainBodyContent_MainTabs_ClientState"),
    LastFocus => (Hidden, "__LASTFOCUS"),
    ViewState => (Hidden, "__VIEWSTATE"),
    ViewStateGenerator => (Hidden, "__VIEWSTATEGENERATOR"),
    EventValidation => (Hidden, "__EVENTVALIDATION"),

    HighwaysHighway => (Select, highways!("ddlHwyNo")),
    HighwaysBeginMilePoint => (Text, highways!("txtHwyBegMilePoint")),
    HighwaysEndMilePoint => (Text, highways!("txtHwyEndMilePoint")),
    HighwaysAllTypes => (Checkbox, highways!("chkHwyAll")),
    HighwaysFrontageRoads => (Checkbox, highways!("chkHwyFrontageroads")),
    HighwaysMainline => (Checkbox, highways!("chkHwyMainline")),
    HighwaysConnections => (Checkbox, highways!("chkHwyConnections")),
    HighwaysSpur => (Checkbox, highways!("chkHwySpur")),
    HighwaysZMilePoints => (Checkbox, highways!("chkHwyZmp")),
    HighwaysAddMileage => (Radio, highways!("rdoHwyAddMlge")),
    HighwaysBeginDate => (Text, highways!("txtHwyBegDate")),
    HighwaysEndDate => (Text, highways!("txtHwyEndDate")),
    HighwaysFormat => (Radio, highways!("HwyFormatGroup")),
    HighwaysRecordNumber => (Text, highways!("txtHwyRecordNumber")),
    HighwaysDisplayInstructions => (Checkbox, highways!("chkHwyDisplayInstructions")),
    HighwaysCds150 => (Image, highways!("cmdHwyCDS150")),
    HighwaysCds390 => (Image, highways!("cmdHwyCDS390")),
    HighwaysDirection => (Image, highways!("cmdHwyDirection")),
    HighwaysCds380 => (Image, highways!("cmdHwyCDS380")),
    HighwaysRrr => (Image, highways!("cmdHwyRRR")),
    HighwaysCds510 => (Image, highways!("cmdHwyCDS510")),
    HighwaysCds501 => (Image, highways!("cmdHwyCDS501")),

    LocalRoadsCounty => (Select, local_roads!("ddlLclCounty")),
    LocalRoadsCity => (Select, local_roads!("ddlLclCity")),
    LocalRoadsQueryType => (Radio, local_roads!("LclQueryType")),
    LocalRoadsStreet => (Select, local_roads!("ddlLclStreet")),
    LocalRoadsCrossStreet => (Select, local_roads!("ddlLclCrossStreet")),
    LocalRoadsBeginMilePoint => (Text, local_roads!("txtLclBegMilePoint")),
    LocalRoadsEndMilePoint => (Text, local_roads!("txtLclEndMilePoint")),
    LocalRoadsBeginDate => (Text, local_roads!("txtLclBegDate")),
    LocalRoadsEndDate => (Text, local_roads!("txtLclEndDate")),
    LocalRoadsFormat => (Radio, local_roads!("LclFormatGroup")),
    LocalRoadsRecordNumber => (Text, local_roads!("txtLclRecordNumber")),
    LocalRoadsDisplayInstructions => (Checkbox, local_roads!("chkLclDisplayInstructions")),
    LocalRoadsCds150 => (Image, local_roads!("cmdLclCDS150")),
    LocalRoadsCds160 => (Image, local_roads!("cmdLclCDS160")),
    LocalRoadsCds390 => (Image, local_roads!("cmdLclCDS390")),
    LocalRoadsCds380 => (Image, local_roads!("cmdLclCDS380")),
    LocalRoadsCds190b => (Image, local_roads!("cmdLclCDS190b")),
    LocalRoadsCds510 => (Image, local_roads!("cmdLclCDS510")),
    LocalRoadsCds501 => (Image, local_roads!("cmdLclCDS501")),

    AllRoadsJurisdiction => (Radio, all_roads!("SumJurisdictionGroup")),
    AllRoadsCounty => (Select, all_roads!("ddlSumCounty")),
    AllRoadsCity => (Select, all_roads!("ddlSumCity")),
    AllRoadsQueryType => (Radio, all_roads!("SumQueryType")),
    AllRoadsBeginDate => (Text, all_roads!("txtSumBegDate")),
    AllRoadsEndDate => (Text, all_roads!("txtSumEndDate")),
    AllRoadsFormat => (Radio, all_roads!("SumFormatGroup")),
    AllRoadsCds160 => (Image, all_roads!("cmdSumCDS160")),
    AllRoadsCds200 => (Image, all_roads!("cmdSumCDS200")),
    AllRoadsCds250 => (Image, all_roads!("cmdSumCDS250")),
    AllRoadsCds150 => (Image, all_roads!("cmdSumCDS150")),
    AllRoadsCds280 => (Image, all_roads!("cmdSumCDS280")),
    AllRoadsCds510 => (Image, all_roads!("cmdSumCDS510")),
    AllRoadsCds501 => (Image, all_roads!("cmdSumCDS501")),
}

impl FieldId {
    /// `_` で始まる ASP.NET のプライベートフィールド (`__VIEWSTATE` など)
    pub fn is_system(self) -> bool {
        self.name().starts_with('_')
    }

    /// ドキュメントに必ず存在すべきフィールド
    pub fn is_required(self) -> bool {
        self == FieldId::ViewState
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// フォーム全体の状態
#[derive(Debug, Clone)]
pub struct FormFieldSet {
    fields: Vec<FormField>,
}

impl Default for FormFieldSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FormFieldSet {
    pub fn new() -> Self {
        Self {
            fields: FieldId::ALL
                .iter()
                .map(|id| FormField::new(id.kind(), id.name()))
                .collect(),
        }
    }

    pub fn get(&self, id: FieldId) -> &FormField {
        &self.fields[id.index()]
    }

    pub fn get_mut(&mut self, id: FieldId) -> &mut FormField {
        &mut self.fields[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &FormField)> {
        FieldId::ALL.iter().copied().zip(self.fields.iter())
    }

    /// 送信データを組み立てる
    ///
    /// クリックされた画像ボタンは `name.x` / `name.y`。それ以外は値が空でないか
    /// システムフィールドなら `name=value`。
    pub fn payload(&self) -> FormData {
        let mut data = FormData::new();
        for field in &self.fields {
            match field.click_point.filter(|_| field.is_command()) {
                Some((x, y)) => {
                    data.push((format!("{}.x", field.name), x.to_string()));
                    data.push((format!("{}.y", field.name), y.to_string()));
                }
                None => {
                    if !field.value().is_empty() || field.is_system() {
                        data.push((field.name.clone(), field.value().to_string()));
                    }
                }
            }
        }
        data
    }

    /// システムフィールド以外をリセット (`commands_only` なら画像ボタンのみ)
    pub fn reset(&mut self, commands_only: bool) {
        for field in &mut self.fields {
            if field.is_system() {
                continue;
            }
            if commands_only && !field.is_command() {
                continue;
            }
            field.reset();
        }
    }

    /// システムフィールドを含めて全てリセット
    pub fn reset_all(&mut self) {
        for field in &mut self.fields {
            field.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_consistent() {
        let fields = FormFieldSet::new();
        assert_eq!(fields.iter().count(), FieldId::ALL.len());
        for (id, field) in fields.iter() {
            assert_eq!(field.name, id.name());
            assert_eq!(field.kind, id.kind());
        }
        assert_eq!(
            FieldId::AllRoadsCounty.name(),
            "ctl00$MainBodyContent$MainTabs$TabAllRoads$ddlSumCounty"
        );
        assert!(FieldId::ViewState.is_system());
        assert!(FieldId::EventTarget.is_system());
        assert!(!FieldId::HighwaysHighway.is_system());
        // hidden でも `_` で始まらなければ通常のフィールド
        assert!(!FieldId::TabsClientState.is_system());
        assert!(!FieldId::ScriptManagerState.is_system());
    }

    #[test]
    fn test_payload_includes_system_fields_even_when_empty() {
        let mut fields = FormFieldSet::new();
        fields
            .get_mut(FieldId::ViewState)
            .set_inspected_value("vs1");
        fields
            .get_mut(FieldId::AllRoadsCounty)
            .set_inspected_value("26");

        let payload = fields.payload();
        assert!(payload.contains(&("__VIEWSTATE".to_string(), "vs1".to_string())));
        assert!(payload.contains(&("__EVENTTARGET".to_string(), String::new())));
        assert!(payload.contains(&(
            FieldId::AllRoadsCounty.name().to_string(),
            "26".to_string()
        )));
        // 空の非システムフィールドは送らない
        assert!(!payload
            .iter()
            .any(|(k, _)| k == FieldId::AllRoadsCity.name()));
        assert!(!payload
            .iter()
            .any(|(k, _)| k == FieldId::ScriptManagerState.name()));
    }

    #[test]
    fn test_payload_sends_click_coordinates() {
        let mut fields = FormFieldSet::new();
        fields.get_mut(FieldId::AllRoadsCds501).click_point = Some((70, 12));

        let payload = fields.payload();
        let name = FieldId::AllRoadsCds501.name();
        assert!(payload.contains(&(format!("{name}.x"), "70".to_string())));
        assert!(payload.contains(&(format!("{name}.y"), "12".to_string())));
        assert!(!payload.iter().any(|(k, _)| k == name));
        // 未クリックのボタンは出ない
        assert!(!payload
            .iter()
            .any(|(k, _)| k.starts_with(FieldId::AllRoadsCds150.name())));
    }

    #[test]
    fn test_reset_keeps_system_fields() {
        let mut fields = FormFieldSet::new();
        fields.get_mut(FieldId::ViewState).set_inspected_value("vs");
        fields
            .get_mut(FieldId::TabsClientState)
            .set_inspected_value(r#"{"ActiveTabIndex":2}"#);
        fields
            .get_mut(FieldId::AllRoadsBeginDate)
            .set_inspected_value("01/01/19");
        fields.get_mut(FieldId::AllRoadsCds501).click_point = Some((1, 1));

        fields.reset(true);
        assert_eq!(fields.get(FieldId::AllRoadsBeginDate).value(), "01/01/19");
        assert!(fields.get(FieldId::AllRoadsCds501).click_point.is_none());

        fields.reset(false);
        assert_eq!(fields.get(FieldId::AllRoadsBeginDate).value(), "");
        assert_eq!(fields.get(FieldId::TabsClientState).value(), "");
        assert_eq!(fields.get(FieldId::ViewState).value(), "vs");

        fields.reset_all();
        assert_eq!(fields.get(FieldId::ViewState).value(), "");
    }
}
