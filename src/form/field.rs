use std::collections::BTreeMap;

use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;

use crate::error::CdsError;

/// 画像ボタンのサイズ (px)
const BUTTON_WIDTH: i32 = 155;
const BUTTON_HEIGHT: i32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ControlKind {
    Hidden,
    Text,
    Checkbox,
    Radio,
    Image,
    Select,
}

impl ControlKind {
    pub fn tag(self) -> &'static str {
        match self {
            ControlKind::Select => "select",
            _ => "input",
        }
    }

    /// `input` の `type` 属性
    pub fn input_type(self) -> Option<&'static str> {
        match self {
            ControlKind::Hidden => Some("hidden"),
            ControlKind::Text => Some("text"),
            ControlKind::Checkbox => Some("checkbox"),
            ControlKind::Radio => Some("radio"),
            ControlKind::Image => Some("image"),
            ControlKind::Select => None,
        }
    }
}

/// ラベル -> サーバー側コード の順序付きマップ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionMap(Vec<(String, String)>);

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同じラベルは後勝ち
    pub fn insert(&mut self, label: impl Into<String>, code: impl Into<String>) {
        let label = label.into();
        let code = code.into();
        match self.0.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = code,
            None => self.0.push((label, code)),
        }
    }

    pub fn code_for(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| c.as_str())
    }

    pub fn label_for(&self, code: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, c)| c == code)
            .map(|(l, _)| l.as_str())
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.0.iter().any(|(_, c)| c == code)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(l, c)| (l.as_str(), c.as_str()))
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(_, c)| c.as_str())
    }

    /// コード -> ラベル
    pub fn by_code(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(l, c)| (c.clone(), l.clone()))
            .collect()
    }

    /// エラーメッセージ用の一覧
    pub fn describe(&self) -> String {
        self.0
            .iter()
            .map(|(l, c)| format!("- {}: '{}'", l, c))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<L: Into<String>, C: Into<String>> FromIterator<(L, C)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (L, C)>>(iter: I) -> Self {
        let mut map = OptionMap::new();
        for (label, code) in iter {
            map.insert(label, code);
        }
        map
    }
}

/// フィールドに設定する値
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn resolve(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Date(date) => format_date(*date),
        }
    }
}

/// フォームの日付形式 `MM/DD/YY`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%m/%d/%y").to_string()
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Text(value.clone())
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// チェックボックス: `on` / 空
impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Text(if value { "on" } else { "" }.to_string())
    }
}

/// リモートフォームのコントロール1つ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub kind: ControlKind,
    pub name: String,
    pub options: OptionMap,
    value: String,
    pub disabled: bool,
    /// 画像ボタンのクリック座標
    pub click_point: Option<(i32, i32)>,
}

impl FormField {
    pub fn new(kind: ControlKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            options: OptionMap::new(),
            value: String::new(),
            disabled: false,
            click_point: None,
        }
    }

    pub fn with_options(mut self, options: OptionMap) -> Self {
        self.options = options;
        self
    }

    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// 値を設定する
    ///
    /// 日付は `MM/DD/YY` に整形。選択肢がある場合はラベルをコードに変換し、
    /// ラベルにもコードにも一致しなければ全選択肢を列挙したエラーを返す。
    pub fn set_value(&mut self, value: impl Into<FieldValue>) -> Result<(), CdsError> {
        let value = value.into().resolve();
        if !value.is_empty() && !self.options.is_empty() {
            if let Some(code) = self.options.code_for(&value) {
                self.value = code.to_string();
                return Ok(());
            }
            if !self.options.contains_code(&value) {
                return Err(CdsError::InvalidFieldValue {
                    field: self.name.clone(),
                    value,
                    valid: self.options.describe(),
                });
            }
        }
        self.value = value;
        Ok(())
    }

    /// ドキュメントから読み取った値 (検証なし)
    pub(crate) fn set_inspected_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// ASP.NET のシステムフィールド (`_` で始まる名前)
    pub fn is_system(&self) -> bool {
        self.name.starts_with('_')
    }

    pub fn is_command(&self) -> bool {
        self.kind == ControlKind::Image
    }

    pub fn reset(&mut self) {
        self.click_point = None;
        self.value.clear();
        self.disabled = false;
    }

    pub fn click(&mut self) -> Result<(), CdsError> {
        self.click_with(&mut rand::thread_rng())
    }

    /// ボタン中心を平均とした正規分布で座標を決める
    pub fn click_with<R: Rng>(&mut self, rng: &mut R) -> Result<(), CdsError> {
        if self.disabled {
            return Err(CdsError::DisabledFormElement {
                field: self.name.clone(),
            });
        }
        let x = gauss(rng, 77.0, 77.0).round() as i32;
        let y = gauss(rng, 16.0, 33.0).round() as i32;
        self.click_point = Some((
            x.clamp(0, BUTTON_WIDTH - 1),
            y.clamp(0, BUTTON_HEIGHT - 1),
        ));
        Ok(())
    }
}

/// Box-Muller
fn gauss<R: Rng>(rng: &mut R, mean: f64, sigma: f64) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    mean + sigma * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
