//! 取得したフォームHTMLからフィールド状態を読み取る

use scraper::{ElementRef, Html, Selector};

use super::field::{ControlKind, FormField};
use super::fields::{FieldId, FormFieldSet};
use crate::error::CdsError;

/// 全フィールドを読み直す
pub fn inspect_all(fields: &mut FormFieldSet, html: &str) -> Result<(), CdsError> {
    let document = Html::parse_document(html);
    for &id in FieldId::ALL {
        inspect_field(&document, fields.get_mut(id), id.is_required())?;
    }
    Ok(())
}

/// フィールド1つをドキュメントと同期させる
///
/// 選択肢と `disabled` は毎回作り直す。値はドキュメントに現れた場合のみ更新する。
pub fn inspect_field(
    document: &Html,
    field: &mut FormField,
    required: bool,
) -> Result<(), CdsError> {
    let selector = parse_selector(&format!(r#"{}[name="{}"]"#, field.tag(), field.name))?;

    field.options.clear();
    field.disabled = false;

    let mut matched = 0;
    for element in document.select(&selector) {
        matched += 1;
        if element.value().attr("disabled").is_some() {
            field.disabled = true;
        }
        match field.kind {
            ControlKind::Select => inspect_select(element, field)?,
            ControlKind::Radio => inspect_radio(document, element, field)?,
            ControlKind::Checkbox => {
                let checked = element.value().attr("checked").is_some();
                field.set_inspected_value(if checked { "on" } else { "" });
            }
            ControlKind::Hidden | ControlKind::Text | ControlKind::Image => {
                if let Some(value) = element.value().attr("value") {
                    field.set_inspected_value(value);
                }
            }
        }
    }

    if matched == 0 && required {
        return Err(CdsError::ElementNotFound(field.name.clone()));
    }
    Ok(())
}

fn inspect_select(element: ElementRef<'_>, field: &mut FormField) -> Result<(), CdsError> {
    let option_selector = parse_selector("option")?;
    for option in element.select(&option_selector) {
        let label = element_text(option);
        let code = option
            .value()
            .attr("value")
            .map(str::to_string)
            .unwrap_or_else(|| label.clone());
        if option.value().attr("selected").is_some() {
            field.set_inspected_value(code.clone());
        }
        field.options.insert(label, code);
    }
    Ok(())
}

fn inspect_radio(
    document: &Html,
    element: ElementRef<'_>,
    field: &mut FormField,
) -> Result<(), CdsError> {
    let id = element
        .value()
        .attr("id")
        .ok_or_else(|| CdsError::ElementNotFound(format!("{} (id)", field.name)))?;
    let label_selector = parse_selector(&format!(r#"label[for="{}"]"#, id))?;
    let label = document
        .select(&label_selector)
        .next()
        .map(element_text)
        .ok_or_else(|| CdsError::ElementNotFound(format!("label[for={}]", id)))?;
    let code = element.value().attr("value").unwrap_or("on").to_string();

    if element.value().attr("checked").is_some() {
        field.set_inspected_value(code.clone());
    }
    field.options.insert(label, code);
    Ok(())
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, CdsError> {
    Selector::parse(selector).map_err(|e| CdsError::Selector(format!("{}: {:?}", selector, e)))
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
