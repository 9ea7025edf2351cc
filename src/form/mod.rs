//! フォーム状態
//!
//! リモートの ASP.NET フォームのローカルミラー。取得したHTMLを [`inspect_all`] で
//! 読み取り、[`FormFieldSet::payload`] で次のポストバック用データを組み立てる。

mod field;
mod fields;
mod inspect;

pub use field::{format_date, ControlKind, FieldValue, FormField, OptionMap};
pub use fields::{FieldId, FormFieldSet};
pub use inspect::{inspect_all, inspect_field};

pub(crate) use inspect::{element_text, parse_selector};
