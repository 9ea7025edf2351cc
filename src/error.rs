use thiserror::Error;

#[derive(Error, Debug)]
pub enum CdsError {
    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URLエラー: {0}")]
    Url(#[from] url::ParseError),

    /// ポータルの挙動が変わった (セッション確立の前提条件違反)
    #[error("想定外のステータス: {url} -> {status}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("ヘッダーがありません: {url} ({header})")]
    MissingHeader { url: String, header: String },

    #[error("セッション確立エラー: {0}")]
    Bootstrap(String),

    #[error("要素が見つかりません: {0}")]
    ElementNotFound(String),

    #[error("セレクタエラー: {0}")]
    Selector(String),

    #[error("空のレスポンス: {0}")]
    EmptyResponse(String),

    /// 現在のフィールド構成ではこのレポートは提供されない
    #[error("このレポートは指定されたパラメータでは利用できません: {field}")]
    DisabledFormElement { field: String },

    #[error("{extract} は \"{road_type}\" タブでは利用できません")]
    InvalidRoadTypeExtract { extract: String, road_type: String },

    #[error("{value:?} は {field} の有効な値ではありません。有効な値:\n{valid}")]
    InvalidFieldValue {
        field: String,
        value: String,
        valid: String,
    },

    #[error("{kind} が見つかりません: {query}")]
    NotFound { kind: String, query: String },

    #[error("想定外のコンテンツ ({expected}): {preview}")]
    UnexpectedContentType { expected: String, preview: String },

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),
}

impl CdsError {
    /// バックオフ付きで再試行する価値があるか
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CdsError::Http(_) | CdsError::EmptyResponse(_) | CdsError::UnexpectedContentType { .. }
        )
    }
}
