//! CDS クライアント
//!
//! フォームの状態を保持し、フィールドの変更ごとにポストバックしてサーバー側の
//! 連動 (郡を選ぶと市の一覧が変わる等) を反映する。

mod extract;
mod options;
mod request;

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::CdsError;
use crate::form::{inspect_all, FieldId, FieldValue, FormFieldSet};
use crate::session::Session;
use crate::traits::Transport;
use crate::transport::{HttpTransport, PortalResponse};

pub use extract::ExtractOutcome;
pub use options::CodeMap;
pub use request::{
    command_field, last_complete_year, Extract, ExtractRequest, HighwayType, ReportFormat,
    RoadType, OUTSIDE_CITY_LIMITS,
};

pub struct Client<T: Transport> {
    session: Session<T>,
    fields: FormFieldSet,
    form_loaded: bool,
    highways: Option<CodeMap>,
    counties: Option<CodeMap>,
    cities: Option<CodeMap>,
}

impl Client<HttpTransport> {
    /// reqwest トランスポートで接続する (ハンドシェイクは最初の操作時)
    pub fn new(config: &ClientConfig) -> Result<Self, CdsError> {
        let transport = HttpTransport::new(config)?;
        Self::with_transport(transport, config)
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T, config: &ClientConfig) -> Result<Self, CdsError> {
        Ok(Self::from_session(Session::new(transport, config)?))
    }

    pub fn from_session(session: Session<T>) -> Self {
        Self {
            session,
            fields: FormFieldSet::new(),
            form_loaded: false,
            highways: None,
            counties: None,
            cities: None,
        }
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    /// 現在のローカルなフォーム状態
    pub fn fields(&self) -> &FormFieldSet {
        &self.fields
    }

    /// フォームを取得していなければ取得する
    pub async fn form_fields(&mut self) -> Result<&FormFieldSet, CdsError> {
        if !self.form_loaded {
            self.reset_form_fields().await?;
        }
        Ok(&self.fields)
    }

    /// 全フィールドを既定に戻し、フォームを取得し直す (ビューステートも更新)
    pub async fn reset_form_fields(&mut self) -> Result<(), CdsError> {
        self.fields.reset(false);
        let html = self.session.fetch_form().await?;
        inspect_all(&mut self.fields, &html)?;
        self.form_loaded = true;
        Ok(())
    }

    /// フィールドを更新してポストバックする
    ///
    /// ラベルはコードに変換する。現在値と同じなら何もしない。
    pub async fn update_field(
        &mut self,
        id: FieldId,
        value: impl Into<FieldValue>,
    ) -> Result<(), CdsError> {
        self.form_fields().await?;

        let value = value.into().resolve();
        let resolved = {
            let field = self.fields.get(id);
            let code = field.options.code_for(&value).map(str::to_string);
            if field.value() == code.as_deref().unwrap_or(&value) {
                return Ok(());
            }
            code.unwrap_or(value)
        };

        self.fields.get_mut(id).set_value(resolved)?;
        debug!("Updating {} = {:?}", id.name(), self.fields.get(id).value());

        let html = self.session.postback(self.fields.payload()).await?;
        inspect_all(&mut self.fields, &html)?;
        Ok(())
    }

    /// 画像ボタンを押した状態にする (送信は [`Client::submit`])
    pub fn click(&mut self, id: FieldId) -> Result<(), CdsError> {
        self.fields.get_mut(id).click()
    }

    /// 現在の状態でフォームを送信する
    ///
    /// レポートの準備ができると302が返るので、一度だけ追従する。
    pub async fn submit(&mut self) -> Result<PortalResponse, CdsError> {
        let response = self.session.post_form(self.fields.payload()).await?;
        if response.status != 302 {
            return Ok(response);
        }
        let location = response
            .location()
            .ok_or_else(|| CdsError::MissingHeader {
                url: response.url.clone(),
                header: "Location".to_string(),
            })?
            .to_string();
        debug!("Following report redirect to {}", location);
        self.session.follow_report_redirect(&location).await
    }
}
