//! テスト用のスクリプト化トランスポートと疑似ポータル

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::CdsError;
use crate::form::{ControlKind, FieldId};
use crate::session::Session;
use crate::traits::Transport;
use crate::transport::{Cookie, FormData, Method, PortalRequest, PortalResponse};

pub const ROOT_URL: &str = "https://cds.test/";
pub const SIGNED_PATH: &str = "sig0123/";
pub const FORM_PATH: &str = "sig0123/TVC/";

pub fn base_url() -> String {
    format!("{}{}", ROOT_URL, SIGNED_PATH)
}

pub fn form_url() -> String {
    format!("{}{}", ROOT_URL, FORM_PATH)
}

pub const XLS_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// 応答を順に返し、送信内容を記録するトランスポート
///
/// スクリプトが尽きたら [`FakePortal`] (設定されていれば) に処理させる。
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<PortalResponse>>,
    requests: Mutex<Vec<PortalRequest>>,
    cookies: Mutex<Vec<Cookie>>,
    portal: Option<Mutex<FakePortal>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_portal(portal: FakePortal) -> Self {
        Self {
            portal: Some(Mutex::new(portal)),
            ..Self::default()
        }
    }

    pub fn push(&self, response: PortalResponse) {
        self.script.lock().unwrap().push_back(response);
    }

    pub fn set_cookie(&self, cookie: Cookie) {
        let mut cookies = self.cookies.lock().unwrap();
        cookies.retain(|c| {
            (&c.name, &c.domain, &c.path) != (&cookie.name, &cookie.domain, &cookie.path)
        });
        cookies.push(cookie);
    }

    pub fn requests(&self) -> Vec<PortalRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<PortalRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == Method::Post)
            .collect()
    }

    pub fn with_portal_state<R>(&self, f: impl FnOnce(&mut FakePortal) -> R) -> R {
        let portal = self.portal.as_ref().expect("no fake portal configured");
        f(&mut portal.lock().unwrap())
    }

    /// ルートからポータルホームまでのハンドシェイク応答 (10件)
    pub fn push_handshake(&self) {
        self.set_cookie(Cookie::new("ASPSESSION", "a1", "cds.test", "/"));
        self.set_cookie(Cookie::new(
            "WhlSL",
            "signed",
            "cds.test",
            &format!("/{}", SIGNED_PATH),
        ));
        self.push(
            PortalResponse::new(302, ROOT_URL)
                .with_header("Location", "/InternalSite/InitParams.aspx"),
        );
        self.push(
            PortalResponse::new(302, "")
                .with_header("Location", "/InternalSite/InstallAndDetect.asp"),
        );
        for _ in 0..8 {
            self.push(PortalResponse::new(200, "").with_body("<html></html>"));
        }
    }

    /// フレーム巡回の応答 (4件)
    pub fn push_frames(&self) {
        self.push(PortalResponse::new(200, "").with_body("<html>top</html>"));
        self.push(PortalResponse::new(200, "").with_body("<html>main</html>"));
        self.push(PortalResponse::new(200, "").with_body(""));
        self.push(PortalResponse::new(200, "").with_body(format!(
            r#"<html><body><ul>
                <li><a href="/{signed}Other/">Other Reports</a></li>
                <li><a href="/{form}">Crash Data System</a></li>
            </ul></body></html>"#,
            signed = SIGNED_PATH,
            form = FORM_PATH
        )));
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: PortalRequest) -> Result<PortalResponse, CdsError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(response) = self.script.lock().unwrap().pop_front() {
            return Ok(response);
        }
        match &self.portal {
            Some(portal) => Ok(portal.lock().unwrap().handle(&request)),
            None => Ok(PortalResponse::new(404, request.url)),
        }
    }

    fn cookies(&self) -> Vec<Cookie> {
        self.cookies.lock().unwrap().clone()
    }
}

/// セッション確立済みのクライアント
pub fn portal_client(portal: FakePortal) -> Client<ScriptedTransport> {
    let config = ClientConfig::new().with_root_url(ROOT_URL);
    let session = Session::new(ScriptedTransport::with_portal(portal), &config)
        .unwrap()
        .resume(base_url(), form_url());
    Client::from_session(session)
}

type Options = Vec<(&'static str, &'static str)>;

const COUNTIES: &[(&str, &str)] = &[
    ("Clackamas", "03"),
    ("Lane", "20"),
    ("Multnomah", "26"),
    ("Washington", "34"),
];

/// (郡, 名称, コード)
const CITIES: &[(&str, &str, &str)] = &[
    ("26", "Portland", "0100"),
    ("26", "Gresham", "0101"),
    ("26", "Portland (Airport)", "0102"),
    ("20", "Eugene", "2001"),
];

/// (郡, 市, 名称, コード)
const STREETS: &[(&str, &str, &str, &str)] = &[
    ("26", "0100", "NE BROADWAY", "10021"),
    ("26", "0100", "SE DIVISION ST", "10355"),
    ("26", "0102", "NE AIRPORT WAY", "10001"),
    ("26", "000", "NW SKYLINE BLVD", "50012"),
];

const HIGHWAYS: &[(&str, &str)] = &[
    ("001 - PACIFIC", "001,00,0.00,308.50"),
    ("026 - MT. HOOD", "026,00,0.00,150.23"),
];

/// 送信されたデータからフォームを描画する疑似 ASP.NET ポータル
pub struct FakePortal {
    view_state: u32,
    values: HashMap<&'static str, String>,
    disabled: HashSet<FieldId>,
    report: Vec<u8>,
    filename: String,
    redirect_report: bool,
    /// 受け付けたポストバック数 (レポート送信を除く)
    pub postbacks: usize,
    pub downloads: usize,
}

impl Default for FakePortal {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePortal {
    pub fn new() -> Self {
        Self {
            view_state: 0,
            values: HashMap::new(),
            disabled: HashSet::new(),
            report: b"1,1,2\n".to_vec(),
            filename: "CDS501.txt".to_string(),
            redirect_report: true,
            postbacks: 0,
            downloads: 0,
        }
    }

    pub fn with_disabled(mut self, id: FieldId) -> Self {
        self.disabled.insert(id);
        self
    }

    pub fn with_report(mut self, body: impl Into<Vec<u8>>, filename: &str) -> Self {
        self.report = body.into();
        self.filename = filename.to_string();
        self
    }

    /// レポートを302経由でなく直接返す
    pub fn without_redirect(mut self) -> Self {
        self.redirect_report = false;
        self
    }

    pub fn current_view_state(&self) -> String {
        format!("vs{}", self.view_state)
    }

    pub fn value(&self, id: FieldId) -> &str {
        self.values.get(id.name()).map(String::as_str).unwrap_or("")
    }

    pub fn handle(&mut self, request: &PortalRequest) -> PortalResponse {
        let url = request.url.clone();
        if request.method == Method::Get && url == form_url() {
            self.values.clear();
            self.view_state += 1;
            return PortalResponse::new(200, url).with_body(self.render());
        }
        if request.method == Method::Get && url.ends_with("Download.aspx") {
            self.downloads += 1;
            return self.report_response(url);
        }
        if request.method == Method::Post && url == format!("{}default.aspx", form_url()) {
            return self.postback(url, &request.data);
        }
        PortalResponse::new(404, url)
    }

    fn postback(&mut self, url: String, data: &FormData) -> PortalResponse {
        let posted = |name: &str| {
            data.iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        };
        // 古いビューステートは拒否 (空のレスポンス)
        if posted("__VIEWSTATE").as_deref() != Some(self.current_view_state().as_str()) {
            return PortalResponse::new(200, url);
        }

        let clicked = FieldId::ALL.iter().copied().find(|id| {
            id.kind() == ControlKind::Image && posted(&format!("{}.x", id.name())).is_some()
        });
        if let Some(command) = clicked {
            if !self.disabled.contains(&command) {
                if self.redirect_report {
                    return PortalResponse::new(302, url)
                        .with_header("Location", "Reports/Download.aspx");
                }
                self.downloads += 1;
                return self.report_response(url);
            }
        }

        for &id in FieldId::ALL {
            if id.kind() == ControlKind::Hidden || id.kind() == ControlKind::Image {
                continue;
            }
            self.values
                .insert(id.name(), posted(id.name()).unwrap_or_default());
        }
        for &id in FieldId::ALL {
            if id.kind() != ControlKind::Select {
                continue;
            }
            let value = self.value(id).to_string();
            if !self.select_options(id).iter().any(|(_, code)| *code == value) {
                self.values.insert(id.name(), String::new());
            }
        }

        self.postbacks += 1;
        self.view_state += 1;
        PortalResponse::new(200, url).with_body(self.render())
    }

    fn report_response(&self, url: String) -> PortalResponse {
        PortalResponse::new(200, url)
            .with_header(
                "Content-Disposition",
                format!("attachment; filename={}", self.filename),
            )
            .with_body(self.report.clone())
    }

    fn select_options(&self, id: FieldId) -> Options {
        let mut options: Options = Vec::new();
        match id {
            FieldId::HighwaysHighway => {
                options.push(("Select a Highway", ""));
                options.extend(HIGHWAYS.iter().copied());
            }
            FieldId::LocalRoadsCounty | FieldId::AllRoadsCounty => {
                options.push(("Select a County", ""));
                options.extend(COUNTIES.iter().copied());
            }
            FieldId::LocalRoadsCity => {
                options.push(("Select a City", ""));
                let county = self.value(FieldId::LocalRoadsCounty);
                if !county.is_empty() {
                    options.push(("Outside City Limits", "000"));
                    options.extend(
                        CITIES
                            .iter()
                            .filter(|(c, _, _)| *c == county)
                            .map(|(_, name, code)| (*name, *code)),
                    );
                }
            }
            FieldId::AllRoadsCity => {
                options.push(("Select a City", ""));
                let county = self.value(FieldId::AllRoadsCounty);
                let by_city = self.value(FieldId::AllRoadsJurisdiction) == "rdoSumJurisdictionCITY";
                options.extend(
                    CITIES
                        .iter()
                        .filter(|(c, _, _)| by_city || *c == county)
                        .map(|(_, name, code)| (*name, *code)),
                );
            }
            FieldId::LocalRoadsStreet | FieldId::LocalRoadsCrossStreet => {
                options.push(("Select a Street", ""));
                let county = self.value(FieldId::LocalRoadsCounty);
                let city = self.value(FieldId::LocalRoadsCity);
                options.extend(
                    STREETS
                        .iter()
                        .filter(|(c, t, _, _)| *c == county && *t == city)
                        .map(|(_, _, name, code)| (*name, *code)),
                );
            }
            _ => {}
        }
        options
    }

    /// (id, ラベル, コード)
    fn radio_options(id: FieldId) -> Vec<(String, &'static str, String)> {
        let simple = |pairs: &[(&'static str, &'static str)]| {
            pairs
                .iter()
                .map(|(label, code)| (code.to_string(), *label, code.to_string()))
                .collect::<Vec<_>>()
        };
        let formats = |prefix: &str| {
            vec![
                (
                    format!("rdo{}ReportFormatXLS", prefix),
                    "Excel Format",
                    format!("rdo{}ReportFormatXLS", prefix),
                ),
                (
                    format!("rdo{}ReportFormatPRT", prefix),
                    "Print Format",
                    format!("rdo{}ReportFormatPRT", prefix),
                ),
            ]
        };
        match id {
            FieldId::HighwaysAddMileage => vec![
                ("rdoHwyAddMlgeB".to_string(), "Both", "B".to_string()),
                ("rdoHwyAddMlgeY".to_string(), "Add Mileage", "Y".to_string()),
                ("rdoHwyAddMlgeN".to_string(), "Non-Add Mileage", "N".to_string()),
            ],
            FieldId::HighwaysFormat => formats("Hwy"),
            FieldId::LocalRoadsFormat => formats("Lcl"),
            FieldId::AllRoadsFormat => formats("Sum"),
            FieldId::LocalRoadsQueryType => simple(&[
                ("Street Segment & Intersectional", "rdoLclQueryTypeSI"),
                ("Specified Streets Not Limited to Intersection", "rdoLclQueryTypeSP"),
                ("Intersectional", "rdoLclQueryTypeIN"),
                ("Mile-Pointed County Road", "rdoLclQueryTypeMP"),
            ]),
            FieldId::AllRoadsJurisdiction => simple(&[
                ("County", "rdoSumJurisdictionCNTY"),
                ("City", "rdoSumJurisdictionCITY"),
            ]),
            FieldId::AllRoadsQueryType => simple(&[
                ("All Roads", "rdoSumQueryTypeALL"),
                ("County Roads", "rdoSumQueryTypeCNTY"),
                ("City Streets", "rdoSumQueryTypeCITY"),
                ("State Highways", "rdoSumQueryTypeSTATE"),
            ]),
            _ => Vec::new(),
        }
    }

    pub fn render(&self) -> String {
        let mut html = String::from(
            "<html><body><form method=\"post\" action=\"default.aspx\" id=\"aspnetForm\">\n",
        );
        for &id in FieldId::ALL {
            let name = escape(id.name());
            let value = self.value(id);
            match id.kind() {
                ControlKind::Hidden => {
                    let value = match id {
                        FieldId::ViewState => self.current_view_state(),
                        FieldId::ViewStateGenerator => "CA0B0334".to_string(),
                        FieldId::EventValidation => format!("ev{}", self.view_state),
                        FieldId::TabsClientState => r#"{"ActiveTabIndex":0}"#.to_string(),
                        _ => String::new(),
                    };
                    html.push_str(&format!(
                        "<input type=\"hidden\" name=\"{}\" value=\"{}\" />\n",
                        name,
                        escape(&value)
                    ));
                }
                ControlKind::Text => html.push_str(&format!(
                    "<input type=\"text\" name=\"{}\" value=\"{}\" />\n",
                    name,
                    escape(value)
                )),
                ControlKind::Checkbox => html.push_str(&format!(
                    "<input type=\"checkbox\" name=\"{}\"{} />\n",
                    name,
                    if value == "on" { " checked=\"checked\"" } else { "" }
                )),
                ControlKind::Image => html.push_str(&format!(
                    "<input type=\"image\" name=\"{}\" src=\"images/btn.gif\"{} />\n",
                    name,
                    if self.disabled.contains(&id) {
                        " disabled=\"disabled\""
                    } else {
                        ""
                    }
                )),
                ControlKind::Select => {
                    html.push_str(&format!("<select name=\"{}\">\n", name));
                    for (label, code) in self.select_options(id) {
                        html.push_str(&format!(
                            "  <option value=\"{}\"{}>{}</option>\n",
                            escape(code),
                            if !value.is_empty() && code == value {
                                " selected=\"selected\""
                            } else {
                                ""
                            },
                            escape(label)
                        ));
                    }
                    html.push_str("</select>\n");
                }
                ControlKind::Radio => {
                    for (radio_id, label, code) in Self::radio_options(id) {
                        html.push_str(&format!(
                            "<input id=\"{}\" type=\"radio\" name=\"{}\" value=\"{}\"{} />\
                             <label for=\"{}\">{}</label>\n",
                            radio_id,
                            name,
                            escape(&code),
                            if code == value { " checked=\"checked\"" } else { "" },
                            radio_id,
                            escape(label)
                        ));
                    }
                }
            }
        }
        html.push_str("</form></body></html>\n");
        html
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
