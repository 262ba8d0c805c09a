//! # Flow Domain Types
//!
//! Domain data types for captured network flows (HTTP, DNS, TCP, UDP)
//! and the accessors that normalize the four protocol shapes into
//! uniform scalar facts: identity, start time, request summary, byte
//! counts, status, and icon category.
//!
//! These types are the shared vocabulary between:
//! - `flowlens-app` (store, table state, content formatting)
//! - `flowlens-tui` (rendering the flow table and detail panels)
//!
//! ## Model Assumptions
//!
//! - **Bodies are `Vec<u8>`**: payloads arrive as raw captured bytes,
//!   possibly absent or truncated.
//! - **Headers as `Vec<(String, String)>`**: preserves insertion order;
//!   lookup is case-insensitive.
//! - **`effective_content_type` is sniffed**: inferred by the capture
//!   layer from payload bytes and preferred over the declared
//!   `content-type` header when present.
//! - **Exactly one variant is active**: `FlowRecord` is a closed enum;
//!   every consumer matches exhaustively.

use serde::{Deserialize, Serialize};

// ── Timestamp ─────────────────────────────────────────────────────────────────

/// A capture timestamp as a seconds + nanoseconds pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    /// Seconds since Unix epoch.
    pub seconds: i64,
    /// Nanosecond fraction (0..1_000_000_000).
    pub nanos: u32,
}

impl Timestamp {
    /// Total nanoseconds since Unix epoch.
    pub fn as_nanos(&self) -> i64 {
        self.seconds * 1_000_000_000 + self.nanos as i64
    }

    /// Total milliseconds since Unix epoch.
    pub fn as_millis(&self) -> i64 {
        self.as_nanos() / 1_000_000
    }

    /// Wall-clock display string (`HH:MM:SS.mmm`), local time.
    pub fn display(&self) -> String {
        use chrono::TimeZone;
        match chrono::Local.timestamp_opt(self.seconds, self.nanos) {
            chrono::LocalResult::Single(dt) => dt.format("%H:%M:%S%.3f").to_string(),
            _ => String::new(),
        }
    }
}

// ── Headers ───────────────────────────────────────────────────────────────────

/// Insertion-ordered header map with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(pub Vec<(String, String)>);

impl Headers {
    /// Look up a header value by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The declared `content-type` header, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.get("content-type")
    }
}

// ── HTTP sub-records ──────────────────────────────────────────────────────────

/// One side (request or response) of an HTTP exchange.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpMessage {
    /// Raw captured payload. `None` when absent or not yet captured.
    #[serde(default)]
    pub content: Option<Vec<u8>>,
    /// Header name → value pairs.
    #[serde(default)]
    pub headers: Headers,
    /// Message duration in milliseconds, when the capture layer timed it.
    #[serde(default)]
    pub duration_ms: Option<f64>,
    /// Start of this message on the wire.
    #[serde(default)]
    pub timestamp_start: Option<Timestamp>,
    /// End of this message on the wire.
    #[serde(default)]
    pub timestamp_end: Option<Timestamp>,
    /// Content type sniffed from payload bytes by the capture layer.
    /// Takes precedence over the declared header when present.
    #[serde(default)]
    pub effective_content_type: Option<String>,
}

/// An HTTP request with method and target URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: String,
    /// Raw request URL as captured.
    pub url: String,
    /// Pre-rendered display URL, preferred over `url` when present.
    #[serde(default)]
    pub display_url: Option<String>,
    #[serde(flatten)]
    pub message: HttpMessage,
}

/// An HTTP response with its status code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpResponse {
    /// HTTP status code. `None` if the response line was never seen.
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(flatten)]
    pub message: HttpMessage,
}

/// A captured HTTP request/response exchange.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpFlow {
    /// Unique flow identifier assigned by the capture layer.
    pub id: String,
    #[serde(default)]
    pub request: Option<HttpRequest>,
    #[serde(default)]
    pub response: Option<HttpResponse>,
    /// Error message when the exchange failed.
    #[serde(default)]
    pub error: Option<String>,
}

// ── DNS ───────────────────────────────────────────────────────────────────────

/// A single DNS question.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DnsQuestion {
    pub name: String,
    #[serde(default)]
    pub record_type: String,
}

/// A captured DNS query/response exchange.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DnsFlow {
    /// Unique flow identifier assigned by the capture layer.
    pub id: String,
    #[serde(default)]
    pub questions: Vec<DnsQuestion>,
    /// Packed wire size of the query, when captured.
    #[serde(default)]
    pub request_size: Option<u64>,
    /// Packed wire size of the response, when captured.
    #[serde(default)]
    pub response_size: Option<u64>,
    /// Whether a response has arrived.
    #[serde(default)]
    pub has_response: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub timestamp_start: Option<Timestamp>,
    #[serde(default)]
    pub duration_ms: Option<f64>,
}

// ── Raw socket flows (TCP/UDP) ────────────────────────────────────────────────

/// One datagram or stream segment within a socket session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocketMessage {
    /// Direction flag: `true` = client → server (outbound),
    /// `false` = server → client (inbound).
    pub from_client: bool,
    #[serde(default)]
    pub content: Vec<u8>,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

/// Connection endpoints and lifetime for a socket session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocketConnection {
    /// Capture-layer identifier. Absent in some capture sources; see
    /// [`Flow::identity`] for the synthesized fallback.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub client_addr: String,
    #[serde(default)]
    pub server_host: String,
    #[serde(default)]
    pub server_port: u16,
    #[serde(default)]
    pub timestamp_start: Option<Timestamp>,
    #[serde(default)]
    pub timestamp_end: Option<Timestamp>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A captured TCP session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TcpFlow {
    #[serde(flatten)]
    pub conn: SocketConnection,
    #[serde(default)]
    pub messages: Vec<SocketMessage>,
}

/// A captured UDP session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UdpFlow {
    #[serde(flatten)]
    pub conn: SocketConnection,
    #[serde(default)]
    pub messages: Vec<SocketMessage>,
}

// ── FlowRecord ────────────────────────────────────────────────────────────────

/// A captured protocol exchange: exactly one variant is active.
///
/// Closed sum type: the decision-relevant matches below carry no
/// wildcard arms, so a new variant is a compile error at each of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FlowRecord {
    Http(HttpFlow),
    Dns(DnsFlow),
    Tcp(TcpFlow),
    Udp(UdpFlow),
}

/// A flow record plus user-only metadata.
///
/// `pinned` and `note` are set by the operator, never derived from
/// capture data, and survive re-sorting and re-filtering untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flow {
    #[serde(flatten)]
    pub record: FlowRecord,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub note: Option<String>,
}

impl Flow {
    pub fn new(record: FlowRecord) -> Self {
        Self {
            record,
            pinned: false,
            note: None,
        }
    }
}

/// Stable string key for selection membership and list diffing.
pub type FlowId = String;

// ── Status ────────────────────────────────────────────────────────────────────

/// Normalized flow status derived from capture facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStatus {
    /// Exchange completed without an HTTP status (DNS answered, socket closed).
    Ok,
    /// The capture layer reported an error.
    Error,
    /// No response observed yet.
    Pending,
    /// HTTP status code.
    Http(u16),
}

/// Display color class for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Redirect,
    ErrorClass,
    PendingClass,
}

impl FlowStatus {
    /// Bucket the status for display color.
    pub fn class(&self) -> StatusClass {
        match self {
            FlowStatus::Ok => StatusClass::Success,
            FlowStatus::Error => StatusClass::ErrorClass,
            FlowStatus::Pending => StatusClass::PendingClass,
            FlowStatus::Http(code) if *code >= 400 => StatusClass::ErrorClass,
            FlowStatus::Http(code) if *code >= 300 => StatusClass::Redirect,
            FlowStatus::Http(_) => StatusClass::Success,
        }
    }

    /// Short display text for the status column.
    pub fn display(&self) -> String {
        match self {
            FlowStatus::Ok => "OK".to_string(),
            FlowStatus::Error => "ERR".to_string(),
            FlowStatus::Pending => "...".to_string(),
            FlowStatus::Http(code) => code.to_string(),
        }
    }
}

// ── Icon category ─────────────────────────────────────────────────────────────

/// Iconographic category for the leading table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconCategory {
    Json,
    Xml,
    Html,
    Css,
    Script,
    Text,
    Font,
    Image,
    Dns,
    File,
    /// TCP sessions.
    Network,
    /// UDP sessions.
    Message,
    /// DNS flows.
    Server,
}

/// Ordered content-type substring patterns for HTTP icon resolution.
///
/// Order is significant and fixed: several patterns can match the same
/// string (`application/json; charset=utf-8` contains both `json` and
/// `text`), and the first match wins.
const ICON_PATTERNS: &[(&str, IconCategory)] = &[
    ("json", IconCategory::Json),
    ("xml", IconCategory::Xml),
    ("html", IconCategory::Html),
    ("css", IconCategory::Css),
    ("javascript", IconCategory::Script),
    ("text", IconCategory::Text),
    ("font", IconCategory::Font),
    ("image", IconCategory::Image),
    ("dns", IconCategory::Dns),
];

fn icon_for_content_type(content_type: Option<&str>) -> IconCategory {
    let Some(ct) = content_type else {
        return IconCategory::File;
    };
    for (pattern, category) in ICON_PATTERNS {
        if ct.contains(pattern) {
            return *category;
        }
    }
    IconCategory::File
}

// ── Adapter accessors ─────────────────────────────────────────────────────────

impl FlowRecord {
    /// The capture-layer identity field, when the variant carries one.
    ///
    /// Tcp/Udp capture sources do not always assign ids; callers that
    /// need a guaranteed key use [`Flow::identity`].
    pub fn raw_id(&self) -> Option<&str> {
        match self {
            FlowRecord::Http(f) => Some(&f.id),
            FlowRecord::Dns(f) => Some(&f.id),
            FlowRecord::Tcp(f) => f.conn.id.as_deref(),
            FlowRecord::Udp(f) => f.conn.id.as_deref(),
        }
    }

    /// Protocol kind name for display and kind filtering.
    ///
    /// An HTTP exchange carrying `application/dns-message` payloads is
    /// DNS-over-HTTPS and counts as `"dns"`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FlowRecord::Http(f) => {
                let dns_payload = |m: &HttpMessage| {
                    m.effective_content_type.as_deref() == Some("application/dns-message")
                };
                let is_doh = f.request.as_ref().is_some_and(|r| dns_payload(&r.message))
                    || f.response.as_ref().is_some_and(|r| dns_payload(&r.message));
                if is_doh {
                    "dns"
                } else {
                    "http"
                }
            }
            FlowRecord::Dns(_) => "dns",
            FlowRecord::Tcp(_) => "tcp",
            FlowRecord::Udp(_) => "udp",
        }
    }

    /// Start timestamp: request start for Http/Dns, connection start
    /// for Tcp/Udp.
    pub fn start_timestamp(&self) -> Option<Timestamp> {
        match self {
            FlowRecord::Http(f) => f
                .request
                .as_ref()
                .and_then(|r| r.message.timestamp_start),
            FlowRecord::Dns(f) => f.timestamp_start,
            FlowRecord::Tcp(f) => f.conn.timestamp_start,
            FlowRecord::Udp(f) => f.conn.timestamp_start,
        }
    }

    /// One-line request description for the summary column.
    ///
    /// Never panics; missing sub-fields degrade to an empty string.
    pub fn request_summary(&self) -> String {
        match self {
            FlowRecord::Http(f) => {
                let Some(req) = &f.request else {
                    return String::new();
                };
                let raw = req.display_url.as_deref().unwrap_or(&req.url);
                format!("{} {}", req.method, strip_query(raw))
            }
            FlowRecord::Dns(f) => f
                .questions
                .first()
                .map(|q| q.name.clone())
                .unwrap_or_default(),
            FlowRecord::Tcp(f) => endpoint_summary(&f.conn),
            FlowRecord::Udp(f) => endpoint_summary(&f.conn),
        }
    }

    /// Bytes received from the server, when the protocol has a notion of it.
    pub fn inbound_bytes(&self) -> Option<u64> {
        match self {
            FlowRecord::Http(f) => f
                .response
                .as_ref()
                .and_then(|r| r.message.content.as_ref())
                .map(|c| c.len() as u64),
            FlowRecord::Dns(f) => f.response_size,
            FlowRecord::Tcp(f) => socket_bytes(&f.messages, false),
            FlowRecord::Udp(f) => socket_bytes(&f.messages, false),
        }
    }

    /// Bytes sent to the server, when the protocol has a notion of it.
    pub fn outbound_bytes(&self) -> Option<u64> {
        match self {
            FlowRecord::Http(f) => f
                .request
                .as_ref()
                .and_then(|r| r.message.content.as_ref())
                .map(|c| c.len() as u64),
            FlowRecord::Dns(f) => f.request_size,
            FlowRecord::Tcp(f) => socket_bytes(&f.messages, true),
            FlowRecord::Udp(f) => socket_bytes(&f.messages, true),
        }
    }

    /// Total duration in milliseconds. `None` while in flight.
    pub fn duration_ms(&self) -> Option<f64> {
        match self {
            FlowRecord::Http(f) => {
                let start = f
                    .request
                    .as_ref()
                    .and_then(|r| r.message.timestamp_start)?;
                let end = f.response.as_ref().and_then(|r| r.message.timestamp_end)?;
                Some((end.as_nanos() - start.as_nanos()) as f64 / 1_000_000.0)
            }
            FlowRecord::Dns(f) => f.duration_ms,
            FlowRecord::Tcp(f) => conn_duration_ms(&f.conn),
            FlowRecord::Udp(f) => conn_duration_ms(&f.conn),
        }
    }

    /// Normalized status for display.
    pub fn status(&self) -> FlowStatus {
        match self {
            FlowRecord::Http(f) => {
                if f.error.is_some() {
                    FlowStatus::Error
                } else {
                    match &f.response {
                        Some(resp) => match resp.status_code {
                            Some(code) => FlowStatus::Http(code),
                            None => FlowStatus::Ok,
                        },
                        None => FlowStatus::Pending,
                    }
                }
            }
            FlowRecord::Dns(f) => {
                if f.error.is_some() {
                    FlowStatus::Error
                } else if f.has_response {
                    FlowStatus::Ok
                } else {
                    FlowStatus::Pending
                }
            }
            FlowRecord::Tcp(f) => conn_status(&f.conn),
            FlowRecord::Udp(f) => conn_status(&f.conn),
        }
    }

    /// Icon category: content-type driven for Http, fixed per protocol
    /// otherwise.
    pub fn icon_category(&self) -> IconCategory {
        match self {
            FlowRecord::Http(f) => {
                // Response content type wins over the request's.
                let ct = f
                    .response
                    .as_ref()
                    .and_then(|r| r.message.effective_content_type.as_deref())
                    .or_else(|| {
                        f.request
                            .as_ref()
                            .and_then(|r| r.message.effective_content_type.as_deref())
                    });
                icon_for_content_type(ct)
            }
            FlowRecord::Dns(_) => IconCategory::Server,
            FlowRecord::Tcp(_) => IconCategory::Network,
            FlowRecord::Udp(_) => IconCategory::Message,
        }
    }
}

impl Flow {
    /// Stable identity for selection membership and focus correlation.
    ///
    /// Http/Dns use the capture-layer id. Tcp/Udp use their connection
    /// id when present; otherwise a stable key is synthesized from the
    /// server endpoint and start time, so socket rows stay selectable
    /// with id-less capture sources.
    pub fn identity(&self) -> FlowId {
        if let Some(id) = self.record.raw_id() {
            return id.to_string();
        }
        let (kind, conn) = match &self.record {
            FlowRecord::Tcp(f) => ("tcp", &f.conn),
            FlowRecord::Udp(f) => ("udp", &f.conn),
            // Http/Dns always carry an id.
            FlowRecord::Http(f) => return f.id.clone(),
            FlowRecord::Dns(f) => return f.id.clone(),
        };
        let start_ns = conn.timestamp_start.map(|t| t.as_nanos()).unwrap_or(0);
        format!(
            "{}:{}:{}:{}",
            kind, conn.server_host, conn.server_port, start_ns
        )
    }
}

fn endpoint_summary(conn: &SocketConnection) -> String {
    if conn.server_host.is_empty() {
        return String::new();
    }
    format!("{}:{}", conn.server_host, conn.server_port)
}

fn socket_bytes(messages: &[SocketMessage], from_client: bool) -> Option<u64> {
    if messages.is_empty() {
        return None;
    }
    Some(
        messages
            .iter()
            .filter(|m| m.from_client == from_client)
            .map(|m| m.content.len() as u64)
            .sum(),
    )
}

fn conn_duration_ms(conn: &SocketConnection) -> Option<f64> {
    let start = conn.timestamp_start?;
    let end = conn.timestamp_end?;
    Some((end.as_nanos() - start.as_nanos()) as f64 / 1_000_000.0)
}

fn conn_status(conn: &SocketConnection) -> FlowStatus {
    if conn.error.is_some() {
        FlowStatus::Error
    } else if conn.timestamp_end.is_some() {
        FlowStatus::Ok
    } else {
        FlowStatus::Pending
    }
}

/// Strip the query string from a URL for the summary column.
fn strip_query(raw: &str) -> String {
    if let Ok(mut parsed) = url::Url::parse(raw) {
        parsed.set_query(None);
        parsed.set_fragment(None);
        let s = parsed.to_string();
        return s.trim_end_matches('?').to_string();
    }
    // Relative or malformed URLs: degrade to a literal split.
    raw.split('?').next().unwrap_or(raw).to_string()
}

// ── Helper functions ──────────────────────────────────────────────────────────

/// Format a byte count as a human-readable string (B, KB, MB).
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Format a duration in milliseconds for display.
pub fn format_duration_ms(ms: f64) -> String {
    if ms < 1.0 {
        format!("{:.0}us", ms * 1000.0)
    } else if ms < 1000.0 {
        format!("{:.0}ms", ms)
    } else {
        format!("{:.2}s", ms / 1000.0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
