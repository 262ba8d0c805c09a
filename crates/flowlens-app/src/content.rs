//! # Content Format Pipeline
//!
//! Negotiates how a captured payload is decoded and presented: as
//! plain text, pretty-printed JSON, base64 image data, or raw bytes
//! for a hex view. The pipeline is a pure function of its inputs and
//! is re-invoked on every render; identical inputs always produce an
//! identical [`FormattedContent`].
//!
//! Resolution precedence:
//! 1. an explicit user override always wins;
//! 2. otherwise the declared `content-type` header is matched against
//!    an ordered predicate chain (sniffed effective type stands in
//!    only when the header is absent);
//! 3. no content type at all resolves to plain text;
//! 4. unknown content types resolve to binary — arbitrary captured
//!    bytes are never decoded as text on a guess.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

// ── FormatTag ─────────────────────────────────────────────────────────────────

/// The enumerated content interpretation selected for rendering a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatTag {
    /// Resolve from the content type.
    #[default]
    Auto,
    Text,
    Json,
    Protobuf,
    Grpc,
    GrpcWeb,
    Xml,
    Binary,
    Image,
    Dns,
    Javascript,
    Html,
}

impl FormatTag {
    /// Formats whose payload is presented as raw bytes.
    pub fn is_binary_family(&self) -> bool {
        matches!(
            self,
            FormatTag::Binary | FormatTag::Protobuf | FormatTag::Grpc | FormatTag::GrpcWeb
        )
    }

    /// Short label for the format selector in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            FormatTag::Auto => "auto",
            FormatTag::Text => "text",
            FormatTag::Json => "json",
            FormatTag::Protobuf => "protobuf",
            FormatTag::Grpc => "grpc",
            FormatTag::GrpcWeb => "grpc-web",
            FormatTag::Xml => "xml",
            FormatTag::Binary => "binary",
            FormatTag::Image => "image",
            FormatTag::Dns => "dns",
            FormatTag::Javascript => "javascript",
            FormatTag::Html => "html",
        }
    }
}

impl std::fmt::Display for FormatTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── FormattedContent ──────────────────────────────────────────────────────────

/// How the formatted payload is carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentData {
    Text(String),
    Bytes(Vec<u8>),
}

/// Transfer encoding of the formatted payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Text,
    Base64,
    Binary,
}

/// A transient, derived rendering of a payload. Never persisted;
/// recomputed from the source bytes and format settings on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedContent {
    pub data: ContentData,
    pub encoding: ContentEncoding,
    /// The format that was actually applied (never `Auto`).
    pub format: FormatTag,
}

impl FormattedContent {
    /// The payload as text, when it is carried as text.
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            ContentData::Text(s) => Some(s),
            ContentData::Bytes(_) => None,
        }
    }

    /// The payload as raw bytes, when it is carried as bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.data {
            ContentData::Text(_) => None,
            ContentData::Bytes(b) => Some(b),
        }
    }
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// Resolve a declared content type to a format tag.
///
/// The predicate chain is ordered; the first match wins. `grpc-web`
/// must be tested before `grpc`, and the specific `text/html` before
/// the generic `text`.
pub fn resolve_format(content_type: &str) -> FormatTag {
    let ct = content_type.to_lowercase();
    if ct.contains("application/json") || ct.contains("application/manifest+json") {
        FormatTag::Json
    } else if ct.contains("grpc-web") {
        FormatTag::GrpcWeb
    } else if ct.contains("grpc") {
        FormatTag::Grpc
    } else if ct.contains("application/proto") || ct.contains("x-protobuf") {
        FormatTag::Protobuf
    } else if ct.contains("text/html") {
        FormatTag::Html
    } else if ct.contains("image") {
        FormatTag::Image
    } else if ct.contains("xml") {
        FormatTag::Xml
    } else if ct.contains("text") {
        FormatTag::Text
    } else if ct.contains("javascript") {
        FormatTag::Javascript
    } else if ct.contains("application/octet") {
        FormatTag::Binary
    } else if ct.contains("dns") {
        FormatTag::Dns
    } else {
        // Never attempt to decode unknown binary as text.
        FormatTag::Binary
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Decide how to decode and present `payload`.
///
/// `requested` is the user override (`Auto` defers to content-type
/// negotiation). `content_type` is the declared transport header;
/// `effective_content_type` is the capture layer's sniffed type, used
/// only when the header is absent. Total and deterministic: malformed
/// input degrades, it never errors.
pub fn format_content(
    payload: Option<&[u8]>,
    requested: FormatTag,
    content_type: Option<&str>,
    effective_content_type: Option<&str>,
) -> FormattedContent {
    let format = if requested != FormatTag::Auto {
        requested
    } else {
        match content_type.or(effective_content_type) {
            Some(ct) => resolve_format(ct),
            // Showing an empty/unknown payload as text beats guessing binary.
            None => FormatTag::Text,
        }
    };

    let Some(bytes) = payload.filter(|b| !b.is_empty()) else {
        return empty_content(format);
    };

    match format {
        FormatTag::Json => {
            let text = String::from_utf8_lossy(bytes).into_owned();
            // Best effort: parse failure keeps the json tag so syntax
            // highlighting still applies to the raw text.
            let pretty = serde_json::from_str::<serde_json::Value>(&text)
                .and_then(|v| serde_json::to_string_pretty(&v))
                .unwrap_or(text);
            FormattedContent {
                data: ContentData::Text(pretty),
                encoding: ContentEncoding::Text,
                format: FormatTag::Json,
            }
        }
        FormatTag::Image => FormattedContent {
            data: ContentData::Text(STANDARD.encode(bytes)),
            encoding: ContentEncoding::Base64,
            format: FormatTag::Image,
        },
        FormatTag::Binary | FormatTag::Protobuf | FormatTag::Grpc | FormatTag::GrpcWeb => {
            FormattedContent {
                data: ContentData::Bytes(bytes.to_vec()),
                encoding: ContentEncoding::Binary,
                format,
            }
        }
        FormatTag::Html
        | FormatTag::Xml
        | FormatTag::Javascript
        | FormatTag::Dns
        | FormatTag::Text => FormattedContent {
            data: ContentData::Text(String::from_utf8_lossy(bytes).into_owned()),
            encoding: ContentEncoding::Text,
            format,
        },
        // Auto was resolved above; an empty chain result is plain text.
        FormatTag::Auto => FormattedContent {
            data: ContentData::Text(String::from_utf8_lossy(bytes).into_owned()),
            encoding: ContentEncoding::Text,
            format: FormatTag::Text,
        },
    }
}

/// Empty/absent payload short-circuit.
///
/// Json keeps its tag with empty text, the binary family yields an
/// empty byte sequence, everything else normalizes to empty plain text.
fn empty_content(format: FormatTag) -> FormattedContent {
    if format == FormatTag::Json {
        FormattedContent {
            data: ContentData::Text(String::new()),
            encoding: ContentEncoding::Text,
            format: FormatTag::Json,
        }
    } else if format.is_binary_family() {
        FormattedContent {
            data: ContentData::Bytes(Vec::new()),
            encoding: ContentEncoding::Binary,
            format,
        }
    } else {
        FormattedContent {
            data: ContentData::Text(String::new()),
            encoding: ContentEncoding::Text,
            format: FormatTag::Text,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
