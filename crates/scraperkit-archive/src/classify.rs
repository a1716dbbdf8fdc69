//! Content classification: mimetype, textual vs binary, HTML titles.

use crate::Result;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Bytes read from the head of a file for signature sniffing.
const SNIFF_LEN: usize = 512;

macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).expect("valid regex literal"))
    }};
}

/// Outcome of classifying one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub mimetype: String,
    /// Textual content is eligible for title extraction and indexing.
    pub textual: bool,
}

impl Classification {
    fn new(mimetype: &str) -> Self {
        Self {
            mimetype: mimetype.to_string(),
            textual: is_textual(mimetype),
        }
    }

    /// Whether titles should be looked up in the content.
    pub fn is_html(&self) -> bool {
        self.mimetype == "text/html"
    }
}

/// Classify a file by extension, falling back to its leading bytes.
pub fn classify(path: &Path) -> Result<Classification> {
    if let Some(mimetype) = mimetype_from_extension(path) {
        return Ok(Classification::new(mimetype));
    }

    let mut head = Vec::with_capacity(SNIFF_LEN);
    File::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)?;
    Ok(Classification::new(sniff_mimetype(&head)))
}

/// Mimetype for a known extension.
pub fn mimetype_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();

    let mimetype = match ext.as_str() {
        "html" | "htm" | "xhtml" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/vnd.microsoft.icon",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "vtt" => "text/vtt",
        _ => return None,
    };
    Some(mimetype)
}

/// Mimetype guessed from the first bytes of a file.
pub fn sniff_mimetype(head: &[u8]) -> &'static str {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"%PDF-", "application/pdf"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1a\x45\xdf\xa3", "video/webm"),
        (b"ID3", "audio/mpeg"),
        (b"OggS", "audio/ogg"),
        (b"wOFF", "font/woff"),
        (b"wOF2", "font/woff2"),
    ];

    if let Some((_, mimetype)) = SIGNATURES.iter().find(|(sig, _)| head.starts_with(sig)) {
        return *mimetype;
    }
    if head.len() >= 12 && &head[..4] == b"RIFF" && &head[8..12] == b"WEBP" {
        return "image/webp";
    }

    let Ok(text) = std::str::from_utf8(trim_partial_utf8(head)) else {
        return "application/octet-stream";
    };
    if text.contains('\0') {
        return "application/octet-stream";
    }

    let lower = text.trim_start_matches('\u{feff}').trim_start().to_ascii_lowercase();
    if lower.starts_with("<!doctype html")
        || lower.starts_with("<html")
        || lower.starts_with("<head")
        || lower.starts_with("<title")
    {
        "text/html"
    } else if lower.starts_with("<svg") {
        "image/svg+xml"
    } else if lower.starts_with("<?xml") {
        if lower.contains("<svg") {
            "image/svg+xml"
        } else {
            "application/xml"
        }
    } else {
        "text/plain"
    }
}

/// The sniff window may cut a multi-byte character in half.
fn trim_partial_utf8(head: &[u8]) -> &[u8] {
    match std::str::from_utf8(head) {
        Ok(_) => head,
        Err(e) if e.error_len().is_none() => &head[..e.valid_up_to()],
        Err(_) => head,
    }
}

/// Whether content of this mimetype is text.
pub fn is_textual(mimetype: &str) -> bool {
    mimetype.starts_with("text/")
        || matches!(
            mimetype,
            "application/javascript" | "application/json" | "application/xml" | "image/svg+xml"
        )
}

/// Text of the first `<title>` element, trimmed, with common entities decoded.
pub fn find_title(html: &str) -> Option<String> {
    let caps = regex!(r"(?is)<title[^>]*>(.*?)</title\s*>").captures(html)?;
    let raw = caps.get(1)?.as_str();
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    Some(decode_entities(&collapsed))
}

fn decode_entities(text: &str) -> String {
    regex!(r"&(#x[0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos|nbsp);")
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ if name.starts_with("#x") => {
                    u32::from_str_radix(&name[2..], 16).ok().and_then(char::from_u32)
                }
                _ => name[1..].parse().ok().and_then(char::from_u32),
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
