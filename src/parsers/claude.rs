//! Claude Code JSONL parser

use crate::types::{Result, TokcountError, UsageEntry, UNKNOWN_KEY};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::LogParser;

/// Record type carrying assistant output
const ASSISTANT_TYPE: &str = "assistant";

/// Claude Code JSONL line structure
#[derive(Deserialize)]
struct ClaudeJsonLine<'a> {
    #[serde(rename = "type")]
    line_type: Option<&'a str>,
    #[serde(default, borrow, deserialize_with = "lenient_str")]
    timestamp: Option<Cow<'a, str>>,
    #[serde(rename = "requestId", default, borrow, deserialize_with = "lenient_str")]
    request_id: Option<Cow<'a, str>>,
    #[serde(rename = "sessionId", default, borrow, deserialize_with = "lenient_str")]
    session_id: Option<Cow<'a, str>>,
    #[serde(borrow)]
    message: Option<ClaudeMessage<'a>>,
}

#[derive(Deserialize)]
struct ClaudeMessage<'a> {
    #[serde(default, borrow, deserialize_with = "lenient_str")]
    model: Option<Cow<'a, str>>,
    usage: Option<ClaudeUsage>,
}

/// Read a scalar field as text without failing the record.
///
/// Strings borrow from the line buffer. Numbers and booleans are rendered
/// with `to_string`. Null, arrays and objects read as absent.
fn lenient_str<'de, D>(deserializer: D) -> std::result::Result<Option<Cow<'de, str>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientStr;

    impl<'de> Visitor<'de> for LenientStr {
        type Value = Option<Cow<'de, str>>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("any JSON value")
        }

        fn visit_borrowed_str<E: de::Error>(self, v: &'de str) -> std::result::Result<Self::Value, E> {
            Ok(Some(Cow::Borrowed(v)))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
            Ok(Some(Cow::Owned(v.to_string())))
        }

        fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Self::Value, E> {
            Ok(Some(Cow::Owned(v)))
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Self::Value, E> {
            Ok(Some(Cow::Owned(v.to_string())))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
            Ok(Some(Cow::Owned(v.to_string())))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
            Ok(Some(Cow::Owned(v.to_string())))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
            Ok(Some(Cow::Owned(v.to_string())))
        }

        fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> std::result::Result<Self::Value, D2::Error> {
            d.deserialize_any(self)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(None)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(None)
        }
    }

    deserializer.deserialize_any(LenientStr)
}

#[derive(Deserialize)]
struct ClaudeUsage {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
    cache_creation_input_tokens: Option<u64>,
    cache_read_input_tokens: Option<u64>,
}

/// Parser for Claude Code conversation logs
pub struct ClaudeCodeParser {
    data_dir: PathBuf,
}

impl ClaudeCodeParser {
    /// Create a new parser with default data directory (~/.claude/projects/)
    pub fn new() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
        }
    }

    /// Create a parser with a custom data directory
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// `~/.claude/projects`, or `./.claude/projects` when home is unknown
    pub fn default_data_dir() -> PathBuf {
        let home = directories::BaseDirs::new()
            .map(|d| d.home_dir().to_path_buf())
            .unwrap_or_else(|| {
                eprintln!("[tokcount] Warning: Could not determine home directory");
                PathBuf::from(".")
            });
        home.join(".claude").join("projects")
    }

    /// Lazily extract usage entries from one file.
    ///
    /// Opening the file is the only hard failure. A read error mid-file is
    /// reported and ends the sequence; entries already yielded stand.
    pub fn entries(path: &Path) -> Result<impl Iterator<Item = UsageEntry>> {
        let file = File::open(path).map_err(TokcountError::Io)?;
        let reader = BufReader::new(file);
        let path = path.to_path_buf();

        Ok(reader
            .split(b'\n')
            .map_while(move |line| match line {
                Ok(l) => Some(l),
                Err(e) => {
                    eprintln!("[tokcount] Warning: Failed to read {:?}: {}", path, e);
                    None
                }
            })
            .filter_map(|mut line| Self::parse_line(&mut line)))
    }

    /// Parse a single JSONL line (zero-copy with borrowed strings).
    ///
    /// Returns `None` for anything that is not an assistant record with
    /// at least one non-zero token count.
    fn parse_line(line: &mut [u8]) -> Option<UsageEntry> {
        if line.iter().all(u8::is_ascii_whitespace) {
            return None;
        }

        let data: ClaudeJsonLine = simd_json::from_slice(line).ok()?;

        if data.line_type != Some(ASSISTANT_TYPE) {
            return None;
        }

        let message = data.message.as_ref()?;
        let usage = message.usage.as_ref()?;

        let input_tokens = usage.input_tokens.unwrap_or(0);
        let output_tokens = usage.output_tokens.unwrap_or(0);
        let cache_write_tokens = usage.cache_creation_input_tokens.unwrap_or(0);
        let cache_read_tokens = usage.cache_read_input_tokens.unwrap_or(0);

        if input_tokens == 0
            && output_tokens == 0
            && cache_write_tokens == 0
            && cache_read_tokens == 0
        {
            return None;
        }

        Some(UsageEntry {
            request_id: data.request_id.map(Cow::into_owned),
            model: message.model.as_deref().unwrap_or(UNKNOWN_KEY).to_string(),
            date_key: date_key(data.timestamp.as_deref()),
            input_tokens,
            output_tokens,
            cache_write_tokens,
            cache_read_tokens,
            session_id: data.session_id.map(Cow::into_owned),
        })
    }
}

/// Calendar date of a timestamp in its own offset, or `"unknown"`.
///
/// Accepts RFC 3339 (`Z` or numeric offset), a naive date-time, or a bare date.
pub fn date_key(timestamp: Option<&str>) -> String {
    let ts = match timestamp.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return UNKNOWN_KEY.to_string(),
    };

    let date = DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(ts, "%Y-%m-%d"));

    match date {
        Ok(d) => d.format("%Y-%m-%d").to_string(),
        Err(_) => UNKNOWN_KEY.to_string(),
    }
}

impl Default for ClaudeCodeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogParser for ClaudeCodeParser {
    fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn file_pattern(&self) -> &str {
        "**/*.jsonl"
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<UsageEntry>> {
        Ok(Self::entries(path)?.collect())
    }
}
