//! Relay log line parser.
//!
//! The relay writes one event per line. Two shapes are recognized:
//!
//! - a forwarded packet: `[<time>, '<sender-ip>', <port>, <token>]` where
//!   `<token>` is either a Python-style byte literal `b'...'` holding an
//!   application payload, or some other relay sub-message (no payload);
//! - a roster announcement: `Robots in team blue are ['10.0.0.1', ...]`.
//!
//! Any other line fails with a [`LineParseError`] and is skipped by
//! [`parse_log`]; a bad line never aborts the scan.

use telemetry_core::TeamColor;
use thiserror::Error;

/// One forwarded packet from the relay log. Immutable after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayRecord {
    /// Seconds since capture start.
    pub time: f64,
    pub sender_ip: String,
    pub sender_port: u16,
    /// Decoded application payload, absent for relay sub-messages.
    pub payload: Option<Vec<u8>>,
}

/// A team roster announcement naming the addresses of one team's players.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterAnnouncement {
    pub color: TeamColor,
    pub addresses: Vec<String>,
}

/// One successfully parsed relay log line.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayLine {
    Packet(RelayRecord),
    Roster(RosterAnnouncement),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineParseError {
    #[error("line matches no relay record shape")]
    UnrecognizedShape,

    #[error("invalid timestamp field: {0:?}")]
    InvalidTimestamp(String),

    #[error("invalid sender address field")]
    InvalidSender,

    #[error("invalid sender port field: {0:?}")]
    InvalidPort(String),

    #[error("unterminated byte literal")]
    UnterminatedByteLiteral,

    #[error("invalid escape in byte literal: {0:?}")]
    InvalidEscape(String),

    #[error("unknown team color in roster announcement: {0:?}")]
    UnknownTeamColor(String),

    #[error("malformed roster address list")]
    MalformedRoster,
}

/// Running totals for one log scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub total_lines: u32,
    pub parsed: u32,
    pub skipped: u32,
}

const ROSTER_PREFIX: &str = "Robots in team ";

/// Parse one raw log line into a [`RelayLine`].
pub fn parse_line(line: &str) -> Result<RelayLine, LineParseError> {
    let line = line.trim_end_matches(['\n', '\r']);
    if let Some(rest) = line.strip_prefix(ROSTER_PREFIX) {
        return parse_roster(rest).map(RelayLine::Roster);
    }
    if line.starts_with('[') && line.ends_with(']') {
        return parse_packet(&line[1..line.len() - 1]).map(RelayLine::Packet);
    }
    Err(LineParseError::UnrecognizedShape)
}

/// Parse every line, skipping (and counting) the ones that fail.
///
/// Holds the total-or-skip property: `parsed + skipped == total_lines`.
pub fn parse_log<'a, I>(lines: I) -> (Vec<RelayLine>, ParseStats)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parsed = Vec::new();
    let mut stats = ParseStats::default();

    for line in lines {
        stats.total_lines += 1;
        match parse_line(line) {
            Ok(record) => {
                parsed.push(record);
                stats.parsed += 1;
            }
            Err(e) => {
                stats.skipped += 1;
                log::warn!("Skipping relay log line {}: {}", stats.total_lines, e);
            }
        }
    }

    (parsed, stats)
}

/// Body of a packet line with the outer brackets removed:
/// `<time>, '<ip>', <port>, <token>`.
fn parse_packet(body: &str) -> Result<RelayRecord, LineParseError> {
    let (time_str, rest) = body
        .split_once(", ")
        .ok_or(LineParseError::UnrecognizedShape)?;
    let time: f64 = time_str
        .trim()
        .parse()
        .map_err(|_| LineParseError::InvalidTimestamp(time_str.to_string()))?;

    let (ip_str, rest) = rest
        .split_once(", ")
        .ok_or(LineParseError::UnrecognizedShape)?;
    let sender_ip = unquote(ip_str.trim()).ok_or(LineParseError::InvalidSender)?;

    // The token may itself contain ", " (byte literals often do), so only
    // the port is split off here and the remainder is taken verbatim.
    let (port_str, token) = rest
        .split_once(", ")
        .ok_or(LineParseError::UnrecognizedShape)?;
    let sender_port: u16 = port_str
        .trim()
        .parse()
        .map_err(|_| LineParseError::InvalidPort(port_str.to_string()))?;

    let payload = match byte_literal(token.trim()) {
        Some(inner) => Some(unescape_bytes(inner)?),
        None => None,
    };

    Ok(RelayRecord { time, sender_ip: sender_ip.to_string(), sender_port, payload })
}

/// Roster body after the `Robots in team ` prefix:
/// `blue are ['10.0.0.1', '10.0.0.2']`.
fn parse_roster(rest: &str) -> Result<RosterAnnouncement, LineParseError> {
    let (color_str, list) = rest
        .split_once(" are ")
        .ok_or(LineParseError::UnrecognizedShape)?;

    let color = match color_str {
        "blue" => TeamColor::Blue,
        "red" => TeamColor::Red,
        other => return Err(LineParseError::UnknownTeamColor(other.to_string())),
    };

    let list = list
        .strip_prefix('[')
        .and_then(|l| l.strip_suffix(']'))
        .ok_or(LineParseError::MalformedRoster)?;

    let mut addresses = Vec::new();
    if !list.trim().is_empty() {
        for item in list.split(", ") {
            let address = unquote(item.trim()).ok_or(LineParseError::MalformedRoster)?;
            addresses.push(address.to_string());
        }
    }

    Ok(RosterAnnouncement { color, addresses })
}

/// Strip matching single or double quotes.
fn unquote(s: &str) -> Option<&str> {
    if s.len() >= 2 {
        for quote in ['\'', '"'] {
            if s.starts_with(quote) && s.ends_with(quote) {
                return Some(&s[1..s.len() - 1]);
            }
        }
    }
    None
}

/// Inner text of a `b'...'` byte literal, if the token is one.
fn byte_literal(token: &str) -> Option<&str> {
    token
        .strip_prefix("b'")
        .and_then(|t| t.strip_suffix('\''))
}

/// Decode the escaped body of a Python byte literal into raw bytes.
///
/// Handles `\xHH`, the single-character escapes `\n \r \t \0 \\ \' \"`,
/// and passes other characters through as their (sub-256) code point. A
/// backslash before an unrecognized character is kept literally, matching
/// how the literals were produced.
fn unescape_bytes(s: &str) -> Result<Vec<u8>, LineParseError> {
    let mut out = Vec::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            let code = c as u32;
            if code > 0xff {
                return Err(LineParseError::InvalidEscape(c.to_string()));
            }
            out.push(code as u8);
            continue;
        }

        match chars.next() {
            None => return Err(LineParseError::UnterminatedByteLiteral),
            Some('x') => {
                let hi = chars.next().ok_or(LineParseError::UnterminatedByteLiteral)?;
                let lo = chars.next().ok_or(LineParseError::UnterminatedByteLiteral)?;
                let hex: String = [hi, lo].iter().collect();
                let byte = u8::from_str_radix(&hex, 16)
                    .map_err(|_| LineParseError::InvalidEscape(format!("\\x{hex}")))?;
                out.push(byte);
            }
            Some('n') => out.push(b'\n'),
            Some('r') => out.push(b'\r'),
            Some('t') => out.push(b'\t'),
            Some('0') => out.push(0),
            Some('\\') => out.push(b'\\'),
            Some('\'') => out.push(b'\''),
            Some('"') => out.push(b'"'),
            Some(other) => {
                // Python's repr leaves unknown escapes as two characters.
                out.push(b'\\');
                let code = other as u32;
                if code > 0xff {
                    return Err(LineParseError::InvalidEscape(other.to_string()));
                }
                out.push(code as u8);
            }
        }
    }

    Ok(out)
}
