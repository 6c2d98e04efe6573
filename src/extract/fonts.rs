//! Font encodings: how the bytes of a shown string become text
//!
//! Simple fonts are read as one byte per glyph. A `ToUnicode` CMap takes
//! precedence whenever the font carries one. Composite fonts without a map
//! address glyphs by CID only, so their text cannot be recovered.

use super::pdf::{resolve, resolve_dict};
use lopdf::Dictionary;
use log::warn;
use std::collections::HashMap;

/// Upper bound on codes expanded from a single `bfrange`
const MAX_RANGE_CODES: u32 = 0x1_0000;

#[derive(Debug, Clone, PartialEq)]
pub enum TextDecoder {
    /// Latin-1 bytes, or UTF-16BE when the string starts with a BOM
    Simple,
    /// Two-byte UCS-2/UTF-16 code units (`Uni*-UCS2-H` style encodings)
    Utf16,
    Mapped(ToUnicode),
    /// Why the text of this font cannot be decoded
    Undecodable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FontInfo {
    pub base_font: String,
    pub decoder: TextDecoder,
}

impl FontInfo {
    pub fn simple(base_font: impl Into<String>) -> Self {
        Self {
            base_font: base_font.into(),
            decoder: TextDecoder::Simple,
        }
    }

    /// Decode a shown string, or give the reason it cannot be decoded
    pub fn decode(&self, bytes: &[u8]) -> Result<String, String> {
        match &self.decoder {
            TextDecoder::Simple => Ok(decode_simple(bytes)),
            TextDecoder::Utf16 => Ok(decode_utf16(bytes)),
            TextDecoder::Mapped(map) => Ok(map.decode(bytes)),
            TextDecoder::Undecodable(reason) => Err(format!("font {}: {}", self.base_font, reason)),
        }
    }
}

pub fn decode_simple(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(rest) => decode_utf16(rest),
        None => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn decode_utf16(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Read the encoding of one font dictionary
pub fn font_info(doc: &lopdf::Document, font: &Dictionary) -> FontInfo {
    let base_font = font
        .get(b"BaseFont")
        .ok()
        .and_then(|b| b.as_name().ok())
        .map(|b| String::from_utf8_lossy(b).into_owned())
        .unwrap_or_default();
    let subtype = font.get(b"Subtype").ok().and_then(|s| s.as_name().ok());
    let encoding = font.get(b"Encoding").ok().and_then(|e| resolve(doc, e));

    if let Some(map) = font
        .get(b"ToUnicode")
        .ok()
        .and_then(|t| resolve(doc, t))
        .and_then(|t| t.as_stream().ok())
        .and_then(|s| s.get_plain_content().ok())
        .map(|data| ToUnicode::parse(&data))
        .filter(|map| !map.is_empty())
    {
        return FontInfo {
            base_font,
            decoder: TextDecoder::Mapped(map),
        };
    }

    if subtype == Some(b"Type0".as_slice()) {
        let encoding_name = encoding
            .and_then(|e| e.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_else(|| "embedded CMap".to_string());
        let decoder = if encoding_name.contains("UCS2") || encoding_name.contains("UTF16") {
            TextDecoder::Utf16
        } else {
            TextDecoder::Undecodable(format!(
                "composite font with {} encoding has no ToUnicode map",
                encoding_name
            ))
        };
        return FontInfo { base_font, decoder };
    }

    let differences = encoding
        .and_then(|e| e.as_dict().ok())
        .is_some_and(|e| e.has(b"Differences"));
    if differences {
        warn!(
            "Font {} remaps glyphs with /Differences and has no ToUnicode map; its text is read as Latin-1",
            base_font
        );
    }
    FontInfo::simple(base_font)
}

/// Resource name → font for every font a resource dictionary declares
pub fn resource_fonts(doc: &lopdf::Document, fonts: &Dictionary) -> HashMap<Vec<u8>, FontInfo> {
    fonts
        .iter()
        .filter_map(|(name, value)| {
            let font = resolve_dict(doc, value)?;
            Some((name.clone(), font_info(doc, font)))
        })
        .collect()
}

/// Parsed `ToUnicode` CMap: character code → text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToUnicode {
    code_bytes: usize,
    map: HashMap<u32, String>,
}

#[derive(Debug, PartialEq)]
enum Token {
    Hex(Vec<u8>),
    ArrayStart,
    ArrayEnd,
    Word(String),
}

impl ToUnicode {
    pub fn parse(data: &[u8]) -> Self {
        let mut cmap = ToUnicode::default();
        let mut tokens = tokenize(data).into_iter();

        while let Some(token) = tokens.next() {
            let Token::Word(word) = token else {
                continue;
            };
            match word.as_str() {
                "begincodespacerange" => {
                    for token in tokens.by_ref() {
                        match token {
                            Token::Hex(low) if cmap.code_bytes == 0 => cmap.code_bytes = low.len(),
                            Token::Word(w) if w == "endcodespacerange" => break,
                            _ => {}
                        }
                    }
                }
                "beginbfchar" => {
                    let mut pending: Option<Vec<u8>> = None;
                    for token in tokens.by_ref() {
                        match token {
                            Token::Hex(bytes) => match pending.take() {
                                Some(src) => cmap.insert(&src, decode_utf16_target(&bytes)),
                                None => pending = Some(bytes),
                            },
                            Token::Word(w) if w == "endbfchar" => break,
                            _ => pending = None,
                        }
                    }
                }
                "beginbfrange" => cmap.parse_ranges(&mut tokens),
                _ => {}
            }
        }
        cmap
    }

    fn parse_ranges(&mut self, tokens: &mut impl Iterator<Item = Token>) {
        let mut bounds: Vec<Vec<u8>> = Vec::new();
        while let Some(token) = tokens.next() {
            match token {
                Token::Hex(bytes) if bounds.len() < 2 => bounds.push(bytes),
                Token::Hex(target) => {
                    let (low, high) = (code_of(&bounds[0]), code_of(&bounds[1]));
                    self.note_width(&bounds[0]);
                    let mut units = utf16_units(&target);
                    for code in low..=high.min(low.saturating_add(MAX_RANGE_CODES)) {
                        self.map.insert(code, String::from_utf16_lossy(&units));
                        if let Some(last) = units.last_mut() {
                            *last = last.wrapping_add(1);
                        }
                    }
                    bounds.clear();
                }
                Token::ArrayStart => {
                    let mut code = bounds.first().map_or(0, |b| code_of(b));
                    if let Some(first) = bounds.first() {
                        self.note_width(first);
                    }
                    for token in tokens.by_ref() {
                        match token {
                            Token::Hex(target) => {
                                self.map.insert(code, decode_utf16_target(&target));
                                code = code.saturating_add(1);
                            }
                            _ => break,
                        }
                    }
                    bounds.clear();
                }
                Token::Word(w) if w == "endbfrange" => break,
                _ => bounds.clear(),
            }
        }
    }

    fn insert(&mut self, src: &[u8], text: String) {
        self.note_width(src);
        self.map.insert(code_of(src), text);
    }

    fn note_width(&mut self, src: &[u8]) {
        if self.code_bytes == 0 {
            self.code_bytes = src.len();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Unmapped one-byte codes fall back to Latin-1; wider ones to U+FFFD
    pub fn decode(&self, bytes: &[u8]) -> String {
        let width = self.code_bytes.clamp(1, 4);
        bytes
            .chunks(width)
            .map(|chunk| match self.map.get(&code_of(chunk)) {
                Some(text) => text.clone(),
                None if width == 1 => (chunk[0] as char).to_string(),
                None => char::REPLACEMENT_CHARACTER.to_string(),
            })
            .collect()
    }
}

fn code_of(bytes: &[u8]) -> u32 {
    bytes.iter().take(4).fold(0, |acc, &b| (acc << 8) | u32::from(b))
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    if bytes.len() == 1 {
        return vec![u16::from(bytes[0])];
    }
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

fn decode_utf16_target(bytes: &[u8]) -> String {
    String::from_utf16_lossy(&utf16_units(bytes))
}

fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || b"()<>[]{}/%".contains(&b)
}

fn tokenize(data: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b if b.is_ascii_whitespace() => i += 1,
            b'%' => {
                while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                    i += 1;
                }
            }
            b'[' => {
                tokens.push(Token::ArrayStart);
                i += 1;
            }
            b']' => {
                tokens.push(Token::ArrayEnd);
                i += 1;
            }
            b'<' if data.get(i + 1) == Some(&b'<') => i += 2,
            b'>' if data.get(i + 1) == Some(&b'>') => i += 2,
            b'<' => {
                let end = data[i..].iter().position(|&b| b == b'>').map_or(data.len(), |p| i + p);
                let digits: Vec<u8> = data[i + 1..end]
                    .iter()
                    .copied()
                    .filter(u8::is_ascii_hexdigit)
                    .collect();
                tokens.push(Token::Hex(hex_bytes(&digits)));
                i = end + 1;
            }
            b'(' => {
                let mut depth = 0usize;
                while i < data.len() {
                    match data[i] {
                        b'\\' => i += 1,
                        b'(' => depth += 1,
                        b')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
                i += 1;
            }
            b'/' => {
                i += 1;
                while i < data.len() && !is_delimiter(data[i]) {
                    i += 1;
                }
            }
            _ => {
                let start = i;
                while i < data.len() && !is_delimiter(data[i]) {
                    i += 1;
                }
                if i == start {
                    i += 1;
                    continue;
                }
                tokens.push(Token::Word(String::from_utf8_lossy(&data[start..i]).into_owned()));
            }
        }
    }
    tokens
}

/// Hex digits to bytes; an odd trailing digit is padded with 0
fn hex_bytes(digits: &[u8]) -> Vec<u8> {
    let value = |d: u8| (d as char).to_digit(16).unwrap_or(0) as u8;
    digits
        .chunks(2)
        .map(|pair| (value(pair[0]) << 4) | pair.get(1).map_or(0, |&d| value(d)))
        .collect()
}
