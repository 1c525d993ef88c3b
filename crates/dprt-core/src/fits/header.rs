//! FITS header cards.

use std::io::Read;

use crate::error::ImageError;

/// Size of one FITS logical record.
pub const BLOCK_SIZE: usize = 2880;
/// Size of one header card.
pub const CARD_SIZE: usize = 80;

/// Parsed primary header: keyword/value pairs in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitsHeader {
    cards: Vec<(String, String)>,
}

impl FitsHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read header blocks up to and including the one holding `END`.
    ///
    /// Also returns the number of bytes consumed.
    pub(crate) fn read_from<R: Read>(reader: &mut R) -> Result<(Self, u64), ImageError> {
        let mut header = Self::new();
        let mut block = [0u8; BLOCK_SIZE];
        let mut consumed = 0u64;
        loop {
            reader.read_exact(&mut block).map_err(|e| ImageError::Read {
                message: format!("header block: {e}"),
            })?;
            consumed += BLOCK_SIZE as u64;
            for card in block.chunks_exact(CARD_SIZE) {
                let text = String::from_utf8_lossy(card);
                let card: &str = &text;
                let keyword = card.get(..8).unwrap_or(card).trim_end();
                if keyword == "END" {
                    return Ok((header, consumed));
                }
                if keyword.is_empty() || card.get(8..10) != Some("= ") {
                    continue;
                }
                let value = strip_comment(card.get(10..).unwrap_or(""));
                header.push(keyword, value);
            }
        }
    }

    /// Append a card. Later duplicates are kept but never returned by `get`.
    pub fn push(&mut self, keyword: &str, value: &str) {
        self.cards.push((keyword.to_string(), value.to_string()));
    }

    /// Raw value text for a keyword (first occurrence).
    pub fn get(&self, keyword: &str) -> Option<&str> {
        self.cards
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, v)| v.as_str())
    }

    /// Integer value of a required keyword.
    pub fn get_int(&self, keyword: &str) -> Result<i64, ImageError> {
        let value = self.require(keyword)?;
        value
            .parse()
            .map_err(|_| malformed(keyword, value))
    }

    /// Float value of a required keyword. Accepts Fortran `D` exponents.
    pub fn get_f64(&self, keyword: &str) -> Result<f64, ImageError> {
        let value = self.require(keyword)?;
        value
            .replace(['D', 'd'], "E")
            .parse()
            .map_err(|_| malformed(keyword, value))
    }

    /// Float value of an optional keyword, `default` when absent.
    pub fn get_f64_or(&self, keyword: &str, default: f64) -> Result<f64, ImageError> {
        match self.get(keyword) {
            Some(_) => self.get_f64(keyword),
            None => Ok(default),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn require(&self, keyword: &str) -> Result<&str, ImageError> {
        self.get(keyword).ok_or_else(|| ImageError::KeyMissing {
            keyword: keyword.to_string(),
        })
    }
}

fn malformed(keyword: &str, value: &str) -> ImageError {
    ImageError::MalformedHeader {
        keyword: keyword.to_string(),
        value: value.to_string(),
    }
}

/// Drop a trailing `/ comment`, honouring quoted strings.
fn strip_comment(raw: &str) -> &str {
    let mut in_quotes = false;
    for (i, c) in raw.char_indices() {
        match c {
            '\'' => in_quotes = !in_quotes,
            '/' if !in_quotes => return raw[..i].trim(),
            _ => {}
        }
    }
    raw.trim()
}
