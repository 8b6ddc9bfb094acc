//! Three byte character keys used by the firmware's glyph lookup table.

use std::fmt;

use crate::error::{AssetError, Result};

pub const INDEX_LEN: usize = 3;

/// UTF-8 bytes of a character, zero padded on the right to [`INDEX_LEN`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CharIndex([u8; INDEX_LEN]);

impl CharIndex {
    pub fn encode(ch: char) -> Result<Self> {
        let len = ch.len_utf8();
        if len > INDEX_LEN {
            return Err(AssetError::IndexOverflow { ch, len });
        }
        let mut bytes = [0u8; INDEX_LEN];
        ch.encode_utf8(&mut bytes);
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; INDEX_LEN]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; INDEX_LEN] {
        self.0
    }

    /// Strip the zero padding and decode the remaining UTF-8.
    pub fn decode(&self) -> Option<char> {
        let used = self.0.iter().rposition(|b| *b != 0).map_or(1, |i| i + 1);
        let mut chars = std::str::from_utf8(&self.0[..used]).ok()?.chars();
        let ch = chars.next()?;
        chars.next().is_none().then_some(ch)
    }
}

impl TryFrom<char> for CharIndex {
    type Error = AssetError;

    fn try_from(ch: char) -> Result<Self> {
        CharIndex::encode(ch)
    }
}

impl fmt::Display for CharIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", hex_list(&self.0))
    }
}

/// `0xAB, 0xCD, ...` with uppercase hex digits.
pub(crate) fn hex_list(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{b:02X}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_padded() {
        assert_eq!(CharIndex::encode('W').unwrap().bytes(), [0x57, 0x00, 0x00]);
    }

    #[test]
    fn three_byte_cjk_fits() {
        let idx = CharIndex::encode('中').unwrap();
        assert_eq!(idx.bytes(), [0xE4, 0xB8, 0xAD]);
        assert_eq!(idx.decode(), Some('中'));
    }

    #[test]
    fn four_byte_is_rejected() {
        assert!(matches!(
            CharIndex::encode('😀'),
            Err(AssetError::IndexOverflow { len: 4, .. })
        ));
    }

    #[test]
    fn display_matches_c_literal() {
        assert_eq!(
            CharIndex::encode('é').unwrap().to_string(),
            "{0xC3, 0xA9, 0x00}"
        );
    }

    #[test]
    fn garbage_does_not_decode() {
        assert_eq!(CharIndex::from_bytes([0xFF, 0x00, 0x00]).decode(), None);
        assert_eq!(CharIndex::from_bytes([0x41, 0x42, 0x00]).decode(), None);
    }
}
