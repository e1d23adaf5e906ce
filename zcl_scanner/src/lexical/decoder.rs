//! Byte to rune decoding with single-byte resynchronisation
//!
//! Each step yields either a valid code point with its encoded length or a
//! malformed unit covering exactly one byte, so N undecodable bytes always
//! produce N malformed units and decoding resumes at the very next byte.

/// Result of decoding at one offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A valid code point and its UTF-8 length (1 to 4)
    Char(char, usize),
    /// A byte that does not begin a valid UTF-8 sequence
    Malformed(u8),
}

impl Decoded {
    /// Number of bytes this unit consumes
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        match self {
            Decoded::Char(_, len) => *len,
            Decoded::Malformed(_) => 1,
        }
    }
}

/// Decode the unit starting at `offset`, or `None` at end of input
pub fn decode_at(src: &[u8], offset: usize) -> Option<Decoded> {
    let rest = src.get(offset..)?;
    let &first = rest.first()?;

    if first.is_ascii() {
        return Some(Decoded::Char(first as char, 1));
    }

    let window = &rest[..rest.len().min(4)];
    let valid = match std::str::from_utf8(window) {
        Ok(text) => text,
        Err(err) => match std::str::from_utf8(&window[..err.valid_up_to()]) {
            Ok(text) => text,
            Err(_) => return Some(Decoded::Malformed(first)),
        },
    };

    match valid.chars().next() {
        Some(c) => Some(Decoded::Char(c, c.len_utf8())),
        None => Some(Decoded::Malformed(first)),
    }
}

/// Iterator over decoded units with their byte offsets
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    src: &'a [u8],
    offset: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self { src, offset: 0 }
    }
}

impl Iterator for Decoder<'_> {
    type Item = (usize, Decoded);

    fn next(&mut self) -> Option<Self::Item> {
        let decoded = decode_at(self.src, self.offset)?;
        let at = self.offset;
        self.offset += decoded.len();
        Some((at, decoded))
    }
}
