//! Unicode character classes used for identifiers and column counting

use unicode_ident::{is_xid_continue, is_xid_start};
use unicode_segmentation::UnicodeSegmentation;

/// `_` or any XID_Start code point
pub fn is_ident_start(c: char) -> bool {
    c == '_' || is_xid_start(c)
}

/// XID_Continue covers letters, digits, `_` and combining marks
pub fn is_ident_continue(c: char) -> bool {
    is_xid_continue(c)
}

/// Grapheme Extend and SpacingMark members that are not general category Mark
fn is_non_mark_extender(c: char) -> bool {
    matches!(c,
        '\u{0E33}' | '\u{0EB3}'       // Thai and Lao SARA AM
        | '\u{200C}' | '\u{200D}'     // ZWNJ, ZWJ
        | '\u{FF9E}' | '\u{FF9F}'     // halfwidth sound marks
        | '\u{1F3FB}'..='\u{1F3FF}'   // emoji skin tone modifiers
        | '\u{E0020}'..='\u{E007F}'   // tag characters
    )
}

/// Whether `c` is a combining mark (general category Mark)
///
/// Marks are read off the grapheme tables: a mark stays in the cluster
/// started by a plain letter. The few spacing marks that break clusters
/// count as ordinary code points.
pub fn is_combining_mark(c: char) -> bool {
    if c.is_ascii() || is_non_mark_extender(c) {
        return false;
    }

    let mut buf = [0u8; 5];
    buf[0] = b'a';
    let len = 1 + c.encode_utf8(&mut buf[1..]).len();
    match std::str::from_utf8(&buf[..len]) {
        Ok(pair) => pair.graphemes(true).nth(1).is_none(),
        Err(_) => false,
    }
}

/// True when `next` renders in the same column as `prev`. Only combining
/// marks are zero-width. Joiners and regional indicators take a column.
pub fn extends_cluster(prev: char, next: char) -> bool {
    !prev.is_control() && is_combining_mark(next)
}
