//! Text export of a table's live entries.
//!
//! The rendering is `{ "k1": v1, "k2": v2 }`, or `{}` for an empty table.
//! Inside the quotes, backslash, double quote and single quote are
//! prefixed with a backslash and a newline becomes `\n`. Other characters,
//! control characters included, pass through unchanged.

use core::fmt::{self, Display, Write};

/// Writes `text` to `sink` with the key escaping rules applied.
pub fn escape_into<W: Write + ?Sized>(sink: &mut W, text: &str) -> fmt::Result {
    let mut start = 0;
    for (i, c) in text.char_indices() {
        let escaped = match c {
            '\\' => "\\\\",
            '"' => "\\\"",
            '\'' => "\\'",
            '\n' => "\\n",
            _ => continue,
        };
        sink.write_str(&text[start..i])?;
        sink.write_str(escaped)?;
        start = i + c.len_utf8();
    }
    sink.write_str(&text[start..])
}

/// `fmt::Write` adapter escaping everything written through it, so a key's
/// `Display` output can be streamed without an intermediate `String`.
struct Escaper<'a, W: ?Sized> {
    inner: &'a mut W,
}

impl<W: Write + ?Sized> Write for Escaper<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        escape_into(&mut *self.inner, s)
    }
}

/// Renders `entries` in iteration order, formatting values with `value`.
pub(crate) fn write_entries<'a, K, V, W, I, F>(sink: &mut W, entries: I, mut value: F) -> fmt::Result
where
    K: Display + ?Sized + 'a,
    V: 'a,
    W: Write,
    I: IntoIterator<Item = (&'a K, &'a V)>,
    F: FnMut(&mut W, &V) -> fmt::Result,
{
    let mut first = true;
    sink.write_char('{')?;
    for (k, v) in entries {
        sink.write_str(if first { " \"" } else { ", \"" })?;
        first = false;
        write!(Escaper { inner: &mut *sink }, "{k}")?;
        sink.write_str("\": ")?;
        value(sink, v)?;
    }
    sink.write_str(if first { "}" } else { " }" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn escaped(s: &str) -> String {
        let mut out = String::new();
        escape_into(&mut out, s).unwrap();
        out
    }

    /// Invariant: the four special characters are backslash-prefixed and
    /// newline becomes the two characters `\n`.
    #[test]
    fn escapes_specials() {
        assert_eq!(escaped(r#"a"b\c"#), r#"a\"b\\c"#);
        assert_eq!(escaped("it's"), r"it\'s");
        assert_eq!(escaped("l1\nl2"), r"l1\nl2");
        assert_eq!(escaped("plain"), "plain");
        assert_eq!(escaped(""), "");
        assert_eq!(escaped("\\\\"), r"\\\\");
    }

    #[test]
    fn non_ascii_and_tabs_pass_through() {
        assert_eq!(escaped("añade\t\"ü\""), "añade\t\\\"ü\\\"");
    }

    /// Invariant: a `Display` impl writing in several pieces is escaped as a whole.
    #[test]
    fn escaper_streams_display_output() {
        struct Pieces;
        impl Display for Pieces {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a\"")?;
                f.write_str("\nb")
            }
        }
        let mut out = String::new();
        write!(Escaper { inner: &mut out }, "{}", Pieces).unwrap();
        assert_eq!(out, r#"a\"\nb"#);
    }

    #[test]
    fn renders_braces_and_separators() {
        let mut out = String::new();
        let none: [(&str, &u32); 0] = [];
        write_entries(&mut out, none, |w, v| write!(w, "{v}")).unwrap();
        assert_eq!(out, "{}");

        let mut out = String::new();
        let entries = [("a", &1u32), ("b'", &22u32)];
        write_entries(&mut out, entries.iter().map(|(k, v)| (*k, *v)), |w, v| {
            write!(w, "{v}")
        })
        .unwrap();
        assert_eq!(out, r#"{ "a": 1, "b\'": 22 }"#);
    }
}
