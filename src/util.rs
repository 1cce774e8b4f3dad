//! Small utility helpers used across modules.

/// True if unicode char belongs to CJK ranges.
/// This is the "secondary script" test used by the segment renderer.
pub fn is_cjk(ch: char) -> bool {
  (ch >= '\u{4E00}' && ch <= '\u{9FFF}')
    || (ch >= '\u{3400}' && ch <= '\u{4DBF}')
    || (ch >= '\u{20000}' && ch <= '\u{2A6DF}')
    || (ch >= '\u{2A700}' && ch <= '\u{2B73F}')
    || (ch >= '\u{2B740}' && ch <= '\u{2B81F}')
    || (ch >= '\u{2B820}' && ch <= '\u{2CEAF}')
    || (ch >= '\u{F900}' && ch <= '\u{FAFF}')
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max { return s.to_string(); }
  let mut cut = max;
  while cut > 0 && !s.is_char_boundary(cut) { cut -= 1; }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}
