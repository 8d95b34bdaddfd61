// Copyright 2018-2024 the Deno authors. MIT license.

pub const BOM_CHAR: char = '\u{FEFF}';

/// Strips the byte order mark if it exists from the provided text.
pub fn strip_bom(text: &str) -> &str {
  if text.starts_with(BOM_CHAR) {
    &text[BOM_CHAR.len_utf8()..]
  } else {
    text
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn strips_leading_bom_only() {
    assert_eq!(
      strip_bom("\u{FEFF}import a from './a';"),
      "import a from './a';"
    );
    assert_eq!(strip_bom("const a = '\u{FEFF}';"), "const a = '\u{FEFF}';");
    assert_eq!(strip_bom(""), "");
  }
}
