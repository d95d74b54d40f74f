use crate::font::{self, FontSpec};
use crate::theme::Theme;

/// A string in the restricted rich-text dialect consumed by the text
/// renderer: one `<span>` carrying `color`/`font`/`underline` attributes
/// around entity-escaped content.
///
/// Immutable once built; build it with [`body`], [`byline`] or [`heading`]
/// so the raw text is escaped exactly once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyledMarkup(String);

impl StyledMarkup {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StyledMarkup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Replace the five reserved characters with their entities.
///
/// Single pass; no replacement target reintroduces a reserved character, so
/// the result is order-independent. Must be applied exactly once per string:
/// a second pass would corrupt the entities it produced.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Wrap already-escaped text in a span tag carrying `attrs` in order.
///
/// Attribute assignments are separated by single spaces with no trailing
/// space before `>`.
pub fn wrap(text: &str, attrs: &[(&str, &str)]) -> String {
    let mut out = String::from("<span");
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
    }
    out.push('>');
    out.push_str(text);
    out.push_str("</span>");
    out
}

/// Wrap text in guillemets. Applied to quoted body text only; attribution
/// lines are never quoted.
pub fn quote(text: &str) -> String {
    format!("\u{ab}{text}\u{bb}")
}

/// Markup for the quoted body text: escape, quote, then style.
pub fn body(text: &str, theme: &Theme, font: &FontSpec) -> StyledMarkup {
    let font = font.to_string();
    StyledMarkup(wrap(
        &quote(&escape(text)),
        &[("color", theme.body_color.as_str()), ("font", font.as_str())],
    ))
}

/// Markup for the attribution line: the copyright glyph plus the escaped
/// author name, never quoted.
pub fn byline(name: &str, theme: &Theme) -> StyledMarkup {
    let font = font::byline_font(theme).to_string();
    let text = format!("\u{a9} {}", escape(name));
    StyledMarkup(wrap(
        &text,
        &[
            ("color", theme.byline_color.as_str()),
            ("font", font.as_str()),
        ],
    ))
}

/// Markup for the optional heading, centered near the top by the layout
/// engine.
pub fn heading(text: &str, theme: &Theme) -> StyledMarkup {
    let font = font::byline_font(theme).to_string();
    StyledMarkup(wrap(
        &escape(text),
        &[("color", theme.body_color.as_str()), ("font", font.as_str())],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_all_reserved_characters() {
        assert_eq!(
            escape(r#"a&b"c'd<e>f"#),
            "a&amp;b&quot;c&apos;d&lt;e&gt;f"
        );
    }

    #[test]
    fn escape_leaves_plain_text_untouched() {
        assert_eq!(escape("Hello, мир 🎉"), "Hello, мир 🎉");
    }

    #[test]
    fn double_escape_is_a_distinct_and_wrong_output() {
        let once = escape("fish & chips");
        let twice = escape(&once);
        assert_eq!(once, "fish &amp; chips");
        assert_ne!(once, twice);
        assert_eq!(twice, "fish &amp;amp; chips");
    }

    #[test]
    fn wrap_joins_attributes_with_single_spaces() {
        assert_eq!(
            wrap("x", &[("color", "#fff"), ("font", "Play bold 10")]),
            r##"<span color="#fff" font="Play bold 10">x</span>"##
        );
        assert_eq!(wrap("x", &[]), "<span>x</span>");
    }

    #[test]
    fn quote_uses_guillemets() {
        assert_eq!(quote("be water"), "«be water»");
    }

    #[test]
    fn body_is_escaped_quoted_and_styled() {
        let theme = Theme::default();
        let font = crate::font::pick_body_font("hi", &theme);
        let m = body("a<b", &theme, &font);
        assert_eq!(
            m.as_str(),
            r##"<span color="#ded7d7" font="Play bold italic 85">«a&lt;b»</span>"##
        );
    }

    #[test]
    fn byline_is_never_quoted_and_carries_the_glyph() {
        let theme = Theme::default();
        let m = byline("Jane & Co", &theme);
        assert!(m.as_str().contains("© Jane &amp; Co"));
        assert!(!m.as_str().contains('«'));
        assert!(m.as_str().contains("font=\"Play bold italic 72\""));
    }
}
