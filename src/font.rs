use crate::error::{QuoteError, QuoteResult};
use crate::theme::Theme;

/// Resolved font request: family plus weight/style flags and pixel size.
///
/// Serializes to the classic Pango-style descriptor (`"Play bold italic 85"`)
/// used as the `font` attribute of the markup dialect.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
    pub size_px: f32,
}

impl FontSpec {
    /// Parse a descriptor string: `family [bold] [italic] size`.
    pub fn parse(s: &str) -> QuoteResult<Self> {
        let mut tokens: Vec<&str> = s.split_whitespace().collect();
        let size_tok = tokens
            .pop()
            .ok_or_else(|| QuoteError::render("empty font descriptor"))?;
        let size_px: f32 = size_tok
            .parse()
            .map_err(|_| QuoteError::render(format!("font descriptor \"{s}\" has no size")))?;
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(QuoteError::render(format!(
                "font size must be finite and > 0, got {size_tok}"
            )));
        }

        let mut bold = false;
        let mut italic = false;
        let mut family = Vec::new();
        for tok in tokens {
            match tok.to_ascii_lowercase().as_str() {
                "bold" => bold = true,
                "italic" => italic = true,
                _ => family.push(tok),
            }
        }
        if family.is_empty() {
            return Err(QuoteError::render(format!(
                "font descriptor \"{s}\" has no family"
            )));
        }

        Ok(Self {
            family: family.join(" "),
            bold,
            italic,
            size_px,
        })
    }
}

impl std::fmt::Display for FontSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.family)?;
        if self.bold {
            write!(f, " bold")?;
        }
        if self.italic {
            write!(f, " italic")?;
        }
        if self.size_px.fract() == 0.0 {
            write!(f, " {}", self.size_px as u32)
        } else {
            write!(f, " {}", self.size_px)
        }
    }
}

/// Pick the body font tier from the text length.
///
/// Pure in the text: `< 500` chars renders large, `< 2000` medium, anything
/// longer small. The concrete sizes come from the theme.
pub fn pick_body_font(text: &str, theme: &Theme) -> FontSpec {
    let chars = text.chars().count();
    tracing::debug!(chars, "picking body font tier");
    let size_px = if chars < 500 {
        theme.body_sizes.large
    } else if chars < 2000 {
        theme.body_sizes.medium
    } else {
        theme.body_sizes.small
    };
    FontSpec {
        family: theme.font_family.clone(),
        bold: true,
        italic: true,
        size_px,
    }
}

/// Fixed-size font for the byline and heading.
pub fn byline_font(theme: &Theme) -> FontSpec {
    FontSpec {
        family: theme.font_family.clone(),
        bold: true,
        italic: true,
        size_px: theme.byline_size_px,
    }
}
