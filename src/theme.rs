use std::path::PathBuf;

use crate::error::{QuoteError, QuoteResult};
use crate::layer::BlendMode;

/// Where the card background color comes from.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Background {
    /// Flat color derived from the avatar's per-channel average, damped
    /// toward black so the card stays darker than its subject.
    AvatarTint { damping: f64 },
    /// Fixed palette color, `#RRGGBB` hex.
    Palette { color: String },
}

/// Body font size per text-length tier. The tier boundaries are fixed
/// contract; the sizes are skin policy.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct BodySizes {
    pub large: f32,
    pub medium: f32,
    pub small: f32,
}

/// All layout and style policy for one card skin, as plain data.
///
/// Every pixel constant of the pipeline lives here; the layout engine only
/// does arithmetic on these values. Themes serialize to JSON so alternate
/// skins can ship as files.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Theme {
    /// Fixed canvas width.
    pub canvas_width: u32,
    /// Canvas never shrinks below this height.
    pub min_height: u32,
    /// Reserved band above the body text.
    pub top_band: u32,
    /// Reserved band below the body text (avatar + byline live here).
    pub bottom_band: u32,
    pub left_margin: u32,
    pub right_margin: u32,
    /// Downstream photo hosts cap `width + height` of an upload; the layout
    /// engine keeps the final canvas under this sum.
    pub max_dim_sum: u32,
    /// Small fixed correction for perceived horizontal centering.
    pub centering_nudge: i32,
    pub background: Background,
    /// Optional heading text centered near the top of the card.
    pub heading: Option<String>,
    /// Vertical offset of the heading from the canvas top.
    pub heading_offset: u32,
    /// Optional template image pinned at the top edge; width must equal
    /// `canvas_width`.
    pub header_image: Option<PathBuf>,
    /// Optional template image pinned at the top of the bottom band.
    pub footer_image: Option<PathBuf>,
    /// Avatar is resized to this width.
    pub avatar_size: u32,
    /// Left inset of the avatar inside the bottom band.
    pub avatar_inset: u32,
    pub avatar_blend: BlendMode,
    /// Horizontal gap between the avatar's right edge and the byline.
    pub byline_gap: u32,
    pub byline_size_px: f32,
    pub body_color: String,
    pub byline_color: String,
    pub font_family: String,
    pub body_sizes: BodySizes,
}

impl Default for Theme {
    /// The tinted skin: background from the avatar average, circular avatar
    /// composited atop the opaque card, no template images.
    fn default() -> Self {
        Self {
            canvas_width: 1602,
            min_height: 939,
            top_band: 230,
            bottom_band: 230,
            left_margin: 280,
            right_margin: 280,
            max_dim_sum: 14000,
            centering_nudge: 0,
            background: Background::AvatarTint { damping: 0.5 },
            heading: None,
            heading_offset: 60,
            header_image: None,
            footer_image: None,
            avatar_size: 200,
            avatar_inset: 21,
            avatar_blend: BlendMode::Atop,
            byline_gap: 169,
            byline_size_px: 72.0,
            body_color: "#ded7d7".to_string(),
            byline_color: "#ded7d7".to_string(),
            font_family: "Play".to_string(),
            body_sizes: BodySizes {
                large: 85.0,
                medium: 65.0,
                small: 45.0,
            },
        }
    }
}

impl Theme {
    /// The template skin: fixed near-black palette, header/footer images,
    /// avatar drawn with plain source-over.
    pub fn classic() -> Self {
        Self {
            background: Background::Palette {
                color: "#0e0b0b".to_string(),
            },
            header_image: Some(PathBuf::from("templates/header.png")),
            footer_image: Some(PathBuf::from("templates/footer.png")),
            avatar_blend: BlendMode::Over,
            ..Self::default()
        }
    }

    /// Damping factor applied to the avatar average when deriving the tint.
    pub fn tint_damping(&self) -> f64 {
        match self.background {
            Background::AvatarTint { damping } => damping,
            Background::Palette { .. } => 0.5,
        }
    }

    pub fn validate(&self) -> QuoteResult<()> {
        if self.canvas_width == 0 || self.min_height == 0 {
            return Err(QuoteError::invalid_input(
                "theme canvas dimensions must be > 0",
            ));
        }
        if self.left_margin + self.right_margin >= self.canvas_width {
            return Err(QuoteError::invalid_input(
                "theme margins leave no room for body text",
            ));
        }
        if self.max_dim_sum <= self.canvas_width + self.top_band + self.bottom_band {
            return Err(QuoteError::invalid_input(
                "theme max_dim_sum leaves no room for body text",
            ));
        }
        if self.avatar_size == 0 {
            return Err(QuoteError::invalid_input("theme avatar_size must be > 0"));
        }
        if self.avatar_inset + self.avatar_size + self.byline_gap >= self.canvas_width {
            return Err(QuoteError::invalid_input(
                "theme bottom band leaves no room for the byline",
            ));
        }
        if let Background::AvatarTint { damping } = self.background
            && !(0.0..=1.0).contains(&damping)
        {
            return Err(QuoteError::invalid_input(
                "theme tint damping must be within 0..=1",
            ));
        }
        if !self.byline_size_px.is_finite() || self.byline_size_px <= 0.0 {
            return Err(QuoteError::invalid_input(
                "theme byline_size_px must be finite and > 0",
            ));
        }
        Ok(())
    }
}
