use std::borrow::Cow;

use crate::color::parse_hex;
use crate::error::{QuoteError, QuoteResult};
use crate::font::FontSpec;
use crate::layer::LayerRgba;
use crate::markup::StyledMarkup;

/// Rasterization bounds for one markup string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextRenderOpts {
    /// Line-breaking width in pixels.
    pub max_width: u32,
    /// Optional hard height cap; whole lines past the cap are dropped.
    pub max_height: Option<u32>,
}

/// The "render this markup into a pixel buffer with alpha" boundary.
///
/// The layout engine only talks to text rendering through this trait so the
/// shaping stack stays swappable and tests can observe render calls.
/// Implementations are `Send` (one renderer per thread) but need not be
/// `Sync`; shaping contexts are reused across calls, never shared.
pub trait TextRenderer: Send {
    fn render(&mut self, markup: &StyledMarkup, opts: &TextRenderOpts) -> QuoteResult<LayerRgba>;
}

/// RGBA8 brush color carried through Parley styles.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct BrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Markup renderer backed by Parley shaping and `vello_cpu` rasterization.
///
/// Carries exactly one registered font family; the markup's `font` attribute
/// selects weight, style and size against it. Construction registers the
/// font bytes once and fails fast if no family registers, so a misconfigured
/// process cannot limp along and fail mid-request.
pub struct ParleyTextRenderer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<BrushRgba8>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

/// `vello_cpu` surfaces are u16-indexed; uncapped measuring renders clamp
/// here and rely on the caller's height policy to re-render within bounds.
const RASTER_CEILING: f32 = 16384.0;

impl ParleyTextRenderer {
    pub fn new(font_bytes: Vec<u8>) -> QuoteResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| QuoteError::render("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| QuoteError::render("registered font family has no name"))?
            .to_string();

        let font =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
        })
    }
}

impl TextRenderer for ParleyTextRenderer {
    fn render(&mut self, markup: &StyledMarkup, opts: &TextRenderOpts) -> QuoteResult<LayerRgba> {
        let parsed = parse_markup(markup.as_str())?;
        let spec = parsed
            .font
            .ok_or_else(|| QuoteError::render("markup is missing a font attribute"))?;

        let brush = BrushRgba8 {
            r: parsed.color[0],
            g: parsed.color[1],
            b: parsed.color[2],
            a: parsed.color[3],
        };

        let max_width = opts.max_width.max(1) as f32;
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, &parsed.text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(spec.size_px));
        if spec.bold {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }
        if spec.italic {
            builder.push_default(parley::style::StyleProperty::FontStyle(
                parley::style::FontStyle::Italic,
            ));
        }
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<BrushRgba8> = builder.build(&parsed.text);
        layout.break_all_lines(Some(max_width));
        layout.align(
            Some(max_width),
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );

        // Whole-line truncation under the cap: the first line is always
        // kept so a cap smaller than one line still yields output.
        let cap = opts
            .max_height
            .map(|h| h as f32)
            .unwrap_or(RASTER_CEILING)
            .min(RASTER_CEILING);
        let mut lines_kept = 0usize;
        let mut height = 0f32;
        for line in layout.lines() {
            let m = line.metrics();
            let bottom = m.baseline + m.descent;
            if bottom > cap && lines_kept > 0 {
                break;
            }
            height = height.max(bottom);
            lines_kept += 1;
        }

        let width = layout.width().min(max_width);
        let w_px = (width.ceil() as u32).max(1);
        let h_px = (height.ceil() as u32).max(1);

        let mut ctx = vello_cpu::RenderContext::new(w_px as u16, h_px as u16);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        for line in layout.lines().take(lines_kept) {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);

                if parsed.underline {
                    let rm = run.run().metrics();
                    let x0 = f64::from(run.offset());
                    let x1 = f64::from(run.offset() + run.advance());
                    let y0 = f64::from(run.baseline() - rm.underline_offset);
                    let y1 = y0 + f64::from(rm.underline_size.max(1.0));
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(x0, y0, x1, y1));
                }
            }
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w_px as u16, h_px as u16);
        ctx.render_to_pixmap(&mut pixmap);

        LayerRgba::from_premul(w_px, h_px, pixmap.data_as_u8_slice().to_vec())
    }
}

/// One parsed span of the restricted dialect.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ParsedMarkup {
    pub(crate) text: String,
    pub(crate) color: [u8; 4],
    pub(crate) font: Option<FontSpec>,
    pub(crate) underline: bool,
}

/// Parse a single-span markup string: attributes out of the opening tag,
/// entities decoded out of the content.
pub(crate) fn parse_markup(markup: &str) -> QuoteResult<ParsedMarkup> {
    let s = markup.trim();
    let rest = s
        .strip_prefix("<span")
        .ok_or_else(|| QuoteError::render("markup must start with a span tag"))?;
    let close = rest
        .find('>')
        .ok_or_else(|| QuoteError::render("unterminated span tag"))?;
    let attrs = &rest[..close];
    let body = rest[close + 1..]
        .strip_suffix("</span>")
        .ok_or_else(|| QuoteError::render("markup must end with a span close tag"))?;

    let mut color = [255, 255, 255, 255];
    let mut font = None;
    let mut underline = false;
    for (name, value) in parse_attrs(attrs)? {
        match name.as_str() {
            "color" => color = parse_hex(&value)?,
            "font" => font = Some(FontSpec::parse(&value)?),
            "underline" => {
                underline = match value.as_str() {
                    "single" | "true" => true,
                    "none" | "false" => false,
                    other => {
                        return Err(QuoteError::render(format!(
                            "unsupported underline value \"{other}\""
                        )));
                    }
                }
            }
            other => {
                return Err(QuoteError::render(format!(
                    "unsupported span attribute \"{other}\""
                )));
            }
        }
    }

    Ok(ParsedMarkup {
        text: unescape(body)?,
        color,
        font,
        underline,
    })
}

fn parse_attrs(s: &str) -> QuoteResult<Vec<(String, String)>> {
    let mut out = Vec::new();
    let mut rest = s.trim_start();
    while !rest.is_empty() {
        let eq = rest
            .find('=')
            .ok_or_else(|| QuoteError::render("span attribute without a value"))?;
        let name = rest[..eq].trim().to_string();
        let after = rest[eq + 1..]
            .strip_prefix('"')
            .ok_or_else(|| QuoteError::render("span attribute value must be quoted"))?;
        let end = after
            .find('"')
            .ok_or_else(|| QuoteError::render("unterminated span attribute value"))?;
        out.push((name, after[..end].to_string()));
        rest = after[end + 1..].trim_start();
    }
    Ok(out)
}

/// Decode the five entities produced by the escaper; anything else under an
/// ampersand is outside the dialect and rejected.
fn unescape(s: &str) -> QuoteResult<String> {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let (entity, decoded) = if tail.starts_with("&amp;") {
            ("&amp;", '&')
        } else if tail.starts_with("&quot;") {
            ("&quot;", '"')
        } else if tail.starts_with("&apos;") {
            ("&apos;", '\'')
        } else if tail.starts_with("&lt;") {
            ("&lt;", '<')
        } else if tail.starts_with("&gt;") {
            ("&gt;", '>')
        } else {
            return Err(QuoteError::render("unknown entity in markup content"));
        };
        out.push(decoded);
        rest = &tail[entity.len()..];
    }
    out.push_str(rest);
    Ok(out)
}
