use std::path::Path;

use crate::avatar::ProcessedAvatar;
use crate::color::parse_hex;
use crate::error::{QuoteError, QuoteResult};
use crate::layer::{BlendMode, CanvasSpec, LayerRgba, LayoutPlan};
use crate::markup::StyledMarkup;
use crate::text::{TextRenderOpts, TextRenderer};
use crate::theme::{Background, Theme};

/// Compute the card geometry and assemble the ordered compositing plan.
///
/// Layer order: background, body text, heading, header template, avatar,
/// footer template, byline. All offsets are integer pixels derived here;
/// nothing downstream re-negotiates positions.
pub fn build_plan(
    theme: &Theme,
    text: &mut dyn TextRenderer,
    body: &StyledMarkup,
    byline: &StyledMarkup,
    heading: Option<&StyledMarkup>,
    avatar: ProcessedAvatar,
) -> QuoteResult<LayoutPlan> {
    let w = theme.canvas_width;
    let top = theme.top_band;
    let bottom = theme.bottom_band;
    let body_width = w - theme.left_margin - theme.right_margin;

    let mut body_layer = text.render(
        body,
        &TextRenderOpts {
            max_width: body_width,
            max_height: None,
        },
    )?;

    // Downstream consumers of the final JPEG cap width + height; when the
    // laid-out text would push the canvas past that, re-render once with an
    // explicit cap so the text engine truncates to fit. This is policy, not
    // an error.
    let ceiling = theme.max_dim_sum - w;
    if body_layer.height + top + bottom > ceiling {
        let cap = ceiling - top - bottom;
        tracing::debug!(
            height = body_layer.height,
            cap,
            "body text exceeds the safe canvas height, re-rendering capped"
        );
        body_layer = text.render(
            body,
            &TextRenderOpts {
                max_width: body_width,
                max_height: Some(cap),
            },
        )?;
    }

    let canvas_h = theme.min_height.max(body_layer.height + top + bottom);
    let canvas = CanvasSpec {
        width: w,
        height: canvas_h,
    };

    let bg_rgba = match &theme.background {
        Background::AvatarTint { .. } => avatar.tint,
        Background::Palette { color } => {
            let [r, g, b, _] = parse_hex(color)?;
            [r, g, b, 255]
        }
    };

    let mut plan = LayoutPlan::new(canvas);
    plan.push(LayerRgba::solid(w, canvas_h, bg_rgba), BlendMode::Over, 0, 0);

    // Body text, centered in the band between the reserved edges.
    let body_x =
        (theme.left_margin as i32).max((w as i32 - body_layer.width as i32) / 2)
            + theme.centering_nudge;
    let body_y = top as i32
        + ((canvas_h as i32 - top as i32 - bottom as i32 - body_layer.height as i32) / 2).max(0);
    plan.push(body_layer, BlendMode::Over, body_x, body_y);

    if let Some(heading) = heading {
        let layer = text.render(
            heading,
            &TextRenderOpts {
                max_width: body_width,
                max_height: None,
            },
        )?;
        let x = ((w as i32 - layer.width as i32) / 2).max(0);
        plan.push(layer, BlendMode::Over, x, theme.heading_offset as i32);
    }

    if let Some(path) = &theme.header_image {
        let layer = load_template(path, w)?;
        plan.push(layer, BlendMode::Over, 0, 0);
    }

    // Avatar and byline share the bottom band, each centered on its own
    // rendered height.
    let avatar_x = theme.avatar_inset as i32;
    let avatar_y = (canvas_h - bottom) as i32
        + ((bottom as i32 - avatar.layer.height as i32) / 2).max(0);
    plan.push(avatar.layer, theme.avatar_blend, avatar_x, avatar_y);

    if let Some(path) = &theme.footer_image {
        let layer = load_template(path, w)?;
        plan.push(layer, BlendMode::Over, 0, (canvas_h - bottom) as i32);
    }

    let byline_x = (theme.avatar_inset + theme.avatar_size + theme.byline_gap) as i32;
    let byline_layer = text.render(
        byline,
        &TextRenderOpts {
            max_width: w - byline_x as u32,
            max_height: None,
        },
    )?;
    let byline_y = (canvas_h - bottom) as i32
        + ((bottom as i32 - byline_layer.height as i32) / 2).max(0);
    plan.push(byline_layer, BlendMode::Over, byline_x, byline_y);

    Ok(plan)
}

/// Decode a template image and check it spans the canvas width.
fn load_template(path: &Path, canvas_width: u32) -> QuoteResult<LayerRgba> {
    let bytes = std::fs::read(path).map_err(|e| {
        QuoteError::render(format!("failed to read template '{}': {e}", path.display()))
    })?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| QuoteError::decode(format!("template '{}': {e}", path.display())))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width != canvas_width {
        return Err(QuoteError::render(format!(
            "template '{}' is {width} px wide, canvas is {canvas_width}",
            path.display()
        )));
    }

    let mut data = rgba.into_raw();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
    LayerRgba::from_premul(width, height, data)
}
