use std::io::Cursor;

use quotecard::{
    LayerRgba, QuoteEngine, QuoteError, QuoteRequest, StyledMarkup, TextRenderOpts, TextRenderer,
    Theme,
};

/// Deterministic text renderer: a solid block sized to the request, so the
/// end-to-end geometry is exercised without any font file on disk.
struct BlockText {
    width: u32,
    height: u32,
}

impl TextRenderer for BlockText {
    fn render(
        &mut self,
        _markup: &StyledMarkup,
        opts: &TextRenderOpts,
    ) -> quotecard::QuoteResult<LayerRgba> {
        let w = self.width.min(opts.max_width);
        let h = match opts.max_height {
            Some(cap) => self.height.min(cap),
            None => self.height,
        };
        Ok(LayerRgba::solid(w.max(1), h.max(1), [230, 230, 230, 255]))
    }
}

fn engine() -> QuoteEngine {
    QuoteEngine::with_renderer(
        Theme::default(),
        Box::new(BlockText {
            width: 400,
            height: 100,
        }),
        90,
    )
    .unwrap()
}

fn png_avatar(size: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(size, size, image::Rgb(rgb));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn close(actual: [u8; 3], expected: [u8; 3], tol: u8) -> bool {
    actual
        .iter()
        .zip(expected)
        .all(|(a, e)| a.abs_diff(e) <= tol)
}

#[test]
fn renders_a_valid_card_at_the_minimum_height() {
    let mut engine = engine();
    let jpeg = engine
        .render(&QuoteRequest {
            text: "Hello".to_string(),
            author_name: "Jane".to_string(),
            avatar_bytes: png_avatar(300, [100, 100, 100]),
        })
        .unwrap();

    assert_eq!(&jpeg[..3], &[0xFF, 0xD8, 0xFF]);

    let card = image::load_from_memory(&jpeg).unwrap().to_rgb8();
    assert_eq!(card.width(), 1602);
    assert_eq!(card.height(), 939);
}

#[test]
fn avatar_composites_as_a_circle_over_the_tint() {
    let mut engine = engine();
    let theme = engine.theme().clone();
    let jpeg = engine
        .render(&QuoteRequest {
            text: "Hello".to_string(),
            author_name: "Jane".to_string(),
            avatar_bytes: png_avatar(300, [100, 100, 100]),
        })
        .unwrap();
    let card = image::load_from_memory(&jpeg).unwrap().to_rgb8();

    // Default damping halves the solid-gray average.
    let tint = [50, 50, 50];
    let avatar_color = [100, 100, 100];

    let ax = theme.avatar_inset;
    let ay = (card.height() - theme.bottom_band)
        + (theme.bottom_band - theme.avatar_size) / 2;

    // Far from the avatar the card is pure tint.
    assert!(close(card.get_pixel(card.width() - 10, 10).0, tint, 10));
    // Bounding-box corners of the avatar stay background-colored (the mask
    // is transparent there); the disk center carries the avatar color.
    assert!(close(card.get_pixel(ax + 2, ay + 2).0, tint, 10));
    assert!(close(
        card.get_pixel(ax + theme.avatar_size - 3, ay + 2).0,
        tint,
        10
    ));
    assert!(close(
        card.get_pixel(ax + theme.avatar_size / 2, ay + theme.avatar_size / 2)
            .0,
        avatar_color,
        10
    ));
}

#[test]
fn oversized_text_is_rejected_before_rendering() {
    let mut engine = engine();
    let err = engine
        .render(&QuoteRequest {
            text: "a".repeat(25_000),
            author_name: "Jane".to_string(),
            avatar_bytes: png_avatar(300, [100, 100, 100]),
        })
        .unwrap_err();
    assert!(matches!(err, QuoteError::InvalidInput(_)));
}

#[test]
fn malformed_avatar_is_a_decode_error() {
    let mut engine = engine();
    let mut truncated = png_avatar(300, [100, 100, 100]);
    truncated.truncate(24);

    let err = engine
        .render(&QuoteRequest {
            text: "Hello".to_string(),
            author_name: "Jane".to_string(),
            avatar_bytes: truncated,
        })
        .unwrap_err();
    assert!(matches!(err, QuoteError::Decode(_)));
}

#[test]
fn overflowing_text_never_breaks_the_upload_ceiling() {
    let theme = Theme::default();
    let mut engine = QuoteEngine::with_renderer(
        theme.clone(),
        Box::new(BlockText {
            width: 900,
            height: 13_000,
        }),
        90,
    )
    .unwrap();

    let jpeg = engine
        .render(&QuoteRequest {
            text: "x".repeat(19_000),
            author_name: "Jane".to_string(),
            avatar_bytes: png_avatar(200, [100, 100, 100]),
        })
        .unwrap();
    let card = image::load_from_memory(&jpeg).unwrap();
    assert!(card.width() + card.height() <= theme.max_dim_sum);
    assert_eq!(card.width(), theme.canvas_width);
}
