use crate::error::QuoteResult;
use crate::request::QuoteRequest;
use crate::text::{ParleyTextRenderer, TextRenderer};
use crate::theme::Theme;
use crate::{avatar, composite, encode, font, layout, markup};

/// Engine construction options.
#[derive(Clone, Debug)]
pub struct EngineOpts {
    pub theme: Theme,
    /// Raw bytes of the font file used for all card text.
    pub font_bytes: Vec<u8>,
    pub jpeg_quality: u8,
}

impl EngineOpts {
    pub fn new(font_bytes: Vec<u8>) -> Self {
        Self {
            theme: Theme::default(),
            font_bytes,
            jpeg_quality: 90,
        }
    }
}

/// The card renderer.
///
/// Owns the theme and the shaping contexts; construction is the one-time
/// imaging-engine initialization (font registration fails fast here, never
/// mid-request) and drop is the teardown. Each `render` call is otherwise
/// stateless, so one engine per thread composes safely with any number of
/// concurrent callers.
pub struct QuoteEngine {
    theme: Theme,
    jpeg_quality: u8,
    text: Box<dyn TextRenderer>,
}

impl QuoteEngine {
    pub fn new(opts: EngineOpts) -> QuoteResult<Self> {
        opts.theme.validate()?;
        let renderer = ParleyTextRenderer::new(opts.font_bytes)?;
        Ok(Self {
            theme: opts.theme,
            jpeg_quality: opts.jpeg_quality,
            text: Box::new(renderer),
        })
    }

    /// Build an engine around any text renderer.
    pub fn with_renderer(
        theme: Theme,
        renderer: Box<dyn TextRenderer>,
        jpeg_quality: u8,
    ) -> QuoteResult<Self> {
        theme.validate()?;
        Ok(Self {
            theme,
            jpeg_quality,
            text: renderer,
        })
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Run the whole pipeline for one request and return the JPEG bytes.
    ///
    /// validate → avatar → markup/font → layout → composite → encode, all
    /// synchronous, each external call attempted exactly once.
    #[tracing::instrument(skip(self, request), fields(text_chars = request.text.chars().count()))]
    pub fn render(&mut self, request: &QuoteRequest) -> QuoteResult<Vec<u8>> {
        let started = std::time::Instant::now();

        request.validate()?;

        let avatar = avatar::process(
            &request.avatar_bytes,
            self.theme.avatar_size,
            self.theme.tint_damping(),
        )?;

        let body_font = font::pick_body_font(&request.text, &self.theme);
        let body = markup::body(&request.text, &self.theme, &body_font);
        let byline = markup::byline(&request.author_name, &self.theme);
        let heading = self
            .theme
            .heading
            .clone()
            .map(|h| markup::heading(&h, &self.theme));

        let plan = layout::build_plan(
            &self.theme,
            self.text.as_mut(),
            &body,
            &byline,
            heading.as_ref(),
            avatar,
        )?;
        let canvas = composite::composite(plan)?;
        let jpeg = encode::encode_jpeg(&canvas, self.jpeg_quality)?;

        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = jpeg.len(),
            "rendered quote card"
        );
        Ok(jpeg)
    }
}
