//! Quotecard renders a "quote card": user text, an author name and an
//! avatar image in, one flattened JPEG byte buffer out.
//!
//! The pipeline is synchronous and stateless per call:
//!
//! - Build a [`QuoteRequest`] and a [`QuoteEngine`] (the engine registers
//!   the font once and owns the shaping contexts)
//! - [`QuoteEngine::render`] validates, processes the avatar, lays out the
//!   card, composites the layers and encodes the JPEG
//!
//! Layout policy (canvas size, bands, colors, fonts) lives in [`Theme`];
//! the default skin tints the background from the avatar's average color,
//! [`Theme::classic`] is the template-image skin.
#![forbid(unsafe_code)]

pub mod avatar;
mod color;
pub mod composite;
pub mod encode;
pub mod error;
pub mod font;
pub mod layer;
pub mod layout;
pub mod markup;
pub mod pipeline;
pub mod request;
pub mod text;
pub mod theme;

pub use avatar::ProcessedAvatar;
pub use error::{QuoteError, QuoteResult};
pub use font::FontSpec;
pub use layer::{BlendMode, CanvasSpec, LayerRgba, LayoutPlan, PlacedLayer};
pub use markup::StyledMarkup;
pub use pipeline::{EngineOpts, QuoteEngine};
pub use request::{MAX_TEXT_CHARS, QuoteRequest};
pub use text::{ParleyTextRenderer, TextRenderOpts, TextRenderer};
pub use theme::{Background, BodySizes, Theme};
