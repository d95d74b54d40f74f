use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use quotecard::{EngineOpts, QuoteEngine, QuoteRequest, Theme};

#[derive(Parser, Debug)]
#[command(name = "quotecard", version)]
struct Cli {
    /// Quote body text.
    #[arg(long)]
    text: String,

    /// Author name for the attribution line.
    #[arg(long)]
    author: String,

    /// Path to the avatar image (any decodable format).
    #[arg(long)]
    avatar: PathBuf,

    /// Path to the font file used for all card text.
    #[arg(long)]
    font: PathBuf,

    /// Output JPEG path.
    #[arg(long)]
    out: PathBuf,

    /// Built-in skin to use.
    #[arg(long, value_enum, default_value_t = ThemeChoice::Tinted)]
    theme: ThemeChoice,

    /// Theme JSON overriding the built-in skins.
    #[arg(long)]
    theme_json: Option<PathBuf>,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = 90)]
    quality: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ThemeChoice {
    Tinted,
    Classic,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let theme = match &cli.theme_json {
        Some(path) => {
            let s = std::fs::read_to_string(path)
                .with_context(|| format!("read theme '{}'", path.display()))?;
            serde_json::from_str::<Theme>(&s).with_context(|| "parse theme JSON")?
        }
        None => match cli.theme {
            ThemeChoice::Tinted => Theme::default(),
            ThemeChoice::Classic => Theme::classic(),
        },
    };

    let font_bytes = std::fs::read(&cli.font)
        .with_context(|| format!("read font '{}'", cli.font.display()))?;
    let avatar_bytes = std::fs::read(&cli.avatar)
        .with_context(|| format!("read avatar '{}'", cli.avatar.display()))?;

    let mut engine = QuoteEngine::new(EngineOpts {
        theme,
        font_bytes,
        jpeg_quality: cli.quality,
    })?;

    let jpeg = engine.render(&QuoteRequest {
        text: cli.text,
        author_name: cli.author,
        avatar_bytes,
    })?;

    if let Some(parent) = cli.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&cli.out, &jpeg)
        .with_context(|| format!("write jpeg '{}'", cli.out.display()))?;

    eprintln!("wrote {}", cli.out.display());
    Ok(())
}
