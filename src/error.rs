use thiserror::Error;

/// Why a single rendering strategy declined to produce an artifact. These
/// are recoverable by construction: the selector treats every variant as a
/// signal to advance the fallback chain.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no glyph resource available")]
    MissingFont,

    #[error("font '{font}' lacks glyphs for token {token:?}")]
    GlyphCoverage { font: String, token: String },

    #[error("no tokens left to draw after filtering")]
    EmptySelection,

    #[error("could not place any token on the canvas")]
    LayoutOverflow,

    #[error(transparent)]
    Font(#[from] FontError),
}

/// Failures while acquiring or validating a glyph resource. Never fatal:
/// callers log these and continue fontless.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("reading font file: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a parsable TTF/OTF face: {0}")]
    Parse(ttf_parser::FaceParsingError),

    #[error("fetching remote font: {0}")]
    Fetch(String),
}
