/// Everything that can go wrong inside the core. None of it is fatal: each
/// variant ends up as a single log line and the core keeps running.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid character: {0:?}")]
    InvalidGlyph(char),

    #[error("Invalid characters skipped: {0:?}")]
    InvalidGlyphs(Vec<char>),

    #[error("Null environment callback")]
    MissingEnvironment,

    #[error("Failed to set content-less support")]
    ContentlessRejected,

    #[error("Failed to get log interface")]
    LogInterfaceUnavailable,

    #[error("Failed to set pixel format: RGB565")]
    PixelFormatRejected,

    #[error("Core not initialized in retro_run")]
    NotInitialized,

    #[error("No video callback set")]
    NoVideoSink,
}
