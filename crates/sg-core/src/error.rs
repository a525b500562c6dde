use thiserror::Error;

/// Errors originating from the core crates.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// An animation container holds no frames.
    #[error("Animation sans frame")]
    NoFrames,

    /// Frame, delay, and disposal lists of an animation container disagree.
    #[error("Animation incohérente : {frames} frames, {delays} délais, {disposals} dispositions")]
    MismatchedAnimation {
        /// Number of frame bitmaps.
        frames: usize,
        /// Number of per-frame delays.
        delays: usize,
        /// Number of per-frame disposal methods.
        disposals: usize,
    },

    /// The decoder produced a pixel representation the color model cannot read.
    #[error("Format de pixel non supporté : {format}")]
    UnsupportedPixelFormat {
        /// Name of the offending format.
        format: String,
    },

    /// Frame index past the end of an animation.
    #[error("Frame {index} hors limites (l'animation en a {len})")]
    FrameOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of frames available.
        len: usize,
    },

    /// Invalid width/height dimensions.
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Pixel buffer length does not match the declared geometry.
    #[error("Buffer de pixels de {actual} octets, {expected} attendus")]
    BufferSize {
        /// Bytes required by width × height × bytes per pixel.
        expected: usize,
        /// Bytes actually supplied.
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_readable() {
        assert_eq!(
            CoreError::Config("clé inconnue".into()).to_string(),
            "Configuration invalide : clé inconnue"
        );
        assert_eq!(
            CoreError::InvalidDimensions {
                width: 65535,
                height: 65535
            }
            .to_string(),
            "Dimensions invalides : 65535×65535"
        );
        assert_eq!(
            CoreError::FrameOutOfRange { index: 3, len: 2 }.to_string(),
            "Frame 3 hors limites (l'animation en a 2)"
        );
    }
}
