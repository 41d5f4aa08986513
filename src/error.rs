//! Error type shared by every fallible entry point.

/// Dimension that failed a shape check in [`StftError::ShapeMismatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeAxis {
    /// Flat signal buffer length versus `batch * samples`.
    SignalBuffer,
    /// Output batch dimension versus the signal batch dimension.
    Batch,
    /// Window length versus the configured `win_length`.
    Window,
    /// Trailing output axis, which must hold exactly `(real, imag)`.
    ComplexChannels,
    /// Flat output buffer length versus the output shape.
    OutputBuffer,
    /// Output frequency-bin axis versus the operator's shape.
    FreqBins,
    /// Output frame axis versus the operator's shape.
    Frames,
}

impl ShapeAxis {
    fn name(self) -> &'static str {
        match self {
            ShapeAxis::SignalBuffer => "signal buffer length",
            ShapeAxis::Batch => "batch size",
            ShapeAxis::Window => "window length",
            ShapeAxis::ComplexChannels => "complex channel axis",
            ShapeAxis::OutputBuffer => "output buffer length",
            ShapeAxis::FreqBins => "frequency bin count",
            ShapeAxis::Frames => "frame count",
        }
    }
}

/// Errors reported before any output cell is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StftError {
    /// The last frame would read past the end of the signal:
    /// `(num_frames - 1) * hop_length + win_length > samples`.
    SignalOutOfBounds { required: usize, available: usize },
    /// Inconsistent tensor dimensions.
    ShapeMismatch {
        axis: ShapeAxis,
        expected: usize,
        found: usize,
    },
    /// `max_lanes_per_block` must be at least one.
    InvalidCapability,
    /// Shape or offset arithmetic does not fit in `usize`.
    Overflow,
    /// A configuration value could not be parsed.
    InvalidValue,
}

impl StftError {
    pub(crate) fn shape(axis: ShapeAxis, expected: usize, found: usize) -> Self {
        StftError::ShapeMismatch {
            axis,
            expected,
            found,
        }
    }
}

impl core::fmt::Display for StftError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StftError::SignalOutOfBounds {
                required,
                available,
            } => write!(
                f,
                "frames need {required} samples per signal but only {available} are available"
            ),
            StftError::ShapeMismatch {
                axis,
                expected,
                found,
            } => write!(
                f,
                "{} mismatch: expected {expected}, found {found}",
                axis.name()
            ),
            StftError::InvalidCapability => write!(f, "max_lanes_per_block must be non-zero"),
            StftError::Overflow => write!(f, "shape arithmetic overflowed usize"),
            StftError::InvalidValue => write!(f, "invalid configuration value"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StftError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_names_the_axis() {
        let err = StftError::shape(ShapeAxis::Window, 4, 3);
        assert_eq!(err.to_string(), "window length mismatch: expected 4, found 3");
    }

    #[test]
    fn display_output_axes() {
        let err = StftError::shape(ShapeAxis::FreqBins, 2, 4);
        assert_eq!(err.to_string(), "frequency bin count mismatch: expected 2, found 4");
        let err = StftError::shape(ShapeAxis::Frames, 2, 1);
        assert_eq!(err.to_string(), "frame count mismatch: expected 2, found 1");
    }

    #[test]
    fn display_out_of_bounds() {
        let err = StftError::SignalOutOfBounds {
            required: 6,
            available: 4,
        };
        assert_eq!(
            err.to_string(),
            "frames need 6 samples per signal but only 4 are available"
        );
    }
}
