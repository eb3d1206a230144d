use crate::domain::ImageFormat;

/// Box-fitting strategy (§4.B), modeled on the common `sharp`/CSS `object-fit` conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    /// Scale to fit entirely within the box, preserving aspect ratio, then pad to the exact
    /// target size (letterbox).
    Contain,
    /// Scale to cover the box entirely, preserving aspect ratio, cropping any overflow.
    Cover,
    /// Stretch to the exact target size, ignoring aspect ratio.
    Fill,
    /// Like `Contain`, but never upscale; output is the source size unchanged if it already
    /// fits inside the box.
    Inside,
    /// Like `Cover`, but never downscale; output is the source size unchanged if it already
    /// covers the box.
    Outside,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderSpec {
    pub target_width: u32,
    pub target_height: u32,
    pub format: ImageFormat,
    pub quality: u8,
    pub fit_mode: FitMode,
}

#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}
