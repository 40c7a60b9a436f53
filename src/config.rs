//! Configuration types for capture, import and document assembly.
//!
//! All session behaviour is controlled through [`SessionConfig`], built via
//! its [`SessionConfigBuilder`]. Defaults are the standard import limits and
//! page geometry; documents built with them all share one page layout.

use crate::camera::FacingMode;
use crate::error::SessionError;
use serde::{Deserialize, Serialize};

/// Fixed name under which a generated document is exported.
pub const DEFAULT_OUTPUT_NAME: &str = "images-to-pdf.pdf";

/// Text stamped at the bottom-left of every page.
pub const DEFAULT_FOOTER_TEXT: &str = "Created with images-to-pdf";

/// Limits applied by [`crate::CaptureSession::import_files`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportLimits {
    /// Files beyond this count are dropped with a warning. Default: 10.
    pub max_files: usize,

    /// Files larger than this are skipped. Default: 5 MB.
    pub max_file_bytes: u64,

    /// Decoded images whose width or height exceeds this are downsampled,
    /// aspect preserved, so the longer edge equals it. Default: 1800 px.
    pub max_dimension: u32,
}

impl Default for ImportLimits {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_file_bytes: 5 * 1024 * 1024,
            max_dimension: 1800,
        }
    }
}

/// Page geometry in PDF units (1/72 in).
///
/// Each page is `content + margin`; the image is drawn at `image_offset`
/// and the footer at `footer_offset`, both measured from the bottom-left
/// page origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageLayoutConfig {
    /// Maximum drawn image width. Default: 752.
    pub max_content_width: f64,
    /// Maximum drawn image height. Default: 552.
    pub max_content_height: f64,
    /// Added to the content width to get the page width. Default: 40.
    pub margin_width: f64,
    /// Added to the content height to get the page height. Default: 60.
    pub margin_height: f64,
    /// Default: (20, 40).
    pub image_offset: (f64, f64),
    /// Default: (20, 20).
    pub footer_offset: (f64, f64),
    /// Default: 12.
    pub footer_font_size: f64,
    /// Fill colour of the footer text. Default: RGB(0.3, 0.3, 0.3).
    pub footer_color: (f64, f64, f64),
}

impl Default for PageLayoutConfig {
    fn default() -> Self {
        Self {
            max_content_width: 752.0,
            max_content_height: 552.0,
            margin_width: 40.0,
            margin_height: 60.0,
            image_offset: (20.0, 40.0),
            footer_offset: (20.0, 20.0),
            footer_font_size: 12.0,
            footer_color: (0.3, 0.3, 0.3),
        }
    }
}

/// Configuration for a [`crate::CaptureSession`].
///
/// Built via [`SessionConfig::builder()`] or using
/// [`SessionConfig::default()`].
///
/// # Example
/// ```rust
/// use images_to_pdf::SessionConfig;
///
/// let config = SessionConfig::builder()
///     .batch_size(4)
///     .footer_text("Scanned receipts")
///     .build()
///     .unwrap();
/// assert_eq!(config.import.max_files, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub import: ImportLimits,

    pub layout: PageLayoutConfig,

    /// Images assembled between two yields to the runtime. Default: 3.
    pub batch_size: usize,

    /// How many imported files are read and decoded at once. Default: 4.
    ///
    /// Results are still appended in selection order.
    pub import_concurrency: usize,

    /// Quality of the JPEG used for camera frames, downsampled imports and
    /// the canonical embedded image. Range 1–100. Default: 92.
    pub jpeg_quality: u8,

    /// Footer stamp drawn on every page.
    pub footer_text: String,

    /// File name used by [`crate::CaptureSession::export_document`].
    pub output_name: String,

    /// Facing requested first when opening a camera. Default: environment.
    pub preferred_facing: FacingMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            import: ImportLimits::default(),
            layout: PageLayoutConfig::default(),
            batch_size: 3,
            import_concurrency: 4,
            jpeg_quality: 92,
            footer_text: DEFAULT_FOOTER_TEXT.to_string(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            preferred_facing: FacingMode::Environment,
        }
    }
}

impl SessionConfig {
    /// Create a new builder for `SessionConfig`.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SessionConfig`].
#[derive(Debug)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn max_files(mut self, n: usize) -> Self {
        self.config.import.max_files = n;
        self
    }

    pub fn max_file_bytes(mut self, bytes: u64) -> Self {
        self.config.import.max_file_bytes = bytes;
        self
    }

    pub fn max_dimension(mut self, px: u32) -> Self {
        self.config.import.max_dimension = px.max(16);
        self
    }

    pub fn layout(mut self, layout: PageLayoutConfig) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn batch_size(mut self, n: usize) -> Self {
        self.config.batch_size = n.max(1);
        self
    }

    pub fn import_concurrency(mut self, n: usize) -> Self {
        self.config.import_concurrency = n.max(1);
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn footer_text(mut self, text: impl Into<String>) -> Self {
        self.config.footer_text = text.into();
        self
    }

    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.config.output_name = name.into();
        self
    }

    pub fn preferred_facing(mut self, facing: FacingMode) -> Self {
        self.config.preferred_facing = facing;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SessionConfig, SessionError> {
        let c = &self.config;
        if c.import.max_files == 0 {
            return Err(SessionError::InvalidConfig(
                "max_files must be ≥ 1".into(),
            ));
        }
        if c.import.max_file_bytes == 0 {
            return Err(SessionError::InvalidConfig(
                "max_file_bytes must be ≥ 1".into(),
            ));
        }
        let l = &c.layout;
        if l.max_content_width <= 0.0 || l.max_content_height <= 0.0 {
            return Err(SessionError::InvalidConfig(format!(
                "content bounds must be positive, got {}x{}",
                l.max_content_width, l.max_content_height
            )));
        }
        if l.margin_width < 0.0 || l.margin_height < 0.0 {
            return Err(SessionError::InvalidConfig(
                "page margins must not be negative".into(),
            ));
        }
        if c.output_name.trim().is_empty() || c.output_name.contains(['/', '\\']) {
            return Err(SessionError::InvalidConfig(format!(
                "output name must be a bare file name, got '{}'",
                c.output_name
            )));
        }
        Ok(self.config)
    }
}
