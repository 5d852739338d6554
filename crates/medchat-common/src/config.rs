//! Export configuration
//!
//! All geometry is in millimetres measured from the top-left corner of the
//! page; font sizes are in points. Every section falls back to its default
//! when absent from the TOML file, so a partial file only overrides what it
//! names.

use crate::constants::{self, DEFAULT_FILENAME_TITLE_MAX, DEFAULT_HEADER_TITLE_MAX};
use crate::error::{ExportError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main exporter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub page: PageGeometry,
    pub typography: Typography,
    pub labels: Labels,
    pub colors: Colors,
    /// Conversation title characters shown in the header band
    pub header_title_max: usize,
    /// Sanitized title characters kept in the filename
    pub filename_title_max: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page: PageGeometry::default(),
            typography: Typography::default(),
            labels: Labels::default(),
            colors: Colors::default(),
            header_title_max: DEFAULT_HEADER_TITLE_MAX,
            filename_title_max: DEFAULT_FILENAME_TITLE_MAX,
        }
    }
}

/// Page size, margins and the fixed vertical metrics of the layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    /// Left, right and top margin
    pub margin: f64,
    pub bottom_margin: f64,
    /// Space kept free above the bottom margin for the footer
    pub footer_reserve: f64,
    /// Height of the first-page header band
    pub header_height: f64,
    /// Gap between the header band and the first message
    pub header_gap: f64,
    pub line_height: f64,
    /// Line height of reference titles and URLs
    pub reference_line_height: f64,
    /// Horizontal indent of body text inside a message block
    pub body_indent: f64,
    /// Subtracted from the content width before wrapping
    pub wrap_inset: f64,
    /// Vertical gap after each message
    pub message_gap: f64,
    /// Distance of the footer baseline from the bottom edge
    pub footer_offset: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        // A4 portrait
        Self {
            width: 210.0,
            height: 297.0,
            margin: 20.0,
            bottom_margin: 20.0,
            footer_reserve: 10.0,
            header_height: 40.0,
            header_gap: 10.0,
            line_height: 6.0,
            reference_line_height: 5.0,
            body_indent: 2.0,
            wrap_inset: 10.0,
            message_gap: 6.0,
            footer_offset: 12.0,
        }
    }
}

impl PageGeometry {
    /// Every dimension, paired with its config key
    fn fields(&self) -> [(&'static str, f64); 13] {
        [
            ("width", self.width),
            ("height", self.height),
            ("margin", self.margin),
            ("bottom_margin", self.bottom_margin),
            ("footer_reserve", self.footer_reserve),
            ("header_height", self.header_height),
            ("header_gap", self.header_gap),
            ("line_height", self.line_height),
            ("reference_line_height", self.reference_line_height),
            ("body_indent", self.body_indent),
            ("wrap_inset", self.wrap_inset),
            ("message_gap", self.message_gap),
            ("footer_offset", self.footer_offset),
        ]
    }

    /// Width between the left and right margins
    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    /// X coordinate of the right margin
    pub fn content_right(&self) -> f64 {
        self.width - self.margin
    }

    /// Lowest y a block may reach before a page break is required
    pub fn bottom_limit(&self) -> f64 {
        self.height - self.bottom_margin - self.footer_reserve
    }

    /// Maximum width of one wrapped body line
    pub fn wrap_width(&self) -> f64 {
        self.content_width() - self.body_indent - self.wrap_inset
    }
}

/// Font sizes in points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Typography {
    pub document_title: f64,
    pub conversation_title: f64,
    pub exported_at: f64,
    pub sender_label: f64,
    pub timestamp: f64,
    pub body: f64,
    pub references_label: f64,
    pub reference: f64,
    pub footer: f64,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            document_title: 18.0,
            conversation_title: 12.0,
            exported_at: 9.0,
            sender_label: 10.0,
            timestamp: 8.0,
            body: 10.0,
            references_label: 9.0,
            reference: 8.0,
            footer: 8.0,
        }
    }
}

/// Fixed strings printed into the document and its filename
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub document_title: String,
    pub assistant: String,
    pub product: String,
    pub filename_prefix: String,
    pub references: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            document_title: constants::DOCUMENT_TITLE.to_string(),
            assistant: constants::ASSISTANT_LABEL.to_string(),
            product: constants::PRODUCT_LABEL.to_string(),
            filename_prefix: constants::FILENAME_PREFIX.to_string(),
            references: constants::REFERENCES_LABEL.to_string(),
        }
    }
}

/// An sRGB colour, serialized as `[r, g, b]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Components scaled to the 0..=1 range used by PDF colour operators
    pub fn unit(self) -> (f64, f64, f64) {
        (
            f64::from(self.0) / 255.0,
            f64::from(self.1) / 255.0,
            f64::from(self.2) / 255.0,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Colors {
    pub header_band: Rgb,
    pub header_text: Rgb,
    pub user_band: Rgb,
    pub user_label: Rgb,
    pub assistant_band: Rgb,
    pub assistant_label: Rgb,
    pub timestamp: Rgb,
    pub body: Rgb,
    pub references_label: Rgb,
    pub reference_title: Rgb,
    pub link: Rgb,
    pub footer: Rgb,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            header_band: Rgb(37, 99, 235),
            header_text: Rgb::WHITE,
            user_band: Rgb(219, 234, 254),
            user_label: Rgb(30, 64, 175),
            assistant_band: Rgb(220, 252, 231),
            assistant_label: Rgb(21, 128, 61),
            timestamp: Rgb(107, 114, 128),
            body: Rgb(31, 41, 55),
            references_label: Rgb(75, 85, 99),
            reference_title: Rgb(55, 65, 81),
            link: Rgb(37, 99, 235),
            footer: Rgb(156, 163, 175),
        }
    }
}

impl ExportConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        if !config_path.exists() {
            debug!("No export config at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path).map_err(|e| {
            ExportError::Config(format!("Failed to read config file {:?}: {}", config_path, e))
        })?;
        let config: ExportConfig = toml::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as pretty TOML, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, config_path: P) -> Result<()> {
        let config_path = config_path.as_ref();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_str = toml::to_string_pretty(self)
            .map_err(|e| ExportError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(config_path, config_str)?;
        Ok(())
    }

    /// Default config file location
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ExportError::Config("Failed to get config directory".to_string()))?;
        Ok(config_dir.join("medchat").join("export.toml"))
    }

    /// Reject geometry that leaves no room for content
    pub fn validate(&self) -> Result<()> {
        let page = &self.page;

        if let Some((name, value)) = page.fields().into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(ExportError::Layout(format!(
                "page.{} must be a finite number, got {}",
                name, value
            )));
        }
        if page.width <= 0.0 || page.height <= 0.0 {
            return Err(ExportError::Layout(format!(
                "page size must be positive, got {}x{}",
                page.width, page.height
            )));
        }
        if page.line_height <= 0.0 || page.reference_line_height <= 0.0 {
            return Err(ExportError::Layout("line heights must be positive".to_string()));
        }
        if page.wrap_width() <= 0.0 {
            return Err(ExportError::Layout(format!(
                "margins and insets leave no horizontal space on a {}mm page",
                page.width
            )));
        }
        // A fresh page must fit at least a message header plus one body line,
        // otherwise pagination could never make progress.
        let usable = page.bottom_limit() - page.margin;
        if usable < 3.0 * page.line_height {
            return Err(ExportError::Layout(format!(
                "usable page height {:.1}mm is smaller than three lines",
                usable
            )));
        }
        if page.header_height + page.header_gap + page.line_height > page.bottom_limit() {
            return Err(ExportError::Layout(
                "header band leaves no room for content on the first page".to_string(),
            ));
        }

        let t = &self.typography;
        let sizes = [
            t.document_title,
            t.conversation_title,
            t.exported_at,
            t.sender_label,
            t.timestamp,
            t.body,
            t.references_label,
            t.reference,
            t.footer,
        ];
        if sizes.iter().any(|size| !size.is_finite() || *size <= 0.0) {
            return Err(ExportError::Config("font sizes must be positive".to_string()));
        }

        if self.filename_title_max == 0 {
            return Err(ExportError::Config(
                "filename_title_max must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
