//! Palettes and the external palette collaborator.
//!
//! A palette is an ordered list of unique `#RRGGBB` strings. It comes either
//! from the median-cut quantizer or from a [`PaletteSource`], typically a
//! text-generation service asked for colors matching a theme. Responses from
//! such a service arrive late and possibly out of order; [`PalettePanel`]
//! only applies the response to its most recent request.

use std::sync::OnceLock;

use image::Rgba;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::color::{parse_color, rgb_hex, ColorError};

/// Error type for palette requests
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaletteError {
    /// The collaborator could not be reached or refused the request
    #[error("palette service unavailable: {0}")]
    Unavailable(String),
    /// The response held no usable colors
    #[error("malformed palette response: {0}")]
    Malformed(String),
    /// A color in the response could not be parsed
    #[error("invalid palette color '{value}': {source}")]
    Color {
        value: String,
        #[source]
        source: ColorError,
    },
}

/// An ordered list of unique, uppercase `#RRGGBB` colors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    /// Build a palette from color strings in any accepted notation.
    ///
    /// Alpha is dropped, duplicates collapse onto their first occurrence and
    /// an empty input is malformed.
    pub fn parse<S: AsRef<str>>(colors: &[S]) -> Result<Self, PaletteError> {
        let mut palette = Palette::default();
        for value in colors {
            let value = value.as_ref();
            let color = parse_color(value)
                .map_err(|source| PaletteError::Color { value: value.to_string(), source })?;
            palette.push(rgb_hex(color[0], color[1], color[2]));
        }
        if palette.is_empty() {
            return Err(PaletteError::Malformed("no colors".to_string()));
        }
        Ok(palette)
    }

    /// Wrap hex strings already produced by this crate, such as quantizer output.
    pub fn from_hex(colors: Vec<String>) -> Self {
        let mut palette = Palette::default();
        for color in colors {
            palette.push(color.to_uppercase());
        }
        palette
    }

    fn push(&mut self, hex: String) {
        if !self.colors.contains(&hex) {
            self.colors.push(hex);
        }
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The palette as opaque pixel values.
    pub fn to_rgba(&self) -> Vec<Rgba<u8>> {
        self.colors.iter().filter_map(|c| parse_color(c).ok()).collect()
    }
}

/// A provider of themed palettes, usually backed by a remote service.
pub trait PaletteSource {
    fn request_palette(&mut self, theme: &str) -> Result<Vec<String>, PaletteError>;
}

fn hex_token_regex() -> Option<&'static Regex> {
    static HEX: OnceLock<Option<Regex>> = OnceLock::new();
    HEX.get_or_init(|| Regex::new(r"#[0-9A-Fa-f]{6}\b").ok()).as_ref()
}

/// Extract a palette from a free-form text response.
///
/// The preferred form is a JSON array of color strings, possibly wrapped in
/// prose or a Markdown code fence. When no such array parses, every
/// `#RRGGBB` token in the text is taken in order of appearance.
pub fn parse_palette_response(text: &str) -> Result<Palette, PaletteError> {
    if let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) {
        if start < end {
            match serde_json::from_str::<Vec<String>>(&text[start..=end]) {
                Ok(colors) => return Palette::parse(&colors),
                Err(e) => debug!(error = %e, "response is not a JSON array, scanning for hex"),
            }
        }
    }

    let tokens: Vec<&str> = match hex_token_regex() {
        Some(re) => re.find_iter(text).map(|m| m.as_str()).collect(),
        None => Vec::new(),
    };
    if tokens.is_empty() {
        return Err(PaletteError::Malformed("no colors found in response".to_string()));
    }
    Palette::parse(&tokens)
}

/// Identifies one palette request issued by a [`PalettePanel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PaletteTicket(u64);

/// Holds the displayed palette and guards it against stale responses.
#[derive(Debug, Default)]
pub struct PalettePanel {
    colors: Palette,
    latest: u64,
    pending: bool,
    last_error: Option<PaletteError>,
}

impl PalettePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn colors(&self) -> &Palette {
        &self.colors
    }

    /// True while the newest request has not completed.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn last_error(&self) -> Option<&PaletteError> {
        self.last_error.as_ref()
    }

    /// Start a request. Any earlier outstanding request becomes stale.
    pub fn begin_request(&mut self) -> PaletteTicket {
        self.latest += 1;
        self.pending = true;
        PaletteTicket(self.latest)
    }

    /// Deliver the outcome of a request.
    ///
    /// Returns `true` when the outcome belonged to the newest request and was
    /// applied. On error the previous colors stay in place.
    pub fn complete(
        &mut self,
        ticket: PaletteTicket,
        outcome: Result<Palette, PaletteError>,
    ) -> bool {
        if ticket.0 != self.latest || !self.pending {
            debug!(ticket = ticket.0, latest = self.latest, "ignoring stale palette response");
            return false;
        }
        self.pending = false;
        match outcome {
            Ok(palette) => {
                self.colors = palette;
                self.last_error = None;
            }
            Err(e) => {
                debug!(error = %e, "palette request failed, keeping previous colors");
                self.last_error = Some(e);
            }
        }
        true
    }

    /// Ask `source` for a palette and apply it when it arrives.
    pub fn request(
        &mut self,
        source: &mut dyn PaletteSource,
        theme: &str,
    ) -> Result<&Palette, PaletteError> {
        let ticket = self.begin_request();
        let outcome = source.request_palette(theme).and_then(|colors| Palette::parse(&colors));
        let error = outcome.as_ref().err().cloned();
        self.complete(ticket, outcome);
        match error {
            Some(e) => Err(e),
            None => Ok(&self.colors),
        }
    }

    /// Replace the colors directly, superseding any outstanding request.
    pub fn set_colors(&mut self, palette: Palette) {
        self.latest += 1;
        self.pending = false;
        self.colors = palette;
        self.last_error = None;
    }
}
