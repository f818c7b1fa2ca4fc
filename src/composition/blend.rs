//! Blend modes for layer compositing
//!
//! Channel math follows the W3C Compositing and Blending formulas. The
//! blended color is mixed with the source by the backdrop alpha and then
//! composited "source over" the destination, so blending onto a transparent
//! backdrop behaves like a plain paint.

use image::Rgba;
use serde::{Deserialize, Serialize};

/// Blend modes for layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Standard alpha compositing (source over destination)
    #[default]
    Normal,
    /// result = base * blend
    Multiply,
    /// result = 1 - (1 - base) * (1 - blend)
    Screen,
    /// Multiply or screen depending on base brightness
    Overlay,
    /// result = min(base, blend)
    Darken,
    /// result = max(base, blend)
    Lighten,
    /// Brightens base by dividing by the inverted blend color
    ColorDodge,
    /// Darkens base by dividing the inverted base by blend
    ColorBurn,
    /// Overlay with base and blend swapped
    HardLight,
    /// Softer version of hard light
    SoftLight,
    /// result = |base - blend|
    Difference,
    /// Lower-contrast difference
    Exclusion,
    /// Hue of blend, saturation and luminosity of base
    Hue,
    /// Saturation of blend, hue and luminosity of base
    Saturation,
    /// Hue and saturation of blend, luminosity of base
    Color,
    /// Luminosity of blend, hue and saturation of base
    Luminosity,
}

impl BlendMode {
    /// Every blend mode, in menu order.
    pub const ALL: [BlendMode; 16] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::Darken,
        BlendMode::Lighten,
        BlendMode::ColorDodge,
        BlendMode::ColorBurn,
        BlendMode::HardLight,
        BlendMode::SoftLight,
        BlendMode::Difference,
        BlendMode::Exclusion,
        BlendMode::Hue,
        BlendMode::Saturation,
        BlendMode::Color,
        BlendMode::Luminosity,
    ];

    /// Parse a blend mode from string
    pub fn from_str(s: &str) -> Option<BlendMode> {
        match s.to_lowercase().as_str() {
            "normal" | "source-over" => Some(BlendMode::Normal),
            "multiply" => Some(BlendMode::Multiply),
            "screen" => Some(BlendMode::Screen),
            "overlay" => Some(BlendMode::Overlay),
            "darken" => Some(BlendMode::Darken),
            "lighten" => Some(BlendMode::Lighten),
            "color-dodge" => Some(BlendMode::ColorDodge),
            "color-burn" => Some(BlendMode::ColorBurn),
            "hard-light" => Some(BlendMode::HardLight),
            "soft-light" => Some(BlendMode::SoftLight),
            "difference" => Some(BlendMode::Difference),
            "exclusion" => Some(BlendMode::Exclusion),
            "hue" => Some(BlendMode::Hue),
            "saturation" => Some(BlendMode::Saturation),
            "color" => Some(BlendMode::Color),
            "luminosity" => Some(BlendMode::Luminosity),
            _ => None,
        }
    }

    /// Canonical lowercase name, as accepted by [`BlendMode::from_str`].
    pub fn name(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::ColorDodge => "color-dodge",
            BlendMode::ColorBurn => "color-burn",
            BlendMode::HardLight => "hard-light",
            BlendMode::SoftLight => "soft-light",
            BlendMode::Difference => "difference",
            BlendMode::Exclusion => "exclusion",
            BlendMode::Hue => "hue",
            BlendMode::Saturation => "saturation",
            BlendMode::Color => "color",
            BlendMode::Luminosity => "luminosity",
        }
    }

    /// Whether the mode works on whole colors rather than per channel.
    pub fn is_non_separable(self) -> bool {
        matches!(
            self,
            BlendMode::Hue | BlendMode::Saturation | BlendMode::Color | BlendMode::Luminosity
        )
    }

    /// Apply a separable blend mode to a single channel (values are 0.0-1.0)
    pub(crate) fn blend_channel(&self, base: f32, blend: f32) -> f32 {
        match self {
            BlendMode::Multiply => base * blend,
            BlendMode::Screen => 1.0 - (1.0 - base) * (1.0 - blend),
            BlendMode::Overlay => hard_light(blend, base),
            BlendMode::Darken => base.min(blend),
            BlendMode::Lighten => base.max(blend),
            BlendMode::ColorDodge => {
                if base == 0.0 {
                    0.0
                } else if blend >= 1.0 {
                    1.0
                } else {
                    (base / (1.0 - blend)).min(1.0)
                }
            }
            BlendMode::ColorBurn => {
                if base >= 1.0 {
                    1.0
                } else if blend == 0.0 {
                    0.0
                } else {
                    1.0 - ((1.0 - base) / blend).min(1.0)
                }
            }
            BlendMode::HardLight => hard_light(base, blend),
            BlendMode::SoftLight => soft_light(base, blend),
            BlendMode::Difference => (base - blend).abs(),
            BlendMode::Exclusion => base + blend - 2.0 * base * blend,
            // Normal and the non-separable modes never reach per-channel math
            _ => blend,
        }
    }

    /// Blend a whole source color onto a backdrop color (channels 0.0-1.0).
    pub(crate) fn blend_color(&self, base: [f32; 3], blend: [f32; 3]) -> [f32; 3] {
        match self {
            BlendMode::Normal => blend,
            BlendMode::Hue => set_lum(set_sat(blend, sat(base)), lum(base)),
            BlendMode::Saturation => set_lum(set_sat(base, sat(blend)), lum(base)),
            BlendMode::Color => set_lum(blend, lum(base)),
            BlendMode::Luminosity => set_lum(base, lum(blend)),
            _ => [
                self.blend_channel(base[0], blend[0]),
                self.blend_channel(base[1], blend[1]),
                self.blend_channel(base[2], blend[2]),
            ],
        }
    }
}

fn hard_light(base: f32, blend: f32) -> f32 {
    if blend <= 0.5 {
        base * 2.0 * blend
    } else {
        let s = 2.0 * blend - 1.0;
        base + s - base * s
    }
}

fn soft_light(base: f32, blend: f32) -> f32 {
    if blend <= 0.5 {
        base - (1.0 - 2.0 * blend) * base * (1.0 - base)
    } else {
        let d = if base <= 0.25 {
            ((16.0 * base - 12.0) * base + 4.0) * base
        } else {
            base.sqrt()
        };
        base + (2.0 * blend - 1.0) * (d - base)
    }
}

fn lum(c: [f32; 3]) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: [f32; 3]) -> [f32; 3] {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    if n < 0.0 {
        for ch in &mut out {
            *ch = l + (*ch - l) * l / (l - n);
        }
    }
    if x > 1.0 {
        for ch in &mut out {
            *ch = l + (*ch - l) * (1.0 - l) / (x - l);
        }
    }
    out
}

fn set_lum(c: [f32; 3], l: f32) -> [f32; 3] {
    let d = l - lum(c);
    clip_color([c[0] + d, c[1] + d, c[2] + d])
}

fn sat(c: [f32; 3]) -> f32 {
    c[0].max(c[1]).max(c[2]) - c[0].min(c[1]).min(c[2])
}

fn set_sat(c: [f32; 3], s: f32) -> [f32; 3] {
    let mut idx = [0usize, 1, 2];
    idx.sort_by(|&a, &b| c[a].total_cmp(&c[b]));
    let (min, mid, max) = (idx[0], idx[1], idx[2]);

    let mut out = [0.0; 3];
    if c[max] > c[min] {
        out[mid] = (c[mid] - c[min]) * s / (c[max] - c[min]);
        out[max] = s;
    }
    out
}

/// Blend source pixel over destination using the specified blend mode.
///
/// `src_alpha` is the source alpha with layer opacity already applied (0.0-1.0).
pub fn blend_pixels(src: Rgba<u8>, dst: Rgba<u8>, mode: BlendMode, src_alpha: f32) -> Rgba<u8> {
    let src_alpha = src_alpha.clamp(0.0, 1.0);
    let dst_alpha = dst[3] as f32 / 255.0;

    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    if out_alpha == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let src_c = [src[0] as f32 / 255.0, src[1] as f32 / 255.0, src[2] as f32 / 255.0];
    let dst_c = [dst[0] as f32 / 255.0, dst[1] as f32 / 255.0, dst[2] as f32 / 255.0];

    let blended = mode.blend_color(dst_c, src_c);

    // Where the backdrop is transparent the source shows through unblended
    let composite = |i: usize| -> u8 {
        let mixed = (1.0 - dst_alpha) * src_c[i] + dst_alpha * blended[i];
        let result = (mixed * src_alpha + dst_c[i] * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        (result.clamp(0.0, 1.0) * 255.0).round() as u8
    };

    Rgba([composite(0), composite(1), composite(2), (out_alpha * 255.0).round() as u8])
}
