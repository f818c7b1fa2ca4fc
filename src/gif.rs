//! GIF animation rendering

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::document::Document;
use crate::output::{scale_buffer, ExportScale, OutputError};

/// Options for animated export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GifOptions {
    /// Playback rate; when unset each frame uses its own duration
    pub fps: Option<u32>,
    pub scale: ExportScale,
    /// Loop forever instead of playing once
    pub loop_animation: bool,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self { fps: None, scale: ExportScale::X1, loop_animation: true }
    }
}

impl GifOptions {
    /// Display time of a frame whose own duration is `duration_ms`.
    pub fn delay_ms(&self, duration_ms: u32) -> u32 {
        match self.fps {
            Some(fps) => 1000 / fps.max(1),
            None => duration_ms,
        }
    }
}

/// Encode a sequence of `(image, delay_ms)` frames as an animated GIF.
///
/// GIF delays have centisecond resolution; delays are rounded down to it with
/// a floor of one centisecond.
pub fn encode_gif(
    frames: &[(PixelBuffer, u32)],
    loop_anim: bool,
) -> Result<Vec<u8>, OutputError> {
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);

        // Set repeat behavior
        let repeat = if loop_anim { Repeat::Infinite } else { Repeat::Finite(0) };
        encoder.set_repeat(repeat)?;

        for (image, delay_ms) in frames {
            let delay_cs = (delay_ms / 10).max(1);
            let delay = Delay::from_numer_denom_ms(delay_cs * 10, 1);
            encoder.encode_frame(Frame::from_parts(image.image().clone(), 0, 0, delay))?;
        }
    }
    Ok(bytes)
}

/// Flatten every frame of `document`, encode them into one GIF and hand the
/// bytes to `save` exactly once.
#[tracing::instrument(
    level = "debug",
    skip(document, save),
    fields(frames = document.frame_count())
)]
pub fn export_gif(
    document: &Document,
    options: &GifOptions,
    save: impl FnOnce(Vec<u8>),
) -> Result<(), OutputError> {
    let frames: Vec<(PixelBuffer, u32)> = document
        .frames()
        .iter()
        .enumerate()
        .filter_map(|(index, frame)| {
            let flat = document.flatten(index)?;
            Some((scale_buffer(&flat, options.scale), options.delay_ms(frame.duration_ms())))
        })
        .collect();

    let bytes = encode_gif(&frames, options.loop_animation)?;
    save(bytes);
    Ok(())
}
