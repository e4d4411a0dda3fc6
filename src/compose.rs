use crate::error::{ComposeError, LogoUnavailable};
use crate::logo::{circular_mask, decode_logo, is_opaque, thumbnail};
use crate::qr::encode;
use crate::render::{render_canvas, RenderOptions};
use image::codecs::png::PngEncoder;
use image::{ColorType, GrayImage, ImageEncoder, Rgb, RgbImage, RgbaImage};
use log::{debug, warn};

pub const DEFAULT_LOGO_RATIO: f32 = 0.25;

/// Largest ratio the level H headroom is known to absorb.
pub const SAFE_LOGO_RATIO: f32 = 0.30;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComposeOptions {
    pub render: RenderOptions,
    /// Logo bounding box as a fraction of the canvas size, in (0, 1).
    pub logo_ratio: f32,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            render: RenderOptions::default(),
            logo_ratio: DEFAULT_LOGO_RATIO,
        }
    }
}

impl ComposeOptions {
    pub fn validate(&self) -> Result<(), ComposeError> {
        self.render.validate()?;
        let ratio = self.logo_ratio;
        if !ratio.is_finite() || ratio <= 0.0 || ratio >= 1.0 {
            return Err(ComposeError::InvalidRatio(ratio));
        }
        if ratio > SAFE_LOGO_RATIO {
            warn!("Logo ratio {ratio} exceeds {SAFE_LOGO_RATIO}, the code may not scan");
        }
        Ok(())
    }
}

/// Where the logo landed on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Output of [`compose`]: the PNG bytes plus a warning when the logo was
/// left out.
#[derive(Debug)]
pub struct Composition {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub version: i16,
    pub placement: Option<Placement>,
    pub warning: Option<LogoUnavailable>,
}

/// Top-left corner that centres a `logo` sized box on a `canvas` sized one.
/// Floor division, so odd differences leave the logo half a pixel up-left.
pub fn center_offset(canvas: (u32, u32), logo: (u32, u32)) -> (u32, u32) {
    (
        canvas.0.saturating_sub(logo.0) / 2,
        canvas.1.saturating_sub(logo.1) / 2,
    )
}

/// Blend `logo` onto `canvas` at `pos`, but only where `mask` is opaque.
/// The logo's own alpha still applies inside the mask.
pub fn paste_masked(canvas: &mut RgbImage, logo: &RgbaImage, mask: &GrayImage, pos: (u32, u32)) {
    for (lx, ly, pixel) in logo.enumerate_pixels() {
        if !is_opaque(mask, lx, ly) {
            continue;
        }
        let (cx, cy) = (pos.0 + lx, pos.1 + ly);
        if cx >= canvas.width() || cy >= canvas.height() {
            continue;
        }

        let alpha = pixel[3] as u32;
        match alpha {
            0 => {}
            255 => canvas.put_pixel(cx, cy, Rgb([pixel[0], pixel[1], pixel[2]])),
            _ => {
                let bg = canvas.get_pixel(cx, cy);
                let blend =
                    |fg: u8, bg: u8| ((fg as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255) as u8;
                let blended = Rgb([
                    blend(pixel[0], bg[0]),
                    blend(pixel[1], bg[1]),
                    blend(pixel[2], bg[2]),
                ]);
                canvas.put_pixel(cx, cy, blended);
            }
        }
    }
}

/// Decode, shrink, round off and centre the logo on `canvas`.
pub fn overlay_logo(
    canvas: &mut RgbImage,
    logo_bytes: &[u8],
    ratio: f32,
) -> Result<Placement, LogoUnavailable> {
    let logo = decode_logo(logo_bytes)?;
    let bound = (
        (canvas.width() as f32 * ratio) as u32,
        (canvas.height() as f32 * ratio) as u32,
    );
    let logo = thumbnail(&logo, bound)?;
    let mask = circular_mask(logo.width(), logo.height());

    let (x, y) = center_offset(canvas.dimensions(), logo.dimensions());
    paste_masked(canvas, &logo, &mask, (x, y));

    let placement = Placement {
        x,
        y,
        width: logo.width(),
        height: logo.height(),
    };
    debug!("Placed logo at {placement:?}");
    Ok(placement)
}

pub fn encode_png(canvas: &RgbImage) -> Result<Vec<u8>, ComposeError> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(canvas.as_raw(), canvas.width(), canvas.height(), ColorType::Rgb8)
        .map_err(ComposeError::Serialization)?;
    Ok(png)
}

/// Encode `payload` as a level H QR code, put the logo in the middle and
/// serialize the result as PNG.
///
/// A missing or broken logo is not an error: the bare code is returned and
/// the reason is reported in [`Composition::warning`].
pub fn compose(
    payload: &str,
    logo: Option<&[u8]>,
    options: &ComposeOptions,
) -> Result<Composition, ComposeError> {
    compose_with_logo(payload, logo.ok_or(LogoUnavailable::Missing), options)
}

/// Same as [`compose`], for callers that already know why the logo is
/// unavailable (e.g. the file could not be read).
pub fn compose_with_logo<B: AsRef<[u8]>>(
    payload: &str,
    logo: Result<B, LogoUnavailable>,
    options: &ComposeOptions,
) -> Result<Composition, ComposeError> {
    options.validate()?;

    let symbol = encode(payload)?;
    let mut canvas = render_canvas(&symbol, &options.render)?;
    debug!("Rendered {}x{} canvas", canvas.width(), canvas.height());

    let overlay = logo.and_then(|bytes| overlay_logo(&mut canvas, bytes.as_ref(), options.logo_ratio));
    let (placement, warning) = match overlay {
        Ok(placement) => (Some(placement), None),
        Err(reason) => {
            warn!("Generating QR code without logo: {reason}");
            (None, Some(reason))
        }
    };

    let png = encode_png(&canvas)?;

    Ok(Composition {
        png,
        width: canvas.width(),
        height: canvas.height(),
        version: symbol.version,
        placement,
        warning,
    })
}
