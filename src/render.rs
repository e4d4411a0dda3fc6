use crate::error::ComposeError;
use crate::qr::QrSymbol;
use image::{Rgb, RgbImage};
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOptions {
    /// Pixels per module, at least 1.
    pub box_size: u32,
    /// Quiet zone width in modules.
    pub border: u32,
    pub dark: Rgb<u8>,
    pub light: Rgb<u8>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            box_size: 10,
            border: 4,
            dark: Rgb([0, 0, 0]),
            light: Rgb([255, 255, 255]),
        }
    }
}

impl RenderOptions {
    pub fn validate(&self) -> Result<(), ComposeError> {
        if self.box_size == 0 {
            return Err(ComposeError::InvalidRenderOptions);
        }
        Ok(())
    }
}

/// Largest canvas edge we are willing to allocate, in pixels.
pub const MAX_CANVAS_SIDE: u32 = 16_384;

/// Side length in pixels of a canvas for a symbol `width` modules wide.
pub fn canvas_side(width: usize, options: &RenderOptions) -> Result<u32, ComposeError> {
    let too_large = || ComposeError::CanvasTooLarge {
        box_size: options.box_size,
        border: options.border,
    };

    let modules = u32::try_from(width)
        .ok()
        .zip(options.border.checked_mul(2))
        .and_then(|(width, borders)| width.checked_add(borders))
        .ok_or_else(too_large)?;
    let side = modules.checked_mul(options.box_size).ok_or_else(too_large)?;
    if side > MAX_CANVAS_SIDE {
        return Err(too_large());
    }
    Ok(side)
}

/// Paint every module as a `box_size` square, padded by `border` light
/// modules on all sides.
pub fn render_canvas(symbol: &QrSymbol, options: &RenderOptions) -> Result<RgbImage, ComposeError> {
    options.validate()?;
    let side = canvas_side(symbol.width(), options)?;
    let mut canvas = RgbImage::new(side, side);
    if side == 0 {
        return Ok(canvas);
    }

    let qr_width = symbol.width() as u32;
    let box_size = options.box_size;
    let border = options.border;

    // Rows are independent, so fill them in parallel.
    canvas
        .par_chunks_mut(side as usize * 3)
        .enumerate()
        .for_each(|(y, row)| {
            let my = (y as u32 / box_size).checked_sub(border);
            for (x, px) in row.chunks_exact_mut(3).enumerate() {
                let mx = (x as u32 / box_size).checked_sub(border);
                let is_dark = match (mx, my) {
                    (Some(mx), Some(my)) if mx < qr_width && my < qr_width => {
                        symbol.is_dark(mx as usize, my as usize)
                    }
                    _ => false,
                };
                let color = if is_dark { options.dark } else { options.light };
                px.copy_from_slice(&color.0);
            }
        });

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::encode;

    #[test]
    fn canvas_size_includes_border() {
        let symbol = encode("https://example.org").unwrap();
        let canvas = render_canvas(&symbol, &RenderOptions::default()).unwrap();
        let expected = (symbol.width() as u32 + 8) * 10;
        assert_eq!(canvas.dimensions(), (expected, expected));
    }

    #[test]
    fn border_is_light_and_modules_are_blocks() {
        let symbol = encode("hello").unwrap();
        let options = RenderOptions {
            box_size: 3,
            border: 2,
            ..RenderOptions::default()
        };
        let canvas = render_canvas(&symbol, &options).unwrap();

        for i in 0..canvas.width() {
            assert_eq!(*canvas.get_pixel(i, 0), options.light);
            assert_eq!(*canvas.get_pixel(0, i), options.light);
        }

        for y in 0..symbol.width() {
            for x in 0..symbol.width() {
                let expected = if symbol.is_dark(x, y) { options.dark } else { options.light };
                for dy in 0..3 {
                    for dx in 0..3 {
                        let px = (x as u32 + 2) * 3 + dx;
                        let py = (y as u32 + 2) * 3 + dy;
                        assert_eq!(*canvas.get_pixel(px, py), expected);
                    }
                }
            }
        }
    }

    #[test]
    fn custom_colors_are_used() {
        let symbol = encode("colors").unwrap();
        let options = RenderOptions {
            box_size: 1,
            border: 0,
            dark: Rgb([10, 20, 30]),
            light: Rgb([200, 210, 220]),
        };
        let canvas = render_canvas(&symbol, &options).unwrap();
        assert_eq!(*canvas.get_pixel(0, 0), Rgb([10, 20, 30]));
        assert_eq!(*canvas.get_pixel(7, 0), Rgb([200, 210, 220]));
    }

    #[test]
    fn rendering_is_deterministic() {
        let symbol = encode("same input").unwrap();
        let a = render_canvas(&symbol, &RenderOptions::default()).unwrap();
        let b = render_canvas(&symbol, &RenderOptions::default()).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn zero_box_size_is_invalid() {
        let options = RenderOptions {
            box_size: 0,
            ..RenderOptions::default()
        };
        assert!(matches!(options.validate(), Err(ComposeError::InvalidRenderOptions)));
    }

    #[test]
    fn overflowing_box_size_is_rejected() {
        let symbol = encode("https://example.org").unwrap();
        // (29 + 8) * 116_080_198 wraps around to 30 in u32.
        let options = RenderOptions {
            box_size: 116_080_198,
            ..RenderOptions::default()
        };
        assert!(matches!(
            render_canvas(&symbol, &options),
            Err(ComposeError::CanvasTooLarge { box_size: 116_080_198, border: 4 })
        ));
    }

    #[test]
    fn overflowing_border_is_rejected() {
        let options = RenderOptions {
            box_size: 1,
            border: u32::MAX / 2 + 1,
            ..RenderOptions::default()
        };
        assert!(matches!(
            canvas_side(21, &options),
            Err(ComposeError::CanvasTooLarge { .. })
        ));
    }

    #[test]
    fn canvas_side_is_capped() {
        let options = RenderOptions {
            box_size: 100,
            ..RenderOptions::default()
        };
        assert_eq!(canvas_side(21, &options).unwrap(), 2900);
        assert!(matches!(
            canvas_side(177, &options),
            Err(ComposeError::CanvasTooLarge { box_size: 100, border: 4 })
        ));
    }
}
