use crate::error::LogoUnavailable;
use image::{imageops, GrayImage, Luma, RgbaImage};
use log::debug;
use rayon::prelude::*;
use std::io;
use std::path::Path;

pub const MASK_OPAQUE: u8 = 255;
pub const MASK_CLEAR: u8 = 0;

/// Read the logo resource from disk.
pub fn read_logo(path: &Path) -> io::Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        debug!("Could not read logo {}: {e}", path.display());
        e
    })
}

pub fn decode_logo(bytes: &[u8]) -> Result<RgbaImage, LogoUnavailable> {
    let img = image::load_from_memory(bytes).map_err(LogoUnavailable::Undecodable)?;
    Ok(img.to_rgba8())
}

/// Largest size with the source aspect ratio that fits in `bound`.
/// Never enlarges: a source that already fits keeps its size.
pub fn thumbnail_dimensions(src: (u32, u32), bound: (u32, u32)) -> (u32, u32) {
    let (w, h) = src;
    let (bw, bh) = bound;
    if w <= bw && h <= bh {
        return (w, h);
    }

    let scale = (bw as f64 / w as f64).min(bh as f64 / h as f64);
    let nw = ((w as f64 * scale).round() as u32).clamp(1, bw.max(1));
    let nh = ((h as f64 * scale).round() as u32).clamp(1, bh.max(1));
    (nw, nh)
}

/// Shrink `logo` to fit inside `bound`, keeping its aspect ratio.
pub fn thumbnail(logo: &RgbaImage, bound: (u32, u32)) -> Result<RgbaImage, LogoUnavailable> {
    if bound.0 == 0 || bound.1 == 0 || logo.width() == 0 || logo.height() == 0 {
        return Err(LogoUnavailable::TooSmall {
            width: bound.0.min(logo.width()),
            height: bound.1.min(logo.height()),
        });
    }

    let (w, h) = thumbnail_dimensions(logo.dimensions(), bound);
    if (w, h) == logo.dimensions() {
        return Ok(logo.clone());
    }

    Ok(imageops::resize(logo, w, h, imageops::FilterType::Lanczos3))
}

/// Opacity mask with an opaque disk inscribed in a `width` x `height`
/// rectangle. A pixel is opaque when its centre lies inside the ellipse.
pub fn circular_mask(width: u32, height: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return mask;
    }

    let rx = width as f64 / 2.0;
    let ry = height as f64 / 2.0;

    mask.par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let dy = (y as f64 + 0.5 - ry) / ry;
            for (x, value) in row.iter_mut().enumerate() {
                let dx = (x as f64 + 0.5 - rx) / rx;
                *value = if dx * dx + dy * dy <= 1.0 {
                    MASK_OPAQUE
                } else {
                    MASK_CLEAR
                };
            }
        });

    mask
}

pub fn is_opaque(mask: &GrayImage, x: u32, y: u32) -> bool {
    let Luma([v]) = *mask.get_pixel(x, y);
    v == MASK_OPAQUE
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::io::Write;

    #[test]
    fn thumbnail_never_enlarges() {
        assert_eq!(thumbnail_dimensions((40, 30), (92, 92)), (40, 30));
        assert_eq!(thumbnail_dimensions((92, 92), (92, 92)), (92, 92));
    }

    #[test]
    fn thumbnail_keeps_aspect_ratio() {
        assert_eq!(thumbnail_dimensions((400, 200), (100, 100)), (100, 50));
        assert_eq!(thumbnail_dimensions((200, 400), (100, 100)), (50, 100));
        assert_eq!(thumbnail_dimensions((500, 500), (92, 92)), (92, 92));
    }

    #[test]
    fn thumbnail_of_extreme_aspect_keeps_one_pixel() {
        assert_eq!(thumbnail_dimensions((1000, 1), (10, 10)), (10, 1));
    }

    #[test]
    fn thumbnail_resizes_pixels() {
        let logo = RgbaImage::from_pixel(300, 150, Rgba([200, 0, 0, 255]));
        let small = thumbnail(&logo, (60, 60)).unwrap();
        assert_eq!(small.dimensions(), (60, 30));
    }

    #[test]
    fn zero_bound_is_too_small() {
        let logo = RgbaImage::new(10, 10);
        assert!(matches!(
            thumbnail(&logo, (0, 0)),
            Err(LogoUnavailable::TooSmall { .. })
        ));
    }

    #[test]
    fn mask_touches_all_edges_and_clears_corners() {
        let mask = circular_mask(21, 21);
        assert!(is_opaque(&mask, 10, 10));
        assert!(is_opaque(&mask, 0, 10));
        assert!(is_opaque(&mask, 20, 10));
        assert!(is_opaque(&mask, 10, 0));
        assert!(is_opaque(&mask, 10, 20));
        for (x, y) in [(0, 0), (20, 0), (0, 20), (20, 20)] {
            assert!(!is_opaque(&mask, x, y));
        }
    }

    #[test]
    fn mask_is_binary_and_symmetric() {
        let mask = circular_mask(30, 16);
        for (x, y, p) in mask.enumerate_pixels() {
            assert!(p[0] == MASK_OPAQUE || p[0] == MASK_CLEAR);
            assert_eq!(p[0], mask.get_pixel(29 - x, y)[0]);
            assert_eq!(p[0], mask.get_pixel(x, 15 - y)[0]);
        }
    }

    #[test]
    fn garbage_bytes_are_undecodable() {
        assert!(matches!(
            decode_logo(b"definitely not an image"),
            Err(LogoUnavailable::Undecodable(_))
        ));
    }

    #[test]
    fn read_logo_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.bin");
        std::fs::File::create(&path).unwrap().write_all(b"abc").unwrap();

        assert_eq!(read_logo(&path).unwrap(), b"abc".to_vec());
        let err = read_logo(&dir.path().join("absent.png")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
