use std::io;
use thiserror::Error;

/// Failures of the QR pipeline. Every one of these aborts the request.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Payload is empty")]
    EmptyPayload,

    #[error("Payload of {len} bytes does not fit any QR version at error correction level H")]
    CapacityExceeded { len: usize },

    #[error("Logo ratio must lie strictly between 0 and 1, got {0}")]
    InvalidRatio(f32),

    #[error("Box size must be at least 1 pixel")]
    InvalidRenderOptions,

    #[error("Canvas would exceed the maximum size with box size {box_size} and border {border}")]
    CanvasTooLarge { box_size: u32, border: u32 },

    #[error("Failed to encode QR code: {0}")]
    Encode(qrcode::types::QrError),

    #[error("Failed to serialize image as PNG")]
    Serialization(#[source] image::ImageError),
}

/// Why the logo could not be placed. The QR code is still produced without it.
#[derive(Debug, Error)]
pub enum LogoUnavailable {
    #[error("No logo was supplied")]
    Missing,

    #[error("Logo file could not be read")]
    Unreadable(#[source] io::Error),

    #[error("Logo could not be decoded")]
    Undecodable(#[source] image::ImageError),

    #[error("Logo would be {width}x{height} pixels after resizing")]
    TooSmall { width: u32, height: u32 },
}
