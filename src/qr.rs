use crate::error::ComposeError;
use log::debug;
use ndarray::Array2;
use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode, Version};

/// Fixed error correction level. Level H tolerates roughly 30% damaged
/// modules, which is the headroom the centre logo eats into.
pub const EC_LEVEL: EcLevel = EcLevel::H;

/// An encoded QR symbol: a square grid of modules, `true` meaning dark.
#[derive(Clone, Debug)]
pub struct QrSymbol {
    pub modules: Array2<bool>,
    pub version: i16,
    pub ec_level: EcLevel,
}

impl QrSymbol {
    /// Number of modules along one side.
    pub fn width(&self) -> usize {
        self.modules.nrows()
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.modules[[y, x]]
    }
}

/// Encode `payload` at level H, letting the encoder pick the smallest
/// version that fits.
pub fn encode(payload: &str) -> Result<QrSymbol, ComposeError> {
    if payload.is_empty() {
        return Err(ComposeError::EmptyPayload);
    }

    let code = QrCode::with_error_correction_level(payload, EC_LEVEL).map_err(|e| match e {
        QrError::DataTooLong => ComposeError::CapacityExceeded { len: payload.len() },
        other => ComposeError::Encode(other),
    })?;

    let version = match code.version() {
        Version::Normal(v) | Version::Micro(v) => v,
    };

    let width = code.width();
    let colors = code.to_colors();
    let modules = Array2::from_shape_fn((width, width), |(y, x)| {
        colors[y * width + x] == Color::Dark
    });

    debug!("Encoded {} bytes as version {version} ({width}x{width} modules)", payload.len());

    Ok(QrSymbol {
        modules,
        version,
        ec_level: code.error_correction_level(),
    })
}
