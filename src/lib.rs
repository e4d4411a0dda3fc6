//! QR codes with a round logo composited in the centre.
//!
//! [`compose`] is the whole pipeline: encode at error correction level H,
//! render to an RGB canvas, paste the circularly masked logo at the
//! centre and serialize to PNG. [`docs`] can then place the PNG in a new
//! document.

pub mod compose;
pub mod docs;
pub mod error;
pub mod logo;
pub mod qr;
pub mod render;

pub use compose::{compose, compose_with_logo, ComposeOptions, Composition, Placement};
pub use error::{ComposeError, LogoUnavailable};
pub use render::RenderOptions;
