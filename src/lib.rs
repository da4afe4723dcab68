//! # qrcanvas
//!
//! A Rust library for rendering QR codes onto raster images of any size.
//!
//! `qrcanvas` encodes text into a QR symbol, maps its module grid onto a pixel surface of the
//! requested width and height, optionally layers the result over a background image at a given
//! offset, and serializes the final raster as BMP, JPEG or PNG into any [`std::io::Write`] sink.
//!
//! ## Features
//!
//! - Render to arbitrary target sizes, including non-square ones, without seams between modules.
//! - Composite the QR code over a background supplied as bytes or as any [`std::io::Read`].
//! - Encode as BMP, JPEG (with a 0–100 quality setting) or lossless PNG.
//! - Configurable error correction level (Low by default) and quiet zone (4 modules by default).
//! - Nothing is written to the sink unless the whole image encoded successfully.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qrcanvas = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! Generate a 300×300 PNG:
//!
//! ```rust
//! use qrcanvas::{Dimension, QrImage};
//!
//! let qr = QrImage::new("HELLO", Dimension::square(300)).unwrap();
//! let mut png = Vec::new();
//! qr.generate(&mut png).unwrap();
//! ```
//!
//! Place a 100×100 JPEG QR code on a background:
//!
//! ```rust
//! use qrcanvas::{Dimension, ImageFormat, QrImage};
//!
//! # let background = {
//! #     let img = image::RgbaImage::from_pixel(400, 300, image::Rgba([200, 30, 30, 255]));
//! #     qrcanvas::encode_to_vec(&img, ImageFormat::Png, 100).unwrap()
//! # };
//! let qr = QrImage::builder("https://example.com", Dimension::square(100))
//!     .format(ImageFormat::Jpeg)
//!     .quality(80)
//!     .build()
//!     .unwrap();
//!
//! let mut jpeg = Vec::new();
//! qr.generate_with_background_bytes(
//!     &mut jpeg,
//!     &background,
//!     Dimension::new(400, 300),
//!     Dimension::new(280, 180),
//! )
//! .unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`grid`]: Module grid produced by the QR encoder.
//! - [`render`]: Module grid to pixel surface.
//! - [`compose`]: Background decoding and compositing.
//! - [`codec`]: BMP/JPEG/PNG serialization.
//! - [`generator`]: The [`QrImage`] entry point.

#![forbid(unsafe_code)]

pub mod codec;
pub mod compose;
pub mod dimension;
pub mod error;
pub mod generator;
pub mod grid;
pub mod render;

pub use codec::{encode, encode_to_vec, ImageFormat};
pub use compose::{composite, decode_background, OverlayPolicy};
pub use dimension::Dimension;
pub use error::{CodecError, QrImageError, Result};
pub use generator::{OutputSpec, QrImage, QrImageBuilder};
pub use grid::{EccLevel, ModuleGrid};
pub use render::render;
