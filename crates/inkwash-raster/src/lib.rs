//! Inkwash Raster Library
//!
//! CPU backend for the Inkwash engine: a tiny-skia paint surface the brush
//! pipeline draws through, plus PNG/data-URL codecs for snapshots.

pub mod codec;
pub mod surface;

pub use codec::{decode_image, encode_png, from_data_url, to_data_url, CodecError};
pub use surface::{SkiaSurface, SurfaceError};
