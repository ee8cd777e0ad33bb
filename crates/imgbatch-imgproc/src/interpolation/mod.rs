//! Pixel sampling for geometric transformations.
//!
//! Only nearest-neighbour sampling is provided: a transformed coordinate is rounded to the
//! closest pixel and the pixel value is copied without blending. Ties at exact
//! half-integers are rounded up, see [`round_half_up`].

mod nearest;

pub use nearest::{nearest_index, nearest_pixel, round_half_up};
