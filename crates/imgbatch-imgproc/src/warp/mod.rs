//! Geometric transformations of linearized images.
//!
//! This module provides:
//!
//! - [`AffineMap`], a 2D affine map with inversion and rotation builders
//! - [`warp_affine_linearized`] and [`transform`], nearest-neighbour resampling of one
//!   linearized image through an affine map
//!
//! # Examples
//!
//! Rotating a 100x50 image by 30 degrees around its centre:
//!
//! ```
//! use imgbatch_imgproc::warp::AffineMap;
//!
//! let forward = AffineMap::rotation((50.5, 25.5), 30.0, 1.0);
//! // the kernels sample through the inverse of the forward map
//! let sampling = forward.inverse().unwrap();
//! ```

mod affine;

pub use affine::{transform, warp_affine_linearized, AffineMap};

pub(crate) use affine::check_output_size;
