#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use imgbatch_image as image;

#[doc(inline)]
pub use imgbatch_imgproc as imgproc;

#[doc(inline)]
pub use imgbatch_io as io;
