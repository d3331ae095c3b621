#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use georef_transform as transform;

#[doc(inline)]
pub use georef_io as io;
