//! Hounsfield calibration, display windowing and image output

mod hu;
mod png;

pub use hu::{to_hu, window, MIN_WINDOW_SPAN};
pub use png::{save_png, to_gray_image};
