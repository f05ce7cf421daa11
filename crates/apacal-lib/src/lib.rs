//! apacal — mirror the color DisplayCAL's web interface asks for onto an
//! APA102 LED strip.

pub mod codec;
pub mod color;
pub mod config;
pub mod error;
pub mod led;
pub mod mirror;
pub mod reconnect;
pub mod stream;

pub use color::Color;
pub use error::ApacalError;
pub use stream::{ColorStream, StreamError};
