//! LED output — pixel window layout, sink trait, APA102 encoding.

mod apa102;
mod layout;
mod sink;

pub use apa102::Apa102;
pub use layout::StripLayout;
pub use sink::{LedSink, mock};
