pub mod encoder;
pub mod index;

pub use encoder::TextEncoder;
pub use index::VectorIndex;
