pub mod lifecycle;
pub mod renderer;
pub mod synthesizer;

pub use lifecycle::*;
pub use renderer::*;
pub use synthesizer::*;
