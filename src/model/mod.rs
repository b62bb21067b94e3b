pub mod api_version;
pub mod common;
pub mod document;
pub mod endpoint;
pub mod feedback;
pub mod profile;
pub mod project;

pub use api_version::*;
pub use common::*;
pub use document::*;
pub use endpoint::*;
pub use feedback::*;
pub use profile::*;
pub use project::*;
