//! CLI command implementations.

pub mod preview;
pub mod publish;
pub mod release;
pub mod upload;

pub use preview::PreviewArgs;
pub use publish::PublishArgs;
pub use release::ReleaseArgs;
pub use upload::UploadArgs;
