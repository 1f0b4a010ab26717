//! WeChat Official Account integration for wepress.
//!
//! This crate provides everything between finished markup and the platform:
//! - [`WechatClient`]: sync REST client for tokens, material, images,
//!   drafts, release and mass send
//! - [`multipart`]: hand-built `multipart/form-data` bodies for media upload
//! - [`images`]: Markdown image reference rewriting keyed by source path
//! - [`front`]: article front matter parsing
//!
//! # Example
//!
//! ```ignore
//! use wepress_wechat::{WechatClient, multipart::UploadKind};
//!
//! let client = WechatClient::login(wepress_wechat::DEFAULT_BASE_URL, "appid", "secret")?;
//! let cover = client.upload_material(UploadKind::Thumb, "cover", &bytes)?;
//! println!("cover media id: {}", cover.media_id);
//! ```

// API client
mod client;
pub use client::{DEFAULT_BASE_URL, Material, WechatClient};

// Multipart encoding
pub mod multipart;

// Image reference rewriting
pub mod images;

// Front matter
pub mod front;

// Request/response types
pub mod types;

// Errors
pub mod error;
pub use error::WechatError;
