//! Material operations for the WeChat API.

use tracing::info;

use super::{WechatClient, check_status, read_response};
use crate::error::WechatError;
use crate::multipart::{self, UploadKind, mime_for_extension};
use crate::types::{MaterialList, MaterialResponse, UploadImageResponse};

/// An uploaded piece of permanent material.
#[derive(Debug, Clone)]
pub struct Material {
    /// Permanent media id.
    pub media_id: String,
    /// CDN URL, for image material.
    pub url: Option<String>,
}

impl WechatClient {
    /// Upload permanent material, returning its media id.
    pub fn upload_material(
        &self,
        kind: UploadKind,
        name: &str,
        data: &[u8],
    ) -> Result<Material, WechatError> {
        let url = format!("{}&type={}", self.api_url("material/add_material"), kind);

        info!(
            "Uploading {} material '{}' ({} bytes)",
            kind,
            name,
            data.len()
        );

        let body = multipart::material_body(kind, name, data);
        let content_type = body.content_type();
        let bytes = body.finish();

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", &content_type)
            .header("Accept", "*/*")
            .send(&bytes[..])
            .map_err(|e| WechatError::Http {
                status: 0,
                body: e.to_string(),
            })?;

        let resp: MaterialResponse = read_response(response)?;
        check_status(&resp.status)?;
        let media_id = resp.media_id.ok_or(WechatError::Api {
            errcode: -1,
            errmsg: "upload response without media_id".to_owned(),
        })?;
        Ok(Material {
            media_id,
            url: resp.url,
        })
    }

    /// Upload an in-article image, returning the rewritten CDN URL.
    ///
    /// Unlike permanent material, these do not count against the material
    /// quota and are only addressable through the returned URL.
    pub fn upload_image(&self, filename: &str, data: &[u8]) -> Result<String, WechatError> {
        let url = self.api_url("media/uploadimg");

        info!("Uploading article image '{}' ({} bytes)", filename, data.len());

        let ext = filename.rsplit('.').next().unwrap_or("png");
        let mut body = multipart::MultipartBody::new();
        body.file_part("media", filename, mime_for_extension(ext), data);
        let content_type = body.content_type();
        let bytes = body.finish();

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", &content_type)
            .header("Accept", "*/*")
            .send(&bytes[..])
            .map_err(|e| WechatError::Http {
                status: 0,
                body: e.to_string(),
            })?;

        let resp: UploadImageResponse = read_response(response)?;
        check_status(&resp.status)?;
        resp.url.ok_or(WechatError::Api {
            errcode: -1,
            errmsg: "image upload response without url".to_owned(),
        })
    }

    /// List permanent material of one kind (used for cover picking).
    pub fn list_materials(
        &self,
        kind: UploadKind,
        offset: u32,
        count: u32,
    ) -> Result<MaterialList, WechatError> {
        let url = self.api_url("material/batchget_material");

        info!("Listing {} materials (offset={}, count={})", kind, offset, count);

        let payload = serde_json::json!({
            "type": kind.as_str(),
            "offset": offset,
            "count": count,
        });
        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])
            .map_err(|e| WechatError::Http {
                status: 0,
                body: e.to_string(),
            })?;

        let list: MaterialList = read_response(response)?;
        check_status(&list.status)?;
        Ok(list)
    }
}
