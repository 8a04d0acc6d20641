//! File service
//!
//! Uploads go straight to the configured file store; messages keep only the
//! returned reference.

use collab_core::{FileRef, Principal};
use tracing::{info, instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

const MAX_FILE_NAME_LENGTH: usize = 255;

/// File service
pub struct FileService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> FileService<'a> {
    /// Create a new FileService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Store a file and return its reference
    #[instrument(skip(self, actor, bytes), fields(user_id = %actor.user_id, size = bytes.len()))]
    pub async fn upload(
        &self,
        actor: &Principal,
        bytes: Vec<u8>,
        name: &str,
        mime: &str,
    ) -> ServiceResult<FileRef> {
        let name = sanitize_file_name(name)
            .ok_or_else(|| ServiceError::validation("File name is required"))?;
        if bytes.is_empty() {
            return Err(ServiceError::validation("File is empty"));
        }

        let limit = self.ctx.settings().max_file_size_bytes;
        if bytes.len() > limit {
            return Err(ServiceError::validation(format!(
                "File exceeds the {limit} byte limit"
            )));
        }

        let mime = if mime.trim().is_empty() {
            "application/octet-stream"
        } else {
            mime.trim()
        };

        let file = self.ctx.file_store().upload(bytes, &name, mime).await?;

        info!(url = %file.url, "File uploaded");

        Ok(file)
    }
}

/// Last path segment of a client-supplied name, without control characters
fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_FILE_NAME_LENGTH)
        .collect();
    let cleaned = cleaned.trim();
    (!cleaned.is_empty() && cleaned != "." && cleaned != "..").then(|| cleaned.to_string())
}
