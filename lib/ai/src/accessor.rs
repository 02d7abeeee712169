//! LLM accessor.
//!
//! Routes a request to an entrypoint by its attachment type:
//!
//! | attachment     | capability | default key                        |
//! |----------------|------------|------------------------------------|
//! | none / other   | text       | `default_entrypoint_key`           |
//! | `jpg`, `png`   | image      | `default_image_entrypoint_key`     |
//! | `pdf`, `csv`, `txt` | file  | `default_file_entrypoint_key`      |

use crate::backend::{Capability, EntryPoint, LlmCallProps, LlmMessage, Request, ResponseExt};
use crate::config::EntrypointsInfo;
use crate::error::LlmError;
use crate::registry::EntrypointRegistry;
use crate::retry::{RetryPolicy, any_result, call_with_retry, non_zero_vector};
use async_trait::async_trait;
use maestro_core::{FileStorage, ResourceId};
use rootcause::Report;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

const IMAGE_TYPES: &[(&str, &str)] = &[("jpg", "image/jpeg"), ("png", "image/png")];
const FILE_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("csv", "text/csv"),
    ("txt", "text/plain"),
];

fn mimetype(table: &[(&str, &'static str)], dtype: &str) -> Option<&'static str> {
    table.iter().find(|(ext, _)| *ext == dtype).map(|(_, mime)| *mime)
}

/// The LLM surface tracks depend on.
#[async_trait]
pub trait LlmApi: Send + Sync {
    /// Returns the completion text.
    ///
    /// # Errors
    ///
    /// Returns an error if no entrypoint resolves or every attempt fails.
    async fn get_response(
        &self,
        request: Request,
        props: &LlmCallProps,
    ) -> Result<String, Report<LlmError>> {
        Ok(self.get_response_ext(request, props).await?.text)
    }

    /// Returns the completion with the entrypoint that produced it.
    ///
    /// # Errors
    ///
    /// Returns an error if no entrypoint resolves or every attempt fails.
    async fn get_response_ext(
        &self,
        request: Request,
        props: &LlmCallProps,
    ) -> Result<ResponseExt, Report<LlmError>>;

    /// Returns an embedding with at least one non-zero component.
    ///
    /// # Errors
    ///
    /// Returns an error if no entrypoint resolves or every attempt fails.
    async fn get_embedding(
        &self,
        prompt: &str,
        props: &LlmCallProps,
    ) -> Result<Vec<f32>, Report<LlmError>>;

    /// Returns the public view of the configuration.
    fn get_entrypoints_config(&self) -> EntrypointsInfo;

    /// Returns the configured keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the key listing is unavailable.
    async fn get_entrypoint_keys(&self) -> Result<Vec<String>, Report<LlmError>>;
}

/// [`LlmApi`] over an [`EntrypointRegistry`] and a file store.
pub struct LlmAccessor {
    registry: EntrypointRegistry,
    files: Arc<dyn FileStorage>,
    retry: RetryPolicy,
}

impl LlmAccessor {
    /// Creates an accessor.
    #[must_use]
    pub fn new(registry: EntrypointRegistry, files: Arc<dyn FileStorage>, retry: RetryPolicy) -> Self {
        Self {
            registry,
            files,
            retry,
        }
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &EntrypointRegistry {
        &self.registry
    }

    fn policy(&self, props: &LlmCallProps) -> RetryPolicy {
        props
            .attempts
            .map_or(self.retry, |attempts| self.retry.with_attempts(attempts))
    }

    async fn entrypoint(
        &self,
        props: &LlmCallProps,
        capability: Capability,
    ) -> Result<Arc<dyn EntryPoint>, Report<LlmError>> {
        let default_key = self.registry.config().default_key_for(capability);
        let required = (capability != Capability::Text).then_some(capability);
        match self
            .registry
            .resolve_or_default(&props.entrypoint_key, default_key, required)
            .await
        {
            Some(entrypoint) => Ok(entrypoint),
            None => {
                error!(
                    key = %props.entrypoint_key,
                    default_key,
                    %capability,
                    "Failed to find entrypoint"
                );
                Err(LlmError::EntrypointNotFound {
                    key: props.entrypoint_key.clone(),
                    default_key: default_key.to_string(),
                    capability: required,
                }
                .into())
            }
        }
    }

    async fn text_response(
        &self,
        entrypoint: &dyn EntryPoint,
        messages: &[LlmMessage],
        attachments: &[String],
        props: &LlmCallProps,
    ) -> Result<ResponseExt, Report<LlmError>> {
        let title = format!("#get_response(entrypoint_key={})", entrypoint.key());
        let text = call_with_retry(
            &title,
            self.policy(props),
            || entrypoint.get_response(messages, attachments),
            any_result,
        )
        .await?;
        Ok(ResponseExt {
            text,
            entrypoint_key: entrypoint.key().to_string(),
        })
    }

    async fn download(&self, resource_id: &ResourceId) -> Result<Vec<u8>, Report<LlmError>> {
        self.files.download(resource_id).await.map_err(|e| {
            LlmError::BadRequest {
                reason: format!("resource {resource_id} unavailable: {e}"),
            }
            .into()
        })
    }

    async fn image_response(
        &self,
        messages: &[LlmMessage],
        resource_id: &ResourceId,
        mimetype: &str,
        props: &LlmCallProps,
    ) -> Result<ResponseExt, Report<LlmError>> {
        let entrypoint = self.entrypoint(props, Capability::Image).await?;
        if messages.len() > 1 {
            warn!(count = messages.len(), "One message expected for image request");
        }
        let prompt = messages.last().map(|m| m.content.as_str()).unwrap_or_default();
        let image = self.download(resource_id).await?;

        let title = format!("#get_image_response(entrypoint_key={})", entrypoint.key());
        let text = call_with_retry(
            &title,
            self.policy(props),
            || entrypoint.get_image_response(&image, mimetype, prompt),
            any_result,
        )
        .await?;
        debug!(key = entrypoint.key(), "Image response ready");
        Ok(ResponseExt {
            text,
            entrypoint_key: entrypoint.key().to_string(),
        })
    }

    /// Uploads a stored resource; failures are logged and yield `None`.
    async fn upload(
        &self,
        entrypoint: &dyn EntryPoint,
        resource_id: &ResourceId,
        mimetype: &str,
    ) -> Option<String> {
        let content = match self.download(resource_id).await {
            Ok(content) => content,
            Err(e) => {
                error!(%resource_id, error = %e, "Can not read resource for upload");
                return None;
            }
        };
        let name = self
            .files
            .fname(resource_id)
            .await
            .unwrap_or_else(|| resource_id.to_string());
        match entrypoint.upload_file(&name, content, mimetype).await {
            Ok(file_id) => {
                info!(%resource_id, file_id = %file_id, "Uploaded file");
                Some(file_id)
            }
            Err(e) => {
                warn!(%resource_id, error = %e, "Failed to upload file, sending without it");
                None
            }
        }
    }

    async fn file_response(
        &self,
        messages: &[LlmMessage],
        resource_id: &ResourceId,
        mimetype: &str,
        props: &LlmCallProps,
    ) -> Result<ResponseExt, Report<LlmError>> {
        let entrypoint = self.entrypoint(props, Capability::File).await?;
        let attachments: Vec<String> = self
            .upload(entrypoint.as_ref(), resource_id, mimetype)
            .await
            .into_iter()
            .collect();
        self.text_response(entrypoint.as_ref(), messages, &attachments, props)
            .await
    }
}

#[async_trait]
impl LlmApi for LlmAccessor {
    #[instrument(skip(self, request), fields(key = %props.entrypoint_key))]
    async fn get_response_ext(
        &self,
        request: Request,
        props: &LlmCallProps,
    ) -> Result<ResponseExt, Report<LlmError>> {
        let start = Instant::now();
        let messages = request.messages();
        let route = request.resource_id().and_then(|resource_id| {
            let dtype = self.files.dtype(resource_id)?;
            mimetype(IMAGE_TYPES, &dtype)
                .map(|mime| (Capability::Image, resource_id, mime))
                .or_else(|| {
                    mimetype(FILE_TYPES, &dtype).map(|mime| (Capability::File, resource_id, mime))
                })
        });

        let response = match route {
            Some((Capability::Image, resource_id, mime)) => {
                self.image_response(&messages, resource_id, mime, props).await
            }
            Some((Capability::File, resource_id, mime)) => {
                self.file_response(&messages, resource_id, mime, props).await
            }
            _ => {
                let entrypoint = self.entrypoint(props, Capability::Text).await?;
                self.text_response(entrypoint.as_ref(), &messages, &[], props)
                    .await
            }
        }?;

        info!(elapsed_secs = start.elapsed().as_secs_f64(), "Ready");
        Ok(response)
    }

    #[instrument(skip(self, prompt), fields(key = %props.entrypoint_key))]
    async fn get_embedding(
        &self,
        prompt: &str,
        props: &LlmCallProps,
    ) -> Result<Vec<f32>, Report<LlmError>> {
        let entrypoint = self.entrypoint(props, Capability::Embedding).await?;
        let title = format!("#get_embedding(entrypoint_key={})", entrypoint.key());
        call_with_retry(
            &title,
            self.policy(props),
            || entrypoint.get_embedding(prompt),
            non_zero_vector,
        )
        .await
    }

    fn get_entrypoints_config(&self) -> EntrypointsInfo {
        EntrypointsInfo::from(self.registry.config())
    }

    async fn get_entrypoint_keys(&self) -> Result<Vec<String>, Report<LlmError>> {
        Ok(self.registry.keys())
    }
}
