use crate::assets::SpriteImage;
use crate::assets::decode::{encode_png, png_data_url};
use crate::foundation::error::{GenerationError, SuggestionError};

/// What a generation model hands back.
///
/// Each provider family returns a different shape; every variant carries only the fields that
/// family actually produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelOutput {
    /// Artifact hosted remotely; fetched through [`GenerationService::fetch_artifact`].
    Hosted {
        /// Where the artifact can be downloaded.
        image_url: String,
    },
    /// Artifact inlined as a `data:<mime>;base64,` URL.
    Inline {
        /// The full `data:` URL.
        data_url: String,
    },
    /// Several candidates; the first one is used. Entries may be hosted or inline.
    Candidates {
        /// Candidate artifacts in provider order.
        image_urls: Vec<String>,
        /// Prompt as rewritten by the provider, if it did.
        revised_prompt: Option<String>,
    },
}

/// External creation collaborator.
///
/// Calls are the only suspension points of a generation job. Implementations own transport,
/// authentication and timeouts.
#[allow(async_fn_in_trait)]
pub trait GenerationService {
    /// Create an asset from a text prompt.
    async fn generate_from_text(&self, prompt: &str) -> Result<ModelOutput, GenerationError>;

    /// Create an asset from a source image plus an optional prompt.
    async fn generate_from_image(
        &self,
        source: &SpriteImage,
        prompt: &str,
    ) -> Result<ModelOutput, GenerationError>;

    /// Short alternate prompts for remixing `image`.
    async fn remix_suggestions(
        &self,
        image: &SpriteImage,
        instruction: &str,
    ) -> Result<Vec<String>, SuggestionError>;

    /// Download a hosted artifact.
    async fn fetch_artifact(&self, url: &str) -> Result<Vec<u8>, GenerationError> {
        Err(GenerationError::service(format!(
            "hosted artifacts are not supported ({url})"
        )))
    }
}

/// Offline service that hands image inputs straight back as inline PNGs.
///
/// Text prompts fail and no suggestions are offered. Used by the CLI to push local files through
/// the full generation pipeline.
#[derive(Clone, Copy, Debug, Default)]
pub struct EchoService;

impl GenerationService for EchoService {
    async fn generate_from_text(&self, prompt: &str) -> Result<ModelOutput, GenerationError> {
        Err(GenerationError::service(format!(
            "offline service cannot draw '{prompt}'"
        )))
    }

    async fn generate_from_image(
        &self,
        source: &SpriteImage,
        _prompt: &str,
    ) -> Result<ModelOutput, GenerationError> {
        let png = encode_png(source).map_err(|e| GenerationError::service(e.to_string()))?;
        Ok(ModelOutput::Inline {
            data_url: png_data_url(&png),
        })
    }

    async fn remix_suggestions(
        &self,
        _image: &SpriteImage,
        _instruction: &str,
    ) -> Result<Vec<String>, SuggestionError> {
        Err(SuggestionError::new("offline service has no suggestions"))
    }
}
