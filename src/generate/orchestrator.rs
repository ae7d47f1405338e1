use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Instant, SystemTime};

use crate::assets::SpriteImage;
use crate::assets::decode::{decode_data_url, decode_image, thumbnail};
use crate::assets::matte::{MatteParams, matte};
use crate::foundation::config::StageConfig;
use crate::foundation::core::{Point, Size};
use crate::foundation::error::{GenerationError, StageError, StageResult};
use crate::generate::service::{GenerationService, ModelOutput};
use crate::interact::controller::Intent;
use crate::scene::registry::SpriteRegistry;
use crate::scene::sprite::{
    Generation, GenerationTicket, Origin, Rendered, Sprite, SpriteId, SpriteState, fit_to_width,
};

/// How a finished job left the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The sprite is ready with fresh artwork.
    Ready(SpriteId),
    /// Generation failed and the sprite was removed.
    Removed(SpriteId, GenerationError),
    /// The sprite was deleted or re-targeted while the job was in flight; nothing was applied.
    Stale(SpriteId),
}

#[derive(Clone, Debug)]
enum Request {
    Text { prompt: String },
    Image { source: SpriteImage, prompt: String },
}

#[derive(Clone, Debug)]
struct JobSettings {
    target_width: f64,
    matte: MatteParams,
    suggestion_instruction: String,
}

/// Turns submissions into registry entries and [`GenerationJob`]s.
///
/// Submission is synchronous: the registry shows the pending sprite before any future is
/// polled. The returned job must be driven by the host (awaited, or spawned on a local task set).
pub struct Orchestrator<S> {
    registry: Rc<RefCell<SpriteRegistry>>,
    service: Rc<S>,
    settings: JobSettings,
    center: Point,
    placeholder: Size,
    preview_edge: u32,
}

impl<S: GenerationService> Orchestrator<S> {
    /// Orchestrator writing into `registry`, with sizes and matting taken from `cfg`.
    pub fn new(registry: Rc<RefCell<SpriteRegistry>>, service: S, cfg: &StageConfig) -> Self {
        Self {
            registry,
            service: Rc::new(service),
            settings: JobSettings {
                target_width: cfg.target_width,
                matte: MatteParams::new(cfg.matte_threshold),
                suggestion_instruction: cfg.suggestion_instruction.clone(),
            },
            center: cfg.canvas.center(),
            placeholder: Size::new(cfg.placeholder_size, cfg.placeholder_size),
            preview_edge: cfg.preview_size.round().max(1.0) as u32,
        }
    }

    /// The wrapped generation service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Place a pending sprite for `prompt` at the canvas centre.
    pub fn submit_text(&self, prompt: &str) -> StageResult<GenerationJob<S>> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(StageError::validation("prompt must not be empty"));
        }
        let (id, ticket) = self.insert_pending(Origin::Text(prompt.to_string()), prompt, None);
        tracing::debug!(id = id.0, prompt, "text generation submitted");
        Ok(self.job(
            id,
            ticket,
            Request::Text {
                prompt: prompt.to_string(),
            },
        ))
    }

    /// Place a pending sprite for an uploaded, pasted (`at = None`) or dropped image.
    ///
    /// Undecodable input is rejected before anything touches the registry.
    pub fn submit_image(
        &self,
        bytes: &[u8],
        prompt: &str,
        at: Option<Point>,
    ) -> StageResult<GenerationJob<S>> {
        let source = decode_image(bytes)?;
        let preview = thumbnail(&source, self.preview_edge)?;
        let prompt = prompt.trim();
        let (id, ticket) = self.insert_pending(Origin::Image(source.clone()), prompt, at);
        self.registry.borrow_mut().set_preview(id, preview);
        tracing::debug!(
            id = id.0,
            width = source.width,
            height = source.height,
            "image generation submitted"
        );
        Ok(self.job(
            id,
            ticket,
            Request::Image {
                source,
                prompt: prompt.to_string(),
            },
        ))
    }

    /// Regenerate `id` from its origin. `None` when the sprite is unknown or already generating.
    pub fn regenerate(&self, id: SpriteId) -> Option<GenerationJob<S>> {
        let request = {
            let reg = self.registry.borrow();
            let sprite = reg.get(id)?;
            match &sprite.origin {
                Origin::Text(prompt) => Request::Text {
                    prompt: prompt.clone(),
                },
                Origin::Image(source) => Request::Image {
                    source: source.clone(),
                    prompt: sprite.metadata.prompt.clone(),
                },
            }
        };
        let ticket = self.restart(id, None)?;
        Some(self.job(id, ticket, request))
    }

    /// Regenerate `id` from its current artwork plus `instruction`.
    pub fn remix(&self, id: SpriteId, instruction: &str) -> Option<GenerationJob<S>> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return None;
        }
        let source = self.registry.borrow().get(id)?.rendered()?.image.clone();
        let ticket = self.restart(id, Some(instruction.to_string()))?;
        Some(self.job(
            id,
            ticket,
            Request::Image {
                source,
                prompt: instruction.to_string(),
            },
        ))
    }

    /// Start the job an input asked for.
    pub fn dispatch(&self, intent: Intent) -> Option<GenerationJob<S>> {
        match intent {
            Intent::Regenerate(id) => self.regenerate(id),
            Intent::Remix { id, instruction } => self.remix(id, &instruction),
        }
    }

    fn insert_pending(
        &self,
        origin: Origin,
        prompt: &str,
        at: Option<Point>,
    ) -> (SpriteId, GenerationTicket) {
        let mut reg = self.registry.borrow_mut();
        let id = reg.allocate_id();
        let ticket = reg.allocate_ticket();
        let anchor = at.unwrap_or(self.center);
        let position = anchor - self.placeholder.to_vec2() / 2.0;
        reg.insert(Sprite::pending(
            id,
            origin,
            prompt,
            position,
            self.placeholder,
            ticket,
        ));
        (id, ticket)
    }

    fn restart(&self, id: SpriteId, remix_prompt: Option<String>) -> Option<GenerationTicket> {
        let mut reg = self.registry.borrow_mut();
        let previous = match reg.get(id)?.state.clone() {
            SpriteState::Ready(rendered) => rendered,
            SpriteState::Generating(_) => {
                tracing::debug!(id = id.0, "generation already in flight; request rejected");
                return None;
            }
        };
        let ticket = reg.allocate_ticket();
        reg.update(id, |s| {
            s.ticket = ticket;
            s.remix_suggestions.clear();
            s.state = SpriteState::Generating(Generation {
                ticket,
                previous: Some(previous),
                remix_prompt,
            });
        });
        Some(ticket)
    }

    fn job(&self, id: SpriteId, ticket: GenerationTicket, request: Request) -> GenerationJob<S> {
        GenerationJob {
            id,
            ticket,
            request,
            registry: Rc::clone(&self.registry),
            service: Rc::clone(&self.service),
            settings: self.settings.clone(),
            started: Instant::now(),
        }
    }
}

/// One in-flight generation for one sprite.
///
/// Holds no borrow of the registry across its suspension points; after every await it re-fetches
/// the sprite by id and ticket.
#[must_use = "a generation job does nothing until it is run"]
pub struct GenerationJob<S> {
    id: SpriteId,
    ticket: GenerationTicket,
    request: Request,
    registry: Rc<RefCell<SpriteRegistry>>,
    service: Rc<S>,
    settings: JobSettings,
    started: Instant,
}

impl<S> std::fmt::Debug for GenerationJob<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationJob")
            .field("id", &self.id)
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

impl<S: GenerationService> GenerationJob<S> {
    /// Sprite this job generates for.
    pub fn id(&self) -> SpriteId {
        self.id
    }

    /// Ticket the sprite must still carry for the result to apply.
    pub fn ticket(&self) -> GenerationTicket {
        self.ticket
    }

    /// Call the service, then apply the result if the sprite is still waiting for this job.
    #[tracing::instrument(skip(self), fields(id = self.id.0, ticket = self.ticket.0))]
    pub async fn run(self) -> GenerationOutcome {
        let result = self.produce().await;
        let (raw, revised_prompt) = match result {
            Ok(v) => v,
            Err(err) => return self.fail(err),
        };

        let m = matte(&raw, self.settings.matte);
        let applied = {
            let mut reg = self.registry.borrow_mut();
            if !self.is_current(&reg) {
                false
            } else {
                let size = fit_to_width(m.image.width, m.image.height, self.settings.target_width);
                let duration = self.started.elapsed();
                let rendered = Rendered {
                    image: m.image.clone(),
                    content_bounds: m.content_bounds,
                };
                reg.update(self.id, |s| {
                    let center = s.center();
                    s.base_size = size;
                    s.position = center - s.display_size().to_vec2() / 2.0;
                    s.state = SpriteState::Ready(rendered);
                    s.remix_suggestions.clear();
                    s.metadata.completed_at = Some(SystemTime::now());
                    s.metadata.duration = Some(duration);
                    if revised_prompt.is_some() {
                        s.metadata.revised_prompt = revised_prompt;
                    }
                });
                reg.set_original(self.id, raw);
                true
            }
        };
        if !applied {
            tracing::debug!("sprite changed while generating; result dropped");
            return GenerationOutcome::Stale(self.id);
        }
        tracing::info!(
            width = m.image.width,
            height = m.image.height,
            matted = m.matted,
            "sprite ready"
        );

        let suggestions = match self
            .service
            .remix_suggestions(&m.image, &self.settings.suggestion_instruction)
            .await
        {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(%err, "continuing without remix suggestions");
                Vec::new()
            }
        };
        let mut reg = self.registry.borrow_mut();
        let still_ours = reg
            .get(self.id)
            .is_some_and(|s| s.ticket == self.ticket && !s.is_generating());
        if still_ours {
            reg.update(self.id, |s| s.remix_suggestions = suggestions);
        }
        GenerationOutcome::Ready(self.id)
    }

    async fn produce(&self) -> Result<(SpriteImage, Option<String>), GenerationError> {
        let output = match &self.request {
            Request::Text { prompt } => self.service.generate_from_text(prompt).await?,
            Request::Image { source, prompt } => {
                self.service.generate_from_image(source, prompt).await?
            }
        };
        let (bytes, revised_prompt) = match output {
            ModelOutput::Hosted { image_url } => (self.fetch(&image_url).await?, None),
            ModelOutput::Inline { data_url } => (decode_data_url(&data_url)?, None),
            ModelOutput::Candidates {
                image_urls,
                revised_prompt,
            } => {
                let url = image_urls
                    .into_iter()
                    .find(|u| !u.trim().is_empty())
                    .ok_or(GenerationError::NoArtifact)?;
                let bytes = if url.starts_with("data:") {
                    decode_data_url(&url)?
                } else {
                    self.fetch(&url).await?
                };
                (bytes, revised_prompt)
            }
        };
        let image = decode_image(&bytes).map_err(|e| GenerationError::Decode(e.to_string()))?;
        Ok((image, revised_prompt))
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, GenerationError> {
        if url.trim().is_empty() {
            return Err(GenerationError::NoArtifact);
        }
        self.service.fetch_artifact(url).await
    }

    fn is_current(&self, reg: &SpriteRegistry) -> bool {
        reg.get(self.id)
            .is_some_and(|s| s.ticket == self.ticket && s.is_generating())
    }

    fn fail(self, err: GenerationError) -> GenerationOutcome {
        let mut reg = self.registry.borrow_mut();
        if !self.is_current(&reg) {
            tracing::debug!(%err, "generation failed for a sprite that is gone");
            return GenerationOutcome::Stale(self.id);
        }
        reg.remove(self.id);
        tracing::warn!(%err, "generation failed; sprite removed");
        GenerationOutcome::Removed(self.id, err)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/orchestrator.rs"]
mod tests;
