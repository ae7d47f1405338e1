use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::assets::export::export_png;
use crate::compile::plan::FramePlan;
use crate::foundation::config::StageConfig;
use crate::foundation::core::Point;
use crate::foundation::error::{StageError, StageResult};
use crate::generate::orchestrator::{GenerationJob, Orchestrator};
use crate::generate::service::GenerationService;
use crate::interact::controller::InteractionController;
use crate::interact::events::{Cursor, InputEvent};
use crate::render::backend::{BackendKind, FrameRGBA, RenderBackend, RenderSettings, create_backend};
use crate::render::frame_loop::RenderLoop;
use crate::scene::registry::SpriteRegistry;

/// One editing session: scene state plus everything that reads or mutates it.
///
/// All calls are synchronous. Methods that start generation hand back a [`GenerationJob`]; the
/// host drives it on the same thread (for example with `tokio::task::spawn_local`).
pub struct Editor<S> {
    config: StageConfig,
    registry: Rc<RefCell<SpriteRegistry>>,
    controller: InteractionController,
    orchestrator: Orchestrator<S>,
    render_loop: RenderLoop,
    backend: Box<dyn RenderBackend>,
}

impl<S: GenerationService> Editor<S> {
    /// Validate `config` and build a session with the CPU backend.
    pub fn new(config: StageConfig, service: S) -> StageResult<Self> {
        config.validate()?;
        let settings = RenderSettings {
            font_path: config.font_path.clone(),
        };
        let backend = create_backend(BackendKind::Cpu, &settings)?;
        let registry = Rc::new(RefCell::new(SpriteRegistry::new()));
        Ok(Self {
            controller: InteractionController::new(&config),
            orchestrator: Orchestrator::new(Rc::clone(&registry), service, &config),
            render_loop: RenderLoop::new(&config),
            registry,
            backend,
            config,
        })
    }

    /// Validated session configuration.
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Read access to the scene. Do not hold the guard across an await.
    pub fn registry(&self) -> Ref<'_, SpriteRegistry> {
        self.registry.borrow()
    }

    /// Pointer affordance for the host to display.
    pub fn cursor(&self) -> Cursor {
        self.controller.cursor()
    }

    /// Apply one input event; shortcuts that regenerate return the job to drive.
    pub fn handle_input(&mut self, event: InputEvent) -> Option<GenerationJob<S>> {
        let intent = {
            let mut reg = self.registry.borrow_mut();
            self.controller.handle(&mut reg, event)
        }?;
        self.orchestrator.dispatch(intent)
    }

    /// Remix the selected sprite with `instruction`.
    pub fn remix_selected(&mut self, instruction: &str) -> Option<GenerationJob<S>> {
        let intent = {
            let reg = self.registry.borrow();
            self.controller.remix(&reg, instruction)
        }?;
        self.orchestrator.dispatch(intent)
    }

    /// Place a pending sprite for a text prompt.
    pub fn submit_prompt(&self, prompt: &str) -> StageResult<GenerationJob<S>> {
        self.orchestrator.submit_text(prompt)
    }

    /// Upload or paste (`at = None`), or drop at `at`.
    pub fn submit_image(
        &self,
        bytes: &[u8],
        prompt: &str,
        at: Option<Point>,
    ) -> StageResult<GenerationJob<S>> {
        self.orchestrator.submit_image(bytes, prompt, at)
    }

    /// Feed elapsed host time; returns whether a redraw is due.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.render_loop.advance(dt);
        self.needs_redraw()
    }

    /// Whether the last frame is out of date.
    pub fn needs_redraw(&self) -> bool {
        self.render_loop.needs_redraw(&self.registry.borrow())
    }

    /// Compile the current frame without rasterizing it.
    pub fn plan_frame(&mut self) -> FramePlan {
        self.render_loop.plan(&self.registry.borrow(), &self.config)
    }

    /// Compile and rasterize the current frame (premultiplied RGBA8).
    pub fn render_frame(&mut self) -> StageResult<FrameRGBA> {
        let reg = self.registry.borrow();
        self.render_loop
            .render(&reg, &self.config, self.backend.as_mut())
    }

    /// PNG of the selected sprite.
    pub fn export_selected(&self) -> StageResult<Vec<u8>> {
        let reg = self.registry.borrow();
        let sprite = reg
            .selected()
            .ok_or_else(|| StageError::validation("nothing is selected"))?;
        export_png(sprite)
    }

    /// Remove every sprite. In-flight jobs become stale.
    pub fn reset(&mut self) {
        let mut reg = self.registry.borrow_mut();
        self.controller.reset(&mut reg);
        tracing::info!("canvas reset");
    }
}

#[cfg(test)]
#[path = "../tests/unit/editor.rs"]
mod tests;
