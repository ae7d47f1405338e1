use std::time::Duration;

use crate::compile::plan::{FramePlan, compile_frame};
use crate::foundation::config::StageConfig;
use crate::foundation::error::StageResult;
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::scene::registry::SpriteRegistry;

/// Drives redraws from registry revisions and the animation tick.
///
/// The tick advances in fixed `tick_interval` steps of host time, so loader and suggestion
/// animation speed does not depend on how often the host calls [`RenderLoop::advance`].
#[derive(Clone, Debug)]
pub struct RenderLoop {
    tick_interval: Duration,
    carry: Duration,
    tick: u64,
    drawn: Option<(u64, u64)>,
}

impl RenderLoop {
    /// Loop ticking every `cfg.tick_interval_ms`; the first frame always needs drawing.
    pub fn new(cfg: &StageConfig) -> Self {
        Self {
            tick_interval: cfg.tick_interval().max(Duration::from_millis(1)),
            carry: Duration::ZERO,
            tick: 0,
            drawn: None,
        }
    }

    /// Current animation tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Feed elapsed host time. Returns how many ticks elapsed.
    pub fn advance(&mut self, dt: Duration) -> u64 {
        let carry = self.carry.as_nanos() + dt.as_nanos();
        let interval = self.tick_interval.as_nanos();
        let n = carry / interval;
        let rest = carry % interval;
        self.carry = Duration::from_nanos(u64::try_from(rest).unwrap_or(u64::MAX));
        let n = u64::try_from(n).unwrap_or(u64::MAX);
        self.tick = self.tick.wrapping_add(n);
        n
    }

    /// Whether the last drawn frame is out of date.
    ///
    /// Tick changes only matter while something on screen animates.
    pub fn needs_redraw(&self, reg: &SpriteRegistry) -> bool {
        match self.drawn {
            None => true,
            Some((revision, tick)) => {
                revision != reg.revision() || (tick != self.tick && is_animating(reg))
            }
        }
    }

    /// Force the next [`RenderLoop::needs_redraw`] to report `true`.
    pub fn invalidate(&mut self) {
        self.drawn = None;
    }

    /// Compile the current frame and mark it drawn.
    pub fn plan(&mut self, reg: &SpriteRegistry, cfg: &StageConfig) -> FramePlan {
        self.drawn = Some((reg.revision(), self.tick));
        compile_frame(reg, cfg, self.tick)
    }

    /// Compile and rasterize the current frame.
    pub fn render(
        &mut self,
        reg: &SpriteRegistry,
        cfg: &StageConfig,
        backend: &mut dyn RenderBackend,
    ) -> StageResult<FrameRGBA> {
        let plan = self.plan(reg, cfg);
        backend.render_plan(&plan)
    }
}

/// Loaders spin while any sprite generates; suggestions cycle under a selected sprite.
pub(crate) fn is_animating(reg: &SpriteRegistry) -> bool {
    reg.iter().any(|s| s.is_generating())
        || reg
            .selected()
            .is_some_and(|s| !s.is_generating() && s.remix_suggestions.len() > 1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame_loop.rs"]
mod tests;
