//! Spritestage is the core of an isometric sprite editor for AI-generated assets.
//!
//! Generated rasters are matted into transparent sprites, placed in an ordered scene, hit-tested
//! against their visible pixels and rendered on the CPU:
//!
//! - [`Orchestrator`] turns prompts and images into sprites through a [`GenerationService`]
//! - [`InteractionController`] maps pointer and keyboard input onto the [`SpriteRegistry`]
//! - [`RenderLoop`] compiles the scene into a [`FramePlan`] and rasterizes it with a
//!   [`RenderBackend`]
//!
//! [`Editor`] wires all of them together for hosts.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod compile;
pub(crate) mod editor;
pub(crate) mod generate;
pub(crate) mod interact;
pub(crate) mod render;
pub(crate) mod scene;

pub use crate::assets::decode::{
    decode_data_url, decode_image, encode_png, png_data_url, thumbnail,
    unpremultiply_rgba8_in_place,
};
pub use crate::assets::export::{export_image, export_png};
pub use crate::assets::matte::{Matte, MatteParams, matte, try_matte_rgba8};
pub use crate::assets::{ImageId, SpriteImage};
pub use crate::compile::grid::{GridLine, isometric_grid};
pub use crate::compile::plan::{DrawOp, FramePlan, compile_frame, loader_text, wrap_words};
pub use crate::editor::Editor;
pub use crate::foundation::config::StageConfig;
pub use crate::foundation::core::{
    Affine, BezPath, Canvas, PixelRect, Point, Rect, Rgba8, Size, Vec2,
};
pub use crate::foundation::error::{
    GenerationError, MattingFailure, StageError, StageResult, SuggestionError,
};
pub use crate::generate::orchestrator::{GenerationJob, GenerationOutcome, Orchestrator};
pub use crate::generate::service::{EchoService, GenerationService, ModelOutput};
pub use crate::interact::controller::{Intent, InteractionController};
pub use crate::interact::events::{Cursor, InputEvent, Key};
pub use crate::render::backend::{
    BackendKind, FrameRGBA, RenderBackend, RenderSettings, create_backend,
};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::frame_loop::RenderLoop;
pub use crate::scene::hit::{hit_test, sprite_hit};
pub use crate::scene::registry::{SpritePatch, SpriteRegistry};
pub use crate::scene::sprite::{
    Generation, GenerationTicket, Origin, Phase, Rendered, ScaleFactor, Sprite, SpriteId,
    SpriteMetadata, SpriteState, fit_to_width,
};
