use crate::error::RenderError;
use crate::gpu::GlBackend;
use crate::renderer::{FrameRenderer, RenderMode};
use crate::shader::{ProgramKind, ShaderLibrary, ShaderSourceProvider, parse_stage};

/// Host-side lifecycle around a [`FrameRenderer`]: pause gating, context
/// loss and runtime shader text.
pub struct SurfaceDriver<B: GlBackend, S: ShaderSourceProvider> {
    renderer: FrameRenderer<B, S>,
    paused: bool,
}

impl<B: GlBackend, S: ShaderSourceProvider> SurfaceDriver<B, S> {
    pub fn new(renderer: FrameRenderer<B, S>) -> Self {
        Self {
            renderer,
            paused: false,
        }
    }

    /// Re-enters surface creation and applies the current surface size.
    pub fn rebuild(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.renderer.on_surface_created()?;
        self.renderer.on_surface_changed(width, height);
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.on_surface_changed(width, height);
    }

    /// Returns `false` when the frame was held back by pause or context loss.
    pub fn draw_frame(&mut self, timestamp_ms: f64, context_lost: bool) -> bool {
        if self.paused {
            return false;
        }
        if context_lost {
            log::warn!("context lost, waiting for restore");
            return false;
        }
        // NaN and negative timestamps clamp to zero.
        self.renderer.on_draw_frame(timestamp_ms.max(0.0) as u64);
        true
    }

    pub fn toggle_mode(&mut self) -> RenderMode {
        self.renderer.toggle_mode()
    }

    pub fn mode(&self) -> RenderMode {
        self.renderer.mode()
    }

    pub fn pause(&mut self) {
        log::info!("rendering paused");
        self.paused = true;
    }

    pub fn resume(&mut self) {
        log::info!("rendering resumed");
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn renderer(&self) -> &FrameRenderer<B, S> {
        &self.renderer
    }
}

impl<B: GlBackend> SurfaceDriver<B, ShaderLibrary> {
    /// Replaces one shader's text. Takes effect on the next `rebuild`.
    ///
    /// `program` is one of `per_vertex`, `per_fragment`, `point`; `stage`
    /// is `vertex` or `fragment`.
    pub fn set_shader_source(
        &mut self,
        program: &str,
        stage: &str,
        source: &str,
    ) -> Result<(), RenderError> {
        let kind = ProgramKind::parse(program)
            .ok_or_else(|| RenderError::context(format!("unknown program `{program}`")))?;
        let stage = parse_stage(stage)
            .ok_or_else(|| RenderError::context(format!("unknown shader stage `{stage}`")))?;
        self.renderer.sources_mut().insert(kind, stage, source);
        Ok(())
    }
}
