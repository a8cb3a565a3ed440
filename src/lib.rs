use wasm_bindgen::prelude::*;

mod config;
mod context;
mod driver;
mod error;
mod geometry;
mod gpu;
mod logging;
#[cfg(test)]
mod recording;
mod renderer;
mod shader;
mod transform;

pub use config::SceneConfig;
pub use driver::SurfaceDriver;
pub use error::RenderError;
pub use geometry::MATRIX_FLOATS;
pub use gpu::{Capability, GlBackend, Primitive, ShaderStage, WebGlBackend};
pub use logging::{LoggingConfig, init_logging};
pub use renderer::{FrameRenderer, RenderMode};
pub use shader::{EmbeddedShaders, ProgramKind, ShaderLibrary, ShaderSourceProvider};
pub use transform::{FrustumExtents, TransformPipeline};

use context::CanvasContext;

/// Browser driver: owns the canvas and forwards the page's lifecycle,
/// animation-frame and input callbacks to the [`FrameRenderer`].
///
/// JS is single threaded, so `toggle_mode` always lands between frames.
#[wasm_bindgen]
pub struct CubeDemo {
    context: CanvasContext,
    driver: SurfaceDriver<WebGlBackend, ShaderLibrary>,
}

#[wasm_bindgen]
impl CubeDemo {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<CubeDemo, JsValue> {
        init_logging(LoggingConfig::default());

        let context = CanvasContext::new(canvas_id)?;
        let renderer = FrameRenderer::new(context.backend(), ShaderLibrary::with_embedded());
        let mut demo = CubeDemo {
            context,
            driver: SurfaceDriver::new(renderer),
        };
        demo.rebuild()?;
        Ok(demo)
    }

    /// Re-enters surface creation, e.g. after `webglcontextrestored` or
    /// after replacing shader text.
    pub fn rebuild(&mut self) -> Result<(), JsValue> {
        let (width, height) = self.context.size();
        self.driver.rebuild(width, height)?;
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        self.driver.resize(width, height);
    }

    /// `timestamp_ms` is the elapsed time handed to `requestAnimationFrame`
    /// callbacks.
    pub fn draw_frame(&mut self, timestamp_ms: f64) {
        let lost = self.driver.renderer().backend().is_context_lost();
        self.driver.draw_frame(timestamp_ms, lost);
    }

    pub fn toggle_mode(&mut self) -> String {
        self.driver.toggle_mode().to_string()
    }

    pub fn mode(&self) -> String {
        self.driver.mode().to_string()
    }

    pub fn pause(&mut self) {
        self.driver.pause();
    }

    pub fn resume(&mut self) {
        self.driver.resume();
    }

    /// See [`SurfaceDriver::set_shader_source`].
    pub fn set_shader_source(
        &mut self,
        program: &str,
        stage: &str,
        source: &str,
    ) -> Result<(), JsValue> {
        self.driver.set_shader_source(program, stage, source)?;
        Ok(())
    }

    pub fn frames_drawn(&self) -> f64 {
        self.driver.renderer().frames_drawn() as f64
    }
}
