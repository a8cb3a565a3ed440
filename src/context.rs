use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, WebGlRenderingContext as Gl};

use crate::error::RenderError;
use crate::gpu::WebGlBackend;

/// A canvas element and its WebGL1 context.
pub(crate) struct CanvasContext {
    canvas: HtmlCanvasElement,
    gl: Gl,
}

impl CanvasContext {
    pub(crate) fn new(canvas_id: &str) -> Result<Self, RenderError> {
        let window = web_sys::window().ok_or_else(|| RenderError::context("missing window"))?;
        let document = window
            .document()
            .ok_or_else(|| RenderError::context("missing document"))?;
        let element = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| RenderError::context(format!("canvas `{canvas_id}` not found")))?;
        let canvas = element
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| RenderError::context("element is not a canvas"))?;

        let gl: Gl = canvas
            .get_context("webgl")
            .map_err(|_| RenderError::context("webgl context request failed"))?
            .ok_or_else(|| RenderError::context("webgl context unavailable"))?
            .dyn_into()
            .map_err(|_| RenderError::context("failed to cast WebGL context"))?;

        Ok(CanvasContext { canvas, gl })
    }

    pub(crate) fn backend(&self) -> WebGlBackend {
        WebGlBackend::new(self.gl.clone())
    }

    pub(crate) fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    /// Resizes the backing store. Zero dimensions are passed through so the
    /// renderer can decide to ignore them.
    pub(crate) fn resize(&self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }
}
