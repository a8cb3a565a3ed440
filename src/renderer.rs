//! Per-frame orchestration of the lit cube scene.
//!
//! [`FrameRenderer`] implements the surface lifecycle: `on_surface_created`
//! (again after every context loss), then any number of
//! `on_surface_changed` and `on_draw_frame` calls. Every method, including
//! [`FrameRenderer::toggle_mode`], must run on the thread that owns the
//! graphics context. `toggle_mode` is not safe to call concurrently with
//! `on_draw_frame`; input handlers have to queue the toggle onto the render
//! thread so it lands between frames.

use std::fmt;

use glam::Mat4;

use crate::config::{CUBE_COUNT, CUBE_PLACEMENTS, CubePlacement, SceneConfig};
use crate::error::RenderError;
use crate::geometry::{AttributeKind, CUBE_VERTEX_COUNT, CubeGeometry, MATRIX_FLOATS};
use crate::gpu::{Capability, GlBackend, Primitive};
use crate::shader::{CubeProgram, ProgramSet, ShaderSourceProvider};
use crate::transform::{LIGHT_POS_MODEL_SPACE, TransformPipeline, angle_degrees, build_model_matrix};

/// Which cube program shades the scene.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum RenderMode {
    #[default]
    PerVertex,
    PerFragment,
}

impl RenderMode {
    pub fn toggled(self) -> Self {
        match self {
            RenderMode::PerVertex => RenderMode::PerFragment,
            RenderMode::PerFragment => RenderMode::PerVertex,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RenderMode::PerVertex => "per_vertex",
            RenderMode::PerFragment => "per_fragment",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cube model matrices for one frame, in placement-table order.
pub fn cube_model_matrices(angle_deg: f32) -> [Mat4; CUBE_COUNT] {
    CUBE_PLACEMENTS.map(|CubePlacement { translation, rotation_axis }| {
        build_model_matrix(translation, rotation_axis.map(|axis| (axis, angle_deg)))
    })
}

/// One vertex buffer object per cube attribute.
struct GeometryBuffers<B: GlBackend> {
    position: B::Buffer,
    color: B::Buffer,
    normal: B::Buffer,
}

impl<B: GlBackend> GeometryBuffers<B> {
    fn upload(gl: &B, geometry: &CubeGeometry) -> Result<Self, RenderError> {
        let upload = |kind: AttributeKind| -> Result<B::Buffer, RenderError> {
            let buffer = gl.create_buffer().ok_or(RenderError::BufferCreate)?;
            gl.bind_array_buffer(Some(&buffer));
            gl.upload_static_floats(geometry.attribute(kind));
            Ok(buffer)
        };
        let buffers = Self {
            position: upload(AttributeKind::Position)?,
            color: upload(AttributeKind::Color)?,
            normal: upload(AttributeKind::Normal)?,
        };
        gl.bind_array_buffer(None);
        Ok(buffers)
    }

    fn get(&self, kind: AttributeKind) -> &B::Buffer {
        match kind {
            AttributeKind::Position => &self.position,
            AttributeKind::Color => &self.color,
            AttributeKind::Normal => &self.normal,
        }
    }

    fn release(&self, gl: &B) {
        gl.delete_buffer(&self.position);
        gl.delete_buffer(&self.color);
        gl.delete_buffer(&self.normal);
    }
}

/// Everything that dies with the graphics context.
struct SurfaceResources<B: GlBackend> {
    programs: ProgramSet<B>,
    buffers: GeometryBuffers<B>,
}

impl<B: GlBackend> SurfaceResources<B> {
    fn release(self, gl: &B) {
        self.programs.release(gl);
        self.buffers.release(gl);
    }
}

pub struct FrameRenderer<B: GlBackend, S: ShaderSourceProvider> {
    gl: B,
    sources: S,
    config: SceneConfig,
    geometry: CubeGeometry,
    transforms: TransformPipeline,
    mode: RenderMode,
    surface: Option<SurfaceResources<B>>,
    frames_drawn: u64,
}

impl<B: GlBackend, S: ShaderSourceProvider> FrameRenderer<B, S> {
    pub fn new(gl: B, sources: S) -> Self {
        Self::with_config(gl, sources, SceneConfig::default())
    }

    pub fn with_config(gl: B, sources: S, config: SceneConfig) -> Self {
        Self {
            gl,
            sources,
            config,
            geometry: CubeGeometry::new(),
            transforms: TransformPipeline::new(),
            mode: RenderMode::default(),
            surface: None,
            frames_drawn: 0,
        }
    }

    /// (Re)builds all context-bound state.
    ///
    /// Nothing from a previous surface survives, even when this call fails.
    pub fn on_surface_created(&mut self) -> Result<(), RenderError> {
        if let Some(old) = self.surface.take() {
            log::debug!("releasing resources from previous surface");
            old.release(&self.gl);
        }

        self.gl.clear_color(self.config.clear_color);
        self.gl.enable(Capability::CullFace);
        self.gl.enable(Capability::DepthTest);

        self.transforms
            .set_camera(self.config.eye, self.config.look_at, self.config.up)?;

        let programs = ProgramSet::build(&self.gl, &self.sources)?;
        let buffers = match GeometryBuffers::upload(&self.gl, &self.geometry) {
            Ok(buffers) => buffers,
            Err(err) => {
                programs.release(&self.gl);
                return Err(err);
            }
        };

        self.surface = Some(SurfaceResources { programs, buffers });
        log::info!("surface created, mode {}", self.mode);
        Ok(())
    }

    /// Resizes the viewport and projection. A zero dimension is ignored.
    pub fn on_surface_changed(&mut self, width: u32, height: u32) {
        if !self.transforms.set_viewport(width, height, &self.config) {
            log::warn!("ignoring surface size {width}x{height}");
            return;
        }
        self.gl.viewport(0, 0, width as i32, height as i32);
        log::info!("surface changed to {width}x{height}");
    }

    /// Draws one frame for an absolute elapsed time in milliseconds.
    ///
    /// Skipped with a warning when no surface has been created.
    pub fn on_draw_frame(&mut self, time_ms: u64) {
        let Some(surface) = self.surface.as_ref() else {
            log::warn!("draw requested before surface creation");
            return;
        };
        let gl = &self.gl;

        gl.clear_color_and_depth();

        let angle = angle_degrees(time_ms, self.config.rotation_period_ms);

        let cube = match self.mode {
            RenderMode::PerVertex => &surface.programs.per_vertex,
            RenderMode::PerFragment => &surface.programs.per_fragment,
        };
        // The point program is current at the end of every frame.
        gl.use_program(&cube.program);

        let light_eye = self
            .transforms
            .compute_light_eye_position(time_ms, &self.config);
        let light_eye = [light_eye.x, light_eye.y, light_eye.z];

        for model in cube_model_matrices(angle) {
            draw_cube(gl, &self.transforms, &surface.buffers, cube, model, light_eye);
        }

        let point = &surface.programs.point;
        gl.use_program(&point.program);
        gl.bind_array_buffer(None);
        let position = LIGHT_POS_MODEL_SPACE;
        gl.vertex_attrib3f(point.bindings.position, [position.x, position.y, position.z]);
        gl.disable_vertex_attrib_array(point.bindings.position);
        let (_, mvp) = self
            .transforms
            .model_view_projection(self.transforms.light_model());
        gl.uniform_matrix4fv(&point.bindings.mvp_matrix, &to_array(mvp));
        gl.draw_arrays(Primitive::Points, 0, 1);

        self.frames_drawn += 1;
    }

    /// Flips between per-vertex and per-fragment lighting.
    ///
    /// Render thread only; see the module docs.
    pub fn toggle_mode(&mut self) -> RenderMode {
        self.mode = self.mode.toggled();
        log::info!("render mode set to {}", self.mode);
        self.mode
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn is_surface_ready(&self) -> bool {
        self.surface.is_some()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn transforms(&self) -> &TransformPipeline {
        &self.transforms
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn sources_mut(&mut self) -> &mut S {
        &mut self.sources
    }

    pub fn backend(&self) -> &B {
        &self.gl
    }
}

impl<B: GlBackend, S: ShaderSourceProvider> Drop for FrameRenderer<B, S> {
    fn drop(&mut self) {
        if let Some(surface) = self.surface.take() {
            surface.release(&self.gl);
        }
    }
}

fn draw_cube<B: GlBackend>(
    gl: &B,
    transforms: &TransformPipeline,
    buffers: &GeometryBuffers<B>,
    cube: &CubeProgram<B>,
    model: Mat4,
    light_eye: [f32; 3],
) {
    for (kind, location) in AttributeKind::ALL
        .into_iter()
        .zip(cube.bindings.attribute_locations())
    {
        gl.bind_array_buffer(Some(buffers.get(kind)));
        gl.vertex_attrib_pointer(location, kind.components() as i32, kind.stride() as i32, 0);
        gl.enable_vertex_attrib_array(location);
    }

    let (model_view, mvp) = transforms.model_view_projection(model);
    gl.uniform_matrix4fv(&cube.bindings.mv_matrix, &to_array(model_view));
    gl.uniform_matrix4fv(&cube.bindings.mvp_matrix, &to_array(mvp));
    gl.uniform3f(&cube.bindings.light_pos, light_eye);

    gl.draw_arrays(Primitive::Triangles, 0, CUBE_VERTEX_COUNT as i32);
}

fn to_array(matrix: Mat4) -> [f32; MATRIX_FLOATS] {
    matrix.to_cols_array()
}
