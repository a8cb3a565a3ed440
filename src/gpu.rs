use std::fmt;

use web_sys::{
    WebGlBuffer, WebGlProgram, WebGlRenderingContext as Gl, WebGlShader, WebGlUniformLocation,
};

use crate::geometry::MATRIX_FLOATS;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Capability {
    CullFace,
    DepthTest,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Primitive {
    Triangles,
    Points,
}

/// The GLES 2.0 subset the renderer issues.
///
/// All calls must come from the thread that owns the graphics context.
pub trait GlBackend {
    type Shader;
    type Program: Clone + PartialEq;
    type Buffer;
    type UniformLocation: Clone;

    fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader>;
    fn shader_source(&self, shader: &Self::Shader, source: &str);
    fn compile_shader(&self, shader: &Self::Shader);
    fn shader_compiled(&self, shader: &Self::Shader) -> bool;
    fn shader_info_log(&self, shader: &Self::Shader) -> Option<String>;
    fn delete_shader(&self, shader: &Self::Shader);

    fn create_program(&self) -> Option<Self::Program>;
    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader);
    fn bind_attrib_location(&self, program: &Self::Program, index: u32, name: &str);
    fn link_program(&self, program: &Self::Program);
    fn program_linked(&self, program: &Self::Program) -> bool;
    fn program_info_log(&self, program: &Self::Program) -> Option<String>;
    fn delete_program(&self, program: &Self::Program);
    fn use_program(&self, program: &Self::Program);

    fn uniform_location(&self, program: &Self::Program, name: &str)
    -> Option<Self::UniformLocation>;
    /// Returns `None` when the attribute is not active in the program.
    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32>;

    fn create_buffer(&self) -> Option<Self::Buffer>;
    fn bind_array_buffer(&self, buffer: Option<&Self::Buffer>);
    fn upload_static_floats(&self, data: &[f32]);
    fn delete_buffer(&self, buffer: &Self::Buffer);

    fn vertex_attrib_pointer(&self, location: u32, components: i32, stride: i32, offset: i32);
    fn enable_vertex_attrib_array(&self, location: u32);
    fn disable_vertex_attrib_array(&self, location: u32);
    fn vertex_attrib3f(&self, location: u32, value: [f32; 3]);

    fn uniform_matrix4fv(&self, location: &Self::UniformLocation, matrix: &[f32; MATRIX_FLOATS]);
    fn uniform3f(&self, location: &Self::UniformLocation, value: [f32; 3]);

    fn clear_color(&self, color: [f32; 4]);
    fn clear_color_and_depth(&self);
    fn enable(&self, capability: Capability);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn draw_arrays(&self, primitive: Primitive, first: i32, count: i32);
}

/// WebGL1 rendering context, the browser's GLES 2.0.
#[derive(Clone)]
pub struct WebGlBackend {
    gl: Gl,
}

impl WebGlBackend {
    pub fn new(gl: Gl) -> Self {
        Self { gl }
    }

    pub fn is_context_lost(&self) -> bool {
        self.gl.is_context_lost()
    }
}

impl GlBackend for WebGlBackend {
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type Buffer = WebGlBuffer;
    type UniformLocation = WebGlUniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Option<WebGlShader> {
        let shader_type = match stage {
            ShaderStage::Vertex => Gl::VERTEX_SHADER,
            ShaderStage::Fragment => Gl::FRAGMENT_SHADER,
        };
        self.gl.create_shader(shader_type)
    }

    fn shader_source(&self, shader: &WebGlShader, source: &str) {
        self.gl.shader_source(shader, source);
    }

    fn compile_shader(&self, shader: &WebGlShader) {
        self.gl.compile_shader(shader);
    }

    fn shader_compiled(&self, shader: &WebGlShader) -> bool {
        self.gl
            .get_shader_parameter(shader, Gl::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: &WebGlShader) -> Option<String> {
        self.gl.get_shader_info_log(shader)
    }

    fn delete_shader(&self, shader: &WebGlShader) {
        self.gl.delete_shader(Some(shader));
    }

    fn create_program(&self) -> Option<WebGlProgram> {
        self.gl.create_program()
    }

    fn attach_shader(&self, program: &WebGlProgram, shader: &WebGlShader) {
        self.gl.attach_shader(program, shader);
    }

    fn bind_attrib_location(&self, program: &WebGlProgram, index: u32, name: &str) {
        self.gl.bind_attrib_location(program, index, name);
    }

    fn link_program(&self, program: &WebGlProgram) {
        self.gl.link_program(program);
    }

    fn program_linked(&self, program: &WebGlProgram) -> bool {
        self.gl
            .get_program_parameter(program, Gl::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: &WebGlProgram) -> Option<String> {
        self.gl.get_program_info_log(program)
    }

    fn delete_program(&self, program: &WebGlProgram) {
        self.gl.delete_program(Some(program));
    }

    fn use_program(&self, program: &WebGlProgram) {
        self.gl.use_program(Some(program));
    }

    fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    fn attrib_location(&self, program: &WebGlProgram, name: &str) -> Option<u32> {
        u32::try_from(self.gl.get_attrib_location(program, name)).ok()
    }

    fn create_buffer(&self) -> Option<WebGlBuffer> {
        self.gl.create_buffer()
    }

    fn bind_array_buffer(&self, buffer: Option<&WebGlBuffer>) {
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, buffer);
    }

    fn upload_static_floats(&self, data: &[f32]) {
        // The view aliases wasm memory; no allocation may happen before the upload.
        let view = unsafe { js_sys::Float32Array::view(data) };
        self.gl
            .buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &view, Gl::STATIC_DRAW);
    }

    fn delete_buffer(&self, buffer: &WebGlBuffer) {
        self.gl.delete_buffer(Some(buffer));
    }

    fn vertex_attrib_pointer(&self, location: u32, components: i32, stride: i32, offset: i32) {
        self.gl
            .vertex_attrib_pointer_with_i32(location, components, Gl::FLOAT, false, stride, offset);
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        self.gl.enable_vertex_attrib_array(location);
    }

    fn disable_vertex_attrib_array(&self, location: u32) {
        self.gl.disable_vertex_attrib_array(location);
    }

    fn vertex_attrib3f(&self, location: u32, value: [f32; 3]) {
        self.gl.vertex_attrib3f(location, value[0], value[1], value[2]);
    }

    fn uniform_matrix4fv(&self, location: &WebGlUniformLocation, matrix: &[f32; MATRIX_FLOATS]) {
        self.gl
            .uniform_matrix4fv_with_f32_array(Some(location), false, matrix);
    }

    fn uniform3f(&self, location: &WebGlUniformLocation, value: [f32; 3]) {
        self.gl
            .uniform3f(Some(location), value[0], value[1], value[2]);
    }

    fn clear_color(&self, color: [f32; 4]) {
        self.gl.clear_color(color[0], color[1], color[2], color[3]);
    }

    fn clear_color_and_depth(&self) {
        self.gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
    }

    fn enable(&self, capability: Capability) {
        self.gl.enable(match capability {
            Capability::CullFace => Gl::CULL_FACE,
            Capability::DepthTest => Gl::DEPTH_TEST,
        });
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.gl.viewport(x, y, width, height);
    }

    fn draw_arrays(&self, primitive: Primitive, first: i32, count: i32) {
        let mode = match primitive {
            Primitive::Triangles => Gl::TRIANGLES,
            Primitive::Points => Gl::POINTS,
        };
        self.gl.draw_arrays(mode, first, count);
    }
}
