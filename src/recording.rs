//! Test backend that records every call instead of talking to a GPU.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::geometry::MATRIX_FLOATS;
use crate::gpu::{Capability, GlBackend, Primitive, ShaderStage};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GlCall {
    CreateShader(u32, ShaderStage),
    DeleteShader(u32),
    CreateProgram(u32),
    BindAttribLocation { program: u32, index: u32, name: String },
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(u32),
    CreateBuffer(u32),
    BindArrayBuffer(Option<u32>),
    BufferData { buffer: Option<u32>, len: usize },
    DeleteBuffer(u32),
    VertexAttribPointer { location: u32, components: i32, stride: i32, offset: i32 },
    EnableVertexAttribArray(u32),
    DisableVertexAttribArray(u32),
    VertexAttrib3f { location: u32, value: [f32; 3] },
    UniformMatrix4 { location: u32, value: [f32; MATRIX_FLOATS] },
    Uniform3f { location: u32, value: [f32; 3] },
    ClearColor([f32; 4]),
    Clear,
    Enable(Capability),
    Viewport { x: i32, y: i32, width: i32, height: i32 },
    DrawArrays { primitive: Primitive, first: i32, count: i32 },
}

/// Uniform locations are `program * 100 + n`, so locations from different
/// programs never collide.
pub(crate) struct RecordingBackend {
    calls: Rc<RefCell<Vec<GlCall>>>,
    next_handle: Cell<u32>,
    sources: RefCell<HashMap<u32, String>>,
    attributes: RefCell<HashMap<u32, Vec<(u32, String)>>>,
    uniforms: RefCell<HashMap<u32, Vec<String>>>,
    bound_buffer: Cell<Option<u32>>,
    fail_link: bool,
    no_handles: bool,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        Self {
            calls: Rc::new(RefCell::new(Vec::new())),
            next_handle: Cell::new(1),
            sources: RefCell::new(HashMap::new()),
            attributes: RefCell::new(HashMap::new()),
            uniforms: RefCell::new(HashMap::new()),
            bound_buffer: Cell::new(None),
            fail_link: false,
            no_handles: false,
        }
    }

    pub(crate) fn failing_link(mut self) -> Self {
        self.fail_link = true;
        self
    }

    pub(crate) fn without_handles(mut self) -> Self {
        self.no_handles = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<GlCall> {
        self.calls.borrow().clone()
    }

    /// Shared handle to the call log; stays readable after the backend is dropped.
    pub(crate) fn call_log(&self) -> Rc<RefCell<Vec<GlCall>>> {
        Rc::clone(&self.calls)
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub(crate) fn uniform_name(&self, location: u32) -> Option<String> {
        let uniforms = self.uniforms.borrow();
        let names = uniforms.get(&(location / 100))?;
        names.get((location % 100) as usize).cloned()
    }

    fn record(&self, call: GlCall) {
        self.calls.borrow_mut().push(call);
    }

    fn allocate(&self) -> Option<u32> {
        if self.no_handles {
            return None;
        }
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        Some(handle)
    }
}

impl GlBackend for RecordingBackend {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type UniformLocation = u32;

    fn create_shader(&self, stage: ShaderStage) -> Option<u32> {
        let handle = self.allocate()?;
        self.record(GlCall::CreateShader(handle, stage));
        Some(handle)
    }

    fn shader_source(&self, shader: &u32, source: &str) {
        self.sources.borrow_mut().insert(*shader, source.to_string());
    }

    fn compile_shader(&self, _shader: &u32) {}

    fn shader_compiled(&self, shader: &u32) -> bool {
        self.sources
            .borrow()
            .get(shader)
            .is_some_and(|source| !source.contains("#error"))
    }

    fn shader_info_log(&self, shader: &u32) -> Option<String> {
        let sources = self.sources.borrow();
        let line = sources.get(shader)?.lines().find(|l| l.contains("#error"))?;
        Some(format!("ERROR: 0:1: '{}'", line.trim()))
    }

    fn delete_shader(&self, shader: &u32) {
        self.record(GlCall::DeleteShader(*shader));
    }

    fn create_program(&self) -> Option<u32> {
        let handle = self.allocate()?;
        self.record(GlCall::CreateProgram(handle));
        Some(handle)
    }

    fn attach_shader(&self, _program: &u32, _shader: &u32) {}

    fn bind_attrib_location(&self, program: &u32, index: u32, name: &str) {
        self.attributes
            .borrow_mut()
            .entry(*program)
            .or_default()
            .push((index, name.to_string()));
        self.record(GlCall::BindAttribLocation {
            program: *program,
            index,
            name: name.to_string(),
        });
    }

    fn link_program(&self, program: &u32) {
        self.record(GlCall::LinkProgram(*program));
    }

    fn program_linked(&self, _program: &u32) -> bool {
        !self.fail_link
    }

    fn program_info_log(&self, _program: &u32) -> Option<String> {
        Some("ERROR: vertex and fragment varyings do not match".into())
    }

    fn delete_program(&self, program: &u32) {
        self.record(GlCall::DeleteProgram(*program));
    }

    fn use_program(&self, program: &u32) {
        self.record(GlCall::UseProgram(*program));
    }

    fn uniform_location(&self, program: &u32, name: &str) -> Option<u32> {
        let mut uniforms = self.uniforms.borrow_mut();
        let names = uniforms.entry(*program).or_default();
        let slot = match names.iter().position(|n| n == name) {
            Some(slot) => slot,
            None => {
                names.push(name.to_string());
                names.len() - 1
            }
        };
        Some(program * 100 + slot as u32)
    }

    fn attrib_location(&self, program: &u32, name: &str) -> Option<u32> {
        self.attributes
            .borrow()
            .get(program)?
            .iter()
            .find(|(_, n)| n == name)
            .map(|(index, _)| *index)
    }

    fn create_buffer(&self) -> Option<u32> {
        let handle = self.allocate()?;
        self.record(GlCall::CreateBuffer(handle));
        Some(handle)
    }

    fn bind_array_buffer(&self, buffer: Option<&u32>) {
        self.bound_buffer.set(buffer.copied());
        self.record(GlCall::BindArrayBuffer(buffer.copied()));
    }

    fn upload_static_floats(&self, data: &[f32]) {
        self.record(GlCall::BufferData {
            buffer: self.bound_buffer.get(),
            len: data.len(),
        });
    }

    fn delete_buffer(&self, buffer: &u32) {
        self.record(GlCall::DeleteBuffer(*buffer));
    }

    fn vertex_attrib_pointer(&self, location: u32, components: i32, stride: i32, offset: i32) {
        self.record(GlCall::VertexAttribPointer {
            location,
            components,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        self.record(GlCall::EnableVertexAttribArray(location));
    }

    fn disable_vertex_attrib_array(&self, location: u32) {
        self.record(GlCall::DisableVertexAttribArray(location));
    }

    fn vertex_attrib3f(&self, location: u32, value: [f32; 3]) {
        self.record(GlCall::VertexAttrib3f { location, value });
    }

    fn uniform_matrix4fv(&self, location: &u32, matrix: &[f32; MATRIX_FLOATS]) {
        self.record(GlCall::UniformMatrix4 {
            location: *location,
            value: *matrix,
        });
    }

    fn uniform3f(&self, location: &u32, value: [f32; 3]) {
        self.record(GlCall::Uniform3f {
            location: *location,
            value,
        });
    }

    fn clear_color(&self, color: [f32; 4]) {
        self.record(GlCall::ClearColor(color));
    }

    fn clear_color_and_depth(&self) {
        self.record(GlCall::Clear);
    }

    fn enable(&self, capability: Capability) {
        self.record(GlCall::Enable(capability));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn draw_arrays(&self, primitive: Primitive, first: i32, count: i32) {
        self.record(GlCall::DrawArrays {
            primitive,
            first,
            count,
        });
    }
}
