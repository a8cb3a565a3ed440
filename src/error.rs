//! Error type shared by the shader, context and renderer modules.
//!
//! Every variant is an initialization failure. Frame drawing has no error
//! path once the program set is built.

use wasm_bindgen::JsValue;

use crate::gpu::ShaderStage;
use crate::shader::ProgramKind;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("failed to create {0} shader")]
    ShaderCreate(ShaderStage),

    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("failed to create program")]
    ProgramCreate,

    #[error("{program} program failed to link: {log}")]
    ProgramLink { program: ProgramKind, log: String },

    #[error("{program} program is missing {kind} `{name}`")]
    MissingBinding {
        program: ProgramKind,
        kind: &'static str,
        name: &'static str,
    },

    #[error("no {stage} shader source for {program} program")]
    MissingShaderSource {
        program: ProgramKind,
        stage: ShaderStage,
    },

    #[error("failed to create vertex buffer")]
    BufferCreate,

    #[error("invalid camera: {0}")]
    InvalidCamera(&'static str),

    #[error("{0}")]
    Context(String),
}

impl RenderError {
    fn category(&self) -> &'static str {
        match self {
            RenderError::ShaderCreate(_)
            | RenderError::ShaderCompile { .. }
            | RenderError::MissingShaderSource { .. } => "Shader",
            RenderError::ProgramCreate
            | RenderError::ProgramLink { .. }
            | RenderError::MissingBinding { .. } => "Program",
            RenderError::BufferCreate => "Buffer",
            RenderError::InvalidCamera(_) => "Camera",
            RenderError::Context(_) => "Context",
        }
    }

    /// Converts into a JS exception value prefixed with the error category.
    pub fn to_js_value(&self) -> JsValue {
        JsValue::from_str(&format!("[{}] {}", self.category(), self))
    }

    pub fn context<T: ToString>(msg: T) -> Self {
        RenderError::Context(msg.to_string())
    }

    /// True for failures that carry a compiler or linker diagnostic.
    pub fn has_diagnostic(&self) -> bool {
        matches!(
            self,
            RenderError::ShaderCompile { .. } | RenderError::ProgramLink { .. }
        )
    }
}

impl From<RenderError> for JsValue {
    fn from(err: RenderError) -> Self {
        err.to_js_value()
    }
}
