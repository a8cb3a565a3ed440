use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use crate::error::RenderError;
use crate::gpu::{GlBackend, ShaderStage};

pub const POSITION_ATTRIBUTE: &str = "a_position";
pub const COLOR_ATTRIBUTE: &str = "a_color";
pub const NORMAL_ATTRIBUTE: &str = "a_normal";
pub const MVP_UNIFORM: &str = "u_mvp_matrix";
pub const MV_UNIFORM: &str = "u_mv_matrix";
pub const LIGHT_POS_UNIFORM: &str = "u_light_pos";

/// Attribute names in location order. Position is always location 0.
pub const CUBE_ATTRIBUTES: [&str; 3] = [POSITION_ATTRIBUTE, COLOR_ATTRIBUTE, NORMAL_ATTRIBUTE];
pub const POINT_ATTRIBUTES: [&str; 1] = [POSITION_ATTRIBUTE];

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ProgramKind {
    PerVertexCube,
    PerFragmentCube,
    LightPoint,
}

impl ProgramKind {
    pub const ALL: [ProgramKind; 3] = [
        ProgramKind::PerVertexCube,
        ProgramKind::PerFragmentCube,
        ProgramKind::LightPoint,
    ];

    pub fn attributes(self) -> &'static [&'static str] {
        match self {
            ProgramKind::PerVertexCube | ProgramKind::PerFragmentCube => &CUBE_ATTRIBUTES,
            ProgramKind::LightPoint => &POINT_ATTRIBUTES,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "per_vertex" => Some(ProgramKind::PerVertexCube),
            "per_fragment" => Some(ProgramKind::PerFragmentCube),
            "point" => Some(ProgramKind::LightPoint),
            _ => None,
        }
    }
}

impl fmt::Display for ProgramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProgramKind::PerVertexCube => "per-vertex cube",
            ProgramKind::PerFragmentCube => "per-fragment cube",
            ProgramKind::LightPoint => "light point",
        })
    }
}

pub fn parse_stage(name: &str) -> Option<ShaderStage> {
    match name {
        "vertex" => Some(ShaderStage::Vertex),
        "fragment" => Some(ShaderStage::Fragment),
        _ => None,
    }
}

/// Supplies shader text. The renderer treats the text as opaque.
pub trait ShaderSourceProvider {
    fn shader_source(
        &self,
        program: ProgramKind,
        stage: ShaderStage,
    ) -> Result<Cow<'_, str>, RenderError>;
}

/// The sources compiled into the crate.
#[derive(Debug, Default, Copy, Clone)]
pub struct EmbeddedShaders;

impl EmbeddedShaders {
    pub fn source(program: ProgramKind, stage: ShaderStage) -> &'static str {
        match (program, stage) {
            (ProgramKind::PerVertexCube, ShaderStage::Vertex) => PER_VERTEX_VERTEX_SHADER,
            (ProgramKind::PerVertexCube, ShaderStage::Fragment) => PER_VERTEX_FRAGMENT_SHADER,
            (ProgramKind::PerFragmentCube, ShaderStage::Vertex) => PER_FRAGMENT_VERTEX_SHADER,
            (ProgramKind::PerFragmentCube, ShaderStage::Fragment) => PER_FRAGMENT_FRAGMENT_SHADER,
            (ProgramKind::LightPoint, ShaderStage::Vertex) => POINT_VERTEX_SHADER,
            (ProgramKind::LightPoint, ShaderStage::Fragment) => POINT_FRAGMENT_SHADER,
        }
    }
}

impl ShaderSourceProvider for EmbeddedShaders {
    fn shader_source(
        &self,
        program: ProgramKind,
        stage: ShaderStage,
    ) -> Result<Cow<'_, str>, RenderError> {
        Ok(Cow::Borrowed(Self::source(program, stage)))
    }
}

/// Shader text registered at runtime, e.g. fetched by the host page.
#[derive(Debug, Default, Clone)]
pub struct ShaderLibrary {
    sources: HashMap<(ProgramKind, ShaderStage), String>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_embedded() -> Self {
        let mut library = Self::new();
        for program in ProgramKind::ALL {
            for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
                library.insert(program, stage, EmbeddedShaders::source(program, stage));
            }
        }
        library
    }

    pub fn insert(&mut self, program: ProgramKind, stage: ShaderStage, source: impl Into<String>) {
        self.sources.insert((program, stage), source.into());
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl ShaderSourceProvider for ShaderLibrary {
    fn shader_source(
        &self,
        program: ProgramKind,
        stage: ShaderStage,
    ) -> Result<Cow<'_, str>, RenderError> {
        self.sources
            .get(&(program, stage))
            .map(|source| Cow::Borrowed(source.as_str()))
            .ok_or(RenderError::MissingShaderSource { program, stage })
    }
}

pub fn compile_shader<B: GlBackend>(
    gl: &B,
    stage: ShaderStage,
    source: &str,
) -> Result<B::Shader, RenderError> {
    let shader = gl
        .create_shader(stage)
        .ok_or(RenderError::ShaderCreate(stage))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl.shader_compiled(&shader) {
        Ok(shader)
    } else {
        let message = gl
            .shader_info_log(&shader)
            .unwrap_or_else(|| "unknown shader error".into());
        log::error!("error compiling {stage} shader: {message}");
        gl.delete_shader(&shader);
        Err(RenderError::ShaderCompile {
            stage,
            log: message,
        })
    }
}

/// Links a program, binding each attribute to its index in `attributes`.
pub fn link_program<B: GlBackend>(
    gl: &B,
    kind: ProgramKind,
    vert: &B::Shader,
    frag: &B::Shader,
    attributes: &[&str],
) -> Result<B::Program, RenderError> {
    let program = gl.create_program().ok_or(RenderError::ProgramCreate)?;
    gl.attach_shader(&program, vert);
    gl.attach_shader(&program, frag);
    for (index, name) in attributes.iter().enumerate() {
        gl.bind_attrib_location(&program, index as u32, name);
    }
    gl.link_program(&program);

    if gl.program_linked(&program) {
        Ok(program)
    } else {
        let message = gl
            .program_info_log(&program)
            .unwrap_or_else(|| "unknown program error".into());
        log::error!("error linking {kind} program: {message}");
        gl.delete_program(&program);
        Err(RenderError::ProgramLink {
            program: kind,
            log: message,
        })
    }
}

/// Fetches, compiles and links one program. Shader objects are released
/// once linking has finished, whatever the outcome.
pub fn build_program<B: GlBackend, S: ShaderSourceProvider + ?Sized>(
    gl: &B,
    sources: &S,
    kind: ProgramKind,
) -> Result<B::Program, RenderError> {
    let vertex_source = sources.shader_source(kind, ShaderStage::Vertex)?;
    let fragment_source = sources.shader_source(kind, ShaderStage::Fragment)?;

    let vert = compile_shader(gl, ShaderStage::Vertex, &vertex_source)?;
    let frag = match compile_shader(gl, ShaderStage::Fragment, &fragment_source) {
        Ok(frag) => frag,
        Err(err) => {
            gl.delete_shader(&vert);
            return Err(err);
        }
    };
    let linked = link_program(gl, kind, &vert, &frag, kind.attributes());
    gl.delete_shader(&vert);
    gl.delete_shader(&frag);
    linked
}

/// Uniform and attribute locations inside one cube program.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeBindings<L> {
    pub mvp_matrix: L,
    pub mv_matrix: L,
    pub light_pos: L,
    pub position: u32,
    pub color: u32,
    pub normal: u32,
}

impl<L: Clone> CubeBindings<L> {
    pub fn resolve<B>(gl: &B, program: &B::Program, kind: ProgramKind) -> Result<Self, RenderError>
    where
        B: GlBackend<UniformLocation = L>,
    {
        Ok(Self {
            mvp_matrix: uniform(gl, program, kind, MVP_UNIFORM)?,
            mv_matrix: uniform(gl, program, kind, MV_UNIFORM)?,
            light_pos: uniform(gl, program, kind, LIGHT_POS_UNIFORM)?,
            position: attribute(gl, program, kind, POSITION_ATTRIBUTE)?,
            color: attribute(gl, program, kind, COLOR_ATTRIBUTE)?,
            normal: attribute(gl, program, kind, NORMAL_ATTRIBUTE)?,
        })
    }

    pub fn attribute_locations(&self) -> [u32; 3] {
        [self.position, self.color, self.normal]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointBindings<L> {
    pub mvp_matrix: L,
    pub position: u32,
}

impl<L: Clone> PointBindings<L> {
    pub fn resolve<B>(gl: &B, program: &B::Program) -> Result<Self, RenderError>
    where
        B: GlBackend<UniformLocation = L>,
    {
        let kind = ProgramKind::LightPoint;
        Ok(Self {
            mvp_matrix: uniform(gl, program, kind, MVP_UNIFORM)?,
            position: attribute(gl, program, kind, POSITION_ATTRIBUTE)?,
        })
    }
}

fn uniform<B: GlBackend>(
    gl: &B,
    program: &B::Program,
    kind: ProgramKind,
    name: &'static str,
) -> Result<B::UniformLocation, RenderError> {
    gl.uniform_location(program, name)
        .ok_or(RenderError::MissingBinding {
            program: kind,
            kind: "uniform",
            name,
        })
}

fn attribute<B: GlBackend>(
    gl: &B,
    program: &B::Program,
    kind: ProgramKind,
    name: &'static str,
) -> Result<u32, RenderError> {
    gl.attrib_location(program, name)
        .ok_or(RenderError::MissingBinding {
            program: kind,
            kind: "attribute",
            name,
        })
}

pub struct CubeProgram<B: GlBackend> {
    pub program: B::Program,
    pub bindings: CubeBindings<B::UniformLocation>,
}

pub struct PointProgram<B: GlBackend> {
    pub program: B::Program,
    pub bindings: PointBindings<B::UniformLocation>,
}

/// The three linked programs, valid until the next surface creation.
pub struct ProgramSet<B: GlBackend> {
    pub per_vertex: CubeProgram<B>,
    pub per_fragment: CubeProgram<B>,
    pub point: PointProgram<B>,
}

impl<B: GlBackend> ProgramSet<B> {
    /// Builds all three programs. On failure every program linked so far is
    /// deleted before the error is returned.
    pub fn build<S: ShaderSourceProvider + ?Sized>(gl: &B, sources: &S) -> Result<Self, RenderError> {
        let mut linked: Vec<B::Program> = Vec::with_capacity(ProgramKind::ALL.len());
        let result = Self::build_into(gl, sources, &mut linked);
        if result.is_err() {
            for program in &linked {
                gl.delete_program(program);
            }
        }
        result
    }

    fn build_into<S: ShaderSourceProvider + ?Sized>(
        gl: &B,
        sources: &S,
        linked: &mut Vec<B::Program>,
    ) -> Result<Self, RenderError> {
        let mut cube = |kind: ProgramKind| -> Result<CubeProgram<B>, RenderError> {
            let program = build_program(gl, sources, kind)?;
            linked.push(program.clone());
            let bindings = CubeBindings::resolve(gl, &program, kind)?;
            Ok(CubeProgram { program, bindings })
        };
        let per_vertex = cube(ProgramKind::PerVertexCube)?;
        let per_fragment = cube(ProgramKind::PerFragmentCube)?;

        let program = build_program(gl, sources, ProgramKind::LightPoint)?;
        linked.push(program.clone());
        let bindings = PointBindings::resolve(gl, &program)?;

        Ok(Self {
            per_vertex,
            per_fragment,
            point: PointProgram { program, bindings },
        })
    }

    pub fn release(&self, gl: &B) {
        gl.delete_program(&self.per_vertex.program);
        gl.delete_program(&self.per_fragment.program);
        gl.delete_program(&self.point.program);
    }
}

const PER_VERTEX_VERTEX_SHADER: &str = r#"
uniform mat4 u_mvp_matrix;
uniform mat4 u_mv_matrix;
uniform vec3 u_light_pos;
attribute vec4 a_position;
attribute vec4 a_color;
attribute vec3 a_normal;
varying vec4 v_color;

void main() {
    vec3 mv_vertex = vec3(u_mv_matrix * a_position);
    vec3 mv_normal = vec3(u_mv_matrix * vec4(a_normal, 0.0));
    float distance = length(u_light_pos - mv_vertex);
    vec3 light_vector = normalize(u_light_pos - mv_vertex);
    float diffuse = max(dot(mv_normal, light_vector), 0.1);
    diffuse = diffuse * (1.0 / (1.0 + (0.25 * distance * distance)));
    v_color = a_color * diffuse;
    gl_Position = u_mvp_matrix * a_position;
}
"#;

const PER_VERTEX_FRAGMENT_SHADER: &str = r#"
precision mediump float;
varying vec4 v_color;

void main() {
    gl_FragColor = v_color;
}
"#;

const PER_FRAGMENT_VERTEX_SHADER: &str = r#"
uniform mat4 u_mvp_matrix;
uniform mat4 u_mv_matrix;
attribute vec4 a_position;
attribute vec4 a_color;
attribute vec3 a_normal;
varying vec3 v_position;
varying vec4 v_color;
varying vec3 v_normal;

void main() {
    v_position = vec3(u_mv_matrix * a_position);
    v_color = a_color;
    v_normal = vec3(u_mv_matrix * vec4(a_normal, 0.0));
    gl_Position = u_mvp_matrix * a_position;
}
"#;

const PER_FRAGMENT_FRAGMENT_SHADER: &str = r#"
precision mediump float;
uniform vec3 u_light_pos;
varying vec3 v_position;
varying vec4 v_color;
varying vec3 v_normal;

void main() {
    float distance = length(u_light_pos - v_position);
    vec3 light_vector = normalize(u_light_pos - v_position);
    float diffuse = max(dot(normalize(v_normal), light_vector), 0.1);
    diffuse = diffuse * (1.0 / (1.0 + (0.25 * distance * distance)));
    gl_FragColor = v_color * diffuse;
}
"#;

const POINT_VERTEX_SHADER: &str = r#"
uniform mat4 u_mvp_matrix;
attribute vec4 a_position;

void main() {
    gl_Position = u_mvp_matrix * a_position;
    gl_PointSize = 5.0;
}
"#;

const POINT_FRAGMENT_SHADER: &str = r#"
precision mediump float;

void main() {
    gl_FragColor = vec4(1.0, 1.0, 1.0, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{GlCall, RecordingBackend};

    #[test]
    fn links_with_ordered_attribute_locations() {
        let gl = RecordingBackend::new();
        let program = build_program(&gl, &EmbeddedShaders, ProgramKind::PerFragmentCube).unwrap();
        for (index, name) in CUBE_ATTRIBUTES.iter().enumerate() {
            assert_eq!(gl.attrib_location(&program, name), Some(index as u32));
        }
        let bound: Vec<_> = gl
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                GlCall::BindAttribLocation { index, name, .. } => Some((index, name)),
                _ => None,
            })
            .collect();
        assert_eq!(
            bound,
            vec![
                (0, "a_position".to_string()),
                (1, "a_color".to_string()),
                (2, "a_normal".to_string()),
            ]
        );
    }

    #[test]
    fn point_program_binds_position_to_zero() {
        let gl = RecordingBackend::new();
        let program = build_program(&gl, &EmbeddedShaders, ProgramKind::LightPoint).unwrap();
        assert_eq!(gl.attrib_location(&program, POSITION_ATTRIBUTE), Some(0));
        assert_eq!(gl.attrib_location(&program, COLOR_ATTRIBUTE), None);
    }

    #[test]
    fn compile_failure_surfaces_log_and_deletes_shader() {
        let gl = RecordingBackend::new();
        let err = compile_shader(&gl, ShaderStage::Vertex, "#error broken").unwrap_err();
        match err {
            RenderError::ShaderCompile { stage, log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(log.contains("broken"), "{log}");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(gl.calls().iter().any(|c| matches!(c, GlCall::DeleteShader(_))));
    }

    #[test]
    fn link_failure_deletes_program() {
        let gl = RecordingBackend::new().failing_link();
        let err = build_program(&gl, &EmbeddedShaders, ProgramKind::PerVertexCube).unwrap_err();
        assert!(matches!(
            err,
            RenderError::ProgramLink {
                program: ProgramKind::PerVertexCube,
                ..
            }
        ));
        assert!(err.has_diagnostic());
        assert!(gl.calls().iter().any(|c| matches!(c, GlCall::DeleteProgram(_))));
    }

    #[test]
    fn zero_handle_is_fatal() {
        let gl = RecordingBackend::new().without_handles();
        assert!(matches!(
            compile_shader(&gl, ShaderStage::Fragment, "void main() {}"),
            Err(RenderError::ShaderCreate(ShaderStage::Fragment))
        ));
    }

    #[test]
    fn program_set_cleans_up_after_partial_failure() {
        let mut library = ShaderLibrary::with_embedded();
        library.insert(ProgramKind::LightPoint, ShaderStage::Fragment, "#error point");
        let gl = RecordingBackend::new();
        assert!(ProgramSet::build(&gl, &library).is_err());
        let deleted = gl
            .calls()
            .iter()
            .filter(|c| matches!(c, GlCall::DeleteProgram(_)))
            .count();
        assert_eq!(deleted, 2);
    }

    #[test]
    fn program_set_resolves_distinct_locations() {
        let gl = RecordingBackend::new();
        let set = ProgramSet::build(&gl, &EmbeddedShaders).unwrap();
        assert_ne!(set.per_vertex.program, set.per_fragment.program);
        assert_ne!(set.per_vertex.bindings.mvp_matrix, set.per_fragment.bindings.mvp_matrix);
        assert_eq!(set.per_vertex.bindings.attribute_locations(), [0, 1, 2]);
        assert_eq!(set.point.bindings.position, 0);
    }

    #[test]
    fn missing_source_is_reported() {
        let library = ShaderLibrary::new();
        let gl = RecordingBackend::new();
        assert!(matches!(
            ProgramSet::build(&gl, &library),
            Err(RenderError::MissingShaderSource {
                program: ProgramKind::PerVertexCube,
                stage: ShaderStage::Vertex,
            })
        ));
    }

    #[test]
    fn library_seeded_from_embedded() {
        let library = ShaderLibrary::with_embedded();
        assert_eq!(library.len(), 6);
        let source = library
            .shader_source(ProgramKind::LightPoint, ShaderStage::Vertex)
            .unwrap();
        assert!(source.contains("gl_PointSize"));
    }

    #[test]
    fn names_parse() {
        assert_eq!(ProgramKind::parse("per_fragment"), Some(ProgramKind::PerFragmentCube));
        assert_eq!(ProgramKind::parse("cube"), None);
        assert_eq!(parse_stage("vertex"), Some(ShaderStage::Vertex));
        assert_eq!(parse_stage("geometry"), None);
    }
}
