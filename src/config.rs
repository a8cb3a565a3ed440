use glam::Vec3;

/// Fixed scene parameters.
///
/// `Default` is the demo scene: camera just in front of the origin looking
/// down -Z, a light orbiting the centre cube once every ten seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub eye: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    pub near: f32,
    pub far: f32,
    /// Vertical half-extent of the frustum at the near plane.
    pub frustum_half_height: f32,
    pub rotation_period_ms: u64,
    /// Light model matrix is `T(orbit_center) * R_y(angle) * T(orbit_offset)`.
    pub light_orbit_center: Vec3,
    pub light_orbit_offset: Vec3,
    pub clear_color: [f32; 4],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, -0.5),
            look_at: Vec3::new(0.0, 0.0, -5.0),
            up: Vec3::Y,
            near: 1.0,
            far: 10.0,
            frustum_half_height: 1.0,
            rotation_period_ms: 10_000,
            light_orbit_center: Vec3::new(0.0, 0.0, -5.0),
            light_orbit_offset: Vec3::new(0.0, 0.0, 2.0),
            clear_color: [0.0, 0.0, 0.0, 0.0],
        }
    }
}

impl SceneConfig {
    pub fn with_clear_color(mut self, r: f32, g: f32, b: f32, a: f32) -> Self {
        self.clear_color = [clamp_unit(r), clamp_unit(g), clamp_unit(b), clamp_unit(a)];
        self
    }
}

/// Where one cube sits in the world and which axis it spins about.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CubePlacement {
    pub translation: Vec3,
    pub rotation_axis: Option<Vec3>,
}

pub const CUBE_COUNT: usize = 5;

pub const CUBE_PLACEMENTS: [CubePlacement; CUBE_COUNT] = [
    CubePlacement {
        translation: Vec3::new(4.0, 0.0, -7.0),
        rotation_axis: Some(Vec3::X),
    },
    CubePlacement {
        translation: Vec3::new(-4.0, 0.0, -7.0),
        rotation_axis: Some(Vec3::Y),
    },
    CubePlacement {
        translation: Vec3::new(0.0, 4.0, -7.0),
        rotation_axis: Some(Vec3::Z),
    },
    CubePlacement {
        translation: Vec3::new(0.0, -4.0, -7.0),
        rotation_axis: None,
    },
    CubePlacement {
        translation: Vec3::new(0.0, 0.0, -5.0),
        rotation_axis: Some(Vec3::new(1.0, 1.0, 0.0)),
    },
];

pub(crate) fn clamp_unit(value: f32) -> f32 {
    value.max(0.0).min(1.0)
}
