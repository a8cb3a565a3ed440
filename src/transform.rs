use glam::{Mat4, Vec3, Vec4};

use crate::config::SceneConfig;
use crate::error::RenderError;

/// Light position in its own local frame.
pub const LIGHT_POS_MODEL_SPACE: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

/// Rotation angle in degrees for an absolute elapsed time.
///
/// Driven by absolute time rather than frame deltas, so skipped frames
/// never desynchronize the animation.
pub fn angle_degrees(time_ms: u64, period_ms: u64) -> f32 {
    let period = period_ms.max(1);
    // 360 * t is exact in f32 for t < period, so quarter turns land on 90.0.
    360.0 * (time_ms % period) as f32 / period as f32
}

/// Translate, then rotate about `axis` in the translated frame.
///
/// A zero-length axis means no rotation.
pub fn build_model_matrix(translation: Vec3, rotation: Option<(Vec3, f32)>) -> Mat4 {
    let translate = Mat4::from_translation(translation);
    match rotation.and_then(|(axis, degrees)| Some((axis.try_normalize()?, degrees))) {
        Some((axis, degrees)) => translate * Mat4::from_axis_angle(axis, degrees.to_radians()),
        None => translate,
    }
}

/// `left * right`; `right` transforms first.
#[inline]
pub fn combine(left: Mat4, right: Mat4) -> Mat4 {
    left * right
}

/// Column-major perspective frustum, the GL `glFrustum` layout.
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let r_width = 1.0 / (right - left);
    let r_height = 1.0 / (top - bottom);
    let r_depth = 1.0 / (near - far);
    Mat4::from_cols(
        Vec4::new(2.0 * near * r_width, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near * r_height, 0.0, 0.0),
        Vec4::new(
            (right + left) * r_width,
            (top + bottom) * r_height,
            (far + near) * r_depth,
            -1.0,
        ),
        Vec4::new(0.0, 0.0, 2.0 * far * near * r_depth, 0.0),
    )
}

/// Horizontal/vertical frustum half-extents used for the last projection.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrustumExtents {
    pub half_width: f32,
    pub half_height: f32,
    pub near: f32,
    pub far: f32,
}

/// View, projection and light transforms.
///
/// The projection is identity until the first [`set_viewport`] call.
///
/// [`set_viewport`]: TransformPipeline::set_viewport
#[derive(Debug, Clone)]
pub struct TransformPipeline {
    view: Mat4,
    projection: Mat4,
    extents: Option<FrustumExtents>,
    light_model: Mat4,
    light_world: Vec4,
    light_eye: Vec4,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            extents: None,
            light_model: Mat4::IDENTITY,
            light_world: LIGHT_POS_MODEL_SPACE,
            light_eye: LIGHT_POS_MODEL_SPACE,
        }
    }

    pub fn set_camera(&mut self, eye: Vec3, look_at: Vec3, up: Vec3) -> Result<(), RenderError> {
        let forward = (look_at - eye)
            .try_normalize()
            .ok_or(RenderError::InvalidCamera("eye and target coincide"))?;
        if forward.cross(up).try_normalize().is_none() {
            return Err(RenderError::InvalidCamera("up vector is parallel to view direction"));
        }
        self.view = Mat4::look_at_rh(eye, look_at, up);
        Ok(())
    }

    /// Rebuilds the projection for a `width` x `height` surface.
    ///
    /// Returns `false` and keeps the previous projection when either
    /// dimension is zero.
    pub fn set_viewport(&mut self, width: u32, height: u32, config: &SceneConfig) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        let ratio = width as f32 / height as f32;
        let half_height = config.frustum_half_height;
        let half_width = ratio * half_height;
        self.projection = frustum(
            -half_width,
            half_width,
            -half_height,
            half_height,
            config.near,
            config.far,
        );
        self.extents = Some(FrustumExtents {
            half_width,
            half_height,
            near: config.near,
            far: config.far,
        });
        true
    }

    /// Moves the light along its orbit and returns its eye-space position.
    ///
    /// The result changes every call; callers should not cache it across frames.
    pub fn compute_light_eye_position(&mut self, time_ms: u64, config: &SceneConfig) -> Vec4 {
        let angle = angle_degrees(time_ms, config.rotation_period_ms);
        self.light_model = Mat4::from_translation(config.light_orbit_center)
            * Mat4::from_rotation_y(angle.to_radians())
            * Mat4::from_translation(config.light_orbit_offset);
        self.light_world = self.light_model * LIGHT_POS_MODEL_SPACE;
        self.light_eye = self.view * self.light_world;
        self.light_eye
    }

    /// `(model_view, mvp)` for a model matrix. The MVP is built from the
    /// model-view result, not from model or view alone.
    pub fn model_view_projection(&self, model: Mat4) -> (Mat4, Mat4) {
        let model_view = combine(self.view, model);
        let mvp = combine(self.projection, model_view);
        (model_view, mvp)
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn extents(&self) -> Option<FrustumExtents> {
        self.extents
    }

    pub fn light_model(&self) -> Mat4 {
        self.light_model
    }

    pub fn light_world(&self) -> Vec4 {
        self.light_world
    }

    pub fn light_eye(&self) -> Vec4 {
        self.light_eye
    }
}

impl Default for TransformPipeline {
    fn default() -> Self {
        Self::new()
    }
}
