#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Projection {
    Perspective,
    Orthographic,
}

#[derive(Debug, Copy, Clone)]
pub struct Camera {
    pub position: uv::Vec3,
    pub target: uv::Vec3,
    pub up: uv::Vec3,
    /// Vertical field of view in degrees. Orthographic cameras use it as the view height.
    pub fovy: f32,
    pub projection: Projection,
}

impl Camera {
    const Z_NEAR: f32 = 0.01;
    const Z_FAR: f32 = 1000.0;

    pub fn new(position: uv::Vec3, target: uv::Vec3, up: uv::Vec3, fovy: f32, projection: Projection) -> Self {
        Self {
            position,
            target,
            up,
            fovy,
            projection,
        }
    }

    pub fn forward(&self) -> uv::Vec3 {
        (self.target - self.position).normalized()
    }

    pub fn view_mat(&self) -> uv::Mat4 {
        uv::Mat4::look_at(self.position, self.target, self.up)
    }

    pub fn projection_mat(&self, aspect: f32) -> uv::Mat4 {
        match self.projection {
            Projection::Perspective => uv::projection::perspective_vk(
                self.fovy.to_radians(),
                aspect,
                Self::Z_NEAR,
                Self::Z_FAR,
            ),
            Projection::Orthographic => {
                let top = self.fovy / 2.0;
                let right = top * aspect;
                uv::projection::orthographic_vk(-right, right, -top, top, Self::Z_NEAR, Self::Z_FAR)
            }
        }
    }

    /// World to Vulkan clip space.
    pub fn view_projection(&self, aspect: f32) -> uv::Mat4 {
        self.projection_mat(aspect) * self.view_mat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_camera() -> Camera {
        Camera::new(
            uv::Vec3::new(4.0, 4.0, 4.0),
            uv::Vec3::zero(),
            uv::Vec3::unit_y(),
            60.0,
            Projection::Perspective,
        )
    }

    fn to_ndc(mat: uv::Mat4, point: uv::Vec3) -> uv::Vec3 {
        let clip = mat * point.into_homogeneous_point();
        uv::Vec3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w)
    }

    #[test]
    fn target_projects_to_screen_center() {
        let camera = demo_camera();
        let ndc = to_ndc(camera.view_projection(16.0 / 9.0), camera.target);
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5, "{:?}", ndc);
        assert!(ndc.z > 0.0 && ndc.z < 1.0, "{:?}", ndc);
    }

    #[test]
    fn up_is_negative_y_in_vulkan_clip_space() {
        let camera = Camera::new(
            uv::Vec3::new(0.0, 0.0, 5.0),
            uv::Vec3::zero(),
            uv::Vec3::unit_y(),
            60.0,
            Projection::Perspective,
        );
        let ndc = to_ndc(camera.view_projection(1.0), uv::Vec3::new(0.0, 1.0, 0.0));
        assert!(ndc.y < 0.0, "{:?}", ndc);
    }

    #[test]
    fn forward_points_at_target() {
        let forward = demo_camera().forward();
        let expected = uv::Vec3::new(-1.0, -1.0, -1.0).normalized();
        assert!((forward - expected).mag() < 1e-6);
    }

    #[test]
    fn orthographic_keeps_target_centered() {
        let mut camera = demo_camera();
        camera.projection = Projection::Orthographic;
        let ndc = to_ndc(camera.view_projection(1.0), camera.target);
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5, "{:?}", ndc);
    }
}
