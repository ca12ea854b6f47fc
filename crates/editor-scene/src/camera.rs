use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

use crate::picking::Ray;

/// GPU用カメラUniform
/// View-Projection行列を列優先形式で格納
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    /// Mat4からCameraUniformを作成
    pub fn from_mat4(mat: Mat4) -> Self {
        Self {
            view_proj: mat.to_cols_array_2d(),
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::from_mat4(Mat4::IDENTITY)
    }
}

/// 3Dカメラ
/// 位置、注視点、上方向ベクトルを持つ透視投影カメラ
/// ワールド→スクリーン投影とスクリーン→レイ生成も担当する
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// デフォルト値で新しいカメラを作成
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 45.0_f32.to_radians(),
            aspect,
            near: 0.1,
            far: 100.0,
        }
    }

    /// View-Projection行列を構築
    pub fn build_view_projection_matrix(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.position, self.target, self.up);
        let proj = Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far);
        proj * view
    }

    /// GPU用のCameraUniformを取得
    pub fn uniform(&self) -> CameraUniform {
        CameraUniform::from_mat4(self.build_view_projection_matrix())
    }

    /// ワールド座標を正規化デバイス座標に投影
    /// near平面より手前（clip.w <= 0）の点はNone
    pub fn project_ndc(&self, world: Vec3) -> Option<Vec3> {
        let clip = self.build_view_projection_matrix() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(clip.truncate() / clip.w)
    }

    /// ワールド座標をピクセル座標に投影
    /// 左上原点、y軸は下向き
    pub fn world_to_screen(&self, world: Vec3, width: f32, height: f32) -> Option<Vec2> {
        let ndc = self.project_ndc(world)?;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * width,
            (1.0 - ndc.y) * 0.5 * height,
        ))
    }

    /// スクリーン座標からワールド空間のレイを生成
    pub fn screen_to_ray(&self, screen: Vec2, width: f32, height: f32) -> Ray {
        let ndc_x = screen.x / width * 2.0 - 1.0;
        let ndc_y = 1.0 - screen.y / height * 2.0;

        // near/far平面上の点を逆投影してレイ方向を得る
        let inverse = self.build_view_projection_matrix().inverse();
        let near = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));

        Ray::new(near, far - near)
    }

    /// カメラをターゲット周りで回転
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius < 1e-6 {
            return;
        }

        let mut yaw = offset.z.atan2(offset.x);
        let mut pitch = (offset.y / radius).asin();
        yaw += delta_yaw;
        // 真上/真下で視線とupが揃わないよう制限
        pitch = (pitch + delta_pitch).clamp(-1.54, 1.54);

        self.position = self.target
            + Vec3::new(
                radius * pitch.cos() * yaw.cos(),
                radius * pitch.sin(),
                radius * pitch.cos() * yaw.sin(),
            );
    }

    /// カメラを視線に垂直な面で平行移動（位置とターゲットの両方を動かす）
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let forward = (self.target - self.position).normalize_or_zero();
        let right = forward.cross(self.up).normalize_or_zero();
        let up = right.cross(forward);

        let distance = (self.target - self.position).length();
        let shift = (right * -delta_x + up * delta_y) * distance;
        self.position += shift;
        self.target += shift;
    }

    /// カメラをターゲット方向へズーム
    pub fn zoom(&mut self, delta: f32) {
        let offset = self.position - self.target;
        let distance = (offset.length() - delta).max(0.2);
        self.position = self.target + offset.normalize_or_zero() * distance;
    }

    /// カメラ位置を設定
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// カメラの注視点を設定
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    /// アスペクト比を設定
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }
}
