//! 移動ウィジェット
//! 選択対象の位置に平行移動ハンドルを表示し、ドラッグ中のレイから
//! フレーム間の移動差分を計算する

use glam::Vec3;

use editor_core::Aabb;

use crate::picking::Ray;

/// ウィジェット軸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoAxis {
    #[default]
    None,
    X,
    Y,
    Z,
    XY,
    YZ,
    XZ,
    All,
}

impl std::str::FromStr for GizmoAxis {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "x" => GizmoAxis::X,
            "y" => GizmoAxis::Y,
            "z" => GizmoAxis::Z,
            "xy" => GizmoAxis::XY,
            "yz" => GizmoAxis::YZ,
            "xz" => GizmoAxis::XZ,
            "all" => GizmoAxis::All,
            _ => GizmoAxis::None,
        })
    }
}

/// 軸の色定数
pub const COLOR_X: [f32; 4] = [0.9, 0.2, 0.2, 1.0];       // 赤
pub const COLOR_Y: [f32; 4] = [0.2, 0.9, 0.2, 1.0];       // 緑
pub const COLOR_Z: [f32; 4] = [0.2, 0.2, 0.9, 1.0];       // 青
pub const COLOR_X_HOVER: [f32; 4] = [1.0, 0.5, 0.5, 1.0]; // 赤（ハイライト）
pub const COLOR_Y_HOVER: [f32; 4] = [0.5, 1.0, 0.5, 1.0]; // 緑（ハイライト）
pub const COLOR_Z_HOVER: [f32; 4] = [0.5, 0.5, 1.0, 1.0]; // 青（ハイライト）

/// レイと円柱の交差判定（有限長の線分を太くしたもの）
fn ray_cylinder_intersection(ray: &Ray, start: Vec3, end: Vec3, radius: f32) -> Option<f32> {
    let axis = end - start;
    let axis_len = axis.length();
    if axis_len < 1e-6 {
        return None;
    }
    let axis_dir = axis / axis_len;

    // レイ原点から線分始点へのベクトル
    let oc = ray.origin - start;

    // 円柱軸に垂直な成分でレイと円柱の交差を計算
    let ray_perp = ray.direction - axis_dir * ray.direction.dot(axis_dir);
    let oc_perp = oc - axis_dir * oc.dot(axis_dir);

    let a = ray_perp.dot(ray_perp);
    let b = 2.0 * ray_perp.dot(oc_perp);
    let c = oc_perp.dot(oc_perp) - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);

    // 有効な t を探す
    for t in [t1, t2] {
        if t < 0.0 {
            continue;
        }

        let hit_point = ray.at(t);
        let projection = (hit_point - start).dot(axis_dir);

        // 線分の範囲内かチェック
        if projection >= 0.0 && projection <= axis_len {
            return Some(t);
        }
    }

    None
}

/// 平行移動ウィジェットの状態
#[derive(Debug, Clone)]
pub struct TranslateGizmo {
    /// 表示フラグ（アタッチ中のみtrue）
    pub visible: bool,
    /// ウィジェット位置
    pub position: Vec3,
    /// ホバー中の軸
    pub hovered_axis: GizmoAxis,
    /// 操作中の軸
    pub active_axis: GizmoAxis,
}

impl Default for TranslateGizmo {
    fn default() -> Self {
        Self {
            visible: false,
            position: Vec3::ZERO,
            hovered_axis: GizmoAxis::None,
            active_axis: GizmoAxis::None,
        }
    }
}

impl TranslateGizmo {
    /// 指定位置にアタッチして表示する
    pub fn attach(&mut self, position: Vec3) {
        self.visible = true;
        self.position = position;
    }

    /// デタッチして非表示にする
    pub fn detach(&mut self) {
        self.visible = false;
        self.hovered_axis = GizmoAxis::None;
        self.active_axis = GizmoAxis::None;
    }

    /// ウィジェットスケールを取得（カメラ距離に比例）
    pub fn scale(&self, camera_position: Vec3) -> f32 {
        let distance = (camera_position - self.position).length();
        distance * 0.15
    }

    /// 軸の色を取得（ホバー/アクティブ状態で変化）
    pub fn axis_color(&self, axis: GizmoAxis) -> [f32; 4] {
        let is_highlighted = self.hovered_axis == axis || self.active_axis == axis;

        match axis {
            GizmoAxis::X => if is_highlighted { COLOR_X_HOVER } else { COLOR_X },
            GizmoAxis::Y => if is_highlighted { COLOR_Y_HOVER } else { COLOR_Y },
            GizmoAxis::Z => if is_highlighted { COLOR_Z_HOVER } else { COLOR_Z },
            _ => [0.5, 0.5, 0.5, 0.5],
        }
    }

    /// レイとウィジェットのヒットテスト
    pub fn hit_test(&self, ray: &Ray, camera_position: Vec3) -> GizmoAxis {
        if !self.visible {
            return GizmoAxis::None;
        }

        let scale = self.scale(camera_position);
        let mut closest: Option<(GizmoAxis, f32)> = None;

        // 中央ボックスのヒットテスト (All axis)
        if let Some(t) = self.hit_test_center_box(ray, scale) {
            closest = Some((GizmoAxis::All, t));
        }

        // 各軸のヒットテスト
        for axis in [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z] {
            if let Some(t) = self.hit_test_axis(ray, axis, scale) {
                match closest {
                    None => closest = Some((axis, t)),
                    Some((_, prev_t)) if t < prev_t => closest = Some((axis, t)),
                    _ => {}
                }
            }
        }

        // 平面ハンドルのヒットテスト
        for axis in [GizmoAxis::XY, GizmoAxis::YZ, GizmoAxis::XZ] {
            if let Some(t) = self.hit_test_plane_handle(ray, axis, scale) {
                match closest {
                    None => closest = Some((axis, t)),
                    Some((_, prev_t)) if t < prev_t => closest = Some((axis, t)),
                    _ => {}
                }
            }
        }

        closest.map(|(axis, _)| axis).unwrap_or(GizmoAxis::None)
    }

    /// 軸（線分）のヒットテスト
    fn hit_test_axis(&self, ray: &Ray, axis: GizmoAxis, scale: f32) -> Option<f32> {
        let axis_dir = match axis {
            GizmoAxis::X => Vec3::X,
            GizmoAxis::Y => Vec3::Y,
            GizmoAxis::Z => Vec3::Z,
            _ => return None,
        };

        // 軸を円柱として扱う（半径 = threshold）
        let threshold = scale * 0.08;
        let axis_start = self.position;
        let axis_end = self.position + axis_dir * scale;

        ray_cylinder_intersection(ray, axis_start, axis_end, threshold)
    }

    /// 中央ボックスのヒットテスト
    fn hit_test_center_box(&self, ray: &Ray, scale: f32) -> Option<f32> {
        let half = scale * 0.12;
        let aabb = Aabb::new(self.position - Vec3::splat(half), self.position + Vec3::splat(half));
        ray.intersect_aabb(&aabb)
    }

    /// 平面ハンドルのヒットテスト
    fn hit_test_plane_handle(&self, ray: &Ray, axis: GizmoAxis, scale: f32) -> Option<f32> {
        let (v1, v2, normal) = match axis {
            GizmoAxis::XY => (Vec3::X, Vec3::Y, Vec3::Z),
            GizmoAxis::YZ => (Vec3::Y, Vec3::Z, Vec3::X),
            GizmoAxis::XZ => (Vec3::X, Vec3::Z, Vec3::Y),
            _ => return None,
        };

        let offset = scale * 0.3;
        let size = scale * 0.25;

        // 平面の中心
        let center = self.position + (v1 + v2) * (offset + size * 0.5);

        // レイと平面の交点
        let t = ray.intersect_plane(center, normal)?;
        if t < 0.0 {
            return None;
        }

        let local = ray.at(t) - self.position;

        // 平面の範囲内かチェック
        let coord1 = local.dot(v1);
        let coord2 = local.dot(v2);

        if coord1 >= offset && coord1 <= offset + size
            && coord2 >= offset && coord2 <= offset + size
        {
            Some(t)
        } else {
            None
        }
    }

    /// ドラッグ移動量を計算
    /// 前回レイと現在レイをドラッグ平面に落とし、軸方向成分のみ取り出す
    pub fn drag_delta(
        &self,
        axis: GizmoAxis,
        ray: &Ray,
        prev_ray: &Ray,
        camera_position: Vec3,
    ) -> Vec3 {
        let plane_normal = self.drag_plane_normal(axis, camera_position);

        let prev_point = plane_point(prev_ray, self.position, plane_normal);
        let curr_point = plane_point(ray, self.position, plane_normal);

        match (prev_point, curr_point) {
            (Some(prev), Some(curr)) => {
                let delta = curr - prev;
                match axis {
                    GizmoAxis::X => Vec3::new(delta.x, 0.0, 0.0),
                    GizmoAxis::Y => Vec3::new(0.0, delta.y, 0.0),
                    GizmoAxis::Z => Vec3::new(0.0, 0.0, delta.z),
                    GizmoAxis::XY => Vec3::new(delta.x, delta.y, 0.0),
                    GizmoAxis::YZ => Vec3::new(0.0, delta.y, delta.z),
                    GizmoAxis::XZ => Vec3::new(delta.x, 0.0, delta.z),
                    GizmoAxis::All => delta,
                    GizmoAxis::None => Vec3::ZERO,
                }
            }
            _ => Vec3::ZERO,
        }
    }

    /// ドラッグ用の平面法線を計算
    fn drag_plane_normal(&self, axis: GizmoAxis, camera_position: Vec3) -> Vec3 {
        let view_dir = (self.position - camera_position).normalize();

        match axis {
            GizmoAxis::X => {
                // X軸操作：YまたはZ平面のうち、視線に対して垂直に近い方を使う
                if view_dir.y.abs() > view_dir.z.abs() {
                    Vec3::Y
                } else {
                    Vec3::Z
                }
            }
            GizmoAxis::Y => {
                if view_dir.x.abs() > view_dir.z.abs() {
                    Vec3::X
                } else {
                    Vec3::Z
                }
            }
            GizmoAxis::Z => {
                if view_dir.x.abs() > view_dir.y.abs() {
                    Vec3::X
                } else {
                    Vec3::Y
                }
            }
            GizmoAxis::XY => Vec3::Z,
            GizmoAxis::YZ => Vec3::X,
            GizmoAxis::XZ => Vec3::Y,
            GizmoAxis::All => view_dir,
            GizmoAxis::None => Vec3::Y,
        }
    }
}

/// レイと平面の交点（後方はNone）
fn plane_point(ray: &Ray, plane_point_on: Vec3, plane_normal: Vec3) -> Option<Vec3> {
    let t = ray.intersect_plane(plane_point_on, plane_normal)?;
    if t < 0.0 {
        return None;
    }
    Some(ray.at(t))
}
