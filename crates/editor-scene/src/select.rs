//! 選択ステートマシン
//!
//! 単体ピック、追加ピック、矩形選択を一つの状態機械で解決する。
//! 公開メソッド1回 = 1ジェスチャであり、戻り値のtrueは「選択集合が
//! 変化したので通知が1回必要」を意味する。内部で複数回変更しても
//! 通知は1ジェスチャ1回に畳まれる。

use glam::Vec2;

use editor_core::{PointRegistry, SelectionSet};

use crate::camera::Camera;
use crate::marquee::{ScreenRect, points_in_rect};
use crate::picking::{Ray, pick_nearest};

/// 選択ジェスチャの状態
#[derive(Debug, Clone, Copy, PartialEq)]
enum SelectPhase {
    /// ジェスチャなし。次の入力待ち
    Idle,
    /// 矩形ドラッグ中。開始点と現在点を保持
    MarqueeActive { start: Vec2, current: Vec2 },
}

/// 選択ステートマシン
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    phase: SelectPhase,
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self {
            phase: SelectPhase::Idle,
        }
    }

    /// 矩形ドラッグ中かどうか
    pub fn is_marquee_active(&self) -> bool {
        matches!(self.phase, SelectPhase::MarqueeActive { .. })
    }

    /// ドラッグ中の矩形（正規化済み）
    pub fn marquee_rect(&self) -> Option<ScreenRect> {
        match self.phase {
            SelectPhase::MarqueeActive { start, current } => {
                Some(ScreenRect::from_corners(start, current))
            }
            SelectPhase::Idle => None,
        }
    }

    /// 単体ピック
    /// レイに最も近いマーカーを選択する。additiveでなければ既存選択を
    /// 先にクリアする。既に選択済みのマーカーの再ピックはトグルせず
    /// 何もしない。空振りはadditiveでなければクリアのみ行う。
    /// 選択集合が変化した場合trueを返す。
    pub fn pick(
        &mut self,
        ray: &Ray,
        additive: bool,
        radius: f32,
        selection: &mut SelectionSet,
        registry: &PointRegistry,
    ) -> bool {
        if self.phase != SelectPhase::Idle {
            return false;
        }

        match pick_nearest(ray, registry, radius) {
            Some(id) => {
                let mut changed = false;
                if !additive {
                    changed |= selection.clear();
                }
                changed |= selection.insert(id);
                changed
            }
            // 空振り: additiveでなければ既存選択をクリア
            None => {
                if additive {
                    false
                } else {
                    selection.clear()
                }
            }
        }
    }

    /// 矩形選択を開始
    pub fn begin_marquee(&mut self, screen: Vec2) {
        if self.phase == SelectPhase::Idle {
            self.phase = SelectPhase::MarqueeActive {
                start: screen,
                current: screen,
            };
        }
    }

    /// 矩形の現在点を更新
    pub fn update_marquee(&mut self, screen: Vec2) {
        if let SelectPhase::MarqueeActive { current, .. } = &mut self.phase {
            *current = screen;
        }
    }

    /// 矩形選択を確定
    /// 既存選択を無条件にクリアし、矩形内に投影される全マーカーを
    /// 選択する（境界は含む）。クリックのみ（面積ゼロ）は空集合になる。
    /// 選択集合が変化した場合trueを返す。
    pub fn end_marquee(
        &mut self,
        camera: &Camera,
        width: f32,
        height: f32,
        selection: &mut SelectionSet,
        registry: &PointRegistry,
    ) -> bool {
        let SelectPhase::MarqueeActive { start, current } = self.phase else {
            return false;
        };
        self.phase = SelectPhase::Idle;

        let contained = if start == current {
            Vec::new()
        } else {
            let rect = ScreenRect::from_corners(start, current);
            points_in_rect(&rect, camera, width, height, registry)
        };

        let mut changed = selection.clear();
        for id in contained {
            changed |= selection.insert(id);
        }
        changed
    }

    /// 選択中のマーカーを全削除
    /// レジストリと選択集合の両方から同一ジェスチャ内で取り除く。
    /// 削除した個数を返す。
    pub fn delete_selected(
        &mut self,
        selection: &mut SelectionSet,
        registry: &mut PointRegistry,
    ) -> usize {
        let mut removed = 0;
        for id in selection.iter() {
            if registry.remove(id) {
                removed += 1;
            }
        }
        selection.clear();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn ray_toward(target: Vec3) -> Ray {
        let origin = Vec3::new(0.0, 0.0, 5.0);
        Ray::new(origin, target - origin)
    }

    #[test]
    fn test_pick_selects_nearest_along_ray() {
        let mut reg = PointRegistry::new();
        let near = reg.add(Vec3::new(0.0, 0.0, 1.0));
        let _far = reg.add(Vec3::new(0.0, 0.0, -3.0));

        let mut sel = SelectionSet::new();
        let mut engine = SelectionEngine::new();

        let changed = engine.pick(&ray_toward(Vec3::ZERO), false, 0.1, &mut sel, &reg);
        assert!(changed);
        assert_eq!(sel.as_slice(), &[near]);
    }

    #[test]
    fn test_pick_replaces_prior_selection() {
        let mut reg = PointRegistry::new();
        let a = reg.add(Vec3::new(1.0, 0.0, 0.0));
        let b = reg.add(Vec3::new(-1.0, 0.0, 0.0));

        let mut sel = SelectionSet::new();
        sel.insert(a);

        let mut engine = SelectionEngine::new();
        let changed = engine.pick(
            &ray_toward(Vec3::new(-1.0, 0.0, 0.0)),
            false,
            0.1,
            &mut sel,
            &reg,
        );
        assert!(changed);
        assert_eq!(sel.as_slice(), &[b]);
    }

    #[test]
    fn test_additive_pick_keeps_prior_members() {
        let mut reg = PointRegistry::new();
        let a = reg.add(Vec3::new(1.0, 0.0, 0.0));
        let b = reg.add(Vec3::new(-1.0, 0.0, 0.0));

        let mut sel = SelectionSet::new();
        sel.insert(a);

        let mut engine = SelectionEngine::new();
        let changed = engine.pick(
            &ray_toward(Vec3::new(-1.0, 0.0, 0.0)),
            true,
            0.1,
            &mut sel,
            &reg,
        );
        assert!(changed);
        assert_eq!(sel.as_slice(), &[a, b]);
    }

    #[test]
    fn test_additive_repick_is_noop_not_toggle() {
        let mut reg = PointRegistry::new();
        let a = reg.add(Vec3::ZERO);

        let mut sel = SelectionSet::new();
        sel.insert(a);

        let mut engine = SelectionEngine::new();
        let changed = engine.pick(&ray_toward(Vec3::ZERO), true, 0.1, &mut sel, &reg);

        // 再ピックは解除ではなく無変化
        assert!(!changed);
        assert_eq!(sel.as_slice(), &[a]);
    }

    #[test]
    fn test_pick_on_empty_space_clears_selection() {
        let mut reg = PointRegistry::new();
        let a = reg.add(Vec3::ZERO);

        let mut sel = SelectionSet::new();
        sel.insert(a);

        let mut engine = SelectionEngine::new();
        let miss = ray_toward(Vec3::new(20.0, 20.0, 0.0));

        let changed = engine.pick(&miss, false, 0.1, &mut sel, &reg);
        assert!(changed);
        assert!(sel.is_empty());

        // 既に空なら変化なし
        let changed = engine.pick(&miss, false, 0.1, &mut sel, &reg);
        assert!(!changed);
    }

    #[test]
    fn test_additive_pick_on_empty_space_is_noop() {
        let mut reg = PointRegistry::new();
        let a = reg.add(Vec3::ZERO);

        let mut sel = SelectionSet::new();
        sel.insert(a);

        let mut engine = SelectionEngine::new();
        let miss = ray_toward(Vec3::new(20.0, 20.0, 0.0));

        assert!(!engine.pick(&miss, true, 0.1, &mut sel, &reg));
        assert_eq!(sel.as_slice(), &[a]);
    }

    #[test]
    fn test_repick_sole_member_without_modifier_counts_as_change() {
        let mut reg = PointRegistry::new();
        let a = reg.add(Vec3::ZERO);

        let mut sel = SelectionSet::new();
        sel.insert(a);

        let mut engine = SelectionEngine::new();
        // クリア + 再追加で正味同じだが変更としてカウントされる
        let changed = engine.pick(&ray_toward(Vec3::ZERO), false, 0.1, &mut sel, &reg);
        assert!(changed);
        assert_eq!(sel.as_slice(), &[a]);
    }

    #[test]
    fn test_marquee_rect_normalizes_drag_direction() {
        let mut engine = SelectionEngine::new();
        engine.begin_marquee(Vec2::new(100.0, 100.0));
        engine.update_marquee(Vec2::new(40.0, 160.0));

        let rect = engine.marquee_rect().unwrap();
        assert_eq!(rect.left, 40.0);
        assert_eq!(rect.top, 100.0);
        assert_eq!(rect.right, 100.0);
        assert_eq!(rect.bottom, 160.0);
    }

    #[test]
    fn test_end_marquee_replaces_selection_with_contained() {
        let camera = Camera::new(1.0);
        let mut reg = PointRegistry::new();
        let a = reg.add(Vec3::new(0.2, 0.0, 0.0));
        let b = reg.add(Vec3::new(-0.2, 0.0, 0.0));
        let off = reg.add(Vec3::new(50.0, 0.0, 0.0));

        let mut sel = SelectionSet::new();
        sel.insert(off);

        let mut engine = SelectionEngine::new();
        engine.begin_marquee(Vec2::ZERO);
        engine.update_marquee(Vec2::new(800.0, 600.0));
        let changed = engine.end_marquee(&camera, 800.0, 600.0, &mut sel, &reg);

        assert!(changed);
        assert!(!engine.is_marquee_active());
        // 以前の選択はマージされない
        assert_eq!(sel.as_slice(), &[a, b]);
    }

    #[test]
    fn test_zero_area_marquee_selects_nothing() {
        let camera = Camera::new(1.0);
        let mut reg = PointRegistry::new();
        let a = reg.add(Vec3::ZERO);

        let mut sel = SelectionSet::new();
        sel.insert(a);

        let mut engine = SelectionEngine::new();
        engine.begin_marquee(Vec2::new(400.0, 300.0));
        let changed = engine.end_marquee(&camera, 800.0, 600.0, &mut sel, &reg);

        // クリアだけは起きる
        assert!(changed);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_end_marquee_without_begin_is_noop() {
        let camera = Camera::new(1.0);
        let reg = PointRegistry::new();
        let mut sel = SelectionSet::new();

        let mut engine = SelectionEngine::new();
        assert!(!engine.end_marquee(&camera, 800.0, 600.0, &mut sel, &reg));
    }

    #[test]
    fn test_pick_ignored_while_marquee_active() {
        let mut reg = PointRegistry::new();
        reg.add(Vec3::ZERO);

        let mut sel = SelectionSet::new();
        let mut engine = SelectionEngine::new();
        engine.begin_marquee(Vec2::ZERO);

        assert!(!engine.pick(&ray_toward(Vec3::ZERO), false, 0.1, &mut sel, &reg));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_delete_selected_removes_from_both() {
        let mut reg = PointRegistry::new();
        let a = reg.add(Vec3::ZERO);
        let b = reg.add(Vec3::ONE);
        let c = reg.add(Vec3::X);

        let mut sel = SelectionSet::new();
        sel.insert(a);
        sel.insert(b);

        let mut engine = SelectionEngine::new();
        let removed = engine.delete_selected(&mut sel, &mut reg);

        assert_eq!(removed, 2);
        assert!(sel.is_empty());
        assert!(!reg.contains(a));
        assert!(!reg.contains(b));
        assert!(reg.contains(c));
    }

    #[test]
    fn test_delete_with_empty_selection() {
        let mut reg = PointRegistry::new();
        reg.add(Vec3::ZERO);

        let mut sel = SelectionSet::new();
        let mut engine = SelectionEngine::new();

        assert_eq!(engine.delete_selected(&mut sel, &mut reg), 0);
        assert_eq!(reg.len(), 1);
    }
}
