//! エディタ本体
//!
//! レジストリ・選択・ピボット・包囲ボックス・ウィジェット・カメラを統合し、
//! 入力イベント1回を1ジェスチャとして処理する。状態変更はすべてここを
//! 経由し、描画側は読み取りのみ（変更はイベント処理、描画はtick内の参照）。
//!
//! 1ジェスチャ内の処理順は固定:
//! 選択の解決 → ピボット差分の適用 → 包囲ボックス再計算 → 通知

use glam::{Vec2, Vec3};

use editor_core::{Aabb, BoundsTracker, GroupPivot, PointId, PointRegistry, SelectionSet};

use crate::camera::Camera;
use crate::gizmo::{GizmoAxis, TranslateGizmo};
use crate::marquee::ScreenRect;
use crate::mesh::MARKER_RADIUS;
use crate::picking::Ray;
use crate::select::SelectionEngine;

/// 選択変更リスナー（選択中IDの挿入順スライスを受け取る）
type SelectionListener = Box<dyn FnMut(&[PointId])>;
/// 包囲ボックス変更リスナー（レジストリが空ならNone）
type BoundsListener = Box<dyn FnMut(Option<&Aabb>)>;

/// ドラッグ中の軸と前回レイ
#[derive(Debug, Clone, Copy)]
struct DragState {
    axis: GizmoAxis,
    prev_ray: Ray,
}

/// エディタ本体
pub struct Editor {
    registry: PointRegistry,
    selection: SelectionSet,
    select: SelectionEngine,
    pivot: GroupPivot,
    bounds: BoundsTracker,
    gizmo: TranslateGizmo,
    camera: Camera,
    width: f32,
    height: f32,
    drag: Option<DragState>,
    selection_listeners: Vec<SelectionListener>,
    bounds_listeners: Vec<BoundsListener>,
}

impl Editor {
    /// 指定ビューポートサイズで新しいエディタを作成
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            registry: PointRegistry::new(),
            selection: SelectionSet::new(),
            select: SelectionEngine::new(),
            pivot: GroupPivot::new(),
            bounds: BoundsTracker::new(),
            gizmo: TranslateGizmo::default(),
            camera: Camera::new(width / height),
            width,
            height,
            drag: None,
            selection_listeners: Vec::new(),
            bounds_listeners: Vec::new(),
        }
    }

    // ========================================================================
    // リスナー登録
    // ========================================================================

    /// 選択変更リスナーを登録
    pub fn on_selection_changed(&mut self, listener: impl FnMut(&[PointId]) + 'static) {
        self.selection_listeners.push(Box::new(listener));
    }

    /// 包囲ボックス変更リスナーを登録
    pub fn on_bounds_changed(&mut self, listener: impl FnMut(Option<&Aabb>) + 'static) {
        self.bounds_listeners.push(Box::new(listener));
    }

    // ========================================================================
    // マーカー管理
    // ========================================================================

    /// マーカーを指定位置に追加
    pub fn add_point(&mut self, position: Vec3) -> PointId {
        let id = self.registry.add(position);
        self.refresh_bounds();
        id
    }

    /// スクリーン座標から地面（y = 0）との交点にマーカーを追加
    /// レイが地面と交わらない場合はNone
    pub fn add_point_at_screen(&mut self, screen: Vec2) -> Option<PointId> {
        let ray = self.camera.screen_to_ray(screen, self.width, self.height);
        let t = ray.intersect_plane(Vec3::ZERO, Vec3::Y)?;
        if t < 0.0 {
            return None;
        }
        Some(self.add_point(ray.at(t)))
    }

    /// 指定したマーカー群を削除
    /// 選択集合とレジストリの両方から同一ジェスチャ内で取り除く。
    /// 存在しないIDは黙って無視する。
    pub fn remove_points(&mut self, ids: &[PointId]) {
        let mut selection_changed = false;
        let mut structural = false;

        for &id in ids {
            selection_changed |= self.selection.remove(id);
            structural |= self.registry.remove(id);
        }

        if selection_changed {
            self.finish_selection_gesture();
        }
        if structural {
            self.refresh_bounds();
        }
    }

    /// 選択中のマーカーを全削除
    /// 削除した個数を返す
    pub fn delete_selected(&mut self) -> usize {
        let had_selection = !self.selection.is_empty();
        let removed = self
            .select
            .delete_selected(&mut self.selection, &mut self.registry);

        if had_selection {
            self.finish_selection_gesture();
        }
        if removed > 0 {
            self.refresh_bounds();
        }
        removed
    }

    // ========================================================================
    // 選択
    // ========================================================================

    /// スクリーン座標で単体ピック
    /// additiveなら既存選択に追加、そうでなければ置き換える。
    /// 選択が変化した場合true。
    pub fn pick_at(&mut self, screen: Vec2, additive: bool) -> bool {
        let ray = self.camera.screen_to_ray(screen, self.width, self.height);
        let changed = self.select.pick(
            &ray,
            additive,
            MARKER_RADIUS,
            &mut self.selection,
            &self.registry,
        );
        if changed {
            self.finish_selection_gesture();
        }
        changed
    }

    /// 矩形選択を開始
    pub fn begin_marquee(&mut self, screen: Vec2) {
        self.select.begin_marquee(screen);
    }

    /// 矩形選択の現在点を更新
    pub fn update_marquee(&mut self, screen: Vec2) {
        self.select.update_marquee(screen);
    }

    /// ドラッグ中の矩形（ホストのオーバーレイ描画用）
    pub fn marquee_rect(&self) -> Option<ScreenRect> {
        self.select.marquee_rect()
    }

    /// 矩形選択を確定
    /// 選択が変化した場合true
    pub fn end_marquee(&mut self) -> bool {
        let changed = self.select.end_marquee(
            &self.camera,
            self.width,
            self.height,
            &mut self.selection,
            &self.registry,
        );
        if changed {
            self.finish_selection_gesture();
        }
        changed
    }

    // ========================================================================
    // ウィジェット操作
    // ========================================================================

    /// ウィジェットのホバー軸を更新（ドラッグ中は変更しない）
    pub fn hover_at(&mut self, screen: Vec2) {
        if self.drag.is_some() || !self.gizmo.visible {
            return;
        }
        let ray = self.camera.screen_to_ray(screen, self.width, self.height);
        let axis = self.gizmo.hit_test(&ray, self.camera.position);
        self.gizmo.hovered_axis = axis;
    }

    /// ウィジェットのドラッグを開始
    /// 軸にヒットした場合true
    pub fn begin_drag(&mut self, screen: Vec2) -> bool {
        if !self.gizmo.visible {
            return false;
        }

        let ray = self.camera.screen_to_ray(screen, self.width, self.height);
        let axis = self.gizmo.hit_test(&ray, self.camera.position);
        if axis == GizmoAxis::None {
            return false;
        }

        self.gizmo.active_axis = axis;
        self.drag = Some(DragState {
            axis,
            prev_ray: ray,
        });
        true
    }

    /// ドラッグ中のポインタ移動
    /// 前回レイとの差分を選択へ適用し、包囲ボックスを再計算する
    pub fn drag_to(&mut self, screen: Vec2) {
        let Some(DragState { axis, prev_ray }) = self.drag else {
            return;
        };

        let ray = self.camera.screen_to_ray(screen, self.width, self.height);
        let delta = self
            .gizmo
            .drag_delta(axis, &ray, &prev_ray, self.camera.position);
        self.drag = Some(DragState {
            axis,
            prev_ray: ray,
        });

        if delta == Vec3::ZERO {
            return;
        }

        match self.selection.len() {
            0 => return,
            1 => {
                // 単体選択はピボットを介さず直接動かす
                let id = self.selection.as_slice()[0];
                self.registry.translate(id, delta);
                self.gizmo.position += delta;
            }
            _ => {
                let target = self.gizmo.position + delta;
                self.pivot
                    .move_to(target, &self.selection, &mut self.registry);
                self.gizmo.position = target;
            }
        }

        // ピボット適用後に再計算（描画が移動後の箱を映すように）
        self.refresh_bounds();
    }

    /// ドラッグを終了
    pub fn end_drag(&mut self) {
        self.drag = None;
        self.gizmo.active_axis = GizmoAxis::None;
    }

    // ========================================================================
    // 参照系
    // ========================================================================

    /// 現在の選択（挿入順）
    pub fn current_selection(&self) -> &[PointId] {
        self.selection.as_slice()
    }

    /// 選択中かどうか
    pub fn is_selected(&self, id: PointId) -> bool {
        self.selection.contains(id)
    }

    /// 現在の包囲ボックス（レジストリが空ならNone）
    pub fn current_bounds(&self) -> Option<Aabb> {
        self.bounds.current()
    }

    /// 現在のピボット位置（複数選択時のみSome）
    pub fn pivot_position(&self) -> Option<Vec3> {
        self.pivot.position()
    }

    pub fn registry(&self) -> &PointRegistry {
        &self.registry
    }

    pub fn gizmo(&self) -> &TranslateGizmo {
        &self.gizmo
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// カメラへの可変参照（軌道・パン・ズームはここ経由。通知は発生しない）
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// マーカー位置を直接設定（ホストAPI用）
    pub fn set_point_position(&mut self, id: PointId, position: Vec3) -> bool {
        if !self.registry.set_position(id, position) {
            return false;
        }
        // 単体選択中の対象ならウィジェットを追従させる
        if self.selection.as_slice() == [id] {
            self.gizmo.position = position;
        }
        self.refresh_bounds();
        true
    }

    /// ビューポートサイズ変更
    pub fn resize(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.width = width;
            self.height = height;
            self.camera.set_aspect(width / height);
        }
    }

    // ========================================================================
    // 内部処理
    // ========================================================================

    /// 選択ジェスチャの後処理
    /// ピボットとウィジェットを新しい選択に合わせ、通知を1回発行する
    fn finish_selection_gesture(&mut self) {
        self.sync_widget();
        self.notify_selection();
    }

    /// 選択人数に応じてピボットとウィジェットを張り直す
    fn sync_widget(&mut self) {
        match self.selection.len() {
            0 => {
                self.pivot.detach();
                self.gizmo.detach();
            }
            1 => {
                // 単体選択はウィジェットをマーカーに直接アタッチ
                self.pivot.detach();
                let id = self.selection.as_slice()[0];
                if let Some(position) = self.registry.position(id) {
                    self.gizmo.attach(position);
                }
            }
            _ => {
                self.pivot.rebind(&self.selection, &self.registry);
                if let Some(position) = self.pivot.position() {
                    self.gizmo.attach(position);
                }
            }
        }
    }

    /// 包囲ボックスを全折り畳みで再計算して通知
    fn refresh_bounds(&mut self) {
        let aabb = self.bounds.recompute(&self.registry);
        for listener in &mut self.bounds_listeners {
            listener(aabb.as_ref());
        }
    }

    /// 選択変更を通知（1ジェスチャ1回）
    fn notify_selection(&mut self) {
        let ids: Vec<PointId> = self.selection.as_slice().to_vec();
        for listener in &mut self.selection_listeners {
            listener(&ids);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn editor() -> Editor {
        Editor::new(800.0, 600.0)
    }

    /// ワールド座標をスクリーン座標へ（テスト入力の生成用）
    fn screen_of(editor: &Editor, world: Vec3) -> Vec2 {
        editor
            .camera()
            .world_to_screen(world, 800.0, 600.0)
            .expect("point must be in front of the camera")
    }

    #[test]
    fn test_bounds_scenario_three_markers() {
        let mut ed = editor();
        ed.add_point(Vec3::new(0.0, 0.0, 0.0));
        ed.add_point(Vec3::new(2.0, 0.0, 0.0));
        ed.add_point(Vec3::new(1.0, 3.0, 0.0));

        let aabb = ed.current_bounds().unwrap();
        assert_eq!(aabb.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(2.0, 3.0, 0.0));
    }

    #[test]
    fn test_empty_editor_has_no_bounds() {
        let ed = editor();
        assert!(ed.current_bounds().is_none());
        assert!(ed.current_selection().is_empty());
    }

    #[test]
    fn test_pick_then_additive_pick_builds_multi_selection() {
        let mut ed = editor();
        let a = ed.add_point(Vec3::new(0.0, 0.0, 0.0));
        let b = ed.add_point(Vec3::new(2.0, 0.0, 0.0));
        let _c = ed.add_point(Vec3::new(1.0, 3.0, 0.0));

        assert!(ed.pick_at(screen_of(&ed, Vec3::new(0.0, 0.0, 0.0)), false));
        assert_eq!(ed.current_selection(), &[a]);
        // 単体選択: ピボットなし、ウィジェットはマーカー位置
        assert!(ed.pivot_position().is_none());
        assert!(ed.gizmo().visible);
        assert_eq!(ed.gizmo().position, Vec3::ZERO);

        assert!(ed.pick_at(screen_of(&ed, Vec3::new(2.0, 0.0, 0.0)), true));
        assert_eq!(ed.current_selection(), &[a, b]);
        // 複数選択: ピボットは重心
        assert_eq!(ed.pivot_position(), Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(ed.gizmo().position, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_group_drag_moves_selected_rigidly() {
        let mut ed = editor();
        let a = ed.add_point(Vec3::new(0.0, 0.0, 0.0));
        let b = ed.add_point(Vec3::new(2.0, 0.0, 0.0));
        let c = ed.add_point(Vec3::new(1.0, 3.0, 0.0));

        ed.pick_at(screen_of(&ed, Vec3::new(0.0, 0.0, 0.0)), false);
        ed.pick_at(screen_of(&ed, Vec3::new(2.0, 0.0, 0.0)), true);
        assert_eq!(ed.pivot_position(), Some(Vec3::new(1.0, 0.0, 0.0)));

        // ピボットのX軸シャフト上をつかむ
        let pivot = ed.gizmo().position;
        let scale = ed.gizmo().scale(ed.camera().position);
        let grab_world = pivot + Vec3::new(scale * 0.7, 0.0, 0.0);
        assert!(ed.begin_drag(screen_of(&ed, grab_world)));

        // X方向へワールド距離1だけドラッグ
        ed.drag_to(screen_of(&ed, grab_world + Vec3::new(1.0, 0.0, 0.0)));
        ed.end_drag();

        let pos_a = ed.registry().position(a).unwrap();
        let pos_b = ed.registry().position(b).unwrap();
        let pos_c = ed.registry().position(c).unwrap();

        // 選択中の2つは同じ差分で動き、非選択は不動
        assert!((pos_a - Vec3::new(1.0, 0.0, 0.0)).length() < 0.02);
        assert!((pos_b - Vec3::new(3.0, 0.0, 0.0)).length() < 0.02);
        assert_eq!(pos_c, Vec3::new(1.0, 3.0, 0.0));

        // 包囲ボックスは移動後の位置を反映する
        let aabb = ed.current_bounds().unwrap();
        assert!((aabb.min - Vec3::new(1.0, 0.0, 0.0)).length() < 0.02);
        assert!((aabb.max - Vec3::new(3.0, 3.0, 0.0)).length() < 0.02);
    }

    #[test]
    fn test_single_selection_drag_bypasses_pivot() {
        let mut ed = editor();
        let a = ed.add_point(Vec3::ZERO);

        ed.pick_at(screen_of(&ed, Vec3::ZERO), false);
        assert!(ed.pivot_position().is_none());

        let scale = ed.gizmo().scale(ed.camera().position);
        let grab_world = Vec3::new(scale * 0.7, 0.0, 0.0);
        assert!(ed.begin_drag(screen_of(&ed, grab_world)));
        ed.drag_to(screen_of(&ed, grab_world + Vec3::new(0.5, 0.0, 0.0)));
        ed.end_drag();

        let pos = ed.registry().position(a).unwrap();
        assert!((pos - Vec3::new(0.5, 0.0, 0.0)).length() < 0.02);
        // ドラッグ中もピボットは生まれない
        assert!(ed.pivot_position().is_none());
    }

    #[test]
    fn test_delete_selected_scenario() {
        let mut ed = editor();
        let a = ed.add_point(Vec3::new(0.0, 0.0, 0.0));
        let b = ed.add_point(Vec3::new(2.0, 0.0, 0.0));
        let c = ed.add_point(Vec3::new(1.0, 3.0, 0.0));

        ed.pick_at(screen_of(&ed, Vec3::new(2.0, 0.0, 0.0)), false);
        assert_eq!(ed.current_selection(), &[b]);

        assert_eq!(ed.delete_selected(), 1);
        assert!(ed.current_selection().is_empty());
        assert!(!ed.registry().contains(b));
        assert!(ed.registry().contains(a));
        assert!(ed.registry().contains(c));
        assert!(!ed.gizmo().visible);

        let aabb = ed.current_bounds().unwrap();
        assert_eq!(aabb.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 3.0, 0.0));
    }

    #[test]
    fn test_remove_points_purges_selection() {
        let mut ed = editor();
        let a = ed.add_point(Vec3::ZERO);
        let b = ed.add_point(Vec3::new(2.0, 0.0, 0.0));

        ed.pick_at(screen_of(&ed, Vec3::ZERO), false);
        ed.pick_at(screen_of(&ed, Vec3::new(2.0, 0.0, 0.0)), true);
        assert_eq!(ed.current_selection(), &[a, b]);

        ed.remove_points(&[b]);
        assert_eq!(ed.current_selection(), &[a]);
        assert!(!ed.registry().contains(b));

        // 存在しないIDの削除は静かに無視される
        ed.remove_points(&[b]);
        assert_eq!(ed.current_selection(), &[a]);
    }

    #[test]
    fn test_one_notification_per_gesture() {
        let mut ed = editor();
        ed.add_point(Vec3::new(0.2, 0.0, 0.0));
        ed.add_point(Vec3::new(-0.2, 0.0, 0.0));

        let count = Rc::new(Cell::new(0));
        let count_in_listener = Rc::clone(&count);
        ed.on_selection_changed(move |_| {
            count_in_listener.set(count_in_listener.get() + 1);
        });

        // 矩形選択で2個拾っても通知は1回
        ed.begin_marquee(Vec2::ZERO);
        ed.update_marquee(Vec2::new(800.0, 600.0));
        ed.end_marquee();
        assert_eq!(count.get(), 1);
        assert_eq!(ed.current_selection().len(), 2);

        // 全削除も1回
        ed.delete_selected();
        assert_eq!(count.get(), 2);

        // 変化のないジェスチャは通知しない
        ed.end_marquee();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_bounds_listener_fires_on_structural_changes() {
        let mut ed = editor();

        let seen = Rc::new(Cell::new(0));
        let last_empty = Rc::new(Cell::new(true));
        let seen_in_listener = Rc::clone(&seen);
        let empty_in_listener = Rc::clone(&last_empty);
        ed.on_bounds_changed(move |aabb| {
            seen_in_listener.set(seen_in_listener.get() + 1);
            empty_in_listener.set(aabb.is_none());
        });

        let a = ed.add_point(Vec3::ZERO);
        assert_eq!(seen.get(), 1);
        assert!(!last_empty.get());

        ed.remove_points(&[a]);
        assert_eq!(seen.get(), 2);
        assert!(last_empty.get());
    }

    #[test]
    fn test_marquee_rect_is_exposed_while_dragging() {
        let mut ed = editor();
        assert!(ed.marquee_rect().is_none());

        ed.begin_marquee(Vec2::new(10.0, 10.0));
        ed.update_marquee(Vec2::new(50.0, 40.0));
        let rect = ed.marquee_rect().unwrap();
        assert_eq!(rect.width(), 40.0);
        assert_eq!(rect.height(), 30.0);

        ed.end_marquee();
        assert!(ed.marquee_rect().is_none());
    }

    #[test]
    fn test_add_point_at_screen_lands_on_ground_plane() {
        let mut ed = editor();
        let id = ed.add_point_at_screen(Vec2::new(400.0, 300.0)).unwrap();
        let position = ed.registry().position(id).unwrap();
        assert!(position.y.abs() < 1e-4);
    }

    #[test]
    fn test_set_point_position_refreshes_bounds_and_widget() {
        let mut ed = editor();
        let a = ed.add_point(Vec3::ZERO);
        ed.pick_at(screen_of(&ed, Vec3::ZERO), false);

        assert!(ed.set_point_position(a, Vec3::new(0.0, 2.0, 0.0)));
        assert_eq!(ed.gizmo().position, Vec3::new(0.0, 2.0, 0.0));
        let aabb = ed.current_bounds().unwrap();
        assert_eq!(aabb.max, Vec3::new(0.0, 2.0, 0.0));
    }
}
