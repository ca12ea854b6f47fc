// crates/editor-wasm/src/lib.rs

mod renderer;
mod shaders;
mod subscription;
mod utils;

use js_sys::Function;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use editor_core::PointId;
use editor_scene::Editor;
use editor_scene::glam::{Vec2, Vec3};

use crate::renderer::Renderer;
use crate::subscription::{Channel, SubscriptionManager};
use crate::utils::{axis_to_string, console_log};

// パニック時のスタックトレース表示
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Engine構造体
/// EditorとRendererを統合し、JSから操作可能なAPIを提供
#[wasm_bindgen]
pub struct Engine {
    editor: Editor,
    renderer: Renderer,
    subscriptions: SubscriptionManager,
}

#[wasm_bindgen]
impl Engine {
    /// 新しいEngineを作成（非同期）
    pub async fn create(canvas: HtmlCanvasElement) -> Result<Engine, JsValue> {
        console_log!("Creating Engine...");
        let renderer = Renderer::create(canvas).await?;
        let editor = Editor::new(renderer.width() as f32, renderer.height() as f32);
        console_log!("Engine created successfully");
        Ok(Self {
            editor,
            renderer,
            subscriptions: SubscriptionManager::new(),
        })
    }

    // ========================================================================
    // マーカー管理
    // ========================================================================

    /// マーカーを指定位置に追加し、IDを返す
    pub fn add_point(&mut self, x: f32, y: f32, z: f32) -> u32 {
        let id = self.editor.add_point(Vec3::new(x, y, z));
        self.flush_notifications();
        id.to_u32()
    }

    /// スクリーン座標から地面との交点にマーカーを追加
    /// レイが地面と交わらない場合はNone
    pub fn add_point_at_screen(&mut self, x: f32, y: f32) -> Option<u32> {
        let id = self.editor.add_point_at_screen(Vec2::new(x, y));
        self.flush_notifications();
        id.map(|id| id.to_u32())
    }

    /// マーカーを削除（存在しないIDは無視）
    pub fn remove_point(&mut self, id: u32) {
        self.editor.remove_points(&[PointId::from_u32(id)]);
        self.flush_notifications();
    }

    /// 選択中のマーカーを全削除し、削除数を返す
    pub fn delete_selected(&mut self) -> u32 {
        let removed = self.editor.delete_selected();
        self.flush_notifications();
        removed as u32
    }

    /// マーカー数を取得
    pub fn point_count(&self) -> usize {
        self.editor.registry().len()
    }

    /// 位置を取得（x, y, zの配列）
    pub fn point_position(&self, id: u32) -> Option<Vec<f32>> {
        self.editor
            .registry()
            .position(PointId::from_u32(id))
            .map(|p| vec![p.x, p.y, p.z])
    }

    /// 位置を設定
    pub fn set_point_position(&mut self, id: u32, x: f32, y: f32, z: f32) -> bool {
        let moved = self
            .editor
            .set_point_position(PointId::from_u32(id), Vec3::new(x, y, z));
        self.flush_notifications();
        moved
    }

    // ========================================================================
    // 選択
    // ========================================================================

    /// スクリーン座標で単体ピック
    /// additiveなら既存選択に追加する。選択が変化した場合true
    pub fn pick(&mut self, x: f32, y: f32, additive: bool) -> bool {
        let changed = self.editor.pick_at(Vec2::new(x, y), additive);
        self.flush_notifications();
        changed
    }

    /// 矩形選択を開始
    pub fn begin_marquee(&mut self, x: f32, y: f32) {
        self.editor.begin_marquee(Vec2::new(x, y));
    }

    /// 矩形選択の現在点を更新
    pub fn update_marquee(&mut self, x: f32, y: f32) {
        self.editor.update_marquee(Vec2::new(x, y));
    }

    /// 矩形選択を確定。選択が変化した場合true
    pub fn end_marquee(&mut self) -> bool {
        let changed = self.editor.end_marquee();
        self.flush_notifications();
        changed
    }

    /// ドラッグ中の矩形（left, top, right, bottomの配列）
    /// ホストがオーバーレイ矩形を描くために使う
    pub fn marquee_rect(&self) -> Option<Vec<f32>> {
        self.editor
            .marquee_rect()
            .map(|rect| vec![rect.left, rect.top, rect.right, rect.bottom])
    }

    /// 選択中のIDを挿入順で取得
    pub fn selection(&self) -> Vec<u32> {
        self.editor
            .current_selection()
            .iter()
            .map(|id| id.to_u32())
            .collect()
    }

    /// 選択中かどうか
    pub fn is_selected(&self, id: u32) -> bool {
        self.editor.is_selected(PointId::from_u32(id))
    }

    // ========================================================================
    // ウィジェット操作
    // ========================================================================

    /// ホバー中の軸を更新し、軸名を返す（カーソル切替用、ヒットなしは空文字）
    pub fn hover(&mut self, x: f32, y: f32) -> String {
        self.editor.hover_at(Vec2::new(x, y));
        axis_to_string(self.editor.gizmo().hovered_axis)
    }

    /// ウィジェットのドラッグを開始。軸にヒットした場合true
    pub fn begin_drag(&mut self, x: f32, y: f32) -> bool {
        self.editor.begin_drag(Vec2::new(x, y))
    }

    /// ドラッグ中のポインタ移動
    pub fn drag_to(&mut self, x: f32, y: f32) {
        self.editor.drag_to(Vec2::new(x, y));
        self.flush_notifications();
    }

    /// ドラッグを終了
    pub fn end_drag(&mut self) {
        self.editor.end_drag();
    }

    /// ウィジェット表示状態を取得
    pub fn is_gizmo_visible(&self) -> bool {
        self.editor.gizmo().visible
    }

    // ========================================================================
    // カメラ操作
    // ========================================================================

    /// カメラをターゲット周りで回転
    pub fn orbit_camera(&mut self, delta_x: f32, delta_y: f32) {
        self.editor.camera_mut().orbit(delta_x, delta_y);
    }

    /// カメラを平行移動
    pub fn pan_camera(&mut self, delta_x: f32, delta_y: f32) {
        self.editor.camera_mut().pan(delta_x, delta_y);
    }

    /// カメラをズーム
    pub fn zoom_camera(&mut self, delta: f32) {
        self.editor.camera_mut().zoom(delta);
    }

    // ========================================================================
    // 包囲ボックス
    // ========================================================================

    /// 現在の包囲ボックスを取得（{min, max}またはnull）
    pub fn bounds(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.editor.current_bounds()).unwrap_or(JsValue::NULL)
    }

    // ========================================================================
    // 購読
    // ========================================================================

    /// 選択変更コールバックを登録し、購読IDを返す
    pub fn on_selection_changed(&mut self, callback: Function) -> u32 {
        self.subscriptions.subscribe(Channel::Selection, callback)
    }

    /// 包囲ボックス変更コールバックを登録し、購読IDを返す
    pub fn on_bounds_changed(&mut self, callback: Function) -> u32 {
        self.subscriptions.subscribe(Channel::Bounds, callback)
    }

    /// 購読を解除
    pub fn unsubscribe(&mut self, id: u32) -> bool {
        self.subscriptions.unsubscribe(id)
    }

    // ========================================================================
    // フレーム
    // ========================================================================

    /// フレーム更新（描画のみ。状態変更はイベントAPI側で完結している）
    pub fn tick(&mut self) -> Result<(), JsValue> {
        self.renderer.render(&self.editor)
    }

    /// Canvasリサイズ
    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
        self.editor.resize(width as f32, height as f32);
    }

    /// 幅取得
    pub fn width(&self) -> u32 {
        self.renderer.width()
    }

    /// 高さ取得
    pub fn height(&self) -> u32 {
        self.renderer.height()
    }
}

impl Engine {
    /// 現在状態を購読者へ配信する
    /// 内容が前回と同じ購読はSubscriptionManager側でスキップされる
    fn flush_notifications(&mut self) {
        let selected: Vec<u32> = self
            .editor
            .current_selection()
            .iter()
            .map(|id| id.to_u32())
            .collect();
        self.subscriptions.notify(Channel::Selection, &selected);

        let bounds = self.editor.current_bounds();
        self.subscriptions.notify(Channel::Bounds, &bounds);
    }
}
