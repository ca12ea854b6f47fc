//! 複数選択の一括移動用ピボット
//!
//! 選択が2個以上のときだけ単一の仮想アンカーを持ち、アンカーの移動差分を
//! 選択中の全マーカーへそのまま伝播する（剛体的な平行移動のみ）。
//! ピボット位置は選択メンバーが変わった瞬間の重心で固定する。ドラッグ中に
//! 毎フレーム重心を取り直すとピボット自身の移動を追いかけて相殺するため、
//! 位置変化だけでは再計算しない。

use glam::Vec3;

use crate::registry::PointRegistry;
use crate::selection::SelectionSet;

/// 点列の重心を計算
/// 空の場合はNone
pub fn centroid(points: impl IntoIterator<Item = Vec3>) -> Option<Vec3> {
    let mut sum = Vec3::ZERO;
    let mut count = 0u32;
    for point in points {
        sum += point;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(sum / count as f32)
}

/// ピボットアンカー
/// previousは前回適用時の位置（差分累積の基準）
#[derive(Debug, Clone, Copy)]
struct Anchor {
    position: Vec3,
    previous: Vec3,
}

/// 複数選択ピボット
/// 選択が1個以下の間はアンカーを持たない
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupPivot {
    anchor: Option<Anchor>,
}

impl GroupPivot {
    pub fn new() -> Self {
        Self { anchor: None }
    }

    /// 選択メンバー変更に追従する
    /// 2個以上なら現在の重心にアンカーを張り直し、それ以外は外す
    pub fn rebind(&mut self, selection: &SelectionSet, registry: &PointRegistry) {
        if selection.len() > 1 {
            let center = centroid(selection.iter().filter_map(|id| registry.position(id)));
            self.anchor = center.map(|position| Anchor {
                position,
                previous: position,
            });
        } else {
            self.anchor = None;
        }
    }

    /// アンカーを外す
    pub fn detach(&mut self) {
        self.anchor = None;
    }

    /// 現在のアンカー位置
    pub fn position(&self) -> Option<Vec3> {
        self.anchor.map(|anchor| anchor.position)
    }

    /// アンカーを新しい位置へ動かし、前回位置との差分を選択中の全マーカーに
    /// 加算する。適用後にpreviousを更新する（累積オフセットの二重適用防止）。
    /// 適用した差分を返す。アンカーが無い場合はNone。
    pub fn move_to(
        &mut self,
        position: Vec3,
        selection: &SelectionSet,
        registry: &mut PointRegistry,
    ) -> Option<Vec3> {
        let anchor = self.anchor.as_mut()?;
        let delta = position - anchor.previous;

        for id in selection.iter() {
            registry.translate(id, delta);
        }

        anchor.previous = position;
        anchor.position = position;
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_marker_registry() -> (PointRegistry, crate::PointId, crate::PointId, crate::PointId) {
        let mut reg = PointRegistry::new();
        let a = reg.add(Vec3::new(0.0, 0.0, 0.0));
        let b = reg.add(Vec3::new(2.0, 0.0, 0.0));
        let c = reg.add(Vec3::new(1.0, 3.0, 0.0));
        (reg, a, b, c)
    }

    #[test]
    fn test_centroid() {
        let points = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)];
        assert_eq!(centroid(points), Some(Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_centroid_empty() {
        assert_eq!(centroid(std::iter::empty()), None);
    }

    #[test]
    fn test_rebind_requires_multi_selection() {
        let (reg, a, _, _) = three_marker_registry();
        let mut sel = SelectionSet::new();
        let mut pivot = GroupPivot::new();

        pivot.rebind(&sel, &reg);
        assert_eq!(pivot.position(), None);

        sel.insert(a);
        pivot.rebind(&sel, &reg);
        assert_eq!(pivot.position(), None);
    }

    #[test]
    fn test_rebind_at_centroid() {
        let (reg, a, b, _) = three_marker_registry();
        let mut sel = SelectionSet::new();
        sel.insert(a);
        sel.insert(b);

        let mut pivot = GroupPivot::new();
        pivot.rebind(&sel, &reg);
        assert_eq!(pivot.position(), Some(Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_move_to_applies_same_delta_to_all_selected() {
        let (mut reg, a, b, c) = three_marker_registry();
        let mut sel = SelectionSet::new();
        sel.insert(a);
        sel.insert(b);

        let mut pivot = GroupPivot::new();
        pivot.rebind(&sel, &reg);

        let delta = pivot
            .move_to(Vec3::new(2.0, 1.0, 0.0), &sel, &mut reg)
            .unwrap();
        assert_eq!(delta, Vec3::new(1.0, 1.0, 0.0));

        assert_eq!(reg.position(a), Some(Vec3::new(1.0, 1.0, 0.0)));
        assert_eq!(reg.position(b), Some(Vec3::new(3.0, 1.0, 0.0)));
        // 非選択マーカーは動かない
        assert_eq!(reg.position(c), Some(Vec3::new(1.0, 3.0, 0.0)));
    }

    #[test]
    fn test_move_to_accumulates_frame_deltas() {
        let (mut reg, a, b, _) = three_marker_registry();
        let mut sel = SelectionSet::new();
        sel.insert(a);
        sel.insert(b);

        let mut pivot = GroupPivot::new();
        pivot.rebind(&sel, &reg);

        // 2フレームに分けて動かしても合計差分だけが乗る
        pivot.move_to(Vec3::new(1.5, 0.0, 0.0), &sel, &mut reg);
        pivot.move_to(Vec3::new(2.0, 1.0, 0.0), &sel, &mut reg);

        assert_eq!(reg.position(a), Some(Vec3::new(1.0, 1.0, 0.0)));
        assert_eq!(reg.position(b), Some(Vec3::new(3.0, 1.0, 0.0)));
    }

    #[test]
    fn test_move_without_anchor_is_noop() {
        let (mut reg, a, _, _) = three_marker_registry();
        let sel = SelectionSet::new();
        let mut pivot = GroupPivot::new();

        assert_eq!(pivot.move_to(Vec3::ONE, &sel, &mut reg), None);
        assert_eq!(reg.position(a), Some(Vec3::ZERO));
    }

    #[test]
    fn test_rebind_on_membership_change_resets_previous() {
        let (mut reg, a, b, c) = three_marker_registry();
        let mut sel = SelectionSet::new();
        sel.insert(a);
        sel.insert(b);

        let mut pivot = GroupPivot::new();
        pivot.rebind(&sel, &reg);
        pivot.move_to(Vec3::new(2.0, 0.0, 0.0), &sel, &mut reg);

        // メンバー追加で重心に張り直し
        sel.insert(c);
        pivot.rebind(&sel, &reg);
        let expected = centroid(sel.iter().filter_map(|id| reg.position(id))).unwrap();
        assert_eq!(pivot.position(), Some(expected));

        // 張り直し直後の移動は新しいpreviousからの差分になる
        let delta = pivot.move_to(expected + Vec3::Y, &sel, &mut reg).unwrap();
        assert_eq!(delta, Vec3::Y);
    }
}
