use glam::Vec3;

use super::point::PointId;

/// スロットの生存情報と位置
struct Slot {
    /// 現在の世代番号
    generation: u32,
    /// 生存フラグ
    alive: bool,
    /// マーカーのワールド座標
    position: Vec3,
}

/// 全マーカーを所有するレジストリ
/// 位置の唯一の所有者であり、他のコンポーネントはPointIdで参照する
pub struct PointRegistry {
    slots: Vec<Slot>,
    /// 再利用可能なインデックス
    free_list: Vec<u32>,
}

impl PointRegistry {
    /// 空のレジストリを作成
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// 新規マーカーを指定位置に追加し、IDを返す
    pub fn add(&mut self, position: Vec3) -> PointId {
        if let Some(index) = self.free_list.pop() {
            // 再利用: 世代番号をインクリメント
            let slot = &mut self.slots[index as usize];
            slot.generation += 1;
            slot.alive = true;
            slot.position = position;
            PointId::new(index, slot.generation)
        } else {
            // 新規割り当て
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 1,
                alive: true,
                position,
            });
            PointId::new(index, 1)
        }
    }

    /// マーカーを削除
    /// 成功時true、既に削除済みまたは無効なIDの場合false
    pub fn remove(&mut self, id: PointId) -> bool {
        let index = id.index() as usize;

        if index >= self.slots.len() {
            return false;
        }

        let slot = &mut self.slots[index];
        if !slot.alive || slot.generation != id.generation() {
            return false;
        }

        slot.alive = false;
        self.free_list.push(id.index());

        true
    }

    /// マーカーが生存しているか確認
    pub fn contains(&self, id: PointId) -> bool {
        let index = id.index() as usize;
        self.slots
            .get(index)
            .is_some_and(|slot| slot.alive && slot.generation == id.generation())
    }

    /// 位置を取得
    pub fn position(&self, id: PointId) -> Option<Vec3> {
        if !self.contains(id) {
            return None;
        }
        Some(self.slots[id.index() as usize].position)
    }

    /// 位置を設定
    /// 無効なIDの場合は何もせずfalseを返す
    pub fn set_position(&mut self, id: PointId, position: Vec3) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.slots[id.index() as usize].position = position;
        true
    }

    /// 位置に差分を加算
    pub fn translate(&mut self, id: PointId, delta: Vec3) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.slots[id.index() as usize].position += delta;
        true
    }

    /// 全生存マーカーをスロット順にイテレート
    pub fn iter(&self) -> impl Iterator<Item = (PointId, Vec3)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.alive)
            .map(|(index, slot)| (PointId::new(index as u32, slot.generation), slot.position))
    }

    /// 生存マーカー数を取得
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.alive).count()
    }

    /// レジストリが空かどうか
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PointRegistry {
    fn default() -> Self {
        Self::new()
    }
}
