use crate::registry::{PointId, PointRegistry};

/// 選択中マーカーの集合
/// 挿入順を保持し、重複を許さない
/// メンバーは必ずPointRegistryに生存していること（削除時は両方から外す）
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    ids: Vec<PointId>,
}

impl SelectionSet {
    /// 空の選択集合を作成
    pub fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// IDを追加
    /// 既にメンバーの場合は何もせずfalseを返す
    pub fn insert(&mut self, id: PointId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// IDを除去
    /// メンバーでない場合はfalseを返す
    pub fn remove(&mut self, id: PointId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&member| member != id);
        self.ids.len() != before
    }

    /// 全メンバーを除去
    /// 何かを除去した場合true
    pub fn clear(&mut self) -> bool {
        if self.ids.is_empty() {
            return false;
        }
        self.ids.clear();
        true
    }

    /// メンバーかどうか
    pub fn contains(&self, id: PointId) -> bool {
        self.ids.contains(&id)
    }

    /// レジストリに存在しないメンバーを除去
    /// 何かを除去した場合true
    pub fn purge_missing(&mut self, registry: &PointRegistry) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&id| registry.contains(id));
        self.ids.len() != before
    }

    /// メンバーを挿入順にイテレート
    pub fn iter(&self) -> impl Iterator<Item = PointId> + '_ {
        self.ids.iter().copied()
    }

    /// メンバーのスライスを取得（挿入順）
    pub fn as_slice(&self) -> &[PointId] {
        &self.ids
    }

    /// メンバー数
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
