//! 変更通知の購読管理モジュール
//!
//! 選択と包囲ボックスの変更をJSコールバックへ届ける。
//! 前回送信したペイロードのハッシュを購読ごとに覚えておき、
//! 同一内容の連続通知を畳む（通知の嵐の防止）。

use js_sys::Function;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use wasm_bindgen::JsValue;

/// 購読チャンネル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// 選択集合の変更（選択中IDの配列）
    Selection,
    /// 包囲ボックスの変更（ボックスまたはnull）
    Bounds,
}

/// 購読情報
pub struct Subscription {
    pub channel: Channel,
    pub callback: Function,
    pub last_payload_hash: u64,
}

/// 購読マネージャー
pub struct SubscriptionManager {
    subscriptions: HashMap<u32, Subscription>,
    next_id: u32,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self {
            subscriptions: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn subscribe(&mut self, channel: Channel, callback: Function) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        self.subscriptions.insert(
            id,
            Subscription {
                channel,
                callback,
                last_payload_hash: 0,
            },
        );

        id
    }

    pub fn unsubscribe(&mut self, id: u32) -> bool {
        self.subscriptions.remove(&id).is_some()
    }

    /// チャンネルの購読へペイロードを配信
    /// 前回と同一内容の購読はスキップする
    pub fn notify<T: serde::Serialize>(&mut self, channel: Channel, payload: &T) {
        let hash = calculate_hash(payload);

        let mut value: Option<JsValue> = None;
        for subscription in self
            .subscriptions
            .values_mut()
            .filter(|subscription| subscription.channel == channel)
        {
            if subscription.last_payload_hash == hash {
                continue;
            }
            subscription.last_payload_hash = hash;

            // 必要になったときだけJsValueに変換
            let value = value
                .get_or_insert_with(|| {
                    serde_wasm_bindgen::to_value(payload).unwrap_or(JsValue::NULL)
                })
                .clone();
            let _ = subscription.callback.call1(&JsValue::NULL, &value);
        }
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// ペイロードのハッシュを計算
pub fn calculate_hash<T: serde::Serialize>(payload: &T) -> u64 {
    let json = serde_json::to_string(payload).unwrap_or_default();
    let mut hasher = DefaultHasher::new();
    json.hash(&mut hasher);
    hasher.finish()
}
