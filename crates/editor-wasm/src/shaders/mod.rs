//! シェーダーモジュール
//!
//! WGSLシェーダーを外部ファイルから読み込む

/// マーカーシェーダー（球マーカー描画用）
pub const MARKER_SHADER: &str = include_str!("marker.wgsl");

/// ラインシェーダー（包囲ボックス・ウィジェット描画用）
pub const LINE_SHADER: &str = include_str!("line.wgsl");
