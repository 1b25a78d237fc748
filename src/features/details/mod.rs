/// 詳細画面モジュール
///
/// 撮影した写真に対するメタデータの入力・編集と、保存時の
/// レコード作成・更新を提供するモジュール。
// サブモジュールの宣言
pub mod screen;

// 公開インターフェース
pub use screen::{DetailsScreen, ReceiptForm};
