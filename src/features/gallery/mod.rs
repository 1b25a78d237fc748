/// ギャラリー画面モジュール
///
/// 保存済みレシート写真の一覧表示と削除を提供するモジュール。
// サブモジュールの宣言
pub mod screen;

// 公開インターフェース
pub use screen::GalleryScreen;
