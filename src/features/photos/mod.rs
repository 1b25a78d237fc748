/// 写真ファイルストア
///
/// 正規ディレクトリ配下の画像ブロブの保存・解決・削除を提供するモジュール。
// サブモジュールの宣言
pub mod store;

// 公開インターフェース
pub use store::{file_name_of, PhotoStore};
