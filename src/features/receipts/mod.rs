/// レシートレコードストア
///
/// レシートレコードの作成・検索・更新・削除を提供するモジュール。
/// 物理的な保存形式はSQLiteが所有し、外部からはこのモジュールの
/// 操作のみを通じてアクセスされる。
// サブモジュールの宣言
pub mod models;
pub mod repository;

// 公開インターフェース：外部から使用可能な型と関数をエクスポート
pub use models::{CreateReceiptDto, ReceiptRecord, UpdateReceiptDto, DEFAULT_CURRENCY};
pub use repository::{
    create, delete, delete_by_suffix, find_all, find_by_id, find_by_suffix, find_latest, update,
};
