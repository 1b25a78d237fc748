pub mod db;
pub mod features;
pub mod shared;

use rusqlite::Connection;
use std::sync::Mutex;

/// アプリケーション状態（データベース接続を保持）
pub struct AppState {
    pub db: Mutex<Connection>,
}

impl AppState {
    /// アプリケーション状態を作成する
    ///
    /// # 引数
    /// * `conn` - 初期化済みのデータベース接続
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }
}
