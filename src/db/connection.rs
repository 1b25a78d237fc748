use crate::shared::config::AppPaths;
use crate::shared::errors::{AppError, AppResult};
use rusqlite::Connection;

/// データベース接続を初期化し、テーブルを作成する
///
/// # 引数
/// * `paths` - アプリケーションのファイルパス一式
///
/// # 戻り値
/// データベース接続、または失敗時はエラー
///
/// # 処理内容
/// 1. データベース接続の開設
/// 2. テーブル作成とインデックス作成
pub fn initialize_database(paths: &AppPaths) -> AppResult<Connection> {
    let conn = Connection::open(&paths.database_path)
        .map_err(|e| AppError::Database(format!("データベースのオープンに失敗しました: {e}")))?;

    create_tables(&conn)?;

    log::info!(
        "データベースを初期化しました: {}",
        paths.database_path.display()
    );

    Ok(conn)
}

/// データベーステーブルを作成する
///
/// # 引数
/// * `conn` - データベース接続
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
pub fn create_tables(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS receipts (
            id TEXT PRIMARY KEY,
            image_path TEXT NOT NULL,
            created_at TEXT NOT NULL,
            date TEXT NOT NULL,
            amount REAL NOT NULL,
            currency TEXT NOT NULL,
            vendor TEXT,
            notes TEXT
        )",
        [],
    )?;

    create_indexes(conn)?;

    Ok(())
}

/// インデックスを作成する
fn create_indexes(conn: &Connection) -> AppResult<()> {
    // created_atは「最新」「一覧」クエリの唯一のソートキー
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_receipts_created_at ON receipts(created_at)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_receipts_image_path ON receipts(image_path)",
        [],
    )?;

    Ok(())
}
