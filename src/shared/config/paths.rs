use crate::shared::errors::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// データディレクトリを上書きする環境変数名
const DATA_DIR_ENV: &str = "RECEIPT_TRACKER_DATA_DIR";

/// アプリケーションが使用するファイルパス一式
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// アプリケーションデータディレクトリ
    pub data_dir: PathBuf,
    /// 写真ファイルの正規ディレクトリ
    pub photos_dir: PathBuf,
    /// データベースファイルのパス
    pub database_path: PathBuf,
}

impl AppPaths {
    /// 環境からファイルパス一式を解決する
    ///
    /// # 引数
    /// * `production` - プロダクション環境かどうか
    ///
    /// # 戻り値
    /// 解決されたパス一式、または失敗時はエラー
    ///
    /// # 解決順序
    /// 1. 環境変数 RECEIPT_TRACKER_DATA_DIR を最優先
    /// 2. プラットフォームのデータディレクトリ + "receipt-tracker"
    pub fn resolve(production: bool) -> AppResult<Self> {
        let data_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::data_dir()
                .ok_or_else(|| {
                    AppError::configuration("プラットフォームのデータディレクトリを取得できません")
                })?
                .join("receipt-tracker"),
        };

        Self::from_data_dir(data_dir, production)
    }

    /// 指定されたデータディレクトリからパス一式を構築する
    ///
    /// # 引数
    /// * `data_dir` - アプリケーションデータディレクトリ
    /// * `production` - プロダクション環境かどうか
    ///
    /// # 戻り値
    /// 構築されたパス一式、または失敗時はエラー
    ///
    /// # 動作
    /// データディレクトリと写真ディレクトリが存在しない場合は作成する。
    pub fn from_data_dir(data_dir: PathBuf, production: bool) -> AppResult<Self> {
        let photos_dir = data_dir.join("photos");
        let database_path = data_dir.join(database_filename(production));

        ensure_directory(&data_dir)?;
        ensure_directory(&photos_dir)?;

        Ok(Self {
            data_dir,
            photos_dir,
            database_path,
        })
    }
}

/// 環境に応じたデータベースファイル名を取得する
///
/// # 引数
/// * `production` - プロダクション環境かどうか
///
/// # 戻り値
/// データベースファイル名
///
/// # ファイル名の規則
/// - 開発環境: "dev_receipts.db"
/// - プロダクション環境: "receipts.db"
fn database_filename(production: bool) -> &'static str {
    if production {
        "receipts.db"
    } else {
        "dev_receipts.db"
    }
}

/// ディレクトリが存在しない場合は作成する
fn ensure_directory(dir: &Path) -> AppResult<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| {
            AppError::configuration(format!("ディレクトリの作成に失敗: {}: {e}", dir.display()))
        })?;
        log::info!("ディレクトリを作成しました: {}", dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_data_dir_creates_directories() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("app-data");

        let paths = AppPaths::from_data_dir(root.clone(), false).unwrap();

        assert!(paths.data_dir.exists());
        assert!(paths.photos_dir.exists());
        assert_eq!(paths.photos_dir, root.join("photos"));
        assert_eq!(paths.database_path, root.join("dev_receipts.db"));
    }

    #[test]
    fn test_database_filename() {
        assert_eq!(database_filename(true), "receipts.db");
        assert_eq!(database_filename(false), "dev_receipts.db");
    }
}
