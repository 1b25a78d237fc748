use crate::features::photos::PhotoStore;
use crate::features::receipts::repository;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// ギャラリー画面のフローコントローラ
///
/// 保存済みレシートの写真パス一覧と、写真+レコードの削除を担当する。
#[derive(Debug, Default)]
pub struct GalleryScreen {
    /// 表示中の写真パス一覧（作成日時の降順）
    pub photo_paths: Vec<PathBuf>,
}

impl GalleryScreen {
    /// ギャラリー画面を作成する
    pub fn new() -> Self {
        Self::default()
    }

    /// すべてのレシートの写真パスを取得する
    ///
    /// 各レコードの image_path のファイル名を正規ディレクトリへ写像し、
    /// 作成日時の降順で一覧にする。
    ///
    /// # 引数
    /// * `conn` - データベース接続
    /// * `store` - 写真ファイルストア
    pub fn fetch_all_photo_paths(&mut self, conn: &Connection, store: &PhotoStore) {
        match repository::find_all(conn) {
            Ok(receipts) => {
                self.photo_paths = receipts
                    .iter()
                    .filter_map(|receipt| store.resolve(&receipt.image_path))
                    .collect();
            }
            Err(e) => {
                log::error!("写真パス一覧の取得に失敗しました: {e}");
            }
        }
    }

    /// 写真とそのレコードを削除する
    ///
    /// 3つの独立したベストエフォート手順で構成される：
    /// 1. ファイルを削除する（失敗はログのみ、続行する）
    /// 2. ファイル名に一致するレコードをすべてストアから削除する
    ///    （失敗はログのみ、トランザクションはロールバック済み）
    /// 3. 表示中の一覧からパスを取り除く
    ///
    /// 同じファイル名を持つレコードは同じ正規パスに解決されるため、
    /// 手順2は一致する全レコードを対象にする。1件だけ消すと残りが
    /// 孤児となり、この画面から二度と削除できなくなる。
    ///
    /// 原子性は保証されない。手順の間で中断した場合、レコードか
    /// ファイルのどちらかが孤児として残りうる。
    ///
    /// # 引数
    /// * `conn` - データベース接続
    /// * `store` - 写真ファイルストア
    /// * `path` - 削除する写真のパス
    pub fn delete_photo(&mut self, conn: &Connection, store: &PhotoStore, path: &Path) {
        // 1. ファイル削除（ベストエフォート）
        if let Err(e) = store.remove(path) {
            log::warn!("{e}");
        }

        // 2. レコード削除（一致する全件）
        let path_str = path.to_string_lossy();
        match repository::delete_by_suffix(conn, &path_str) {
            Ok(0) => {
                log::warn!("削除対象のレコードが見つかりません: {path_str}");
            }
            Ok(deleted) => {
                if deleted > 1 {
                    log::warn!("同じファイル名のレコードを{deleted}件まとめて削除しました: {path_str}");
                }
            }
            Err(e) => {
                log::error!("レコードの削除に失敗しました: {e}");
            }
        }

        // 3. 一覧から除去
        self.photo_paths.retain(|p| p != path);
    }
}
