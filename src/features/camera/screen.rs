use crate::features::camera::manager::CameraAdapter;
use crate::features::photos::PhotoStore;
use crate::shared::errors::{AppError, AppResult};
use crate::features::receipts::repository;
use rusqlite::Connection;
use std::path::PathBuf;
use tokio::sync::watch;

/// カメラ画面のフローコントローラ
///
/// 権限要求 → セッション開始 → 撮影 → セッション停止 → 詳細画面への
/// 遷移を調整する。アダプタは明示的に注入され、この画面が1つの
/// アダプタインスタンスを単独で観測する。
pub struct CameraScreen<C: CameraAdapter> {
    adapter: C,
    store: PhotoStore,
    running_rx: watch::Receiver<bool>,

    /// カメラ権限の状態（None = 未確認）
    pub permission: Option<bool>,
    /// サムネイル表示用の最新写真パス
    pub last_photo_path: Option<PathBuf>,
}

impl<C: CameraAdapter> CameraScreen<C> {
    /// カメラ画面を作成する
    ///
    /// # 引数
    /// * `adapter` - カメラアダプタ
    /// * `store` - 写真ファイルストア
    ///
    /// # 戻り値
    /// カメラ画面
    pub fn new(adapter: C, store: PhotoStore) -> Self {
        let running_rx = adapter.subscribe_running();

        Self {
            adapter,
            store,
            running_rx,
            permission: None,
            last_photo_path: None,
        }
    }

    /// 画面表示時の処理
    ///
    /// サムネイルを更新し、権限が未確認の場合のみプロンプトを表示する。
    /// 許可されている場合はセッションを構成して開始する。拒否されて
    /// いる場合は何もしない（OS設定の変更が唯一の復帰経路であり、
    /// 次回の画面表示時に再判定される）。
    ///
    /// # 引数
    /// * `conn` - データベース接続
    pub async fn on_appear(&mut self, conn: &Connection) {
        self.fetch_latest_photo_path(conn);

        if self.permission.is_none() {
            let granted = self.adapter.request_permission().await;
            self.permission = Some(granted);
        }

        if self.permission == Some(true) {
            self.adapter.configure_session();
            self.adapter.start_session();
        } else {
            log::warn!("カメラ権限が拒否されています。OS設定からの変更が必要です");
        }
    }

    /// 詳細画面・ギャラリー画面から戻ってきた時の処理
    ///
    /// セッションを再開し、サムネイルを更新する。
    ///
    /// # 引数
    /// * `conn` - データベース接続
    pub async fn on_return(&mut self, conn: &Connection) {
        self.adapter.start_session();
        self.fetch_latest_photo_path(conn);
    }

    /// 写真を撮影する
    ///
    /// 成功時はセッションを停止し、詳細画面へ渡すパスを返す。
    /// 失敗時はログを出力し、セッションは稼働したままNoneを返す
    /// （再試行は新しいユーザー操作による）。
    ///
    /// # 戻り値
    /// 保存された写真のパス、または失敗時はNone
    pub async fn capture_photo(&mut self) -> Option<PathBuf> {
        match self.try_capture().await {
            Ok(path) => {
                self.adapter.stop_session();
                Some(path)
            }
            Err(e @ AppError::PermissionDenied) => {
                log::warn!("{e}");
                None
            }
            Err(e) => {
                log::error!("撮影に失敗しました: {e}");
                None
            }
        }
    }

    /// 権限を確認してから撮影する
    ///
    /// # 戻り値
    /// 保存された写真のパス、または失敗時はエラー
    ///
    /// # エラー
    /// - `PermissionDenied` - カメラ権限が許可されていない
    /// - その他はアダプタの撮影エラーがそのまま伝播する
    async fn try_capture(&self) -> AppResult<PathBuf> {
        if self.permission != Some(true) {
            return Err(AppError::PermissionDenied);
        }

        self.adapter.capture_photo().await
    }

    /// 最新レシートの写真パスを取得してサムネイルを更新する
    ///
    /// レコードの image_path のファイル名を正規ディレクトリへ写像する。
    ///
    /// # 引数
    /// * `conn` - データベース接続
    pub fn fetch_latest_photo_path(&mut self, conn: &Connection) {
        match repository::find_latest(conn) {
            Ok(Some(receipt)) => {
                self.last_photo_path = self.store.resolve(&receipt.image_path);
            }
            Ok(None) => {
                self.last_photo_path = None;
            }
            Err(e) => {
                log::error!("最新レシートの取得に失敗しました: {e}");
            }
        }
    }

    /// セッションが稼働中かどうかを返す
    pub fn is_session_running(&self) -> bool {
        *self.running_rx.borrow()
    }
}
