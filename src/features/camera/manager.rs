use crate::features::photos::PhotoStore;
use crate::shared::errors::{AppError, AppResult};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// カメラ権限の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    /// 未確認（まだプロンプトを出していない）
    NotDetermined,
    /// 許可済み
    Authorized,
    /// ユーザーが拒否
    Denied,
    /// システム制限により使用不可
    Restricted,
}

/// プラットフォームのカメラデバイスとの境界
///
/// 実機のカメラAPIはこのトレイトの背後に隔離される。各メソッドは
/// ブロッキングで呼び出され、CameraManager側でブロッキングタスクに
/// 逃がされる。
pub trait CaptureBackend: Send + Sync + 'static {
    /// 現在の権限状態を返す
    fn authorization_status(&self) -> AuthorizationStatus;

    /// ユーザーに権限プロンプトを表示し、応答まで待つ
    fn request_access(&self) -> bool;

    /// 入力デバイスと写真出力をセッションに配線する
    ///
    /// 完全に配線できた場合のみtrueを返す。失敗は例外ではなく
    /// falseで表現され、セッションは非機能のまま許容される。
    fn configure(&self) -> bool;

    /// ハードウェアセッションを開始する
    fn start_running(&self);

    /// ハードウェアセッションを停止する
    fn stop_running(&self);

    /// 1枚撮影し、画像データを返す
    fn capture_frame(&self) -> AppResult<Vec<u8>>;
}

/// カメラアダプタの共通インターフェース
///
/// 画面側はこのトレイトを通じてのみカメラに触れる。テストでは
/// MockCameraManagerが代わりに注入される。
#[allow(async_fn_in_trait)]
pub trait CameraAdapter {
    /// 権限を確認し、未確認の場合のみプロンプトを表示する
    async fn request_permission(&self) -> bool;

    /// セッションを冪等に構成する
    fn configure_session(&self);

    /// セッション開始を要求する（呼び出し側をブロックしない）
    fn start_session(&self);

    /// セッション停止を要求する（呼び出し側をブロックしない）
    fn stop_session(&self);

    /// セッション稼働状態の購読チャネルを取得する
    fn subscribe_running(&self) -> watch::Receiver<bool>;

    /// 1枚撮影し、保存されたファイルのパスを返す
    async fn capture_photo(&self) -> AppResult<PathBuf>;
}

struct CameraInner {
    backend: Box<dyn CaptureBackend>,
    store: PhotoStore,
    /// セッション構成済みフラグ
    configured: Mutex<bool>,
    /// セッション状態遷移の直列化用
    session_lock: Mutex<()>,
    /// 稼働状態の通知チャネル（遷移完了後に発行される）
    running_tx: watch::Sender<bool>,
    /// 撮影の単一実行ガード。撮影中の二重要求は拒否される
    capture_slot: tokio::sync::Mutex<()>,
}

/// カメラアダプタの実装
///
/// 明示的に構築・注入されるインスタンス（共有シングルトンではない）。
/// ハンドルはクローン可能で、内部状態はArcで共有される。
#[derive(Clone)]
pub struct CameraManager {
    inner: Arc<CameraInner>,
}

impl CameraManager {
    /// カメラアダプタを作成する
    ///
    /// # 引数
    /// * `backend` - プラットフォームのカメラデバイス
    /// * `store` - 撮影画像の保存先ストア
    ///
    /// # 戻り値
    /// カメラアダプタ
    pub fn new(backend: Box<dyn CaptureBackend>, store: PhotoStore) -> Self {
        let (running_tx, _) = watch::channel(false);

        Self {
            inner: Arc::new(CameraInner {
                backend,
                store,
                configured: Mutex::new(false),
                session_lock: Mutex::new(()),
                running_tx,
                capture_slot: tokio::sync::Mutex::new(()),
            }),
        }
    }
}

impl CameraAdapter for CameraManager {
    /// 権限を確認し、未確認の場合のみプロンプトを表示する
    ///
    /// # 戻り値
    /// 許可済みまたはプロンプトで許可された場合はtrue。
    /// 拒否済み・制限中はプロンプトなしでfalse。
    async fn request_permission(&self) -> bool {
        match self.inner.backend.authorization_status() {
            AuthorizationStatus::Authorized => true,
            AuthorizationStatus::NotDetermined => {
                // プロンプトはユーザー応答までブロックするため別タスクで実行
                let inner = Arc::clone(&self.inner);
                tokio::task::spawn_blocking(move || inner.backend.request_access())
                    .await
                    .unwrap_or(false)
            }
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => false,
        }
    }

    /// セッションを冪等に構成する
    ///
    /// 構成済みの場合は何もしない。バックエンドが配線に失敗した場合も
    /// エラーにはせず、部分構成（非機能セッション）のまま許容する。
    fn configure_session(&self) {
        let Ok(mut configured) = self.inner.configured.lock() else {
            return;
        };

        if *configured {
            return;
        }

        *configured = self.inner.backend.configure();

        if !*configured {
            log::warn!("カメラセッションを完全に構成できませんでした");
        }
    }

    /// セッション開始を要求する
    ///
    /// ブロッキングタスク上で遷移を実行し、完了後に稼働状態を発行する。
    /// すでに稼働中の場合は何もしない。
    fn start_session(&self) {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let _guard = inner.session_lock.lock();
            if *inner.running_tx.borrow() {
                return;
            }
            inner.backend.start_running();
            inner.running_tx.send_replace(true);
        });
    }

    /// セッション停止を要求する
    ///
    /// すでに停止中の場合は何もしない。
    fn stop_session(&self) {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let _guard = inner.session_lock.lock();
            if !*inner.running_tx.borrow() {
                return;
            }
            inner.backend.stop_running();
            inner.running_tx.send_replace(false);
        });
    }

    /// セッション稼働状態の購読チャネルを取得する
    fn subscribe_running(&self) -> watch::Receiver<bool> {
        self.inner.running_tx.subscribe()
    }

    /// 1枚撮影し、保存されたファイルのパスを返す
    ///
    /// # 戻り値
    /// 保存された画像のフルパス、または失敗時はエラー
    ///
    /// # エラー
    /// - `CaptureInProgress` - 前回の撮影が完了していない
    /// - `SavingImageFailed` - 画像データのディスク保存に失敗
    /// - `Capture` - バックエンドの撮影処理が失敗
    async fn capture_photo(&self) -> AppResult<PathBuf> {
        // 単一実行ガード：撮影中の二重要求は待たずに拒否する
        let _slot = self
            .inner
            .capture_slot
            .try_lock()
            .map_err(|_| AppError::CaptureInProgress)?;

        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || -> AppResult<PathBuf> {
            let bytes = inner.backend.capture_frame()?;
            inner.store.save(&bytes)
        })
        .await
        .map_err(|e| AppError::capture(format!("撮影タスクが中断されました: {e}")))?
    }
}
