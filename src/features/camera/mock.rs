use crate::features::camera::manager::CameraAdapter;
use crate::shared::errors::{AppError, AppResult};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::watch;

/// テスト・UIテスト配線用のモックカメラアダプタ
///
/// 実デバイスに触れず、応答内容を外から設定できる。各操作の呼び出し
/// 有無は did_* フラグで検証できる。
pub struct MockCameraManager {
    permission_granted: AtomicBool,
    should_fail_on_capture: AtomicBool,
    mock_captured_path: Mutex<PathBuf>,

    did_request_permission: AtomicBool,
    did_configure_session: AtomicBool,
    did_start_session: AtomicBool,
    did_stop_session: AtomicBool,
    did_capture_photo: AtomicBool,

    running_tx: watch::Sender<bool>,
}

impl Default for MockCameraManager {
    fn default() -> Self {
        let (running_tx, _) = watch::channel(false);

        Self {
            permission_granted: AtomicBool::new(true),
            should_fail_on_capture: AtomicBool::new(false),
            mock_captured_path: Mutex::new(PathBuf::from("/mock/path/photo.jpg")),
            did_request_permission: AtomicBool::new(false),
            did_configure_session: AtomicBool::new(false),
            did_start_session: AtomicBool::new(false),
            did_stop_session: AtomicBool::new(false),
            did_capture_photo: AtomicBool::new(false),
            running_tx,
        }
    }
}

impl MockCameraManager {
    /// モックカメラアダプタを作成する
    pub fn new() -> Self {
        Self::default()
    }

    /// 権限プロンプトの応答を設定する
    pub fn set_permission_granted(&self, granted: bool) {
        self.permission_granted.store(granted, Ordering::SeqCst);
    }

    /// 撮影を失敗させるかどうかを設定する
    pub fn set_should_fail_on_capture(&self, fail: bool) {
        self.should_fail_on_capture.store(fail, Ordering::SeqCst);
    }

    /// 撮影成功時に返すパスを設定する
    pub fn set_mock_captured_path(&self, path: PathBuf) {
        if let Ok(mut mock_path) = self.mock_captured_path.lock() {
            *mock_path = path;
        }
    }

    pub fn did_request_permission(&self) -> bool {
        self.did_request_permission.load(Ordering::SeqCst)
    }

    pub fn did_configure_session(&self) -> bool {
        self.did_configure_session.load(Ordering::SeqCst)
    }

    pub fn did_start_session(&self) -> bool {
        self.did_start_session.load(Ordering::SeqCst)
    }

    pub fn did_stop_session(&self) -> bool {
        self.did_stop_session.load(Ordering::SeqCst)
    }

    pub fn did_capture_photo(&self) -> bool {
        self.did_capture_photo.load(Ordering::SeqCst)
    }
}

impl CameraAdapter for MockCameraManager {
    async fn request_permission(&self) -> bool {
        self.did_request_permission.store(true, Ordering::SeqCst);
        self.permission_granted.load(Ordering::SeqCst)
    }

    fn configure_session(&self) {
        self.did_configure_session.store(true, Ordering::SeqCst);
    }

    fn start_session(&self) {
        self.did_start_session.store(true, Ordering::SeqCst);
        self.running_tx.send_replace(true);
    }

    fn stop_session(&self) {
        self.did_stop_session.store(true, Ordering::SeqCst);
        self.running_tx.send_replace(false);
    }

    fn subscribe_running(&self) -> watch::Receiver<bool> {
        self.running_tx.subscribe()
    }

    async fn capture_photo(&self) -> AppResult<PathBuf> {
        self.did_capture_photo.store(true, Ordering::SeqCst);

        if self.should_fail_on_capture.load(Ordering::SeqCst) {
            return Err(AppError::saving_image_failed("モック撮影失敗"));
        }

        let path = self
            .mock_captured_path
            .lock()
            .map_err(|e| AppError::concurrency(format!("モックパスのロック取得失敗: {e}")))?;
        Ok(path.clone())
    }
}
