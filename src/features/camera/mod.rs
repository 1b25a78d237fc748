/// カメラ機能モジュール
///
/// このモジュールはカメラ関連のすべての機能を提供します：
/// - プラットフォームカメラとの境界（CaptureBackend）
/// - カメラアダプタ（権限・セッション・撮影）
/// - テスト用モックアダプタ
/// - カメラ画面のフローコントローラ
// サブモジュールの宣言
pub mod manager;
pub mod mock;
pub mod screen;

// 公開インターフェース
pub use manager::{AuthorizationStatus, CameraAdapter, CameraManager, CaptureBackend};
pub use mock::MockCameraManager;
pub use screen::CameraScreen;
