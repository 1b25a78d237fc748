/// 共有エラー型とエラーハンドリング
pub mod errors;

/// 共有設定管理
pub mod config;

// 便利な再エクスポート
pub use config::{
    get_environment, initialize_logging_system, AppPaths, Environment, EnvironmentConfig,
    EntryScreen, LaunchOptions,
};
pub use errors::{AppError, AppResult, ErrorSeverity};
