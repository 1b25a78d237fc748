/// 実行環境とログ設定
pub mod environment;

/// 起動時引数（テスト用配線の切り替え）
pub mod launch;

/// アプリケーションのファイルパス解決
pub mod paths;

// 便利な再エクスポート
pub use environment::{get_environment, initialize_logging_system, Environment, EnvironmentConfig};
pub use launch::{EntryScreen, LaunchOptions};
pub use paths::AppPaths;
