use thiserror::Error;

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// データベース関連のエラー
    #[error("データベースエラー: {0}")]
    Database(String),

    /// リソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// カメラ権限が拒否されている場合のエラー
    ///
    /// OS設定が変更されるまで解消されない終端状態。
    #[error("カメラへのアクセスが許可されていません")]
    PermissionDenied,

    /// 撮影画像のディスク保存に失敗した場合のエラー
    #[error("画像の保存に失敗しました: {0}")]
    SavingImageFailed(String),

    /// カメラ側の撮影処理そのものが失敗した場合のエラー
    #[error("撮影エラー: {0}")]
    Capture(String),

    /// 前回の撮影が完了する前に次の撮影が要求された場合のエラー
    #[error("前回の撮影が完了していません")]
    CaptureInProgress,

    /// 写真ファイルの削除に失敗した場合のエラー（ログ出力のみ、再試行なし）
    #[error("ファイル削除エラー: {0}")]
    FileRemoval(String),

    /// 並行処理関連のエラー
    #[error("並行処理エラー: {0}")]
    Concurrency(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// I/O関連のエラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),
}

/// エラーの重要度を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    /// 低重要度（ユーザー操作で解消できるエラーなど）
    Low,
    /// 中重要度（単発の撮影・保存失敗など）
    Medium,
    /// 高重要度（データベースエラーなど）
    High,
}

impl AppError {
    /// ユーザーに表示するためのフレンドリーなメッセージを取得
    ///
    /// # 戻り値
    /// ユーザーに表示可能なエラーメッセージ
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Database(_) => "データベース操作でエラーが発生しました",
            AppError::NotFound(msg) => msg,
            AppError::PermissionDenied => "カメラへのアクセスが許可されていません",
            AppError::SavingImageFailed(_) => "画像の保存に失敗しました",
            AppError::Capture(_) => "写真の撮影に失敗しました",
            AppError::CaptureInProgress => "前回の撮影が完了していません",
            AppError::FileRemoval(_) => "ファイルの削除に失敗しました",
            AppError::Concurrency(_) => "並行処理でエラーが発生しました",
            AppError::Configuration(_) => "設定エラーが発生しました",
            AppError::Io(_) => "ファイル操作でエラーが発生しました",
        }
    }

    /// エラーの詳細情報を取得
    ///
    /// # 戻り値
    /// エラーの詳細情報（ログ出力用）
    pub fn details(&self) -> String {
        format!("{self}")
    }

    /// エラーの重要度を取得
    ///
    /// # 戻り値
    /// エラーの重要度レベル
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Database(_) => ErrorSeverity::High,
            AppError::NotFound(_) => ErrorSeverity::Low,
            AppError::PermissionDenied => ErrorSeverity::Low,
            AppError::SavingImageFailed(_) => ErrorSeverity::Medium,
            AppError::Capture(_) => ErrorSeverity::Medium,
            AppError::CaptureInProgress => ErrorSeverity::Low,
            AppError::FileRemoval(_) => ErrorSeverity::Low,
            AppError::Concurrency(_) => ErrorSeverity::High,
            AppError::Configuration(_) => ErrorSeverity::High,
            AppError::Io(_) => ErrorSeverity::Medium,
        }
    }

    /// リソース未発見エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `resource` - 見つからなかったリソース名
    ///
    /// # 戻り値
    /// リソース未発見エラー
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        AppError::NotFound(format!("{}が見つかりません", resource.into()))
    }

    /// 画像保存エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - 保存失敗の詳細
    ///
    /// # 戻り値
    /// 画像保存エラー
    pub fn saving_image_failed<S: Into<String>>(message: S) -> Self {
        AppError::SavingImageFailed(message.into())
    }

    /// 撮影エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - 撮影失敗の詳細
    ///
    /// # 戻り値
    /// 撮影エラー
    pub fn capture<S: Into<String>>(message: S) -> Self {
        AppError::Capture(message.into())
    }

    /// ファイル削除エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - 削除失敗の詳細
    ///
    /// # 戻り値
    /// ファイル削除エラー
    pub fn file_removal<S: Into<String>>(message: S) -> Self {
        AppError::FileRemoval(message.into())
    }

    /// 並行処理エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - 並行処理エラーメッセージ
    ///
    /// # 戻り値
    /// 並行処理エラー
    pub fn concurrency<S: Into<String>>(message: S) -> Self {
        AppError::Concurrency(message.into())
    }

    /// 設定エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - 設定エラーメッセージ
    ///
    /// # 戻り値
    /// 設定エラー
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }
}

/// AppErrorからStringへの変換（画面側での表示のため）
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.user_message().to_string()
    }
}

/// rusqlite::ErrorからAppErrorへの変換
impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        AppError::Database(error.to_string())
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        // 各エラータイプの重要度をテスト
        assert_eq!(
            AppError::not_found("レシート").severity(),
            ErrorSeverity::Low
        );
        assert_eq!(AppError::PermissionDenied.severity(), ErrorSeverity::Low);
        assert_eq!(
            AppError::saving_image_failed("書き込み失敗").severity(),
            ErrorSeverity::Medium
        );
        assert_eq!(
            AppError::Database("insert失敗".to_string()).severity(),
            ErrorSeverity::High
        );
        assert_eq!(AppError::CaptureInProgress.severity(), ErrorSeverity::Low);
    }

    #[test]
    fn test_user_message() {
        // ユーザーメッセージのテスト
        let not_found_error = AppError::not_found("レシート");
        assert_eq!(not_found_error.user_message(), "レシートが見つかりません");

        let capture_error = AppError::capture("ハードウェア切断");
        assert_eq!(capture_error.user_message(), "写真の撮影に失敗しました");

        let permission_error = AppError::PermissionDenied;
        assert_eq!(
            permission_error.user_message(),
            "カメラへのアクセスが許可されていません"
        );
    }

    #[test]
    fn test_helper_functions() {
        // ヘルパー関数のテスト
        let not_found_error = AppError::not_found("テストリソース");
        assert!(matches!(not_found_error, AppError::NotFound(_)));

        let saving_error = AppError::saving_image_failed("テストエラー");
        assert!(matches!(saving_error, AppError::SavingImageFailed(_)));

        let removal_error = AppError::file_removal("テストエラー");
        assert!(matches!(removal_error, AppError::FileRemoval(_)));
    }

    #[test]
    fn test_string_conversion() {
        // String変換のテスト
        let error = AppError::not_found("レシート");
        let error_string: String = error.into();
        assert_eq!(error_string, "レシートが見つかりません");
    }

    #[test]
    fn test_error_details() {
        // エラー詳細のテスト
        let error = AppError::saving_image_failed("詳細テスト");
        let details = error.details();
        assert!(details.contains("詳細テスト"));
    }

    #[test]
    fn test_rusqlite_conversion() {
        // rusqlite::Errorからの変換テスト
        let error: AppError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(error, AppError::Database(_)));
    }
}
