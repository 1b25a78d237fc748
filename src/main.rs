use log::{error, info, warn};
use receipt_tracker::features::camera::{CameraScreen, MockCameraManager};
use receipt_tracker::features::details::DetailsScreen;
use receipt_tracker::features::gallery::GalleryScreen;
use receipt_tracker::features::photos::PhotoStore;
use receipt_tracker::features::receipts::repository;
use receipt_tracker::shared::config::{
    initialize_logging_system, AppPaths, EntryScreen, EnvironmentConfig, LaunchOptions,
};
use receipt_tracker::shared::errors::{AppError, AppResult};
use receipt_tracker::{db, AppState};
use serde_json::json;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    // ログシステムを初期化
    let env_config = EnvironmentConfig::from_env();
    initialize_logging_system(&env_config);

    info!("アプリケーション初期化を開始します...");

    // 環境変数を読み込み（.envファイルがある場合）
    if dotenv::dotenv().is_err() {
        // .envファイルがない場合は無視（本番環境では環境変数が直接設定される）
        warn!(".envファイルが見つかりません。環境変数が直接設定されていることを確認してください。");
    } else {
        info!(".envファイルを読み込みました");
    }

    let options = LaunchOptions::from_process_args();

    if let Err(e) = run(options, &env_config).await {
        error!("アプリケーションの実行に失敗しました: {}", e.details());
        std::process::exit(1);
    }
}

/// 選択されたエントリ画面を起動する
async fn run(options: LaunchOptions, env_config: &EnvironmentConfig) -> AppResult<()> {
    // ファイルパスとデータベースを初期化
    let paths = AppPaths::resolve(env_config.is_production())?;
    let conn = db::initialize_database(&paths)?;
    let store = PhotoStore::new(paths.photos_dir.clone())?;
    let state = AppState::new(conn);

    info!("アプリケーション初期化が完了しました");

    match options.entry {
        EntryScreen::Camera => run_camera_screen(&state, &store, &options).await,
        EntryScreen::Gallery => run_gallery_screen(&state, &store),
        EntryScreen::Details => run_details_screen(&state, &store, &options),
    }
}

/// カメラ画面を起動し、初期状態をJSONで出力する
///
/// 実デバイスのCaptureBackend実装はこのバイナリには配線されないため、
/// 常にモックアダプタを使用する（起動フラグで応答を切り替える）。
async fn run_camera_screen(
    state: &AppState,
    store: &PhotoStore,
    options: &LaunchOptions,
) -> AppResult<()> {
    let adapter = MockCameraManager::new();
    adapter.set_permission_granted(options.camera_permission_granted);

    if options.ui_test {
        adapter.set_mock_captured_path(PathBuf::from("/mock/path/photo.jpg"));
    }

    let mut screen = CameraScreen::new(adapter, store.clone());

    {
        let conn = lock_database(state)?;
        screen.on_appear(&conn).await;
    }

    println!(
        "{}",
        json!({
            "screen": "camera",
            "permission": screen.permission,
            "session_running": screen.is_session_running(),
            "last_photo_path": screen.last_photo_path,
        })
    );

    Ok(())
}

/// ギャラリー画面を起動し、写真パス一覧をJSONで出力する
fn run_gallery_screen(state: &AppState, store: &PhotoStore) -> AppResult<()> {
    let conn = lock_database(state)?;

    let mut screen = GalleryScreen::new();
    screen.fetch_all_photo_paths(&conn, store);

    println!(
        "{}",
        json!({
            "screen": "gallery",
            "photo_paths": screen.photo_paths,
        })
    );

    Ok(())
}

/// 詳細画面を起動し、フォーム状態をJSONで出力する
fn run_details_screen(
    state: &AppState,
    store: &PhotoStore,
    options: &LaunchOptions,
) -> AppResult<()> {
    let conn = lock_database(state)?;

    // 最新レシートがあればそのパスで、なければモックパスで起動する
    let image_path = match repository::find_latest(&conn)? {
        Some(receipt) => store
            .resolve(&receipt.image_path)
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or(receipt.image_path),
        None => "/mock/path/photo.jpg".to_string(),
    };

    let mut screen = DetailsScreen::new();
    screen.load(&conn, &image_path);

    if options.amount_is_zero {
        screen.form.amount = 0.0;
    }

    println!(
        "{}",
        json!({
            "screen": "details",
            "image_path": image_path,
            "is_new": screen.is_new(),
            "can_save": screen.can_save(),
            "date_valid": screen.is_date_valid(),
            "form": screen.form,
        })
    );

    Ok(())
}

/// データベース接続のロックを取得する
fn lock_database(state: &AppState) -> AppResult<std::sync::MutexGuard<'_, rusqlite::Connection>> {
    state
        .db
        .lock()
        .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))
}
