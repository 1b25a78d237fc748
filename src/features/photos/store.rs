use crate::shared::errors::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// 写真ファイルの拡張子
const PHOTO_EXTENSION: &str = "jpg";

/// 写真ファイルストア
///
/// 正規ディレクトリ配下への画像ブロブの保存・削除を担当する。
/// ファイル名は衝突しないよう毎回新規に生成される。レコード側は
/// ファイル名のみを保持し、読み出し時に `resolve` で再結合する。
#[derive(Debug, Clone)]
pub struct PhotoStore {
    directory: PathBuf,
}

impl PhotoStore {
    /// 写真ファイルストアを作成する
    ///
    /// # 引数
    /// * `directory` - 写真ファイルの正規ディレクトリ
    ///
    /// # 戻り値
    /// 写真ファイルストア、またはディレクトリ作成失敗時はエラー
    pub fn new(directory: PathBuf) -> AppResult<Self> {
        if !directory.exists() {
            fs::create_dir_all(&directory).map_err(|e| {
                AppError::configuration(format!(
                    "写真ディレクトリの作成に失敗: {}: {e}",
                    directory.display()
                ))
            })?;
        }

        Ok(Self { directory })
    }

    /// 正規ディレクトリを取得する
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// 画像ブロブを新規ファイルとして保存する
    ///
    /// # 引数
    /// * `bytes` - 画像データ
    ///
    /// # 戻り値
    /// 保存されたファイルのフルパス、または失敗時はエラー
    pub fn save(&self, bytes: &[u8]) -> AppResult<PathBuf> {
        let file_name = format!("{}.{PHOTO_EXTENSION}", Uuid::new_v4());
        let path = self.directory.join(&file_name);

        fs::write(&path, bytes)
            .map_err(|e| AppError::saving_image_failed(format!("{}: {e}", path.display())))?;

        log::debug!("画像を保存しました: {} ({} bytes)", path.display(), bytes.len());

        Ok(path)
    }

    /// パスの末尾ファイル名を正規ディレクトリに再結合する
    ///
    /// レコードの image_path は保存元のディレクトリを含む場合があるため、
    /// ファイル名部分のみを取り出して現在の正規ディレクトリへ写像する。
    ///
    /// # 引数
    /// * `path` - 保存されたパス文字列（フルパスまたはファイル名）
    ///
    /// # 戻り値
    /// 正規ディレクトリ配下の解決済みパス、ファイル名が取れない場合はNone
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        file_name_of(path).map(|name| self.directory.join(name))
    }

    /// 写真ファイルを削除する
    ///
    /// # 引数
    /// * `path` - 削除するファイルのパス
    ///
    /// # 戻り値
    /// 成功時はOk(())、失敗時はFileRemovalエラー（呼び出し側でログ出力）
    pub fn remove(&self, path: &Path) -> AppResult<()> {
        fs::remove_file(path)
            .map_err(|e| AppError::file_removal(format!("{}: {e}", path.display())))?;

        log::debug!("画像を削除しました: {}", path.display());

        Ok(())
    }
}

/// パス文字列から末尾のファイル名を取り出す
///
/// # 引数
/// * `path` - パス文字列
///
/// # 戻り値
/// ファイル名、取り出せない場合はNone
pub fn file_name_of(path: &str) -> Option<&str> {
    Path::new(path).file_name().and_then(|name| name.to_str())
}
