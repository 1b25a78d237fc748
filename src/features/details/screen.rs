use crate::features::photos::PhotoStore;
use crate::features::receipts::models::{
    CreateReceiptDto, ReceiptRecord, UpdateReceiptDto, DEFAULT_CURRENCY,
};
use crate::features::receipts::repository;
use crate::shared::errors::AppResult;
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

/// 詳細画面の編集フォーム
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptForm {
    pub date: NaiveDate,
    pub amount: f64,
    pub currency: String,
    pub vendor: String,
    pub notes: String,
}

impl Default for ReceiptForm {
    fn default() -> Self {
        Self {
            date: Utc::now().date_naive(),
            amount: 0.0,
            currency: DEFAULT_CURRENCY.to_string(),
            vendor: String::new(),
            notes: String::new(),
        }
    }
}

impl ReceiptForm {
    /// 既存レコードからフォームを構築する
    fn from_record(record: &ReceiptRecord) -> Self {
        Self {
            date: record.date,
            amount: record.amount,
            currency: record.currency.clone(),
            vendor: record.vendor.clone().unwrap_or_default(),
            notes: record.notes.clone().unwrap_or_default(),
        }
    }
}

/// 詳細画面のフローコントローラ
///
/// 写真パスに一致する既存レコードの読み込み、編集内容の収集、
/// 保存時の作成または更新を担当する。レコードの永続化は明示的な
/// 保存操作によってのみ行われる（撮影だけではレコードは作られない）。
#[derive(Default)]
pub struct DetailsScreen {
    /// 写真パスに一致した既存レコード（None = 新規）
    pub existing_receipt: Option<ReceiptRecord>,
    /// 編集中のフォーム
    pub form: ReceiptForm,
}

impl DetailsScreen {
    /// 詳細画面を作成する
    pub fn new() -> Self {
        Self::default()
    }

    /// 新規レシートとして扱われるかどうかを返す
    pub fn is_new(&self) -> bool {
        self.existing_receipt.is_none()
    }

    /// 写真パスに一致するレコードを読み込む
    ///
    /// 一致した場合はフォームを既存の値で埋め、「既存」として扱う。
    /// 一致しない場合はフォームは既定値のままで「新規」として扱う。
    /// 検索に失敗した場合は existing_receipt を変更しない。
    ///
    /// # 引数
    /// * `conn` - データベース接続
    /// * `image_path` - 写真のパス
    pub fn load(&mut self, conn: &Connection, image_path: &str) {
        match repository::find_by_suffix(conn, image_path) {
            Ok(Some(receipt)) => {
                self.form = ReceiptForm::from_record(&receipt);
                self.existing_receipt = Some(receipt);
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("レシートの検索に失敗しました: {e}");
            }
        }
    }

    /// 保存操作が有効かどうかを返す
    ///
    /// # 戻り値
    /// - 新規: 金額が0より大きい場合にtrue
    /// - 既存: いずれかのフィールドが保存済みの値と異なる場合にtrue
    pub fn can_save(&self) -> bool {
        match &self.existing_receipt {
            None => self.form.amount > 0.0,
            Some(receipt) => {
                receipt.date != self.form.date
                    || receipt.amount != self.form.amount
                    || receipt.currency != self.form.currency
                    || receipt.vendor.as_deref().unwrap_or("") != self.form.vendor
                    || receipt.notes.as_deref().unwrap_or("") != self.form.notes
            }
        }
    }

    /// 入力された日付が未来でないかを返す（エディタ表示用）
    ///
    /// データ層ではこの制約を強制しない。
    pub fn is_date_valid(&self) -> bool {
        self.form.date <= Utc::now().date_naive()
    }

    /// フォームの内容を保存する
    ///
    /// 既存レコードがあれば全フィールドを上書きし、なければ新規作成
    /// する。新規作成時の image_path は渡された文字列をそのまま保存
    /// する。
    ///
    /// # 引数
    /// * `conn` - データベース接続
    /// * `image_path` - 写真のパス
    ///
    /// # 戻り値
    /// 画面を閉じるべきかどうか（新規保存のみtrue）、または失敗時はエラー
    pub fn save(&mut self, conn: &Connection, image_path: &str) -> AppResult<bool> {
        if let Some(existing) = &self.existing_receipt {
            let updated = repository::update(
                conn,
                &existing.id,
                UpdateReceiptDto {
                    date: self.form.date,
                    amount: self.form.amount,
                    currency: self.form.currency.clone(),
                    vendor: non_empty(&self.form.vendor),
                    notes: non_empty(&self.form.notes),
                },
            )?;
            self.existing_receipt = Some(updated);

            // 既存レシートの編集では画面を開いたままにする
            Ok(false)
        } else {
            let created = repository::create(
                conn,
                CreateReceiptDto {
                    image_path: image_path.to_string(),
                    date: self.form.date,
                    amount: self.form.amount,
                    currency: self.form.currency.clone(),
                    vendor: non_empty(&self.form.vendor),
                    notes: non_empty(&self.form.notes),
                },
            )?;
            self.existing_receipt = Some(created);

            Ok(true)
        }
    }

    /// 未保存の新規レシートを破棄する
    ///
    /// 写真ファイルのみを削除する（レコードはまだ存在しないため
    /// ストアへの操作は不要）。既存レシートの編集では何もしない。
    ///
    /// # 引数
    /// * `store` - 写真ファイルストア
    /// * `image_path` - 写真のパス
    pub fn discard(&self, store: &PhotoStore, image_path: &str) {
        if self.existing_receipt.is_some() {
            return;
        }

        if let Err(e) = store.remove(Path::new(image_path)) {
            log::warn!("破棄時のファイル削除に失敗しました: {e}");
        }
    }
}

/// 空文字列をNoneに写す
fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use tempfile::TempDir;

    fn create_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::create_tables(&conn).unwrap();
        conn
    }

    fn count_receipts(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM receipts", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_load_without_match_keeps_defaults() {
        let conn = create_test_db();
        let mut screen = DetailsScreen::new();

        screen.load(&conn, "/documents/photo.jpg");

        assert!(screen.is_new());
        assert!(screen.existing_receipt.is_none());
        assert_eq!(screen.form.currency, DEFAULT_CURRENCY);
        assert_eq!(screen.form.amount, 0.0);
    }

    #[test]
    fn test_save_new_then_update_same_record() {
        let conn = create_test_db();
        let mut screen = DetailsScreen::new();
        screen.load(&conn, "/documents/photo.jpg");

        // 新規保存：レコードが1件作られ、画面は閉じる
        screen.form.amount = 10.0;
        screen.form.currency = "EUR".to_string();
        screen.form.vendor = "Vendor A".to_string();
        screen.form.notes = "Notes".to_string();

        let dismiss = screen.save(&conn, "/documents/photo.jpg").unwrap();
        assert!(dismiss);
        assert_eq!(count_receipts(&conn), 1);

        let saved = screen.existing_receipt.clone().unwrap();
        assert_eq!(saved.amount, 10.0);
        assert_eq!(saved.currency, "EUR");
        assert_eq!(saved.vendor, Some("Vendor A".to_string()));
        assert_eq!(saved.notes, Some("Notes".to_string()));

        // 同じ existingReceipt 参照に対する再保存は同一レコードを上書きする
        screen.form.amount = 20.0;
        screen.form.currency = "USD".to_string();

        let dismiss = screen.save(&conn, "/documents/photo.jpg").unwrap();
        assert!(!dismiss);
        assert_eq!(count_receipts(&conn), 1);

        let updated = screen.existing_receipt.clone().unwrap();
        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.amount, 20.0);
        assert_eq!(updated.currency, "USD");
    }

    #[test]
    fn test_load_existing_populates_form() {
        let conn = create_test_db();

        // 1件保存してから別の画面インスタンスで読み込む
        let mut first = DetailsScreen::new();
        first.form.amount = 15.0;
        first.form.vendor = "Vendor B".to_string();
        first.save(&conn, "receipt42.jpg").unwrap();

        let mut second = DetailsScreen::new();
        second.load(&conn, "/documents/receipt42.jpg");

        assert!(!second.is_new());
        assert_eq!(second.form.amount, 15.0);
        assert_eq!(second.form.vendor, "Vendor B");
    }

    #[test]
    fn test_can_save_new_requires_positive_amount() {
        let screen = DetailsScreen::new();
        assert!(!screen.can_save());

        let mut screen = DetailsScreen::new();
        screen.form.amount = 0.0;
        assert!(!screen.can_save());

        screen.form.amount = 10.0;
        assert!(screen.can_save());
    }

    #[test]
    fn test_can_save_existing_requires_changed_field() {
        let conn = create_test_db();
        let mut screen = DetailsScreen::new();
        screen.form.amount = 10.0;
        screen.form.vendor = "Vendor A".to_string();
        screen.save(&conn, "photo.jpg").unwrap();

        // 変更なしでは保存できない
        assert!(!screen.can_save());

        // いずれか1フィールドの変更で保存可能になる
        screen.form.notes = "追記".to_string();
        assert!(screen.can_save());

        screen.form.notes = String::new();
        assert!(!screen.can_save());

        screen.form.amount = 0.0;
        assert!(screen.can_save());
    }

    #[test]
    fn test_discard_new_deletes_photo_file() {
        let temp = TempDir::new().unwrap();
        let store = PhotoStore::new(temp.path().to_path_buf()).unwrap();
        let path = store.save(b"unsaved photo").unwrap();

        let screen = DetailsScreen::new();
        screen.discard(&store, path.to_str().unwrap());

        assert!(!path.exists());
    }

    #[test]
    fn test_discard_existing_keeps_photo_file() {
        let conn = create_test_db();
        let temp = TempDir::new().unwrap();
        let store = PhotoStore::new(temp.path().to_path_buf()).unwrap();
        let path = store.save(b"saved photo").unwrap();

        let mut screen = DetailsScreen::new();
        screen.form.amount = 10.0;
        screen.save(&conn, path.to_str().unwrap()).unwrap();

        // 既存レシートの編集では破棄は何もしない
        screen.discard(&store, path.to_str().unwrap());
        assert!(path.exists());
    }

    #[test]
    fn test_failed_lookup_does_not_touch_existing_receipt() {
        let conn = create_test_db();
        let mut screen = DetailsScreen::new();
        screen.form.amount = 10.0;
        screen.save(&conn, "photo.jpg").unwrap();
        let saved = screen.existing_receipt.clone();

        // 一致しないパスの読み込みは existing_receipt を変更しない
        screen.load(&conn, "/documents/unrelated.jpg");
        assert_eq!(screen.existing_receipt, saved);
    }

    #[test]
    fn test_is_date_valid_rejects_future() {
        let mut screen = DetailsScreen::new();
        assert!(screen.is_date_valid());

        screen.form.date = Utc::now().date_naive() + chrono::Duration::days(2);
        assert!(!screen.is_date_valid());
    }
}
