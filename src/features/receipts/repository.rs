use crate::features::receipts::models::{CreateReceiptDto, ReceiptRecord, UpdateReceiptDto};
use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// receiptsテーブルの列並び（SELECT共通部）
const RECEIPT_COLUMNS: &str = "id, image_path, created_at, date, amount, currency, vendor, notes";

/// 日付列の保存フォーマット
const DATE_FORMAT: &str = "%Y-%m-%d";

/// レシートを作成する
///
/// id と created_at はここで採番され、以後変更されない。
/// image_path は渡された文字列をそのまま保存する。
///
/// # 引数
/// * `conn` - データベース接続
/// * `dto` - レシート作成用DTO
///
/// # 戻り値
/// 作成されたレシート、または失敗時はエラー
pub fn create(conn: &Connection, dto: CreateReceiptDto) -> AppResult<ReceiptRecord> {
    let id = Uuid::new_v4();
    let created_at = Utc::now();

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO receipts (id, image_path, created_at, date, amount, currency, vendor, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id.to_string(),
            dto.image_path,
            created_at.to_rfc3339(),
            dto.date.format(DATE_FORMAT).to_string(),
            dto.amount,
            dto.currency,
            dto.vendor,
            dto.notes
        ],
    )?;
    tx.commit()?;

    find_by_id(conn, &id)
}

/// IDでレシートを取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - レシートID
///
/// # 戻り値
/// レシート、または失敗時はエラー
pub fn find_by_id(conn: &Connection, id: &Uuid) -> AppResult<ReceiptRecord> {
    conn.query_row(
        &format!("SELECT {RECEIPT_COLUMNS} FROM receipts WHERE id = ?1"),
        params![id.to_string()],
        map_receipt_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::not_found("レシート"),
        _ => AppError::Database(e.to_string()),
    })
}

/// 最新のレシートを取得する
///
/// # 引数
/// * `conn` - データベース接続
///
/// # 戻り値
/// created_at が最も新しいレシート、ストアが空の場合はNone
pub fn find_latest(conn: &Connection) -> AppResult<Option<ReceiptRecord>> {
    match conn.query_row(
        &format!("SELECT {RECEIPT_COLUMNS} FROM receipts ORDER BY created_at DESC LIMIT 1"),
        [],
        map_receipt_row,
    ) {
        Ok(receipt) => Ok(Some(receipt)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(AppError::Database(e.to_string())),
    }
}

/// レシート一覧を取得する
///
/// # 引数
/// * `conn` - データベース接続
///
/// # 戻り値
/// created_at の降順に並んだレシートのリスト、または失敗時はエラー
pub fn find_all(conn: &Connection) -> AppResult<Vec<ReceiptRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECEIPT_COLUMNS} FROM receipts ORDER BY created_at DESC"
    ))?;

    let receipts = stmt.query_map([], map_receipt_row)?;

    receipts
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Database(e.to_string()))
}

/// 画像パスのファイル名でレシートを検索する
///
/// 与えられたパスの末尾ファイル名を image_path に含む最初のレコードを返す。
/// ファイル名は一意とは保証されないため、複数件が一致した場合は
/// created_at が最新のものを採用し、警告ログを出力する。
///
/// # 引数
/// * `conn` - データベース接続
/// * `path` - 画像のパス（フルパスまたはファイル名）
///
/// # 戻り値
/// 一致したレシート、一致なしの場合はNone
pub fn find_by_suffix(conn: &Connection, path: &str) -> AppResult<Option<ReceiptRecord>> {
    let Some(image_name) = std::path::Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
    else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(&format!(
        "SELECT {RECEIPT_COLUMNS} FROM receipts
         WHERE instr(image_path, ?1) > 0
         ORDER BY created_at DESC"
    ))?;

    let matches = stmt
        .query_map(params![image_name], map_receipt_row)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Database(e.to_string()))?;

    if matches.len() > 1 {
        log::warn!(
            "ファイル名 {image_name} に一致するレシートが{}件あります。最新のものを採用します",
            matches.len()
        );
    }

    Ok(matches.into_iter().next())
}

/// 画像パスのファイル名に一致するレシートをすべて削除する
///
/// ファイル名は一意とは保証されないため、一致するレコードは1つの
/// トランザクションでまとめて削除する。残すと同じ正規パスに解決される
/// レコードが孤児として残り、以後の削除経路が失われる。
///
/// # 引数
/// * `conn` - データベース接続
/// * `path` - 画像のパス（フルパスまたはファイル名）
///
/// # 戻り値
/// 削除されたレコード数
pub fn delete_by_suffix(conn: &Connection, path: &str) -> AppResult<usize> {
    let Some(image_name) = std::path::Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
    else {
        return Ok(0);
    };

    let tx = conn.unchecked_transaction()?;
    let affected_rows = tx.execute(
        "DELETE FROM receipts WHERE instr(image_path, ?1) > 0",
        params![image_name],
    )?;
    tx.commit()?;

    Ok(affected_rows)
}

/// レシートを更新する
///
/// 可変フィールド（date / amount / currency / vendor / notes）を
/// 全面上書きする。id / image_path / created_at は変更しない。
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - レシートID
/// * `dto` - レシート更新用DTO
///
/// # 戻り値
/// 更新されたレシート、または失敗時はエラー
pub fn update(conn: &Connection, id: &Uuid, dto: UpdateReceiptDto) -> AppResult<ReceiptRecord> {
    let tx = conn.unchecked_transaction()?;
    let affected_rows = tx.execute(
        "UPDATE receipts SET date = ?1, amount = ?2, currency = ?3, vendor = ?4, notes = ?5
         WHERE id = ?6",
        params![
            dto.date.format(DATE_FORMAT).to_string(),
            dto.amount,
            dto.currency,
            dto.vendor,
            dto.notes,
            id.to_string()
        ],
    )?;

    if affected_rows == 0 {
        return Err(AppError::not_found("レシート"));
    }

    tx.commit()?;

    find_by_id(conn, id)
}

/// レシートを削除する
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - レシートID
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
pub fn delete(conn: &Connection, id: &Uuid) -> AppResult<()> {
    let affected_rows = conn.execute(
        "DELETE FROM receipts WHERE id = ?1",
        params![id.to_string()],
    )?;

    if affected_rows == 0 {
        return Err(AppError::not_found("レシート"));
    }

    Ok(())
}

/// 行をレシートレコードに変換する
fn map_receipt_row(row: &Row<'_>) -> rusqlite::Result<ReceiptRecord> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(2)?;
    let date: String = row.get(3)?;

    Ok(ReceiptRecord {
        id: Uuid::parse_str(&id).map_err(|e| conversion_error(0, e))?,
        image_path: row.get(1)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| conversion_error(2, e))?
            .with_timezone(&Utc),
        date: NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .map_err(|e| conversion_error(3, e))?,
        amount: row.get(4)?,
        currency: row.get(5)?,
        vendor: row.get(6)?,
        notes: row.get(7)?,
    })
}

/// 列値の変換失敗をrusqliteのエラーに写す
fn conversion_error<E>(column: usize, error: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::new(error),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::features::receipts::models::DEFAULT_CURRENCY;

    fn create_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::create_tables(&conn).unwrap();
        conn
    }

    fn sample_dto(image_path: &str) -> CreateReceiptDto {
        CreateReceiptDto {
            image_path: image_path.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            amount: 10.0,
            currency: "EUR".to_string(),
            vendor: Some("Vendor A".to_string()),
            notes: Some("Notes".to_string()),
        }
    }

    /// created_at を固定したレコードを直接挿入する（ソート順の検証用）
    fn insert_with_created_at(conn: &Connection, image_path: &str, created_at: &str) -> Uuid {
        let id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO receipts (id, image_path, created_at, date, amount, currency, vendor, notes)
             VALUES (?1, ?2, ?3, '2024-01-15', 10.0, 'EUR', NULL, NULL)",
            params![id.to_string(), image_path, created_at],
        )
        .unwrap();
        id
    }

    #[test]
    fn test_receipt_crud_operations() {
        let conn = create_test_db();

        // レシート作成のテスト
        let receipt = create(&conn, sample_dto("image123.jpg")).unwrap();
        assert_eq!(receipt.image_path, "image123.jpg");
        assert_eq!(receipt.amount, 10.0);
        assert_eq!(receipt.currency, "EUR");
        assert_eq!(receipt.vendor, Some("Vendor A".to_string()));

        // レシート取得のテスト
        let retrieved = find_by_id(&conn, &receipt.id).unwrap();
        assert_eq!(retrieved, receipt);

        // レシート更新のテスト（全面上書き）
        let updated = update(
            &conn,
            &receipt.id,
            UpdateReceiptDto {
                date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                amount: 20.0,
                currency: "USD".to_string(),
                vendor: None,
                notes: None,
            },
        )
        .unwrap();
        assert_eq!(updated.id, receipt.id);
        assert_eq!(updated.amount, 20.0);
        assert_eq!(updated.currency, "USD");
        assert_eq!(updated.vendor, None);

        // id / image_path / created_at は不変
        assert_eq!(updated.image_path, receipt.image_path);
        assert_eq!(updated.created_at, receipt.created_at);

        // レシート削除のテスト
        delete(&conn, &receipt.id).unwrap();
        assert!(find_by_id(&conn, &receipt.id).is_err());
    }

    #[test]
    fn test_find_latest_returns_newest() {
        let conn = create_test_db();

        assert!(find_latest(&conn).unwrap().is_none());

        insert_with_created_at(&conn, "old.jpg", "2024-01-01T10:00:00+00:00");
        let newest = insert_with_created_at(&conn, "new.jpg", "2024-03-01T10:00:00+00:00");
        insert_with_created_at(&conn, "middle.jpg", "2024-02-01T10:00:00+00:00");

        let latest = find_latest(&conn).unwrap().unwrap();
        assert_eq!(latest.id, newest);
        assert_eq!(latest.image_path, "new.jpg");
    }

    #[test]
    fn test_find_all_sorted_descending() {
        let conn = create_test_db();

        insert_with_created_at(&conn, "a.jpg", "2024-01-01T10:00:00+00:00");
        insert_with_created_at(&conn, "b.jpg", "2024-03-01T10:00:00+00:00");
        insert_with_created_at(&conn, "c.jpg", "2024-02-01T10:00:00+00:00");

        let all = find_all(&conn).unwrap();
        let paths: Vec<&str> = all.iter().map(|r| r.image_path.as_str()).collect();
        assert_eq!(paths, vec!["b.jpg", "a.jpg", "c.jpg"]);
    }

    #[test]
    fn test_find_by_suffix_matches_file_name() {
        let conn = create_test_db();

        // フルパスで保存されたレコードもファイル名で見つかる
        let id = insert_with_created_at(
            &conn,
            "/any/prefix/image123.jpg",
            "2024-01-01T10:00:00+00:00",
        );

        let found = find_by_suffix(&conn, "/documents/image123.jpg")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);

        // ファイル名のみでも一致する
        let found = find_by_suffix(&conn, "image123.jpg").unwrap().unwrap();
        assert_eq!(found.id, id);
    }

    #[test]
    fn test_find_by_suffix_no_match_returns_none() {
        let conn = create_test_db();

        insert_with_created_at(&conn, "other.jpg", "2024-01-01T10:00:00+00:00");

        let result = find_by_suffix(&conn, "/documents/missing.jpg").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_find_by_suffix_collision_prefers_newest() {
        let conn = create_test_db();

        insert_with_created_at(&conn, "/old/dup.jpg", "2024-01-01T10:00:00+00:00");
        let newest = insert_with_created_at(&conn, "/new/dup.jpg", "2024-02-01T10:00:00+00:00");

        let found = find_by_suffix(&conn, "dup.jpg").unwrap().unwrap();
        assert_eq!(found.id, newest);
    }

    #[test]
    fn test_delete_by_suffix_removes_all_matches() {
        let conn = create_test_db();

        // 同じファイル名を持つレコードが複数あっても全件消える
        insert_with_created_at(&conn, "/old/dup.jpg", "2024-01-01T10:00:00+00:00");
        insert_with_created_at(&conn, "/new/dup.jpg", "2024-02-01T10:00:00+00:00");
        let other = insert_with_created_at(&conn, "other.jpg", "2024-01-15T10:00:00+00:00");

        let deleted = delete_by_suffix(&conn, "/documents/dup.jpg").unwrap();
        assert_eq!(deleted, 2);

        // 無関係なレコードは残る
        assert!(find_by_suffix(&conn, "dup.jpg").unwrap().is_none());
        assert!(find_by_id(&conn, &other).is_ok());

        // 一致なしは0件
        assert_eq!(delete_by_suffix(&conn, "dup.jpg").unwrap(), 0);
    }

    #[test]
    fn test_not_found_errors() {
        let conn = create_test_db();
        let missing = Uuid::new_v4();

        // 存在しないレシートの取得テスト
        let result = find_by_id(&conn, &missing);
        assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));

        // 存在しないレシートの更新テスト
        let result = update(
            &conn,
            &missing,
            UpdateReceiptDto {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                amount: 1.0,
                currency: DEFAULT_CURRENCY.to_string(),
                vendor: None,
                notes: None,
            },
        );
        assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));

        // 存在しないレシートの削除テスト
        let result = delete(&conn, &missing);
        assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
    }

    #[test]
    fn test_create_assigns_id_and_created_at() {
        let conn = create_test_db();

        let before = Utc::now();
        let receipt = create(&conn, sample_dto("a.jpg")).unwrap();
        let after = Utc::now();

        assert!(receipt.created_at >= before && receipt.created_at <= after);

        // 2件目は別のIDを持つ
        let second = create(&conn, sample_dto("b.jpg")).unwrap();
        assert_ne!(receipt.id, second.id);
    }
}
