use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 通貨の既定表示
pub const DEFAULT_CURRENCY: &str = "Euro (€)";

/// レシートレコード（唯一のドメインエンティティ）
///
/// `id` と `created_at` は作成時に一度だけ設定され、以後変更されない。
/// `image_path` は作成時に渡された文字列をそのまま保持する（慣例として
/// 末尾のファイル名のみを渡し、読み出し時に正規ディレクトリと再結合する）。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReceiptRecord {
    pub id: Uuid,
    pub image_path: String,
    pub created_at: DateTime<Utc>,
    pub date: NaiveDate,
    pub amount: f64,
    pub currency: String,
    pub vendor: Option<String>,
    pub notes: Option<String>,
}

/// レシート作成用DTO
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReceiptDto {
    pub image_path: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub currency: String,
    pub vendor: Option<String>,
    pub notes: Option<String>,
}

/// レシート更新用DTO
///
/// 更新は可変フィールドの全面上書きであり、部分パッチではない。
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReceiptDto {
    pub date: NaiveDate,
    pub amount: f64,
    pub currency: String,
    pub vendor: Option<String>,
    pub notes: Option<String>,
}
