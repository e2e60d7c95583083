//! Raw talk data sources / 原始对话数据源
//!
//! Reads one language's rows from a local file or an http(s) location.
//! Supported formats:
//! - Parquet (`.parquet`), columns cast to the expected Arrow types
//! - JSON array of camelCase records (`.json`)

use std::path::Path;
use std::sync::Arc;

use arrow_array::{Array, BooleanArray, Int64Array, RecordBatch, StringArray};
use arrow_cast::CastOptions;
use arrow_schema::DataType;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value};

use super::error::DataSourceError;
use super::schema::{RawTalkRow, REQUIRED_COLUMNS};

/// On-disk format of a talk data file / 数据文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TalkFormat {
    Parquet,
    Json,
}

impl TalkFormat {
    /// Infer the format from the file extension / 根据扩展名判断格式
    pub fn from_location(location: &str) -> Result<Self, DataSourceError> {
        let path = location.split(['?', '#']).next().unwrap_or(location);
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "parquet" => Ok(TalkFormat::Parquet),
            "json" => Ok(TalkFormat::Json),
            _ => Err(DataSourceError::UnsupportedFormat(location.to_string())),
        }
    }
}

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Where the rows of `lang` live / 某语言数据文件位置
pub fn talk_location(data_path: &str, file_pattern: &str, lang: &str) -> String {
    let file = file_pattern.replace("{lang}", lang);
    if is_remote(data_path) {
        format!("{}/{}", data_path.trim_end_matches('/'), file)
    } else {
        Path::new(data_path).join(file).to_string_lossy().into_owned()
    }
}

/// Fetch and decode every row of one language / 读取并解析某语言全部数据
pub async fn read_rows(lang: &str, location: &str) -> Result<Vec<RawTalkRow>, DataSourceError> {
    let format = TalkFormat::from_location(location)?;
    let bytes = fetch_bytes(lang, location).await?;
    tracing::debug!("Fetched {} bytes of talk data for {} from {}", bytes.len(), lang, location);

    let (task_lang, task_location) = (lang.to_string(), location.to_string());
    tokio::task::spawn_blocking(move || parse_rows(&task_lang, &task_location, format, bytes))
        .await
        .map_err(|e| DataSourceError::Read {
            lang: lang.to_string(),
            location: location.to_string(),
            message: format!("Decode task failed: {}", e),
        })?
}

async fn fetch_bytes(lang: &str, location: &str) -> Result<Bytes, DataSourceError> {
    let read_err = |message: String| DataSourceError::Read {
        lang: lang.to_string(),
        location: location.to_string(),
        message,
    };

    if is_remote(location) {
        let response = reqwest::get(location)
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| read_err(e.to_string()))?;
        response.bytes().await.map_err(|e| read_err(e.to_string()))
    } else {
        tokio::fs::read(location)
            .await
            .map(Bytes::from)
            .map_err(|e| read_err(e.to_string()))
    }
}

/// Decode raw bytes in the given format / 按格式解析字节
pub fn parse_rows(
    lang: &str,
    location: &str,
    format: TalkFormat,
    bytes: Bytes,
) -> Result<Vec<RawTalkRow>, DataSourceError> {
    match format {
        TalkFormat::Json => read_json(lang, location, bytes),
        TalkFormat::Parquet => read_parquet(lang, location, bytes),
    }
}

/// Every record must carry all required keys; `null` values are allowed.
fn read_json(lang: &str, location: &str, bytes: Bytes) -> Result<Vec<RawTalkRow>, DataSourceError> {
    let read_err = |message: String| DataSourceError::Read {
        lang: lang.to_string(),
        location: location.to_string(),
        message,
    };

    let records: Vec<Map<String, Value>> =
        serde_json::from_slice(&bytes).map_err(|e| read_err(e.to_string()))?;

    let mut rows = Vec::with_capacity(records.len());
    for (pos, record) in records.into_iter().enumerate() {
        if let Some(column) = REQUIRED_COLUMNS.iter().find(|c| !record.contains_key(**c)) {
            return Err(DataSourceError::MissingColumn {
                lang: lang.to_string(),
                column: column.to_string(),
            });
        }
        let row = serde_json::from_value(Value::Object(record))
            .map_err(|e| read_err(format!("row {}: {}", pos, e)))?;
        rows.push(row);
    }
    Ok(rows)
}

fn read_parquet(lang: &str, location: &str, bytes: Bytes) -> Result<Vec<RawTalkRow>, DataSourceError> {
    let read_err = |message: String| DataSourceError::Read {
        lang: lang.to_string(),
        location: location.to_string(),
        message,
    };

    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes).map_err(|e| read_err(e.to_string()))?;

    let schema = Arc::clone(builder.schema());
    for column in REQUIRED_COLUMNS {
        if schema.index_of(column).is_err() {
            return Err(DataSourceError::MissingColumn {
                lang: lang.to_string(),
                column: column.to_string(),
            });
        }
    }

    let num_rows = builder.metadata().file_metadata().num_rows().max(0) as usize;
    let reader = builder.build().map_err(|e| read_err(e.to_string()))?;

    let mut rows = Vec::with_capacity(num_rows);
    for batch in reader {
        let batch = batch.map_err(|e| read_err(e.to_string()))?;
        append_batch(lang, &batch, &mut rows)?;
    }
    Ok(rows)
}

fn append_batch(lang: &str, batch: &RecordBatch, rows: &mut Vec<RawTalkRow>) -> Result<(), DataSourceError> {
    let int = |name| typed_column::<Int64Array>(lang, batch, name, &DataType::Int64);
    let string = |name| typed_column::<StringArray>(lang, batch, name, &DataType::Utf8);

    let id = int("id")?;
    let talk_id = int("talkId")?;
    let quest_id = int("questId")?;
    let talk_role_type = string("talkRoleType")?;
    let talk_role_id_name = string("talkRoleIdName")?;
    let talk_role_name = string("talkRoleName")?;
    let talk_title = string("talkTitle")?;
    let talk_content = string("talkContent")?;
    let line_type = string("type")?;
    let quest_id_name = string("questIdName")?;
    let activity_id_name = string("activityIdName")?;
    let chapter_num = string("chapterNum")?;
    let chapter_title = string("chapterTitle")?;
    let new = typed_column::<BooleanArray>(lang, batch, "new", &DataType::Boolean)?;

    for i in 0..batch.num_rows() {
        rows.push(RawTalkRow {
            id: int_at(&id, i),
            talk_id: int_at(&talk_id, i),
            quest_id: int_at(&quest_id, i),
            talk_role_type: str_at(&talk_role_type, i),
            talk_role_id_name: str_at(&talk_role_id_name, i),
            talk_role_name: str_at(&talk_role_name, i),
            talk_title: str_at(&talk_title, i),
            talk_content: str_at(&talk_content, i),
            line_type: str_at(&line_type, i),
            quest_id_name: str_at(&quest_id_name, i),
            activity_id_name: str_at(&activity_id_name, i),
            chapter_num: str_at(&chapter_num, i),
            chapter_title: str_at(&chapter_title, i),
            new: new.is_valid(i).then(|| new.value(i)),
        });
    }
    Ok(())
}

/// Cast a column to `data_type` and downcast it / 列类型转换
///
/// Values that cannot be converted are an error, not null.
fn typed_column<T: Array + Clone + 'static>(
    lang: &str,
    batch: &RecordBatch,
    name: &str,
    data_type: &DataType,
) -> Result<T, DataSourceError> {
    let invalid = |message: String| DataSourceError::InvalidColumn {
        lang: lang.to_string(),
        column: name.to_string(),
        message,
    };

    let column = batch
        .column_by_name(name)
        .ok_or_else(|| DataSourceError::MissingColumn {
            lang: lang.to_string(),
            column: name.to_string(),
        })?;
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    let casted = arrow_cast::cast_with_options(column.as_ref(), data_type, &options)
        .map_err(|e| invalid(e.to_string()))?;
    casted
        .as_any()
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| invalid(format!("expected {}", data_type)))
}

fn int_at(array: &Int64Array, i: usize) -> Option<i64> {
    array.is_valid(i).then(|| array.value(i))
}

fn str_at(array: &StringArray, i: usize) -> Option<String> {
    array.is_valid(i).then(|| array.value(i).to_string())
}
