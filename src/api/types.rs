//! Request and response types of the talk API / 对话接口类型

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use homodgcat_backend::talk::DialogView;

/// Keyword query parameters / 关键词查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeywordParams {
    #[serde(default)]
    pub speaker: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "flag")]
    pub new: bool,
    #[serde(default, deserialize_with = "flag")]
    pub regex: bool,
}

/// Collection expansion parameters / 展开查询参数
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionParams {
    #[serde(default, deserialize_with = "optional_id")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "optional_id")]
    pub talk_id: Option<i64>,
    #[serde(default, deserialize_with = "optional_id")]
    pub quest_id: Option<i64>,
}

/// Checkbox style flag: `true`, `1`, `on`, `yes` / 复选框参数
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = String::deserialize(deserializer)?;
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "" | "false" | "0" | "off" | "no" => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid flag: {}", other))),
    }
}

/// Integer id where an empty value means absent / 空值视为未提供
fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = String::deserialize(deserializer)?;
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| serde::de::Error::custom(format!("invalid id: {}", value)))
}

/// Outcome tag of a keyword query / 查询状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordStatus {
    Empty,
    InvalidPattern,
    None,
    Success,
    Overflow,
}

#[derive(Debug, Serialize)]
pub struct KeywordResponse {
    pub status: KeywordStatus,
    pub message: String,
    /// Rows returned / 返回行数
    pub count: usize,
    /// Rows matched before the cap / 匹配总数
    pub total: usize,
    pub results: Vec<DialogView>,
}

#[derive(Debug, Serialize)]
pub struct CollectionResponse {
    pub title: String,
    pub groups: Vec<Vec<DialogView>>,
}

/// Labels of the search page / 搜索页文本
#[derive(Debug, Serialize)]
pub struct LanguagePage {
    pub language: String,
    pub languages: Vec<String>,
    pub query: BTreeMap<String, String>,
    pub tips: BTreeMap<String, String>,
    pub speakers: BTreeMap<String, String>,
}

