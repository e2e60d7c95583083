//! Dialogue search module - provides search capabilities only / 对话检索模块
//!
//! Architecture principles / 架构原则：
//! - Tables are built once at startup and never mutated afterwards
//! - `query::search` and `collection::expand` are pure functions over a table
//! - Caching and presentation live outside the core operations
//!
//! Features / 特性：
//! - Per-language tables with precomputed lowercase search fields
//! - Literal (case-insensitive) or regex (case-sensitive) keyword matching
//! - Context expansion by id window, talk id or quest id, grouped per talk

pub mod cache;
pub mod collection;
pub mod error;
pub mod query;
pub mod schema;
pub mod source;
pub mod speaker;
pub mod store;
pub mod view;

pub use cache::{CollectionKey, KeywordKey, MemoCache};
pub use collection::{expand, Group, Selector};
pub use error::{DataSourceError, QueryError, SelectorError};
pub use query::{search, KeywordQuery, QueryOutcome};
pub use schema::{DialogueLine, RawTalkRow, TalkRoleType};
pub use store::{DatasetStore, TalkTable};
pub use view::DialogView;

#[cfg(test)]
pub(crate) mod fixtures {
    use super::schema::{RawTalkRow, REQUIRED_COLUMNS};
    use serde_json::Value;
    use super::speaker::{SpeakerLabels, SpeakerNameResolver};
    use super::store::TalkTable;

    pub const TEXT_JSON: &str = r#"{
        "SPEAKER": {
            "TALK_ROLE_PLAYER": {"EN": "Traveler", "CHS": "旅行者"},
            "TALK_ROLE_MATE_AVATAR": {"EN": "Sibling", "CHS": "血亲"},
            "REALNAME_ID_1": {"EN": "Real Name 1", "CHS": "真名1"},
            "REALNAME_ID_2": {"EN": "Real Name 2", "CHS": "真名2"}
        },
        "ALERT": {
            "EMPTY": {"EN": "Speaker and content cannot both be empty"},
            "NONE": {"EN": "No results"},
            "SUCCESS": {"EN": "Found {} results"},
            "OVERFLOW": {"EN": "Too many results, showing the first {} of {}"}
        },
        "RESULT": {
            "EXPAND_ID": {"EN": "Nearby lines"},
            "EXPAND_TALK": {"EN": "Whole talk"},
            "EXPAND_QUEST": {"EN": "Whole quest"}
        },
        "QUERY": {
            "TITLE": {"EN": "Dialogue Search"},
            "SPEAKER": {"EN": "Speaker"}
        },
        "TIPS": {
            "TIPS": {"EN": "Tips"}
        }
    }"#;

    pub fn resolver() -> SpeakerNameResolver {
        SpeakerNameResolver::new(SpeakerLabels {
            player: "Traveler".to_string(),
            mate_avatar: "Sibling".to_string(),
            realname_1: "Real Name 1".to_string(),
            realname_2: "Real Name 2".to_string(),
        })
    }

    pub fn row(id: i64, talk_id: Option<i64>, content: &str) -> RawTalkRow {
        RawTalkRow {
            id: Some(id),
            talk_id,
            talk_role_type: Some("TALK_ROLE_NPC".to_string()),
            talk_content: Some(content.to_string()),
            line_type: Some("TALK".to_string()),
            new: Some(false),
            ..Default::default()
        }
    }

    pub fn speaker_row(id: i64, talk_id: Option<i64>, speaker: &str, content: &str) -> RawTalkRow {
        RawTalkRow {
            talk_role_id_name: Some(speaker.to_string()),
            ..row(id, talk_id, content)
        }
    }

    pub fn table(rows: Vec<RawTalkRow>) -> TalkTable {
        TalkTable::from_rows("EN", rows, &resolver()).unwrap()
    }

    /// JSON data file with every required key present, unset ones as `null`.
    pub fn json_rows(records: Vec<Value>) -> String {
        let rows: Vec<Value> = records
            .into_iter()
            .map(|mut record| {
                if let Some(object) = record.as_object_mut() {
                    for column in REQUIRED_COLUMNS {
                        object.entry(column).or_insert(Value::Null);
                    }
                }
                record
            })
            .collect();
        Value::Array(rows).to_string()
    }
}
