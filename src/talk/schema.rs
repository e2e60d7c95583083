//! Dialogue table schema / 对话数据表结构

use serde::{Deserialize, Serialize};

/// Columns every talk data source must provide / 数据源必需的列
pub const REQUIRED_COLUMNS: [&str; 14] = [
    "id",
    "talkId",
    "questId",
    "talkRoleType",
    "talkRoleIdName",
    "talkRoleName",
    "talkTitle",
    "talkContent",
    "type",
    "questIdName",
    "activityIdName",
    "chapterNum",
    "chapterTitle",
    "new",
];

/// Speaker role tag / 说话者角色类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TalkRoleType {
    /// The player character / 玩家
    Player,
    /// The travelling companion avatar / 同行伙伴
    MateAvatar,
    /// Any other role tag, kept verbatim / 其他角色
    Other(String),
}

impl TalkRoleType {
    pub const PLAYER: &'static str = "TALK_ROLE_PLAYER";
    pub const MATE_AVATAR: &'static str = "TALK_ROLE_MATE_AVATAR";

    pub fn as_str(&self) -> &str {
        match self {
            TalkRoleType::Player => Self::PLAYER,
            TalkRoleType::MateAvatar => Self::MATE_AVATAR,
            TalkRoleType::Other(s) => s,
        }
    }
}

impl From<&str> for TalkRoleType {
    fn from(s: &str) -> Self {
        match s {
            Self::PLAYER => TalkRoleType::Player,
            Self::MATE_AVATAR => TalkRoleType::MateAvatar,
            other => TalkRoleType::Other(other.to_string()),
        }
    }
}

impl From<String> for TalkRoleType {
    fn from(s: String) -> Self {
        TalkRoleType::from(s.as_str())
    }
}

impl From<TalkRoleType> for String {
    fn from(role: TalkRoleType) -> Self {
        role.as_str().to_string()
    }
}

/// One row as delivered by a data source, before ingestion / 数据源原始行
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTalkRow {
    pub id: Option<i64>,
    pub talk_id: Option<i64>,
    pub quest_id: Option<i64>,
    pub talk_role_type: Option<String>,
    pub talk_role_id_name: Option<String>,
    pub talk_role_name: Option<String>,
    pub talk_title: Option<String>,
    pub talk_content: Option<String>,
    #[serde(rename = "type")]
    pub line_type: Option<String>,
    pub quest_id_name: Option<String>,
    pub activity_id_name: Option<String>,
    pub chapter_num: Option<String>,
    pub chapter_title: Option<String>,
    pub new: Option<bool>,
}

/// Lowercase copies of the searchable fields, computed once at load / 小写副本
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct LowerFields {
    pub role_id_name: Option<String>,
    pub role_name: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// One dialogue line of a language table / 对话行
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueLine {
    pub id: i64,
    pub talk_id: Option<i64>,
    pub quest_id: Option<i64>,
    pub talk_role_type: Option<TalkRoleType>,
    pub talk_role_id_name: Option<String>,
    pub talk_role_name: Option<String>,
    pub talk_title: Option<String>,
    pub talk_content: Option<String>,
    #[serde(rename = "type")]
    pub line_type: Option<String>,
    pub quest_id_name: Option<String>,
    pub activity_id_name: Option<String>,
    pub chapter_num: Option<String>,
    pub chapter_title: Option<String>,
    pub new: bool,
    #[serde(skip)]
    lower: LowerFields,
}

impl DialogueLine {
    /// Build a line from a raw row whose speaker has already been resolved.
    pub(crate) fn from_raw(id: i64, raw: RawTalkRow, talk_role_id_name: Option<String>) -> Self {
        let lower = LowerFields {
            role_id_name: talk_role_id_name.as_deref().map(str::to_lowercase),
            role_name: raw.talk_role_name.as_deref().map(str::to_lowercase),
            title: raw.talk_title.as_deref().map(str::to_lowercase),
            content: raw.talk_content.as_deref().map(str::to_lowercase),
        };

        Self {
            id,
            talk_id: raw.talk_id,
            quest_id: raw.quest_id,
            talk_role_type: raw.talk_role_type.map(TalkRoleType::from),
            talk_role_id_name,
            talk_role_name: raw.talk_role_name,
            talk_title: raw.talk_title,
            talk_content: raw.talk_content,
            line_type: raw.line_type,
            quest_id_name: raw.quest_id_name,
            activity_id_name: raw.activity_id_name,
            chapter_num: raw.chapter_num,
            chapter_title: raw.chapter_title,
            new: raw.new.unwrap_or(false),
            lower,
        }
    }

    pub(crate) fn lower(&self) -> &LowerFields {
        &self.lower
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_type_from_str() {
        assert_eq!(TalkRoleType::from("TALK_ROLE_PLAYER"), TalkRoleType::Player);
        assert_eq!(TalkRoleType::from("TALK_ROLE_MATE_AVATAR"), TalkRoleType::MateAvatar);
        assert_eq!(
            TalkRoleType::from("TALK_ROLE_NPC"),
            TalkRoleType::Other("TALK_ROLE_NPC".to_string())
        );
        assert_eq!(TalkRoleType::Other("X".to_string()).as_str(), "X");
    }

    #[test]
    fn test_lower_fields_follow_source() {
        let raw = RawTalkRow {
            id: Some(1),
            talk_role_name: Some("Paimon".to_string()),
            talk_title: None,
            talk_content: Some("Hello, TRAVELER!".to_string()),
            new: None,
            ..Default::default()
        };
        let line = DialogueLine::from_raw(1, raw, Some("Ëmber".to_string()));

        assert_eq!(line.lower().role_id_name.as_deref(), Some("ëmber"));
        assert_eq!(line.lower().role_name.as_deref(), Some("paimon"));
        assert_eq!(line.lower().title, None);
        assert_eq!(line.lower().content.as_deref(), Some("hello, traveler!"));
        assert!(!line.new);
    }

    #[test]
    fn test_serialize_hides_lower_fields() {
        let raw = RawTalkRow {
            id: Some(7),
            talk_role_type: Some("TALK_ROLE_PLAYER".to_string()),
            line_type: Some("TALK".to_string()),
            ..Default::default()
        };
        let line = DialogueLine::from_raw(7, raw, None);
        let value = serde_json::to_value(&line).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["type"], "TALK");
        assert_eq!(value["talkRoleType"], "TALK_ROLE_PLAYER");
        assert!(value.get("lower").is_none());
    }

    #[test]
    fn test_raw_row_from_json() {
        let row: RawTalkRow = serde_json::from_str(
            r#"{"id": 3, "talkId": 10, "questId": null, "talkRoleType": "TALK_ROLE_NPC",
                "talkRoleIdName": "Katheryne", "talkRoleName": "", "talkTitle": null,
                "talkContent": "Ad astra abyssosque!", "type": "TALK", "questIdName": null,
                "activityIdName": null, "chapterNum": null, "chapterTitle": null, "new": true}"#,
        )
        .unwrap();

        assert_eq!(row.id, Some(3));
        assert_eq!(row.talk_id, Some(10));
        assert_eq!(row.line_type.as_deref(), Some("TALK"));
        assert_eq!(row.new, Some(true));
    }
}
