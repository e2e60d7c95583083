//! Speaker placeholder resolution / 说话者占位符解析
//!
//! Runs once per row at ingestion, never at query time.

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::DataSourceError;
use super::schema::TalkRoleType;
use crate::text::TextTable;

/// `#{REALNAME[ID(1)|...]}` template / 真名占位符 1
static REALNAME_ID_1: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#\{REALNAME\[ID\(1\)\|\w+\(\w+\)\]\}$").expect("valid REALNAME_ID_1 pattern")
});

/// `#{REALNAME[ID(2)|...]}` template / 真名占位符 2
static REALNAME_ID_2: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#\{REALNAME\[ID\(2\)\|\w+\(\w+\)\]\}$").expect("valid REALNAME_ID_2 pattern")
});

/// Text table section holding the speaker labels / 文本表中的说话者分区
pub const SPEAKER_SECTION: &str = "SPEAKER";

/// Language specific display strings for speaker placeholders / 说话者显示文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerLabels {
    pub player: String,
    pub mate_avatar: String,
    pub realname_1: String,
    pub realname_2: String,
}

impl SpeakerLabels {
    /// Read the four labels of `lang` from the text table / 从文本表读取标签
    pub fn from_text(text: &TextTable, lang: &str) -> Result<Self, DataSourceError> {
        let label = |key: &str| {
            text.get(SPEAKER_SECTION, key, lang)
                .map(str::to_string)
                .ok_or_else(|| DataSourceError::MissingSpeakerText {
                    lang: lang.to_string(),
                    key: key.to_string(),
                })
        };

        Ok(Self {
            player: label(TalkRoleType::PLAYER)?,
            mate_avatar: label(TalkRoleType::MATE_AVATAR)?,
            realname_1: label("REALNAME_ID_1")?,
            realname_2: label("REALNAME_ID_2")?,
        })
    }
}

/// Rewrites placeholder speaker names into display strings / 说话者名称解析器
#[derive(Debug, Clone)]
pub struct SpeakerNameResolver {
    labels: SpeakerLabels,
}

impl SpeakerNameResolver {
    pub fn new(labels: SpeakerLabels) -> Self {
        Self { labels }
    }

    /// Resolve the display name of one row; first matching rule wins.
    pub fn resolve(&self, role_type: Option<&TalkRoleType>, raw: Option<&str>) -> Option<String> {
        if role_type == Some(&TalkRoleType::Player) || raw == Some(TalkRoleType::PLAYER) {
            return Some(self.labels.player.clone());
        }
        if role_type == Some(&TalkRoleType::MateAvatar) || raw == Some(TalkRoleType::MATE_AVATAR) {
            return Some(self.labels.mate_avatar.clone());
        }

        let raw = raw?;
        if REALNAME_ID_1.is_match(raw) {
            Some(self.labels.realname_1.clone())
        } else if REALNAME_ID_2.is_match(raw) {
            Some(self.labels.realname_2.clone())
        } else {
            Some(raw.to_string())
        }
    }
}
