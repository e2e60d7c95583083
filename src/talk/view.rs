//! Display projection of dialogue lines / 对话行展示数据
//!
//! Turns structured rows into what the search page shows: a combined speaker
//! label, rendered line breaks, the quest/activity/chapter label and the
//! expansion links of a keyword hit.

use serde::Serialize;

use super::collection::{id_window, Selector, WINDOW_RADIUS};
use super::schema::DialogueLine;
use crate::text::TextTable;

/// Text table section with expansion labels / 展开链接文本分区
pub const RESULT_SECTION: &str = "RESULT";

/// Follow-up expansion offered for a keyword hit / 展开链接
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionLink {
    /// Query parameter name: `id`, `talkId` or `questId`
    pub param: &'static str,
    pub value: i64,
    pub label: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogView {
    pub id: i64,
    #[serde(rename = "type")]
    pub line_type: Option<String>,
    pub talk_role_type: Option<String>,
    pub speaker: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub collection: Option<String>,
    pub new: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<CollectionLink>,
}

impl DialogView {
    pub fn from_line(line: &DialogueLine) -> Self {
        Self {
            id: line.id,
            line_type: line.line_type.clone(),
            talk_role_type: line.talk_role_type.as_ref().map(|r| r.as_str().to_string()),
            speaker: speaker_display(line.talk_role_id_name.as_deref(), line.talk_role_name.as_deref()),
            title: non_empty(line.talk_title.as_deref()).map(str::to_string),
            content: render_content(line.talk_content.as_deref()),
            collection: collection_label(line),
            new: line.new,
            links: Vec::new(),
        }
    }

    /// View of a keyword hit, including its expansion links / 带展开链接
    pub fn with_links(line: &DialogueLine, text: &TextTable, lang: &str) -> Self {
        let mut view = Self::from_line(line);
        view.links = collection_links(line, text, lang);
        view
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// `idName -> roleName` when both exist and differ, otherwise whichever exists.
pub fn speaker_display(id_name: Option<&str>, role_name: Option<&str>) -> Option<String> {
    match (non_empty(id_name), non_empty(role_name)) {
        (Some(id), Some(role)) if id != role => Some(format!("{} -> {}", id, role)),
        (Some(id), _) => Some(id.to_string()),
        (None, Some(role)) => Some(role.to_string()),
        (None, None) => None,
    }
}

/// Turn literal `\n` sequences into line breaks / 转换换行符
pub fn render_content(content: Option<&str>) -> Option<String> {
    non_empty(content).map(|c| c.replace("\\n", "\n"))
}

/// `questIdName - activityIdName - chapterNum: chapterTitle`, skipping blanks.
pub fn collection_label(line: &DialogueLine) -> Option<String> {
    let chapter = non_empty(line.chapter_title.as_deref()).map(|title| {
        match non_empty(line.chapter_num.as_deref()) {
            Some(num) => format!("{}: {}", num, title),
            None => title.to_string(),
        }
    });

    let names: Vec<String> = [
        non_empty(line.quest_id_name.as_deref()).map(str::to_string),
        non_empty(line.activity_id_name.as_deref()).map(str::to_string),
        chapter,
    ]
    .into_iter()
    .flatten()
    .collect();

    (!names.is_empty()).then(|| names.join(" - "))
}

/// Heading of an expansion result / 展开结果标题
pub fn selector_title(selector: Selector) -> String {
    match selector {
        Selector::ById(id) => {
            let window = id_window(id);
            format!("IDs {} - {}", window.start(), window.end())
        }
        Selector::ByTalkId(talk_id) => format!("TalkID {}", talk_id),
        Selector::ByQuestId(quest_id) => format!("QuestID {}", quest_id),
    }
}

/// Id window always, talk and quest when the line has them / 展开链接
pub fn collection_links(line: &DialogueLine, text: &TextTable, lang: &str) -> Vec<CollectionLink> {
    let mut links = vec![CollectionLink {
        param: "id",
        value: line.id,
        label: format!(
            "{} (id={}±{})",
            text.text(RESULT_SECTION, "EXPAND_ID", lang),
            line.id,
            WINDOW_RADIUS
        ),
        title: selector_title(Selector::ById(line.id)),
    }];

    if let Some(talk_id) = line.talk_id {
        links.push(CollectionLink {
            param: "talkId",
            value: talk_id,
            label: format!("{} (talkId={})", text.text(RESULT_SECTION, "EXPAND_TALK", lang), talk_id),
            title: selector_title(Selector::ByTalkId(talk_id)),
        });
    }
    if let Some(quest_id) = line.quest_id {
        links.push(CollectionLink {
            param: "questId",
            value: quest_id,
            label: format!("{} (questId={})", text.text(RESULT_SECTION, "EXPAND_QUEST", lang), quest_id),
            title: selector_title(Selector::ByQuestId(quest_id)),
        });
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::talk::fixtures::{row, table, TEXT_JSON};

    #[test]
    fn test_speaker_display() {
        assert_eq!(speaker_display(Some("Paimon"), Some("Paimon")).as_deref(), Some("Paimon"));
        assert_eq!(
            speaker_display(Some("Traveler"), Some("Aether")).as_deref(),
            Some("Traveler -> Aether")
        );
        assert_eq!(speaker_display(None, Some("Aether")).as_deref(), Some("Aether"));
        assert_eq!(speaker_display(Some(""), Some("Aether")).as_deref(), Some("Aether"));
        assert_eq!(speaker_display(Some("Amber"), Some("")).as_deref(), Some("Amber"));
        assert_eq!(speaker_display(None, None), None);
    }

    #[test]
    fn test_render_content() {
        assert_eq!(render_content(Some("Line one\\nLine two")).as_deref(), Some("Line one\nLine two"));
        assert_eq!(render_content(Some("")), None);
        assert_eq!(render_content(None), None);
    }

    #[test]
    fn test_collection_label() {
        let mut r = row(1, Some(1), "x");
        r.quest_id_name = Some("Prologue".to_string());
        r.chapter_num = Some("Act I".to_string());
        r.chapter_title = Some("The Outlander Who Caught the Wind".to_string());
        let t = table(vec![r]);
        assert_eq!(
            collection_label(&t.lines()[0]).as_deref(),
            Some("Prologue - Act I: The Outlander Who Caught the Wind")
        );

        let mut r = row(2, None, "x");
        r.activity_id_name = Some("Windblume".to_string());
        r.chapter_num = Some("Act II".to_string());
        let t = table(vec![r, row(3, None, "x")]);
        // chapter number alone is not shown
        assert_eq!(collection_label(&t.lines()[0]).as_deref(), Some("Windblume"));
        assert_eq!(collection_label(&t.lines()[1]), None);
    }

    #[test]
    fn test_selector_title() {
        assert_eq!(selector_title(Selector::ById(1000)), "IDs 900 - 1100");
        assert_eq!(selector_title(Selector::ByTalkId(7)), "TalkID 7");
        assert_eq!(selector_title(Selector::ByQuestId(3)), "QuestID 3");
    }

    #[test]
    fn test_links() {
        let text = TextTable::from_json(TEXT_JSON).unwrap();
        let mut r = row(500, Some(12), "x");
        r.quest_id = Some(3);
        let t = table(vec![r, row(501, None, "y")]);

        let view = DialogView::with_links(&t.lines()[0], &text, "EN");
        let params: Vec<_> = view.links.iter().map(|l| (l.param, l.value)).collect();
        assert_eq!(params, vec![("id", 500), ("talkId", 12), ("questId", 3)]);
        assert_eq!(view.links[0].label, "Nearby lines (id=500±100)");
        assert_eq!(view.links[0].title, "IDs 400 - 600");

        let view = DialogView::with_links(&t.lines()[1], &text, "EN");
        assert_eq!(view.links.len(), 1);

        let plain = DialogView::from_line(&t.lines()[1]);
        let value = serde_json::to_value(&plain).unwrap();
        assert!(value.get("links").is_none());
        assert_eq!(value["type"], "TALK");
    }
}
