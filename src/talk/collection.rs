//! Collection expansion / 对话上下文展开
//!
//! Rebuilds conversational context from flat rows: selects a window of ids, a talk
//! or a quest, then partitions the rows by talk id while keeping table order.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use super::error::SelectorError;
use super::schema::DialogueLine;
use super::store::TalkTable;

/// Half width of the id window / id 窗口半径
pub const WINDOW_RADIUS: i64 = 100;

/// Which rows to expand / 展开条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Rows with id in `[id - 100, id + 100]` / id 范围
    ById(i64),
    /// Rows of one talk / 同一对话
    ByTalkId(i64),
    /// Rows of one quest / 同一任务
    ByQuestId(i64),
}

impl Selector {
    /// Pick a selector from optional parameters; `id` wins over `talkId`, which wins over `questId`.
    pub fn from_params(
        id: Option<i64>,
        talk_id: Option<i64>,
        quest_id: Option<i64>,
    ) -> Result<Self, SelectorError> {
        id.map(Selector::ById)
            .or(talk_id.map(Selector::ByTalkId))
            .or(quest_id.map(Selector::ByQuestId))
            .ok_or(SelectorError::Missing)
    }
}

/// Inclusive id range covered by `ById(id)` / id 窗口
pub fn id_window(id: i64) -> RangeInclusive<i64> {
    id.saturating_sub(WINDOW_RADIUS)..=id.saturating_add(WINDOW_RADIUS)
}

/// Lines sharing one talk id, or a single line without talk id / 分组
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub talk_id: Option<i64>,
    pub lines: Vec<DialogueLine>,
}

/// Select rows and group them by talk id / 选择并分组
pub fn expand(table: &TalkTable, selector: Selector) -> Vec<Group> {
    let groups = match selector {
        Selector::ById(id) => {
            let window = id_window(id);
            group_by_talk(table.lines().iter().filter(|l| window.contains(&l.id)))
        }
        Selector::ByTalkId(talk_id) => group_by_talk(table.talk_lines(talk_id)),
        Selector::ByQuestId(quest_id) => group_by_talk(table.quest_lines(quest_id)),
    };

    tracing::debug!("Expanded {:?} on {} into {} groups", selector, table.lang(), groups.len());
    groups
}

/// One pass: append each row to its talk's group, groups in first-seen order.
/// Rows without talk id become singleton groups.
pub fn group_by_talk<'a>(rows: impl IntoIterator<Item = &'a DialogueLine>) -> Vec<Group> {
    let mut slots: HashMap<i64, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for line in rows {
        match line.talk_id {
            Some(talk_id) => {
                let slot = *slots.entry(talk_id).or_insert_with(|| {
                    groups.push(Group {
                        talk_id: Some(talk_id),
                        lines: Vec::new(),
                    });
                    groups.len() - 1
                });
                groups[slot].lines.push(line.clone());
            }
            None => groups.push(Group {
                talk_id: None,
                lines: vec![line.clone()],
            }),
        }
    }
    groups
}
