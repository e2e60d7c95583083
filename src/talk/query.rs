//! Keyword query engine / 关键词查询引擎
//!
//! - Literal mode: case-insensitive substring over the precomputed lowercase fields
//! - Regex mode: case-sensitive regular expression over the raw fields
//! - Speaker fields are OR-combined, speaker and content groups are AND-combined
//! - Results keep table order; nothing is ranked

use rayon::prelude::*;
use regex::Regex;

use super::error::QueryError;
use super::schema::DialogueLine;
use super::store::TalkTable;

/// User supplied search terms and flags / 查询参数
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeywordQuery {
    pub speaker: String,
    pub content: String,
    pub new_only: bool,
    pub regex: bool,
}

impl KeywordQuery {
    pub fn new(speaker: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn new_only(mut self, enabled: bool) -> Self {
        self.new_only = enabled;
        self
    }

    pub fn regex(mut self, enabled: bool) -> Self {
        self.regex = enabled;
        self
    }
}

/// How one term is matched, decided once per query / 匹配方式
#[derive(Debug, Clone)]
pub enum MatchMode {
    /// Lowercased term, matched against lowercase copies / 字面量（已转小写）
    Literal(String),
    /// Compiled pattern, matched against raw fields / 正则表达式
    Regex(Regex),
}

impl MatchMode {
    pub fn new(term: &str, regex: bool) -> Result<Self, QueryError> {
        if regex {
            Regex::new(term)
                .map(MatchMode::Regex)
                .map_err(|e| QueryError::InvalidPattern(e.to_string()))
        } else {
            Ok(MatchMode::Literal(term.to_lowercase()))
        }
    }

    /// Absent values never match / 空值不匹配
    fn matches(&self, raw: Option<&str>, lower: Option<&str>) -> bool {
        match self {
            MatchMode::Literal(term) => lower.is_some_and(|v| v.contains(term.as_str())),
            MatchMode::Regex(re) => raw.is_some_and(|v| re.is_match(v)),
        }
    }
}

/// Boolean row filter built from a [`KeywordQuery`] / 行过滤条件
#[derive(Debug, Clone)]
pub struct RowPredicate {
    new_only: bool,
    speaker: Option<MatchMode>,
    content: Option<MatchMode>,
}

impl RowPredicate {
    pub fn build(query: &KeywordQuery) -> Result<Self, QueryError> {
        if query.speaker.is_empty() && query.content.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let mode = |term: &str| -> Result<Option<MatchMode>, QueryError> {
            if term.is_empty() {
                Ok(None)
            } else {
                MatchMode::new(term, query.regex).map(Some)
            }
        };

        Ok(Self {
            new_only: query.new_only,
            speaker: mode(&query.speaker)?,
            content: mode(&query.content)?,
        })
    }

    pub fn matches(&self, line: &DialogueLine) -> bool {
        if self.new_only && !line.new {
            return false;
        }

        let lower = line.lower();
        if let Some(speaker) = &self.speaker {
            let hit = speaker.matches(line.talk_role_id_name.as_deref(), lower.role_id_name.as_deref())
                || speaker.matches(line.talk_role_name.as_deref(), lower.role_name.as_deref())
                || speaker.matches(line.talk_title.as_deref(), lower.title.as_deref());
            if !hit {
                return false;
            }
        }
        if let Some(content) = &self.content {
            if !content.matches(line.talk_content.as_deref(), lower.content.as_deref()) {
                return false;
            }
        }
        true
    }
}

/// Classified result of a keyword query / 查询结果分类
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Nothing matched / 无结果
    NoResults,
    /// Fewer matches than the cap / 未超过上限
    Success { count: usize, rows: Vec<DialogueLine> },
    /// At least `cap` matches; `rows` holds the first `cap` in table order / 超过上限
    Overflow {
        cap: usize,
        actual: usize,
        rows: Vec<DialogueLine>,
    },
}

impl QueryOutcome {
    /// Classify matches (already in table order) against the cap / 按上限分类
    pub fn classify(matched: Vec<&DialogueLine>, cap: usize) -> Self {
        let n = matched.len();
        if n == 0 {
            QueryOutcome::NoResults
        } else if n < cap {
            QueryOutcome::Success {
                count: n,
                rows: matched.into_iter().cloned().collect(),
            }
        } else {
            QueryOutcome::Overflow {
                cap,
                actual: n,
                rows: matched.into_iter().take(cap).cloned().collect(),
            }
        }
    }

    pub fn rows(&self) -> &[DialogueLine] {
        match self {
            QueryOutcome::NoResults => &[],
            QueryOutcome::Success { rows, .. } | QueryOutcome::Overflow { rows, .. } => rows,
        }
    }
}

/// Run a keyword query over one table (pure, read-only) / 执行关键词查询
pub fn search(table: &TalkTable, query: &KeywordQuery, max_results: usize) -> Result<QueryOutcome, QueryError> {
    let predicate = RowPredicate::build(query)?;

    // Indexed parallel collect keeps table order
    let matched: Vec<&DialogueLine> = table
        .lines()
        .par_iter()
        .filter(|line| predicate.matches(line))
        .collect();

    tracing::debug!(
        "Keyword query on {}: speaker={:?} content={:?} new={} regex={} -> {} matches",
        table.lang(),
        query.speaker,
        query.content,
        query.new_only,
        query.regex,
        matched.len()
    );

    Ok(QueryOutcome::classify(matched, max_results))
}
