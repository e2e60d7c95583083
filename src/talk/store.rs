//! Per-language dialogue tables / 多语言对话数据表
//!
//! Built once at startup, then shared read-only behind `Arc`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::error::DataSourceError;
use super::schema::{DialogueLine, RawTalkRow, TalkRoleType};
use super::source::{read_rows, talk_location};
use super::speaker::{SpeakerLabels, SpeakerNameResolver};
use crate::config::TalkConfig;
use crate::text::TextTable;

/// Immutable dialogue table of one language / 单语言对话表
#[derive(Debug)]
pub struct TalkTable {
    lang: String,
    lines: Vec<DialogueLine>,
    /// talkId -> row positions in table order / talkId 索引
    talk_index: HashMap<i64, Vec<usize>>,
    /// questId -> row positions in table order / questId 索引
    quest_index: HashMap<i64, Vec<usize>>,
}

impl TalkTable {
    /// Ingest raw rows: resolve speakers, derive lowercase fields, build indexes.
    pub fn from_rows(
        lang: &str,
        rows: Vec<RawTalkRow>,
        resolver: &SpeakerNameResolver,
    ) -> Result<Self, DataSourceError> {
        let mut seen = HashSet::with_capacity(rows.len());
        let mut lines = Vec::with_capacity(rows.len());
        let mut talk_index: HashMap<i64, Vec<usize>> = HashMap::new();
        let mut quest_index: HashMap<i64, Vec<usize>> = HashMap::new();

        for (pos, raw) in rows.into_iter().enumerate() {
            let id = raw.id.ok_or_else(|| DataSourceError::MissingId {
                lang: lang.to_string(),
                row: pos,
            })?;
            if !seen.insert(id) {
                return Err(DataSourceError::DuplicateId {
                    lang: lang.to_string(),
                    id,
                });
            }

            let role_type: Option<TalkRoleType> = raw.talk_role_type.as_deref().map(Into::into);
            let speaker = resolver.resolve(role_type.as_ref(), raw.talk_role_id_name.as_deref());
            let line = DialogueLine::from_raw(id, raw, speaker);

            if let Some(talk_id) = line.talk_id {
                talk_index.entry(talk_id).or_default().push(pos);
            }
            if let Some(quest_id) = line.quest_id {
                quest_index.entry(quest_id).or_default().push(pos);
            }
            lines.push(line);
        }

        Ok(Self {
            lang: lang.to_string(),
            lines,
            talk_index,
            quest_index,
        })
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// All lines in storage order / 按存储顺序的全部行
    pub fn lines(&self) -> &[DialogueLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines of one talk, in table order / 某个对话的全部行
    pub fn talk_lines(&self, talk_id: i64) -> impl Iterator<Item = &DialogueLine> + '_ {
        self.indexed(&self.talk_index, talk_id)
    }

    /// Lines of one quest, in table order / 某个任务的全部行
    pub fn quest_lines(&self, quest_id: i64) -> impl Iterator<Item = &DialogueLine> + '_ {
        self.indexed(&self.quest_index, quest_id)
    }

    fn indexed<'a>(
        &'a self,
        index: &'a HashMap<i64, Vec<usize>>,
        key: i64,
    ) -> impl Iterator<Item = &'a DialogueLine> + 'a {
        index
            .get(&key)
            .into_iter()
            .flatten()
            .map(move |&pos| &self.lines[pos])
    }
}

/// All loaded language tables / 全部语言数据
#[derive(Debug)]
pub struct DatasetStore {
    tables: HashMap<String, Arc<TalkTable>>,
    languages: Vec<String>,
    default_language: String,
}

impl DatasetStore {
    /// Assemble a store from already built tables / 由现成数据表构建
    ///
    /// Languages keep the order of `tables`. An unknown default falls back to the first table.
    pub fn from_tables(tables: Vec<TalkTable>, default_language: &str) -> Result<Self, DataSourceError> {
        if tables.is_empty() {
            return Err(DataSourceError::NoLanguageLoaded);
        }

        let languages: Vec<String> = tables.iter().map(|t| t.lang.to_uppercase()).collect();
        let default_upper = default_language.to_uppercase();
        let default_language = if languages.contains(&default_upper) {
            default_upper
        } else {
            tracing::warn!(
                "Default language {} is not available, falling back to {}",
                default_language,
                languages[0]
            );
            languages[0].clone()
        };

        let tables = tables
            .into_iter()
            .map(|t| (t.lang.to_uppercase(), Arc::new(t)))
            .collect();

        Ok(Self {
            tables,
            languages,
            default_language,
        })
    }

    /// Load every configured language; failed languages are logged and skipped.
    pub async fn load(config: &TalkConfig, text: &TextTable) -> Result<Self, DataSourceError> {
        let mut tables = Vec::with_capacity(config.languages.len());

        for lang in &config.languages {
            let start = std::time::Instant::now();
            match Self::load_language(config, text, lang).await {
                Ok(table) => {
                    tracing::info!(
                        "Loaded {} talk lines for {} in {:?}",
                        table.len(),
                        lang,
                        start.elapsed()
                    );
                    tables.push(table);
                }
                Err(e) => {
                    tracing::error!("Language {} will not be served: {}", lang, e);
                }
            }
        }

        Self::from_tables(tables, &config.default_language)
    }

    async fn load_language(
        config: &TalkConfig,
        text: &TextTable,
        lang: &str,
    ) -> Result<TalkTable, DataSourceError> {
        let labels = SpeakerLabels::from_text(text, lang)?;
        let location = talk_location(&config.data_path, &config.file_pattern, lang);
        let rows = read_rows(lang, &location).await?;
        TalkTable::from_rows(lang, rows, &SpeakerNameResolver::new(labels))
    }

    /// Table of a language, case-insensitive / 获取某语言的数据表
    pub fn table(&self, lang: &str) -> Option<Arc<TalkTable>> {
        self.tables.get(&lang.to_uppercase()).cloned()
    }

    /// Supported languages in configured order / 支持的语言
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }
}
