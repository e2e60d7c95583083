//! Talk data error types / 对话数据错误类型

/// Raised while building a language table at startup / 加载语言数据表时的错误
///
/// Any of these is fatal for the affected language only.
#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("Failed to read talk data for {lang} from {location}: {message}")]
    Read {
        lang: String,
        location: String,
        message: String,
    },

    #[error("Unsupported talk data format: {0}")]
    UnsupportedFormat(String),

    #[error("Talk data for {lang} is missing column `{column}`")]
    MissingColumn { lang: String, column: String },

    #[error("Talk data for {lang} has an unreadable column `{column}`: {message}")]
    InvalidColumn {
        lang: String,
        column: String,
        message: String,
    },

    #[error("Talk data for {lang} has a row without id at position {row}")]
    MissingId { lang: String, row: usize },

    #[error("Talk data for {lang} contains duplicate id {id}")]
    DuplicateId { lang: String, id: i64 },

    #[error("Missing speaker text `{key}` for {lang}")]
    MissingSpeakerText { lang: String, key: String },

    #[error("No language could be loaded")]
    NoLanguageLoaded,
}

/// Per-call keyword query failures / 关键词查询错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Both speaker and content are empty")]
    EmptyQuery,

    #[error("{0}")]
    InvalidPattern(String),
}

/// Collection expansion requested without a selector / 缺少展开条件
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("One of id, talkId or questId is required")]
    Missing,
}
