use std::sync::Arc;

use homodgcat_backend::config::TalkConfig;
use homodgcat_backend::talk::{
    CollectionKey, DatasetStore, Group, KeywordKey, MemoCache, QueryError, QueryOutcome,
};
use homodgcat_backend::text::TextTable;

/// Memoized keyword result, errors included / 关键词查询缓存值
pub type KeywordResult = Arc<Result<QueryOutcome, QueryError>>;

/// Shared application state / 应用共享状态
pub struct AppState {
    pub config: TalkConfig,
    pub store: Arc<DatasetStore>,
    pub text: Arc<TextTable>,
    pub keyword_cache: MemoCache<KeywordKey, KeywordResult>,
    pub collection_cache: MemoCache<CollectionKey, Arc<Vec<Group>>>,
}

impl AppState {
    pub fn new(config: TalkConfig, store: DatasetStore, text: TextTable) -> Self {
        let capacity = config.cache_capacity;
        Self {
            config,
            store: Arc::new(store),
            text: Arc::new(text),
            keyword_cache: MemoCache::new(capacity),
            collection_cache: MemoCache::new(capacity),
        }
    }

    /// Localized text with the key as fallback / 获取本地化文本
    pub fn text(&self, section: &str, key: &str, lang: &str) -> String {
        self.text.text(section, key, lang)
    }
}
