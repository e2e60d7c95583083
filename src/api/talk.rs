//! Talk search endpoints / 对话检索接口

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};

use homodgcat_backend::talk::speaker::SPEAKER_SECTION;
use homodgcat_backend::talk::view::selector_title;
use homodgcat_backend::talk::{
    expand, search, CollectionKey, DialogView, KeywordKey, KeywordQuery, QueryError, QueryOutcome,
    Selector, TalkTable,
};
use homodgcat_backend::text::{format_template, TextTable};

use crate::api::types::{
    CollectionParams, CollectionResponse, KeywordParams, KeywordResponse, KeywordStatus,
    LanguagePage,
};
use crate::api::{api_error, cached, ApiError, ApiResponse};
use crate::state::AppState;

const ALERT_SECTION: &str = "ALERT";

/// Placeholder shown on the search page and its text key / 说话者占位符提示
const SPEAKER_TIPS: [(&str, &str); 4] = [
    ("TALK_ROLE_PLAYER", "TALK_ROLE_PLAYER"),
    ("TALK_ROLE_MATE_AVATAR", "TALK_ROLE_MATE_AVATAR"),
    ("{REALNAME[ID(1)]}", "REALNAME_ID_1"),
    ("{REALNAME[ID(2)]}", "REALNAME_ID_2"),
];

/// Table of a served language, 404 otherwise / 获取语言数据表
fn language_table(state: &AppState, lang: &str) -> Result<Arc<TalkTable>, ApiError> {
    state.store.table(lang).ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            &format!("Unsupported language: {}", lang),
        )
    })
}

/// GET / - redirect to the default language / 跳转到默认语言
pub async fn index(State(state): State<Arc<AppState>>) -> Redirect {
    Redirect::temporary(&format!("/{}", state.store.default_language()))
}

/// GET /:lang - labels of the search page / 搜索页文本
pub async fn language_page(
    State(state): State<Arc<AppState>>,
    Path(lang): Path<String>,
) -> Result<Response, ApiError> {
    language_table(&state, &lang)?;
    let lang = lang.to_uppercase();

    let page = LanguagePage {
        languages: state.store.languages().to_vec(),
        query: state.text.section("QUERY", &lang),
        tips: state.text.section("TIPS", &lang),
        speakers: SPEAKER_TIPS
            .iter()
            .map(|(code, key)| (code.to_string(), state.text(SPEAKER_SECTION, key, &lang)))
            .collect(),
        language: lang,
    };
    Ok(cached(state.config.cache_max_age, ApiResponse::success(page)))
}

/// GET /:lang/query_keyword - keyword search / 关键词查询
pub async fn query_keyword(
    State(state): State<Arc<AppState>>,
    Path(lang): Path<String>,
    Query(params): Query<KeywordParams>,
) -> Result<Response, ApiError> {
    let table = language_table(&state, &lang)?;
    let lang = lang.to_uppercase();

    let query = KeywordQuery::new(params.speaker, params.content)
        .new_only(params.new)
        .regex(params.regex);
    let key = KeywordKey {
        lang: lang.clone(),
        query: query.clone(),
    };

    let task_state = state.clone();
    let result = tokio::task::spawn_blocking(move || {
        let max_results = task_state.config.max_results;
        task_state
            .keyword_cache
            .get_or_compute(key, || Arc::new(search(&table, &query, max_results)))
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;

    let response = keyword_response(&state.text, &lang, &result);
    match response.status {
        KeywordStatus::Success | KeywordStatus::Overflow => Ok(cached(
            state.config.cache_max_age,
            ApiResponse::success(response),
        )),
        _ => Ok(Json(ApiResponse::success(response)).into_response()),
    }
}

/// Localized status message and views of a keyword result / 组装查询结果
pub fn keyword_response(
    text: &TextTable,
    lang: &str,
    result: &Result<QueryOutcome, QueryError>,
) -> KeywordResponse {
    let alert = |key: &str, args: &[String]| {
        format_template(&text.text(ALERT_SECTION, key, lang), args)
    };

    let (status, message, total) = match result {
        Err(QueryError::EmptyQuery) => (KeywordStatus::Empty, alert("EMPTY", &[]), 0),
        Err(QueryError::InvalidPattern(message)) => {
            (KeywordStatus::InvalidPattern, message.clone(), 0)
        }
        Ok(QueryOutcome::NoResults) => (KeywordStatus::None, alert("NONE", &[]), 0),
        Ok(QueryOutcome::Success { count, .. }) => (
            KeywordStatus::Success,
            alert("SUCCESS", &[count.to_string()]),
            *count,
        ),
        Ok(QueryOutcome::Overflow { cap, actual, .. }) => (
            KeywordStatus::Overflow,
            alert("OVERFLOW", &[cap.to_string(), actual.to_string()]),
            *actual,
        ),
    };

    let results: Vec<DialogView> = match result {
        Ok(outcome) => outcome
            .rows()
            .iter()
            .map(|line| DialogView::with_links(line, text, lang))
            .collect(),
        Err(_) => Vec::new(),
    };

    KeywordResponse {
        status,
        message,
        count: results.len(),
        total,
        results,
    }
}

/// GET /:lang/query_collection - context expansion / 展开上下文
pub async fn query_collection(
    State(state): State<Arc<AppState>>,
    Path(lang): Path<String>,
    Query(params): Query<CollectionParams>,
) -> Result<Response, ApiError> {
    let table = language_table(&state, &lang)?;
    let lang = lang.to_uppercase();

    let selector = Selector::from_params(params.id, params.talk_id, params.quest_id)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, &e.to_string()))?;
    let key = CollectionKey { lang, selector };

    let task_state = state.clone();
    let groups = tokio::task::spawn_blocking(move || {
        task_state
            .collection_cache
            .get_or_compute(key, || Arc::new(expand(&table, selector)))
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;

    tracing::debug!("Collection {:?} returned {} groups", selector, groups.len());

    let response = CollectionResponse {
        title: selector_title(selector),
        groups: groups
            .iter()
            .map(|group| group.lines.iter().map(DialogView::from_line).collect())
            .collect(),
    };
    Ok(cached(state.config.cache_max_age, ApiResponse::success(response)))
}
