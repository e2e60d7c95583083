//! Localized text table / 多语言文本表
//!
//! Layout of `text.json`: `SECTION -> KEY -> LANG -> string`.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

type Section = HashMap<String, HashMap<String, String>>;

#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("Failed to read text table {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse text table: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Translation table shared by ingestion and the presentation layer / 文本表
#[derive(Debug, Clone, Default)]
pub struct TextTable {
    sections: HashMap<String, Section>,
}

impl TextTable {
    /// Load from a JSON file / 从 JSON 文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TextError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| TextError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_json(&content)?;
        tracing::info!("Loaded text table from {:?} ({} sections)", path, table.sections.len());
        Ok(table)
    }

    pub fn from_json(content: &str) -> Result<Self, TextError> {
        let sections: HashMap<String, Section> = serde_json::from_str(content)?;
        Ok(Self { sections })
    }

    pub fn get(&self, section: &str, key: &str, lang: &str) -> Option<&str> {
        self.sections
            .get(section)?
            .get(key)?
            .get(lang)
            .map(String::as_str)
    }

    /// Like [`get`](Self::get) but falls back to the key itself / 缺失时返回键名
    pub fn text(&self, section: &str, key: &str, lang: &str) -> String {
        self.get(section, key, lang).unwrap_or(key).to_string()
    }

    /// All keys of a section translated into `lang` / 某分区的全部译文
    pub fn section(&self, section: &str, lang: &str) -> BTreeMap<String, String> {
        self.sections
            .get(section)
            .map(|keys| {
                keys.iter()
                    .filter_map(|(key, langs)| langs.get(lang).map(|v| (key.clone(), v.clone())))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Fill `{}` (sequential) and `{N}` (positional) placeholders / 填充占位符
///
/// Unknown or out-of-range placeholders are left untouched.
pub fn format_template(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut next = 0;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find('}') else {
            out.push_str(tail);
            return out;
        };
        let inner = &tail[1..end];
        let index = if inner.is_empty() {
            let i = next;
            next += 1;
            Some(i)
        } else {
            inner.parse::<usize>().ok()
        };
        match index.and_then(|i| args.get(i)) {
            Some(arg) => out.push_str(arg),
            None => out.push_str(&tail[..=end]),
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "ALERT": {
            "SUCCESS": {"EN": "Found {} results", "CHS": "找到 {} 条结果"},
            "OVERFLOW": {"EN": "Showing first {} of {} results"}
        },
        "SPEAKER": {
            "TALK_ROLE_PLAYER": {"EN": "Traveler"}
        }
    }"#;

    #[test]
    fn test_get_and_fallback() {
        let text = TextTable::from_json(SAMPLE).unwrap();
        assert_eq!(text.get("SPEAKER", "TALK_ROLE_PLAYER", "EN"), Some("Traveler"));
        assert_eq!(text.get("SPEAKER", "TALK_ROLE_PLAYER", "CHS"), None);
        assert_eq!(text.text("ALERT", "MISSING", "EN"), "MISSING");
    }

    #[test]
    fn test_section() {
        let text = TextTable::from_json(SAMPLE).unwrap();
        let alert = text.section("ALERT", "EN");
        assert_eq!(alert.len(), 2);
        assert_eq!(text.section("ALERT", "CHS").len(), 1);
        assert!(text.section("NOPE", "EN").is_empty());
    }

    #[test]
    fn test_format_template() {
        let args = vec!["1000".to_string(), "2345".to_string()];
        assert_eq!(format_template("first {} of {}", &args), "first 1000 of 2345");
        assert_eq!(format_template("{1} > {0}", &args), "2345 > 1000");
        assert_eq!(format_template("{} {} {}", &args), "1000 2345 {}");
        assert_eq!(format_template("no braces", &args), "no braces");
        assert_eq!(format_template("open { brace", &args), "open { brace");
    }

    #[test]
    fn test_load_missing_file() {
        let err = TextTable::load("/definitely/not/here/text.json").unwrap_err();
        assert!(matches!(err, TextError::Read { .. }));
    }
}
