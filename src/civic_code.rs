//! Bundled reference text of the national police and coexistence code.

use crate::errors::AppError;
use crate::search::{filter, Searchable};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

const LAWS_JSON: &str = include_str!("../data/civic_code.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Law {
    pub id: String,
    pub title: String,
    pub summary: Option<String>,
    pub full_text: Option<String>,
    pub penalty: Option<String>,
    pub articles: Option<String>,
}

impl Searchable for Law {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.title.as_str()),
            Cow::Borrowed(self.summary.as_deref().unwrap_or("")),
        ]
    }
}

/// Law prepared for display: blank texts read `-`, blank penalty and
/// articles are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LawDetail {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub full_text: String,
    pub penalty: Option<String>,
    pub articles: Option<String>,
}

fn present(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

impl From<&Law> for LawDetail {
    fn from(law: &Law) -> Self {
        Self {
            id: law.id.clone(),
            title: law.title.clone(),
            summary: present(&law.summary).unwrap_or_else(|| "-".to_string()),
            full_text: present(&law.full_text).unwrap_or_else(|| "-".to_string()),
            penalty: present(&law.penalty),
            articles: present(&law.articles),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CivicCode {
    laws: Vec<Law>,
}

impl CivicCode {
    /// Parses the embedded law list.
    pub fn load() -> Result<Self, AppError> {
        let laws: Vec<Law> = serde_json::from_str(LAWS_JSON).map_err(|e| {
            AppError::InternalError(format!("Failed to parse civic code data: {}", e))
        })?;
        tracing::debug!(component = "civic_code", "{} laws loaded", laws.len());
        Ok(Self { laws })
    }

    pub fn laws(&self) -> &[Law] {
        &self.laws
    }

    /// Laws whose title or summary contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<Law> {
        filter(&self.laws, query)
    }

    pub fn find(&self, id: &str) -> Option<&Law> {
        self.laws.iter().find(|law| law.id == id)
    }

    pub fn detail(&self, id: &str) -> Option<LawDetail> {
        self.find(id).map(LawDetail::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_bundled_laws() {
        let code = CivicCode::load().unwrap();
        assert_eq!(code.laws().len(), 8);
        assert_eq!(code.find("1").unwrap().title, "LEY 1801 DE 2016");
        assert!(code.find("99").is_none());
    }

    #[test]
    fn test_search_title_and_summary() {
        let code = CivicCode::load().unwrap();
        assert_eq!(code.search("").len(), 8);
        assert!(!code.search("ley 1801").is_empty());
        assert!(!code.search("AMENAZAR").is_empty());
        assert!(code.search("zzzz").is_empty());
    }

    #[test]
    fn test_detail_fills_missing_text() {
        let law = Law {
            id: "x".to_string(),
            title: "LEY X".to_string(),
            summary: Some(String::new()),
            full_text: None,
            penalty: Some(String::new()),
            articles: Some("Art. 1".to_string()),
        };
        let detail = LawDetail::from(&law);
        assert_eq!(detail.summary, "-");
        assert_eq!(detail.full_text, "-");
        assert_eq!(detail.penalty, None);
        assert_eq!(detail.articles.as_deref(), Some("Art. 1"));
    }
}
