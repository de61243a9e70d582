use super::header::Header;
use crate::level::Level;

/// Which entries a scan keeps: an exact tag and a severity floor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Exact tag to match; `None` or blank keeps every tag
    pub keyword: Option<String>,
    /// Entries below this level are skipped
    pub min_level: Level,
}

impl FilterCriteria {
    pub fn new(keyword: Option<String>, min_level: Level) -> Self {
        Self {
            keyword,
            min_level,
        }
    }

    pub fn matches(&self, header: &Header<'_>) -> bool {
        let tag_ok = match self.keyword.as_deref() {
            Some(keyword) if !keyword.trim().is_empty() => keyword == header.tag,
            _ => true,
        };
        tag_ok && header.level >= self.min_level
    }
}
