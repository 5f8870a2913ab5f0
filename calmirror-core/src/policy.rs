//! Per-direction sync rules.

use crate::error::{CalMirrorError, CalMirrorResult};

/// Case-sensitive substring matcher with any-of semantics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordMatcher(Vec<String>);

impl KeywordMatcher {
    /// Keywords are trimmed; empty ones are dropped so they cannot match everything.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        KeywordMatcher(
            keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
        )
    }

    pub fn matches(&self, title: &str) -> bool {
        self.0.iter().any(|keyword| title.contains(keyword.as_str()))
    }

    pub fn keywords(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How a mirror's title is derived from its origin.
#[derive(Debug, Clone, PartialEq)]
pub enum TitleMode {
    Verbatim,
    Masked(String),
}

impl TitleMode {
    pub fn title_for<'a>(&'a self, source_title: &'a str) -> &'a str {
        match self {
            TitleMode::Verbatim => source_title,
            TitleMode::Masked(placeholder) => placeholder,
        }
    }
}

/// The rules governing one sync direction. Immutable for the duration of a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPolicy {
    keywords: KeywordMatcher,
    title: TitleMode,
    auto_sync_holidays: bool,
    auto_sync_weekdays: bool,
}

impl SyncPolicy {
    pub fn new(
        keywords: KeywordMatcher,
        title: TitleMode,
        auto_sync_holidays: bool,
        auto_sync_weekdays: bool,
    ) -> CalMirrorResult<Self> {
        if let TitleMode::Masked(placeholder) = &title
            && placeholder.trim().is_empty()
        {
            return Err(CalMirrorError::Config(
                "A masked direction needs a non-empty placeholder title".into(),
            ));
        }

        if auto_sync_holidays && auto_sync_weekdays {
            return Err(CalMirrorError::Config(
                "A direction auto-syncs either holidays or weekdays, not both".into(),
            ));
        }

        Ok(SyncPolicy {
            keywords,
            title,
            auto_sync_holidays,
            auto_sync_weekdays,
        })
    }

    pub fn keywords(&self) -> &KeywordMatcher {
        &self.keywords
    }

    pub fn title(&self) -> &TitleMode {
        &self.title
    }

    pub fn auto_sync_holidays(&self) -> bool {
        self.auto_sync_holidays
    }

    pub fn auto_sync_weekdays(&self) -> bool {
        self.auto_sync_weekdays
    }

    /// Whether a non-keyword event on a day with the given classification
    /// is picked up automatically. Both flags are checked independently.
    pub fn auto_syncs(&self, is_holiday_or_weekend: bool) -> bool {
        (self.auto_sync_holidays && is_holiday_or_weekend)
            || (self.auto_sync_weekdays && !is_holiday_or_weekend)
    }

    /// Whether the day classification is needed to decide on `title`.
    pub fn needs_classification(&self, title: &str) -> bool {
        !self.keywords.matches(title) && (self.auto_sync_holidays || self.auto_sync_weekdays)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_match_is_case_sensitive_substring() {
        let matcher = KeywordMatcher::new(["[Life]", "出張"]);

        assert!(matcher.matches("Dentist [Life]"));
        assert!(matcher.matches("大阪出張"));
        assert!(!matcher.matches("dentist [life]"));
        assert!(!matcher.matches("Team sync"));
    }

    #[test]
    fn test_empty_keywords_are_dropped() {
        let matcher = KeywordMatcher::new(["", "  ", "Trip"]);

        assert_eq!(matcher.keywords(), ["Trip".to_string()]);
        assert!(!matcher.matches("anything"));
    }

    #[test]
    fn test_masked_title_replaces_source() {
        assert_eq!(TitleMode::Masked("Busy".into()).title_for("Therapy"), "Busy");
        assert_eq!(TitleMode::Verbatim.title_for("Therapy"), "Therapy");
    }

    #[test]
    fn test_rejects_blank_placeholder() {
        let result = SyncPolicy::new(
            KeywordMatcher::default(),
            TitleMode::Masked(" ".into()),
            true,
            false,
        );

        assert!(matches!(result, Err(CalMirrorError::Config(_))));
    }

    #[test]
    fn test_rejects_both_auto_sync_flags() {
        let result = SyncPolicy::new(KeywordMatcher::default(), TitleMode::Verbatim, true, true);

        assert!(matches!(result, Err(CalMirrorError::Config(_))));
    }

    #[test]
    fn test_auto_syncs_by_day_classification() {
        let holidays =
            SyncPolicy::new(KeywordMatcher::default(), TitleMode::Verbatim, true, false).unwrap();
        let weekdays =
            SyncPolicy::new(KeywordMatcher::default(), TitleMode::Verbatim, false, true).unwrap();
        let never =
            SyncPolicy::new(KeywordMatcher::default(), TitleMode::Verbatim, false, false).unwrap();

        assert!(holidays.auto_syncs(true));
        assert!(!holidays.auto_syncs(false));
        assert!(weekdays.auto_syncs(false));
        assert!(!weekdays.auto_syncs(true));
        assert!(!never.auto_syncs(true));
        assert!(!never.auto_syncs(false));
    }
}
