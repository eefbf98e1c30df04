use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// An item as the feed gateway returns it. Every field is optional on the
/// wire; normalization decides what to keep.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, rename = "pubDate")]
    pub pub_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalItem {
    pub title: String,
    pub link: String,
    /// `None` when the source sent no timestamp or one we could not parse.
    pub published_at: Option<DateTime<Utc>>,
    pub source: String,
}

impl CanonicalItem {
    pub fn new(title: &str, link: &str, published_at: Option<DateTime<Utc>>, source: &str) -> Self {
        Self {
            title: title.to_string(),
            link: link.to_string(),
            published_at,
            source: source.to_string(),
        }
    }

    /// Normalize a gateway item for `source`. Returns `None` for items
    /// without a link, which cannot be rendered.
    pub fn from_raw(raw: RawItem, source: &str) -> Option<Self> {
        let link = raw.link.map(|l| l.trim().to_string()).unwrap_or_default();
        if link.is_empty() {
            return None;
        }

        let title = raw
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Untitled".to_string());

        let published_at = raw.pub_date.as_deref().and_then(parse_timestamp);

        Some(Self {
            title,
            link,
            published_at,
            source: source.to_string(),
        })
    }
}

/// A canonical item ready for the presenter. Only the title may differ
/// from the canonical one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayItem {
    pub item: CanonicalItem,
    pub title: String,
}

impl DisplayItem {
    pub fn untranslated(item: CanonicalItem) -> Self {
        let title = item.title.clone();
        Self { item, title }
    }

    pub fn with_title(item: CanonicalItem, title: String) -> Self {
        Self { item, title }
    }
}

/// Parse the timestamp formats gateways are known to emit.
///
/// rss2json sends `YYYY-MM-DD HH:MM:SS` in UTC; raw feeds leak RFC 2822 and
/// RFC 3339 through other gateways.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    mod parse_timestamp_tests {
        use super::*;

        #[test]
        fn test_gateway_format() {
            assert_eq!(
                parse_timestamp("2024-12-09 12:00:00"),
                Some(Utc.with_ymd_and_hms(2024, 12, 9, 12, 0, 0).unwrap())
            );
        }

        #[test]
        fn test_rfc2822() {
            assert_eq!(
                parse_timestamp("Mon, 09 Dec 2024 12:00:00 GMT"),
                Some(Utc.with_ymd_and_hms(2024, 12, 9, 12, 0, 0).unwrap())
            );
        }

        #[test]
        fn test_rfc3339_with_offset() {
            assert_eq!(
                parse_timestamp("2024-12-09T14:00:00+02:00"),
                Some(Utc.with_ymd_and_hms(2024, 12, 9, 12, 0, 0).unwrap())
            );
        }

        #[test]
        fn test_malformed_is_none() {
            assert_eq!(parse_timestamp("yesterday-ish"), None);
            assert_eq!(parse_timestamp("2024-13-45 99:00:00"), None);
        }

        #[test]
        fn test_blank_is_none() {
            assert_eq!(parse_timestamp(""), None);
            assert_eq!(parse_timestamp("   "), None);
        }
    }

    mod from_raw_tests {
        use super::*;

        #[test]
        fn test_normalizes_fields() {
            let raw = RawItem {
                title: Some("  Storm hits coast ".to_string()),
                link: Some(" https://news.example.com/storm ".to_string()),
                pub_date: Some("2024-12-09 08:30:00".to_string()),
            };

            let item = CanonicalItem::from_raw(raw, "BBC News").unwrap();
            assert_eq!(item.title, "Storm hits coast");
            assert_eq!(item.link, "https://news.example.com/storm");
            assert_eq!(item.source, "BBC News");
            assert_eq!(
                item.published_at,
                Some(Utc.with_ymd_and_hms(2024, 12, 9, 8, 30, 0).unwrap())
            );
        }

        #[test]
        fn test_missing_link_is_skipped() {
            let raw = RawItem {
                title: Some("No link".to_string()),
                link: None,
                pub_date: None,
            };
            assert!(CanonicalItem::from_raw(raw, "CNN").is_none());

            let raw = RawItem {
                title: Some("Blank link".to_string()),
                link: Some("   ".to_string()),
                pub_date: None,
            };
            assert!(CanonicalItem::from_raw(raw, "CNN").is_none());
        }

        #[test]
        fn test_missing_title_becomes_untitled() {
            let raw = RawItem {
                title: None,
                link: Some("https://example.com/a".to_string()),
                pub_date: None,
            };
            let item = CanonicalItem::from_raw(raw, "CNN").unwrap();
            assert_eq!(item.title, "Untitled");
        }

        #[test]
        fn test_malformed_date_kept_as_none() {
            let raw = RawItem {
                title: Some("Odd date".to_string()),
                link: Some("https://example.com/a".to_string()),
                pub_date: Some("not a date".to_string()),
            };
            let item = CanonicalItem::from_raw(raw, "CNN").unwrap();
            assert_eq!(item.published_at, None);
        }

        #[test]
        fn test_deserializes_gateway_field_names() {
            let json = r#"{
                "title": "Headline",
                "link": "https://example.com/h",
                "pubDate": "2024-12-09 12:00:00",
                "guid": "ignored",
                "thumbnail": ""
            }"#;
            let raw: RawItem = serde_json::from_str(json).unwrap();
            assert_eq!(raw.pub_date.as_deref(), Some("2024-12-09 12:00:00"));
        }
    }

    #[test]
    fn test_display_item_untranslated_keeps_title() {
        let item = CanonicalItem::new("Headline", "https://example.com/h", None, "CNN");
        let display = DisplayItem::untranslated(item.clone());
        assert_eq!(display.title, "Headline");
        assert_eq!(display.item, item);
    }
}
