//! Human-readable Markdown rendering of a project's research log.

use std::fmt::Write;

use scout_shared::ReviewRecord;

/// Render records (in log order) grouped under one heading per UTC day.
pub fn render_markdown(project: &str, records: &[ReviewRecord]) -> String {
    let mut out = format!("# Research Log: {project}\n");

    if records.is_empty() {
        out.push_str("\nNo reviews logged yet.\n");
        return out;
    }

    let mut current_day = None;
    for record in records {
        let day = record.logged_at.date_naive();
        if current_day != Some(day) {
            let _ = write!(out, "\n## {}\n", day.format("%Y-%m-%d"));
            current_day = Some(day);
        }

        let _ = write!(
            out,
            "\n### [{}]({})\n*Reviewed at {} UTC | Type: {}*\n\n- **Relevance**: {}\n",
            record.title,
            record.url,
            record.logged_at.format("%H:%M"),
            record.content_type,
            record.relevance,
        );

        if !record.insights.is_empty() {
            out.push_str("- **Key insights**:\n");
            for insight in &record.insights {
                let _ = writeln!(out, "  - {insight}");
            }
        }
        if !record.suggestions.is_empty() {
            out.push_str("- **Suggestions**:\n");
            for suggestion in &record.suggestions {
                let _ = writeln!(out, "  - {suggestion}");
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use scout_shared::{ContentType, Relevance};

    fn record(title: &str, day: u32, hour: u32, insights: &[&str]) -> ReviewRecord {
        ReviewRecord {
            url: format!("https://example.com/{}", title.to_lowercase()),
            project: "scout".into(),
            title: title.into(),
            content_type: ContentType::Article,
            relevance: Relevance::Medium,
            insights: insights.iter().map(|s| s.to_string()).collect(),
            suggestions: vec![],
            logged_at: Utc.with_ymd_and_hms(2025, 5, day, hour, 7, 0).unwrap(),
        }
    }

    #[test]
    fn groups_by_day() {
        let records = vec![
            record("First", 1, 9, &["one", "two"]),
            record("Second", 1, 17, &[]),
            record("Third", 2, 8, &["three"]),
        ];
        let md = render_markdown("scout", &records);

        assert!(md.starts_with("# Research Log: scout\n"));
        assert_eq!(md.matches("## 2025-05-01").count(), 1);
        assert_eq!(md.matches("## 2025-05-02").count(), 1);
        assert!(md.contains("### [First](https://example.com/first)\n*Reviewed at 09:07 UTC | Type: article*"));
        assert!(md.contains("- **Relevance**: medium"));
        assert!(md.contains("- **Key insights**:\n  - one\n  - two\n"));
        assert!(!md.contains("**Suggestions**"));
        assert!(md.find("First") < md.find("Third"));
    }

    #[test]
    fn empty_log() {
        let md = render_markdown("scout", &[]);
        assert!(md.contains("No reviews logged yet."));
    }
}
