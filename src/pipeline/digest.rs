// src/pipeline/digest.rs

//! Digest composition and rendering.
//!
//! `compose` groups newly discovered postings by employer. Rendering turns
//! the result into an e-mail subject, an HTML body and a plain-text body.
//! Nothing here performs I/O.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;

use crate::models::{PostingRecord, StoredPosting};

/// Report of one run's new postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Digest {
    /// Nothing new was found.
    Empty { date: NaiveDate },
    /// New postings grouped by source, groups ordered by source name.
    Postings {
        date: NaiveDate,
        total: usize,
        groups: Vec<DigestGroup>,
    },
}

/// New postings from one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestGroup {
    pub source: String,
    pub count: usize,
    pub entries: Vec<DigestEntry>,
}

/// One posting line in a digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestEntry {
    pub title: String,
    pub location: String,
    pub url: String,
}

/// Group `postings` into a digest for `date`.
///
/// Entries keep their relative input order within a group.
pub fn compose<'a>(
    date: NaiveDate,
    postings: impl IntoIterator<Item = &'a PostingRecord>,
) -> Digest {
    let mut by_source: BTreeMap<&str, Vec<DigestEntry>> = BTreeMap::new();
    for posting in postings {
        by_source
            .entry(posting.source.as_str())
            .or_default()
            .push(DigestEntry {
                title: posting.title.clone(),
                location: posting.location.clone(),
                url: posting.url.clone(),
            });
    }

    if by_source.is_empty() {
        return Digest::Empty { date };
    }

    let groups: Vec<DigestGroup> = by_source
        .into_iter()
        .map(|(source, entries)| DigestGroup {
            source: source.to_string(),
            count: entries.len(),
            entries,
        })
        .collect();

    Digest::Postings {
        date,
        total: groups.iter().map(|g| g.count).sum(),
        groups,
    }
}

/// Group postings read back from the store.
pub fn compose_stored(date: NaiveDate, postings: &[StoredPosting]) -> Digest {
    let records: Vec<PostingRecord> = postings.iter().map(StoredPosting::record).collect();
    compose(date, &records)
}

impl Digest {
    pub fn date(&self) -> NaiveDate {
        match self {
            Digest::Empty { date } | Digest::Postings { date, .. } => *date,
        }
    }

    pub fn total(&self) -> usize {
        match self {
            Digest::Empty { .. } => 0,
            Digest::Postings { total, .. } => *total,
        }
    }

    pub fn groups(&self) -> &[DigestGroup] {
        match self {
            Digest::Empty { .. } => &[],
            Digest::Postings { groups, .. } => groups,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Digest::Empty { .. })
    }

    /// E-mail subject line, e.g. `Internship Digest - October 18, 2026`.
    pub fn subject(&self) -> String {
        format!("Internship Digest - {}", self.date().format("%B %d, %Y"))
    }

    /// HTML e-mail body.
    pub fn to_html(&self) -> String {
        let mut html = String::from(HTML_HEAD);
        match self {
            Digest::Empty { .. } => html.push_str(HTML_EMPTY),
            Digest::Postings { total, groups, .. } => {
                let _ = write!(
                    html,
                    "<h1>New Internship Opportunities</h1>\n\
                     <div class=\"summary\"><strong>{total} new {} found today!</strong></div>\n",
                    plural(*total, "internship", "internships")
                );
                for group in groups {
                    let _ = writeln!(
                        html,
                        "<h2>{} ({} {})</h2>",
                        encode_text(&group.source),
                        group.count,
                        plural(group.count, "opening", "openings")
                    );
                    for entry in &group.entries {
                        let _ = writeln!(
                            html,
                            "<div class=\"job\">\n  <div class=\"job-title\">{}</div>\n  \
                             <div class=\"job-location\">{}</div>\n  \
                             <div><a href=\"{}\" class=\"job-link\">Apply Here &rarr;</a></div>\n</div>",
                            encode_text(&entry.title),
                            encode_text(&entry.location),
                            encode_double_quoted_attribute(&entry.url)
                        );
                    }
                }
                html.push_str(HTML_SIGN_OFF);
            }
        }
        html.push_str("</body>\n</html>\n");
        html
    }

    /// Plain-text e-mail body.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        match self {
            Digest::Empty { .. } => {
                text.push_str("No New Internships Today\n\n");
                text.push_str(
                    "No new internship opportunities were found today across the monitored companies.\n",
                );
                text.push_str("Keep checking back - new opportunities are posted regularly!\n");
            }
            Digest::Postings { total, groups, .. } => {
                let _ = writeln!(
                    text,
                    "{total} new {} found today!",
                    plural(*total, "internship", "internships")
                );
                for group in groups {
                    let _ = writeln!(
                        text,
                        "\n{} ({} {})",
                        group.source,
                        group.count,
                        plural(group.count, "opening", "openings")
                    );
                    for entry in &group.entries {
                        let _ = writeln!(text, "  - {}", entry.title);
                        let _ = writeln!(text, "    Location: {}", entry.location);
                        let _ = writeln!(text, "    Apply: {}", entry.url);
                    }
                }
            }
        }
        text.push_str("\nThis is an automated email from your internship digest.\n");
        text
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

const HTML_HEAD: &str = r#"<html>
<head>
<style>
  body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
  h1 { color: #2c3e50; }
  h2 { color: #3498db; border-bottom: 2px solid #3498db; padding-bottom: 5px; }
  .job { background-color: #f8f9fa; padding: 15px; margin: 10px 0; border-left: 4px solid #3498db; border-radius: 4px; }
  .job-title { font-weight: bold; font-size: 16px; color: #2c3e50; }
  .job-location { color: #7f8c8d; font-style: italic; }
  .job-link { color: #3498db; text-decoration: none; }
  .summary { background-color: #e8f4f8; padding: 10px; border-radius: 4px; margin-bottom: 20px; }
  .message { background-color: #f8f9fa; padding: 20px; border-left: 4px solid #95a5a6; border-radius: 4px; text-align: center; }
  .footer { color: #7f8c8d; font-size: 12px; }
</style>
</head>
<body>
"#;

const HTML_EMPTY: &str = r#"<div class="message">
  <h2>No New Internships Today</h2>
  <p>No new internship opportunities were found today across the monitored companies.</p>
  <p>Keep checking back - new opportunities are posted regularly!</p>
</div>
<hr style="margin-top: 30px; border: none; border-top: 1px solid #ddd;">
<p class="footer">This is an automated email from your internship digest.</p>
"#;

const HTML_SIGN_OFF: &str = r#"<hr style="margin-top: 30px; border: none; border-top: 1px solid #ddd;">
<p class="footer">This is an automated email from your internship digest. Good luck with your applications!</p>
"#;

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn record(source: &str, title: &str, url: &str) -> PostingRecord {
        PostingRecord {
            source: source.to_string(),
            title: title.to_string(),
            location: "Toronto, ON".to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_groups_by_source_in_name_order() {
        let postings = vec![
            record("A", "t1", "https://a/1"),
            record("B", "t2", "https://b/2"),
            record("A", "t3", "https://a/3"),
        ];
        let digest = compose(date(), &postings);

        assert_eq!(digest.total(), 3);
        let groups = digest.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].source, "A");
        assert_eq!(groups[0].count, 2);
        let titles: Vec<_> = groups[0].entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["t1", "t3"]);
        assert_eq!(groups[1].source, "B");
        assert_eq!(groups[1].entries[0].title, "t2");
    }

    #[test]
    fn test_group_order_ignores_input_order() {
        let postings = vec![
            record("TD Bank", "t1", "https://td/1"),
            record("AMD", "t2", "https://amd/2"),
            record("Nvidia", "t3", "https://nv/3"),
        ];
        let sources: Vec<_> = compose(date(), &postings)
            .groups()
            .iter()
            .map(|g| g.source.clone())
            .collect();
        assert_eq!(sources, vec!["AMD", "Nvidia", "TD Bank"]);
    }

    #[test]
    fn test_empty_input_is_empty_variant() {
        let digest = compose(date(), &Vec::<PostingRecord>::new());
        assert_eq!(digest, Digest::Empty { date: date() });
        assert!(digest.is_empty());
        assert!(digest.groups().is_empty());
        assert!(digest.to_html().contains("No New Internships Today"));
        assert!(digest.to_text().starts_with("No New Internships Today"));
    }

    #[test]
    fn test_subject() {
        assert_eq!(
            compose(date(), &Vec::<PostingRecord>::new()).subject(),
            "Internship Digest - October 18, 2026"
        );
    }

    #[test]
    fn test_html_rendering_and_escaping() {
        let postings = vec![
            record("AT&T", "<Script> Intern", "https://att/1?a=1&b=\"2\""),
            record("AMD", "GPU Intern", "https://amd/1"),
            record("AMD", "CPU Intern", "https://amd/2"),
        ];
        let html = compose(date(), &postings).to_html();

        assert!(html.contains("3 new internships found today!"));
        assert!(html.contains("<h2>AMD (2 openings)</h2>"));
        assert!(html.contains("<h2>AT&amp;T (1 opening)</h2>"));
        assert!(html.contains("&lt;Script&gt; Intern"));
        assert!(!html.contains("<Script>"));
        assert!(html.contains("href=\"https://att/1?a=1&amp;b=&quot;2&quot;\""));
        assert!(html.find("AMD (2").unwrap() < html.find("AT&amp;T (1").unwrap());
    }

    #[test]
    fn test_text_rendering_singular() {
        let text = compose(date(), &[record("BMO", "Risk Intern", "https://bmo/1")]).to_text();
        assert!(text.starts_with("1 new internship found today!"));
        assert!(text.contains("BMO (1 opening)"));
        assert!(text.contains("  - Risk Intern\n    Location: Toronto, ON\n    Apply: https://bmo/1"));
    }

    #[test]
    fn test_compose_stored() {
        let stored = vec![StoredPosting {
            id: 7,
            source: "RBC".to_string(),
            title: "Data Intern".to_string(),
            location: "Toronto, ON".to_string(),
            url: "https://rbc/7".to_string(),
            first_seen: date(),
            last_seen: date(),
        }];
        let digest = compose_stored(date(), &stored);
        assert_eq!(digest.total(), 1);
        assert_eq!(digest.groups()[0].entries[0].url, "https://rbc/7");
    }

    proptest! {
        #[test]
        fn prop_grouping_is_complete(
            items in proptest::collection::vec((0u8..5, 0u16..500), 1..40),
        ) {
            let postings: Vec<PostingRecord> = items
                .iter()
                .enumerate()
                .map(|(i, (source, title))| {
                    record(&format!("S{source}"), &format!("T{title}"), &format!("https://x/{i}"))
                })
                .collect();
            let digest = compose(date(), &postings);

            prop_assert!(!digest.is_empty());
            prop_assert_eq!(digest.total(), postings.len());

            let sources: Vec<&str> = digest.groups().iter().map(|g| g.source.as_str()).collect();
            let mut sorted = sources.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(&sources, &sorted);

            let grouped: HashSet<&str> = digest
                .groups()
                .iter()
                .flat_map(|g| g.entries.iter().map(|e| e.url.as_str()))
                .collect();
            let input: HashSet<&str> = postings.iter().map(|p| p.url.as_str()).collect();
            prop_assert_eq!(grouped, input);

            for group in digest.groups() {
                prop_assert_eq!(group.count, group.entries.len());
                let expected: Vec<&str> = postings
                    .iter()
                    .filter(|p| p.source == group.source)
                    .map(|p| p.url.as_str())
                    .collect();
                let actual: Vec<&str> = group.entries.iter().map(|e| e.url.as_str()).collect();
                prop_assert_eq!(actual, expected);
            }
        }
    }
}
