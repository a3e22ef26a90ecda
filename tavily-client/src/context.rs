//! Rendering search results into a single prompt-ready context string.
//!
//! Each result becomes `"{content}\nSource: {url}"`; entries are joined by a
//! blank line in result order. The budget counts characters, not model
//! tokens: whole entries are packed while they fit, and only a first entry
//! that is larger than the whole budget gets cut (at a char boundary).
use crate::types::SearchResult;

const SEPARATOR: &str = "\n\n";

pub fn render_entry(result: &SearchResult) -> String {
    format!("{}\nSource: {}", result.content, result.url)
}

/// Join results, keeping the output within `max_chars` characters.
pub fn build_context(results: &[SearchResult], max_chars: usize) -> String {
    let mut out = String::new();
    let mut used = 0usize;

    for result in results {
        let entry = render_entry(result);
        let entry_chars = entry.chars().count();
        let sep_chars = if out.is_empty() { 0 } else { SEPARATOR.len() };

        if used + sep_chars + entry_chars <= max_chars {
            if sep_chars > 0 {
                out.push_str(SEPARATOR);
            }
            out.push_str(&entry);
            used += sep_chars + entry_chars;
            continue;
        }

        if out.is_empty() {
            out.extend(entry.chars().take(max_chars));
        }
        break;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join_results(results: &[SearchResult]) -> String {
        results
            .iter()
            .map(render_entry)
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }

    fn result(content: &str, url: &str) -> SearchResult {
        SearchResult {
            title: String::new(),
            url: url.into(),
            content: content.into(),
            score: 0.5,
            raw_content: None,
            published_date: None,
        }
    }

    #[test]
    fn joins_entries_with_blank_line_in_order() {
        let results = vec![
            result("Qo'noS is the Klingon homeworld.", "https://a.example"),
            result("Kahless united the Klingons.", "https://b.example"),
        ];
        assert_eq!(
            join_results(&results),
            "Qo'noS is the Klingon homeworld.\nSource: https://a.example\n\n\
             Kahless united the Klingons.\nSource: https://b.example"
        );
    }

    #[test]
    fn large_budget_equals_plain_join() {
        let results = vec![result("one", "u1"), result("two", "u2"), result("three", "u3")];
        assert_eq!(build_context(&results, 10_000), join_results(&results));
    }

    #[test]
    fn packs_whole_entries_only() {
        let results = vec![result("one", "u1"), result("two", "u2")];
        // "one\nSource: u1" is 14 chars; adding the second needs 2 + 14 more.
        let first = render_entry(&results[0]);
        assert_eq!(build_context(&results, 20), first);
        assert_eq!(build_context(&results, 30).chars().count(), 30);
    }

    #[test]
    fn oversized_first_entry_is_cut_on_char_boundary() {
        let results = vec![result("ÆÆÆÆÆÆÆÆÆÆ", "u")];
        let ctx = build_context(&results, 4);
        assert_eq!(ctx, "ÆÆÆÆ");
    }

    #[test]
    fn zero_budget_and_no_results_are_empty() {
        assert_eq!(build_context(&[result("a", "b")], 0), "");
        assert_eq!(build_context(&[], 100), "");
        assert_eq!(join_results(&[]), "");
    }
}
