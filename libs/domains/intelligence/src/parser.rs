//! Turns free-text completions into structured results.
//!
//! Two modes:
//! - [`parse`] splits a markdown-ish reply into summary, findings, cost
//!   insights, recommendations and risk using line keywords.
//! - [`parse_optimizations`] pulls a JSON array of suggestions out of a reply.
//!
//! Neither fails: unrecognised text degrades to the whole reply as summary
//! or as a single suggestion.

use crate::models::{OptimizationSuggestion, ParsedAnalysis};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Summary,
    Findings,
    Costs,
    Recommendations,
    Risk,
}

const SUMMARY_KEYWORDS: [&str; 3] = ["summary", "overview", "current state"];
const FINDING_KEYWORDS: [&str; 2] = ["finding", "key point"];

/// Split a completion into named sections.
///
/// Header rules, first match wins (case-insensitive, on the trimmed line):
/// 1. "summary" / "overview" / "current state", and the line starts with `#`
///    or ends with `:`
/// 2. "finding" / "key point"
/// 3. "cost" and "insight"
/// 4. "recommend"
/// 5. "risk"
///
/// Rules 2-5 are skipped for bulleted or numbered items that are not shaped
/// like a heading, and for plain sentences that only repeat the keyword of the
/// section already open. So "- Reduce risk" and "1. Lower the risk" under
/// Recommendations and "Low risk." under Risk stay content, while
/// "2. Key Findings:" still opens a section.
///
/// A section that recurs overwrites its earlier value. Lines before the first
/// header are dropped. If no summary was found the whole input is the summary.
pub fn parse(raw: &str) -> ParsedAnalysis {
    let mut result = ParsedAnalysis {
        raw_response: raw.to_string(),
        ..Default::default()
    };

    let mut current: Option<Section> = None;
    let mut content: Vec<&str> = Vec::new();

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match section_header(trimmed, current) {
            Some(next) => {
                save_section(&mut result, current, &content);
                current = Some(next);
                content.clear();
            }
            None => content.push(trimmed),
        }
    }
    save_section(&mut result, current, &content);

    if result.summary.is_empty() {
        result.summary = raw.to_string();
    }

    result
}

/// Extract optimization suggestions from a completion.
///
/// Decodes the text between the first `[` and the last `]` as a JSON array.
/// Anything else yields one suggestion carrying the whole reply.
pub fn parse_optimizations(raw: &str) -> Vec<OptimizationSuggestion> {
    let decoded = json_array_slice(raw).and_then(|json| {
        serde_json::from_str::<Vec<OptimizationSuggestion>>(json)
            .inspect_err(|e| tracing::debug!(error = %e, "optimization array did not decode"))
            .ok()
    });

    decoded.unwrap_or_else(|| vec![OptimizationSuggestion::from_text(raw)])
}

fn json_array_slice(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    (start < end).then(|| &raw[start..=end])
}

fn section_header(line: &str, current: Option<Section>) -> Option<Section> {
    let lower = line.to_lowercase();
    let section = classify(line, &lower)?;

    if section == Section::Summary {
        return Some(section);
    }
    if is_list_item(line) && !is_heading(line) {
        return None;
    }
    if current == Some(section) && !is_heading(line) {
        return None;
    }
    Some(section)
}

fn classify(line: &str, lower: &str) -> Option<Section> {
    if SUMMARY_KEYWORDS.iter().any(|k| lower.contains(k))
        && (line.starts_with('#') || line.ends_with(':'))
    {
        Some(Section::Summary)
    } else if FINDING_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Some(Section::Findings)
    } else if lower.contains("cost") && lower.contains("insight") {
        Some(Section::Costs)
    } else if lower.contains("recommend") {
        Some(Section::Recommendations)
    } else if lower.contains("risk") {
        Some(Section::Risk)
    } else {
        None
    }
}

/// `- item`, `• item`, `* item`
fn is_bullet(line: &str) -> bool {
    let mut chars = line.chars();
    matches!(chars.next(), Some('-' | '•' | '*')) && chars.next().is_some_and(char::is_whitespace)
}

/// A bullet, or a line starting with a digit (`1. item`)
fn is_list_item(line: &str) -> bool {
    is_bullet(line) || line.starts_with(|c: char| c.is_ascii_digit())
}

/// `# Risk`, `Risk:`, `**Risk:**`, `**Risk**`
fn is_heading(line: &str) -> bool {
    line.starts_with('#')
        || line.trim_end_matches('*').trim_end().ends_with(':')
        || (line.len() > 4 && line.starts_with("**") && line.ends_with("**"))
}

fn save_section(result: &mut ParsedAnalysis, section: Option<Section>, content: &[&str]) {
    if content.is_empty() {
        return;
    }

    match section {
        Some(Section::Summary) => result.summary = content.join("\n"),
        Some(Section::Findings) => result.key_findings = list_items(content),
        Some(Section::Costs) => result.cost_insights = list_items(content),
        Some(Section::Recommendations) => result.recommendations = list_items(content),
        Some(Section::Risk) => result.risk_assessment = Some(content.join("\n")),
        None => {}
    }
}

/// Bulleted or numbered lines with the bullet marker stripped.
fn list_items(content: &[&str]) -> Vec<String> {
    content
        .iter()
        .filter(|line| {
            line.starts_with(['-', '•', '*']) || line.starts_with(|c: char| c.is_ascii_digit())
        })
        .map(|line| {
            line.trim_start_matches(|c: char| matches!(c, '-' | '•' | '*') || c.is_whitespace())
                .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;

    #[test]
    fn test_summary_findings_and_risk() {
        let raw = "Summary:\nAll normal.\nFindings:\n- A\n- B\nRisk:\nLow risk.";
        let parsed = parse(raw);

        assert_eq!(parsed.summary, "All normal.");
        assert_eq!(parsed.key_findings, vec!["A", "B"]);
        assert_eq!(parsed.risk_assessment.as_deref(), Some("Low risk."));
        assert_eq!(parsed.raw_response, raw);
    }

    #[test]
    fn test_prose_without_headers_becomes_summary() {
        let raw = "Just some prose with no headers at all.";
        let parsed = parse(raw);

        assert_eq!(parsed.summary, raw);
        assert!(parsed.key_findings.is_empty());
        assert!(parsed.cost_insights.is_empty());
        assert!(parsed.recommendations.is_empty());
        assert!(parsed.risk_assessment.is_none());
        assert_eq!(parsed.raw_response, raw);
    }

    #[test]
    fn test_empty_input() {
        let parsed = parse("");
        assert_eq!(parsed.summary, "");
        assert_eq!(parsed.raw_response, "");
    }

    #[test]
    fn test_recommendation_bullets_keep_order_and_lose_markers() {
        let raw = "Recommendations:\n- Enable gzip\n•   Move cache to same AZ\n* Reduce risk of egress\nnot a bullet";
        let parsed = parse(raw);

        assert_eq!(
            parsed.recommendations,
            vec![
                "Enable gzip",
                "Move cache to same AZ",
                "Reduce risk of egress"
            ]
        );
        assert!(parsed.risk_assessment.is_none());
        assert_eq!(parsed.summary, raw);
    }

    #[test]
    fn test_numbered_items_keep_their_number() {
        let parsed = parse("## Recommendations\n1. First\n2. Second\n10. Tenth");
        assert_eq!(parsed.recommendations, vec!["1. First", "2. Second", "10. Tenth"]);
    }

    #[test]
    fn test_numbered_item_with_keyword_stays_in_section() {
        let parsed = parse(
            "Summary:\nok\n## Recommendations\n1. Lower the risk of cross-AZ spend\n2. Enable gzip\n3. Pin replicas",
        );
        assert_eq!(
            parsed.recommendations,
            vec![
                "1. Lower the risk of cross-AZ spend",
                "2. Enable gzip",
                "3. Pin replicas"
            ]
        );
        assert!(parsed.risk_assessment.is_none());
    }

    #[test]
    fn test_numbered_heading_still_switches_section() {
        let parsed = parse("1. Summary:\nok\n2. Key Findings:\n- a\n3. Recommendations:\n- b");
        assert_eq!(parsed.summary, "ok");
        assert_eq!(parsed.key_findings, vec!["a"]);
        assert_eq!(parsed.recommendations, vec!["b"]);
    }

    #[test]
    fn test_current_state_and_key_points_keywords() {
        let parsed = parse("## Current State\nQuiet week.\nKey points:\n- egress flat");
        assert_eq!(parsed.summary, "Quiet week.");
        assert_eq!(parsed.key_findings, vec!["egress flat"]);
    }

    #[test]
    fn test_markdown_headings() {
        let raw = "\
# Overview
Traffic is stable.
Egress is up slightly.

## Key Findings
- payments → stripe dominates egress
- cross-AZ chatter between cache and api

## Cost Insights
- $40/day cross-AZ

## Recommendations
1. Pin cache replicas per AZ

## Risk Assessment
Medium: unexpected external endpoint.";
        let parsed = parse(raw);

        assert_eq!(parsed.summary, "Traffic is stable.\nEgress is up slightly.");
        assert_eq!(parsed.key_findings.len(), 2);
        assert_eq!(parsed.cost_insights, vec!["$40/day cross-AZ"]);
        assert_eq!(parsed.recommendations, vec!["1. Pin cache replicas per AZ"]);
        assert_eq!(
            parsed.risk_assessment.as_deref(),
            Some("Medium: unexpected external endpoint.")
        );
    }

    #[test]
    fn test_header_text_is_not_content() {
        let parsed = parse("Summary:\nbody");
        assert_eq!(parsed.summary, "body");
    }

    #[test]
    fn test_summary_keyword_needs_heading_shape() {
        // no leading '#' and no trailing ':'
        let parsed = parse("In summary things are fine\nFindings:\n- x");
        assert_eq!(parsed.key_findings, vec!["x"]);
        assert_eq!(parsed.summary, "In summary things are fine\nFindings:\n- x");
    }

    #[test]
    fn test_lines_before_first_header_are_dropped() {
        let parsed = parse("Preamble text\nSummary:\nActual summary");
        assert_eq!(parsed.summary, "Actual summary");
    }

    #[test]
    fn test_priority_summary_before_findings() {
        let parsed = parse("Summary of findings:\nAll good.");
        assert_eq!(parsed.summary, "All good.");
        assert!(parsed.key_findings.is_empty());
    }

    #[test]
    fn test_priority_findings_before_risk() {
        let parsed = parse("Risk findings:\n- exfiltration");
        assert_eq!(parsed.key_findings, vec!["exfiltration"]);
        assert!(parsed.risk_assessment.is_none());
    }

    #[test]
    fn test_cost_needs_insight() {
        let parsed = parse("Cost insights:\n- a\nCost breakdown:\n- b");
        // "Cost breakdown:" is neither header nor list item
        assert_eq!(parsed.cost_insights, vec!["a", "b"]);
    }

    #[test]
    fn test_last_occurrence_wins() {
        let parsed = parse("Findings:\n- first\nRisk:\nhigh\nFindings:\n- second");
        assert_eq!(parsed.key_findings, vec!["second"]);
        assert_eq!(parsed.risk_assessment.as_deref(), Some("high"));
    }

    #[test]
    fn test_empty_section_does_not_erase_previous() {
        let parsed = parse("Findings:\n- kept\nKey points:\n");
        assert_eq!(parsed.key_findings, vec!["kept"]);
    }

    #[test]
    fn test_section_without_bullets_is_empty_list() {
        let parsed = parse("Summary:\nok\nRecommendations:\nNothing to do right now.");
        assert_eq!(parsed.summary, "ok");
        assert!(parsed.recommendations.is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let parsed = parse("Summary:\r\nfine\r\nFindings:\r\n- a\r\n");
        assert_eq!(parsed.summary, "fine");
        assert_eq!(parsed.key_findings, vec!["a"]);
    }

    #[test]
    fn test_parse_optimizations_embedded_array() {
        let raw = "Here are some: [{\"description\":\"Enable compression\",\"estimated_monthly_savings_usd\":120,\"difficulty\":\"low\"}]";
        let suggestions = parse_optimizations(raw);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].description, "Enable compression");
        assert_eq!(suggestions[0].estimated_monthly_savings_usd, 120.0);
        assert_eq!(suggestions[0].difficulty, Difficulty::Low);
        assert!(suggestions[0].steps.is_empty());
        assert!(suggestions[0].affected_services.is_empty());
    }

    #[test]
    fn test_parse_optimizations_keeps_order_and_lists() {
        let raw = r#"```json
[
  {"description": "a", "estimated_monthly_savings_usd": 1.5, "difficulty": "high",
   "steps": ["s1", "s2"], "affected_services": ["api"]},
  {"description": "b", "estimated_monthly_savings_usd": 0, "difficulty": "medium"}
]
```"#;
        let suggestions = parse_optimizations(raw);

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].description, "a");
        assert_eq!(suggestions[0].steps, vec!["s1", "s2"]);
        assert_eq!(suggestions[0].affected_services, vec!["api"]);
        assert_eq!(suggestions[1].description, "b");
    }

    #[test]
    fn test_parse_optimizations_empty_array() {
        assert!(parse_optimizations("No suggestions: []").is_empty());
    }

    #[test]
    fn test_parse_optimizations_fallbacks() {
        for raw in [
            "no brackets here",
            "backwards ] then [",
            "[not json]",
            r#"[{"description": "missing savings", "difficulty": "low"}]"#,
            r#"[{"description": "x", "estimated_monthly_savings_usd": 1, "difficulty": "extreme"}]"#,
            r#"[{"description": "x", "estimated_monthly_savings_usd": "lots", "difficulty": "low"}]"#,
        ] {
            let suggestions = parse_optimizations(raw);
            assert_eq!(suggestions.len(), 1, "input: {raw}");
            assert_eq!(suggestions[0].description, raw);
            assert_eq!(suggestions[0].estimated_monthly_savings_usd, 0.0);
            assert_eq!(suggestions[0].difficulty, Difficulty::Medium);
            assert!(suggestions[0].steps.is_empty());
        }
    }

    #[test]
    fn test_parse_optimizations_accepts_capitalised_difficulty() {
        let raw = r#"[{"description": "a", "estimated_monthly_savings_usd": 5, "difficulty": "Low"},
                      {"description": "b", "estimated_monthly_savings_usd": 6, "difficulty": "HIGH"}]"#;
        let suggestions = parse_optimizations(raw);
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].difficulty, Difficulty::Low);
        assert_eq!(suggestions[1].difficulty, Difficulty::High);
    }

    #[test]
    fn test_one_bad_item_fails_the_whole_array() {
        let raw = r#"[{"description": "ok", "estimated_monthly_savings_usd": 1, "difficulty": "low"}, {"oops": true}]"#;
        let suggestions = parse_optimizations(raw);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].description, raw);
    }
}
