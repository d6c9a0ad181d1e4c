//! Response sanitizer — strips known conversational preambles from a
//! refinement reply before it overwrites the displayed ad.
//!
//! This is a heuristic, not a parser. The preamble list is finite and
//! hand-maintained; unknown phrasings pass through unstripped. That is a
//! known boundary of the approach, not a bug — do not grow the list by
//! guessing.

/// Known conversational preambles, ordered longest/most-specific first so a
/// longer phrase is tried before any shorter phrase it contains.
const PREAMBLES: &[&str] = &[
    "Okay, here's the revised job ad incorporating your changes:",
    "Alright, I've updated the job ad as requested. Here it is:",
    "Okay, here's a revised job ad incorporating",
    "Okay, here's the revised job ad:",
    "Sure, here is the updated version:",
    "Here's the updated job advertisement:",
    "Okay, I've updated the ad:",
    "Here's the revised ad:",
    "Here it is:",
];

/// Opening markers a job advertisement is expected to start with. A stripped
/// remainder that does not begin with one of these is rejected and the next
/// preamble is tried instead.
const AD_HEADINGS: &[&str] = &[
    "**job title:**",
    "job title:",
    "**position title:**",
    "position title:",
];

/// Strips a known conversational preamble from `raw`, returning the ad body,
/// or the trimmed original when no preamble matches (or none of the stripped
/// remainders looks like an ad).
pub fn sanitize(raw: &str) -> &str {
    let trimmed = raw.trim();
    for preamble in PREAMBLES {
        if starts_with_ignore_ascii_case(trimmed, preamble) {
            let remainder = trimmed[preamble.len()..].trim_start();
            if !remainder.is_empty()
                && AD_HEADINGS
                    .iter()
                    .any(|h| starts_with_ignore_ascii_case(remainder, h))
            {
                return remainder;
            }
        }
    }
    trimmed
}

/// ASCII-case-insensitive prefix check. `prefix` must be pure ASCII, which
/// also guarantees the matched boundary is a valid char boundary in `s`.
fn starts_with_ignore_ascii_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const AD_BODY: &str = "**Job Title:** Backend Engineer\n**Company:** Acme";

    #[test]
    fn test_strips_preamble_before_ad_heading() {
        let raw = format!("Here's the revised ad:\n\n{AD_BODY}");
        assert_eq!(sanitize(&raw), AD_BODY);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let raw = format!("HERE IT IS:\n{AD_BODY}");
        assert_eq!(sanitize(&raw), AD_BODY);
    }

    #[test]
    fn test_longest_preamble_applied_without_dangling_fragment() {
        let raw = format!(
            "Okay, here's the revised job ad incorporating your changes:\n\n{AD_BODY}"
        );
        let out = sanitize(&raw);
        assert_eq!(out, AD_BODY);
        assert!(!out.contains("incorporating your changes"));
    }

    #[test]
    fn test_heading_guard_rejects_non_ad_remainder() {
        let raw = "Here it is: a limerick about borrow checkers.";
        assert_eq!(sanitize(raw), raw);
    }

    #[test]
    fn test_unknown_preamble_passes_through() {
        let raw = format!("Behold my masterpiece:\n{AD_BODY}");
        assert_eq!(sanitize(&raw), raw.trim());
    }

    #[test]
    fn test_no_preamble_returns_trimmed_original() {
        let raw = format!("  {AD_BODY}\n\n");
        assert_eq!(sanitize(&raw), AD_BODY);
    }

    #[test]
    fn test_plain_heading_variant_accepted() {
        let raw = "Okay, I've updated the ad: Position Title: Staff Engineer";
        assert_eq!(sanitize(raw), "Position Title: Staff Engineer");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            format!("Here's the revised ad:\n{AD_BODY}"),
            "Here it is: a poem".to_string(),
            AD_BODY.to_string(),
            "   plain text   ".to_string(),
            String::new(),
        ];
        for input in &inputs {
            let once = sanitize(input).to_string();
            assert_eq!(sanitize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_preamble_only_reply_unchanged() {
        // Nothing after the preamble: guard cannot pass, original returned.
        assert_eq!(sanitize("Here it is:"), "Here it is:");
    }

    #[test]
    fn test_non_ascii_input_does_not_panic() {
        let raw = "📝 voilà — an ad";
        assert_eq!(sanitize(raw), raw);
    }
}
