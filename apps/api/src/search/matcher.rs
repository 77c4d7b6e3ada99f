//! Query relevance for board listings that come back unfiltered.
//!
//! Every meaningful query token must appear in the title or extra text.
//! A token found in the title is worth 2, one found only in the extra text
//! is worth 1. Zero means no match.

const STOPWORDS: &[&str] = &[
    // articles, prepositions, conjunctions
    "a", "an", "the", "and", "or", "nor", "but", "of", "in", "on", "at", "to", "for", "with",
    "by", "from", "as", "into", "about", "via", "per", "vs",
    // job-search filler that rarely appears verbatim in titles
    "senior", "sr", "junior", "jr", "mid", "level", "job", "jobs", "role", "roles", "position",
    "positions", "opening", "openings", "hiring", "remote",
];

/// Lower-cased query tokens with stopwords and single characters removed.
pub fn query_tokens(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() > 1 && !STOPWORDS.contains(&token.as_str()))
        .collect()
}

pub fn score(query: &str, title: &str, extra_text: &str) -> u32 {
    let tokens = query_tokens(query);
    if tokens.is_empty() {
        return 1;
    }

    let title = title.to_lowercase();
    let combined = format!("{title} {}", extra_text.to_lowercase());

    let mut total = 0;
    for token in &tokens {
        if title.contains(token.as_str()) {
            total += 2;
        } else if combined.contains(token.as_str()) {
            total += 1;
        } else {
            return 0;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seniority_filler_does_not_block_match() {
        assert!(score("senior backend engineer", "Backend Engineer", "") > 0);
    }

    #[test]
    fn test_missing_token_is_zero() {
        assert_eq!(score("blockchain", "Backend Engineer", ""), 0);
        assert_eq!(score("backend kotlin", "Backend Engineer", "Go and Rust"), 0);
    }

    #[test]
    fn test_title_hits_weigh_double() {
        assert_eq!(score("backend rust", "Backend Engineer", "We write Rust"), 3);
        assert_eq!(score("backend rust", "Rust Backend Engineer", ""), 4);
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert_eq!(score("", "Anything", ""), 1);
        assert_eq!(score("the a of", "Anything", ""), 1);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(score("PLATFORM", "platform engineer", ""), 2);
    }

    #[test]
    fn test_query_tokens_filters() {
        assert_eq!(
            query_tokens("Staff Engineer for the C Platform"),
            vec!["staff".to_string(), "engineer".to_string(), "platform".to_string()]
        );
    }
}
