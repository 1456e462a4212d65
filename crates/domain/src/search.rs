//! Fuzzy multi-term search over picker candidates.
//!
//! A query is split on whitespace into terms. An item matches when every
//! term matches at least one of its search fields. Per field, a term scores:
//!
//! | match                                   | score          |
//! |-----------------------------------------|----------------|
//! | substring starting a word               | 1.0            |
//! | substring inside a word                 | 0.9            |
//! | word prefix within the edit budget      | up to 0.8      |
//!
//! The edit budget is one Damerau-Levenshtein edit per four term
//! characters, so terms shorter than four characters must match exactly.
//! An item's score is the mean of its best per-term scores.

/// Something that can be found by [`SearchIndex`].
pub trait Searchable {
    /// Texts matched against the query terms.
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for String {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.as_str()]
    }
}

impl Searchable for &str {
    fn search_fields(&self) -> Vec<&str> {
        vec![*self]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Terms with fewer characters are ignored.
    pub min_term_length: usize,
    /// Order matches by descending score; otherwise keep input order.
    pub sort_by_score: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            min_term_length: 2,
            sort_by_score: true,
        }
    }
}

/// One matching item.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult<'a, T> {
    pub item: &'a T,
    /// In `(0, 1]`.
    pub score: f64,
    /// Position of the item in the indexed slice.
    pub index: usize,
}

const WORD_START_SCORE: f64 = 1.0;
const INNER_SCORE: f64 = 0.9;
const FUZZY_SCORE: f64 = 0.8;

/// Lowercased search fields of a slice of items.
#[derive(Debug)]
pub struct SearchIndex<'a, T> {
    items: &'a [T],
    fields: Vec<Vec<String>>,
    options: SearchOptions,
}

impl<'a, T: Searchable> SearchIndex<'a, T> {
    #[must_use]
    pub fn new(items: &'a [T]) -> Self {
        Self::with_options(items, SearchOptions::default())
    }

    #[must_use]
    pub fn with_options(items: &'a [T], options: SearchOptions) -> Self {
        let fields = items
            .iter()
            .map(|item| {
                item.search_fields()
                    .into_iter()
                    .filter(|field| !field.is_empty())
                    .map(str::to_lowercase)
                    .collect()
            })
            .collect();
        Self {
            items,
            fields,
            options,
        }
    }

    /// Match every term of `query` against the indexed items.
    ///
    /// Returns `None` when no term is long enough, meaning no filtering
    /// took place; callers should then show every candidate.
    #[must_use]
    pub fn multi_terms_search(&self, query: &str) -> Option<Vec<MatchResult<'a, T>>> {
        let terms: Vec<String> = query
            .split_whitespace()
            .filter(|term| term.chars().count() >= self.options.min_term_length)
            .map(str::to_lowercase)
            .collect();
        if terms.is_empty() {
            return None;
        }

        let mut matches: Vec<MatchResult<'a, T>> = self
            .items
            .iter()
            .zip(&self.fields)
            .enumerate()
            .filter_map(|(index, (item, fields))| {
                let mut total = 0.0;
                for term in &terms {
                    let best = fields
                        .iter()
                        .map(|field| score_field(term, field))
                        .fold(0.0, f64::max);
                    if best <= 0.0 {
                        return None;
                    }
                    total += best;
                }
                #[allow(clippy::cast_precision_loss)]
                let score = total / terms.len() as f64;
                Some(MatchResult { item, score, index })
            })
            .collect();

        if self.options.sort_by_score {
            // Stable, so equal scores keep input order.
            matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        }
        Some(matches)
    }
}

/// Best score of a lowercase `term` against a lowercase `field`, 0 if none.
fn score_field(term: &str, field: &str) -> f64 {
    let mut best: f64 = 0.0;
    for (position, _) in field.match_indices(term) {
        let at_word_start = field[..position]
            .chars()
            .next_back()
            .is_none_or(|previous| !previous.is_alphanumeric());
        if at_word_start {
            return WORD_START_SCORE;
        }
        best = INNER_SCORE;
    }
    if best > 0.0 {
        return best;
    }
    fuzzy_score(term, field)
}

fn fuzzy_score(term: &str, field: &str) -> f64 {
    let length = term.chars().count();
    let budget = length / 4;
    if budget == 0 {
        return 0.0;
    }

    let mut best_distance: Option<usize> = None;
    for word in field.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
        let word_length = word.chars().count();
        for prefix_length in length.saturating_sub(1)..=length + 1 {
            if prefix_length == 0 || prefix_length > word_length {
                continue;
            }
            let prefix = prefix_of(word, prefix_length);
            let distance = strsim::damerau_levenshtein(term, prefix);
            if distance <= budget && best_distance.is_none_or(|best| distance < best) {
                best_distance = Some(distance);
            }
        }
    }

    best_distance.map_or(0.0, |distance| {
        #[allow(clippy::cast_precision_loss)]
        let penalty = distance as f64 / (length + 1) as f64;
        FUZZY_SCORE * (1.0 - penalty)
    })
}

fn prefix_of(word: &str, chars: usize) -> &str {
    word.char_indices()
        .nth(chars)
        .map_or(word, |(end, _)| &word[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOMS: [&str; 4] = ["Living Room", "Kitchen", "Bathroom", "Room Two"];

    #[test]
    fn should_return_none_when_query_is_empty() {
        let index = SearchIndex::new(&ROOMS);
        assert!(index.multi_terms_search("").is_none());
        assert!(index.multi_terms_search("   ").is_none());
    }

    #[test]
    fn should_return_none_when_terms_below_min_length() {
        let index = SearchIndex::new(&ROOMS);
        assert!(index.multi_terms_search("a").is_none());
        assert!(index.multi_terms_search("a b").is_none());
    }

    #[test]
    fn should_match_all_terms_against_same_item() {
        let index = SearchIndex::new(&ROOMS[..2]);
        let matches = index.multi_terms_search("liv ro").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(*matches[0].item, "Living Room");
        assert_eq!(matches[0].index, 0);
    }

    #[test]
    fn should_return_empty_list_when_nothing_matches() {
        let index = SearchIndex::new(&ROOMS);
        assert_eq!(index.multi_terms_search("garage").unwrap(), Vec::new());
    }

    #[test]
    fn should_rank_word_start_above_inner_match() {
        let index = SearchIndex::new(&ROOMS);
        let matches = index.multi_terms_search("room").unwrap();
        let found: Vec<&str> = matches.iter().map(|m| *m.item).collect();
        assert_eq!(found, vec!["Living Room", "Room Two", "Bathroom"]);
        assert!((matches[0].score - 1.0).abs() < f64::EPSILON);
        assert!((matches[2].score - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn should_keep_input_order_when_sorting_disabled() {
        let options = SearchOptions {
            sort_by_score: false,
            ..SearchOptions::default()
        };
        let index = SearchIndex::with_options(&ROOMS, options);
        let matches = index.multi_terms_search("room").unwrap();
        let found: Vec<usize> = matches.iter().map(|m| m.index).collect();
        assert_eq!(found, vec![0, 2, 3]);
    }

    #[test]
    fn should_tolerate_typo_when_term_is_long_enough() {
        let index = SearchIndex::new(&ROOMS);
        let matches = index.multi_terms_search("kitchn").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(*matches[0].item, "Kitchen");
        assert!(matches[0].score > 0.0 && matches[0].score <= FUZZY_SCORE);
    }

    #[test]
    fn should_not_tolerate_typo_in_short_term() {
        let index = SearchIndex::new(&ROOMS);
        assert_eq!(index.multi_terms_search("kit").unwrap().len(), 1);
        assert!(index.multi_terms_search("kut").unwrap().is_empty());
    }

    #[test]
    fn should_match_any_field_of_an_item() {
        struct Area {
            name: &'static str,
            aliases: Vec<&'static str>,
        }

        impl Searchable for Area {
            fn search_fields(&self) -> Vec<&str> {
                let mut fields = vec![self.name];
                fields.extend(self.aliases.iter().copied());
                fields
            }
        }

        let areas = [
            Area {
                name: "Lounge",
                aliases: vec!["Living room"],
            },
            Area {
                name: "Kitchen",
                aliases: Vec::new(),
            },
        ];
        let index = SearchIndex::new(&areas);
        let matches = index.multi_terms_search("lounge living").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].item.name, "Lounge");
    }
}
