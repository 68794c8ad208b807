use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchState {
    #[default]
    Initial,
    Loading,
    Error,
    Results,
    /// Earlier results are still shown while another fetch is in flight.
    ResultsLoading,
    NoResults,
    NoMoreResults,
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SearchState::Initial => "INITIAL",
            SearchState::Loading => "LOADING",
            SearchState::Error => "ERROR",
            SearchState::Results => "RESULTS",
            SearchState::ResultsLoading => "RESULTS_LOADING",
            SearchState::NoResults => "NO_RESULTS",
            SearchState::NoMoreResults => "NO_MORE_RESULTS",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchSignals {
    pub error: bool,
    pub loading: bool,
    pub is_new_search: bool,
    /// Number of results left after client-side filtering.
    pub visible_results: usize,
    pub data_loaded: bool,
    pub is_exhausted: bool,
    /// Whether a search was explicitly submitted, even with empty text.
    pub query_submitted: bool,
}

/// Derives the UI state from the search signals. Rules are checked in order
/// and the first match wins.
pub fn derive_search_state(signals: &SearchSignals) -> SearchState {
    let has_results = signals.visible_results > 0;

    if signals.error {
        SearchState::Error
    } else if (!has_results || signals.is_new_search) && signals.loading {
        SearchState::Loading
    } else if !has_results && signals.query_submitted {
        SearchState::NoResults
    } else if has_results && (!signals.data_loaded || signals.loading) {
        SearchState::ResultsLoading
    } else if signals.is_exhausted {
        SearchState::NoMoreResults
    } else if has_results {
        SearchState::Results
    } else {
        SearchState::Initial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settled(visible_results: usize) -> SearchSignals {
        SearchSignals {
            visible_results,
            data_loaded: true,
            query_submitted: true,
            ..SearchSignals::default()
        }
    }

    #[test]
    fn nothing_submitted_is_initial() {
        assert_eq!(derive_search_state(&SearchSignals::default()), SearchState::Initial);
    }

    #[test]
    fn error_outranks_loading_with_results() {
        let signals = SearchSignals {
            error: true,
            loading: true,
            ..settled(4)
        };
        assert_eq!(derive_search_state(&signals), SearchState::Error);
    }

    #[test]
    fn new_search_loading_hides_previous_results() {
        let signals = SearchSignals {
            loading: true,
            is_new_search: true,
            data_loaded: false,
            ..settled(4)
        };
        assert_eq!(derive_search_state(&signals), SearchState::Loading);
    }

    #[test]
    fn next_page_loading_keeps_results_visible() {
        let signals = SearchSignals {
            loading: true,
            data_loaded: false,
            ..settled(10)
        };
        assert_eq!(derive_search_state(&signals), SearchState::ResultsLoading);

        let not_yet_loaded = SearchSignals {
            data_loaded: false,
            ..settled(10)
        };
        assert_eq!(derive_search_state(&not_yet_loaded), SearchState::ResultsLoading);
    }

    #[test]
    fn submitted_empty_search_without_results() {
        assert_eq!(derive_search_state(&settled(0)), SearchState::NoResults);

        let unsubmitted = SearchSignals {
            query_submitted: false,
            ..settled(0)
        };
        assert_eq!(derive_search_state(&unsubmitted), SearchState::Initial);
    }

    #[test]
    fn exhaustion_only_applies_once_results_settle() {
        let signals = SearchSignals {
            is_exhausted: true,
            ..settled(3)
        };
        assert_eq!(derive_search_state(&signals), SearchState::NoMoreResults);
        assert_eq!(derive_search_state(&settled(10)), SearchState::Results);
    }

    #[test]
    fn display_uses_screaming_case() {
        assert_eq!(SearchState::ResultsLoading.to_string(), "RESULTS_LOADING");
        assert_eq!(SearchState::NoMoreResults.to_string(), "NO_MORE_RESULTS");
    }
}
