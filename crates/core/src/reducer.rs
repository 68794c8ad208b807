//! Search state as a plain value plus the transition function over it.
//!
//! Every trigger bumps a generation counter. A fetch is pending while the
//! current generation has not settled, and a completed fetch only touches the
//! results when its ticket still belongs to the current generation and query
//! descriptor. Late responses for superseded searches are dropped here.

use crate::filter::apply_location_filter;
use crate::models::{
    GenericResultItem, PaginationCursor, QueryDescriptor, SearchFilters, RESULTS_PER_PAGE,
};
use crate::params::QueryParamStore;
use crate::state::{derive_search_state, SearchSignals, SearchState};
use tracing::debug;
use uuid::Uuid;

/// Identifies one issued fetch and what it was issued for.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub id: Uuid,
    pub generation: u64,
    pub descriptor: QueryDescriptor,
    /// Captured when the fetch is issued; decides replace versus append.
    pub is_new_search: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Items(Vec<GenericResultItem>),
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchCompleted {
    pub ticket: FetchTicket,
    pub outcome: FetchOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    NewSearch { query: String, force: bool },
    NextBatch,
    FiltersChanged(SearchFilters),
    FetchStarted(FetchTicket),
    FetchCompleted(FetchCompleted),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    params: QueryParamStore,
    cursor: PaginationCursor,
    page_size: usize,
    skip: bool,
    unfiltered_results: Vec<GenericResultItem>,
    search_results: Vec<GenericResultItem>,
    search_state: SearchState,
    loading: bool,
    error: bool,
    data_loaded: bool,
    generation: u64,
    settled_generation: Option<u64>,
    in_flight: Option<FetchTicket>,
}

impl Default for SearchSnapshot {
    fn default() -> Self {
        Self::new(QueryParamStore::default(), RESULTS_PER_PAGE, false)
    }
}

impl SearchSnapshot {
    pub fn new(params: QueryParamStore, page_size: usize, skip: bool) -> Self {
        let mut snapshot = Self {
            params,
            cursor: PaginationCursor::default(),
            page_size: page_size.max(1),
            skip,
            unfiltered_results: Vec::new(),
            search_results: Vec::new(),
            search_state: SearchState::Initial,
            loading: false,
            error: false,
            data_loaded: false,
            generation: 0,
            settled_generation: None,
            in_flight: None,
        };
        snapshot.refresh();
        snapshot
    }

    pub fn params(&self) -> &QueryParamStore {
        &self.params
    }

    pub fn cursor(&self) -> PaginationCursor {
        self.cursor
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn search_state(&self) -> SearchState {
        self.search_state
    }

    pub fn search_results(&self) -> &[GenericResultItem] {
        &self.search_results
    }

    pub fn unfiltered_results(&self) -> &[GenericResultItem] {
        &self.unfiltered_results
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    pub fn in_flight(&self) -> Option<&FetchTicket> {
        self.in_flight.as_ref()
    }

    /// Whether `NewSearch { query, force }` would start a search.
    pub fn accepts_new_search(&self, query: &str, force: bool) -> bool {
        force || self.params.query() != Some(query)
    }

    pub fn current_descriptor(&self) -> QueryDescriptor {
        QueryDescriptor {
            query: self.params.query().unwrap_or_default().to_string(),
            filters: self.params.filters().clone(),
            page: self.cursor.page,
            limit: self.page_size,
        }
    }

    /// The descriptor that still needs fetching, if any.
    pub fn pending_descriptor(&self) -> Option<QueryDescriptor> {
        if self.skip || self.settled_generation == Some(self.generation) {
            return None;
        }
        if self
            .in_flight
            .as_ref()
            .is_some_and(|ticket| ticket.generation == self.generation)
        {
            return None;
        }
        Some(self.current_descriptor())
    }

    pub fn next_ticket(&self) -> Option<FetchTicket> {
        self.pending_descriptor().map(|descriptor| FetchTicket {
            id: Uuid::new_v4(),
            generation: self.generation,
            descriptor,
            is_new_search: self.cursor.is_new_search,
        })
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
            && self.in_flight.as_ref().map(|issued| issued.id) == Some(ticket.id)
            && ticket.descriptor == self.current_descriptor()
    }

    pub fn reduce(mut self, event: SearchEvent) -> Self {
        match event {
            SearchEvent::NewSearch { query, force } => {
                if !self.accepts_new_search(&query, force) {
                    return self;
                }
                self.cursor.restart();
                self.data_loaded = false;
                self.params.commit_query(query);
                self.generation += 1;
            }
            SearchEvent::NextBatch => {
                self.cursor.advance();
                self.data_loaded = false;
                self.generation += 1;
            }
            SearchEvent::FiltersChanged(filters) => {
                if &filters == self.params.filters() {
                    return self;
                }
                self.params.commit_filters(filters);
                self.cursor.restart();
                self.data_loaded = false;
                self.generation += 1;
            }
            SearchEvent::FetchStarted(ticket) => {
                self.in_flight = Some(ticket);
                self.loading = true;
                self.error = false;
            }
            SearchEvent::FetchCompleted(completed) => self.apply_completion(completed),
        }

        self.refresh();
        self
    }

    fn apply_completion(&mut self, completed: FetchCompleted) {
        let FetchCompleted { ticket, outcome } = completed;
        let was_in_flight = self.in_flight.as_ref().map(|issued| issued.id) == Some(ticket.id);

        if !self.is_current(&ticket) {
            debug!(
                request_id = %ticket.id,
                generation = ticket.generation,
                current_generation = self.generation,
                "discarding stale search response"
            );
            if was_in_flight {
                self.in_flight = None;
                self.loading = false;
            }
            return;
        }

        self.in_flight = None;
        self.loading = false;
        self.settled_generation = Some(ticket.generation);

        match outcome {
            FetchOutcome::Failed => {
                self.error = true;
            }
            FetchOutcome::Items(items) => {
                self.cursor.is_exhausted = items.len() < self.page_size;
                if ticket.is_new_search {
                    self.unfiltered_results = items;
                } else if !items.is_empty() {
                    self.unfiltered_results.extend(items);
                }
                self.data_loaded = true;
            }
        }
    }

    fn refresh(&mut self) {
        self.search_results =
            apply_location_filter(&self.unfiltered_results, self.params.filters().active_locations());

        let next_state = derive_search_state(&SearchSignals {
            error: self.error,
            loading: self.loading,
            is_new_search: self.cursor.is_new_search,
            visible_results: self.search_results.len(),
            data_loaded: self.data_loaded,
            is_exhausted: self.cursor.is_exhausted,
            query_submitted: self.params.query().is_some(),
        });

        if next_state != self.search_state {
            debug!(from = %self.search_state, to = %next_state, "search state changed");
            self.search_state = next_state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::job;

    fn jobs(prefix: &str, count: usize) -> Vec<GenericResultItem> {
        (0..count)
            .map(|index| job(&format!("{prefix}-{index}"), "NYC"))
            .collect()
    }

    fn start(snapshot: SearchSnapshot) -> (SearchSnapshot, FetchTicket) {
        let ticket = snapshot.next_ticket().expect("a fetch should be pending");
        let snapshot = snapshot.reduce(SearchEvent::FetchStarted(ticket.clone()));
        (snapshot, ticket)
    }

    fn complete(snapshot: SearchSnapshot, ticket: FetchTicket, items: Vec<GenericResultItem>) -> SearchSnapshot {
        snapshot.reduce(SearchEvent::FetchCompleted(FetchCompleted {
            ticket,
            outcome: FetchOutcome::Items(items),
        }))
    }

    fn searched(query: &str, page_items: usize) -> SearchSnapshot {
        let snapshot = SearchSnapshot::new(QueryParamStore::new(), 10, false).reduce(SearchEvent::NewSearch {
            query: query.to_string(),
            force: false,
        });
        let (snapshot, ticket) = start(snapshot);
        complete(snapshot, ticket, jobs(query, page_items))
    }

    #[test]
    fn unchanged_query_without_force_is_a_no_op() {
        let snapshot = searched("rust", 10);
        let again = snapshot.clone().reduce(SearchEvent::NewSearch {
            query: "rust".to_string(),
            force: false,
        });
        assert_eq!(again, snapshot);
        assert!(again.pending_descriptor().is_none());
    }

    #[test]
    fn forced_search_restarts_pagination() {
        let snapshot = searched("rust", 10).reduce(SearchEvent::NextBatch);
        assert_eq!(snapshot.cursor().page, 2);

        let forced = snapshot.reduce(SearchEvent::NewSearch {
            query: "rust".to_string(),
            force: true,
        });
        assert_eq!(forced.cursor().page, 1);
        assert!(forced.cursor().is_new_search);
        assert_eq!(forced.current_descriptor().offset(), 0);
        assert!(forced.pending_descriptor().is_some());
    }

    #[test]
    fn loading_new_search_reports_loading() {
        let snapshot = SearchSnapshot::default().reduce(SearchEvent::NewSearch {
            query: "data".to_string(),
            force: false,
        });
        let (snapshot, _) = start(snapshot);
        assert_eq!(snapshot.search_state(), SearchState::Loading);
    }

    #[test]
    fn full_page_keeps_results_open() {
        let snapshot = searched("rust", 10);
        assert!(!snapshot.cursor().is_exhausted);
        assert_eq!(snapshot.search_state(), SearchState::Results);
        assert!(snapshot.pending_descriptor().is_none());
    }

    #[test]
    fn short_page_marks_exhaustion() {
        let snapshot = searched("rust", 3);
        assert!(snapshot.cursor().is_exhausted);
        assert_eq!(snapshot.search_state(), SearchState::NoMoreResults);
    }

    #[test]
    fn empty_first_page_is_no_results() {
        let snapshot = searched("cobol", 0);
        assert!(snapshot.cursor().is_exhausted);
        assert_eq!(snapshot.search_state(), SearchState::NoResults);
    }

    #[test]
    fn next_batch_appends_after_existing_results() {
        let snapshot = searched("rust", 10).reduce(SearchEvent::NextBatch);
        assert_eq!(snapshot.search_state(), SearchState::ResultsLoading);
        assert_eq!(snapshot.current_descriptor().offset(), 10);

        let (snapshot, ticket) = start(snapshot);
        assert!(!ticket.is_new_search);
        let snapshot = complete(snapshot, ticket, jobs("page2", 4));

        let headings: Vec<_> = snapshot
            .unfiltered_results()
            .iter()
            .map(|item| item.heading().to_string())
            .collect();
        assert_eq!(headings.len(), 14);
        assert_eq!(headings[0], "Job rust-0");
        assert_eq!(headings[10], "Job page2-0");
        assert_eq!(snapshot.search_state(), SearchState::NoMoreResults);
    }

    #[test]
    fn empty_next_page_keeps_results_and_exhausts() {
        let snapshot = searched("rust", 10).reduce(SearchEvent::NextBatch);
        let (snapshot, ticket) = start(snapshot);
        let snapshot = complete(snapshot, ticket, Vec::new());

        assert_eq!(snapshot.unfiltered_results().len(), 10);
        assert!(snapshot.cursor().is_exhausted);
        assert_eq!(snapshot.search_state(), SearchState::NoMoreResults);
    }

    #[test]
    fn new_search_replaces_previous_results() {
        let snapshot = searched("rust", 10).reduce(SearchEvent::NewSearch {
            query: "go".to_string(),
            force: false,
        });
        let (snapshot, ticket) = start(snapshot);
        assert_eq!(snapshot.search_state(), SearchState::Loading);

        let snapshot = complete(snapshot, ticket, jobs("go", 2));
        assert_eq!(snapshot.unfiltered_results().len(), 2);
        assert_eq!(snapshot.search_results()[0].heading(), "Job go-0");
    }

    #[test]
    fn late_response_for_superseded_search_is_dropped() {
        let snapshot = SearchSnapshot::default().reduce(SearchEvent::NewSearch {
            query: "old".to_string(),
            force: false,
        });
        let (snapshot, old_ticket) = start(snapshot);

        let snapshot = snapshot.reduce(SearchEvent::NewSearch {
            query: "new".to_string(),
            force: false,
        });
        let (snapshot, new_ticket) = start(snapshot);

        let snapshot = complete(snapshot, new_ticket, jobs("new", 10));
        let snapshot = complete(snapshot, old_ticket, jobs("old", 10));

        assert_eq!(snapshot.unfiltered_results().len(), 10);
        assert!(snapshot
            .unfiltered_results()
            .iter()
            .all(|item| item.heading().starts_with("Job new")));
        assert_eq!(snapshot.search_state(), SearchState::Results);
    }

    #[test]
    fn stale_response_before_replacement_fetch_starts_is_dropped() {
        let snapshot = searched("rust", 10).reduce(SearchEvent::NextBatch);
        let (snapshot, page_two) = start(snapshot);

        let snapshot = snapshot.reduce(SearchEvent::NewSearch {
            query: "go".to_string(),
            force: false,
        });
        let snapshot = complete(snapshot, page_two, jobs("rust-late", 10));

        assert_eq!(snapshot.unfiltered_results().len(), 10);
        assert!(!snapshot.is_loading());
        assert!(snapshot.pending_descriptor().is_some());
    }

    #[test]
    fn failure_sets_error_without_retrying() {
        let snapshot = SearchSnapshot::default().reduce(SearchEvent::NewSearch {
            query: "rust".to_string(),
            force: false,
        });
        let (snapshot, ticket) = start(snapshot);
        let snapshot = snapshot.reduce(SearchEvent::FetchCompleted(FetchCompleted {
            ticket,
            outcome: FetchOutcome::Failed,
        }));

        assert_eq!(snapshot.search_state(), SearchState::Error);
        assert!(snapshot.pending_descriptor().is_none());

        let retried = snapshot.reduce(SearchEvent::NewSearch {
            query: "rust".to_string(),
            force: true,
        });
        assert!(retried.pending_descriptor().is_some());
    }

    #[test]
    fn location_filter_change_refilters_and_restarts() {
        let mut items = jobs("nyc", 5);
        items.extend((0..5).map(|index| job(&format!("sf-{index}"), "SF")));
        let snapshot = SearchSnapshot::default().reduce(SearchEvent::NewSearch {
            query: "intern".to_string(),
            force: false,
        });
        let (snapshot, ticket) = start(snapshot);
        let snapshot = complete(snapshot, ticket, items);
        assert_eq!(snapshot.search_results().len(), 10);

        let snapshot = snapshot.reduce(SearchEvent::FiltersChanged(SearchFilters {
            locations: Some(vec!["sf".to_string()]),
            ..SearchFilters::default()
        }));
        assert_eq!(snapshot.search_results().len(), 5);
        assert_eq!(snapshot.unfiltered_results().len(), 10);
        assert_eq!(snapshot.cursor().page, 1);
        assert_eq!(snapshot.search_state(), SearchState::ResultsLoading);
    }

    #[test]
    fn skipped_search_never_fetches() {
        let snapshot = SearchSnapshot::new(QueryParamStore::new(), 10, true).reduce(SearchEvent::NewSearch {
            query: "rust".to_string(),
            force: false,
        });
        assert!(snapshot.next_ticket().is_none());
    }
}
