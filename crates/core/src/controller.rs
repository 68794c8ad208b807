use crate::analytics::AnalyticsEvent;
use crate::config::SearchConfig;
use crate::models::{GenericResultItem, SearchFilters, ValueRange};
use crate::params::QueryParamStore;
use crate::reducer::{FetchCompleted, FetchOutcome, FetchTicket, SearchEvent, SearchSnapshot};
use crate::state::SearchState;
use crate::traits::{AnalyticsSink, FetchRequest, ResultFetcher, ResultTransformer};
use crate::SearchError;
use std::time::Duration;
use tracing::{debug, warn};

/// Paginated search over an injected fetcher and transformer.
///
/// The controller owns the parameter store it was built with. Triggers and
/// filter setters are the only way to change it, and every change goes through
/// [`SearchSnapshot::reduce`].
pub struct SearchController<F, T, A>
where
    F: ResultFetcher,
    T: ResultTransformer<Payload = F::Payload>,
    A: AnalyticsSink,
{
    fetcher: F,
    transformer: T,
    analytics: A,
    snapshot: SearchSnapshot,
    request_timeout: Option<Duration>,
}

impl<F, T, A> SearchController<F, T, A>
where
    F: ResultFetcher,
    T: ResultTransformer<Payload = F::Payload>,
    A: AnalyticsSink,
{
    pub fn new(fetcher: F, transformer: T, analytics: A, params: QueryParamStore, config: &SearchConfig) -> Self {
        Self {
            fetcher,
            transformer,
            analytics,
            snapshot: SearchSnapshot::new(params, config.page_size, config.skip),
            request_timeout: config.request_timeout(),
        }
    }

    pub fn search_state(&self) -> SearchState {
        self.snapshot.search_state()
    }

    pub fn search_results(&self) -> &[GenericResultItem] {
        self.snapshot.search_results()
    }

    pub fn unfiltered_results(&self) -> &[GenericResultItem] {
        self.snapshot.unfiltered_results()
    }

    pub fn params(&self) -> &QueryParamStore {
        self.snapshot.params()
    }

    pub fn snapshot(&self) -> &SearchSnapshot {
        &self.snapshot
    }

    pub fn trigger_new_search(&mut self, query: &str, force: bool) {
        if !self.snapshot.accepts_new_search(query, force) {
            debug!(query, "search query unchanged, ignoring trigger");
            return;
        }

        self.analytics.emit(AnalyticsEvent::search_started(query));
        self.dispatch(SearchEvent::NewSearch {
            query: query.to_string(),
            force,
        });
    }

    /// Requests the next page. Callers are expected to check for
    /// [`SearchState::NoMoreResults`] first.
    pub fn trigger_next_batch(&mut self) {
        self.analytics.emit(AnalyticsEvent::next_batch_requested());
        self.dispatch(SearchEvent::NextBatch);
    }

    pub fn set_location_filter(&mut self, locations: Option<Vec<String>>) {
        let filters = SearchFilters {
            locations,
            ..self.params().filters().clone()
        };
        self.dispatch(SearchEvent::FiltersChanged(filters));
    }

    pub fn set_salary_filter(&mut self, salary: Option<ValueRange<u32>>) {
        let filters = SearchFilters {
            salary,
            ..self.params().filters().clone()
        };
        self.dispatch(SearchEvent::FiltersChanged(filters));
    }

    pub fn set_rating_filter(&mut self, rating: Option<ValueRange<f64>>) {
        let filters = SearchFilters {
            rating,
            ..self.params().filters().clone()
        };
        self.dispatch(SearchEvent::FiltersChanged(filters));
    }

    /// Issues a ticket for the pending page, if there is one, and marks it in
    /// flight.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        let ticket = self.snapshot.next_ticket()?;
        self.dispatch(SearchEvent::FetchStarted(ticket.clone()));
        Some(ticket)
    }

    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<F::Payload, SearchError>,
    ) -> SearchState {
        let outcome = match result {
            Ok(payload) => FetchOutcome::Items(self.transformer.transform(&payload)),
            Err(error) => {
                warn!(request_id = %ticket.id, %error, "search fetch failed");
                FetchOutcome::Failed
            }
        };

        self.dispatch(SearchEvent::FetchCompleted(FetchCompleted { ticket, outcome }));
        self.search_state()
    }

    /// Fetches the pending page, if any, and folds the response into the
    /// results. Returns the resulting state.
    pub async fn fetch_pending(&mut self) -> SearchState {
        let Some(ticket) = self.begin_fetch() else {
            debug!(state = %self.search_state(), "no search fetch pending");
            return self.search_state();
        };

        let request = FetchRequest {
            request_id: ticket.id,
            descriptor: ticket.descriptor.clone(),
        };
        debug!(
            request_id = %request.request_id,
            query = %request.descriptor.query,
            page = request.descriptor.page,
            "fetching search page"
        );

        let result = match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, self.fetcher.fetch(&request))
                .await
                .unwrap_or(Err(SearchError::Timeout(limit))),
            None => self.fetcher.fetch(&request).await,
        };

        self.complete_fetch(ticket, result)
    }

    fn dispatch(&mut self, event: SearchEvent) {
        let snapshot = std::mem::take(&mut self.snapshot);
        self.snapshot = snapshot.reduce(event);
    }
}
