pub mod analytics;
pub mod config;
pub mod controller;
pub mod details;
pub mod error;
pub mod filter;
pub mod graphql;
pub mod models;
pub mod params;
pub mod reducer;
pub mod state;
pub mod suggestions;
pub mod traits;
pub mod transform;

pub use analytics::{AnalyticsEvent, NoopAnalytics, TracingAnalytics};
pub use config::SearchConfig;
pub use controller::SearchController;
pub use details::{
    build_company_details, build_company_job_list, build_review_details, filter_company_jobs,
    CompanyDetails, ReviewDetails,
};
pub use error::{ConfigError, ParamError, SearchError};
pub use filter::{apply_location_filter, matches_locations, slugify, LocationCatalog};
pub use graphql::{documents, extract_data, search_document, GraphqlClient, GraphqlFetcher};
pub use models::{
    CompanyItem, GenericResultItem, JobItem, PaginationCursor, QueryDescriptor, ResultKind,
    ReviewItem, SearchFilters, SearchType, SearchVariables, ValueRange, RESULTS_PER_PAGE,
};
pub use params::QueryParamStore;
pub use reducer::{FetchCompleted, FetchOutcome, FetchTicket, SearchEvent, SearchSnapshot};
pub use state::{derive_search_state, SearchSignals, SearchState};
pub use suggestions::{build_search_suggestions, build_search_suggestions_company, rank_suggestions};
pub use traits::{AnalyticsSink, FetchRequest, ResultFetcher, ResultTransformer};
pub use transform::{ReviewPerspective, SearchResultTransformer};
