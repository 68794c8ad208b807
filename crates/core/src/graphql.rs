use crate::filter::LocationCatalog;
use crate::models::SearchType;
use crate::traits::{FetchRequest, ResultFetcher};
use crate::SearchError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;
use url::Url;

const BACKEND: &str = "graphql";
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Query documents sent by the CLI.
pub mod documents {
    pub const SEARCH_ALL: &str = r#"
query GetAllSearch($query: String, $offset: Int, $limit: Int) {
  companiesList(filter: {OR: [{name: {contains: $query}}, {desc: {contains: $query}}]}, skip: $offset, first: $limit) {
    items { slug name desc avgRating numRatings logoImg { downloadUrl } jobs { items { location } } }
  }
  jobsList(filter: {OR: [{name: {contains: $query}}, {company: {name: {contains: $query}}}, {location: {contains: $query}}]}, skip: $offset, first: $limit) {
    items { slug name location minHourlySalary maxHourlySalary salaryCurrency avgRating numRatings company { name } }
  }
  reviewsList(filter: {OR: [{company: {name: {contains: $query}}}, {job: {name: {contains: $query}}}, {body: {contains: $query}}, {tags: {contains: $query}}, {author: {contains: $query}}]}, skip: $offset, first: $limit) {
    items { id author body overallRating tags createdAt company { name } job { name location } }
  }
}
"#;

    pub const SEARCH_COMPANIES: &str = r#"
query GetCompaniesSearch($query: String, $locations: [String!], $minRating: Float, $maxRating: Float, $offset: Int, $limit: Int) {
  companiesList(filter: {OR: [{name: {contains: $query}}, {desc: {contains: $query}}], jobs: {some: {location: {in: $locations}}}, avgRating: {gte: $minRating, lte: $maxRating}}, skip: $offset, first: $limit) {
    items { slug name desc avgRating numRatings logoImg { downloadUrl } jobs { items { location } } }
  }
}
"#;

    pub const SEARCH_JOBS: &str = r#"
query GetJobsSearch($query: String, $locations: [String!], $minSalary: Int, $maxSalary: Int, $minRating: Float, $maxRating: Float, $offset: Int, $limit: Int) {
  jobsList(filter: {OR: [{name: {contains: $query}}, {company: {name: {contains: $query}}}, {location: {contains: $query}}], location: {in: $locations}, minHourlySalary: {gte: $minSalary}, maxHourlySalary: {lte: $maxSalary}, avgRating: {gte: $minRating, lte: $maxRating}}, skip: $offset, first: $limit) {
    items { slug name location minHourlySalary maxHourlySalary salaryCurrency avgRating numRatings company { name } }
  }
}
"#;

    pub const SEARCH_REVIEWS: &str = r#"
query GetReviewsSearch($query: String, $locations: [String!], $minRating: Float, $maxRating: Float, $offset: Int, $limit: Int) {
  reviewsList(filter: {OR: [{company: {name: {contains: $query}}}, {job: {name: {contains: $query}}}, {body: {contains: $query}}, {tags: {contains: $query}}, {author: {contains: $query}}], job: {location: {in: $locations}}, overallRating: {gte: $minRating, lte: $maxRating}}, skip: $offset, first: $limit) {
    items { id author body overallRating tags createdAt company { name } job { name location } }
  }
}
"#;

    pub const SEARCH_SUGGESTIONS: &str = r#"
query GetSearchSuggestions {
  companiesList { items { name } }
  jobsList { items { name } }
}
"#;

    pub const COMPANY_DETAILS: &str = r#"
query GetCompanyDetails($slug: String) {
  company(slug: $slug) {
    slug name desc websiteUrl avgRating numRatings logoImg { downloadUrl }
    jobs { items { slug name location minHourlySalary maxHourlySalary salaryCurrency avgRating numRatings } }
  }
}
"#;

    pub const REVIEW_DETAILS: &str = r#"
query GetReviewDetails($id: ID) {
  review(id: $id) {
    id author body overallRating meaningfulWorkRating workLifeBalanceRating learningMentorshipRating
    salary salaryCurrency salaryPeriod tags createdAt
    company { name slug logoImg { downloadUrl } }
    job { name location }
  }
}
"#;
}

pub fn search_document(search_type: SearchType) -> &'static str {
    match search_type {
        SearchType::All => documents::SEARCH_ALL,
        SearchType::Companies => documents::SEARCH_COMPANIES,
        SearchType::Jobs => documents::SEARCH_JOBS,
        SearchType::Reviews => documents::SEARCH_REVIEWS,
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

/// Pulls `data` out of a GraphQL response body. Any reported error fails the
/// whole response.
pub fn extract_data(body: Value) -> Result<Value, SearchError> {
    let response: GraphqlResponse = serde_json::from_value(body)?;

    if !response.errors.is_empty() {
        return Err(SearchError::GraphQl(
            response.errors.into_iter().map(|error| error.message).collect(),
        ));
    }

    response.data.ok_or_else(|| SearchError::BackendResponse {
        backend: BACKEND.to_string(),
        details: "response has no data".to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct GraphqlClient {
    client: Arc<Client>,
    endpoint: Url,
}

impl GraphqlClient {
    pub fn new(endpoint: &str) -> Result<Self, SearchError> {
        Ok(Self {
            client: Arc::new(Client::new()),
            endpoint: Url::parse(endpoint)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn execute(
        &self,
        document: &str,
        variables: Value,
        request_id: Option<&str>,
    ) -> Result<Value, SearchError> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({"query": document, "variables": variables}));
        if let Some(request_id) = request_id {
            request = request.header(REQUEST_ID_HEADER, request_id);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(SearchError::BackendResponse {
                backend: BACKEND.to_string(),
                details: response.status().to_string(),
            });
        }

        let body: Value = response.json().await?;
        extract_data(body)
    }
}

/// Runs one search document per page, using the request descriptor for the
/// variables.
#[derive(Debug, Clone)]
pub struct GraphqlFetcher {
    client: GraphqlClient,
    document: String,
    catalog: LocationCatalog,
    extra_variables: Map<String, Value>,
}

impl GraphqlFetcher {
    pub fn new(client: GraphqlClient, document: impl Into<String>, catalog: LocationCatalog) -> Self {
        Self {
            client,
            document: document.into(),
            catalog,
            extra_variables: Map::new(),
        }
    }

    /// Variables merged over the computed ones on every request.
    pub fn with_extra_variables(mut self, extra: Map<String, Value>) -> Self {
        self.extra_variables = extra;
        self
    }

    pub fn variables_for(&self, request: &FetchRequest) -> Result<Value, SearchError> {
        let variables = request
            .descriptor
            .variables(&self.catalog)
            .into_json(&self.extra_variables)?;
        Ok(variables)
    }
}

#[async_trait]
impl ResultFetcher for GraphqlFetcher {
    type Payload = Value;

    async fn fetch(&self, request: &FetchRequest) -> Result<Value, SearchError> {
        let variables = self.variables_for(request)?;
        debug!(request_id = %request.request_id, %variables, "sending search query");

        let request_id = request.request_id.to_string();
        self.client
            .execute(&self.document, variables, Some(request_id.as_str()))
            .await
    }
}
