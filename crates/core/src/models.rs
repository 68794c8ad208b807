use crate::filter::LocationCatalog;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;
use std::fmt;
use std::str::FromStr;

/// Page size shared by the request `limit` and end-of-results detection.
pub const RESULTS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ValueRange<T> {
    pub min: T,
    pub max: T,
}

impl<T> ValueRange<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchFilters {
    pub locations: Option<Vec<String>>,
    pub salary: Option<ValueRange<u32>>,
    pub rating: Option<ValueRange<f64>>,
}

impl SearchFilters {
    /// Selected location slugs, or `None` when no location filter is in effect.
    pub fn active_locations(&self) -> Option<&[String]> {
        match &self.locations {
            Some(locations) if !locations.is_empty() => Some(locations.as_slice()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    All,
    Companies,
    Jobs,
    Reviews,
}

impl SearchType {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::All => "all",
            SearchType::Companies => "companies",
            SearchType::Jobs => "jobs",
            SearchType::Reviews => "reviews",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(SearchType::All),
            "companies" | "company" => Ok(SearchType::Companies),
            "jobs" | "job" => Ok(SearchType::Jobs),
            "reviews" | "review" => Ok(SearchType::Reviews),
            other => Err(format!("unknown search type `{other}`")),
        }
    }
}

/// Everything a single page request is derived from. A new descriptor is built
/// whenever the query, a filter or the page changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryDescriptor {
    pub query: String,
    pub filters: SearchFilters,
    pub page: u32,
    pub limit: usize,
}

impl QueryDescriptor {
    pub fn offset(&self) -> usize {
        (self.page.max(1) as usize - 1).saturating_mul(self.limit)
    }

    pub fn variables(&self, catalog: &LocationCatalog) -> SearchVariables {
        SearchVariables {
            query: self.query.clone(),
            locations: self
                .filters
                .active_locations()
                .map(|slugs| slugs.iter().map(|slug| catalog.label_for(slug)).collect()),
            min_salary: self.filters.salary.map(|range| range.min),
            max_salary: self.filters.salary.map(|range| range.max),
            min_rating: self.filters.rating.map(|range| range.min),
            max_rating: self.filters.rating.map(|range| range.max),
            offset: self.offset(),
            limit: self.limit,
        }
    }
}

/// Wire shape of the search request variables.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchVariables {
    pub query: String,
    pub locations: Option<Vec<String>>,
    pub min_salary: Option<u32>,
    pub max_salary: Option<u32>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub offset: usize,
    pub limit: usize,
}

impl SearchVariables {
    /// Serialises the variables and lays `extra` on top; extra keys win.
    pub fn into_json(self, extra: &Map<String, Value>) -> Result<Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(object) = &mut value {
            for (key, extra_value) in extra {
                object.insert(key.clone(), extra_value.clone());
            }
        }
        Ok(value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyItem {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub logo_src: Option<String>,
    pub avg_rating: f64,
    pub num_ratings: u32,
    pub job_locations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobItem {
    pub slug: String,
    pub name: String,
    pub company_name: String,
    pub location: String,
    pub min_salary: f64,
    pub max_salary: f64,
    pub salary_currency: String,
    pub salary_period: String,
    pub avg_rating: f64,
    pub num_ratings: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewItem {
    pub id: String,
    pub company_name: String,
    pub job_name: String,
    pub job_location: String,
    pub author: String,
    pub body: String,
    pub overall_rating: f64,
    pub tags: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenericResultItem {
    Company(CompanyItem),
    Job(JobItem),
    /// A review shown in the context of the job it was written for.
    ReviewOfJob(ReviewItem),
    /// A review shown in the context of its author.
    ReviewOfUser(ReviewItem),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResultKind {
    Company,
    Job,
    ReviewOfJob,
    ReviewOfUser,
}

impl GenericResultItem {
    pub fn kind(&self) -> ResultKind {
        match self {
            GenericResultItem::Company(_) => ResultKind::Company,
            GenericResultItem::Job(_) => ResultKind::Job,
            GenericResultItem::ReviewOfJob(_) => ResultKind::ReviewOfJob,
            GenericResultItem::ReviewOfUser(_) => ResultKind::ReviewOfUser,
        }
    }

    pub fn heading(&self) -> &str {
        match self {
            GenericResultItem::Company(company) => &company.name,
            GenericResultItem::Job(job) => &job.name,
            GenericResultItem::ReviewOfJob(review) => &review.company_name,
            GenericResultItem::ReviewOfUser(review) => &review.author,
        }
    }

    pub fn subheading(&self) -> String {
        match self {
            GenericResultItem::Company(company) => company.description.clone(),
            GenericResultItem::Job(job) => format!("{} | {}", job.company_name, job.location),
            GenericResultItem::ReviewOfJob(review) => review.job_name.clone(),
            GenericResultItem::ReviewOfUser(review) => review.job_location.clone(),
        }
    }

    pub fn rating(&self) -> f64 {
        match self {
            GenericResultItem::Company(company) => company.avg_rating,
            GenericResultItem::Job(job) => job.avg_rating,
            GenericResultItem::ReviewOfJob(review) | GenericResultItem::ReviewOfUser(review) => {
                review.overall_rating
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationCursor {
    /// 1-based page of the current search that was most recently requested.
    pub page: u32,
    pub is_new_search: bool,
    pub is_exhausted: bool,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self {
            page: 1,
            is_new_search: false,
            is_exhausted: false,
        }
    }
}

impl PaginationCursor {
    pub fn restart(&mut self) {
        self.page = 1;
        self.is_new_search = true;
        self.is_exhausted = false;
    }

    pub fn advance(&mut self) {
        self.page = self.page.saturating_add(1);
        self.is_new_search = false;
    }
}
