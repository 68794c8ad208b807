use crate::models::{CompanyItem, GenericResultItem, JobItem, ReviewItem, SearchType};
use crate::traits::ResultTransformer;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ItemList<T> {
    #[serde(default)]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub(crate) struct NamedRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct JobRef {
    pub name: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct LogoRef {
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Tags {
    List(Vec<String>),
    Text(String),
}

impl Tags {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Tags::List(tags) => tags,
            Tags::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct CompanyResult {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub desc: Option<String>,
    pub logo_img: Option<LogoRef>,
    pub avg_rating: Option<f64>,
    pub num_ratings: Option<u32>,
    pub jobs: Option<ItemList<JobRef>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct JobResult {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub min_hourly_salary: Option<f64>,
    pub max_hourly_salary: Option<f64>,
    pub salary_currency: Option<String>,
    pub salary_period: Option<String>,
    pub avg_rating: Option<f64>,
    pub num_ratings: Option<u32>,
    pub company: Option<NamedRef>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ReviewResult {
    pub id: Option<String>,
    pub author: Option<String>,
    pub body: Option<String>,
    pub overall_rating: Option<f64>,
    pub tags: Option<Tags>,
    pub created_at: Option<DateTime<Utc>>,
    pub company: Option<NamedRef>,
    pub job: Option<JobRef>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct SearchPayload {
    companies_list: Option<ItemList<CompanyResult>>,
    jobs_list: Option<ItemList<JobResult>>,
    reviews_list: Option<ItemList<ReviewResult>>,
}

impl From<CompanyResult> for CompanyItem {
    fn from(raw: CompanyResult) -> Self {
        Self {
            slug: raw.slug.unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
            description: raw.desc.unwrap_or_default(),
            logo_src: raw.logo_img.and_then(|logo| logo.download_url),
            avg_rating: raw.avg_rating.unwrap_or_default(),
            num_ratings: raw.num_ratings.unwrap_or_default(),
            job_locations: raw
                .jobs
                .map(|jobs| jobs.items.into_iter().filter_map(|job| job.location).collect())
                .unwrap_or_default(),
        }
    }
}

impl From<JobResult> for JobItem {
    fn from(raw: JobResult) -> Self {
        Self {
            slug: raw.slug.unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
            company_name: raw.company.and_then(|company| company.name).unwrap_or_default(),
            location: raw.location.unwrap_or_default(),
            min_salary: raw.min_hourly_salary.unwrap_or_default(),
            max_salary: raw.max_hourly_salary.unwrap_or_default(),
            salary_currency: raw.salary_currency.unwrap_or_default(),
            salary_period: raw.salary_period.unwrap_or_else(|| "hr".to_string()),
            avg_rating: raw.avg_rating.unwrap_or_default(),
            num_ratings: raw.num_ratings.unwrap_or_default(),
        }
    }
}

impl From<ReviewResult> for ReviewItem {
    fn from(raw: ReviewResult) -> Self {
        let job = raw.job.unwrap_or_default();
        Self {
            id: raw.id.unwrap_or_default(),
            company_name: raw.company.and_then(|company| company.name).unwrap_or_default(),
            job_name: job.name.unwrap_or_default(),
            job_location: job.location.unwrap_or_default(),
            author: raw.author.unwrap_or_else(|| "Anonymous".to_string()),
            body: raw.body.unwrap_or_default(),
            overall_rating: raw.overall_rating.unwrap_or_default(),
            tags: raw.tags.map(Tags::into_vec).unwrap_or_default(),
            created_at: raw.created_at,
        }
    }
}

/// Which context a review is listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewPerspective {
    #[default]
    Job,
    User,
}

/// Builds result items from a search query's `data` object.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchResultTransformer {
    pub search_type: SearchType,
    pub reviews_as: ReviewPerspective,
}

impl SearchResultTransformer {
    pub fn new(search_type: SearchType) -> Self {
        Self {
            search_type,
            reviews_as: ReviewPerspective::Job,
        }
    }

    pub fn with_reviews_as(mut self, perspective: ReviewPerspective) -> Self {
        self.reviews_as = perspective;
        self
    }

    fn wants(&self, kind: SearchType) -> bool {
        self.search_type == SearchType::All || self.search_type == kind
    }
}

impl ResultTransformer for SearchResultTransformer {
    type Payload = Value;

    fn transform(&self, payload: &Value) -> Vec<GenericResultItem> {
        let parsed: SearchPayload = match serde_json::from_value(payload.clone()) {
            Ok(parsed) => parsed,
            Err(error) => {
                warn!(%error, "search payload did not match the expected shape");
                return Vec::new();
            }
        };

        let mut items = Vec::new();

        if self.wants(SearchType::Companies) {
            if let Some(companies) = parsed.companies_list {
                items.extend(
                    companies
                        .items
                        .into_iter()
                        .map(|raw| GenericResultItem::Company(raw.into())),
                );
            }
        }

        if self.wants(SearchType::Jobs) {
            if let Some(jobs) = parsed.jobs_list {
                items.extend(jobs.items.into_iter().map(|raw| GenericResultItem::Job(raw.into())));
            }
        }

        if self.wants(SearchType::Reviews) {
            if let Some(reviews) = parsed.reviews_list {
                let perspective = self.reviews_as;
                items.extend(reviews.items.into_iter().map(|raw| match perspective {
                    ReviewPerspective::Job => GenericResultItem::ReviewOfJob(raw.into()),
                    ReviewPerspective::User => GenericResultItem::ReviewOfUser(raw.into()),
                }));
            }
        }

        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResultKind;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "companiesList": {"items": [{
                "slug": "acme",
                "name": "Acme",
                "desc": "Rockets",
                "logoImg": {"downloadUrl": "https://cdn.example.com/acme.png"},
                "avgRating": 4.5,
                "numRatings": 12,
                "jobs": {"items": [{"location": "Toronto, ON"}, {"location": null}, {"location": "NYC"}]}
            }]},
            "jobsList": {"items": [{
                "slug": "acme-intern",
                "name": "Intern",
                "location": "NYC",
                "minHourlySalary": 25.0,
                "maxHourlySalary": 35.5,
                "salaryCurrency": "USD",
                "avgRating": 4.0,
                "numRatings": 3,
                "company": {"name": "Acme"}
            }]},
            "reviewsList": {"items": [{
                "id": "r-1",
                "body": "Great team",
                "overallRating": 5,
                "tags": "mentorship, remote",
                "createdAt": "2021-01-01T21:48:00Z",
                "company": {"name": "Acme"},
                "job": {"name": "Intern", "location": "NYC"}
            }]}
        })
    }

    #[test]
    fn all_search_keeps_list_order() {
        let items = SearchResultTransformer::new(SearchType::All).transform(&payload());
        let kinds: Vec<_> = items.iter().map(GenericResultItem::kind).collect();
        assert_eq!(kinds, vec![ResultKind::Company, ResultKind::Job, ResultKind::ReviewOfJob]);
    }

    #[test]
    fn company_fields_are_normalised() {
        let items = SearchResultTransformer::new(SearchType::Companies).transform(&payload());
        assert_eq!(items.len(), 1);
        let GenericResultItem::Company(company) = &items[0] else {
            panic!("expected a company item");
        };
        assert_eq!(company.job_locations, vec!["Toronto, ON", "NYC"]);
        assert_eq!(company.logo_src.as_deref(), Some("https://cdn.example.com/acme.png"));
        assert_eq!(company.num_ratings, 12);
    }

    #[test]
    fn job_defaults_missing_salary_period() {
        let items = SearchResultTransformer::new(SearchType::Jobs).transform(&payload());
        let GenericResultItem::Job(job) = &items[0] else {
            panic!("expected a job item");
        };
        assert_eq!(job.company_name, "Acme");
        assert_eq!(job.salary_period, "hr");
        assert_eq!(job.max_salary, 35.5);
    }

    #[test]
    fn reviews_split_text_tags_and_default_author() {
        let items = SearchResultTransformer::new(SearchType::Reviews)
            .with_reviews_as(ReviewPerspective::User)
            .transform(&payload());
        let GenericResultItem::ReviewOfUser(review) = &items[0] else {
            panic!("expected a review of user");
        };
        assert_eq!(review.tags, vec!["mentorship", "remote"]);
        assert_eq!(review.author, "Anonymous");
        assert_eq!(review.job_location, "NYC");
        assert!(review.created_at.is_some());
    }

    #[test]
    fn missing_or_null_lists_yield_nothing() {
        let transformer = SearchResultTransformer::default();
        assert!(transformer.transform(&json!({"jobsList": null})).is_empty());
        assert!(transformer.transform(&json!({})).is_empty());
        assert!(transformer.transform(&json!("not an object")).is_empty());
    }
}
