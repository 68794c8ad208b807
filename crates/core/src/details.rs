use crate::models::JobItem;
use crate::transform::{ItemList, JobRef, JobResult, LogoRef, Tags};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyDetails {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub logo_src: Option<String>,
    pub avg_rating: f64,
    pub num_ratings: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewDetails {
    pub id: String,
    pub company_name: String,
    pub company_slug: String,
    pub logo_src: Option<String>,
    pub job_name: String,
    pub job_location: String,
    pub author: String,
    pub body: String,
    pub overall_rating: f64,
    pub meaningful_work_rating: f64,
    pub work_life_balance_rating: f64,
    pub learning_mentorship_rating: f64,
    pub salary: f64,
    pub salary_currency: String,
    pub salary_period: String,
    pub tags: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct CompanyDetailsResult {
    slug: Option<String>,
    name: Option<String>,
    desc: Option<String>,
    website_url: Option<String>,
    logo_img: Option<LogoRef>,
    avg_rating: Option<f64>,
    num_ratings: Option<u32>,
    jobs: Option<ItemList<JobResult>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CompanyDetailsPayload {
    company: Option<CompanyDetailsResult>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ReviewCompanyRef {
    name: Option<String>,
    slug: Option<String>,
    logo_img: Option<LogoRef>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ReviewDetailsResult {
    id: Option<String>,
    author: Option<String>,
    body: Option<String>,
    overall_rating: Option<f64>,
    meaningful_work_rating: Option<f64>,
    work_life_balance_rating: Option<f64>,
    learning_mentorship_rating: Option<f64>,
    salary: Option<f64>,
    salary_currency: Option<String>,
    salary_period: Option<String>,
    tags: Option<Tags>,
    created_at: Option<DateTime<Utc>>,
    company: Option<ReviewCompanyRef>,
    job: Option<JobRef>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ReviewDetailsPayload {
    review: Option<ReviewDetailsResult>,
}

fn company_result(data: &Value) -> Option<CompanyDetailsResult> {
    let payload: CompanyDetailsPayload = serde_json::from_value(data.clone()).ok()?;
    payload.company
}

/// Reads `data.company` of a company details query.
pub fn build_company_details(data: &Value) -> Option<CompanyDetails> {
    let company = company_result(data)?;
    Some(CompanyDetails {
        slug: company.slug.unwrap_or_default(),
        name: company.name.unwrap_or_default(),
        description: company.desc.unwrap_or_default(),
        website: company.website_url,
        logo_src: company.logo_img.and_then(|logo| logo.download_url),
        avg_rating: company.avg_rating.unwrap_or_default(),
        num_ratings: company.num_ratings.unwrap_or_default(),
    })
}

/// Jobs listed under `data.company.jobs`, or nothing when absent.
pub fn build_company_job_list(data: &Value) -> Vec<JobItem> {
    let Some(result) = company_result(data) else {
        return Vec::new();
    };
    let company_name = result.name.unwrap_or_default();

    result
        .jobs
        .map(|jobs| jobs.items)
        .unwrap_or_default()
        .into_iter()
        .map(|raw| {
            let mut job = JobItem::from(raw);
            if job.company_name.is_empty() {
                job.company_name = company_name.clone();
            }
            job
        })
        .collect()
}

/// Case-insensitive match of `needle` against job name, location or salary
/// currency. An empty needle keeps every job.
pub fn filter_company_jobs(jobs: &[JobItem], needle: &str) -> Vec<JobItem> {
    let needle = needle.to_lowercase();
    jobs.iter()
        .filter(|job| {
            job.name.to_lowercase().contains(&needle)
                || job.location.to_lowercase().contains(&needle)
                || job.salary_currency.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Reads `data.review` of a review details query.
pub fn build_review_details(data: &Value) -> Option<ReviewDetails> {
    let payload: ReviewDetailsPayload = serde_json::from_value(data.clone()).ok()?;
    let review = payload.review?;
    let company = review.company.unwrap_or_default();
    let job = review.job.unwrap_or_default();

    Some(ReviewDetails {
        id: review.id.unwrap_or_default(),
        company_name: company.name.unwrap_or_default(),
        company_slug: company.slug.unwrap_or_default(),
        logo_src: company.logo_img.and_then(|logo| logo.download_url),
        job_name: job.name.unwrap_or_default(),
        job_location: job.location.unwrap_or_default(),
        author: review.author.unwrap_or_else(|| "Anonymous".to_string()),
        body: review.body.unwrap_or_default(),
        overall_rating: review.overall_rating.unwrap_or_default(),
        meaningful_work_rating: review.meaningful_work_rating.unwrap_or_default(),
        work_life_balance_rating: review.work_life_balance_rating.unwrap_or_default(),
        learning_mentorship_rating: review.learning_mentorship_rating.unwrap_or_default(),
        salary: review.salary.unwrap_or_default(),
        salary_currency: review.salary_currency.unwrap_or_default(),
        salary_period: review.salary_period.unwrap_or_else(|| "hr".to_string()),
        tags: review.tags.map(Tags::into_vec).unwrap_or_default(),
        created_at: review.created_at,
    })
}
