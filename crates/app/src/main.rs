use chrono::Utc;
use clap::{Parser, Subcommand};
use review_search_core::{
    build_company_details, build_company_job_list, build_review_details,
    build_search_suggestions, build_search_suggestions_company, documents, filter_company_jobs,
    rank_suggestions, search_document, GenericResultItem, GraphqlClient, GraphqlFetcher,
    QueryParamStore, SearchConfig, SearchController, SearchResultTransformer, SearchState,
    SearchType, TracingAnalytics, ValueRange,
};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "review-search", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// GraphQL endpoint URL (overrides the config file)
    #[arg(long, env = "REVIEW_SEARCH_ENDPOINT")]
    endpoint: Option<String>,

    /// JSON config file
    #[arg(long, env = "REVIEW_SEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Print results as JSON lines.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run a paginated search and print each page as it arrives.
    Search {
        /// Search text. An empty string is a valid search.
        #[arg(long)]
        query: Option<String>,
        /// One of all, companies, jobs, reviews.
        #[arg(long = "type")]
        search_type: Option<SearchType>,
        /// Location slug to keep, e.g. toronto-on. Repeatable.
        #[arg(long = "location")]
        locations: Vec<String>,
        #[arg(long)]
        min_salary: Option<u32>,
        #[arg(long)]
        max_salary: Option<u32>,
        #[arg(long)]
        min_rating: Option<f64>,
        #[arg(long)]
        max_rating: Option<f64>,
        /// Start from a URL query string such as "q=intern&location=nyc".
        #[arg(long)]
        params: Option<String>,
        /// Maximum number of pages to fetch.
        #[arg(long, default_value = "1")]
        pages: u32,
    },
    /// Suggest search terms for partially typed input.
    Suggest {
        #[arg(long)]
        query: String,
        #[arg(long = "type")]
        search_type: Option<SearchType>,
        /// Only suggest job names of this company.
        #[arg(long)]
        company: Option<String>,
        #[arg(long, default_value = "8")]
        limit: usize,
    },
    /// Show a company and its jobs.
    Company {
        #[arg(long)]
        slug: String,
        /// Keep jobs whose name, location or currency contains this text.
        #[arg(long, default_value = "")]
        filter: String,
    },
    /// Show a single review.
    Review {
        #[arg(long)]
        id: String,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<SearchConfig> {
    let mut config = match &cli.config {
        Some(path) => SearchConfig::from_json_file(path)?,
        None => SearchConfig::default(),
    };
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    config.validate()?;
    Ok(config)
}

fn print_item(item: &GenericResultItem, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string(item)?);
    } else {
        println!(
            "[{:?}] {} | {} | rating={:.1}",
            item.kind(),
            item.heading(),
            item.subheading(),
            item.rating()
        );
    }
    Ok(())
}

fn range<T: Copy>(min: Option<T>, max: Option<T>, floor: T, ceiling: T) -> Option<ValueRange<T>> {
    match (min, max) {
        (None, None) => None,
        (min, max) => Some(ValueRange::new(min.unwrap_or(floor), max.unwrap_or(ceiling))),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let client = GraphqlClient::new(&config.endpoint)?;

    info!(
        version = app_version,
        endpoint = %client.endpoint(),
        started_at = %Utc::now().to_rfc3339(),
        "review-search boot"
    );

    match cli.command {
        Command::Search {
            query,
            search_type,
            locations,
            min_salary,
            max_salary,
            min_rating,
            max_rating,
            params,
            pages,
        } => {
            let search_type = search_type.unwrap_or(config.search_type);
            let params = match params {
                Some(raw) => QueryParamStore::from_query_string(&raw)?,
                None => QueryParamStore::new(),
            };
            let query = query
                .or_else(|| params.query().map(str::to_string))
                .unwrap_or_default();

            let fetcher = GraphqlFetcher::new(
                client,
                search_document(search_type),
                config.location_catalog(),
            );
            let mut controller = SearchController::new(
                fetcher,
                SearchResultTransformer::new(search_type),
                TracingAnalytics,
                params,
                &config,
            );

            if !locations.is_empty() {
                controller.set_location_filter(Some(locations));
            }
            if let Some(salary) = range(min_salary, max_salary, 0, u32::MAX) {
                controller.set_salary_filter(Some(salary));
            }
            if let Some(rating) = range(min_rating, max_rating, 0.0, 5.0) {
                controller.set_rating_filter(Some(rating));
            }

            controller.trigger_new_search(&query, true);

            let mut printed = 0;
            for page in 1..=pages.max(1) {
                if page > 1 {
                    if controller.search_state() != SearchState::Results {
                        break;
                    }
                    controller.trigger_next_batch();
                }

                let state = controller.fetch_pending().await;
                for item in &controller.search_results()[printed..] {
                    print_item(item, cli.json)?;
                }
                printed = controller.search_results().len();

                if state == SearchState::Error {
                    warn!(page, "search failed, stopping");
                    break;
                }
            }

            println!(
                "state={} results={} unfiltered={} params=?{}",
                controller.search_state(),
                controller.search_results().len(),
                controller.unfiltered_results().len(),
                controller.params().to_query_string()
            );

            if controller.search_state() == SearchState::Error {
                anyhow::bail!("search request failed");
            }
        }
        Command::Suggest {
            query,
            search_type,
            company,
            limit,
        } => {
            let suggestions = match company {
                Some(slug) => {
                    let data = client
                        .execute(documents::COMPANY_DETAILS, json!({"slug": slug}), None)
                        .await?;
                    build_search_suggestions_company(&data)
                }
                None => {
                    let data = client
                        .execute(documents::SEARCH_SUGGESTIONS, json!({}), None)
                        .await?;
                    build_search_suggestions(&data, search_type)
                }
            };

            for suggestion in rank_suggestions(&suggestions, &query, limit) {
                println!("{suggestion}");
            }
        }
        Command::Company { slug, filter } => {
            let data = client
                .execute(documents::COMPANY_DETAILS, json!({"slug": slug}), None)
                .await?;
            let Some(details) = build_company_details(&data) else {
                anyhow::bail!("company `{slug}` not found");
            };
            let jobs = filter_company_jobs(&build_company_job_list(&data), &filter);

            if cli.json {
                println!("{}", serde_json::to_string(&json!({"company": details, "jobs": jobs}))?);
            } else {
                println!(
                    "{} ({}) rating={:.1} from {} reviews",
                    details.name, details.slug, details.avg_rating, details.num_ratings
                );
                if let Some(website) = &details.website {
                    println!("  website={website}");
                }
                println!("  {}", details.description);
                for job in jobs {
                    println!(
                        "  - {} | {} | {}-{} {}/{}",
                        job.name,
                        job.location,
                        job.min_salary,
                        job.max_salary,
                        job.salary_currency,
                        job.salary_period
                    );
                }
            }
        }
        Command::Review { id } => {
            let data = client
                .execute(documents::REVIEW_DETAILS, json!({"id": id}), None)
                .await?;
            let Some(review) = build_review_details(&data) else {
                anyhow::bail!("review `{id}` not found");
            };

            if cli.json {
                println!("{}", serde_json::to_string(&review)?);
            } else {
                println!("{} at {} ({})", review.job_name, review.company_name, review.job_location);
                println!("  by {}", review.author);
                println!(
                    "  overall={:.1} meaningful_work={:.1} work_life_balance={:.1} learning_mentorship={:.1}",
                    review.overall_rating,
                    review.meaningful_work_rating,
                    review.work_life_balance_rating,
                    review.learning_mentorship_rating
                );
                println!(
                    "  salary={} {}/{}",
                    review.salary, review.salary_currency, review.salary_period
                );
                if !review.tags.is_empty() {
                    println!("  tags={}", review.tags.join(", "));
                }
                println!("{}", review.body);
            }
        }
    }

    Ok(())
}
