use crate::models::SearchType;
use crate::transform::{ItemList, NamedRef};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct SuggestionsPayload {
    companies_list: Option<ItemList<NamedRef>>,
    jobs_list: Option<ItemList<NamedRef>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CompanyJobs {
    jobs: Option<ItemList<NamedRef>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CompanySuggestionsPayload {
    company: Option<CompanyJobs>,
}

fn names(list: Option<ItemList<NamedRef>>) -> impl Iterator<Item = String> {
    list.map(|list| list.items)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| item.name)
        .filter(|name| !name.is_empty())
}

/// Company names followed by job names. Job names are left out when only
/// companies are being searched.
pub fn build_search_suggestions(data: &Value, search_type: Option<SearchType>) -> Vec<String> {
    let Ok(payload) = serde_json::from_value::<SuggestionsPayload>(data.clone()) else {
        return Vec::new();
    };

    let mut suggestions: Vec<String> = names(payload.companies_list).collect();
    if search_type != Some(SearchType::Companies) {
        suggestions.extend(names(payload.jobs_list));
    }
    suggestions
}

/// Job names of a single company.
pub fn build_search_suggestions_company(data: &Value) -> Vec<String> {
    serde_json::from_value::<CompanySuggestionsPayload>(data.clone())
        .ok()
        .and_then(|payload| payload.company)
        .map(|company| names(company.jobs).collect())
        .unwrap_or_default()
}

/// Orders suggestions against typed input: prefix matches, then substring
/// matches, then in-order character matches. Non-matching and duplicate
/// suggestions are dropped.
pub fn rank_suggestions(suggestions: &[String], input: &str, limit: usize) -> Vec<String> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<(u8, usize, &String)> = suggestions
        .iter()
        .enumerate()
        .filter_map(|(position, suggestion)| {
            let lowered = suggestion.to_lowercase();
            let tier = if lowered.starts_with(&needle) {
                0
            } else if lowered.contains(&needle) {
                1
            } else if is_subsequence(&needle, &lowered) {
                2
            } else {
                return None;
            };
            Some((tier, position, suggestion))
        })
        .collect();

    ranked.sort_by_key(|(tier, position, _)| (*tier, *position));

    let mut seen = Vec::new();
    for (_, _, suggestion) in ranked {
        if seen.len() == limit {
            break;
        }
        if !seen.contains(suggestion) {
            seen.push(suggestion.clone());
        }
    }
    seen
}

fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut remaining = haystack.chars();
    needle
        .chars()
        .all(|wanted| remaining.by_ref().any(|ch| ch == wanted))
}
