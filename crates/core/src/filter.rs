use crate::models::GenericResultItem;
use std::collections::BTreeMap;

/// Lowercases `text` and joins its alphanumeric runs with single dashes,
/// so that "Toronto, ON" and "toronto on" both become "toronto-on".
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Known locations keyed by slug. Used to turn selected filter slugs back
/// into the labels the API filters on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationCatalog {
    labels: BTreeMap<String, String>,
}

impl LocationCatalog {
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels = labels
            .into_iter()
            .map(Into::into)
            .map(|label: String| (slugify(&label), label))
            .collect();
        Self { labels }
    }

    /// Unknown slugs are passed through unchanged.
    pub fn label_for(&self, slug: &str) -> String {
        self.labels
            .get(slug)
            .cloned()
            .unwrap_or_else(|| slug.to_string())
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.labels.contains_key(slug)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

pub fn matches_locations(item: &GenericResultItem, selected: &[String]) -> bool {
    let selected_contains = |location: &str| {
        let slug = slugify(location);
        selected.iter().any(|token| *token == slug)
    };

    match item {
        GenericResultItem::Company(company) => company
            .job_locations
            .iter()
            .any(|location| selected_contains(location)),
        GenericResultItem::Job(job) => selected_contains(&job.location),
        GenericResultItem::ReviewOfJob(review) | GenericResultItem::ReviewOfUser(review) => {
            selected_contains(&review.job_location)
        }
    }
}

/// Keeps the items matching the selected location slugs. With no selection
/// every item is kept.
pub fn apply_location_filter(
    items: &[GenericResultItem],
    selected: Option<&[String]>,
) -> Vec<GenericResultItem> {
    match selected {
        Some(selected) if !selected.is_empty() => items
            .iter()
            .filter(|item| matches_locations(item, selected))
            .cloned()
            .collect(),
        _ => items.to_vec(),
    }
}
