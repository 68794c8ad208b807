use crate::error::ParamError;
use crate::models::{SearchFilters, ValueRange};
use regex::Regex;
use std::str::FromStr;
use url::form_urlencoded;

const QUERY_KEY: &str = "q";
const LOCATION_KEY: &str = "location";
const SALARY_KEY: &str = "salary";
const RATING_KEY: &str = "rating";
const RANGE_PATTERN: &str = r"^\s*(\d+(?:\.\d+)?)\s*[,\-]\s*(\d+(?:\.\d+)?)\s*$";

/// Query text and filter selections for one search surface, addressable as a
/// URL query string.
///
/// The store is handed to a [`crate::SearchController`] which is then the only
/// writer; everyone else reads through the controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParamStore {
    query: Option<String>,
    filters: SearchFilters,
}

impl QueryParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(filters: SearchFilters) -> Self {
        Self {
            query: None,
            filters,
        }
    }

    /// The submitted query, `None` until a search has been triggered.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub(crate) fn commit_query(&mut self, query: String) {
        self.query = Some(query);
    }

    pub(crate) fn commit_filters(&mut self, filters: SearchFilters) {
        self.filters = filters;
    }

    /// Parses `q`, repeated `location`, `salary=min,max` and `rating=min,max`.
    /// Unknown keys are ignored.
    pub fn from_query_string(input: &str) -> Result<Self, ParamError> {
        let range = Regex::new(RANGE_PATTERN)?;
        let mut store = Self::default();
        let mut locations = Vec::new();

        for (key, value) in form_urlencoded::parse(input.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                QUERY_KEY => store.query = Some(value.into_owned()),
                LOCATION_KEY => locations.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|token| !token.is_empty())
                        .map(str::to_string),
                ),
                SALARY_KEY => store.filters.salary = Some(parse_range(&range, SALARY_KEY, &value)?),
                RATING_KEY => store.filters.rating = Some(parse_range(&range, RATING_KEY, &value)?),
                _ => {}
            }
        }

        if !locations.is_empty() {
            store.filters.locations = Some(locations);
        }

        Ok(store)
    }

    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        if let Some(query) = &self.query {
            serializer.append_pair(QUERY_KEY, query);
        }
        if let Some(locations) = self.filters.active_locations() {
            for location in locations {
                serializer.append_pair(LOCATION_KEY, location);
            }
        }
        if let Some(salary) = self.filters.salary {
            serializer.append_pair(SALARY_KEY, &format!("{},{}", salary.min, salary.max));
        }
        if let Some(rating) = self.filters.rating {
            serializer.append_pair(RATING_KEY, &format!("{},{}", rating.min, rating.max));
        }

        serializer.finish()
    }
}

fn parse_range<T>(pattern: &Regex, key: &str, value: &str) -> Result<ValueRange<T>, ParamError>
where
    T: FromStr + PartialOrd,
{
    let captures = pattern.captures(value).ok_or_else(|| ParamError::InvalidRange {
        key: key.to_string(),
        value: value.to_string(),
    })?;

    let parse = |raw: &str| {
        raw.parse::<T>().map_err(|_| ParamError::InvalidNumber {
            key: key.to_string(),
            value: raw.to_string(),
        })
    };

    let min = parse(&captures[1])?;
    let max = parse(&captures[2])?;
    if min > max {
        return Err(ParamError::InvalidRange {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    Ok(ValueRange::new(min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_means_nothing_submitted() -> Result<(), ParamError> {
        let store = QueryParamStore::from_query_string("")?;
        assert_eq!(store.query(), None);
        assert_eq!(store.filters(), &SearchFilters::default());
        Ok(())
    }

    #[test]
    fn explicit_empty_query_is_kept_as_submitted() -> Result<(), ParamError> {
        let store = QueryParamStore::from_query_string("?q=")?;
        assert_eq!(store.query(), Some(""));
        Ok(())
    }

    #[test]
    fn parses_filters() -> Result<(), ParamError> {
        let store = QueryParamStore::from_query_string(
            "q=data+engineer&location=toronto-on&location=nyc,sf&salary=20-45&rating=3.5,5&page=4",
        )?;
        assert_eq!(store.query(), Some("data engineer"));
        assert_eq!(
            store.filters().locations,
            Some(vec!["toronto-on".to_string(), "nyc".to_string(), "sf".to_string()])
        );
        assert_eq!(store.filters().salary, Some(ValueRange::new(20, 45)));
        assert_eq!(store.filters().rating, Some(ValueRange::new(3.5, 5.0)));
        Ok(())
    }

    #[test]
    fn rejects_malformed_and_inverted_ranges() {
        assert!(matches!(
            QueryParamStore::from_query_string("salary=lots"),
            Err(ParamError::InvalidRange { .. })
        ));
        assert!(matches!(
            QueryParamStore::from_query_string("salary=20.5,30"),
            Err(ParamError::InvalidNumber { .. })
        ));
        assert!(matches!(
            QueryParamStore::from_query_string("rating=5,1"),
            Err(ParamError::InvalidRange { .. })
        ));
    }

    #[test]
    fn renders_what_it_parses() -> Result<(), ParamError> {
        let input = "q=rust&location=nyc&salary=10%2C20&rating=1%2C4";
        let store = QueryParamStore::from_query_string(input)?;
        assert_eq!(store.to_query_string(), input);
        Ok(())
    }
}
