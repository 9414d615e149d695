use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Account, VendorListing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Location,
    Rating,
}

impl SortKey {
    /// Case-insensitive; unknown keys yield `None` and fall back to id order.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "name" => Some(SortKey::Name),
            "location" => Some(SortKey::Location),
            "rating" => Some(SortKey::Rating),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(Error::InvalidSortDirection(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub name: Option<String>,
    pub location: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

/// Listings of vendor-role accounts that have a profile.
pub fn eligible_listings<'a>(accounts: impl IntoIterator<Item = &'a Account>) -> Vec<VendorListing> {
    accounts
        .into_iter()
        .filter_map(Account::eligible_listing)
        .cloned()
        .collect()
}

/// Compares two optional keys with `direction` applied only to present values;
/// absent values go last either way.
pub fn nulls_last<T: ?Sized>(
    a: Option<&T>,
    b: Option<&T>,
    direction: SortDirection,
    compare: impl FnOnce(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => direction.apply(compare(a, b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

fn compare_by(key: SortKey, direction: SortDirection, a: &VendorListing, b: &VendorListing) -> Ordering {
    match key {
        SortKey::Name => nulls_last(Some(a.name.as_str()), Some(b.name.as_str()), direction, compare_ignore_case),
        SortKey::Location => nulls_last(a.location.as_deref(), b.location.as_deref(), direction, compare_ignore_case),
        SortKey::Rating => nulls_last(
            a.rating.average.as_ref(),
            b.rating.average.as_ref(),
            direction,
            f64::total_cmp,
        ),
    }
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

/// Lower-cased filter text, or `None` when the filter is absent or blank.
fn active_filter(filter: Option<&str>) -> Option<String> {
    filter.filter(|f| !f.trim().is_empty()).map(str::to_lowercase)
}

pub struct VendorRanker;

impl VendorRanker {
    pub fn search(vendors: Vec<VendorListing>, query: &SearchQuery) -> Vec<VendorListing> {
        let name = active_filter(query.name.as_deref());
        let location = active_filter(query.location.as_deref());

        let mut matched: Vec<VendorListing> = vendors
            .into_iter()
            .filter(|v| name.as_deref().is_none_or(|n| contains_ignore_case(Some(v.name.as_str()), n)))
            .filter(|v| location.as_deref().is_none_or(|l| contains_ignore_case(v.location.as_deref(), l)))
            .collect();

        let key = query.sort_by.as_deref().and_then(SortKey::parse);
        let direction = query.sort_direction.unwrap_or_default();

        match key {
            Some(key) => matched.sort_by(|a, b| compare_by(key, direction, a, b).then_with(|| a.id.cmp(&b.id))),
            None => matched.sort_by_key(|v| v.id),
        }

        debug!(
            matched = matched.len(),
            sort_key = ?key,
            direction = ?direction,
            "Ranked vendors"
        );
        matched
    }
}
