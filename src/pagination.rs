//! This modules defines the common functionality for paging and sorting data.

use std::{fmt::Display, str::FromStr};

use serde::Deserialize;

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationConfig {
    /// The number of items per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a client may ask for. Larger requests are clamped to this value.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 2000,
        }
    }
}

/// A column that list queries may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// Sort by the database ID.
    Id,
    /// Sort by the amount of money on the card.
    Amount,
    /// Sort by the owner's username.
    Owner,
}

impl SortField {
    /// The SQL column for this field.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Amount => "amount",
            SortField::Owner => "owner",
        }
    }
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortField::Id),
            "amount" => Ok(SortField::Amount),
            "owner" => Ok(SortField::Owner),
            other => Err(Error::InvalidSort(format!(
                "\"{other}\" is not a sortable field, expected one of id, amount or owner"
            ))),
        }
    }
}

/// The order to sort items in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Sort in order of increasing value.
    #[default]
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}

impl SortDirection {
    fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Ascending)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Descending)
        } else {
            None
        }
    }

    /// The SQL keyword for this direction.
    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// A single `field direction` term of an ORDER BY clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    /// The field to sort by.
    pub field: SortField,
    /// The direction to sort `field` in.
    pub direction: SortDirection,
}

impl SortOrder {
    /// Sort by `field` in increasing order.
    pub const fn ascending(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    /// Sort by `field` in decreasing order.
    pub const fn descending(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field.column(), self.direction.sql())
    }
}

/// Parse a single `sort` query parameter such as `amount,desc` or `owner,amount`.
///
/// The last comma separated term may be a direction (`asc` or `desc`, any case)
/// which applies to every field in the parameter. Without one, fields are
/// sorted in ascending order. An empty parameter yields no sort orders.
///
/// # Errors
///
/// Returns [Error::InvalidSort] if a field is not sortable or the parameter
/// only contains a direction.
pub fn parse_sort(param: &str) -> Result<Vec<SortOrder>, Error> {
    let mut terms: Vec<&str> = param
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .collect();

    let direction = match terms.last().and_then(|term| SortDirection::parse(term)) {
        Some(direction) => {
            terms.pop();
            direction
        }
        None => SortDirection::default(),
    };

    if terms.is_empty() && !param.trim().is_empty() {
        return Err(Error::InvalidSort(format!(
            "\"{param}\" does not name a field to sort by"
        )));
    }

    terms
        .into_iter()
        .map(|term| {
            term.parse()
                .map(|field| SortOrder { field, direction })
        })
        .collect()
}

/// Which slice of a list to fetch and how to order it.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// The zero-based page index.
    pub page: u64,
    /// The maximum number of items on a page.
    pub size: u64,
    /// How to order items before slicing them into pages, most significant first.
    pub sort: Vec<SortOrder>,
}

impl PageRequest {
    /// Create a page request for the zero-based `page` of `size` items.
    pub fn new(page: u64, size: u64, sort: Vec<SortOrder>) -> Self {
        Self { page, size, sort }
    }

    /// The number of items that come before this page, or `None` if that
    /// number does not fit in a `u64`.
    pub fn offset(&self) -> Option<u64> {
        self.page.checked_mul(self.size)
    }
}

/// The pagination query parameters of a list request, e.g. `?page=0&size=1&sort=amount,desc`.
///
/// `sort` may be repeated to sort by several fields.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// The zero-based page index.
    pub page: Option<u64>,
    /// The number of items per page.
    pub size: Option<u64>,
    /// Sort parameters in order of significance.
    #[serde(default)]
    pub sort: Vec<String>,
}

impl PageQuery {
    /// Resolve the query into a [PageRequest], filling in defaults from `config`
    /// and `default_sort`.
    ///
    /// A missing or zero page size falls back to the default page size and a
    /// page size larger than the maximum is clamped.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidSort] if any `sort` parameter is invalid.
    pub fn into_page_request(
        self,
        config: &PaginationConfig,
        default_sort: &[SortOrder],
    ) -> Result<PageRequest, Error> {
        let size = match self.size {
            None | Some(0) => config.default_page_size,
            Some(size) => size.min(config.max_page_size),
        };

        let mut sort = Vec::new();
        for param in &self.sort {
            sort.extend(parse_sort(param)?);
        }

        if sort.is_empty() {
            sort.extend_from_slice(default_sort);
        }

        Ok(PageRequest::new(self.page.unwrap_or(0), size, sort))
    }
}
