use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de};
use utoipa::{IntoParams, ToSchema};

/// Page size for the admin screens.
pub const ADMIN_PER_PAGE: i64 = 10;
/// Page size for the mobile catalog, rankings and purchase history.
pub const MOBILE_PER_PAGE: i64 = 6;
/// Largest page number accepted; keeps `(page - 1) * per_page` inside `i64`.
pub const MAX_PAGE: i64 = i64::MAX / 100;

/// Query values arrive as strings; blank ones (`?id=`) mean "not given".
pub fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") | Some("null") => Ok(None),
        Some(s) => FromStr::from_str(s).map_err(de::Error::custom).map(Some),
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self { page, per_page }
    }

    /// Returns `(page, per_page, offset)` with the given default page size.
    pub fn normalize_with(&self, default_per_page: i64) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let per_page = self.per_page.unwrap_or(default_per_page).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }

    pub fn normalize(&self) -> (i64, i64, i64) {
        self.normalize_with(ADMIN_PER_PAGE)
    }
}

/// Pulls a requested page back inside `1..=total_pages`, the way the admin
/// screens page through results.
pub fn clamp_page(page: i64, per_page: i64, total: i64) -> (i64, i64) {
    let last = crate::response::total_pages(total, per_page);
    let page = page.clamp(1, last);
    (page, (page - 1) * per_page)
}

/// `%term%` for ILIKE filters, with LIKE wildcards in the term escaped.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Trimmed, non-empty filter text.
pub fn filter_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub per_page: Option<i64>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub per_page: Option<i64>,
    /// Case-insensitive substring of the product name.
    pub name: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
}

impl CatalogQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminProductQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub per_page: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub id: Option<i64>,
    pub name: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
}

impl AdminProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub per_page: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CategoryQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuthorQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub per_page: Option<i64>,
    pub name: Option<String>,
}

impl AuthorQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CustomerQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub per_page: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub id: Option<i64>,
    pub name: Option<String>,
    /// Exact balance match.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub balance: Option<Decimal>,
}

impl CustomerQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

/// Independent page numbers for the three tables of the rankings page.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RankingPagesQuery {
    /// Most purchased.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub mp: Option<i64>,
    /// Top buyers.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub tb: Option<i64>,
    /// Best rated.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub br: Option<i64>,
}
