//! Server-rendered HTML versions of the catalog, product and rankings screens.

use std::fmt::Write;

use axum::{
    Router,
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::get,
};

use crate::{
    error::AppResult,
    models::CatalogItem,
    response::Meta,
    routes::params::{CatalogQuery, Pagination, RankingPagesQuery, filter_text},
    services::{catalog_service, ranking_service, storefront_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/catalog") }))
        .route("/catalog", get(catalog_page))
        .route("/products/{id}", get(product_page))
        .route("/rankings", get(rankings_page))
}

/// Escapes text for use in element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Query string that carries the catalog filters across pager links.
fn filter_query(name: &str, author: &str, category: &str) -> String {
    format!(
        "name={}&author={}&category={}",
        urlencoding::encode(name),
        urlencoding::encode(author),
        urlencoding::encode(category)
    )
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n<nav><a href=\"/catalog\">Catalog</a> | \
         <a href=\"/rankings\">Rankings</a></nav>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    ))
}

/// Previous/next links; `link` builds the href for a page number.
fn pager(meta: &Meta, link: impl Fn(i64) -> String) -> String {
    let page = meta.page.unwrap_or(1);
    let last = meta.total_pages.unwrap_or(1);
    let mut out = String::from("<p class=\"pager\">");
    if page > 1 {
        let _ = write!(out, "<a href=\"{}\">&laquo; Previous</a> ", escape(&link(page - 1)));
    }
    let _ = write!(out, "Page {page} of {last}");
    if page < last {
        let _ = write!(out, " <a href=\"{}\">Next &raquo;</a>", escape(&link(page + 1)));
    }
    out.push_str("</p>");
    out
}

fn rating_text(value: Option<rust_decimal::Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn catalog_rows(items: &[CatalogItem]) -> String {
    let mut rows = String::new();
    for item in items {
        let image = match &item.image_url {
            Some(url) => format!("<img src=\"{}\" alt=\"\" width=\"64\">", escape(url)),
            None => String::new(),
        };
        let _ = write!(
            rows,
            "<tr><td>{image}</td><td><a href=\"/products/{id}\">{name}</a></td>\
             <td>{author}</td><td>{rating}</td><td>{purchases}</td></tr>",
            id = item.id,
            name = escape(&item.name),
            author = escape(&item.author),
            rating = rating_text(item.average_rating),
            purchases = item.purchases,
        );
    }
    rows
}

async fn catalog_page(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Html<String>> {
    let (list, meta) = catalog_service::catalog_page(&state, &query).await?;

    let name = filter_text(&query.name).unwrap_or("");
    let author = filter_text(&query.author).unwrap_or("");
    let category = filter_text(&query.category).unwrap_or("");

    let mut body = String::from("<h1>Catalog</h1>");
    let _ = write!(
        body,
        "<form method=\"get\" action=\"/catalog\">\
         <input name=\"name\" placeholder=\"Name\" value=\"{}\"> \
         <input name=\"author\" placeholder=\"Author\" value=\"{}\"> \
         <input name=\"category\" placeholder=\"Category\" value=\"{}\"> \
         <button type=\"submit\">Search</button></form>",
        escape(name),
        escape(author),
        escape(category)
    );

    if list.items.is_empty() {
        body.push_str("<p>No products found.</p>");
    } else {
        let _ = write!(
            body,
            "<table><thead><tr><th></th><th>Name</th><th>Author</th><th>Rating</th>\
             <th>Purchases</th></tr></thead><tbody>{}</tbody></table>",
            catalog_rows(&list.items)
        );
    }

    let filters = filter_query(name, author, category);
    body.push_str(&pager(&meta, |page| format!("/catalog?{filters}&page={page}")));

    Ok(layout("Catalog", &body))
}

async fn product_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Html<String>> {
    let view = storefront_service::product_view(&state, None, id).await?;

    let mut body = String::new();
    let _ = write!(body, "<h1>{}</h1>", escape(&view.name));
    for url in &view.image_urls {
        let _ = write!(body, "<img src=\"{}\" alt=\"\" width=\"200\"> ", escape(url));
    }
    let _ = write!(
        body,
        "<dl><dt>Author</dt><dd>{}</dd><dt>Category</dt><dd>{}</dd>\
         <dt>Version</dt><dd>{}</dd><dt>Price</dt><dd>{}</dd>\
         <dt>Published</dt><dd>{}</dd><dt>Purchases</dt><dd>{}</dd>\
         <dt>Rating</dt><dd>{}</dd></dl><p>{}</p>",
        escape(&view.author),
        escape(&view.category),
        escape(&view.version),
        view.price,
        view.published_at.format("%Y-%m-%d"),
        view.purchases,
        view.average_rating,
        escape(&view.description)
    );

    body.push_str("<h2>Comments</h2>");
    if view.comments.is_empty() {
        body.push_str("<p>No comments yet.</p>");
    } else {
        body.push_str("<ul>");
        for comment in &view.comments {
            let stars = if comment.rating > 0 {
                format!(" ({}/5)", comment.rating)
            } else {
                String::new()
            };
            let _ = write!(
                body,
                "<li><strong>{}</strong>{} <small>{}</small><br>{}</li>",
                escape(&comment.username),
                stars,
                comment.created_at.format("%Y-%m-%d %H:%M"),
                escape(&comment.body)
            );
        }
        body.push_str("</ul>");
    }

    Ok(layout(&view.name, &body))
}

fn rankings_link(mp: i64, tb: i64, br: i64) -> String {
    format!("/rankings?mp={mp}&tb={tb}&br={br}")
}

async fn rankings_page(
    State(state): State<AppState>,
    Query(query): Query<RankingPagesQuery>,
) -> AppResult<Html<String>> {
    let (most, most_meta) =
        ranking_service::most_purchased_page(&state, Pagination::new(query.mp, None)).await?;
    let (buyers, buyers_meta) =
        ranking_service::top_buyers_page(&state, Pagination::new(query.tb, None)).await?;
    let (rated, rated_meta) =
        ranking_service::best_rated_page(&state, Pagination::new(query.br, None)).await?;

    let mp = most_meta.page.unwrap_or(1);
    let tb = buyers_meta.page.unwrap_or(1);
    let br = rated_meta.page.unwrap_or(1);

    let mut body = String::from("<h1>Rankings</h1>");

    body.push_str(
        "<h2>Most purchased</h2><table><thead><tr><th>#</th><th>Name</th><th>Author</th>\
         <th>Category</th><th>Price</th><th>Purchases</th></tr></thead><tbody>",
    );
    for row in &most.items {
        let _ = write!(
            body,
            "<tr><td>{}</td><td><a href=\"/products/{}\">{}</a></td><td>{}</td><td>{}</td>\
             <td>{}</td><td>{}</td></tr>",
            row.rank,
            row.id,
            escape(&row.name),
            escape(&row.author),
            escape(&row.category),
            row.price,
            row.purchases
        );
    }
    body.push_str("</tbody></table>");
    body.push_str(&pager(&most_meta, |page| rankings_link(page, tb, br)));

    body.push_str(
        "<h2>Top buyers</h2><table><thead><tr><th>#</th><th>User</th><th>Purchases</th>\
         </tr></thead><tbody>",
    );
    for row in &buyers.items {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.rank,
            escape(&row.username),
            row.purchases
        );
    }
    body.push_str("</tbody></table>");
    body.push_str(&pager(&buyers_meta, |page| rankings_link(mp, page, br)));

    body.push_str(
        "<h2>Best rated</h2><table><thead><tr><th>#</th><th>Name</th><th>Author</th>\
         <th>Category</th><th>Price</th><th>Ratings</th><th>Average</th></tr></thead><tbody>",
    );
    for row in &rated.items {
        let _ = write!(
            body,
            "<tr><td>{}</td><td><a href=\"/products/{}\">{}</a></td><td>{}</td><td>{}</td>\
             <td>{}</td><td>{}</td><td>{}</td></tr>",
            row.rank,
            row.id,
            escape(&row.name),
            escape(&row.author),
            escape(&row.category),
            row.price,
            row.ratings,
            row.average_rating
        );
    }
    body.push_str("</tbody></table>");
    body.push_str(&pager(&rated_meta, |page| rankings_link(mp, tb, page)));

    Ok(layout("Rankings", &body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralises_markup() {
        assert_eq!(
            escape("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn filter_query_keeps_every_filter_encoded() {
        assert_eq!(
            filter_query("sci fi&more", "Ñu", ""),
            "name=sci%20fi%26more&author=%C3%91u&category="
        );
    }

    #[test]
    fn pager_links_only_existing_pages() {
        let first = pager(&Meta::new(1, 6, 13), |p| format!("/catalog?page={p}"));
        assert!(!first.contains("Previous"));
        assert!(first.contains("href=\"/catalog?page=2\""));
        assert!(first.contains("Page 1 of 3"));

        let last = pager(&Meta::new(3, 6, 13), |p| format!("/catalog?page={p}"));
        assert!(last.contains("href=\"/catalog?page=2\""));
        assert!(!last.contains("Next"));
    }

    #[test]
    fn layout_escapes_title() {
        let Html(html) = layout("<b>", "<p>body</p>");
        assert!(html.contains("<title>&lt;b&gt;</title>"));
        assert!(html.contains("<p>body</p>"));
    }
}
