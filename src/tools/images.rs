//! Wikipedia image search used to seed the illustrated sections

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::ReferenceSource;
use crate::models::{Category, TripRequest};
use crate::{TripSageError, http};

const TOOL: &str = "images";
const SEARCH_LIMIT: usize = 8;
const MAX_IMAGES: usize = 5;

/// A captioned, directly linkable image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub caption: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<QueryPages>,
}

#[derive(Debug, Deserialize)]
struct QueryPages {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    /// Search rank of the page
    #[serde(default)]
    index: u32,
    original: Option<PageImage>,
}

#[derive(Debug, Deserialize)]
struct PageImage {
    source: String,
}

fn parse_images(body: &str) -> crate::Result<Vec<ImageRef>> {
    let response: QueryResponse = serde_json::from_str(body)
        .map_err(|e| TripSageError::tool(TOOL, format!("Invalid image search data: {e}")))?;

    let mut pages = response.query.map(|q| q.pages).unwrap_or_default();
    pages.sort_by_key(|p| p.index);

    Ok(pages
        .into_iter()
        .filter_map(|page| {
            let source = page.original?.source;
            source.starts_with("https://").then(|| ImageRef {
                caption: page.title,
                url: source,
            })
        })
        .take(MAX_IMAGES)
        .collect())
}

/// Image lookup against the MediaWiki search API
#[derive(Clone)]
pub struct ImageSearch {
    client: ClientWithMiddleware,
    base_url: String,
}

impl ImageSearch {
    #[must_use]
    pub fn new(client: ClientWithMiddleware, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> crate::Result<Vec<ImageRef>> {
        let url = format!(
            "{}?action=query&format=json&formatversion=2&generator=search&gsrsearch={}&gsrlimit={SEARCH_LIMIT}&prop=pageimages&piprop=original&pilimit={SEARCH_LIMIT}",
            self.base_url,
            urlencoding::encode(query.trim())
        );

        let response = self.client.get(&url).send().await?;
        let body = http::read_body(response)
            .await
            .map_err(|message| TripSageError::tool(TOOL, message))?;

        let images = parse_images(&body)?;
        debug!("Found {} images for '{}'", images.len(), query);
        Ok(images)
    }
}

#[async_trait]
impl ReferenceSource for ImageSearch {
    fn name(&self) -> &str {
        "Wikipedia images"
    }

    fn serves(&self, category: Category) -> bool {
        matches!(category, Category::Destination | Category::Events)
    }

    async fn lookup(&self, trip: &TripRequest) -> crate::Result<Option<String>> {
        let images = self.search(&trip.destination_city).await?;
        if images.is_empty() {
            return Ok(None);
        }
        let lines: Vec<String> = images
            .iter()
            .map(|image| format!("- {}: {}", image.caption, image.url))
            .collect();
        Ok(Some(format!(
            "Verified image URLs you may use:\n{}",
            lines.join("\n")
        )))
    }
}
