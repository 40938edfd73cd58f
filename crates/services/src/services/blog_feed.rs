//! Blog aggregator: reshapes a Squarespace `?format=json` feed into post
//! cards, with bundled fallback posts whenever the feed is unusable.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use db::models::blog_post::{BlogPost, BlogPostId};
use moka::future::Cache;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use utils::text::{first_image_src, strip_html, truncate_words};

pub const DEFAULT_SITE_URL: &str = "https://www.twinbrain.ai";
pub const MAX_POSTS: usize = 3;
const EXCERPT_CHARS: usize = 150;
const CACHE_TTL: Duration = Duration::from_secs(3600);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; TwinBrainApp/1.0)";

static DOUBLE_SLASH_AFTER_HOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"://([^/]*)//").unwrap());

#[derive(Debug, Error)]
pub enum BlogFeedError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("feed returned http {0}")]
    Http(u16),
    #[error("feed has no posts")]
    Empty,
}

/// Top level of the feed document. Items stay loose so that one odd post
/// cannot spoil the rest.
#[derive(Debug, Default, Deserialize)]
pub struct FeedDocument {
    #[serde(default)]
    pub items: Vec<Value>,
}

/// One feed post. Each field is read on its own, so a field of the wrong
/// type is dropped while the rest of the post still renders.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<BlogPostId>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub excerpt: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub asset_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail: Option<FeedThumbnail>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub full_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub website_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub url_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub collection: Option<FeedCollection>,
    #[serde(default, deserialize_with = "lenient_author")]
    pub author: Option<FeedAuthor>,
    #[serde(default, deserialize_with = "lenient")]
    pub publish_on: Option<FeedDate>,
    #[serde(default, deserialize_with = "lenient")]
    pub added_on: Option<FeedDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedThumbnail {
    #[serde(default, deserialize_with = "lenient_text")]
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedCollection {
    #[serde(default, deserialize_with = "lenient_text")]
    pub full_url: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum FeedAuthor {
    Name(String),
    Profile { display_name: Option<String> },
}

/// Squarespace dates are epoch milliseconds; hand-edited feeds use strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FeedDate {
    Millis(f64),
    Text(String),
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

/// Numeric ids stay numeric. Zero and the empty string count as absent.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<BlogPostId>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => match n.as_u64() {
            Some(0) => None,
            Some(id) => Some(BlogPostId::Number(id)),
            None => Some(BlogPostId::Text(n.to_string())),
        },
        Value::String(text) if !text.is_empty() => Some(BlogPostId::Text(text)),
        _ => None,
    })
}

fn lenient_author<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<FeedAuthor>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(mut profile) => Some(FeedAuthor::Profile {
            display_name: profile.remove("displayName").and_then(scalar_text),
        }),
        other => scalar_text(other).map(FeedAuthor::Name),
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Render a feed date as `April 4, 2025`. Missing dates read `Recent`;
/// unparseable strings are passed through.
pub fn format_post_date(date: Option<&FeedDate>) -> String {
    const FORMAT: &str = "%B %-d, %Y";

    match date {
        None => "Recent".to_string(),
        Some(FeedDate::Millis(ms)) => DateTime::<Utc>::from_timestamp_millis(*ms as i64)
            .map(|dt| dt.format(FORMAT).to_string())
            .unwrap_or_else(|| ms.to_string()),
        Some(FeedDate::Text(text)) if text.is_empty() => "Recent".to_string(),
        Some(FeedDate::Text(text)) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                return dt.format(FORMAT).to_string();
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
                return dt.format(FORMAT).to_string();
            }
            if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                return date.format(FORMAT).to_string();
            }
            text.clone()
        }
    }
}

fn post_url(item: &FeedItem, site_url: &str) -> String {
    let url_id = non_empty(&item.url_id);
    let collection_url = item
        .collection
        .as_ref()
        .and_then(|c| non_empty(&c.full_url));

    let url = if let Some(full_url) = non_empty(&item.full_url) {
        full_url.to_string()
    } else if let (Some(website_url), Some(url_id)) = (non_empty(&item.website_url), url_id) {
        format!("{website_url}/{url_id}")
    } else if let (Some(collection_url), Some(url_id)) = (collection_url, url_id) {
        format!("{collection_url}/{url_id}")
    } else if let Some(url_id) = url_id {
        format!("{site_url}/blog/{url_id}")
    } else {
        format!("{site_url}/blog")
    };

    DOUBLE_SLASH_AFTER_HOST
        .replace(&url, "://$1/")
        .into_owned()
}

fn post_image(item: &FeedItem) -> String {
    non_empty(&item.asset_url)
        .map(str::to_string)
        .or_else(|| {
            item.thumbnail
                .as_ref()
                .and_then(|t| non_empty(&t.url))
                .map(str::to_string)
        })
        .or_else(|| non_empty(&item.body).and_then(first_image_src))
        .unwrap_or_default()
}

fn post_excerpt(item: &FeedItem) -> String {
    let excerpt = if let Some(excerpt) = non_empty(&item.excerpt) {
        strip_html(excerpt)
    } else if let Some(body) = non_empty(&item.body) {
        truncate_words(&strip_html(body), EXCERPT_CHARS)
    } else {
        String::new()
    };

    if excerpt.is_empty() {
        "No excerpt available".to_string()
    } else {
        excerpt
    }
}

fn post_author(item: &FeedItem) -> String {
    match &item.author {
        Some(FeedAuthor::Profile { display_name }) => non_empty(display_name).unwrap_or_default().to_string(),
        Some(FeedAuthor::Name(name)) => name.clone(),
        None => String::new(),
    }
}

/// Reshape one feed item into a post card.
pub fn process_item(item: &FeedItem, site_url: &str) -> BlogPost {
    let id = match &item.id {
        Some(id) => id.clone(),
        None => BlogPostId::Text(format!(
            "post-{}-{}",
            Utc::now().timestamp_millis(),
            rand::thread_rng().gen_range(0..1000)
        )),
    };

    let date = match (&item.publish_on, &item.added_on) {
        (Some(FeedDate::Text(t)), added) if t.is_empty() => format_post_date(added.as_ref()),
        (Some(published), _) => format_post_date(Some(published)),
        (None, added) => format_post_date(added.as_ref()),
    };

    let post = BlogPost {
        id,
        title: non_empty(&item.title).unwrap_or("Blog Post").to_string(),
        excerpt: post_excerpt(item),
        date,
        author: post_author(item),
        image_url: post_image(item),
        url: post_url(item, site_url),
    };
    debug!(title = %post.title, url = %post.url, "Processed blog post");
    post
}

/// Turn a feed document into at most `max_posts` cards.
pub fn posts_from_feed(
    feed: FeedDocument,
    site_url: &str,
    max_posts: usize,
) -> Result<Vec<BlogPost>, BlogFeedError> {
    if feed.items.is_empty() {
        return Err(BlogFeedError::Empty);
    }

    Ok(feed
        .items
        .into_iter()
        .take(max_posts)
        .map(|value| {
            let item = serde_json::from_value::<FeedItem>(value).unwrap_or_else(|e| {
                warn!(error = %e, "Unreadable blog feed item, using defaults");
                FeedItem::default()
            });
            process_item(&item, site_url)
        })
        .collect())
}

/// Fetches and caches the latest posts from the blog site.
#[derive(Clone)]
pub struct BlogFeedClient {
    http: Client,
    site_url: String,
    max_posts: usize,
    cache: Cache<String, Vec<BlogPost>>,
}

impl BlogFeedClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

    pub fn new(site_url: impl Into<String>) -> Result<Self, BlogFeedError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            site_url: site_url.into().trim_end_matches('/').to_string(),
            max_posts: MAX_POSTS,
            cache: Cache::builder().time_to_live(CACHE_TTL).build(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/blog?format=json", self.site_url)
    }

    /// Latest posts, served from cache for an hour. Failures fall back to
    /// the bundled posts and are not cached.
    pub async fn latest_posts(&self) -> Vec<BlogPost> {
        let endpoint = self.endpoint();
        if let Some(posts) = self.cache.get(&endpoint).await {
            return posts;
        }

        match self.fetch_posts(&endpoint).await {
            Ok(posts) => {
                self.cache.insert(endpoint, posts.clone()).await;
                posts
            }
            Err(BlogFeedError::Empty) => {
                warn!("No blog posts found in the feed, using fallback posts");
                self.fallback()
            }
            Err(e) => {
                warn!(error = %e, "Error fetching blog posts, using fallback posts");
                self.fallback()
            }
        }
    }

    async fn fetch_posts(&self, endpoint: &str) -> Result<Vec<BlogPost>, BlogFeedError> {
        info!(endpoint, "Fetching blog posts");
        let res = self.http.get(endpoint).send().await?;

        if !res.status().is_success() {
            return Err(BlogFeedError::Http(res.status().as_u16()));
        }

        let feed = res.json::<FeedDocument>().await?;
        info!(count = feed.items.len(), "Fetched blog feed");
        posts_from_feed(feed, &self.site_url, self.max_posts)
    }

    fn fallback(&self) -> Vec<BlogPost> {
        BlogPost::fallback().into_iter().take(self.max_posts).collect()
    }
}
