//! Documentation served from a remote origin: version list, per-version menu
//! and markdown pages, each behind an in-process [`TtlLruCache`].

mod cache;
mod markdown;

use std::{cmp::Ordering, time::Duration};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{config::DocsConfig, error::AppError};

pub use cache::TtlLruCache;
pub use markdown::{Heading, slugify, split_front_matter, table_of_contents};

const ONE_DAY: Duration = Duration::from_secs(60 * 60 * 24);
const NO_CACHE_TTL: Duration = Duration::from_millis(1);
const DOC_CAPACITY: usize = 300;
const MENU_CAPACITY: usize = 10;
const VERSIONS_CAPACITY: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocAttributes {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDoc {
    pub attrs: DocAttributes,
    #[serde(default)]
    pub children: Vec<MenuDoc>,
    pub filename: String,
    #[serde(default)]
    pub has_content: bool,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Doc {
    pub attrs: DocAttributes,
    pub filename: String,
    pub slug: String,
    pub markdown: String,
    pub headings: Vec<Heading>,
}

pub struct DocsService {
    client: Client,
    base_url: String,
    versions: TtlLruCache<Vec<String>>,
    menus: TtlLruCache<Vec<MenuDoc>>,
    docs: TtlLruCache<Doc>,
}

impl DocsService {
    pub fn new(base_url: impl Into<String>, no_cache: bool) -> Self {
        let ttl = if no_cache { NO_CACHE_TTL } else { ONE_DAY };
        let allow_stale = !no_cache;
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            versions: TtlLruCache::new(VERSIONS_CAPACITY, ttl, allow_stale),
            menus: TtlLruCache::new(MENU_CAPACITY, ttl, allow_stale),
            docs: TtlLruCache::new(DOC_CAPACITY, ttl, allow_stale),
        }
    }

    pub fn from_config(cfg: &DocsConfig) -> Self {
        Self::new(cfg.base_url.clone(), cfg.no_cache)
    }

    /// Newest first.
    pub async fn versions(&self) -> Result<Vec<String>, AppError> {
        self.versions
            .fetch("versions", || async {
                let url = format!("{}/documentation/__autogenerated__/versions.json", self.base_url);
                let mut versions: Vec<String> = self.get_json(&url, "versions").await?;
                sort_versions(&mut versions);
                Ok(versions)
            })
            .await
    }

    pub async fn menu(&self, lang: &str, version: &str) -> Result<Vec<MenuDoc>, AppError> {
        let key = format!("{lang}/{version}");
        self.menus
            .fetch(&key, || async {
                let url = format!(
                    "{}/documentation/__autogenerated__/{version}/{lang}.json",
                    self.base_url
                );
                let mut menu: Vec<MenuDoc> = self.get_json(&url, "menu").await?;
                sort_menu(&mut menu);
                Ok(menu)
            })
            .await
    }

    pub async fn doc(&self, lang: &str, version: &str, path: &str) -> Result<Doc, AppError> {
        let path = path.trim_matches('/');
        let key = format!("{lang}/{version}/{path}");
        self.docs
            .fetch(&key, || async {
                let filename = format!("{path}.md");
                let url = format!("{}/documentation/{lang}/{version}/{filename}", self.base_url);
                let response = self.client.get(&url).send().await.map_err(|err| {
                    AppError::internal(format!("docs request failed: {err}"))
                })?;
                if !response.status().is_success() {
                    return Err(AppError::not_found(format!("Could not find {filename}")));
                }
                let text = response
                    .text()
                    .await
                    .map_err(|err| AppError::internal(format!("docs body read failed: {err}")))?;
                Ok(parse_doc(&text, &filename, path))
            })
            .await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        what: &str,
    ) -> Result<T, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| AppError::internal(format!("docs request failed: {err}")))?;
        if !response.status().is_success() {
            return Err(AppError::internal(format!(
                "Failed to fetch {what}: {}",
                response.status().as_u16()
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| AppError::internal(format!("invalid {what} payload: {err}")))
    }
}

pub fn parse_doc(text: &str, filename: &str, slug: &str) -> Doc {
    let (front_matter, body) = split_front_matter(text);
    Doc {
        attrs: doc_attributes(front_matter, filename),
        filename: filename.to_string(),
        slug: slug.to_string(),
        headings: table_of_contents(body),
        markdown: body.to_string(),
    }
}

/// Reads the known keys one by one so a badly typed value only loses itself.
/// The title falls back to the filename; everything else lands in `extra`.
fn doc_attributes(mut front_matter: Map<String, Value>, filename: &str) -> DocAttributes {
    let title = match front_matter.remove("title") {
        Some(Value::String(title)) if !title.trim().is_empty() => title,
        Some(value @ (Value::Number(_) | Value::Bool(_))) => value.to_string(),
        _ => filename.to_string(),
    };
    let order = front_matter.remove("order").and_then(|value| {
        let order = value.as_f64();
        if order.is_none() {
            tracing::debug!(filename, %value, "ignoring non-numeric doc order");
        }
        order
    });
    let new = front_matter.remove("new").and_then(|value| value.as_bool());

    DocAttributes {
        title,
        order,
        new,
        extra: front_matter,
    }
}

fn version_parts(version: &str) -> [u64; 3] {
    let mut parts = [0; 3];
    let trimmed = version.strip_prefix('v').unwrap_or(version);
    for (slot, raw) in parts.iter_mut().zip(trimmed.split('.')) {
        *slot = raw.parse().unwrap_or(0);
    }
    parts
}

/// Semantic order, newest first: `v1.15.2` sorts before `v1.1.12`.
pub fn sort_versions(versions: &mut [String]) {
    versions.sort_by(|a, b| version_parts(b).cmp(&version_parts(a)));
}

fn by_order(a: &MenuDoc, b: &MenuDoc) -> Ordering {
    let key = |doc: &MenuDoc| doc.attrs.order.filter(|order| *order != 0.0).unwrap_or(f64::INFINITY);
    key(a).total_cmp(&key(b))
}

/// Categories and their children by `attrs.order`, unordered entries last.
pub fn sort_menu(menu: &mut [MenuDoc]) {
    menu.sort_by(by_order);
    for category in menu.iter_mut() {
        category.children.sort_by(by_order);
    }
}
