//! Conditional GETs against the FPL API.
//!
//! Bodies are remembered for the lifetime of the process only, keyed by URL,
//! so a repeat Generate can be answered with `304 Not Modified`. Every call
//! still goes to the server. The map holds at most `MAX_CACHE_ENTRIES` URLs
//! and is cleared when a new URL would exceed that.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};

const MAX_CACHE_ENTRIES: usize = 256;

static CACHE: Mutex<Option<HashMap<String, CacheEntry>>> = Mutex::new(None);

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
}

/// GETs `url` and returns the body, or `None` when the server answers 404.
pub fn fetch_json_cached(
    client: &Client,
    url: &str,
    extra_headers: &[(&str, &str)],
) -> Result<Option<String>> {
    let cached_entry = lookup(url);

    let mut req = client.get(url);
    for (name, value) in extra_headers {
        req = req.header(*name, *value);
    }
    if let Some(entry) = cached_entry.as_ref() {
        if let Some(etag) = entry.etag.as_ref() {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = entry.last_modified.as_ref() {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
    }

    let resp = req.send().context("request failed")?;
    let status = resp.status();
    let headers = resp.headers().clone();
    if status == StatusCode::NOT_MODIFIED {
        if let Some(entry) = cached_entry {
            return Ok(Some(entry.body));
        }
        return Err(anyhow!("received 304 without cache body"));
    }
    if status == StatusCode::NOT_FOUND {
        forget(url);
        return Ok(None);
    }

    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {}: {}", status, truncate(&body, 200)));
    }

    let etag = headers
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let last_modified = headers
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    if etag.is_some() || last_modified.is_some() {
        store(
            url,
            CacheEntry {
                body: body.clone(),
                etag,
                last_modified,
            },
        );
    }
    Ok(Some(body))
}

fn lookup(url: &str) -> Option<CacheEntry> {
    let guard = CACHE.lock().ok()?;
    guard.as_ref()?.get(url).cloned()
}

fn store(url: &str, entry: CacheEntry) {
    if let Ok(mut guard) = CACHE.lock() {
        let cache = guard.get_or_insert_with(HashMap::new);
        if cache.len() >= MAX_CACHE_ENTRIES && !cache.contains_key(url) {
            cache.clear();
        }
        cache.insert(url.to_string(), entry);
    }
}

fn forget(url: &str) {
    if let Ok(mut guard) = CACHE.lock()
        && let Some(cache) = guard.as_mut()
    {
        cache.remove(url);
    }
}

fn truncate(raw: &str, max_chars: usize) -> String {
    let mut out: String = raw.chars().take(max_chars).collect();
    if raw.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(body: &str) -> CacheEntry {
        CacheEntry {
            body: body.to_string(),
            etag: Some("\"v1\"".to_string()),
            last_modified: None,
        }
    }

    #[test]
    fn cache_stays_bounded_and_forgets() {
        for i in 0..MAX_CACHE_ENTRIES + 10 {
            store(&format!("https://cache.test/entry/{i}/"), entry("{}"));
            let len = CACHE
                .lock()
                .expect("cache lock")
                .as_ref()
                .map_or(0, |cache| cache.len());
            assert!(len <= MAX_CACHE_ENTRIES);
        }

        let url = "https://cache.test/entry/last/";
        store(url, entry("{\"current\":[]}"));
        assert_eq!(lookup(url).map(|e| e.body), Some("{\"current\":[]}".to_string()));
        forget(url);
        assert!(lookup(url).is_none());
    }

    #[test]
    fn truncate_marks_cut_bodies() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
