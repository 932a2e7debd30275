//! Crawl frontier: FIFO queue of discovered URLs plus a seen set
//!
//! URLs are normalized (fragment stripped) before they enter the seen
//! set, so `page#a` and `page#b` are one fetch. The seen set is
//! updated at enqueue time, which guarantees no URL is fetched twice
//! in one run. Queue order is discovery order only.

use std::collections::{HashSet, VecDeque};
use url::Url;

/// Strips the fragment; two URLs differing only by fragment are the
/// same resource
pub fn normalize(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}

#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<Url>,
    seen: HashSet<String>,
    allowed_hosts: Option<HashSet<String>>,
}

impl Frontier {
    /// Creates a frontier; `allowed_hosts` of `None` leaves the crawl
    /// unbounded
    pub fn new(allowed_hosts: Option<HashSet<String>>) -> Self {
        Self {
            queue: VecDeque::new(),
            seen: HashSet::new(),
            allowed_hosts,
        }
    }

    /// Seeds the start URL, bypassing host scoping
    pub fn seed(&mut self, url: Url) {
        let url = normalize(url);
        if self.seen.insert(url.to_string()) {
            self.queue.push_back(url);
        }
    }

    /// Whether a link's host is within the configured crawl scope
    ///
    /// A host matches with or without its port: with
    /// `allowed_hosts = {"example.com"}`, both `example.com` and
    /// `example.com:8080` are in scope.
    pub fn in_scope(&self, url: &Url) -> bool {
        let Some(allowed) = &self.allowed_hosts else {
            return true;
        };
        let Some(host) = url.host_str() else {
            return false;
        };
        if allowed.contains(host) {
            return true;
        }
        match url.port() {
            Some(port) => allowed.contains(&format!("{host}:{port}")),
            None => false,
        }
    }

    /// Enqueues an unseen, in-scope URL; returns whether it was added
    pub fn push(&mut self, url: Url) -> bool {
        if !self.in_scope(&url) {
            return false;
        }
        let url = normalize(url);
        if !self.seen.insert(url.to_string()) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    /// Marks a URL seen without queueing it (document candidates are
    /// acquired, not traversed); returns whether it was newly seen
    pub fn mark_seen(&mut self, url: &Url) -> bool {
        self.seen.insert(normalize(url.clone()).to_string())
    }

    pub fn pop(&mut self) -> Option<Url> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
