//! Reconciliation of stylesheet and script declarations collected across
//! all fragments of a page.
//!
//! Strategies receive the declarations in fetch-result order and return
//! the list that ends up in the composed page.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{Attributes, FetchResult};

pub trait DeduplicationStrategy: Send + Sync {
    fn deduplicate(&self, declarations: Vec<Attributes>) -> Vec<Attributes>;
}

/// Keeps every declaration as it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityDeduplicationStrategy;

impl DeduplicationStrategy for IdentityDeduplicationStrategy {
    fn deduplicate(&self, declarations: Vec<Attributes>) -> Vec<Attributes> {
        declarations
    }
}

/// Drops every declaration equal to an earlier one.
///
/// Equality is exact and order-sensitive over the attribute sequence:
/// `[rel, href]` and `[href, rel]` are different declarations.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleDeduplicationStrategy;

impl DeduplicationStrategy for SimpleDeduplicationStrategy {
    fn deduplicate(&self, declarations: Vec<Attributes>) -> Vec<Attributes> {
        let mut seen = HashSet::with_capacity(declarations.len());
        declarations
            .into_iter()
            .filter(|attrs| seen.insert(attrs.clone()))
            .collect()
    }
}

/// Strategy selection as it appears in the configuration file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeduplicationKind {
    Identity,
    #[default]
    Simple,
}

impl DeduplicationKind {
    pub fn strategy(self) -> Box<dyn DeduplicationStrategy> {
        match self {
            DeduplicationKind::Identity => Box::new(IdentityDeduplicationStrategy),
            DeduplicationKind::Simple => Box::new(SimpleDeduplicationStrategy),
        }
    }
}

/// Gather the stylesheets of all loaded results, in result order, and
/// reconcile them with `strategy`.
pub fn collect_stylesheets(
    results: &[FetchResult],
    strategy: &dyn DeduplicationStrategy,
) -> Vec<Attributes> {
    let stylesheets = results
        .iter()
        .filter_map(FetchResult::content)
        .flat_map(|content| content.stylesheets().iter().cloned())
        .collect();
    strategy.deduplicate(stylesheets)
}
