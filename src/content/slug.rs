//! Slug derivation and collision-free allocation for new posts

use std::future::Future;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::backend::BackendError;

/// Upper bound on `-N` suffixes tried before giving up
pub const MAX_SUFFIX: u32 = 10_000;

lazy_static! {
    static ref NON_SLUG_RUN: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

#[derive(Error, Debug)]
pub enum SlugError {
    /// The existence check could not answer. The slug is NOT assumed free.
    #[error("slug lookup failed for {slug:?}: {source}")]
    LookupFailed {
        slug: String,
        #[source]
        source: BackendError,
    },

    #[error("title {0:?} has no characters usable in a slug")]
    EmptyTitle(String),

    #[error("no free slug for {base:?} after {tried} suffixes")]
    Exhausted { base: String, tried: u32 },
}

/// Turn a title into its base slug.
///
/// Lowercases, decomposes to NFD and drops the combining marks
/// (U+0300..=U+036F), then collapses every run of characters outside
/// `[a-z0-9]` into a single `-` and trims hyphens at both ends. Nothing is
/// transliterated: `ß`, emoji and non-Latin scripts become separators.
///
/// ```
/// use achando_oferta::content::slug::normalize;
/// assert_eq!(normalize("São Paulo!!"), "sao-paulo");
/// ```
pub fn normalize(title: &str) -> String {
    let stripped: String = title
        .to_lowercase()
        .nfd()
        .filter(|c| !('\u{300}'..='\u{36f}').contains(c))
        .collect();
    NON_SLUG_RUN
        .replace_all(&stripped, "-")
        .trim_matches('-')
        .to_string()
}

/// Allocate a slug for `title` that `exists` reports as free.
///
/// Probes `base`, then `base-1`, `base-2`, ... one at a time; each probe is
/// awaited before the next one is issued. A failing lookup aborts the
/// allocation with [`SlugError::LookupFailed`].
pub async fn allocate<F, Fut>(title: &str, mut exists: F) -> Result<String, SlugError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, BackendError>>,
{
    let base = normalize(title);
    if base.is_empty() {
        return Err(SlugError::EmptyTitle(title.to_string()));
    }

    if !probe(&mut exists, base.clone()).await? {
        return Ok(base);
    }

    for n in 1..=MAX_SUFFIX {
        let candidate = format!("{}-{}", base, n);
        if !probe(&mut exists, candidate.clone()).await? {
            tracing::debug!("Slug {:?} taken, using {:?}", base, candidate);
            return Ok(candidate);
        }
    }

    Err(SlugError::Exhausted {
        base,
        tried: MAX_SUFFIX,
    })
}

async fn probe<F, Fut>(exists: &mut F, slug: String) -> Result<bool, SlugError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, BackendError>>,
{
    exists(slug.clone())
        .await
        .map_err(|source| SlugError::LookupFailed { slug, source })
}
