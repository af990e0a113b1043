//! Walking the provider's `{results, next}` page chain.

use serde_json::{Map, Value};

use crate::error::{FetchError, Result};
use crate::retriever::Retriever;

/// Accumulator fed with every record of a paginated endpoint.
pub trait RecordSink {
    /// Consumes one source record. Record-level problems are the sink's to
    /// log and swallow; they never abort the fetch.
    fn accept(&mut self, record: Map<String, Value>);
}

/// Counts reported after a completed fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub pages: usize,
    pub records: usize,
}

/// One decoded page envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub results: Vec<Value>,
    pub next: Option<String>,
}

impl Page {
    /// Validates the envelope shape. Both keys must be present; `next` may
    /// be null (or empty) on the last page.
    pub fn from_value(url: &str, value: Value) -> Result<Self> {
        let Value::Object(mut envelope) = value else {
            return Err(FetchError::malformed(url, "page is not a JSON object"));
        };
        let results = match envelope.remove("results") {
            Some(Value::Array(results)) => results,
            Some(_) => return Err(FetchError::malformed(url, "`results` is not an array")),
            None => return Err(FetchError::malformed(url, "missing `results`")),
        };
        let next = match envelope.remove("next") {
            Some(Value::Null) => None,
            Some(Value::String(next)) if next.trim().is_empty() => None,
            Some(Value::String(next)) => Some(next),
            Some(_) => return Err(FetchError::malformed(url, "`next` is not a string")),
            None => return Err(FetchError::malformed(url, "missing `next`")),
        };
        Ok(Self { results, next })
    }
}

/// Fetches every page starting at `start_url`, feeding records to `sink`
/// in page order and then source order.
///
/// Page `i` is requested under the cache name `filename_for(i)`. Any
/// retrieval or envelope error aborts the whole fetch.
pub fn fetch_all<S, F>(
    retriever: &dyn Retriever,
    start_url: &str,
    filename_for: F,
    sink: &mut S,
) -> Result<FetchStats>
where
    S: RecordSink + ?Sized,
    F: Fn(usize) -> String,
{
    let mut stats = FetchStats::default();
    let mut url = Some(start_url.to_string());
    while let Some(current) = url {
        let filename = filename_for(stats.pages);
        let document = retriever.download_json(&current, &filename)?;
        let page = Page::from_value(&current, document)?;
        tracing::debug!(
            page = stats.pages,
            records = page.results.len(),
            url = %current,
            "fetched page"
        );
        for record in page.results {
            match record {
                Value::Object(record) => {
                    stats.records += 1;
                    sink.accept(record);
                }
                other => {
                    tracing::warn!(page = stats.pages, value = %other, "skipping non-object record");
                }
            }
        }
        stats.pages += 1;
        url = page.next;
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn page_requires_both_keys() {
        assert!(Page::from_value("u", json!({"results": []})).is_err());
        assert!(Page::from_value("u", json!({"next": null})).is_err());
        assert!(Page::from_value("u", json!([])).is_err());
        assert!(Page::from_value("u", json!({"results": {}, "next": null})).is_err());
        assert!(Page::from_value("u", json!({"results": [], "next": 5})).is_err());

        let page = Page::from_value("u", json!({"results": [1], "next": ""})).unwrap();
        assert_eq!(page.next, None);
        assert_eq!(page.results.len(), 1);
    }
}
