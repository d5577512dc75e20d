use indexmap::IndexMap;
use serde::Serialize;

/// A message received from the work queue.
///
/// `removal_token` is only valid for the receive call that produced it and has
/// to be handed back together with `id` when the item is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    pub id: String,
    pub removal_token: String,
    pub content: String,
}

impl QueueItem {
    pub fn new(
        id: impl Into<String>,
        removal_token: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            removal_token: removal_token.into(),
            content: content.into(),
        }
    }

    /// Key under which this item's summary is aggregated. Line feeds are
    /// dropped; nothing else is normalized.
    #[must_use]
    pub fn aggregation_key(&self) -> String {
        self.content.replace('\n', "")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub original_content: String,
    pub summary: String,
}

/// Summaries keyed by original content, iterated in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    entries: IndexMap<String, String>,
}

impl Aggregation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. An overwritten key keeps its original position.
    pub fn insert(&mut self, result: SummaryResult) {
        self.entries.insert(result.original_content, result.summary);
    }

    #[must_use]
    pub fn get(&self, original_content: &str) -> Option<&str> {
        self.entries.get(original_content).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn summaries(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for Aggregation
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut aggregation = Aggregation::new();
        for (content, summary) in iter {
            aggregation.insert(SummaryResult {
                original_content: content.into(),
                summary: summary.into(),
            });
        }
        aggregation
    }
}

/// What one processor run did, for logging and the trigger response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub acquired: usize,
    pub summarized: usize,
    pub failed: usize,
    pub removed: usize,
    pub removal_failures: usize,
    pub skipped_removals: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub text: String,
    pub entries: usize,
}

impl Digest {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub stats: BatchStats,
    /// `None` when the queue had nothing to hand out.
    pub digest: Option<Digest>,
}

/// Returned to the trigger after each invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: String,
    #[serde(flatten)]
    pub stats: BatchStats,
    pub delivered: bool,
}
