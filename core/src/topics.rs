use serde::Deserialize;
use serde::Serialize;

/// Label of the sentinel option that lifts the topic constraint.
pub const ALL_TOPICS_LABEL: &str = "All";

/// Categories recognized out of the box, in display order.
const BUILTIN_TOPICS: [&str; 5] = [
    "AI & Machine Learning",
    "Decentralized Finance",
    "Quantum Computing",
    "Biotechnology",
    "Renewable Energy",
];

/// Topic constraint applied to the displayed list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TopicFilter {
    /// No constraint; the `All` sentinel.
    #[default]
    All,
    /// Restrict to one category label.
    Topic(String),
}

impl TopicFilter {
    /// The sentinel label maps to [`TopicFilter::All`]; anything else is a
    /// category.
    pub fn from_label(label: &str) -> Self {
        if label == ALL_TOPICS_LABEL {
            TopicFilter::All
        } else {
            TopicFilter::Topic(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TopicFilter::All => ALL_TOPICS_LABEL,
            TopicFilter::Topic(topic) => topic,
        }
    }

    /// The category to constrain on, or `None` for the sentinel.
    pub fn constraint(&self) -> Option<&str> {
        match self {
            TopicFilter::All => None,
            TopicFilter::Topic(topic) => Some(topic),
        }
    }

    pub fn matches(&self, topic: &str) -> bool {
        match self {
            TopicFilter::All => true,
            TopicFilter::Topic(selected) => selected == topic,
        }
    }
}

/// The set of selectable categories. Kept as data so a deployment can swap
/// the list without touching dispatch logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCatalog {
    labels: Vec<String>,
}

impl TopicCatalog {
    pub fn builtin() -> Self {
        Self::from_labels(BUILTIN_TOPICS)
    }

    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|known| known == label)
    }

    /// Selector options in display order: the sentinel first, then every
    /// category.
    pub fn selector_options(&self) -> Vec<TopicFilter> {
        std::iter::once(TopicFilter::All)
            .chain(
                self.labels
                    .iter()
                    .map(|label| TopicFilter::Topic(label.clone())),
            )
            .collect()
    }
}
