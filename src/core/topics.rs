use rand::Rng;
use rand::seq::IndexedRandom;
use std::path::Path;

use crate::error::TopicError;

/// Reference topics handed to the host as inspiration when it picks a
/// secret topic. Loaded once at startup and shared read-only across games.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTopics {
    topics: Vec<String>,
}

impl ReferenceTopics {
    /// Read a two-column `id,name` CSV. A header row whose first column is
    /// not numeric is skipped; rows without a second column are ignored.
    pub fn load(path: &Path) -> Result<Self, TopicError> {
        let contents = std::fs::read_to_string(path).map_err(|source| TopicError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let topics = parse_topics(&contents);
        if topics.is_empty() {
            return Err(TopicError::Empty(path.display().to_string()));
        }
        tracing::debug!(path = %path.display(), count = topics.len(), "loaded reference topics");
        Ok(Self { topics })
    }

    pub fn from_names<I, S>(names: I) -> Result<Self, TopicError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let topics: Vec<String> = names
            .into_iter()
            .map(Into::into)
            .filter(|name| !name.trim().is_empty())
            .collect();
        if topics.is_empty() {
            return Err(TopicError::Empty("<inline>".into()));
        }
        Ok(Self { topics })
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.topics
    }

    /// Fail early when a game could not draw `n` distinct topics.
    pub fn ensure_at_least(&self, n: usize) -> Result<(), TopicError> {
        if self.topics.len() < n {
            return Err(TopicError::Exhausted {
                requested: n,
                available: self.topics.len(),
            });
        }
        Ok(())
    }

    /// Draw `n` topics uniformly without replacement.
    pub fn sample(&self, n: usize) -> Result<Vec<String>, TopicError> {
        self.sample_with(&mut rand::rng(), n)
    }

    pub fn sample_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n: usize,
    ) -> Result<Vec<String>, TopicError> {
        self.ensure_at_least(n)?;
        Ok(self.topics.choose_multiple(rng, n).cloned().collect())
    }
}

fn parse_topics(contents: &str) -> Vec<String> {
    let mut topics = Vec::new();
    for (index, fields) in csv_records(contents).into_iter().enumerate() {
        let Some(name) = fields.get(1).map(|f| f.trim()) else {
            continue;
        };
        let is_header = index == 0
            && fields
                .first()
                .is_some_and(|id| id.trim().parse::<u64>().is_err());
        if is_header || name.is_empty() {
            continue;
        }
        topics.push(name.to_string());
    }
    topics
}

/// Split CSV text into records. Double-quoted fields may contain commas,
/// line breaks and `""` escapes. Blank lines produce no record.
fn csv_records(contents: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = contents.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
                push_record(&mut records, std::mem::take(&mut fields));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    push_record(&mut records, fields);
    records
}

fn push_record(records: &mut Vec<Vec<String>>, fields: Vec<String>) {
    if fields.iter().any(|f| !f.trim().is_empty()) {
        records.push(fields);
    }
}
