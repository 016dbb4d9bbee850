use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One contiguous span of tracked work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub start: DateTime<Utc>,
    #[serde(default, with = "zero_time")]
    pub end: Option<DateTime<Utc>>,
}

impl Entry {
    pub fn open(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    pub fn in_progress(&self) -> bool {
        self.end.is_none()
    }

    /// Length of the span, measured up to `now` while the entry is still open
    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        self.end.unwrap_or(now) - self.start
    }
}

/// A named activity and its entry history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    /// Display handle, assigned once per run after loading. `None` until
    /// assigned, which is also how a project created during this run looks.
    #[serde(skip)]
    pub reference: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub archived: bool,
    pub created: DateTime<Utc>,
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.archived == other.archived
            && self.created == other.created
            && self.entries == other.entries
    }
}

impl Eq for Project {}

impl Project {
    pub fn new(id: i64, name: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            id,
            reference: None,
            name: name.into(),
            entries: Vec::new(),
            archived: false,
            created,
        }
    }

    pub fn last_entry(&self) -> Option<&Entry> {
        self.entries.last()
    }

    pub fn in_progress(&self) -> bool {
        self.last_entry().is_some_and(Entry::in_progress)
    }

    /// The number a user types to address this project
    pub fn reference(&self) -> i64 {
        self.reference.unwrap_or(self.id)
    }

    pub fn just_created(&self) -> bool {
        self.reference.is_none()
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        self.entries.push(Entry::open(now));
    }

    /// Close the open last entry. Returns false if there was nothing to close.
    pub fn stop(&mut self, now: DateTime<Utc>) -> bool {
        match self.entries.last_mut() {
            Some(entry) if entry.in_progress() => {
                entry.end = Some(now);
                true
            }
            _ => false,
        }
    }

    pub fn total_duration(&self, now: DateTime<Utc>) -> Duration {
        self.entries
            .iter()
            .fold(Duration::zero(), |acc, e| acc + e.duration(now))
    }

    /// Time from entries started in the same ISO week as `now`, judged in
    /// `now`'s time zone.
    pub fn this_week_duration<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Duration {
        let week = now.iso_week();
        let tz = now.timezone();
        let now_utc = now.with_timezone(&Utc);

        self.entries
            .iter()
            .filter(|e| e.start.with_timezone(&tz).iso_week() == week)
            .fold(Duration::zero(), |acc, e| acc + e.duration(now_utc))
    }

    /// Recency order: active before archived, then most recent last start
    /// first, then entry-less projects by newest creation.
    pub fn cmp_recency(&self, other: &Self) -> Ordering {
        self.archived.cmp(&other.archived).then_with(|| {
            match (self.last_entry(), other.last_entry()) {
                (Some(a), Some(b)) => b.start.cmp(&a.start),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => other.created.cmp(&self.created),
            }
        })
    }
}

/// Open entries are stored with the zero-value timestamp as their end.
mod zero_time {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    const ZERO: &str = "0001-01-01T00:00:00Z";
    const ZERO_UNIX_SECONDS: i64 = -62_135_596_800;

    pub fn serialize<S>(end: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match end {
            Some(t) => t.serialize(serializer),
            None => serializer.serialize_str(ZERO),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<DateTime<Utc>>::deserialize(deserializer)?;
        Ok(raw.filter(|t| t.timestamp() > ZERO_UNIX_SECONDS))
    }
}
