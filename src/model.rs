//! Domain types shared by the store adapter, the seat checker and the bot.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Signed seat count of a class section.
///
/// Positive values are open seats, zero means the section is full, and a
/// negative value `-n` means `n` waitlist slots are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SeatCount(pub i32);

impl SeatCount {
    pub fn is_full(&self) -> bool {
        self.0 == 0
    }

    /// Number of filled waitlist slots, if the section is waitlisted.
    pub fn waitlisted(&self) -> Option<u32> {
        (self.0 < 0).then(|| self.0.unsigned_abs())
    }

    /// Number of open seats, if any are left.
    pub fn open(&self) -> Option<u32> {
        (self.0 > 0).then_some(self.0 as u32)
    }
}

impl fmt::Display for SeatCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SeatCount {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i32>().map(SeatCount)
    }
}

/// Result of looking up one class id on a section-listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassAvailability {
    Seats(SeatCount),
    NotFound,
}

impl ClassAvailability {
    pub fn seats(&self) -> Option<SeatCount> {
        match self {
            Self::Seats(seats) => Some(*seats),
            Self::NotFound => None,
        }
    }
}

/// Opaque handle to a persisted subscription row.
///
/// Only the store adapter knows how it maps onto a position in the remote
/// store; everything else passes it back untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowRef(u32);

impl RowRef {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    pub(crate) fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.0)
    }
}

/// Ordered, duplicate-free list of subscriber user ids.
///
/// Stored as a comma-joined string in the remote store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubscriberIds(Vec<String>);

impl SubscriberIds {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parses a comma-joined id list. Blank entries and repeats are dropped.
    pub fn parse(raw: &str) -> Self {
        let mut ids = Self::new();
        for id in raw.split(',') {
            ids.insert(id);
        }
        ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|e| e == id)
    }

    /// Appends `id` unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, id: &str) -> bool {
        let id = id.trim();
        if id.is_empty() || self.contains(id) {
            return false;
        }
        self.0.push(id.to_string());
        true
    }

    /// Removes `id` wherever it sits in the list. Returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let len = self.0.len();
        self.0.retain(|e| e != id);
        self.0.len() != len
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for SubscriberIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

impl<S: AsRef<str>> FromIterator<S> for SubscriberIds {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut ids = Self::new();
        for id in iter {
            ids.insert(id.as_ref());
        }
        ids
    }
}

/// One persisted subscription row: a watched (quarter, subject, class id)
/// with its subscribers and the last seat count seen for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscription {
    #[serde(skip)]
    pub row: RowRef,
    pub quarter: String,
    pub subject: String,
    pub class_id: String,
    pub subscribers: SubscriberIds,
    /// `None` when no successful fetch has been recorded yet.
    pub last_known_seats: Option<SeatCount>,
}

impl Subscription {
    pub fn group_key(&self) -> GroupKey {
        GroupKey::new(&self.quarter, &self.subject)
    }

    /// Whether this row tracks the given tuple. Comparison ignores case.
    pub fn matches(&self, quarter: &str, subject: &str, class_id: &str) -> bool {
        self.quarter.eq_ignore_ascii_case(quarter)
            && self.subject.eq_ignore_ascii_case(subject)
            && self.class_id == class_id
    }
}

/// A (quarter, subject) pair; one section-listing page exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub quarter: String,
    pub subject: String,
}

impl GroupKey {
    pub fn new(quarter: &str, subject: &str) -> Self {
        Self {
            quarter: quarter.trim().to_lowercase(),
            subject: subject.trim().to_lowercase(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.quarter.to_uppercase(),
            self.subject.to_uppercase()
        )
    }
}
