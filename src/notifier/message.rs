//! Text of seat change alerts.

use crate::model::SeatCount;
use crate::model::SubscriberIds;

/// Size of the waitlist pool of every section.
pub const WAITLIST_SLOTS: u32 = 5;

/// Longest message content Discord accepts, in characters.
pub const MAX_MESSAGE_LEN: usize = 2000;

/// Mention tokens for all subscribers, in list order, split into space-joined
/// runs of at most `budget` characters. Empty if nobody watches.
pub fn mention_chunks(subscribers: &SubscriberIds, budget: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for id in subscribers.iter() {
        let tag = format!("<@{id}>");
        if !current.is_empty() && current.len() + 1 + tag.len() > budget {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&tag);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Describes the new seat state relative to the previous one.
pub fn describe_change(seats: SeatCount, previous: Option<SeatCount>) -> String {
    let previous = previous.map_or_else(|| "?".to_string(), |p| p.to_string());
    if let Some(filled) = seats.waitlisted() {
        format!(
            "now has {filled} of {WAITLIST_SLOTS} waitlist seats full, from {previous} seats previously!"
        )
    } else if let Some(open) = seats.open() {
        format!("now has {open} seats left, from {previous} seats previously!")
    } else {
        format!("is now full (no waitlist information), from {previous} seats previously!")
    }
}

/// Alert messages for one class; empty when there is nobody to tag.
///
/// Usually a single message. Subscribers that do not fit within
/// [`MAX_MESSAGE_LEN`] are tagged in further messages with the same text.
pub fn seat_change_messages(
    subject: &str,
    class_id: &str,
    subscribers: &SubscriberIds,
    seats: SeatCount,
    previous: Option<SeatCount>,
) -> Vec<String> {
    let body = format!(
        " :warning: Class {}#{class_id} {}",
        subject.to_uppercase(),
        describe_change(seats, previous)
    );
    mention_chunks(subscribers, MAX_MESSAGE_LEN - body.len())
        .into_iter()
        .map(|tags| format!("{tags}{body}"))
        .collect()
}
