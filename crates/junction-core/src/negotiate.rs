//! Bidirectional content negotiation.
//!
//! The produce side ranks what the client requested against what a route
//! declares it can emit; the consume side checks a request content type
//! against what a route declares it can read.
//!
//! # Example
//!
//! ```
//! use junction_core::{negotiate_produces, MediaType};
//!
//! // An exact request entry outranks a wildcard one even at lower quality.
//! let accept = MediaType::parse_list("text/*, application/json;q=0.5").unwrap();
//! let produces = vec![MediaType::plain(), MediaType::json()];
//! let chosen = negotiate_produces(&accept, &produces).unwrap();
//! assert_eq!(chosen, MediaType::json());
//! ```

use std::cmp::Ordering;

use crate::media_type::{MediaType, Specificity};

/// How well one requested entry matches a producible type.
#[derive(Clone, Copy)]
struct Rank {
    specificity: Specificity,
    quality: f32,
    position: usize,
}

impl Rank {
    /// Specificity first, then quality, then header position.
    fn beats(self, other: Rank) -> bool {
        if self.specificity != other.specificity {
            return self.specificity > other.specificity;
        }
        match self.quality.partial_cmp(&other.quality) {
            Some(Ordering::Greater) => return true,
            Some(Ordering::Less) => return false,
            _ => {}
        }
        self.position < other.position
    }
}

/// Pick the media type a route should produce for a request.
///
/// Every producible type is scored by the best requested entry that
/// matches it; the producible type with the best score wins, and the
/// route's declaration order breaks remaining ties. An empty accepted
/// list means the client takes anything, so the first producible type
/// wins outright. Returns `None` when the route produces nothing or no
/// requested entry matches anything producible.
#[must_use]
pub fn negotiate_produces(accepted: &[MediaType], producible: &[MediaType]) -> Option<MediaType> {
    if producible.is_empty() {
        return None;
    }
    if accepted.is_empty() {
        return Some(producible[0].clone());
    }

    let mut best: Option<(Rank, usize)> = None;
    for (index, candidate) in producible.iter().enumerate() {
        let Some(rank) = best_accept_rank(accepted, candidate) else {
            continue;
        };
        let improves = match best {
            None => true,
            Some((current, _)) => rank.beats(current),
        };
        if improves {
            best = Some((rank, index));
        }
    }
    best.map(|(_, index)| producible[index].clone())
}

/// Score a producible type against the requested entries.
fn best_accept_rank(accepted: &[MediaType], candidate: &MediaType) -> Option<Rank> {
    let mut best: Option<Rank> = None;
    for (position, requested) in accepted.iter().enumerate() {
        if !requested.matches(candidate) {
            continue;
        }
        let rank = Rank {
            specificity: requested.specificity(),
            quality: requested.quality(),
            position,
        };
        let improves = match best {
            None => true,
            Some(current) => rank.beats(current),
        };
        if improves {
            best = Some(rank);
        }
    }
    best
}

/// Whether a request content type is acceptable to a route.
///
/// An empty consumable list accepts any content type; otherwise any
/// structural match admits the request.
#[must_use]
pub fn accepts(content_type: &MediaType, consumable: &[MediaType]) -> bool {
    consumable.is_empty() || consumable.iter().any(|c| c.matches(content_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(input: &str) -> Vec<MediaType> {
        MediaType::parse_list(input).unwrap()
    }

    #[test]
    fn exact_request_picks_matching_producible() {
        let chosen = negotiate_produces(
            &list("text/html"),
            &[MediaType::json(), MediaType::html()],
        );
        assert_eq!(chosen, Some(MediaType::html()));
    }

    #[test]
    fn specificity_trumps_quality() {
        // text/* has full quality but application/json is more specific.
        let chosen = negotiate_produces(
            &list("text/*, application/json;q=0.5"),
            &[MediaType::plain(), MediaType::json()],
        );
        assert_eq!(chosen, Some(MediaType::json()));
    }

    #[test]
    fn quality_breaks_equal_specificity() {
        let chosen = negotiate_produces(
            &list("application/json;q=1.0, text/html;q=0.8"),
            &[MediaType::html(), MediaType::json()],
        );
        assert_eq!(chosen, Some(MediaType::json()));
    }

    #[test]
    fn header_position_breaks_remaining_ties() {
        // Both requested entries are exact with default quality; the one
        // listed first in the header wins even though the route declares
        // json first.
        let chosen = negotiate_produces(
            &list("text/html, application/json"),
            &[MediaType::json(), MediaType::html()],
        );
        assert_eq!(chosen, Some(MediaType::html()));
    }

    #[test]
    fn declaration_order_breaks_full_ties() {
        let chosen = negotiate_produces(
            &list("*/*"),
            &[MediaType::html(), MediaType::json()],
        );
        assert_eq!(chosen, Some(MediaType::html()));
    }

    #[test]
    fn empty_accept_takes_first_producible() {
        let chosen = negotiate_produces(&[], &[MediaType::json(), MediaType::html()]);
        assert_eq!(chosen, Some(MediaType::json()));
    }

    #[test]
    fn empty_producible_is_none() {
        assert_eq!(negotiate_produces(&list("text/html"), &[]), None);
    }

    #[test]
    fn no_overlap_is_none() {
        let chosen = negotiate_produces(&list("image/png"), &[MediaType::html()]);
        assert_eq!(chosen, None);
    }

    #[test]
    fn wildcard_request_matches_any_producible() {
        let chosen = negotiate_produces(&list("*/*;q=0.1"), &[MediaType::octet_stream()]);
        assert_eq!(chosen, Some(MediaType::octet_stream()));
    }

    // ==== Consume side ====

    #[test]
    fn empty_consumable_accepts_anything() {
        assert!(accepts(&MediaType::octet_stream(), &[]));
    }

    #[test]
    fn consumable_match_is_structural() {
        let consumable = vec![MediaType::json(), MediaType::form()];
        assert!(accepts(&MediaType::json(), &consumable));
        assert!(!accepts(&MediaType::html(), &consumable));
    }

    #[test]
    fn wildcard_consumable_accepts_anything() {
        let consumable = vec![MediaType::any()];
        assert!(accepts(&MediaType::new("image", "png"), &consumable));
    }
}
