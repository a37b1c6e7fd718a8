//! Paginated listing responses.
//!
//! Listing operations return a [`ListResponse`] whose cursor type is the
//! listed item's identity type. The server never paginates today; `next`
//! is a protocol affordance for future use and its absence signals the
//! end of the listing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A value with a stable identity within its collection.
pub trait Identified {
    /// The identity type (also the pagination cursor type).
    ///
    /// Cursors travel on the wire, so identities must be cloneable,
    /// printable, and comparable.
    type Id: fmt::Display + fmt::Debug + Clone + PartialEq;

    /// The identity of this value.
    fn identity(&self) -> Self::Id;
}

/// An ordered page of listing results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize, T::Id: Serialize",
    deserialize = "T: Deserialize<'de>, T::Id: Deserialize<'de>"
))]
pub struct ListResponse<T: Identified> {
    /// The items in this page.
    pub results: Vec<T>,
    /// Identity of an item on a subsequent page; absent at end of listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<T::Id>,
}

impl<T: Identified> ListResponse<T> {
    /// A complete (unpaginated) listing.
    #[must_use]
    pub const fn new(results: Vec<T>) -> Self {
        Self {
            results,
            next: None,
        }
    }

    /// Attach a continuation cursor.
    #[must_use]
    pub fn with_next(mut self, next: T::Id) -> Self {
        self.next = Some(next);
        self
    }
}

/// Item identities joined with `", "`.
impl<T: Identified> fmt::Display for ListResponse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.results.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", item.identity())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
    }

    impl Identified for Item {
        type Id = String;

        fn identity(&self) -> String {
            self.name.clone()
        }
    }

    fn item(name: &str) -> Item {
        Item { name: name.into() }
    }

    #[test]
    fn next_is_omitted_when_absent() {
        let response = ListResponse::new(vec![item("a"), item("b")]);
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"results":[{"name":"a"},{"name":"b"}]}"#);
    }

    #[test]
    fn cursor_round_trips() {
        let response = ListResponse::new(vec![item("a")]).with_next("b".to_string());
        let json = serde_json::to_string(&response).unwrap();
        let back: ListResponse<Item> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.next.as_deref(), Some("b"));
    }

    #[test]
    fn display_joins_identities() {
        let response = ListResponse::new(vec![item("a"), item("b"), item("c")]);
        assert_eq!(response.to_string(), "a, b, c");
    }
}
