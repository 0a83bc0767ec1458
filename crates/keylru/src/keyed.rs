//! The one capability the cache needs from an item

/// An item that can name itself.
///
/// The returned key is used as the index key. It must be deterministic and
/// must not change while the item is stored in a cache; two logically
/// different items must not share a key.
///
/// ```
/// use keylru::Keyed;
///
/// struct User {
///     id: String,
///     name: String,
/// }
///
/// impl Keyed for User {
///     fn key(&self) -> &str {
///         &self.id
///     }
/// }
/// ```
pub trait Keyed {
    /// Stable identifier for this item
    fn key(&self) -> &str;
}

impl Keyed for String {
    fn key(&self) -> &str {
        self
    }
}

impl<T: Keyed + ?Sized> Keyed for Box<T> {
    fn key(&self) -> &str {
        (**self).key()
    }
}

impl<T: Keyed + ?Sized> Keyed for std::sync::Arc<T> {
    fn key(&self) -> &str {
        (**self).key()
    }
}
