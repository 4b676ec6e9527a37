//! Configuration values that may be computed late
//!
//! A repository is configured before anything is published, and some of its
//! values (a URL from the environment, tenant ids derived from the build) are
//! only known later. [`Property`] and [`ListProperty`] hold either concrete
//! values or closures, and are only read when a publisher snapshot is taken.

use std::fmt;
use std::sync::Arc;

type Deferred<T> = Arc<dyn Fn() -> Option<T> + Send + Sync>;
type DeferredList<T> = Arc<dyn Fn() -> Vec<T> + Send + Sync>;

/// A single, possibly deferred, optional value
pub enum Property<T> {
    Unset,
    Value(T),
    Deferred(Deferred<T>),
}

impl<T: Clone> Property<T> {
    /// Set a concrete value
    pub fn set(&mut self, value: impl Into<T>) {
        *self = Property::Value(value.into());
    }

    /// Set a value computed when the property is read
    pub fn set_deferred<F>(&mut self, f: F)
    where
        F: Fn() -> Option<T> + Send + Sync + 'static,
    {
        *self = Property::Deferred(Arc::new(f));
    }

    pub fn unset(&mut self) {
        *self = Property::Unset;
    }

    /// Read the current value, evaluating a deferred value now
    pub fn get(&self) -> Option<T> {
        match self {
            Property::Unset => None,
            Property::Value(v) => Some(v.clone()),
            Property::Deferred(f) => f(),
        }
    }

    /// Whether a value or a computation has been configured
    pub fn is_configured(&self) -> bool {
        !matches!(self, Property::Unset)
    }
}

impl<T> Default for Property<T> {
    fn default() -> Self {
        Property::Unset
    }
}

impl<T> Clone for Property<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Property::Unset => Property::Unset,
            Property::Value(v) => Property::Value(v.clone()),
            Property::Deferred(f) => Property::Deferred(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Unset => f.write_str("Unset"),
            Property::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Property::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

enum ListItem<T> {
    Value(T),
    Deferred(DeferredList<T>),
}

impl<T: Clone> Clone for ListItem<T> {
    fn clone(&self) -> Self {
        match self {
            ListItem::Value(v) => ListItem::Value(v.clone()),
            ListItem::Deferred(f) => ListItem::Deferred(Arc::clone(f)),
        }
    }
}

/// An ordered, appendable list whose elements may be deferred
///
/// Empty by default. Order of `add` calls is preserved when read.
pub struct ListProperty<T> {
    items: Vec<ListItem<T>>,
}

impl<T: Clone> ListProperty<T> {
    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// Replace the contents with concrete values
    pub fn set<I>(&mut self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<T>,
    {
        self.items = values
            .into_iter()
            .map(|v| ListItem::Value(v.into()))
            .collect();
    }

    /// Append one value
    pub fn add(&mut self, value: impl Into<T>) {
        self.items.push(ListItem::Value(value.into()));
    }

    /// Append values computed when the list is read
    pub fn add_deferred<F>(&mut self, f: F)
    where
        F: Fn() -> Vec<T> + Send + Sync + 'static,
    {
        self.items.push(ListItem::Deferred(Arc::new(f)));
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Read the list, evaluating deferred parts now
    pub fn get(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.items.len());
        for item in &self.items {
            match item {
                ListItem::Value(v) => out.push(v.clone()),
                ListItem::Deferred(f) => out.extend(f()),
            }
        }
        out
    }
}

impl<T: Clone> Default for ListProperty<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Clone> Clone for ListProperty<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ListProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for item in &self.items {
            match item {
                ListItem::Value(v) => list.entry(v),
                ListItem::Deferred(_) => list.entry(&format_args!("..")),
            };
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_property_lifecycle() {
        let mut prop: Property<String> = Property::default();
        assert!(!prop.is_configured());
        assert_eq!(prop.get(), None);

        prop.set("https://example.com");
        assert_eq!(prop.get().as_deref(), Some("https://example.com"));

        prop.unset();
        assert_eq!(prop.get(), None);
    }

    #[test]
    fn test_deferred_property_is_read_late() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut prop: Property<String> = Property::default();
        prop.set_deferred(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Some("computed".to_string())
        });

        assert!(prop.is_configured());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(prop.get().as_deref(), Some("computed"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_list_property_preserves_order() {
        let mut list: ListProperty<String> = ListProperty::empty();
        assert!(list.get().is_empty());

        list.add("org1");
        list.add_deferred(|| vec!["space1".to_string(), "team".to_string()]);
        list.add("last");

        assert_eq!(list.get(), vec!["org1", "space1", "team", "last"]);
    }

    #[test]
    fn test_list_property_set_replaces() {
        let mut list: ListProperty<String> = ListProperty::empty();
        list.add("old");
        list.set(["a", "b"]);
        assert_eq!(list.get(), vec!["a", "b"]);

        list.clear();
        assert!(list.get().is_empty());
    }
}
