//! Process-wide shared context
//!
//! A typed registry mapping string tags to shared values. Handlers are
//! short-lived, so any state that must outlive a single request (rate-limit
//! tables, mail transports, ...) is registered here under a well-known tag.
//!
//! Values are never replaced or removed once stored. Lookups and inserts
//! are serialized by a single lock, so a concurrent "get or create" runs
//! the constructor exactly once per tag.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::prelude::*;

/// A context key that also fixes the type of the value stored under it
pub struct Tag<T> {
	name: &'static str,
	_type: PhantomData<fn() -> T>,
}

impl<T> Tag<T> {
	pub const fn new(name: &'static str) -> Self {
		Self { name, _type: PhantomData }
	}

	pub const fn name(&self) -> &'static str {
		self.name
	}
}

impl<T> Clone for Tag<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for Tag<T> {}

impl<T> fmt::Debug for Tag<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Tag").field(&self.name).finish()
	}
}

type Entry = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct SharedContext {
	map: Mutex<HashMap<&'static str, Entry>>,
}

impl SharedContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Get the value stored under `tag`, if any
	pub fn get<T: Send + Sync + 'static>(&self, tag: &Tag<T>) -> PcResult<Option<Arc<T>>> {
		let map = self.map.lock();
		map.get(tag.name).map(|entry| downcast(tag, entry)).transpose()
	}

	/// Store a value under an empty tag
	///
	/// Fails with `ContextOccupied` if the tag already holds a value; the
	/// stored value is left untouched.
	pub fn set<T: Send + Sync + 'static>(&self, tag: &Tag<T>, value: T) -> PcResult<Arc<T>> {
		let mut map = self.map.lock();
		if map.contains_key(tag.name) {
			return Err(Error::ContextOccupied { tag: tag.name });
		}
		let value = Arc::new(value);
		map.insert(tag.name, value.clone());
		Ok(value)
	}

	/// Get the value under `tag`, constructing it with `init` on first use
	///
	/// `init` runs with the registry locked and must not access the context.
	pub fn get_or_init<T, F>(&self, tag: &Tag<T>, init: F) -> PcResult<Arc<T>>
	where
		T: Send + Sync + 'static,
		F: FnOnce() -> T,
	{
		let mut map = self.map.lock();
		if let Some(entry) = map.get(tag.name) {
			return downcast(tag, entry);
		}
		debug!("Creating shared context entry {}", tag.name);
		let value = Arc::new(init());
		map.insert(tag.name, value.clone());
		Ok(value)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.map.lock().contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.map.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.map.lock().is_empty()
	}
}

impl fmt::Debug for SharedContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut tags: Vec<&str> = self.map.lock().keys().copied().collect();
		tags.sort_unstable();
		f.debug_struct("SharedContext").field("tags", &tags).finish()
	}
}

fn downcast<T: Send + Sync + 'static>(tag: &Tag<T>, entry: &Entry) -> PcResult<Arc<T>> {
	entry.clone().downcast::<T>().map_err(|_| Error::ContextTypeMismatch { tag: tag.name })
}


// vim: ts=4
