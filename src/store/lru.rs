//! Bounded least-recently-used cache with a minimum retention window.
//!
//! Entries live in a slab (`Vec<Option<Slot>>` plus a free list) and are chained by slot
//! index into a recency list, most-recently-used at the head. Promotion and eviction are
//! O(1) and no slot is ever referenced by pointer.

// self
use crate::{_prelude::*, auth::Token, obs, store::CacheError};

const EVICTION_BATCH: usize = 50;

/// A cached token plus the instant it was inserted or last promoted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
	/// Cached request token pair.
	pub token: Token,
	/// Insertion or last-lookup instant; eviction measures age from here.
	pub touched_at: OffsetDateTime,
}

/// Thread-safe pending-token cache.
///
/// - [`put`](Self::put) replaces and promotes an existing identifier, otherwise inserts at the
///   head, evicting first when the cache is at capacity.
/// - [`get`](Self::get) promotes and re-stamps the entry but never removes it.
/// - Eviction removes up to 50 least-recently-used entries and stops right after removing one
///   younger than the minimum retention window. With a zero window a full cache is emptied
///   (up to the batch ceiling) before the next insert.
///
/// A single mutex guards all state and is held only for in-memory bookkeeping.
pub struct TokenCache {
	capacity: usize,
	min_retention: Duration,
	state: Mutex<LruState>,
}
impl TokenCache {
	/// Creates an empty cache.
	pub fn new(capacity: usize, min_retention: Duration) -> Self {
		Self { capacity, min_retention, state: Mutex::new(LruState::with_capacity(capacity)) }
	}

	/// Maximum number of entries.
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Minimum age an entry must reach before it can be evicted without ending the pass.
	pub fn min_retention(&self) -> Duration {
		self.min_retention
	}

	/// Current entry count.
	pub fn len(&self) -> usize {
		self.state.lock().index.len()
	}

	/// Returns `true` when no tokens are pending.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Stores a token stamped with the current clock.
	pub fn put(&self, token: Token) -> Result<(), CacheError> {
		self.put_at(token, OffsetDateTime::now_utc())
	}

	/// Stores a token stamped with `now`.
	pub fn put_at(&self, token: Token, now: OffsetDateTime) -> Result<(), CacheError> {
		let mut evicted = 0;
		let result = {
			let mut state = self.state.lock();

			if let Some(idx) = state.index.get(&token.token).copied() {
				state.replace(idx, token, now);

				Ok(())
			} else {
				if state.index.len() >= self.capacity {
					evicted = state.evict(now, self.min_retention);
				}

				if state.index.len() >= self.capacity {
					Err(CacheError::Full { capacity: self.capacity })
				} else {
					state.insert_front(CacheEntry { token, touched_at: now });

					Ok(())
				}
			}
		};

		if evicted > 0 {
			obs::record_cache_evictions(evicted);
		}

		result
	}

	/// Looks up a token and promotes it, stamping it with the current clock.
	pub fn get(&self, token: &str) -> Result<CacheEntry, CacheError> {
		self.get_at(token, OffsetDateTime::now_utc())
	}

	/// Looks up a token and promotes it, stamping it with `now`.
	pub fn get_at(&self, token: &str, now: OffsetDateTime) -> Result<CacheEntry, CacheError> {
		let mut state = self.state.lock();
		let idx = state
			.index
			.get(token)
			.copied()
			.ok_or_else(|| CacheError::NotFound { token: token.to_owned() })?;

		state.promote(idx, now);
		state.entry(idx).cloned().ok_or_else(|| CacheError::NotFound { token: token.to_owned() })
	}

	/// Peeks at the most-recently-used token without promoting it.
	pub fn most_recent(&self) -> Option<Token> {
		let state = self.state.lock();

		state.head.and_then(|idx| state.entry(idx)).map(|entry| entry.token.clone())
	}

	/// Peeks at the least-recently-used token without promoting it.
	pub fn least_recent(&self) -> Option<Token> {
		let state = self.state.lock();

		state.tail.and_then(|idx| state.entry(idx)).map(|entry| entry.token.clone())
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("capacity", &self.capacity)
			.field("min_retention", &self.min_retention)
			.field("len", &self.len())
			.finish()
	}
}

struct Slot {
	entry: CacheEntry,
	prev: Option<usize>,
	next: Option<usize>,
}

#[derive(Default)]
struct LruState {
	index: HashMap<String, usize>,
	slots: Vec<Option<Slot>>,
	free: Vec<usize>,
	head: Option<usize>,
	tail: Option<usize>,
}
impl LruState {
	fn with_capacity(capacity: usize) -> Self {
		// Pre-size modestly; huge capacities grow on demand.
		let hint = capacity.min(1024);

		Self {
			index: HashMap::with_capacity(hint),
			slots: Vec::with_capacity(hint),
			..Default::default()
		}
	}

	fn slot_mut(&mut self, idx: usize) -> Option<&mut Slot> {
		self.slots.get_mut(idx).and_then(Option::as_mut)
	}

	fn entry(&self, idx: usize) -> Option<&CacheEntry> {
		self.slots.get(idx).and_then(Option::as_ref).map(|slot| &slot.entry)
	}

	fn unlink(&mut self, idx: usize) {
		let Some((prev, next)) = self.slot_mut(idx).map(|slot| (slot.prev.take(), slot.next.take()))
		else {
			return;
		};

		match prev.and_then(|p| self.slot_mut(p)) {
			Some(slot) => slot.next = next,
			None => self.head = next,
		}
		match next.and_then(|n| self.slot_mut(n)) {
			Some(slot) => slot.prev = prev,
			None => self.tail = prev,
		}
	}

	fn push_front(&mut self, idx: usize) {
		let old_head = self.head;

		if let Some(slot) = self.slot_mut(idx) {
			slot.prev = None;
			slot.next = old_head;
		}

		match old_head.and_then(|h| self.slot_mut(h)) {
			Some(slot) => slot.prev = Some(idx),
			None => self.tail = Some(idx),
		}

		self.head = Some(idx);
	}

	fn promote(&mut self, idx: usize, now: OffsetDateTime) {
		if let Some(slot) = self.slot_mut(idx) {
			slot.entry.touched_at = now;
		}
		if self.head != Some(idx) {
			self.unlink(idx);
			self.push_front(idx);
		}
	}

	fn replace(&mut self, idx: usize, token: Token, now: OffsetDateTime) {
		if let Some(slot) = self.slot_mut(idx) {
			slot.entry.token = token;
		}

		self.promote(idx, now);
	}

	fn insert_front(&mut self, entry: CacheEntry) {
		let key = entry.token.token.clone();
		let slot = Slot { entry, prev: None, next: None };
		let idx = match self.free.pop() {
			Some(idx) => {
				self.slots[idx] = Some(slot);

				idx
			},
			None => {
				self.slots.push(Some(slot));

				self.slots.len() - 1
			},
		};

		self.index.insert(key, idx);
		self.push_front(idx);
	}

	fn pop_back(&mut self) -> Option<CacheEntry> {
		let idx = self.tail?;

		self.unlink(idx);

		let slot = self.slots.get_mut(idx)?.take()?;

		self.free.push(idx);
		self.index.remove(&slot.entry.token.token);

		Some(slot.entry)
	}

	/// Returns how many entries were removed.
	fn evict(&mut self, now: OffsetDateTime, min_retention: Duration) -> usize {
		let mut freed = 0;

		while freed < EVICTION_BATCH {
			let Some(entry) = self.pop_back() else {
				break;
			};

			freed += 1;

			// Oldest went first; a young tail means everything left is younger still.
			if now - entry.touched_at < min_retention {
				break;
			}
		}

		freed
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	const T0: OffsetDateTime = macros::datetime!(2025-11-10 12:00 UTC);

	fn token(id: usize) -> Token {
		Token::new(id.to_string(), format!("secret-{id}"))
	}

	fn fill(cache: &TokenCache, ids: std::ops::Range<usize>, now: OffsetDateTime) {
		for id in ids {
			cache.put_at(token(id), now).expect("Insert should find room.");
		}
	}

	fn recency(cache: &TokenCache) -> Vec<String> {
		let state = cache.state.lock();
		let mut order = Vec::new();
		let mut cursor = state.head;

		while let Some(idx) = cursor {
			let slot = state.slots[idx].as_ref().expect("Linked slots must be occupied.");

			order.push(slot.entry.token.token.clone());
			cursor = slot.next;
		}

		order
	}

	#[test]
	fn recency_list_tracks_inserts_and_lookups() {
		let cache = TokenCache::new(5, Duration::ZERO);

		fill(&cache, 0..5, T0);
		assert_eq!(recency(&cache), ["4", "3", "2", "1", "0"]);

		cache.get_at("2", T0).expect("Token 2 should be cached.");
		assert_eq!(recency(&cache), ["2", "4", "3", "1", "0"]);

		cache.get_at("0", T0).expect("Token 0 should be cached.");
		assert_eq!(recency(&cache), ["0", "2", "4", "3", "1"]);

		cache.get_at("0", T0).expect("Repeated lookups keep the token cached.");
		assert_eq!(recency(&cache), ["0", "2", "4", "3", "1"]);
	}

	#[test]
	fn freed_slots_are_reused() {
		let cache = TokenCache::new(2, Duration::hours(1));

		fill(&cache, 0..6, T0);

		assert_eq!(cache.state.lock().slots.len(), 2);
		assert_eq!(recency(&cache), ["5", "4"]);
	}

	#[test]
	fn lookup_restamps_the_entry() {
		let cache = TokenCache::new(2, Duration::minutes(5));
		let later = T0 + Duration::minutes(3);

		fill(&cache, 0..1, T0);

		let entry = cache.get_at("0", later).expect("Token 0 should be cached.");

		assert_eq!(entry.touched_at, later);
		assert_eq!(entry.token.secret.expose(), "secret-0");
	}

	#[test]
	fn eviction_stops_at_the_first_young_entry() {
		let cache = TokenCache::new(4, Duration::seconds(60));

		fill(&cache, 0..2, T0);
		fill(&cache, 2..4, T0 + Duration::seconds(90));

		// Tokens 0 and 1 are 100s old, 2 and 3 are 10s old: 0, 1, then 2 go.
		cache.put_at(token(4), T0 + Duration::seconds(100)).expect("Eviction should free room.");

		assert_eq!(recency(&cache), ["4", "3"]);
	}

	#[test]
	fn eviction_is_capped_per_pass() {
		let cache = TokenCache::new(120, Duration::ZERO);

		fill(&cache, 0..120, T0);
		cache.put_at(token(500), T0).expect("Eviction should free room.");

		assert_eq!(cache.len(), 120 - EVICTION_BATCH + 1);
		assert_eq!(cache.least_recent().map(|t| t.token), Some("50".into()));
	}

	#[test]
	fn reinserting_a_cached_token_replaces_it_in_place() {
		let cache = TokenCache::new(3, Duration::seconds(60));
		let later = T0 + Duration::seconds(30);

		fill(&cache, 0..3, T0);
		cache
			.put_at(Token::new("0", "rotated"), later)
			.expect("Replacing a cached token needs no room.");

		assert_eq!(cache.len(), 3);
		assert_eq!(recency(&cache), ["0", "2", "1"]);

		{
			let state = cache.state.lock();
			let entry = state.entry(state.index["0"]).expect("Token 0 should occupy a slot.");

			assert_eq!(entry.touched_at, later);
		}

		let entry = cache.get_at("0", later).expect("Token 0 should be cached.");

		assert_eq!(entry.token.secret.expose(), "rotated");
	}

	#[test]
	fn zero_capacity_reports_full() {
		let cache = TokenCache::new(0, Duration::ZERO);
		let err = cache.put_at(token(1), T0).expect_err("Zero-capacity caches cannot store tokens.");

		assert_eq!(err, CacheError::Full { capacity: 0 });
		assert!(cache.is_empty());
	}
}
