// std
use std::sync::Arc;
// crates.io
use time::Duration;
// self
use oauth1_broker::{
	auth::Token,
	store::{CacheError, TokenCache},
};

fn fill(cache: &TokenCache, count: usize) {
	for id in 0..count {
		cache
			.put(Token::new(format!("token-{id}"), format!("secret-{id}")))
			.expect("Insert should find room.");
	}
}

#[test]
fn young_entries_cap_the_cache_at_capacity() {
	let cache = TokenCache::new(4, Duration::seconds(1_000));

	fill(&cache, 10);

	assert_eq!(cache.len(), 4);
	assert_eq!(cache.most_recent().map(|t| t.token), Some("token-9".into()));
	assert_eq!(cache.least_recent().map(|t| t.token), Some("token-6".into()));
	assert!(matches!(cache.get("token-5"), Err(CacheError::NotFound { .. })));
}

#[test]
fn zero_retention_empties_a_full_cache_before_inserting() {
	let cache = TokenCache::new(4, Duration::ZERO);

	fill(&cache, 5);

	assert_eq!(cache.len(), 1);
	assert_eq!(cache.most_recent().map(|t| t.token), Some("token-4".into()));
}

#[test]
fn one_overflow_evicts_only_the_oldest_young_entry() {
	let cache = TokenCache::new(4, Duration::seconds(1_000));

	fill(&cache, 5);

	assert_eq!(cache.len(), 4);
	assert!(cache.get("token-0").is_err());
	assert!(cache.get("token-1").is_ok());
}

#[test]
fn lookups_protect_entries_from_eviction() {
	let cache = TokenCache::new(3, Duration::seconds(1_000));

	fill(&cache, 3);

	let entry = cache.get("token-0").expect("Token 0 should be cached.");

	assert_eq!(entry.token.secret.expose(), "secret-0");

	cache.put(Token::new("token-3", "secret-3")).expect("Insert should find room.");

	assert!(cache.get("token-0").is_ok());
	assert!(cache.get("token-1").is_err());
	assert_eq!(cache.len(), 3);
}

#[test]
fn concurrent_inserts_respect_capacity() {
	let cache = Arc::new(TokenCache::new(64, Duration::seconds(1_000)));
	let handles = (0..8)
		.map(|worker| {
			let cache = cache.clone();

			std::thread::spawn(move || {
				for id in 0..100 {
					cache
						.put(Token::new(format!("w{worker}-{id}"), "secret"))
						.expect("Insert should find room.");
				}
			})
		})
		.collect::<Vec<_>>();

	for handle in handles {
		handle.join().expect("Worker thread should not panic.");
	}

	assert_eq!(cache.len(), 64);
}

#[test]
fn lookups_move_tokens_to_the_front() {
	let cache = TokenCache::new(10, Duration::seconds(1_000));

	for id in 0..10 {
		cache.put(Token::new(id.to_string(), "secret")).expect("Insert should find room.");
	}

	assert_eq!(cache.most_recent().map(|t| t.token), Some("9".into()));
	assert_eq!(cache.least_recent().map(|t| t.token), Some("0".into()));

	cache.get("6").expect("Token 6 should be cached.");

	assert_eq!(cache.most_recent().map(|t| t.token), Some("6".into()));
	assert_eq!(cache.least_recent().map(|t| t.token), Some("0".into()));
}
