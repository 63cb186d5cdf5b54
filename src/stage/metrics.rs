// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for authorization decisions.
#[derive(Debug, Default)]
pub struct StageMetrics {
	requests: AtomicU64,
	bypassed: AtomicU64,
	authorized: AtomicU64,
	rejected: AtomicU64,
	missing: AtomicU64,
}
impl StageMetrics {
	/// Returns the total number of requests seen by the stage.
	pub fn requests(&self) -> u64 {
		self.requests.load(Ordering::Relaxed)
	}

	/// Returns the number of pre-flight requests forwarded without inspection.
	pub fn bypassed(&self) -> u64 {
		self.bypassed.load(Ordering::Relaxed)
	}

	/// Returns the number of requests forwarded with a validated identity.
	pub fn authorized(&self) -> u64 {
		self.authorized.load(Ordering::Relaxed)
	}

	/// Returns the number of rejected requests (including missing tokens).
	pub fn rejected(&self) -> u64 {
		self.rejected.load(Ordering::Relaxed)
	}

	/// Returns the number of requests rejected because no token was supplied.
	pub fn missing(&self) -> u64 {
		self.missing.load(Ordering::Relaxed)
	}

	pub(crate) fn record_request(&self) {
		self.requests.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_bypass(&self) {
		self.bypassed.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_authorized(&self) {
		self.authorized.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_rejected(&self, missing: bool) {
		self.rejected.fetch_add(1, Ordering::Relaxed);

		if missing {
			self.missing.fetch_add(1, Ordering::Relaxed);
		}
	}
}
