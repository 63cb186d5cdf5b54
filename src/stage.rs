//! Per-request authorization gate.
//!
//! [`AuthorizationStage::authorize`] decides, for one request, whether it may proceed:
//!
//! 1. Pre-flight requests bypass the gate unless the specification sets `auth_options`.
//! 2. The token is read from the `Bearer` scheme of the configured header, falling back to the
//!    configured query parameter only when `allow_param` is set.
//! 3. The token is validated; on success the
//!    [`ValidatedIdentity`](crate::manager::ValidatedIdentity) is attached to the request.
//!
//! Enable the `tower` feature for [`AuthorizationLayer`], which applies the stage to
//! `http::Request` services and answers rejections with `401 Unauthorized`.

#[cfg(feature = "tower")] mod layer;
mod metrics;
mod request;

#[cfg(feature = "tower")] pub use layer::*;
pub use metrics::*;
pub use request::*;

// self
#[cfg(feature = "http")] use crate::manager::ValidatedIdentity;
use crate::{
	_prelude::*,
	manager::TokenManager,
	obs::{self, OpKind, OpOutcome, OpSpan},
};

const BEARER_SCHEME: &str = "Bearer";

/// Outcome of authorizing one request.
#[derive(Debug)]
pub enum Decision {
	/// Pre-flight request forwarded without inspection.
	Bypass,
	/// Token validated and identity attached.
	Authorized,
	/// Request must be terminated with an authorization failure.
	Rejected(Error),
}
impl Decision {
	/// Returns true if the request should reach the next stage.
	pub fn is_forwarded(&self) -> bool {
		!matches!(self, Self::Rejected(_))
	}

	/// Returns the rejection reason, if any.
	pub fn error(&self) -> Option<&Error> {
		match self {
			Self::Rejected(err) => Some(err),
			_ => None,
		}
	}
}

/// Gate that validates the token carried by each request.
#[derive(Clone, Debug)]
pub struct AuthorizationStage {
	manager: TokenManager,
	metrics: Arc<StageMetrics>,
}
impl AuthorizationStage {
	/// Creates a stage validating tokens with the provided manager.
	pub fn new(manager: TokenManager) -> Self {
		Self { manager, metrics: Default::default() }
	}

	/// Returns the token manager used for validation.
	pub fn manager(&self) -> &TokenManager {
		&self.manager
	}

	/// Returns the decision counters shared by all clones of this stage.
	pub fn metrics(&self) -> &Arc<StageMetrics> {
		&self.metrics
	}

	/// Authorizes a request against the current instant.
	pub fn authorize<R>(&self, request: &mut R) -> Decision
	where
		R: ?Sized + AuthRequest,
	{
		self.authorize_at(request, OffsetDateTime::now_utc())
	}

	/// Authorizes a request as if the current instant were `now`.
	pub fn authorize_at<R>(&self, request: &mut R, now: OffsetDateTime) -> Decision
	where
		R: ?Sized + AuthRequest,
	{
		let _span = OpSpan::new(OpKind::Authorize, "authorize_at").entered();
		let spec = self.manager.specification();

		self.metrics.record_request();

		if request.is_preflight() && !spec.auth_options {
			obs::record_op_outcome(OpKind::Authorize, OpOutcome::Bypass);
			self.metrics.record_bypass();

			return Decision::Bypass;
		}

		obs::record_op_outcome(OpKind::Authorize, OpOutcome::Attempt);

		let result = match self.extract_token(request) {
			Some(token) => self.manager.validate_at(&token, now),
			None => Err(Error::TokenMissing),
		};

		match result {
			Ok(identity) => {
				obs::record_op_outcome(OpKind::Authorize, OpOutcome::Success);
				self.metrics.record_authorized();
				request.attach_identity(identity);

				Decision::Authorized
			},
			Err(err) => {
				obs::record_op_outcome(OpKind::Authorize, OpOutcome::Failure);
				obs::record_rejection(OpKind::Authorize, err.kind());
				obs::log_rejection(OpKind::Authorize, err.kind(), "authorize");
				self.metrics.record_rejected(matches!(err, Error::TokenMissing));

				Decision::Rejected(err)
			},
		}
	}

	/// Returns the candidate token carried by the request, if any.
	pub fn extract_token<R>(&self, request: &R) -> Option<String>
	where
		R: ?Sized + AuthRequest,
	{
		let spec = self.manager.specification();

		if let Some(token) = request.header(&spec.header_name).and_then(bearer_token) {
			return Some(token.to_owned());
		}
		if spec.allow_param {
			return request.query_param(&spec.param_name).filter(|token| !token.is_empty());
		}

		None
	}
}

/// Reads `ValidatedIdentity` attached by a previous [`AuthorizationStage::authorize`] call.
#[cfg(feature = "http")]
pub fn identity_of<B>(request: &http::Request<B>) -> Option<&ValidatedIdentity> {
	request.extensions().get::<ValidatedIdentity>()
}

fn bearer_token(value: &str) -> Option<&str> {
	let (scheme, token) = value.trim().split_once(' ')?;

	if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
		return None;
	}

	let token = token.trim();

	if token.is_empty() { None } else { Some(token) }
}
