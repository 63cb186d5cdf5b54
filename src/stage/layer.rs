// std
use std::task::{Context, Poll};
// crates.io
use futures_util::future::{self, Either, Ready};
use http::{HeaderValue, Request, Response, StatusCode, header::WWW_AUTHENTICATE};
use tower_layer::Layer;
use tower_service::Service;
// self
use crate::{
	manager::TokenManager,
	obs::{InstrumentedOp, OpKind, OpSpan},
	stage::{AuthorizationStage, Decision},
};

/// Future returned by [`Authorization`].
pub type AuthorizationFuture<F, T, E> = Either<InstrumentedOp<F>, Ready<Result<T, E>>>;

/// [`Layer`] wrapping services with an [`AuthorizationStage`].
#[derive(Clone, Debug)]
pub struct AuthorizationLayer {
	stage: AuthorizationStage,
}
impl AuthorizationLayer {
	/// Creates a layer applying the provided stage.
	pub fn new(stage: AuthorizationStage) -> Self {
		Self { stage }
	}

	/// Creates a layer with a fresh stage over the provided manager.
	pub fn from_manager(manager: TokenManager) -> Self {
		Self::new(AuthorizationStage::new(manager))
	}

	/// Returns the stage shared by every wrapped service.
	pub fn stage(&self) -> &AuthorizationStage {
		&self.stage
	}
}
impl<S> Layer<S> for AuthorizationLayer {
	type Service = Authorization<S>;

	fn layer(&self, inner: S) -> Self::Service {
		Authorization { inner, stage: self.stage.clone() }
	}
}

/// Service forwarding authorized requests and answering rejections with `401 Unauthorized`.
///
/// The rejection response carries `WWW-Authenticate: Bearer` and a default body; the specific
/// error kind is only logged and metered. Downstream services read the identity with
/// [`identity_of`](crate::stage::identity_of).
#[derive(Clone, Debug)]
pub struct Authorization<S> {
	inner: S,
	stage: AuthorizationStage,
}
impl<S> Authorization<S> {
	/// Returns the wrapped service.
	pub fn inner(&self) -> &S {
		&self.inner
	}

	/// Returns the stage applied to each request.
	pub fn stage(&self) -> &AuthorizationStage {
		&self.stage
	}
}
impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for Authorization<S>
where
	S: Service<Request<ReqBody>, Response = Response<ResBody>>,
	ResBody: Default,
{
	type Error = S::Error;
	type Future = AuthorizationFuture<S::Future, Self::Response, Self::Error>;
	type Response = Response<ResBody>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
		match self.stage.authorize(&mut request) {
			Decision::Rejected(_) => Either::Right(future::ready(Ok(unauthorized()))),
			Decision::Authorized | Decision::Bypass => {
				let span = OpSpan::new(OpKind::Authorize, "forward");

				Either::Left(span.instrument(self.inner.call(request)))
			},
		}
	}
}

fn unauthorized<B>() -> Response<B>
where
	B: Default,
{
	let mut response = Response::new(B::default());

	*response.status_mut() = StatusCode::UNAUTHORIZED;
	response.headers_mut().insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));

	response
}
