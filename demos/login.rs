//! Issues a login token and calls a protected service through the authorization layer.
//!
//! Run with `cargo run --example login`.

// std
use std::convert::Infallible;
// crates.io
use http::{Request, Response, header};
use jwt_gate::{
	claims::Claims,
	key::{KeyMaterial, StaticKey},
	manager::TokenManager,
	spec::{SigningMethod, Specification},
	stage::{self, AuthorizationLayer},
};
use tower::{Layer, ServiceExt, service_fn};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let key = StaticKey::new(KeyMaterial::hmac("demo-secret-change-me"));
	let spec = Specification::builder()
		.issuer("me.com")
		.ttl_minutes(1440)
		.signing_method(SigningMethod::Hs256)
		.signing_key(key.clone())
		.validation_key(key)
		.build()?;
	let manager = TokenManager::new(spec);
	let token = manager.create(Claims::new().with("accountID", "42"))?;

	println!("issued token: {token}");

	let layer = AuthorizationLayer::from_manager(manager);
	let orders = service_fn(|request: Request<String>| async move {
		let account = stage::identity_of(&request)
			.and_then(|identity| identity.claims.get_str("accountID"))
			.unwrap_or("anonymous")
			.to_owned();

		Ok::<_, Infallible>(Response::new(format!("orders for account {account}")))
	});
	let authorized = Request::builder()
		.uri("/orders")
		.header(header::AUTHORIZATION, format!("Bearer {token}"))
		.body(String::new())?;
	let response = layer.layer(orders).oneshot(authorized).await?;

	println!("with token: {} {}", response.status(), response.body());

	let anonymous = Request::builder().uri("/orders").body(String::new())?;
	let response = layer.layer(orders).oneshot(anonymous).await?;

	println!("without token: {}", response.status());

	Ok(())
}
