//! Signed, time-bounded JWT issuance and validation, plus a pluggable request authorization
//! stage that gates incoming requests on a valid bearer token.
//!
//! A [`Specification`](spec::Specification) bundles the token policy (TTL, issuer, signing
//! method, key providers, extraction flags). A [`TokenManager`](manager::TokenManager) creates
//! and validates tokens under that policy, and an
//! [`AuthorizationStage`](stage::AuthorizationStage) applies it per request.
//!
//! ```no_run
//! use jwt_gate::{
//! 	claims::Claims,
//! 	key::{KeyMaterial, StaticKey},
//! 	manager::TokenManager,
//! 	spec::{SigningMethod, Specification},
//! };
//!
//! # fn main() -> jwt_gate::error::Result<()> {
//! let key = StaticKey::new(KeyMaterial::hmac("change-me"));
//! let spec = Specification::builder()
//! 	.issuer("me.com")
//! 	.ttl_minutes(1440)
//! 	.signing_method(SigningMethod::Hs256)
//! 	.signing_key(key.clone())
//! 	.validation_key(key)
//! 	.build()?;
//! let manager = TokenManager::new(spec);
//! let token = manager.create(Claims::new().with("accountID", "42"))?;
//! let identity = manager.validate(&token)?;
//!
//! assert_eq!(identity.claims.get_str("accountID"), Some("42"));
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod claims;
pub mod error;
pub mod key;
pub mod manager;
pub mod oauth;
pub mod obs;
pub mod spec;
pub mod stage;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
		sync::Arc,
	};

	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use jsonwebtoken;
pub use url;
#[cfg(test)] use {color_eyre as _, tokio as _, tower as _};
