//! Transport primitives and the OAuth 1.0a transmission strategy.
//!
//! The module exposes [`HttpTransport`], the crate's only dependency on an HTTP stack, and
//! the helpers that turn a signed parameter list into a request: an `Authorization: OAuth`
//! header ([`TransmissionMode::Header`]) or query/form parameters
//! ([`TransmissionMode::Query`]). Requests and responses use the `http` types re-exported
//! by `oauth2`, so the same transport also drives the OAuth 2.0 delegate through
//! [`TransportClient`].

// std
use std::ops::Deref;
// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	signature,
};

pub use oauth2::{HttpRequest, HttpResponse};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";
const OAUTH_PREAMBLE: &str = "OAuth";

/// Abstraction over HTTP stacks able to perform one provider round trip.
///
/// Implementations return every response they receive, including non-2xx ones; status
/// handling belongs to the flows so provider error bodies are never discarded. They must be
/// `Send + Sync + 'static` so one transport can be shared by every provider of a server.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves with the full response.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// HTTP verb used for a signed leg.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
	/// `GET`; parameters travel in the query string in query mode.
	Get,
	/// `POST`; parameters travel in a form body in query mode.
	#[default]
	Post,
}
impl HttpVerb {
	/// Returns the upper-case method name used in signature base strings.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpVerb::Get => "GET",
			HttpVerb::Post => "POST",
		}
	}

	fn method(self) -> Method {
		match self {
			HttpVerb::Get => Method::GET,
			HttpVerb::Post => Method::POST,
		}
	}
}
impl Display for HttpVerb {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for HttpVerb {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.eq_ignore_ascii_case("GET") {
			Ok(HttpVerb::Get)
		} else if s.eq_ignore_ascii_case("POST") {
			Ok(HttpVerb::Post)
		} else {
			Err(s.to_owned())
		}
	}
}

/// Where signed OAuth parameters travel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransmissionMode {
	/// `Authorization: OAuth ...` header with an empty body.
	#[default]
	Header,
	/// Query string for `GET`, form body for `POST`.
	Query,
}

/// Builds the request for one signed leg.
///
/// `params` must already include `oauth_signature` and be in the order the provider expects
/// to see them.
pub fn signed_request(
	verb: HttpVerb,
	url: &Url,
	params: &[(&str, &str)],
	mode: TransmissionMode,
) -> Result<HttpRequest> {
	let builder = Request::builder().method(verb.method());
	let request = match (mode, verb) {
		(TransmissionMode::Header, _) => builder
			.uri(url.as_str())
			.header(AUTHORIZATION, authorization_header(params))
			.body(Vec::new()),
		(TransmissionMode::Query, HttpVerb::Get) => {
			let separator = if url.query().is_some() { '&' } else { '?' };

			builder.uri(format!("{url}{separator}{}", form_encode(params))).body(Vec::new())
		},
		(TransmissionMode::Query, HttpVerb::Post) => builder
			.uri(url.as_str())
			.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
			.body(form_encode(params).into_bytes()),
	};

	request.map_err(|e| ConfigError::from(e).into())
}

/// Builds the OAuth 2.0 user-info `GET` carrying `Authorization: Bearer <token>`.
pub fn bearer_request(url: &Url, access_token: &str) -> Result<HttpRequest> {
	Request::builder()
		.method(Method::GET)
		.uri(url.as_str())
		.header(AUTHORIZATION, format!("Bearer {access_token}"))
		.header(ACCEPT, JSON_CONTENT_TYPE)
		.body(Vec::new())
		.map_err(|e| ConfigError::from(e).into())
}

/// Renders `OAuth k1="v1", k2="v2"` with percent-encoded values in the supplied order.
pub fn authorization_header(params: &[(&str, &str)]) -> String {
	let mut header = String::from(OAUTH_PREAMBLE);

	for (idx, (key, value)) in params.iter().enumerate() {
		header.push_str(if idx == 0 { " " } else { ", " });
		header.push_str(key);
		header.push_str("=\"");
		header.push_str(&signature::percent_encode(value));
		header.push('"');
	}

	header
}

/// Renders `k1=v1&k2=v2` with OAuth percent-encoding in the supplied order.
pub fn form_encode(params: &[(&str, &str)]) -> String {
	params
		.iter()
		.map(|(key, value)| {
			format!("{}={}", signature::percent_encode(key), signature::percent_encode(value))
		})
		.collect::<Vec<_>>()
		.join("&")
}

/// Returns the body of a 2xx response, or a [`TransportError::Status`] carrying the raw body.
pub fn success_body(response: HttpResponse) -> Result<Vec<u8>, TransportError> {
	let status = response.status();
	let body = response.into_body();

	if status.is_success() {
		Ok(body)
	} else {
		Err(TransportError::Status {
			status: status.as_u16(),
			body: String::from_utf8_lossy(&body).into_owned(),
		})
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token endpoints answer directly, so a custom client passed to
/// [`with_client`](Self::with_client) should not follow redirects. Configure timeouts on that
/// client: the flows add none of their own.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client.execute(request.try_into()?).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut reply = HttpResponse::new(response.bytes().await?.to_vec());

			*reply.status_mut() = status;
			*reply.headers_mut() = headers;

			Ok(reply)
		})
	}
}

/// Adapter that lets the `oauth2` crate drive requests through any [`HttpTransport`].
pub struct TransportClient<T>(Arc<T>)
where
	T: ?Sized + HttpTransport;
impl<T> TransportClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Wraps a shared transport.
	pub fn new(transport: Arc<T>) -> Self {
		Self(transport)
	}
}
impl<'c, T> AsyncHttpClient<'c> for TransportClient<T>
where
	T: ?Sized + HttpTransport,
{
	type Error = HttpClientError<TransportError>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let transport = Arc::clone(&self.0);

		Box::pin(async move {
			transport.execute(request).await.map_err(|e| HttpClientError::Reqwest(Box::new(e)))
		})
	}
}


#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::StatusCode;
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse transmission test URL.")
	}

	#[test]
	fn header_mode_renders_an_oauth_header() {
		let params = [("oauth_nonce", "n 1"), ("oauth_signature", "ab+c/=")];
		let request = signed_request(
			HttpVerb::Post,
			&url("https://api.example.com/oauth/request_token"),
			&params,
			TransmissionMode::Header,
		)
		.expect("Header-mode request should build.");

		assert_eq!(request.method(), Method::POST);
		assert!(request.body().is_empty());
		assert_eq!(
			request.headers().get(AUTHORIZATION).and_then(|value| value.to_str().ok()),
			Some("OAuth oauth_nonce=\"n%201\", oauth_signature=\"ab%2Bc%2F%3D\"")
		);
	}

	#[test]
	fn query_mode_appends_to_existing_queries() {
		let params = [("oauth_token", "t"), ("oauth_signature", "s=")];
		let request = signed_request(
			HttpVerb::Get,
			&url("https://api.example.com/me?fields=id"),
			&params,
			TransmissionMode::Query,
		)
		.expect("Query-mode GET request should build.");

		assert_eq!(
			request.uri().to_string(),
			"https://api.example.com/me?fields=id&oauth_token=t&oauth_signature=s%3D"
		);
		assert!(request.headers().get(AUTHORIZATION).is_none());
	}

	#[test]
	fn query_mode_posts_a_form_body() {
		let params = [("oauth_verifier", "v"), ("oauth_token", "t")];
		let request = signed_request(
			HttpVerb::Post,
			&url("https://api.example.com/oauth/access_token"),
			&params,
			TransmissionMode::Query,
		)
		.expect("Query-mode POST request should build.");

		assert_eq!(request.body().as_slice(), b"oauth_verifier=v&oauth_token=t");
		assert_eq!(
			request.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok()),
			Some(FORM_CONTENT_TYPE)
		);
	}

	#[test]
	fn non_success_status_keeps_the_body() {
		let mut response = HttpResponse::new(b"Invalid signature".to_vec());

		*response.status_mut() = StatusCode::UNAUTHORIZED;

		let err = success_body(response).expect_err("401 responses should fail.");

		assert!(matches!(
			err,
			TransportError::Status { status: 401, ref body } if body == "Invalid signature"
		));
		assert_eq!(
			success_body(HttpResponse::new(b"ok".to_vec())).expect("200 responses should pass."),
			b"ok"
		);
	}

	#[test]
	fn bearer_requests_carry_the_access_token() {
		let request = bearer_request(&url("https://api.example.com/userinfo"), "at-1")
			.expect("Bearer request should build.");

		assert_eq!(request.method(), Method::GET);
		assert_eq!(
			request.headers().get(AUTHORIZATION).and_then(|value| value.to_str().ok()),
			Some("Bearer at-1")
		);
	}

	#[test]
	fn verbs_parse_case_insensitively() {
		assert_eq!("get".parse::<HttpVerb>(), Ok(HttpVerb::Get));
		assert_eq!("POST".parse::<HttpVerb>(), Ok(HttpVerb::Post));
		assert!("PUT".parse::<HttpVerb>().is_err());
		assert_eq!(HttpVerb::default(), HttpVerb::Post);
		assert_eq!(TransmissionMode::default(), TransmissionMode::Header);
	}
}
