//! Web hand-off formats.
//!
//! Inbound sign-in URIs look like
//!
//! ```text
//! ssb:experimental?action=start-http-auth&sid=<sid>&sc=<sc>[&multiserverAddress=<addr>]
//! ```
//!
//! (`ssb://experimental?...` is accepted too). The outbound web URL is
//! `https://<host>/login?ssb-http-auth=1&cid=<cid>&cc=<cc>`.

use url::Url;

use crate::core::{
    ACTION_START_HTTP_AUTH, HandshakeError, Identity, MultiserverAddress, NonceRole,
    URI_EXPERIMENTAL, URI_SCHEME, UriDefect,
};
use crate::crypto::check_nonce_length;

/// A validated inbound sign-in URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInUri {
    /// Server identity.
    pub sid: Identity,
    /// Server nonce.
    pub sc: String,
    /// Where to dial the server, when the URI names a usable address.
    pub multiserver_address: Option<MultiserverAddress>,
}

impl SignInUri {
    /// Parse and validate a sign-in URI.
    ///
    /// Checks run cheapest first and stop at the first failure.
    pub fn parse(uri: &str) -> Result<Self, HandshakeError> {
        let malformed = |defect| HandshakeError::MalformedUri {
            uri: uri.to_owned(),
            defect,
        };

        let parsed = Url::parse(uri).map_err(|_| malformed(UriDefect::Unparsable))?;
        if parsed.scheme() != URI_SCHEME {
            return Err(malformed(UriDefect::WrongScheme));
        }
        if parsed.path() != URI_EXPERIMENTAL && parsed.host_str() != Some(URI_EXPERIMENTAL) {
            return Err(malformed(UriDefect::NotExperimental));
        }

        let query = |name: &str| {
            parsed
                .query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        };

        if query("action").as_deref() != Some(ACTION_START_HTTP_AUTH) {
            return Err(HandshakeError::UnrelatedAction(uri.to_owned()));
        }

        let sid = query("sid").unwrap_or_default();
        let sid = Identity::parse(&sid).map_err(|_| HandshakeError::MalformedIdentity {
            field: "sid",
            value: sid.clone(),
        })?;

        let sc = query("sc")
            .filter(|sc| !sc.is_empty())
            .ok_or_else(|| malformed(UriDefect::MissingQuery("sc")))?;
        check_nonce_length(NonceRole::Server, &sc)?;

        let multiserver_address = query("multiserverAddress")
            .map(MultiserverAddress::new)
            .filter(MultiserverAddress::is_valid);

        Ok(Self {
            sid,
            sc,
            multiserver_address,
        })
    }
}

/// Build the web login URL for `host`.
pub fn sign_in_web_url(
    host: &str,
    login_path: &str,
    marker: &str,
    cid: &Identity,
    cc: &str,
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&format!("https://{host}"))?.join(login_path)?;
    url.query_pairs_mut()
        .append_pair(marker, "1")
        .append_pair("cid", cid.as_str())
        .append_pair("cc", cc);
    Ok(url)
}
