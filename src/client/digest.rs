//! HTTP Digest access authentication (RFC 2617) used with programmatic API keys.
use std::collections::HashMap;

/// Challenge sent by the server in a `WWW-Authenticate: Digest ...` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub opaque: Option<String>,
    pub qop: Option<String>,
    pub algorithm: Option<String>,
}

impl DigestChallenge {
    /// Parse a `WWW-Authenticate` header value. Returns `None` for non-digest challenges.
    pub fn parse(header: &str) -> Option<Self> {
        let header = header.trim();
        let (scheme, params) = header.split_once(char::is_whitespace)?;
        if !scheme.eq_ignore_ascii_case("digest") {
            return None;
        }

        let mut params = parse_params(params);
        Some(Self {
            realm: params.remove("realm").unwrap_or_default(),
            nonce: params.remove("nonce")?,
            opaque: params.remove("opaque"),
            qop: params.remove("qop"),
            algorithm: params.remove("algorithm"),
        })
    }

    fn supports_auth_qop(&self) -> bool {
        self.qop
            .as_deref()
            .is_some_and(|qop| qop.split(',').any(|q| q.trim() == "auth"))
    }
}

/// Split `key="value", key=value` pairs, honouring commas inside quotes.
fn parse_params(input: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace() || *c == ',').is_some() {}

        let key: String = std::iter::from_fn(|| chars.next_if(|c| *c != '=' && *c != ','))
            .collect();
        if key.trim().is_empty() {
            break;
        }

        if chars.next_if_eq(&'=').is_none() {
            continue;
        }

        let value: String = if chars.next_if_eq(&'"').is_some() {
            let mut value = String::new();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    '"' => break,
                    c => value.push(c),
                }
            }
            value
        } else {
            std::iter::from_fn(|| chars.next_if(|c| *c != ',')).collect()
        };

        params.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    params
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input))
}

/// A challenge together with the nonce count used for it.
#[derive(Debug, Clone)]
pub struct DigestSession {
    challenge: DigestChallenge,
    nonce_count: u32,
}

impl DigestSession {
    pub fn new(challenge: DigestChallenge) -> Self {
        Self {
            challenge,
            nonce_count: 0,
        }
    }

    /// Build the `Authorization` header value for a request.
    pub fn authorize(
        &mut self,
        username: &str,
        password: &str,
        method: &str,
        uri: &str,
        cnonce: &str,
    ) -> String {
        let challenge = &self.challenge;
        let ha1 = md5_hex(&format!("{username}:{}:{password}", challenge.realm));
        let ha2 = md5_hex(&format!("{method}:{uri}"));

        let mut header = format!(
            "Digest username=\"{username}\", realm=\"{}\", nonce=\"{}\", uri=\"{uri}\"",
            challenge.realm, challenge.nonce
        );

        if challenge.supports_auth_qop() {
            self.nonce_count += 1;
            let nc = format!("{:08x}", self.nonce_count);
            let response = md5_hex(&format!(
                "{ha1}:{}:{nc}:{cnonce}:auth:{ha2}",
                challenge.nonce
            ));
            header.push_str(&format!(
                ", qop=auth, nc={nc}, cnonce=\"{cnonce}\", response=\"{response}\""
            ));
        } else {
            let response = md5_hex(&format!("{ha1}:{}:{ha2}", challenge.nonce));
            header.push_str(&format!(", response=\"{response}\""));
        }

        if let Some(algorithm) = &challenge.algorithm {
            header.push_str(&format!(", algorithm={algorithm}"));
        }
        if let Some(opaque) = &challenge.opaque {
            header.push_str(&format!(", opaque=\"{opaque}\""));
        }

        header
    }
}

/// Random client nonce.
pub fn cnonce() -> String {
    format!("{:016x}", rand::random::<u64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RFC_CHALLENGE: &str = r#"Digest realm="testrealm@host.com", qop="auth,auth-int", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", opaque="5ccc069c403ebaf9f0171e9517f40e41""#;

    #[test]
    fn test_parse_challenge() {
        let challenge = DigestChallenge::parse(RFC_CHALLENGE).unwrap();
        assert_eq!(challenge.realm, "testrealm@host.com");
        assert_eq!(challenge.nonce, "dcd98b7102dd2f0e8b11d0f600bfb0c093");
        assert_eq!(challenge.qop.as_deref(), Some("auth,auth-int"));
        assert_eq!(
            challenge.opaque.as_deref(),
            Some("5ccc069c403ebaf9f0171e9517f40e41")
        );
        assert_eq!(challenge.algorithm, None);
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        assert_eq!(DigestChallenge::parse("Bearer realm=\"x\""), None);
        assert_eq!(DigestChallenge::parse("Digest realm=\"x\""), None);
    }

    #[test]
    fn test_parse_unquoted_values() {
        let challenge =
            DigestChallenge::parse("Digest realm=\"MMS Public API\", nonce=\"abc\", algorithm=MD5, qop=\"auth\"")
                .unwrap();
        assert_eq!(challenge.realm, "MMS Public API");
        assert_eq!(challenge.algorithm.as_deref(), Some("MD5"));
    }

    #[test]
    fn test_rfc_2617_response() {
        let mut session = DigestSession::new(DigestChallenge::parse(RFC_CHALLENGE).unwrap());
        let header = session.authorize(
            "Mufasa",
            "Circle Of Life",
            "GET",
            "/dir/index.html",
            "0a4f113b",
        );

        assert!(header.contains("response=\"6629fae49393a05397450978507c4ef1\""));
        assert!(header.contains("nc=00000001"));
        assert!(header.contains("opaque=\"5ccc069c403ebaf9f0171e9517f40e41\""));
    }

    #[test]
    fn test_nonce_count_increments() {
        let mut session = DigestSession::new(DigestChallenge::parse(RFC_CHALLENGE).unwrap());
        session.authorize("u", "p", "GET", "/", "a");
        let header = session.authorize("u", "p", "GET", "/", "b");
        assert!(header.contains("nc=00000002"));
    }

    #[test]
    fn test_without_qop() {
        let mut session = DigestSession::new(DigestChallenge {
            realm: "r".to_string(),
            nonce: "n".to_string(),
            opaque: None,
            qop: None,
            algorithm: None,
        });
        let header = session.authorize("u", "p", "GET", "/", "c");
        assert!(!header.contains("nc="));
        let expected = md5_hex(&format!(
            "{}:n:{}",
            md5_hex("u:r:p"),
            md5_hex("GET:/")
        ));
        assert!(header.contains(&format!("response=\"{expected}\"")));
    }

    #[test]
    fn test_cnonce_is_hex() {
        let cnonce = cnonce();
        assert_eq!(cnonce.len(), 16);
        assert!(cnonce.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
