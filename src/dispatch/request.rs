//! Request shapes shared by job builders and transports

use url::form_urlencoded;

/// Target of a dispatch, relative to the transport's base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: String,
    /// Query pairs whose values are already encoded
    pub query: Vec<(String, String)>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Append a pre-encoded query pair
    pub fn with_query(mut self, name: impl Into<String>, encoded_value: impl Into<String>) -> Self {
        self.query.push((name.into(), encoded_value.into()));
        self
    }

    /// Path plus query string, e.g. `/a/b.jsp?x=1&`
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let mut out = format!("{}?", self.path);
        for (name, value) in &self.query {
            out.push_str(name);
            out.push('=');
            out.push_str(value);
            out.push('&');
        }
        out
    }

    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path_and_query())
    }
}

/// Ordered form fields sent as `application/x-www-form-urlencoded`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    fields: Vec<(String, String)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing an earlier value with the same name
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Encoded request body
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.fields.iter())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormPayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = FormPayload::new();
        for (k, v) in iter {
            payload.set(k, v);
        }
        payload
    }
}

/// Status and body returned by the remote system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First `max_chars` characters of the body
    pub fn body_prefix(&self, max_chars: usize) -> String {
        self.body.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_with_query() {
        let endpoint = Endpoint::new("/MercuryGate/util/adminConsole.jsp")
            .with_query("sidEnterprise", "%2842%2C3640%2C0%29");
        assert_eq!(
            endpoint.url("https://acme.example.net/"),
            "https://acme.example.net/MercuryGate/util/adminConsole.jsp?sidEnterprise=%2842%2C3640%2C0%29&"
        );
    }

    #[test]
    fn test_payload_set_replaces_in_place() {
        let mut payload = FormPayload::new().with("a", "1").with("b", "2");
        payload.set("a", "3");
        assert_eq!(payload.fields()[0], ("a".to_string(), "3".to_string()));
        assert_eq!(payload.len(), 2);
    }

    #[test]
    fn test_payload_encoding() {
        let payload = FormPayload::new()
            .with("sidEvent", "(1,2)")
            .with("PRO", "SO 1");
        assert_eq!(payload.encode(), "sidEvent=%281%2C2%29&PRO=SO+1");
    }

    #[test]
    fn test_body_prefix_counts_chars() {
        let response = TransportResponse::new(500, "ééééé");
        assert_eq!(response.body_prefix(3), "ééé");
        assert!(!response.is_success());
        assert!(TransportResponse::new(204, "").is_success());
    }
}
