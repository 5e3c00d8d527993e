use std::fmt;

/// Header lines of a message.
///
/// Keys are stored exactly as given; the decoder lower-cases them before
/// inserting, so lookups on decoded messages must use lower-case names.
/// Entries keep the position of their first insertion. Setting an existing
/// key again replaces the value in place (last value wins).
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Value for `key`, or the empty string when absent. Use [`Headers::has`]
    /// or [`Headers::get_opt`] to tell a missing header from an empty one.
    pub fn get(&self, key: &str) -> &str {
        self.get_opt(key).unwrap_or_default()
    }

    pub fn get_opt(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(var, _)| var == key)
            .map(|(_, val)| val.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.iter().any(|(var, _)| var == key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(var, _)| *var == key) {
            Some((_, val)) => *val = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(var, _)| var == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(var, val)| (var.as_str(), val.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Header block in wire form: one `key: value\r\n` line per entry.
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    /// Same keys, in any order, with values equal once surrounding
    /// whitespace is trimmed. Serializing may add a space after the colon,
    /// so this is the equality that holds across serialize and decode.
    pub fn semantic_eq(&self, other: &Headers) -> bool {
        self.len() == other.len()
            && self.iter().all(|(var, val)| {
                other
                    .get_opt(var)
                    .is_some_and(|other_val| val.trim() == other_val.trim())
            })
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (var, val) in &self.entries {
            // Decoded values keep the whitespace that followed the colon.
            // Values without any get a single space, so `cseq:3` comes back
            // as ` 3`.
            if val.is_empty() || val.starts_with([' ', '\t']) {
                write!(f, "{var}:{val}\r\n")?;
            } else {
                write!(f, "{var}: {val}\r\n")?;
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (key, value) in iter {
            headers.set(key, value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {

    use super::Headers;

    #[test]
    fn get_absent_is_empty() {
        let headers = Headers::new();
        assert_eq!(headers.get("cseq"), "");
        assert_eq!(headers.get_opt("cseq"), None);
        assert!(!headers.has("cseq"));
    }

    #[test]
    fn get_distinguishes_empty_value_through_has() {
        let mut headers = Headers::new();
        headers.set("session", "");
        assert_eq!(headers.get("session"), "");
        assert_eq!(headers.get_opt("session"), Some(""));
        assert!(headers.has("session"));
    }

    #[test]
    fn set_overwrites_in_place() {
        let mut headers = Headers::new();
        headers.set("cseq", "1");
        headers.set("session", "abc");
        headers.set("cseq", "2");
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("cseq"), "2");
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec![("cseq", "2"), ("session", "abc")],
        );
    }

    #[test]
    fn set_does_not_fold_case() {
        let mut headers = Headers::new();
        headers.set("CSeq", "1");
        assert_eq!(headers.get("cseq"), "");
        assert_eq!(headers.get("CSeq"), "1");
    }

    #[test]
    fn remove() {
        let mut headers: Headers = [("cseq", "1"), ("session", "abc")].into_iter().collect();
        assert_eq!(headers.remove("cseq"), Some("1".to_string()));
        assert_eq!(headers.remove("cseq"), None);
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn serialize() {
        let headers: Headers = [("cseq", "3"), ("session", " 1234"), ("x-empty", "")]
            .into_iter()
            .collect();
        assert_eq!(
            headers.serialize(),
            "cseq: 3\r\nsession: 1234\r\nx-empty:\r\n",
        );
    }

    #[test]
    fn semantic_eq_trims_values() {
        let tight: Headers = [("cseq", "3"), ("transport", "RTP/AVP;unicast")]
            .into_iter()
            .collect();
        let spaced: Headers = [("cseq", " 3"), ("transport", " RTP/AVP;unicast ")]
            .into_iter()
            .collect();
        assert_ne!(tight, spaced);
        assert!(tight.semantic_eq(&spaced));
        assert!(spaced.semantic_eq(&tight));
    }

    #[test]
    fn semantic_eq_compares_keys_and_values() {
        let headers: Headers = [("cseq", "3"), ("session", "abc")].into_iter().collect();
        let other_value: Headers = [("cseq", "3"), ("session", "abd")].into_iter().collect();
        let other_key: Headers = [("cseq", "3"), ("range", "abc")].into_iter().collect();
        let shorter: Headers = [("cseq", "3")].into_iter().collect();
        assert!(!headers.semantic_eq(&other_value));
        assert!(!headers.semantic_eq(&other_key));
        assert!(!headers.semantic_eq(&shorter));
        assert!(!shorter.semantic_eq(&headers));
    }

    #[test]
    fn semantic_eq_ignores_order() {
        let headers: Headers = [("cseq", "3"), ("session", "abc")].into_iter().collect();
        let reordered: Headers = [("session", " abc"), ("cseq", " 3")].into_iter().collect();
        assert!(headers.semantic_eq(&reordered));
    }
}
