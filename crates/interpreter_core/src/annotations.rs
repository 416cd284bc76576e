use std::collections::BTreeMap;

/// Column descriptions keyed by header label, kept in lockstep with the header list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnotationStore {
    headers: Vec<String>,
    values: BTreeMap<String, String>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all state with one empty description per header.
    pub fn initialize_from(&mut self, headers: &[String]) -> &BTreeMap<String, String> {
        self.headers = headers.to_vec();
        self.values = headers
            .iter()
            .map(|header| (header.clone(), String::new()))
            .collect();
        &self.values
    }

    /// Overwrites the description of `header`. Unknown headers are ignored.
    pub fn set_value(&mut self, header: &str, text: impl Into<String>) -> bool {
        match self.values.get_mut(header) {
            Some(value) => {
                *value = text.into();
                true
            }
            None => false,
        }
    }

    /// Removes the header at `index`, which must carry the label `header`.
    ///
    /// The description key goes away once no remaining header uses that label,
    /// so duplicated labels never leave the map out of step with the list.
    pub fn remove_header(&mut self, index: usize, header: &str) -> bool {
        if self.headers.get(index).map(String::as_str) != Some(header) {
            return false;
        }
        self.headers.remove(index);
        if !self.headers.iter().any(|remaining| remaining == header) {
            self.values.remove(header);
        }
        true
    }

    pub fn clear(&mut self) {
        self.headers.clear();
        self.values.clear();
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn value(&self, header: &str) -> Option<&str> {
        self.values.get(header).map(String::as_str)
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.values)
    }
}
