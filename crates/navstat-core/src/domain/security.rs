use crate::Isin;

/// Column carrying the human-readable fund name in the roster.
pub const SECURITY_NAME_COLUMN: &str = "security_name";

/// One roster row: the parsed identifier plus every input column verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRecord {
    isin: Isin,
    fields: Vec<(String, String)>,
}

impl SecurityRecord {
    pub fn new(isin: Isin, fields: Vec<(String, String)>) -> Self {
        Self { isin, fields }
    }

    pub fn isin(&self) -> &Isin {
        &self.isin
    }

    /// Descriptive columns in roster header order.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value.as_str())
    }

    /// Name used for report titles, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        match self.field(SECURITY_NAME_COLUMN) {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.isin.as_str(),
        }
    }
}
