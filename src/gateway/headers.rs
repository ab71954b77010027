//! Header precedence for outgoing calls.

use reqwest::header::HeaderMap;

/// The three header layers of a call, lowest precedence first.
///
/// Resolution applies `defaults`, then `identity`, then `overrides`; a later
/// layer replaces any header an earlier one set under the same name.
#[derive(Debug, Clone, Default)]
pub struct HeaderLayers {
    /// Bypass header and JSON content type.
    pub defaults: HeaderMap,
    /// Identity header, empty for anonymous calls.
    pub identity: HeaderMap,
    /// Caller-supplied overrides.
    pub overrides: HeaderMap,
}

impl HeaderLayers {
    /// Merge the layers into the header set that goes on the wire.
    pub fn resolve(self) -> HeaderMap {
        let mut merged = self.defaults;
        for layer in [self.identity, self.overrides] {
            // `None` keys repeat the previous name for multi-valued headers.
            let mut current = None;
            for (name, value) in layer {
                if let Some(name) = name {
                    merged.insert(name.clone(), value);
                    current = Some(name);
                } else if let Some(name) = &current {
                    merged.append(name.clone(), value);
                }
            }
        }
        merged
    }
}
