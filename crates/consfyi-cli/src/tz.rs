use consfyi_core::TimezoneResolver;
use tzf_rs::DefaultFinder;

/// Offline coordinate-to-zone lookup backed by the bundled tzf
/// dataset. Built once per process; lookups are pure.
pub struct TzfResolver {
    finder: DefaultFinder,
}

impl TzfResolver {
    pub fn new() -> Self {
        Self {
            finder: DefaultFinder::new(),
        }
    }
}

impl Default for TzfResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TimezoneResolver for TzfResolver {
    fn resolve(&self, lat: f64, lng: f64) -> Option<String> {
        let name = self.finder.get_tz_name(lng, lat);
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }
}
