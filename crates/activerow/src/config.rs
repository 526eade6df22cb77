//! Runtime configuration shared by tables and rows.

/// Configuration for `Table` and `Row` behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrmConfig {
    /// Validate field values against the schema before `save()`/`add()`.
    pub validate_fields: bool,
    /// Accept hours 1-12 instead of 0-23 in `time` values.
    pub twelve_hour_time: bool,
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self {
            validate_fields: true,
            twelve_hour_time: false,
        }
    }
}

impl OrmConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable schema validation on writes.
    ///
    /// With validation off, values flow to SQL unchecked.
    pub fn validate_fields(mut self, on: bool) -> Self {
        self.validate_fields = on;
        self
    }

    /// Switch `time` validation to 12-hour clock hours.
    pub fn twelve_hour_time(mut self, on: bool) -> Self {
        self.twelve_hour_time = on;
        self
    }
}
