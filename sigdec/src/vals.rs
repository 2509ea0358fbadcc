use std::collections::HashMap;

use crate::Protocol;

/// A static table mapping wire codes to display labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueStrings(&'static [(u64, &'static str)]);

impl ValueStrings {
    pub const fn new(entries: &'static [(u64, &'static str)]) -> Self {
        ValueStrings(entries)
    }

    pub fn get(&self, value: u64) -> Option<&'static str> {
        self.0
            .iter()
            .find_map(|(code, label)| (*code == value).then_some(*label))
    }

    pub fn entries(&self) -> &'static [(u64, &'static str)] {
        self.0
    }

    /// Renders `value` as `"Label (value)"`, or just the number when the table has no entry.
    pub fn render(&self, value: u64) -> String {
        render_labelled(self.get(value), value)
    }
}

pub(crate) fn render_labelled(label: Option<&str>, value: u64) -> String {
    match label {
        Some(label) => format!("{label} ({value})"),
        None => value.to_string(),
    }
}

/// Builds a [`ValueStrings`] table.
///
/// ```
/// const CAUSES: sigdec::ValueStrings = sigdec::vals! {
///     0 => "End user originated",
///     1 => "End user congestion",
/// };
/// assert_eq!(CAUSES.get(1), Some("End user congestion"));
/// ```
#[macro_export]
macro_rules! vals {
    ($($code:expr => $label:expr),* $(,)?) => {
        $crate::ValueStrings::new(&[$(($code, $label)),*])
    };
}

/// A closed set of wire codes, usually derived with [`Dispatch`](derive@crate::Dispatch).
pub trait Dispatch: Sized {
    const VALUES: ValueStrings;
    /// Returned by [`classify`](Self::classify) for codes without a variant.
    const FALLBACK: Option<Self>;

    fn from_code(code: u64) -> Option<Self>;

    fn code(&self) -> Option<u64>;

    fn label(&self) -> &'static str;

    fn classify(code: u64) -> Option<Self> {
        Self::from_code(code).or(Self::FALLBACK)
    }
}

/// Substitutes or extends the labels of enumerated fields without touching decode logic.
///
/// Consulted before the built-in tables.
pub trait Lookup: Send + Sync {
    fn label(&self, protocol: Protocol, field: &str, value: u64) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverrides;

impl Lookup for NoOverrides {
    fn label(&self, _: Protocol, _: &str, _: u64) -> Option<String> {
        None
    }
}

/// A map-backed [`Lookup`].
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    labels: HashMap<(Protocol, String, u64), String>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, protocol: Protocol, field: &str, value: u64, label: &str) -> Self {
        self.insert(protocol, field, value, label);
        self
    }

    pub fn insert(&mut self, protocol: Protocol, field: &str, value: u64, label: &str) {
        self.labels
            .insert((protocol, field.to_string(), value), label.to_string());
    }
}

impl Lookup for OverrideTable {
    fn label(&self, protocol: Protocol, field: &str, value: u64) -> Option<String> {
        self.labels
            .get(&(protocol, field.to_string(), value))
            .cloned()
    }
}
