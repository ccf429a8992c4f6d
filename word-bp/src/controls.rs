use serde::Serialize;

/// An item or virtual signal reference, e.g. `{"type":"item","name":"grenade"}`.
#[derive(Debug, Clone, Serialize)]
pub struct Signal {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

impl Signal {
    pub fn item(name: &str) -> Self {
        Signal {
            kind: "item".to_string(),
            name: name.to_string(),
        }
    }

    pub fn virtual_signal(name: &str) -> Self {
        Signal {
            kind: "virtual".to_string(),
            name: name.to_string(),
        }
    }
}

pub fn signal_everything() -> Signal {
    Signal::virtual_signal("signal-everything")
}

pub fn signal_anything() -> Signal {
    Signal::virtual_signal("signal-anything")
}

pub fn signal_each() -> Signal {
    Signal::virtual_signal("signal-each")
}

#[derive(Debug, Clone, Copy, Serialize)]
pub enum Operation {
    #[serde(rename = "+")]
    Addition,
    #[serde(rename = "*")]
    Multiplication,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub enum Comparator {
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = ">")]
    GreaterThan,
}

#[derive(Debug, Clone, Serialize)]
pub struct Filter {
    pub signal: Signal,
    pub count: i64,
    pub index: i32,
}

pub type FilterGroup = Vec<Filter>;

/// Build a constant combinator's filter list from (signal, value) pairs,
/// dropping zero-valued signals. Each surviving filter's `index` is its
/// position in the original pair list (1-based), not its position among the
/// survivors — the same shape `NewFilterGroup` produces, which does not
/// decrement `i` for skipped zeros.
pub fn filter_group(pairs: Vec<(Signal, i64)>) -> FilterGroup {
    pairs
        .into_iter()
        .enumerate()
        .filter(|(_, (_, count))| *count != 0)
        .map(|(i, (signal, count))| Filter {
            signal,
            count,
            index: i as i32 + 1,
        })
        .collect()
}
