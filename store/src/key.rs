use crate::segment::Segment;

/// Where a `metrics` key lands in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Location {
    pub namespace: Vec<Segment>,
    pub key: Segment,
}

/// Splits `key`'s name on `separator` into namespace and leaf key.
///
/// Labels are folded into the leaf segment as `name{k="v",...}` so that
/// labelled series sit next to each other rather than turning the metric
/// into a namespace.
pub(crate) fn locate(key: &metrics::Key, separator: char) -> Location {
    let mut segments: Vec<&str> = key
        .name()
        .split(separator)
        .filter(|part| !part.is_empty())
        .collect();

    let leaf = segments.pop().unwrap_or(key.name());

    let leaf = if key.labels().len() > 0 {
        let labels = key
            .labels()
            .map(|label| format!(r#"{}="{}""#, label.key(), label.value()))
            .collect::<Vec<String>>();

        format!("{}{{{}}}", leaf, labels.join(","))
    } else {
        leaf.to_string()
    };

    Location {
        namespace: segments.into_iter().map(Segment::from).collect(),
        key: Segment::from(leaf),
    }
}
