use std::path::Path;

/// Groups `items` into waves that may run concurrently.
///
/// Two items whose paths overlap (one contains the other, or they are equal) never share a wave,
/// and the later one always lands in a later wave. Items keep their relative order within a wave.
pub(crate) fn plan_waves<T, P>(items: Vec<T>, path_of: P) -> Vec<Vec<T>>
where
    P: Fn(&T) -> &Path,
{
    let mut waves: Vec<Vec<T>> = Vec::new();

    for item in items {
        let path = path_of(&item);
        let after = waves
            .iter()
            .rposition(|wave| wave.iter().any(|other| overlaps(path, path_of(other))));

        let index = after.map_or(0, |i| i + 1);
        if index == waves.len() {
            waves.push(Vec::new());
        }
        waves[index].push(item);
    }

    waves
}

fn overlaps(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}
