//! Nearest-neighbor "did you mean" suggestions (§7, §8 property 7):
//! case-insensitive Levenshtein distance over a candidate set, ties broken
//! by input order (i.e. by iteration order of `candidates`).

/// Returns the candidate minimizing case-insensitive Levenshtein distance to
/// `name`, or `None` if `candidates` is empty.
pub fn suggest<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let lower = name.to_lowercase();
    let mut best: Option<(usize, &str)> = None;
    for candidate in candidates {
        let distance = strsim::levenshtein(&lower, &candidate.to_lowercase());
        match best {
            Some((best_distance, _)) if distance >= best_distance => {}
            _ => best = Some((distance, candidate)),
        }
    }
    best.map(|(_, candidate)| candidate.to_string())
}
