/// Inclusive national-dex id range per generation. Ranges are contiguous and
/// non-overlapping; every dex id maps to exactly one generation.
pub const GENERATION_RANGES: [(u32, u32, u32); 9] = [
    (1, 1, 151),
    (2, 152, 251),
    (3, 252, 386),
    (4, 387, 493),
    (5, 494, 649),
    (6, 650, 721),
    (7, 722, 809),
    (8, 810, 905),
    (9, 906, 1025),
];

pub fn generation_from_id(id: u32) -> u32 {
    GENERATION_RANGES
        .iter()
        .find(|(_, start, end)| id >= *start && id <= *end)
        .map(|(generation, _, _)| *generation)
        .unwrap_or(1)
}

pub fn ids_for_generations(generations: &[u32]) -> Vec<u32> {
    let mut ids = Vec::new();
    for requested in generations {
        if let Some((_, start, end)) = GENERATION_RANGES
            .iter()
            .find(|(generation, _, _)| generation == requested)
        {
            ids.extend(*start..=*end);
        }
    }
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_boundaries_do_not_overlap() {
        assert_eq!(generation_from_id(1), 1);
        assert_eq!(generation_from_id(151), 1);
        assert_eq!(generation_from_id(152), 2);
        assert_eq!(generation_from_id(251), 2);
        assert_eq!(generation_from_id(252), 3);
        assert_eq!(generation_from_id(906), 9);
        assert_eq!(generation_from_id(1025), 9);
    }

    #[test]
    fn generation_defaults_to_one_outside_known_ranges() {
        assert_eq!(generation_from_id(0), 1);
        assert_eq!(generation_from_id(20000), 1);
    }

    #[test]
    fn ids_for_generations_unions_ranges_in_ascending_order() {
        let ids = ids_for_generations(&[2, 1]);
        assert_eq!(ids.len(), 251);
        assert_eq!(ids.first(), Some(&1));
        assert_eq!(ids.last(), Some(&251));
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn ids_for_generations_ignores_unknown_and_repeated_generations() {
        assert!(ids_for_generations(&[42]).is_empty());
        assert_eq!(ids_for_generations(&[1, 1]).len(), 151);
    }
}
