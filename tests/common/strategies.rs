use proptest::prelude::*;
use std::collections::HashSet;

/// A batch scenario: record count plus ids that vanish or fail
#[derive(Debug, Clone)]
pub struct BatchScenario {
    pub count: i64,
    pub missing: HashSet<i64>,
    pub failing_lookups: HashSet<i64>,
    pub failing_persists: HashSet<i64>,
}

impl BatchScenario {
    /// Ids expected in the result: present and never failing
    pub fn expected_ids(&self) -> HashSet<i64> {
        (1..=self.count)
            .filter(|id| {
                !self.missing.contains(id)
                    && !self.failing_lookups.contains(id)
                    && !self.failing_persists.contains(id)
            })
            .collect()
    }
}

/// Strategy for generating batch scenarios with up to `max` records
pub fn batch_scenario_strategy(max: i64) -> impl Strategy<Value = BatchScenario> {
    (0..=max).prop_flat_map(|count| {
        let ids = prop::collection::hash_set(1..=count.max(1), 0..=(count as usize / 3));
        (Just(count), ids.clone(), ids.clone(), ids).prop_map(
            |(count, missing, failing_lookups, failing_persists)| {
                let in_range = |set: HashSet<i64>| -> HashSet<i64> {
                    set.into_iter().filter(|id| *id <= count).collect()
                };
                BatchScenario {
                    count,
                    missing: in_range(missing),
                    failing_lookups: in_range(failing_lookups),
                    failing_persists: in_range(failing_persists),
                }
            },
        )
    })
}
