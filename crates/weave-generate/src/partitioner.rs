//! Rows partitioned by their value of the parameter being added, so that
//! vertical extension only inspects rows that can take a tuple.

use weave_model::checker::ConstraintChecker;
use weave_model::combination::{is_compatible, merge, Combination, NO_VALUE};

#[derive(Debug)]
pub struct CombinationPartitioner {
    parameter: usize,
    /// Row indices per assigned value, in insertion order.
    by_value: Vec<Vec<usize>>,
    /// Row indices with the parameter still unassigned.
    unassigned: Vec<usize>,
}

impl CombinationPartitioner {
    pub fn new(rows: &[Combination], parameter: usize, number_of_values: usize) -> Self {
        let mut partitioner = Self {
            parameter,
            by_value: vec![Vec::new(); number_of_values],
            unassigned: Vec::new(),
        };
        for (index, row) in rows.iter().enumerate() {
            partitioner.add(index, row);
        }
        partitioner
    }

    pub fn add(&mut self, index: usize, row: &[i32]) {
        match row[self.parameter] {
            NO_VALUE => self.unassigned.push(index),
            value => self.by_value[value as usize].push(index),
        }
    }

    /// Merge `tuple` into the first row that agrees with it and stays valid.
    ///
    /// Rows already holding the tuple's value for the partitioning
    /// parameter are tried before unassigned rows. Returns the index of the
    /// extended row.
    pub fn extend_suitable(
        &mut self,
        rows: &mut [Combination],
        tuple: &[i32],
        checker: &dyn ConstraintChecker,
    ) -> Option<usize> {
        let value = tuple[self.parameter];
        let assigned = usize::try_from(value)
            .ok()
            .and_then(|v| self.by_value.get(v))
            .cloned()
            .unwrap_or_default();

        for index in assigned.into_iter().chain(self.unassigned.clone()) {
            let row = &rows[index];
            if !is_compatible(row, tuple) {
                continue;
            }
            let mut candidate = row.clone();
            merge(&mut candidate, tuple);
            if checker.is_extension_valid(&candidate) {
                let was_unassigned = rows[index][self.parameter] == NO_VALUE;
                rows[index] = candidate;
                if was_unassigned && value != NO_VALUE {
                    self.unassigned.retain(|&i| i != index);
                    self.by_value[value as usize].push(index);
                }
                return Some(index);
            }
        }
        None
    }
}
