//! Dependency ordering of customized tables.

use crate::customized::CustomizedTable;
use crate::error::CoreError;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Order tables so that every referenced table precedes its referrers.
///
/// Depth-first post-order over the input order, visiting references in
/// declared order. Self references and references to tables outside the
/// given set are ignored. A cycle between distinct tables is an error
/// naming the cycle path.
pub fn order_tables(tables: Vec<CustomizedTable>) -> Result<Vec<CustomizedTable>, CoreError> {
    let index_of = |name: &str| {
        tables
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))
    };
    let edges: Vec<Vec<usize>> = tables
        .iter()
        .enumerate()
        .map(|(i, table)| {
            let mut targets = Vec::new();
            for name in &table.referenced_tables {
                if let Some(j) = index_of(name) {
                    if j != i && !targets.contains(&j) {
                        targets.push(j);
                    }
                }
            }
            targets
        })
        .collect();

    let mut marks = vec![Mark::Unvisited; tables.len()];
    let mut order = Vec::with_capacity(tables.len());

    for root in 0..tables.len() {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        // explicit stack of (node, next edge) keeps deep chains off the call stack
        let mut stack = vec![(root, 0usize)];
        marks[root] = Mark::InProgress;
        while let Some(&(node, next)) = stack.last() {
            if let Some(&target) = edges[node].get(next) {
                let top = stack.len() - 1;
                stack[top].1 += 1;
                match marks[target] {
                    Mark::Done => {}
                    Mark::Unvisited => {
                        marks[target] = Mark::InProgress;
                        stack.push((target, 0));
                    }
                    Mark::InProgress => {
                        let start = stack.iter().position(|(n, _)| *n == target).unwrap_or(0);
                        let mut path: Vec<String> = stack[start..]
                            .iter()
                            .map(|(n, _)| tables[*n].name.clone())
                            .collect();
                        path.push(tables[target].name.clone());
                        return Err(CoreError::DependencyCycle(path));
                    }
                }
            } else {
                marks[node] = Mark::Done;
                order.push(node);
                stack.pop();
            }
        }
    }

    let mut slots: Vec<Option<CustomizedTable>> = tables.into_iter().map(Some).collect();
    Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
}
