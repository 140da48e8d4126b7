//! Dependency-driven ordering of a block of declarations

use crate::config::{SortConfig, SortOrder};
use crate::error::{Result, SortError};
use crate::model::{DeclKind, Declaration};
use crate::similarity::SimilaritySorter;
use absort_graph::DirectedGraph;
use std::collections::{HashMap, HashSet};

/// Name of the declaration that `pin_main` moves to the end.
pub const MAIN: &str = "main";

/// Reorder declarations by their dependencies.
///
/// Dependents come before what they depend on. Declarations at the same
/// rank (or inside one mutually recursive group) are ordered by structural
/// similarity, or keep their input order when similarity is disabled. The
/// result is always a permutation of the input.
pub fn sort_declarations(decls: Vec<Declaration>, config: &SortConfig) -> Result<Vec<Declaration>> {
    check_unique_names(&decls)?;
    tracing::debug!(
        "Sorting {} declarations, order={}, reverse={}, pin_main={}",
        decls.len(),
        config.order,
        config.reverse,
        config.pin_main
    );

    let similarity = SimilaritySorter::new(&config.similarity)?;
    let all: Vec<usize> = (0..decls.len()).collect();

    let mut order = if config.separate_kinds {
        let (classes, functions): (Vec<usize>, Vec<usize>) = all
            .iter()
            .copied()
            .partition(|&i| decls[i].kind == DeclKind::Class);
        let mut order = order_block(&decls, &classes, config.order, &similarity)?;
        order.extend(order_block(&decls, &functions, config.order, &similarity)?);
        order
    } else {
        order_block(&decls, &all, config.order, &similarity)?
    };

    if config.reverse {
        order.reverse();
    }

    if config.pin_main {
        if let Some(at) = order.iter().position(|&i| decls[i].name == MAIN) {
            let main = order.remove(at);
            order.push(main);
        }
    }

    check_permutation(&order, decls.len())?;

    let mut slots: Vec<Option<Declaration>> = decls.into_iter().map(Some).collect();
    Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
}

/// Dependency graph over declaration names.
///
/// An edge `a -> d` means `a` depends on `d`. Dependencies on names outside
/// `decls`, and on the declaration's own name, are dropped.
pub fn dependency_graph(decls: &[Declaration]) -> Result<DirectedGraph<&str>> {
    check_unique_names(decls)?;
    let all: Vec<usize> = (0..decls.len()).collect();
    build_graph(decls, &all)
}

/// Mutually recursive groups, each in input order.
pub fn find_cycles(decls: &[Declaration]) -> Result<Vec<Vec<String>>> {
    let graph = dependency_graph(decls)?;
    let position = positions(decls);

    let mut cycles: Vec<Vec<String>> = graph
        .strongly_connected_components()
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|mut component| {
            component.sort_by_key(|name| position[*name]);
            component.into_iter().map(str::to_string).collect()
        })
        .collect();
    cycles.sort_by_key(|cycle: &Vec<String>| position[cycle[0].as_str()]);
    Ok(cycles)
}

fn check_unique_names(decls: &[Declaration]) -> Result<()> {
    let mut seen = HashSet::with_capacity(decls.len());
    for decl in decls {
        if !seen.insert(decl.name.as_str()) {
            return Err(SortError::DuplicateIdentifier(decl.name.clone()));
        }
    }
    Ok(())
}

fn check_permutation(order: &[usize], expected: usize) -> Result<()> {
    let distinct: HashSet<usize> = order.iter().copied().collect();
    if order.len() != expected || distinct.len() != expected || order.iter().any(|&i| i >= expected) {
        return Err(SortError::NotAPermutation {
            expected,
            actual: order.len(),
        });
    }
    Ok(())
}

fn positions(decls: &[Declaration]) -> HashMap<&str, usize> {
    decls
        .iter()
        .enumerate()
        .map(|(i, decl)| (decl.name.as_str(), i))
        .collect()
}

fn build_graph<'a>(decls: &'a [Declaration], members: &[usize]) -> Result<DirectedGraph<&'a str>> {
    let in_block: HashSet<&str> = members.iter().map(|&i| decls[i].name.as_str()).collect();

    let mut graph = DirectedGraph::new();
    for &i in members {
        graph.add_node(decls[i].name.as_str());
    }
    for &i in members {
        let name = decls[i].name.as_str();
        for dep in &decls[i].dependencies {
            if dep != name && in_block.contains(dep.as_str()) {
                graph.add_edge(name, dep.as_str())?;
            }
        }
    }
    Ok(graph)
}

/// Order one block of declarations, returning indices into `decls`.
fn order_block<'a>(
    decls: &'a [Declaration],
    members: &[usize],
    order: SortOrder,
    similarity: &SimilaritySorter<'_>,
) -> Result<Vec<usize>> {
    if members.is_empty() {
        return Ok(Vec::new());
    }

    let graph = build_graph(decls, members)?;
    let position = positions(decls);

    let tie_break = |mut names: Vec<&'a str>| -> Result<Vec<usize>> {
        names.sort_by_key(|name| position[*name]);
        let group: Vec<&Declaration> = names.iter().map(|name| &decls[position[*name]]).collect();
        Ok(similarity
            .sort(group)?
            .into_iter()
            .map(|decl| position[decl.name.as_str()])
            .collect())
    };

    let mut sorted: Vec<usize> = Vec::with_capacity(members.len());

    match order {
        SortOrder::Topological => {
            // Components come out dependencies first; walk them backwards.
            for component in graph.strongly_connected_components().into_iter().rev() {
                if component.len() > 1 {
                    tracing::debug!("Mutually recursive group: {:?}", component);
                }
                sorted.extend(tie_break(component)?);
            }
        }
        SortOrder::DepthFirst | SortOrder::BreadthFirst => {
            let mut seen: HashSet<&str> = HashSet::new();
            for source in graph.find_sources() {
                let reached = match order {
                    SortOrder::DepthFirst => graph.dfs(&source)?,
                    _ => graph.bfs(&source)?,
                };
                for name in reached {
                    if seen.insert(name) {
                        sorted.push(position[name]);
                    }
                }
            }

            let remaining: Vec<&str> = members
                .iter()
                .map(|&i| decls[i].name.as_str())
                .filter(|name| !seen.contains(name))
                .collect();
            if !remaining.is_empty() {
                tracing::debug!("{} declarations unreachable from any source", remaining.len());
                sorted.extend(tie_break(remaining)?);
            }
        }
    }

    Ok(sorted)
}
