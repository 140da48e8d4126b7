//! Unit tests for absort-graph

use crate::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn diamond() -> DirectedGraph<&'static str> {
    let mut graph = DirectedGraph::new();
    for (v, w) in [("a", "b"), ("a", "c"), ("b", "d"), ("c", "d"), ("d", "e")] {
        graph.add_edge(v, w).unwrap();
    }
    graph
}

fn cyclic() -> DirectedGraph<&'static str> {
    let mut graph = DirectedGraph::new();
    for (v, w) in [("x", "y"), ("y", "x"), ("y", "z"), ("w", "x")] {
        graph.add_edge(v, w).unwrap();
    }
    graph
}

#[test]
fn test_graph_basics() {
    let mut graph = diamond();
    assert_eq!(graph.node_count(), 5);
    assert_eq!(graph.edge_count(), 5);

    // Re-adding an edge is a no-op
    graph.add_edge("a", "b").unwrap();
    assert_eq!(graph.edge_count(), 5);

    assert!(graph.contains(&"e"));
    assert!(!graph.contains(&"f"));
    assert_eq!(graph.successors(&"a").unwrap(), vec![&"b", &"c"]);
    assert_eq!(graph.find_sources(), vec!["a"]);
    assert_eq!(graph.find_sinks(), vec!["e"]);
    assert!(graph.connected());

    graph.add_node("f");
    assert!(!graph.connected());
}

#[test]
fn test_self_loop_rejected() {
    let mut graph = DirectedGraph::new();
    assert!(matches!(graph.add_edge(1, 1), Err(GraphError::SelfLoop(_))));
    assert!(graph.is_empty());
}

#[test]
fn test_unknown_node() {
    let graph = diamond();
    assert!(matches!(graph.bfs(&"zz"), Err(GraphError::UnknownNode(_))));
    assert!(matches!(graph.successors(&"zz"), Err(GraphError::UnknownNode(_))));
}

#[test]
fn test_traversals() {
    let graph = diamond();
    assert_eq!(graph.bfs(&"a").unwrap(), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(graph.dfs(&"a").unwrap(), vec!["a", "b", "d", "e", "c"]);
    assert_eq!(graph.dfs(&"c").unwrap(), vec!["c", "d", "e"]);
}

#[test]
fn test_topological_sort() {
    let graph = diamond();
    assert_eq!(graph.topological_sort(false).unwrap(), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(graph.topological_sort(true).unwrap(), vec!["e", "d", "b", "c", "a"]);

    let flipped = graph
        .topological_sort_by(false, |mut rank| {
            rank.reverse();
            rank
        })
        .unwrap();
    assert_eq!(flipped, vec!["a", "c", "b", "d", "e"]);
}

#[test]
fn test_cycles() {
    let graph = cyclic();
    assert!(matches!(
        graph.topological_sort(false),
        Err(GraphError::CircularDependency)
    ));
    assert_eq!(graph.relaxed_topological_sort(false), vec!["w", "x", "y", "z"]);
    assert_eq!(graph.detect_cycle(), vec!["x", "y", "x"]);
    assert_eq!(graph.detect_back_edge(&"x").unwrap(), Some(("y", "x")));

    assert!(diamond().detect_cycle().is_empty());
    assert_eq!(diamond().detect_back_edge(&"a").unwrap(), None);
}

#[test]
fn test_strongly_connected_components() {
    let components = cyclic().strongly_connected_components();
    assert_eq!(components.len(), 3);

    // Dependencies come before their dependents
    assert_eq!(components, vec![vec!["z"], vec!["x", "y"], vec!["w"]]);
    assert_eq!(components, cyclic().strongly_connected_components());
}

#[test]
fn test_components_follow_insertion_order() {
    let components = diamond().strongly_connected_components();
    assert_eq!(
        components,
        vec![vec!["e"], vec!["d"], vec!["b"], vec!["c"], vec!["a"]]
    );
}

#[test]
fn test_components_of_deep_chain() {
    let n = 200_000usize;
    let mut graph = DirectedGraph::new();
    for i in 0..n - 1 {
        graph.add_edge(i, i + 1).unwrap();
    }

    let components = graph.strongly_connected_components();
    assert_eq!(components.len(), n);
    assert_eq!(components[0], vec![n - 1]);
    assert_eq!(components[n - 1], vec![0]);

    // Closing the chain turns it into a single component
    graph.add_edge(n - 1, 0).unwrap();
    let components = graph.strongly_connected_components();
    assert_eq!(components.len(), 1);
    assert_eq!(components[0], (0..n).collect::<Vec<_>>());
}

#[test]
fn test_transpose_keeps_nodes() {
    let transposed = diamond().transpose();
    assert_eq!(transposed.node_count(), 5);
    assert_eq!(transposed.successors(&"d").unwrap(), vec![&"b", &"c"]);
    assert_eq!(transposed.find_sources(), vec!["e"]);
}

#[test]
fn test_display() {
    let mut graph = DirectedGraph::new();
    graph.add_edge("a", "b").unwrap();
    graph.add_edge("a", "c").unwrap();
    graph.add_edge("b", "c").unwrap();
    insta::assert_snapshot!(graph.to_string(), @r#"DirectedGraph({"a": ["b", "c"], "b": ["c"], "c": []})"#);
}

fn fixture() -> WeightedGraph<&'static str> {
    let mut graph = WeightedGraph::new();
    for (v, w, weight) in [
        ("A", "B", 1.0),
        ("A", "D", 3.0),
        ("B", "D", 5.0),
        ("E", "D", 1.0),
        ("E", "B", 1.0),
        ("C", "B", 6.0),
        ("C", "F", 2.0),
        ("E", "F", 4.0),
        ("E", "C", 5.0),
    ] {
        graph.add_edge(v, w, weight).unwrap();
    }
    graph
}

#[test]
fn test_minimum_spanning_tree() {
    let empty: WeightedGraph<&str> = WeightedGraph::new();
    assert_eq!(empty.minimum_spanning_tree().unwrap(), Vec::<&str>::new());

    let graph = fixture();
    assert_eq!(
        graph.minimum_spanning_tree().unwrap(),
        vec!["A", "B", "E", "D", "F", "C"]
    );
    // Repeatable
    assert_eq!(
        graph.minimum_spanning_tree().unwrap(),
        fixture().minimum_spanning_tree().unwrap()
    );

    let mut single = WeightedGraph::new();
    single.add_node("A");
    assert_eq!(single.minimum_spanning_tree().unwrap(), vec!["A"]);
}

#[test]
fn test_weighted_edges() {
    let mut graph = fixture();
    assert_eq!(graph.num_nodes(), 6);
    assert_eq!(graph.num_edges(), 9);
    assert_eq!(graph.find_minimum_edge().unwrap(), ("A", "B"));
    assert_eq!(graph.weight(&"D", &"A").unwrap(), 3.0);

    graph.add_edge("D", "A", 0.5).unwrap();
    assert_eq!(graph.num_edges(), 9);
    assert_eq!(graph.find_minimum_edge().unwrap(), ("A", "D"));

    graph.remove_edge(&"A", &"D");
    graph.remove_edge(&"A", &"F");
    assert!(matches!(
        graph.weight(&"A", &"D"),
        Err(GraphError::EdgeNotFound(_, _))
    ));
    assert!(matches!(graph.add_edge("A", "A", 1.0), Err(GraphError::SelfLoop(_))));

    graph.clear();
    assert!(matches!(graph.find_minimum_edge(), Err(GraphError::NoMinimumEdge)));
}

#[test]
fn test_disconnected_spanning_tree() {
    let mut graph = WeightedGraph::new();
    graph.add_edge("A", "B", 1.0).unwrap();
    graph.add_edge("C", "D", 1.0).unwrap();
    assert!(matches!(
        graph.minimum_spanning_tree(),
        Err(GraphError::Disconnected)
    ));

    let mut isolated = WeightedGraph::new();
    for node in ["q", "p", "r"] {
        isolated.add_node(node);
    }
    assert_eq!(isolated.minimum_spanning_tree().unwrap(), vec!["q", "p", "r"]);
}

#[test]
fn test_lru_eviction() {
    let mut cache = LruCache::new(Some(2)).unwrap();
    cache.insert("a", 1);
    cache.insert("b", 2);
    cache.insert("a", 10);
    cache.insert("c", 3);

    assert!(!cache.contains(&"b"));
    assert_eq!(cache.get(&"a"), Ok(&10));
    assert_eq!(cache.get(&"c"), Ok(&3));
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.keys_by_recency().copied().collect::<Vec<_>>(), vec!["a", "c"]);
    assert_eq!(
        cache.get(&"b"),
        Err(CacheError::KeyNotFound("\"b\"".to_string()))
    );

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.maxsize(), Some(2));
}

#[test]
fn test_lookup_needs_no_debug_keys() {
    #[derive(Clone, PartialEq, Eq, Hash)]
    struct Opaque(u8);

    let mut lru = LruCache::new(Some(2)).unwrap();
    let mut lfu = LfuCache::new(Some(2)).unwrap();
    for key in [Opaque(1), Opaque(2)] {
        lru.insert(key.clone(), key.0);
        lfu.insert(key.clone(), key.0);
    }

    assert_eq!(lru.lookup(&Opaque(1)), Some(&1));
    assert_eq!(lru.lookup(&Opaque(3)), None);
    assert_eq!(lfu.lookup(&Opaque(2)), Some(&2));
    assert_eq!(lfu.lookup(&Opaque(3)), None);

    // Lookups leave eviction order alone
    lru.insert(Opaque(3), 3);
    assert_eq!(lru.lookup(&Opaque(1)), None);
}

#[test]
fn test_cache_capacity_validation() {
    assert!(matches!(
        LruCache::<u8, u8>::new(Some(0)),
        Err(CacheError::InvalidCapacity(0))
    ));
    assert!(matches!(
        LfuCache::<u8, u8>::new(Some(0)),
        Err(CacheError::InvalidCapacity(0))
    ));
    assert_eq!(LruCache::<u8, u8>::unbounded().maxsize(), None);
    assert_eq!(LfuCache::<u8, u8>::new(None).unwrap().maxsize(), None);
    assert_eq!(LfuCache::<u8, u8>::default().maxsize(), Some(128));
}

#[test]
fn test_lfu_eviction() {
    let mut cache = LfuCache::new(Some(2)).unwrap();
    cache.insert("a", 1);
    cache.insert("a", 2);
    cache.insert("b", 1);
    cache.insert("c", 1);

    assert!(cache.contains(&"a"));
    assert!(!cache.contains(&"b"));
    assert!(cache.contains(&"c"));
    assert_eq!(cache.get(&"a"), Ok(&2));
    assert_eq!(cache.frequency(&"a"), Some(2));
    assert_eq!(cache.frequency(&"c"), Some(1));
    assert_eq!(cache.frequency(&"b"), None);

    cache.clear();
    assert_eq!(cache.len(), 0);
    assert_eq!(cache.frequency(&"a"), None);
}

#[derive(Debug, Clone)]
struct Tree {
    label: char,
    children: Vec<Tree>,
}

fn kids(tree: &Tree) -> &[Tree] {
    &tree.children
}

struct LabelCost;

impl EditCost<Tree> for LabelCost {
    fn rename(&self, a: &Tree, b: &Tree) -> f64 {
        if a.label == b.label { 0.0 } else { 1.0 }
    }
}

fn arb_tree() -> impl Strategy<Value = Tree> {
    let leaf = prop::char::range('a', 'c').prop_map(|label| Tree {
        label,
        children: Vec::new(),
    });
    leaf.prop_recursive(3, 12, 3, |inner| {
        (prop::char::range('a', 'c'), prop::collection::vec(inner, 0..3))
            .prop_map(|(label, children)| Tree { label, children })
    })
}

fn arb_dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..12).prop_flat_map(|n| {
        let pairs = prop::collection::vec((0..n, 0..n), 0..30).prop_map(|pairs| {
            pairs
                .into_iter()
                .filter(|(u, v)| u < v)
                .collect::<Vec<_>>()
        });
        (Just(n), pairs)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_topological_sort_respects_edges((n, edges) in arb_dag(), reverse in any::<bool>()) {
        let mut graph = DirectedGraph::new();
        for node in 0..n {
            graph.add_node(node);
        }
        for &(u, v) in &edges {
            graph.add_edge(u, v).unwrap();
        }

        let order = graph.topological_sort(reverse).unwrap();
        prop_assert_eq!(order.len(), n);
        prop_assert_eq!(&order, &graph.clone().topological_sort(reverse).unwrap());

        let position = |x: usize| order.iter().position(|&y| y == x).unwrap();
        for &(u, v) in &edges {
            if reverse {
                prop_assert!(position(u) > position(v));
            } else {
                prop_assert!(position(u) < position(v));
            }
        }
    }

    #[test]
    fn prop_components_partition_nodes(
        n in 1usize..10,
        edges in prop::collection::vec((0usize..10, 0usize..10), 0..25),
    ) {
        let mut graph = DirectedGraph::new();
        for node in 0..n {
            graph.add_node(node);
        }
        for (u, v) in edges {
            if u != v && u < n && v < n {
                graph.add_edge(u, v).unwrap();
            }
        }
        let mut seen: Vec<usize> = graph.strongly_connected_components().concat();
        seen.sort();
        prop_assert_eq!(seen, (0..n).collect::<Vec<_>>());
        prop_assert_eq!(graph.relaxed_topological_sort(false).len(), n);
    }

    #[test]
    fn prop_spanning_walk_is_a_permutation(
        n in 1usize..9,
        weights in prop::collection::vec(0u8..4, 28),
    ) {
        let mut graph = WeightedGraph::new();
        for node in 0..n {
            graph.add_node(node);
        }
        let mut weights = weights.into_iter();
        for a in 0..n {
            for b in (a + 1)..n {
                let weight = weights.next().map_or(0.0, f64::from);
                graph.add_edge(a, b, weight).unwrap();
            }
        }

        let walk = graph.minimum_spanning_tree().unwrap();
        prop_assert_eq!(walk.len(), graph.num_nodes());
        prop_assert_eq!(&walk, &graph.minimum_spanning_tree().unwrap());

        let mut sorted = walk.clone();
        sorted.sort();
        prop_assert_eq!(sorted, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn prop_unbounded_caches_keep_last_value(entries in prop::collection::vec((0u8..16, any::<i32>()), 0..50)) {
        let mut lru = LruCache::unbounded();
        let mut lfu = LfuCache::new(None).unwrap();
        let mut expected = std::collections::HashMap::new();
        for &(key, value) in &entries {
            lru.insert(key, value);
            lfu.insert(key, value);
            expected.insert(key, value);
        }
        prop_assert_eq!(lru.len(), expected.len());
        prop_assert_eq!(lfu.len(), expected.len());
        for (key, value) in &expected {
            prop_assert_eq!(lru.get(key), Ok(value));
            prop_assert_eq!(lfu.get(key), Ok(value));
        }
    }

    #[test]
    fn prop_bounded_caches_never_overflow(keys in prop::collection::vec(0u8..32, 0..80), maxsize in 1usize..6) {
        let mut lru = LruCache::new(Some(maxsize)).unwrap();
        let mut lfu = LfuCache::new(Some(maxsize)).unwrap();
        for key in keys {
            lru.insert(key, ());
            lfu.insert(key, ());
            prop_assert!(lru.len() <= maxsize);
            prop_assert!(lfu.len() <= maxsize);
            prop_assert!(lru.contains(&key));
        }
    }

    #[test]
    fn prop_zhang_shasha_is_a_distance(a in arb_tree(), b in arb_tree()) {
        let d = |x: &Tree, y: &Tree| zhang_shasha(x, y, kids, &LabelCost);
        prop_assert_eq!(d(&a, &a), 0.0);
        prop_assert_eq!(d(&a, &b), d(&b, &a));
        let bound = (tree_size(&a, kids) + tree_size(&b, kids)) as f64;
        prop_assert!(d(&a, &b) <= bound);
    }

    #[test]
    fn prop_pqgram_is_normalized(a in arb_tree(), b in arb_tree()) {
        let shape = PqGram::default();
        let label = |t: &Tree| t.label;
        prop_assert_eq!(shape.distance(&a, &a.clone(), kids, label), 0.0);
        let d = shape.distance(&a, &b, kids, label);
        prop_assert!((0.0..=1.0).contains(&d));
        prop_assert_eq!(d, shape.distance(&b, &a, kids, label));
    }

    #[test]
    fn prop_chenyu_is_repeatable(
        points in prop::collection::vec(0u16..50, 0..60),
        k in 2usize..5,
        seed in any::<u64>(),
    ) {
        let gap = |a: &u16, b: &u16| f64::from(a.abs_diff(*b));
        let first = chenyu(&points, gap, k, seed).unwrap();
        prop_assert_eq!(&first, &chenyu(&points, gap, k, seed).unwrap());

        let mut flat = first.concat();
        let mut sorted = points.clone();
        flat.sort();
        sorted.sort();
        prop_assert_eq!(flat, sorted);
    }
}
