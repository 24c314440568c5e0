/// DSL macro for building literal dependency graphs.
///
/// Produces `DependencyGraph<&'static str>`.
///
/// # Syntax
///
/// ```ignore
/// graph! {
///     [A, B, C]            // vertices, in insertion order
///     A -> B: ww,          // edges: `from -> to: label`
///     B -> C: wr,
///     C -> A: rw,
/// }
/// ```
///
/// Labels are `ww`, `wr` or `rw`. Every edge endpoint must be listed as a
/// vertex.
#[macro_export]
macro_rules! graph {
    ([$($vertex:ident),* $(,)?] $($from:ident -> $to:ident : $label:ident),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut graph = isocheck_core::DependencyGraph::<&'static str>::default();
        $(
            graph.add_vertex(stringify!($vertex)).unwrap();
        )*
        $(
            graph
                .add_edge(
                    &stringify!($from),
                    &stringify!($to),
                    stringify!($label)
                        .parse::<isocheck_core::DependencyLabel>()
                        .unwrap(),
                )
                .unwrap();
        )*
        graph
    }};
}

/// All five verdicts of a graph, weakest level first.
#[allow(dead_code)]
pub fn verdicts(graph: &isocheck_core::DependencyGraph<&'static str>) -> [bool; 5] {
    isocheck_core::IsolationLevel::ALL.map(|level| {
        isocheck_core::check(graph, level)
            .expect("unbounded check cannot fail")
            .holds()
    })
}
