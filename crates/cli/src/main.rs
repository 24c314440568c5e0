use std::path::{Path, PathBuf};
use std::{fs, process};

use clap::Parser;
use isocheck_cli::{selected_levels, App, Command};
use isocheck_core::graph::cycle::Budget;
use isocheck_core::graph::label::LabelSet;
use isocheck_core::graph::records::GraphDocument;
use isocheck_core::graph::scc::partition;
use isocheck_core::{check_with, DependencyGraph, IsolationLevel, Verdict};
use isocheck_testgen::generator::{GeneratedGraph, GraphParams};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// Either a file written by `generate` or a bare graph document.
#[derive(Deserialize)]
#[serde(untagged)]
enum GraphFile {
    Generated(GeneratedGraph),
    Document(GraphDocument),
}

impl GraphFile {
    fn into_document(self) -> GraphDocument {
        match self {
            Self::Generated(generated) => generated.into_data(),
            Self::Document(document) => document,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let app = App::parse();
    match &app.command {
        Command::Generate(args) => generate(args),
        Command::Verify(args) => verify(args),
        Command::Stats(args) => stats(args),
        Command::Schema => schema(),
    }
}

fn generate(args: &isocheck_cli::GenerateArgs) {
    fs::create_dir_all(&args.output_dir).unwrap_or_else(|e| {
        eprintln!("Failed to create output directory: {e}");
        process::exit(1);
    });

    let params = GraphParams::builder()
        .n_vertex(args.n_vertex)
        .n_edge(args.n_edge)
        .ww_weight(args.ww_weight)
        .wr_weight(args.wr_weight)
        .rw_weight(args.rw_weight)
        .build();
    let graphs = isocheck_testgen::generator::generate_mult_graphs(args.n_graph, &params);

    for graph in &graphs {
        let path = args.output_dir.join(format!("{}.json", graph.get_id()));
        let file = fs::File::create(&path).unwrap_or_else(|e| {
            eprintln!("Failed to create {}: {e}", path.display());
            process::exit(1);
        });
        serde_json::to_writer_pretty(file, graph).unwrap_or_else(|e| {
            eprintln!("Failed to write {}: {e}", path.display());
            process::exit(1);
        });
        tracing::debug!(
            id = graph.get_id(),
            edges = graph.get_data().edges.len(),
            elapsed_ms = graph.get_duration().num_milliseconds(),
            "graph written"
        );
    }

    println!(
        "Generated {} graphs to {}",
        graphs.len(),
        args.output_dir.display()
    );
}

/// Expands directories into their `.json` files, sorted by path.
fn collect_inputs(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut inputs = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(path)
                .unwrap_or_else(|e| {
                    eprintln!("Failed to read {}: {e}", path.display());
                    process::exit(1);
                })
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            entries.sort();
            inputs.extend(entries);
        } else {
            inputs.push(path.clone());
        }
    }

    if inputs.is_empty() {
        eprintln!("No .json files found");
        process::exit(1);
    }
    inputs
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

fn load(path: &Path) -> DependencyGraph<String> {
    let filename = file_name(path);
    let file = fs::File::open(path).unwrap_or_else(|e| {
        eprintln!("Failed to open {filename}: {e}");
        process::exit(1);
    });
    let document = serde_json::from_reader::<_, GraphFile>(std::io::BufReader::new(file))
        .unwrap_or_else(|e| {
            eprintln!("Failed to parse {filename}: {e}");
            process::exit(1);
        })
        .into_document();
    document.to_graph().unwrap_or_else(|e| {
        eprintln!("Malformed graph in {filename}: {e:?}");
        process::exit(1);
    })
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(e) => {
            eprintln!("Failed to encode result: {e}");
            process::exit(1);
        }
    }
}

fn verify(args: &isocheck_cli::VerifyArgs) {
    let levels = selected_levels(&args.levels);
    let budget = args
        .max_steps
        .map_or_else(Budget::unbounded, |limit| {
            Budget::builder().max_steps(limit).build()
        });
    let mut any_failed = false;

    for path in collect_inputs(&args.paths) {
        let filename = file_name(&path);
        let graph = load(&path);

        let results: Vec<_> = levels
            .par_iter()
            .map(|&level| (level, check_with(&graph, level, &budget)))
            .collect();

        let file_ok = results
            .iter()
            .all(|(_, result)| result.as_ref().is_ok_and(Verdict::holds));
        any_failed |= !file_ok;

        if args.json {
            let levels: Vec<_> = results
                .iter()
                .map(|(level, result)| match result {
                    Ok(verdict) => serde_json::json!({
                        "level": level.as_str(),
                        "ok": verdict.holds(),
                        "anomaly": verdict.anomaly(),
                    }),
                    Err(e) => serde_json::json!({
                        "level": level.as_str(),
                        "ok": false,
                        "error": e,
                    }),
                })
                .collect();
            print_json(&serde_json::json!({
                "file": filename,
                "ok": file_ok,
                "levels": levels,
            }));
            continue;
        }

        for (level, result) in &results {
            report(&filename, *level, result, args.verbose);
        }
    }

    if any_failed {
        process::exit(1);
    }
}

fn report(
    filename: &str,
    level: IsolationLevel,
    result: &Result<Verdict<String>, isocheck_core::isolation::error::Error<String>>,
    verbose: bool,
) {
    match result {
        Ok(verdict) => match verdict.anomaly() {
            None => println!("{filename}: {level}: PASS"),
            Some(anomaly) if verbose => {
                println!("{filename}: {level}: FAIL");
                println!("  cycle: {anomaly}");
            }
            Some(anomaly) => println!("{filename}: {level}: FAIL ({} edges)", anomaly.len()),
        },
        Err(e) if verbose => {
            println!("{filename}: {level}: ERROR");
            println!("  error: {e:?}");
        }
        Err(e) => println!("{filename}: {level}: ERROR ({e:?})"),
    }
}

fn stats(args: &isocheck_cli::StatsArgs) {
    let mut totals = [0usize; 5];

    for path in collect_inputs(&args.paths) {
        let graph = load(&path);
        let counts = graph.label_counts();
        let components = match partition(&graph, LabelSet::ALL) {
            Ok(partition) => partition.components.len(),
            Err(e) => {
                eprintln!("Failed to partition {}: {e:?}", file_name(&path));
                process::exit(1);
            }
        };

        println!(
            "{}: {} vertices, {} edges (ww {}, wr {}, rw {}), {} cyclic components",
            file_name(&path),
            graph.vertex_count(),
            graph.edge_count(),
            counts.ww,
            counts.wr,
            counts.rw,
            components,
        );

        for (total, n) in totals.iter_mut().zip([
            graph.vertex_count(),
            graph.edge_count(),
            counts.ww,
            counts.wr,
            counts.rw,
        ]) {
            *total += n;
        }
    }

    let [vertices, edges, ww, wr, rw] = totals;
    println!("total: {vertices} vertices, {edges} edges (ww {ww}, wr {wr}, rw {rw})");
}

fn schema() {
    let schema = schemars::schema_for!(GraphDocument);
    match serde_json::to_string_pretty(&schema) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Failed to encode schema: {e}");
            process::exit(1);
        }
    }
}
