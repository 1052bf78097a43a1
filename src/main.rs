use std::io::Read;

use graph_balance::algorithm::{decide, optimize, BalanceConfig};
use graph_balance::graph::{parse_instance, Graph, Orientation};
use graph_balance::lp::default_backends;

fn main() {
    let mut cfg = BalanceConfig::default();
    let mut target: Option<f64> = None;
    let mut path: Option<String> = None;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--target" | "-t" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                target = Some(v.parse().unwrap_or_else(|_| usage_and_exit(2)));
                i += 2;
            }
            "--tol" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                cfg.binary_search_tol = v.parse().unwrap_or_else(|_| usage_and_exit(2));
                i += 2;
            }
            "--help" | "-h" => usage_and_exit(0),
            arg if !arg.starts_with('-') && path.is_none() => {
                path = Some(arg.to_string());
                i += 1;
            }
            _ => usage_and_exit(2),
        }
    }

    let text = match &path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("cannot read {p}: {e}");
                std::process::exit(2);
            }
        },
        None => {
            let mut buf = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
                eprintln!("cannot read stdin: {e}");
                std::process::exit(2);
            }
            buf
        }
    };

    let graph = match parse_instance(&text) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };
    eprintln!(
        "instance: {} vertices, {} edges",
        graph.num_vertices(),
        graph.num_edges()
    );

    let backends = default_backends();
    let result = match target {
        Some(t) => decide(&graph, t, &cfg, &backends),
        None => optimize(&graph, &cfg, &backends),
    };

    match result {
        Ok(Some(orientation)) => print_orientation(&graph, &orientation),
        Ok(None) => {
            println!("FAIL");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn print_orientation(graph: &Graph, orientation: &Orientation) {
    println!("makespan {}", orientation.makespan(graph));
    for e in 0..graph.num_edges() {
        let (u, v) = graph.endpoints(e);
        // the orientation is total here
        if let Some(t) = orientation.target(e) {
            println!("{e} {u} {v} -> {t}");
        }
    }
}

fn usage_and_exit(code: i32) -> ! {
    eprintln!(
        "Usage:\n  graph-balance [FILE] [--target T] [--tol TOL]\n\nReads an instance from FILE (or stdin) and prints an orientation.\n\nOptions:\n  --target/-t T   Decision mode: succeed only if the relaxation is feasible\n                  at makespan T (result is within 1.75 T)\n  --tol TOL       Relative tolerance of the optimization binary search\n                  (default: 1e-6)\n\nInstance format (# starts a comment):\n  n m\n  q_0 ... q_(n-1)\n  u v p           (m edge lines)\n"
    );
    std::process::exit(code)
}
