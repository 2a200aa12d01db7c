use std::time::Instant;

use clap::Parser;
use mnist_mlp::NetworkBuilder;

#[derive(Parser)]
#[command(about = "Time forward passes of an MNIST-shaped network")]
struct Args {
    #[arg(long, default_value_t = 20_000)]
    iters: usize,
    #[arg(long, default_value_t = 1_000)]
    warmup: usize,
    #[arg(long, default_value_t = 784)]
    in_dim: usize,
    #[arg(long, default_value_t = 16)]
    hidden: usize,
    /// Number of hidden layers.
    #[arg(long, default_value_t = 2)]
    layers: usize,
    #[arg(long, default_value_t = 10)]
    out_dim: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> mnist_mlp::Result<()> {
    let args = Args::parse();

    let mut net = NetworkBuilder::new(args.in_dim)
        .hidden_layers(args.layers, args.hidden)
        .output_size(args.out_dim)
        .build_with_seed(args.seed)?;

    let backend = if cfg!(feature = "matrixmultiply") {
        "matrixmultiply"
    } else {
        "naive"
    };

    // Deterministic, non-constant input.
    let input: Vec<f64> = (0..args.in_dim).map(|i| ((i % 997) as f64) * 1e-3).collect();

    for _ in 0..args.warmup {
        let out = net.predict(std::hint::black_box(&input));
        std::hint::black_box(out[0]);
    }

    let start = Instant::now();
    let mut checksum = 0.0_f64;
    for _ in 0..args.iters {
        checksum += net.predict(std::hint::black_box(&input))[0];
    }
    let elapsed = start.elapsed();
    std::hint::black_box(checksum);

    let elapsed_s = elapsed.as_secs_f64();
    let samples_per_s = args.iters as f64 / elapsed_s;

    println!(
        "mnist-mlp perf_forward backend={backend} iters={} warmup={} in_dim={} hidden={} layers={} out_dim={} elapsed_s={elapsed_s:.6} samples_per_s={samples_per_s:.2} checksum={checksum}",
        args.iters, args.warmup, args.in_dim, args.hidden, args.layers, args.out_dim,
    );

    Ok(())
}
