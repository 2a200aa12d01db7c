use mnist_mlp::{BatchPolicy, Dataset, FitConfig, NetworkBuilder};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() -> mnist_mlp::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::WARN).init();

    // Classic XOR dataset.
    let xs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let ys = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
    let mut train = Dataset::from_rows(&xs, &ys)?;

    // 2 -> 2 -> 1 sigmoid network, one update per sample.
    let mut net = NetworkBuilder::new(2)
        .hidden_layers(1, 2)
        .output_size(1)
        .batch_size(1)
        .learning_rate(0.1)
        .build_with_seed(0)?;
    println!("{net}");

    let mut rng = StdRng::seed_from_u64(0);
    let report = net.fit(
        &mut train,
        &FitConfig {
            epochs: 20_000,
            batching: BatchPolicy::SlidingWindow,
        },
        &mut rng,
    )?;

    let eval = net.evaluate(&train)?;
    println!(
        "final_loss_from_fit={:?} train_mse={} accuracy={}",
        report.final_loss(),
        eval.mse,
        eval.accuracy
    );

    for x in xs {
        let y = net.predict(&x)[0];
        println!("x={x:?} y={y:.4}");
    }

    Ok(())
}
