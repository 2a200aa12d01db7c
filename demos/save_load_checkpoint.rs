use mnist_mlp::{Dataset, FitConfig, Network, NetworkBuilder};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() -> mnist_mlp::Result<()> {
    tracing_subscriber::fmt().init();

    let xs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let ys = vec![vec![0.0], vec![1.0], vec![1.0], vec![1.0]];
    let mut train = Dataset::from_rows(&xs, &ys)?;

    let mut net = NetworkBuilder::new(2)
        .hidden_layers(1, 4)
        .output_size(1)
        .batch_size(2)
        .learning_rate(0.5)
        .build_with_seed(0)?;

    net.fit(
        &mut train,
        &FitConfig {
            epochs: 500,
            ..FitConfig::default()
        },
        &mut StdRng::seed_from_u64(0),
    )?;

    let path = "target/tmp_mlp.bin";
    net.save(path)?;

    let mut loaded = Network::load(path, net.batch_size(), net.learning_rate())?;
    let before = net.predict(&[1.0, 0.0]).to_vec();
    let after = loaded.predict(&[1.0, 0.0]).to_vec();
    assert_eq!(before, after);

    println!("saved and loaded network: {path}\n{loaded}");
    Ok(())
}
