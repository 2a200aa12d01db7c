use criterion::{Criterion, black_box, criterion_group, criterion_main};

use mnist_mlp::{Network, NetworkConfig};

fn mnist_config() -> NetworkConfig {
    NetworkConfig {
        n_layers: 3,
        input_size: 784,
        hidden_size: 16,
        output_size: 10,
        batch_size: 64,
        lr: 0.1,
    }
}

fn network_forward_bench(c: &mut Criterion) {
    let mut net = Network::new_with_seed(mnist_config(), 0).unwrap();
    let input = vec![0.1_f64; net.input_size()];

    c.bench_function("network_forward_784_16_16_10", |b| {
        b.iter(|| {
            let out = net.predict(black_box(&input));
            black_box(out[0]);
        })
    });
}

fn network_backward_bench(c: &mut Criterion) {
    let mut net = Network::new_with_seed(mnist_config(), 0).unwrap();
    let input = vec![0.1_f64; net.input_size()];
    let mut target = vec![0.0_f64; net.output_size()];
    target[3] = 1.0;

    net.set_input(&input);
    net.set_target(&target);
    net.forward();

    c.bench_function("network_backward_accumulate_784_16_16_10", |b| {
        b.iter(|| {
            net.backward();
            net.accumulate_gradients();
            black_box(net.layers()[0].grad_weights().as_slice()[0]);
        })
    });
}

criterion_group!(benches, network_forward_bench, network_backward_bench);
criterion_main!(benches);
