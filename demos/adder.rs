use ferrite_mlp::{
    data::{self, bits_to_number, threshold},
    train::StopReason,
    Network, Sgd, TrainConfig,
};
use rand::{rngs::StdRng, SeedableRng};

const BITS: usize = 3;

fn main() {
    let set = data::adder(BITS);
    let (ti, to) = (set.inputs(), set.targets());

    let mut rng = StdRng::seed_from_u64(42);
    let mut network = Network::alloc(&[2 * BITS, 4 * BITS, BITS + 1]);
    let mut grad = network.alloc_like();
    network.randomise(&mut rng, -1.0, 1.0);

    let optimizer = Sgd::new(1.0);
    let mut config = TrainConfig::new(50_000);
    config.report_every = 5_000;
    config.cost_threshold = Some(1e-3);

    let summary = ferrite_mlp::train_loop(&mut network, &mut grad, ti, to, &optimizer, &config);
    println!(
        "{} epochs, cost = {:.6}{}",
        summary.epochs_run,
        summary.final_cost,
        if summary.stop == StopReason::Converged { " (converged)" } else { "" }
    );

    let n = 1usize << BITS;
    let mut failures = 0;
    for i in 0..set.len() {
        let (x, y) = (i / n, i % n);
        let out = threshold(network.predict(ti.row_slice(i)), 0.5);
        if out != threshold(to.row_slice(i), 0.5) {
            failures += 1;
            println!("{x} + {y} = {}  expected {}", bits_to_number(&out), x + y);
        }
    }
    println!("{failures} of {} sums wrong", set.len());
}
