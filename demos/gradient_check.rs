use ferrite_mlp::{backprop, data, finite_difference, DifferenceScheme, Network};
use rand::{rngs::StdRng, SeedableRng};

fn main() {
    let set = data::xor();
    let (ti, to) = (set.inputs(), set.targets());

    let mut rng = StdRng::seed_from_u64(7);
    let mut network = Network::alloc(&[2, 4, 1]);
    network.randomise(&mut rng, -1.0, 1.0);

    let mut numeric = network.alloc_like();
    let mut analytic = network.alloc_like();

    for (scheme, eps) in [(DifferenceScheme::Forward, 1e-3), (DifferenceScheme::Central, 1e-5)] {
        finite_difference(&mut network, &mut numeric, eps, scheme, ti, to);
        backprop(&mut network, &mut analytic, ti, to);

        let mut worst: f64 = 0.0;
        for layer in 0..network.layer_count() {
            let pairs = numeric
                .weights(layer)
                .values()
                .zip(analytic.weights(layer).values())
                .chain(numeric.biases(layer).values().zip(analytic.biases(layer).values()));
            for (n, a) in pairs {
                worst = worst.max((n - a).abs());
            }
        }
        println!("{scheme:?} (eps = {eps:e}): max |numeric - backprop| = {worst:.3e}");
    }
}
