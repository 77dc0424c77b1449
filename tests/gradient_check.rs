use ferrite_mlp::{backprop, data, finite_difference, DifferenceScheme, Network};
use rand::{rngs::StdRng, SeedableRng};

fn max_param_gap(a: &Network, b: &Network) -> f64 {
    let mut worst: f64 = 0.0;
    for layer in 0..a.layer_count() {
        for (x, y) in a.weights(layer).values().zip(b.weights(layer).values()) {
            worst = worst.max((x - y).abs());
        }
        for (x, y) in a.biases(layer).values().zip(b.biases(layer).values()) {
            worst = worst.max((x - y).abs());
        }
    }
    worst
}

#[test]
fn backprop_agrees_with_forward_difference_on_xor() {
    let set = data::xor();
    let (ti, to) = (set.inputs(), set.targets());

    for seed in [1, 2, 3] {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut net = Network::alloc(&[2, 4, 1]);
        net.randomise(&mut rng, 0.0, 1.0);

        let mut numeric = net.alloc_like();
        let mut analytic = net.alloc_like();
        finite_difference(&mut net, &mut numeric, 1e-3, DifferenceScheme::Forward, ti, to);
        backprop(&mut net, &mut analytic, ti, to);

        let gap = max_param_gap(&numeric, &analytic);
        assert!(gap < 1e-2, "seed {seed}: max gap {gap}");
    }
}

#[test]
fn central_difference_tightens_agreement_on_adder() {
    let set = data::adder(2);
    let (ti, to) = (set.inputs(), set.targets());

    let mut rng = StdRng::seed_from_u64(11);
    let mut net = Network::alloc(&[4, 6, 3]);
    net.randomise(&mut rng, -1.0, 1.0);

    let mut numeric = net.alloc_like();
    let mut analytic = net.alloc_like();
    finite_difference(&mut net, &mut numeric, 1e-5, DifferenceScheme::Central, ti, to);
    backprop(&mut net, &mut analytic, ti, to);

    let gap = max_param_gap(&numeric, &analytic);
    assert!(gap < 1e-6, "max gap {gap}");
}

#[test]
fn gradient_engines_leave_parameters_untouched() {
    let set = data::xor();
    let (ti, to) = (set.inputs(), set.targets());

    let mut rng = StdRng::seed_from_u64(5);
    let mut net = Network::alloc(&[2, 3, 1]);
    net.randomise(&mut rng, -1.0, 1.0);
    let before = net.clone();

    let mut grad = net.alloc_like();
    finite_difference(&mut net, &mut grad, 1e-3, DifferenceScheme::Forward, ti, to);
    backprop(&mut net, &mut grad, ti, to);

    assert_eq!(max_param_gap(&net, &before), 0.0);
}
