use ferrite_mlp::{backprop, cost, data, learn, Network};
use rand::{rngs::StdRng, SeedableRng};

fn main() {
    let set = data::xor();
    let (ti, to) = (set.inputs(), set.targets());

    let mut rng = StdRng::seed_from_u64(69);
    let mut network = Network::alloc(&[2, 2, 1]);
    let mut grad = network.alloc_like();
    network.randomise(&mut rng, 0.0, 1.0);

    let rate = 1.0;
    let epochs = 20_000;

    for epoch in 0..epochs {
        backprop(&mut network, &mut grad, ti, to);
        learn(&mut network, &grad, rate);
        if epoch % 1000 == 0 {
            println!("Epoch {epoch}: cost = {:.6}", cost(&mut network, ti, to));
        }
    }
    println!("Final cost = {:.6}", cost(&mut network, ti, to));

    for i in 0..set.len() {
        let input = ti.row_slice(i);
        println!("Input: {:?} -> Output: {:.4}", input, network.predict(input)[0]);
    }

    network.release();
    grad.release();
}
