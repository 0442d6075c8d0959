//! Runs all three dispatch policies over the same synthetic recording and
//! prints how much of the dense stream each one keeps.

use harvestgate::core::{sparsify_data, Policy};
use harvestgate::harvester::KineticHarvester;
use harvestgate::loader::synthetic_window;

fn main() {
    let body_parts = vec!["arm".to_string(), "leg".to_string()];
    let window = synthetic_window(body_parts, 5000, 25.0);
    let harvester = KineticHarvester::default();

    for policy in [
        Policy::Opportunistic,
        Policy::Dense,
        Policy::Conservative { fraction: 1.3 },
    ] {
        println!("policy: {policy}");
        let streams = sparsify_data(&window, 16, 6e-6, &harvester, policy, false)
            .expect("valid window and policy");
        for stream in &streams {
            println!(
                "  {:<8} {} packets, {}/{} samples",
                stream.body_part,
                stream.packets.len(),
                stream.packets.sample_count(),
                window.len()
            );
        }
    }
}
