use std::io::Write;

use env_logger::Builder;

use coldsim::config::Config;
use coldsim::function::Function;
use coldsim::simulation::FaaSSimulation;

fn main() {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
    let config = Config {
        capacity: 40,
        cold_start_rate: 0.5,
        duration: Some(100_000.0),
        warmup: Some(10_000.0),
        snapshot_interval: Some(10_000.0),
        seed: 1,
        ..Default::default()
    };
    let mut sim = FaaSSimulation::new(config);
    // A synthetic workload: 100 functions with mean service time of 1 second and a
    // spread of arrival rates, competing for 40 memory slots.
    for i in 0..100 {
        let arrival_rate = 0.002 * ((i % 10) + 1) as f64;
        sim.add_function(Function::new(1.0, arrival_rate));
    }
    let estimates = sim.run().unwrap();
    println!(
        "requests = {}, cold starts = {}, rejections = {}",
        estimates.totals.requests, estimates.totals.cold_starts, estimates.totals.rejections
    );
    println!(
        "pooled cold start ratio = {:.4}, pooled loss rate = {:.6}/s",
        estimates.pooled_cold_start_ratio, estimates.pooled_loss_rate
    );
    if let Some(ci) = estimates.cold_start_ratio {
        println!("cold start ratio = {:.4} [{:.4}, {:.4}]", ci.mean, ci.lower, ci.upper);
    }
    if let Some(ci) = estimates.loss_rate {
        println!("loss rate = {:.6}/s [{:.6}, {:.6}]", ci.mean, ci.lower, ci.upper);
    }
    for snapshot in sim.snapshots() {
        println!(
            "[{:>9.1}] requests = {}, cold starts = {}, rejections = {}",
            snapshot.time, snapshot.requests, snapshot.cold_starts, snapshot.rejections
        );
    }
}
