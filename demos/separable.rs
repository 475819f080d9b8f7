use dnnet::{
    LabelledData, LabelledDataPoint, Mode, NetworkSpec, ParallelCollection, TrainConfig,
    UnlabelledData,
};
use std::sync::mpsc;
use std::thread;

fn main() -> dnnet::Result<()> {
    let mut points = Vec::new();
    for i in 0..20 {
        let i = i as f64;
        points.push(LabelledDataPoint::new(vec![-1.5 + 0.05 * i, -1.0 + 0.03 * i], vec![0.0]));
        points.push(LabelledDataPoint::new(vec![1.0 + 0.05 * i, 1.5 - 0.03 * i], vec![1.0]));
    }
    let data = LabelledData::new(points, 4)?;

    let mut network = NetworkSpec::new(&[2, 4, 1], Mode::Classification)
        .with_seed(42)
        .build()?;

    let (tx, rx) = mpsc::channel::<dnnet::EpochStats>();
    let printer = thread::spawn(move || {
        for stats in rx {
            println!("Epoch {}/{}: cost = {:.6}", stats.epoch, stats.max_epochs, stats.cost);
        }
    });

    let config = TrainConfig::new(1.0, 2000, 0.01)
        .with_seed(7)
        .with_report_every(1)
        .with_progress(tx);
    let outcome = network.train(&data, &config)?;
    drop(config);
    let _ = printer.join();
    println!("Outcome: {outcome:?} (epoch {})", outcome.epoch_or_sentinel());

    let report = network.gradient_check(&data)?;
    println!("Gradient check: max |difference| = {:e}", report.max_abs_difference());

    let probes = UnlabelledData::new(vec![vec![-1.2, -0.8], vec![0.0, 0.0], vec![1.3, 1.2]], 1)?;
    for point in network.predict(&probes)?.collect() {
        println!("Input: {:?} -> Output: {:.4}", point.features, point.target[0]);
    }
    Ok(())
}
