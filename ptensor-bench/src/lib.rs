use std::fmt::Display;
use std::time::Instant;

/// Statistics from a benchmark run. Durations are in milliseconds.
#[derive(Default)]
pub struct BenchStats {
    /// Duration of longest run.
    pub max: f32,

    /// Mean duration.
    pub mean: f32,

    /// Median duration.
    pub median: f32,

    /// Minimum duration.
    pub min: f32,

    /// Mean absolute deviation of durations.
    pub var: f32,

    /// Bytes processed per second, based on the median duration. Zero if the
    /// benchmark did not report a byte count.
    pub bytes_per_sec: f64,
}

/// Run a benchmark function `f` for `trials` iterations and print statistics
/// about the run.
pub fn run_bench<F: FnMut(), D: Display>(trials: usize, description: D, f: F) -> BenchStats {
    run_bench_bytes(trials, description, 0, f)
}

/// Variant of [`run_bench`] for kernels that move `bytes` bytes per call,
/// which also reports throughput.
pub fn run_bench_bytes<F: FnMut(), D: Display>(
    trials: usize,
    description: D,
    bytes: usize,
    mut f: F,
) -> BenchStats {
    if trials == 0 {
        return BenchStats::default();
    }

    let mut times = Vec::with_capacity(trials);
    for _ in 0..trials {
        let start = Instant::now();

        f();

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        times.push(duration_ms as f32);
    }

    times.sort_by(|a, b| a.total_cmp(b));
    let min = times[0];
    let max = times[times.len() - 1];

    let mid = times.len() / 2;
    let median = if times.len() % 2 == 1 {
        times[mid]
    } else {
        (times[mid - 1] + times[mid]) / 2.
    };
    let mean = times.iter().sum::<f32>() / times.len() as f32;
    let var = times.iter().map(|x| (x - mean).abs()).sum::<f32>() / times.len() as f32;

    let bytes_per_sec = if bytes > 0 && median > 0. {
        bytes as f64 / (median as f64 / 1000.)
    } else {
        0.
    };

    if bytes_per_sec > 0. {
        println!(
            "{}. mean {:.3}ms median {:.3} var {:.3} min {:.3} max {:.3} ({:.2} GB/s)",
            description,
            mean,
            median,
            var,
            min,
            max,
            bytes_per_sec / 1e9
        );
    } else {
        println!(
            "{}. mean {:.3}ms median {:.3} var {:.3} min {:.3} max {:.3}",
            description, mean, median, var, min, max
        );
    }

    BenchStats {
        max,
        mean,
        median,
        min,
        var,
        bytes_per_sec,
    }
}
