//! Common utilities for benchmarks

use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(3))
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// A spread of realistic version strings, from trivial to fully decorated
pub fn sample_versions() -> Vec<String> {
    vec![
        "1".to_string(),
        "1.0".to_string(),
        "2.28.1".to_string(),
        "1.0.0a1".to_string(),
        "1.0.0b2".to_string(),
        "4.0.0rc1".to_string(),
        "1.4.2.post3".to_string(),
        "0.10.0.dev5".to_string(),
        "2!1.0.4".to_string(),
        "1.0.0+ubuntu.20.04".to_string(),
        "2013b".to_string(),
        "1.0-1".to_string(),
    ]
}

/// Generate a batch of requirement lines of mixed complexity
pub fn sample_requirements(count: usize) -> Vec<String> {
    let templates = [
        "pkg{i}>=1.0",
        "pkg{i}[extra]>=2.0,<3.0",
        "pkg{i}; python_version >= '3.7'",
        "pkg{i}>=1.0; sys_platform == 'linux' or sys_platform == 'darwin'",
        "pkg{i}; extra == 'dev'",
    ];
    (0..count)
        .map(|i| templates[i % templates.len()].replace("{i}", &i.to_string()))
        .collect()
}
