// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|raw| raw.trim().parse().ok())
}

/// Criterion settings shared by every bench target.
///
/// `DOCDESK_BENCH_PROFILE=0` turns the flamegraph profiler off.
pub fn criterion() -> Criterion {
    let sample_size = env_parse::<usize>("DOCDESK_BENCH_SAMPLE_SIZE").unwrap_or(40).clamp(10, 200);
    let warmup = env_parse::<u64>("DOCDESK_BENCH_WARMUP_SECS").unwrap_or(2).clamp(1, 60);
    let measurement = env_parse::<u64>("DOCDESK_BENCH_MEASUREMENT_SECS").unwrap_or(5).clamp(1, 120);

    let criterion = Criterion::default()
        .sample_size(sample_size)
        .warm_up_time(Duration::from_secs(warmup))
        .measurement_time(Duration::from_secs(measurement));

    if env_parse::<u8>("DOCDESK_BENCH_PROFILE") == Some(0) {
        return criterion;
    }
    let frequency = env_parse::<i32>("DOCDESK_BENCH_PROFILE_FREQ").unwrap_or(100).clamp(1, 1000);
    criterion.with_profiler(PProfProfiler::new(frequency, Output::Flamegraph(None)))
}
