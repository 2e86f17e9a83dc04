//! Benchmarks for query building and candidate ranking
//! Run: cargo bench -p tutorank-engine --bench ranking

use chrono::{Duration, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use tutorank_core::{CandidateVideo, DurationPreference, SearchRequest, SkillLevel};
use tutorank_engine::{
    build_query, NormalizationConfig, QueryBuilder, ScoringEngine, ScoringFilters, ScoringWeights,
};

const TECHNOLOGIES: &[&str] = &[
    "React", "Rust", "Docker", "Kubernetes", "Python", "TypeScript", "Go", "PostgreSQL",
];

// Generate a search-ordered batch with a spread of metadata
fn sample_batch(size: usize) -> Vec<CandidateVideo> {
    let now = Utc::now();
    (0..size)
        .map(|i| CandidateVideo {
            video_id: format!("vid{:05}", i),
            title: format!("{} tutorial part {}", TECHNOLOGIES[i % TECHNOLOGIES.len()], i),
            channel: format!("channel{}", i % 17),
            thumbnail: String::new(),
            duration_seconds: ((i * 437) % 5400) as i64,
            view_count: 10i64.pow((i % 8) as u32) + i as i64,
            like_count: ((i * 31) % 50_000) as i64,
            published_at: now - Duration::days(((i * 13) % 1500) as i64),
            search_rank: i as u32 + 1,
        })
        .collect()
}

fn bench_query_building(c: &mut Criterion) {
    let builder = QueryBuilder::new();
    let requests: Vec<SearchRequest> = TECHNOLOGIES
        .iter()
        .map(|t| {
            SearchRequest::new(*t)
                .with_level(SkillLevel::Beginner)
                .with_duration(DurationPreference::Medium)
                .with_max_months(12)
        })
        .collect();

    c.bench_function("build_query", |b| {
        b.iter(|| {
            for tech in TECHNOLOGIES {
                let _ = build_query(black_box(tech), Some(SkillLevel::Advanced));
            }
        })
    });

    c.bench_function("query_builder_full_request", |b| {
        b.iter(|| {
            for request in &requests {
                let _ = builder.build(black_box(request));
            }
        })
    });
}

fn bench_ranking(c: &mut Criterion) {
    let engine = ScoringEngine::new(ScoringWeights::default(), NormalizationConfig::default())
        .expect("default weights are valid");
    let filters = ScoringFilters {
        duration_preference: DurationPreference::Medium,
        max_months: Some(24),
    };

    let sizes = [15, 50, 100, 500, 1000];
    let mut group = c.benchmark_group("ranking");

    for size in sizes {
        let batch = sample_batch(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("score_top3", size), &batch, |b, batch| {
            b.iter(|| engine.score(black_box(batch), &filters, 3))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_query_building, bench_ranking);

criterion_main!(benches);
