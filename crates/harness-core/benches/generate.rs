use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use harness_core::{
    generate, parse, parse_json_preserving_floats, CallMode, GenerateOptions, GenerateRequest,
    SourceFile, TestCase, Value,
};
use std::hint::black_box;

fn cases(n: usize) -> Vec<TestCase> {
    (0..n)
        .map(|i| {
            TestCase::new(
                format!("solve([{}, {}, 3.5], {{\"k\": (1, \"x\")}}, \"s{}\")", i, i * 2, i),
                Value::Array(vec![Value::Int(i as i64), Value::Float(0.5)]),
            )
        })
        .collect()
}

fn request(language: &str, file: &str, n: usize, mode: CallMode) -> GenerateRequest {
    GenerateRequest {
        language: language.to_string(),
        files: vec![SourceFile::new(file, "class Solution {}\n")],
        test_cases: cases(n),
        options: GenerateOptions {
            call_mode: mode,
            ..Default::default()
        },
    }
}

fn bench_parse(c: &mut Criterion) {
    let call = r#"solve([[1, 2], [3, 4.5]], {"a": (1, 2), b: -Infinity}, "text\n", 2 ** 10)"#;
    c.bench_function("parse_call", |b| b.iter(|| parse(black_box(call))));
}

fn bench_fidelity(c: &mut Criterion) {
    let json: String = format!(
        "[{}]",
        (0..200)
            .map(|i| format!(r#"{{"i":{},"f":{}.0,"s":"{}.5"}}"#, i, i, i))
            .collect::<Vec<_>>()
            .join(",")
    );
    c.bench_function("parse_json_preserving_floats", |b| {
        b.iter(|| parse_json_preserving_floats(black_box(&json)))
    });
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for (language, file) in [("python", "solution.py"), ("java", "Solution.java"), ("cpp", "solution.cpp")] {
        for mode in [CallMode::PassThrough, CallMode::Structured] {
            let req = request(language, file, 100, mode);
            let id = format!("{}/{:?}", language, mode);
            group.bench_with_input(BenchmarkId::from_parameter(id), &req, |b, req| {
                b.iter(|| generate(black_box(req)))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_fidelity, bench_generate);
criterion_main!(benches);
