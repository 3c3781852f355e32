use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;
use std::hint::black_box;
use waste_portal::models::{LabelField, ValidationResult};
use waste_portal::services::DepositService;

fn benchmark_label_normalization(c: &mut Criterion) {
    let comma_list: LabelField =
        serde_json::from_value(json!("Plastic, Paper, Glass, Metal, Organic, E-waste"))
            .expect("Failed to parse label list");
    let objects: LabelField = serde_json::from_value(json!([
        {"type": "PET bottle", "confidence": 93},
        {"item": "Cardboard box", "confidence": 0.71},
        "Aluminium can",
        {"name": "Glass jar"}
    ]))
    .expect("Failed to parse label objects");

    let response = json!({
        "is_valid": true,
        "message": "Waste detected",
        "confidence_score": 87,
        "waste_types": "Plastic, Cardboard",
        "severity": "High",
        "recyclable_items": [{"type": "PET bottle", "confidence": 93}],
        "time_analysis": {"time_appears_valid": true, "lighting_condition": "daylight", "notes": ""},
        "description_match": {"matches_image": true, "confidence": 0.8, "notes": "ok"},
        "report_id": "65f1a2b3c4d5e6f708192a3b"
    })
    .to_string();

    let mut group = c.benchmark_group("label_normalization");

    group.bench_function("comma_separated", |b| {
        b.iter(|| black_box(comma_list.clone()).normalize())
    });

    group.bench_function("mixed_objects", |b| {
        b.iter(|| black_box(objects.clone()).normalize())
    });

    group.bench_function("full_validation_response", |b| {
        b.iter(|| serde_json::from_str::<ValidationResult>(black_box(&response)))
    });

    group.finish();
}

fn benchmark_nearest_dumps(c: &mut Criterion) {
    // A few hundred sites spread over India
    let features: Vec<_> = (0..400)
        .map(|i| {
            let lat = 8.0 + (i % 20) as f64 * 1.3;
            let lng = 68.0 + (i / 20) as f64 * 1.4;
            json!({
                "type": "Feature",
                "id": format!("site-{i}"),
                "geometry": {"type": "Point", "coordinates": [lng, lat]},
                "properties": {
                    "name": format!("Site {i}"),
                    "status": if i % 3 == 0 { "full" } else { "empty" },
                    "capacity": i % 101,
                    "last_updated": "2024-03-20T10:00:00Z"
                }
            })
        })
        .collect();
    let collection = json!({"type": "FeatureCollection", "features": features}).to_string();
    let service = DepositService::load_from_json(&collection).expect("Failed to load sites");

    let mut group = c.benchmark_group("nearest_dumps");

    group.bench_function("builtin_sites", |b| {
        let builtin = DepositService::builtin();
        b.iter(|| builtin.nearest_to(black_box(19.076), black_box(72.8777)))
    });

    group.bench_function("four_hundred_sites", |b| {
        b.iter(|| service.nearest_to(black_box(19.076), black_box(72.8777)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_label_normalization, benchmark_nearest_dumps);
criterion_main!(benches);
