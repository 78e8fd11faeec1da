use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use peppol_billing::codelist::BuiltinLists;
use peppol_billing::core::*;
use peppol_billing::{Pipeline, rules, ubl};

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 20).unwrap()
}

fn supplier() -> Party {
    PartyBuilder::new(
        "Benchmark GmbH",
        AddressBuilder::new("Berlin", "10115", "DE")
            .street("Hauptstr. 1")
            .build(),
    )
    .endpoint("9930", "DE123456789")
    .vat_id("DE123456789")
    .build()
}

fn customer() -> Party {
    PartyBuilder::new(
        "Kunde AG",
        AddressBuilder::new("München", "80331", "DE")
            .street("Leopoldstr. 42")
            .build(),
    )
    .endpoint("9930", "DE987654321")
    .build()
}

fn build_10_line_invoice() -> Invoice {
    let mut builder = InvoiceBuilder::new("BENCH-001", test_date())
        .due_date(NaiveDate::from_ymd_opt(2025, 12, 20).unwrap())
        .buyer_reference("BENCH")
        .supplier(supplier())
        .customer(customer());

    for i in 1..=10 {
        builder = builder.add_line(
            LineBuilder::new(
                i.to_string(),
                format!("Service item {i}"),
                dec!(5),
                "HUR",
                dec!(120.00),
            )
            .tax(TaxCategoryCode::StandardRate, dec!(25))
            .build(),
        );
    }

    builder.build().unwrap()
}

fn build_1000_line_invoice() -> Invoice {
    let mut builder = InvoiceBuilder::new("BENCH-BIG", test_date())
        .due_date(NaiveDate::from_ymd_opt(2025, 12, 20).unwrap())
        .buyer_reference("BENCH")
        .supplier(supplier())
        .customer(customer());

    for i in 1..=1000 {
        builder = builder.add_line(
            LineBuilder::new(i.to_string(), format!("Item {i}"), dec!(2), "C62", dec!(9.99))
                .tax(TaxCategoryCode::StandardRate, dec!(25))
                .build(),
        );
    }

    builder.build().unwrap()
}

fn bench_build_invoice(c: &mut Criterion) {
    c.bench_function("build_invoice_10_lines", |b| {
        b.iter(|| black_box(build_10_line_invoice()));
    });
}

fn bench_ubl_serialize(c: &mut Criterion) {
    let invoice = build_10_line_invoice();
    c.bench_function("ubl_serialize", |b| {
        b.iter(|| black_box(ubl::to_xml(black_box(&invoice))));
    });
}

fn bench_ubl_parse(c: &mut Criterion) {
    let invoice = build_10_line_invoice();
    let xml = ubl::to_xml(&invoice).unwrap();
    c.bench_function("ubl_parse", |b| {
        b.iter(|| black_box(ubl::from_xml(black_box(&xml))));
    });
}

fn bench_validate_catalog(c: &mut Criterion) {
    let invoice = build_10_line_invoice();
    c.bench_function("validate_catalog", |b| {
        b.iter(|| black_box(rules::validate(black_box(&invoice), &BuiltinLists)));
    });
}

fn bench_pipeline_accept(c: &mut Criterion) {
    let pipeline = Pipeline::standard();
    let bytes = pipeline.serialize(&build_10_line_invoice()).unwrap();
    c.bench_function("pipeline_accept", |b| {
        b.iter(|| black_box(pipeline.accept(black_box(&bytes))));
    });
}

fn bench_pipeline_emit(c: &mut Criterion) {
    let pipeline = Pipeline::standard();
    let invoice = build_10_line_invoice();
    c.bench_function("pipeline_emit", |b| {
        b.iter(|| black_box(pipeline.emit(black_box(&invoice))));
    });
}

fn bench_ubl_serialize_1000_lines(c: &mut Criterion) {
    let invoice = build_1000_line_invoice();
    c.bench_function("ubl_serialize_1000_lines", |b| {
        b.iter(|| black_box(ubl::to_xml(black_box(&invoice))));
    });
}

fn bench_ubl_parse_1000_lines(c: &mut Criterion) {
    let invoice = build_1000_line_invoice();
    let xml = ubl::to_xml(&invoice).unwrap();
    c.bench_function("ubl_parse_1000_lines", |b| {
        b.iter(|| black_box(ubl::from_xml(black_box(&xml))));
    });
}

criterion_group!(
    benches,
    bench_build_invoice,
    bench_ubl_serialize,
    bench_ubl_parse,
    bench_validate_catalog,
    bench_pipeline_accept,
    bench_pipeline_emit,
    bench_ubl_serialize_1000_lines,
    bench_ubl_parse_1000_lines,
);
criterion_main!(benches);
