//! Behavior scenarios over the profiling pipeline, built in-memory through
//! the public constructors.

use perfilar::{
    analyze_missing, category_table, correlation_matrix, evaluate_quality, summarize,
    CategoryOptions, Column, QualityConfig, Table,
};

fn text(values: &[Option<&str>]) -> Vec<Option<String>> {
    values.iter().map(|v| v.map(str::to_string)).collect()
}

#[test]
fn scenario_mixed_types_with_missing() {
    let table = Table::new(vec![
        Column::numeric("age", vec![Some(10.0), Some(20.0), Some(30.0), None]),
        Column::numeric(
            "height",
            vec![Some(140.0), Some(150.0), Some(160.0), Some(170.0)],
        ),
        Column::text("city", text(&[Some("A"), Some("B"), Some("A"), None])),
    ])
    .unwrap();

    let summary = summarize(&table);
    assert_eq!(summary.n_rows, 4);
    assert_eq!(summary.n_cols, 3);

    let age = summary.column("age").unwrap();
    assert_eq!(age.missing, 1);
    assert_eq!(age.non_null, 3);

    let city = summary.column("city").unwrap();
    assert_eq!(city.unique, 2);
    assert_eq!(city.missing, 1);

    let options = CategoryOptions::new(2, 20).unwrap();
    let categories = category_table(&table, &options);
    let counts = &categories.column("city").unwrap().counts;
    assert_eq!(counts.len(), 2);
    assert_eq!((counts[0].value.as_str(), counts[0].count), ("A", 2));
    assert_eq!((counts[1].value.as_str(), counts[1].count), ("B", 1));
}

#[test]
fn scenario_constant_column_lowers_score() {
    let table = Table::new(vec![
        Column::numeric("const_col", vec![Some(1.0); 4]),
        Column::numeric("normal_col", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
    ])
    .unwrap();

    let flags = evaluate_quality(
        &summarize(&table),
        &analyze_missing(&table),
        &QualityConfig::default(),
    );
    assert!(flags.has_constant_columns);
    assert_eq!(flags.constant_columns, vec!["const_col"]);
    assert!(flags.quality_score < 1.0);
}

#[test]
fn scenario_id_duplicates_detected() {
    let table = Table::new(vec![
        Column::numeric("user_id", vec![Some(1.0), Some(1.0), Some(3.0), Some(4.0)]),
        Column::text("name", text(&[Some("a"), Some("b"), Some("c"), Some("d")])),
    ])
    .unwrap();

    let flags = evaluate_quality(
        &summarize(&table),
        &analyze_missing(&table),
        &QualityConfig::default(),
    );
    assert!(flags.has_suspicious_id_duplicates);
    assert!(flags
        .id_columns_with_duplicates
        .contains(&"user_id".to_string()));
}

#[test]
fn scenario_clean_small_dataset_scores_high() {
    let table = Table::new(vec![
        Column::numeric("id", (1..=5).map(|i| Some(f64::from(i))).collect()),
        Column::numeric("col1", (1..=5).map(|i| Some(f64::from(i) * 10.0)).collect()),
        Column::numeric("col2", (1..=5).map(|i| Some(f64::from(i) * 100.0)).collect()),
    ])
    .unwrap();

    let flags = evaluate_quality(
        &summarize(&table),
        &analyze_missing(&table),
        &QualityConfig::default(),
    );
    assert!(!flags.has_constant_columns);
    assert!(!flags.has_suspicious_id_duplicates);
    assert!(flags.quality_score > 0.7);
}

#[test]
fn scenario_zero_row_table_degrades_quietly() {
    let table = Table::new(vec![
        Column::numeric("a", vec![]),
        Column::text("b", vec![]),
    ])
    .unwrap();

    let summary = summarize(&table);
    assert_eq!(summary.n_rows, 0);
    assert_eq!(summary.n_cols, 2);
    for profile in &summary.columns {
        assert_eq!(profile.missing_share, 0.0);
        assert_eq!(profile.unique, 0);
    }

    assert!(analyze_missing(&table).is_empty());
    assert!(correlation_matrix(&table).is_empty());
    assert!(category_table(&table, &CategoryOptions::default()).is_empty());

    let flags = evaluate_quality(
        &summarize(&table),
        &analyze_missing(&table),
        &QualityConfig::default(),
    );
    assert!(flags.quality_score >= 0.0 && flags.quality_score <= 1.0);
}

#[test]
fn scenario_constant_column_correlation_is_undefined() {
    let table = Table::new(vec![
        Column::numeric("x", vec![Some(1.0), Some(2.0), Some(3.0)]),
        Column::numeric("k", vec![Some(5.0), Some(5.0), Some(5.0)]),
    ])
    .unwrap();

    let matrix = correlation_matrix(&table);
    // Undefined, not silently zero.
    assert_eq!(matrix.get("x", "k"), None);
    assert_eq!(matrix.get("x", "x"), Some(1.0));
}
