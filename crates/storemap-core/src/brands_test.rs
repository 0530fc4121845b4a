use super::*;

const PALETTE: &str = r##"
brands:
  - name: 松屋
    color: "#ea571e"
    sort_key: 2
  - name: 松のや
    color: "#00489a"
    sort_key: 1
  - name: すし松
    color: "#000000"
"##;

#[test]
fn parses_palette() {
    let file = parse_brands(PALETTE).expect("valid palette");
    assert_eq!(file.brands.len(), 3);
    assert_eq!(file.color_for("松屋"), "#ea571e");
    assert_eq!(file.sort_key_for("松のや"), 1);
}

#[test]
fn unknown_brand_uses_defaults() {
    let file = parse_brands(PALETTE).unwrap();
    assert_eq!(file.color_for("福松"), DEFAULT_COLOR);
    assert_eq!(file.sort_key_for("福松"), DEFAULT_SORT_KEY);
    assert_eq!(file.sort_key_for("すし松"), DEFAULT_SORT_KEY);
}

#[test]
fn rejects_bad_color() {
    let yaml = "brands:\n  - name: 松屋\n    color: orange\n";
    let err = parse_brands(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("invalid color")));
}

#[test]
fn rejects_duplicate_names() {
    let yaml = r##"
brands:
  - name: 松屋
    color: "#ea571e"
  - name: 松屋
    color: "#000000"
"##;
    let err = parse_brands(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate")));
}

#[test]
fn rejects_empty_name() {
    let yaml = "brands:\n  - name: \"  \"\n    color: \"#ea571e\"\n";
    assert!(matches!(
        parse_brands(yaml),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn rejects_malformed_yaml() {
    assert!(matches!(
        parse_brands("brands: [name"),
        Err(ConfigError::BrandsFileParse(_))
    ));
}

#[test]
fn load_brands_reports_missing_file() {
    let err = load_brands(Path::new("/nonexistent/brands.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::BrandsFileIo { .. }));
}

#[test]
fn circle_layer_has_color_and_sort_expressions() {
    let file = parse_brands(PALETTE).unwrap();
    let layer = file.circle_layer("allStoresLayer", "allStores", &BrandFilter::All);

    assert_eq!(layer["type"], "circle");
    assert_eq!(layer["source"], "allStores");
    assert!(layer.get("filter").is_none());
    assert_eq!(
        layer["paint"]["circle-color"],
        json!([
            "match", ["get", "brand"],
            "松屋", "#ea571e",
            "松のや", "#00489a",
            "すし松", "#000000",
            "#aaaaaa"
        ])
    );
    assert_eq!(
        layer["layout"]["circle-sort-key"],
        json!(["match", ["get", "brand"], "松屋", 2, "松のや", 1, -1])
    );
    assert_eq!(
        layer["paint"]["circle-radius"],
        json!(["interpolate", ["linear"], ["zoom"], 5, 2, 10, 6, 15, 10])
    );
}

#[test]
fn circle_layer_carries_brand_filter() {
    let file = parse_brands(PALETTE).unwrap();
    let layer = file.circle_layer("l", "s", &BrandFilter::Brand("松屋".to_string()));
    assert_eq!(layer["filter"], json!(["==", ["get", "brand"], "松屋"]));
}

#[test]
fn empty_palette_uses_constant_styles() {
    let layer = BrandsFile::default().circle_layer("l", "s", &BrandFilter::All);
    assert_eq!(layer["paint"]["circle-color"], json!(DEFAULT_COLOR));
    assert_eq!(layer["layout"]["circle-sort-key"], json!(DEFAULT_SORT_KEY));
}

#[test]
fn shipped_palette_is_valid() {
    let file = parse_brands(include_str!("../../../config/brands.yaml")).expect("shipped palette");
    assert_eq!(file.brands.len(), 13);
    assert_eq!(file.color_for("マイカリー食堂"), "#e7b61b");
    assert_eq!(file.sort_key_for("マイカリー食堂"), 0);
}
