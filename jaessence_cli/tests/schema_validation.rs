use jaessence_lib::{extract_fields, extract_reviews, CatalogRecord, Category};
use serde_json::Value;
use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("CLI crate should be inside workspace")
        .to_path_buf()
}

fn load_fixture(name: &str) -> Value {
    let path = workspace_root()
        .join("jaessence_api/tests/fixtures")
        .join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("read fixture {}: {}", path.display(), e));
    serde_json::from_str(&text).expect("fixture is valid JSON")
}

fn load_schema() -> Value {
    let path = workspace_root()
        .join("schema")
        .join("catalog_record.schema.json");
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("read schema {}: {}", path.display(), e));
    serde_json::from_str(&text).expect("schema is valid JSON")
}

fn validator() -> jsonschema::Validator {
    jsonschema::draft202012::new(&load_schema()).expect("catalog schema compiles")
}

// ---------------------------------------------------------------------------
// Positive validation
// ---------------------------------------------------------------------------

#[test]
fn test_catalog_fixture_conforms_to_schema() {
    let data = load_fixture("catalog.json");
    if let Err(e) = validator().validate(&data) {
        panic!("catalog fixture failed validation: {e}");
    }
}

#[test]
fn test_extracted_record_conforms_to_schema() {
    let text = "Perfume Inspirado em Libre YSL - Feminino 80ml -15% de R$159,90 por R$135,90 \
                R$129,10 com PIX 6x de R$22,65 ✦ Notas de Topo: Lavanda, Tangerina \
                Notas de Coração: Flor de Laranjeira Notas de Fundo: Baunilha, Almíscar ✦ \
                A Experiência Uma fragrância ousada que equilibra frescor e calor na pele. ✦ \
                Avaliações 10/01/2025 Fixação incrível o dia todo Carla Mendes Compra verificada";
    let mut record = CatalogRecord::seed(
        "Perfume Inspirado em Libre",
        Category::Feminine,
        "https://www.jaessencedelavie.com.br/perfume-inspirado-em-libre/",
    );
    extract_fields(text).apply_to(&mut record);
    record.reviews = extract_reviews(text);
    assert_eq!(record.reviews.len(), 1);

    let data = serde_json::to_value(vec![record]).unwrap();
    if let Err(e) = validator().validate(&data) {
        panic!("extracted record failed validation: {e}");
    }
}

#[test]
fn test_seed_record_conforms_to_schema() {
    let record = CatalogRecord::seed(
        "Perfume Inspirado em Good Girl",
        Category::Feminine,
        "https://www.jaessencedelavie.com.br/good-girl/",
    );
    let data = serde_json::to_value(vec![record]).unwrap();
    assert!(validator().validate(&data).is_ok());
}

#[test]
fn test_empty_array_conforms() {
    assert!(validator().validate(&serde_json::json!([])).is_ok());
}

// ---------------------------------------------------------------------------
// Negative validation
// ---------------------------------------------------------------------------

#[test]
fn test_schema_rejects_missing_link() {
    let mut data = load_fixture("catalog.json");
    data[0]
        .as_object_mut()
        .expect("record is an object")
        .remove("link");
    assert!(
        validator().validate(&data).is_err(),
        "schema should reject record missing link"
    );
}

#[test]
fn test_schema_rejects_unknown_category() {
    let mut data = load_fixture("catalog.json");
    data[0]
        .as_object_mut()
        .expect("record is an object")
        .insert("category".to_string(), Value::String("kids".to_string()));
    assert!(validator().validate(&data).is_err());
}

#[test]
fn test_schema_rejects_fourth_review() {
    let mut data = load_fixture("catalog.json");
    let review = data[0]["reviews"][0].clone();
    let reviews = data[0]["reviews"].as_array_mut().expect("reviews array");
    for _ in 0..3 {
        reviews.push(review.clone());
    }
    assert!(
        validator().validate(&data).is_err(),
        "schema should cap reviews at three"
    );
}

#[test]
fn test_schema_rejects_additional_properties() {
    let mut data = load_fixture("catalog.json");
    data[1]
        .as_object_mut()
        .expect("record is an object")
        .insert("rating".to_string(), Value::Number(5.into()));
    assert!(validator().validate(&data).is_err());
}
