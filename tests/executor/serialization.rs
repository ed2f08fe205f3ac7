//! Wire shapes of tables and errors

use crate::common::*;
use haystackdb::{Dict, Error, Ref, Status, Table, Value};

#[test]
fn request_parsed_from_json_executes() {
    let executor = create_executor();
    let req: Table = serde_json::from_str(
        r#"{"rows": [{"id": {"Ref": {"id": "pt-1"}}}, {"id": {"Str": "@nowhere"}}]}"#,
    )
    .unwrap();
    let t = executor.execute("read", &req).unwrap();
    assert_eq!(row_ids(&t), vec![Some("pt-1".to_string()), None]);
}

#[test]
fn null_rows_survive_serialization() {
    let executor = create_executor();
    let t = executor.execute("read", &id_rows(&["ghost", "pt-3"])).unwrap();
    let json = serde_json::to_value(&t).unwrap();
    assert_eq!(json["rows"][0], serde_json::json!({}));

    let back: Table = serde_json::from_value(json).unwrap();
    assert_eq!(back.num_rows(), 2);
    assert!(back.row(0).unwrap().missing("id"));
    assert_eq!(back.row(1).unwrap().id().map(|id| id.as_str()), Some("pt-3"));
}

#[test]
fn response_meta_is_serialized() {
    let executor = create_executor();
    let req = id_rows(&["pt-1"]).with_meta(Dict::new().with("watchDis", "json"));
    let t = executor.execute("watchSub", &req).unwrap();
    let json = serde_json::to_value(&t).unwrap();
    assert!(json["meta"]["watchId"]["Str"].is_string());
    assert_eq!(json["meta"]["lease"]["Number"]["unit"], "s");
}

#[test]
fn errors_serialize_with_fields() {
    let err = Error::UnknownEntity {
        id: "@ghost".into(),
    };
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["UnknownEntity"]["id"], "@ghost");
    let back: Error = serde_json::from_value(json).unwrap();
    assert_eq!(back, err);
    assert_eq!(serde_json::to_value(Status::Unsupported).unwrap(), "unsupported");
}

#[test]
fn units_and_refs_keep_their_shape() {
    let executor = create_executor();
    let t = executor.execute("read", &id_rows(&["site-1", "ahu-1"])).unwrap();
    let json = serde_json::to_string(&t).unwrap();
    let back: Table = serde_json::from_str(&json).unwrap();
    assert_eq!(
        back.row(0).unwrap().get("area"),
        Some(&Value::number_with_unit(12000.0, "ft²"))
    );
    assert_eq!(
        back.row(1).unwrap().get("siteRef"),
        Some(&Value::Ref(Ref::new("site-1")))
    );
}
