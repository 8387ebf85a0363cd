//! Integration test for Protobuf parser

use prost::Message;
use prost_types::{
    field_descriptor_proto, DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto,
    FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet, MessageOptions,
    MethodDescriptorProto, ServiceDescriptorProto,
};
use protoc_gen_openapiv3_common::{Cardinality, FieldKind};
use protoc_gen_openapiv3_parser::ProtobufParser;

fn field(
    name: &str,
    json_name: &str,
    number: i32,
    label: field_descriptor_proto::Label,
    kind: field_descriptor_proto::Type,
    type_name: Option<&str>,
) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        json_name: Some(json_name.to_string()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(kind as i32),
        type_name: type_name.map(str::to_string),
        ..Default::default()
    }
}

fn timestamp_file() -> FileDescriptorProto {
    use field_descriptor_proto::{Label, Type};

    FileDescriptorProto {
        name: Some("google/protobuf/timestamp.proto".to_string()),
        package: Some("google.protobuf".to_string()),
        message_type: vec![DescriptorProto {
            name: Some("Timestamp".to_string()),
            field: vec![
                field("seconds", "seconds", 1, Label::Optional, Type::Int64, None),
                field("nanos", "nanos", 2, Label::Optional, Type::Int32, None),
            ],
            ..Default::default()
        }],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

/// Create a sample catalogue service
fn catalogue_file() -> FileDescriptorProto {
    use field_descriptor_proto::{Label, Type};

    let labels_entry = DescriptorProto {
        name: Some("LabelsEntry".to_string()),
        field: vec![
            field("key", "key", 1, Label::Optional, Type::String, None),
            field("value", "value", 2, Label::Optional, Type::String, None),
        ],
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    };

    let variant = DescriptorProto {
        name: Some("Variant".to_string()),
        field: vec![field("sku", "sku", 1, Label::Optional, Type::String, None)],
        ..Default::default()
    };

    let item = DescriptorProto {
        name: Some("Item".to_string()),
        field: vec![
            field("item_id", "itemId", 1, Label::Optional, Type::String, None),
            field("price", "price", 2, Label::Optional, Type::Double, None),
            field("tags", "tags", 3, Label::Repeated, Type::String, None),
            field(
                "labels",
                "labels",
                4,
                Label::Repeated,
                Type::Message,
                Some(".catalogue.Item.LabelsEntry"),
            ),
            field(
                "status",
                "status",
                5,
                Label::Optional,
                Type::Enum,
                Some(".catalogue.Status"),
            ),
            field(
                "created_at",
                "createdAt",
                6,
                Label::Optional,
                Type::Message,
                Some(".google.protobuf.Timestamp"),
            ),
            field(
                "parent",
                "parent",
                7,
                Label::Optional,
                Type::Message,
                Some(".catalogue.Item"),
            ),
            field(
                "variants",
                "variants",
                8,
                Label::Repeated,
                Type::Message,
                Some(".catalogue.Item.Variant"),
            ),
        ],
        nested_type: vec![labels_entry, variant],
        ..Default::default()
    };

    let get_item_request = DescriptorProto {
        name: Some("GetItemRequest".to_string()),
        field: vec![field("item_id", "itemId", 1, Label::Optional, Type::String, None)],
        ..Default::default()
    };

    let status = EnumDescriptorProto {
        name: Some("Status".to_string()),
        value: vec![
            EnumValueDescriptorProto {
                name: Some("STATUS_UNSPECIFIED".to_string()),
                number: Some(0),
                ..Default::default()
            },
            EnumValueDescriptorProto {
                name: Some("STATUS_ACTIVE".to_string()),
                number: Some(1),
                ..Default::default()
            },
            EnumValueDescriptorProto {
                name: Some("STATUS_ARCHIVED".to_string()),
                number: Some(2),
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    let service = ServiceDescriptorProto {
        name: Some("CatalogueService".to_string()),
        method: vec![
            MethodDescriptorProto {
                name: Some("GetItem".to_string()),
                input_type: Some(".catalogue.GetItemRequest".to_string()),
                output_type: Some(".catalogue.Item".to_string()),
                ..Default::default()
            },
            MethodDescriptorProto {
                name: Some("CreateItem".to_string()),
                input_type: Some(".catalogue.Item".to_string()),
                output_type: Some(".catalogue.Item".to_string()),
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    FileDescriptorProto {
        name: Some("catalogue/catalogue.proto".to_string()),
        package: Some("catalogue".to_string()),
        dependency: vec!["google/protobuf/timestamp.proto".to_string()],
        message_type: vec![item, get_item_request],
        enum_type: vec![status],
        service: vec![service],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

fn health_file() -> FileDescriptorProto {
    use field_descriptor_proto::{Label, Type};

    FileDescriptorProto {
        name: Some("health/health.proto".to_string()),
        package: Some("health".to_string()),
        message_type: vec![DescriptorProto {
            name: Some("HealthStatus".to_string()),
            field: vec![field("ok", "ok", 1, Label::Optional, Type::Bool, None)],
            ..Default::default()
        }],
        service: vec![ServiceDescriptorProto {
            name: Some("Health".to_string()),
            method: vec![MethodDescriptorProto {
                name: Some("Check".to_string()),
                input_type: Some(".health.HealthStatus".to_string()),
                output_type: Some(".health.HealthStatus".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

fn sample_bytes() -> Vec<u8> {
    FileDescriptorSet {
        file: vec![timestamp_file(), catalogue_file(), health_file()],
    }
    .encode_to_vec()
}

#[test]
fn test_parse_services_and_methods() {
    let parser = ProtobufParser::from_file_descriptor_set(&sample_bytes()).unwrap();
    let api = parser.parse().unwrap();

    let names: Vec<&str> = api.services.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["CatalogueService", "Health"]);

    let catalogue = &api.services[0];
    assert_eq!(catalogue.full_name, "catalogue.CatalogueService");
    assert_eq!(catalogue.display_name(), "CatalogueService");
    assert_eq!(catalogue.methods.len(), 2);

    let get_item = &catalogue.methods[0];
    assert_eq!(get_item.name, "GetItem");
    assert_eq!(get_item.input_type, "catalogue.GetItemRequest");
    assert_eq!(get_item.output_type, "catalogue.Item");
    assert_eq!(get_item.http_rule, None, "no google.api.http in the pool");
    assert!(!get_item.options.skip_token);
}

#[test]
fn test_files_to_generate_filters_services_only() {
    let parser = ProtobufParser::from_file_descriptor_set(&sample_bytes())
        .unwrap()
        .with_files_to_generate(vec!["health/health.proto".to_string()]);
    let api = parser.parse().unwrap();

    assert_eq!(api.services.len(), 1);
    assert_eq!(api.services[0].name, "Health");

    // Types of other files stay resolvable
    assert!(api.message("catalogue.Item").is_some());
    assert!(api.message("google.protobuf.Timestamp").is_some());
}

#[test]
fn test_parse_message_fields() {
    let api = ProtobufParser::from_file_descriptor_set(&sample_bytes())
        .unwrap()
        .parse()
        .unwrap();

    let item = api.message("catalogue.Item").expect("Item should be converted");
    assert_eq!(item.schema_name, "catalogue.Item");
    assert!(!item.map_entry);

    let json_names: Vec<&str> = item.fields.iter().map(|f| f.json_name.as_str()).collect();
    assert_eq!(
        json_names,
        vec![
            "itemId",
            "price",
            "tags",
            "labels",
            "status",
            "createdAt",
            "parent",
            "variants"
        ]
    );

    let item_id = item.field("item_id").unwrap();
    assert_eq!(item_id.kind, FieldKind::String);
    assert_eq!(item_id.cardinality, Cardinality::Singular);
    assert_eq!(item_id.example, None);

    assert_eq!(item.field("price").unwrap().kind, FieldKind::Double);
    assert_eq!(
        item.field("tags").unwrap().cardinality,
        Cardinality::Repeated
    );

    let labels = item.field("labels").unwrap();
    assert_eq!(labels.cardinality, Cardinality::Map);
    assert_eq!(
        labels.kind,
        FieldKind::Message("catalogue.Item.LabelsEntry".to_string())
    );

    assert_eq!(
        item.field("status").unwrap().kind,
        FieldKind::Enum("catalogue.Status".to_string())
    );
    assert_eq!(
        item.field("created_at").unwrap().kind,
        FieldKind::Message("google.protobuf.Timestamp".to_string())
    );
    assert_eq!(
        item.field("parent").unwrap().kind,
        FieldKind::Message("catalogue.Item".to_string())
    );
}

#[test]
fn test_parse_nested_types_and_enums() {
    let api = ProtobufParser::from_file_descriptor_set(&sample_bytes())
        .unwrap()
        .parse()
        .unwrap();

    let entry = api.message("catalogue.Item.LabelsEntry").unwrap();
    assert!(entry.map_entry);
    assert!(entry.field("value").is_some());

    let variant = api.message("catalogue.Item.Variant").unwrap();
    assert_eq!(variant.schema_name, "catalogue.Item_Variant");

    let status = api.enum_type("catalogue.Status").unwrap();
    assert_eq!(
        status.values,
        vec!["STATUS_UNSPECIFIED", "STATUS_ACTIVE", "STATUS_ARCHIVED"]
    );
}

#[test]
fn test_from_file() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("catalogue.pb");
    std::fs::write(&path, sample_bytes()).unwrap();

    let api = ProtobufParser::from_file(&path).unwrap().parse().unwrap();
    assert_eq!(api.services.len(), 2);

    let missing = ProtobufParser::from_file(temp_dir.path().join("missing.pb"));
    assert!(missing.is_err());
}

/// Dependency whose name ends like the target's
fn workshop_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("workshop.proto".to_string()),
        service: vec![ServiceDescriptorProto {
            name: Some("Workshop".to_string()),
            method: vec![MethodDescriptorProto {
                name: Some("Build".to_string()),
                input_type: Some(".health.HealthStatus".to_string()),
                output_type: Some(".health.HealthStatus".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }],
        dependency: vec!["health/health.proto".to_string()],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

fn shop_file() -> FileDescriptorProto {
    use field_descriptor_proto::{Label, Type};

    FileDescriptorProto {
        name: Some("shop.proto".to_string()),
        message_type: vec![DescriptorProto {
            name: Some("BadRequestError".to_string()),
            field: vec![field(
                "field_violations",
                "fieldViolations",
                1,
                Label::Repeated,
                Type::String,
                None,
            )],
            ..Default::default()
        }],
        service: vec![ServiceDescriptorProto {
            name: Some("Shop".to_string()),
            method: vec![MethodDescriptorProto {
                name: Some("Validate".to_string()),
                input_type: Some(".BadRequestError".to_string()),
                output_type: Some(".BadRequestError".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

fn shop_bytes() -> Vec<u8> {
    FileDescriptorSet {
        file: vec![health_file(), workshop_file(), shop_file()],
    }
    .encode_to_vec()
}

#[test]
fn test_files_to_generate_matches_whole_names() {
    let api = ProtobufParser::from_file_descriptor_set(&shop_bytes())
        .unwrap()
        .with_files_to_generate(vec!["shop.proto".to_string()])
        .parse()
        .unwrap();

    let names: Vec<&str> = api.services.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Shop"]);
}

#[test]
fn test_package_less_schema_name_keeps_dot() {
    let api = ProtobufParser::from_file_descriptor_set(&shop_bytes())
        .unwrap()
        .parse()
        .unwrap();

    let message = api.message("BadRequestError").unwrap();
    assert_eq!(message.schema_name, ".BadRequestError");
    let shop = api.services.iter().find(|s| s.name == "Shop").unwrap();
    assert_eq!(shop.methods[0].input_type, "BadRequestError");
}
