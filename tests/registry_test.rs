mod common;

use common::{MockConnection, T_USERS, fixture};
use pgmapper::registry::COLUMNS_QUERY;
use pgmapper::{ColumnType, MapperError, Param, Registry};

#[test]
fn test_register_t_users() {
    let mut conn = fixture();
    let registry = Registry::new();

    assert_eq!(registry.register(&mut conn, "t_users").unwrap(), 8);
    assert_eq!(registry.len(), 8);

    let expected = [
        ("t_users.id", ColumnType::String),
        ("t_users.email", ColumnType::NullableString),
        ("t_users.age", ColumnType::Int64),
        ("t_users.active", ColumnType::Bool),
        ("t_users.email_verified", ColumnType::NullableBool),
        ("t_users.no_of_licenses", ColumnType::NullableInt64),
        ("t_users.last_payment_at", ColumnType::NullableTimestamp),
        ("t_users.created_at", ColumnType::Timestamp),
    ];
    for (key, ty) in expected {
        assert_eq!(registry.column_type(key), Some(ty), "{key}");
    }
}

#[test]
fn test_register_binds_table_name() {
    let mut conn = fixture();
    let registry = Registry::new();
    registry.register(&mut conn, "t_roles").unwrap();

    let (sql, args) = conn.last_query().unwrap();
    assert_eq!(sql, COLUMNS_QUERY);
    assert_eq!(args, vec![Param::from("t_roles")]);
    assert_eq!(conn.open_cursors(), 0);
    assert_eq!(conn.released_cursors(), 1);
}

#[test]
fn test_register_is_idempotent() {
    let mut conn = fixture();
    let registry = Registry::new();

    registry.register(&mut conn, "t_users").unwrap();
    registry.register(&mut conn, "t_users").unwrap();
    assert_eq!(registry.len(), 8);
}

#[test]
fn test_register_all_sums_columns() {
    let mut conn = fixture();
    let registry = Registry::new();

    let total = registry
        .register_all(&mut conn, ["t_users", "t_roles", "t_user_roles"])
        .unwrap();
    assert_eq!(total, 14);
    assert_eq!(registry.len(), 14);
    assert_eq!(registry.column_type("t_roles.required_karma"), Some(ColumnType::Int64));
}

#[test]
fn test_unknown_table_registers_nothing() {
    let mut conn = fixture();
    let registry = Registry::new();

    assert_eq!(registry.register(&mut conn, "t_missing").unwrap(), 0);
    assert!(registry.is_empty());
}

#[test]
fn test_unsupported_type_is_all_or_nothing() {
    let mut conn = MockConnection::new().with_table(
        "t_events",
        &[
            ("id", "character varying", "NO"),
            ("payload", "jsonb", "YES"),
            ("created_at", "timestamp with time zone", "NO"),
        ],
    );
    let registry = Registry::new();

    let err = registry.register(&mut conn, "t_events").unwrap_err();
    assert!(matches!(err, MapperError::InvalidDataType(ref ty) if ty == "jsonb"));
    assert_eq!(registry.column_type("t_events.id"), None);
    assert!(registry.is_empty());
    assert_eq!(conn.open_cursors(), 0);
}

#[test]
fn test_bad_nullable_flag_is_rejected() {
    let mut conn = MockConnection::new().with_table("t_flags", &[("id", "integer", "maybe")]);
    let registry = Registry::new();

    let err = registry.register(&mut conn, "t_flags").unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid value for nullable, got \"maybe\", expected one of (\"YES\", \"NO\")"
    );
    assert!(registry.is_empty());
}

#[test]
fn test_catalog_failure_is_schema_load() {
    let mut conn = fixture();
    conn.state.lock().catalog_error = Some("connection reset".to_string());
    let registry = Registry::new();

    let err = registry.register(&mut conn, "t_users").unwrap_err();
    match err {
        MapperError::SchemaLoad { table, source } => {
            assert_eq!(table, "t_users");
            assert_eq!(source.to_string(), "connection reset");
        }
        other => panic!("expected SchemaLoad, got {other:?}"),
    }
    assert!(registry.is_empty());
}

#[test]
fn test_failed_table_keeps_earlier_registrations() {
    let mut conn = fixture().with_table("t_bad", &[("id", "bigint", "NO")]);
    let registry = Registry::new();

    let err = registry
        .register_all(&mut conn, ["t_roles", "t_bad", "t_users"])
        .unwrap_err();
    assert!(matches!(err, MapperError::InvalidDataType(_)));
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.column_type("t_users.id"), None);
}

#[test]
fn test_concurrent_registration() {
    let registry = Registry::new();

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let mut conn = fixture();
                registry.register_all(&mut conn, ["t_users", "t_roles"]).unwrap();
            });
        }
        s.spawn(|| {
            // Readers only ever see a table fully registered or not at all.
            for _ in 0..100 {
                let seen = registry.columns_of("t_users").len();
                assert!(seen == 0 || seen == T_USERS.len());
            }
        });
    });

    assert_eq!(registry.len(), 11);
}
