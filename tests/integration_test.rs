use relalg::algebra::ParseError;
use relalg::{
    tuple, CatalogError, Database, EngineConfig, JoinStrategy, Relation, SchemaError,
    StatementOutcome,
};
use std::thread;
use tempfile::tempdir;

const MUSIC: &str = "
    CREATE RELATION Artist (name VARCHAR PRIMARY KEY, year INT, country VARCHAR);
    INSERT INTO Artist VALUES
        ('Wu-Tang Clan', 1992, 'USA'),
        ('GZA', 1991, 'USA'),
        ('Oasis', 1991, 'UK');
";

const KEYS: &str = "
    CREATE RELATION R (a_id VARCHAR, b_id INT);
    CREATE RELATION S (b_id INT, value VARCHAR);
    INSERT INTO R VALUES ('A1', 100), ('A2', 101), ('A3', 102);
    INSERT INTO S VALUES (100, 'X'), (101, 'Y');
";

const COMPANY: &str = "
    CREATE RELATION Dept (id INT PRIMARY KEY, title VARCHAR);
    CREATE RELATION Emp (
        name VARCHAR,
        dept INT,
        PRIMARY KEY (name),
        FOREIGN KEY (dept) REFERENCES Dept (id)
    );
    INSERT INTO Dept VALUES (1, 'Research'), (2, 'Sales');
    INSERT INTO Emp VALUES ('Ann', 1), ('Bo', 1), ('Cy', 2);
";

fn database(script: &str) -> Database {
    let db = Database::default();
    db.execute(script).unwrap();
    db
}

fn single_relation(outcomes: Vec<StatementOutcome>) -> Relation {
    match outcomes.into_iter().last() {
        Some(StatementOutcome::Relation { relation, .. }) => relation,
        other => panic!("expected a relation, got {:?}", other),
    }
}

#[test]
fn test_select_artists_from_usa() {
    let db = database(MUSIC);
    let result = db.query("select[country = 'USA'](Artist)").unwrap();

    assert_eq!(result.len(), 2);
    assert!(result.contains(&tuple!["Wu-Tang Clan", 1992, "USA"]));
    assert!(result.contains(&tuple!["GZA", 1991, "USA"]));
    assert_eq!(result.schema(), db.relation("Artist").unwrap().schema());
}

#[test]
fn test_project_years() {
    let db = database(MUSIC);
    let result = db.query("π[year](Artist)").unwrap();

    // Two tuples, the duplicate 1991 collapses
    assert_eq!(result.len(), 2);
    assert!(result.contains(&tuple![1992]));
    assert!(result.contains(&tuple![1991]));
    assert_eq!(result.schema().len(), 1);
}

#[test]
fn test_natural_join_drops_unmatched() {
    for strategy in [
        JoinStrategy::Auto,
        JoinStrategy::NestedLoop,
        JoinStrategy::Hash,
        JoinStrategy::SortMerge,
    ] {
        let db = Database::new(EngineConfig::default().with_join_strategy(strategy));
        db.execute(KEYS).unwrap();
        let result = single_relation(db.execute("R ⋈ S;").unwrap());

        assert_eq!(result.len(), 2, "strategy {}", strategy);
        assert!(result.contains(&tuple!["A1", 100, "X"]));
        assert!(result.contains(&tuple!["A2", 101, "Y"]));
        assert_eq!(result.schema().display_names(), vec!["a_id", "b_id", "value"]);
    }
}

#[test]
fn test_set_operations_require_compatible_schemas() {
    let db = database(&format!("{}{}", MUSIC, KEYS));
    for operator in ["union", "intersect", "minus"] {
        let err = db.query(&format!("Artist {} R", operator)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SchemaError>(),
            Some(&SchemaError::ArityMismatch { left: 3, right: 2 }),
            "{}",
            operator
        );
    }

    // Same arity but different domains is rejected as well
    let err = db.query("R union S").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SchemaError>(),
        Some(SchemaError::DomainMismatch { position: 0, .. })
    ));
}

#[test]
fn test_composed_expression() {
    let db = database(&format!("{}{}", MUSIC, COMPANY));
    let result = db
        .query(
            "project[name](select[year = 1991](Artist))
             union project[Emp.name](select[dept = 2](Emp))",
        )
        .unwrap();
    assert_eq!(result.len(), 3);
    assert!(result.contains(&tuple!["Cy"]));

    let result = db
        .query("project[Emp.name, title](Emp join[Emp.dept = Dept.id] Dept) minus project[Emp.name, title](select[title = 'Sales'](Emp times Dept))")
        .unwrap();
    assert_eq!(result.len(), 2);
    assert!(result.contains(&tuple!["Ann", "Research"]));
    assert!(result.contains(&tuple!["Bo", "Research"]));
}

#[test]
fn test_constraints_leave_store_unchanged() {
    let db = database(COMPANY);
    let before_emp = db.relation("Emp").unwrap();
    let before_dept = db.relation("Dept").unwrap();

    // Duplicate primary key, and the whole batch is rejected
    let err = db
        .execute("INSERT INTO Emp VALUES ('Dee', 2), ('Ann', 2);")
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CatalogError>(),
        Some(CatalogError::PrimaryKeyViolation { .. })
    ));

    // Dangling foreign key
    let err = db.execute("INSERT INTO Emp VALUES ('Dee', 9);").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CatalogError>(),
        Some(CatalogError::ForeignKeyViolation { .. })
    ));

    // Referenced keys cannot be deleted, changed or dropped
    let err = db.execute("DELETE FROM Dept WHERE id = 2;").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CatalogError>(),
        Some(CatalogError::RestrictViolation { .. })
    ));
    let err = db.execute("UPDATE Dept SET id = 3 WHERE id = 1;").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CatalogError>(),
        Some(CatalogError::RestrictViolation { .. })
    ));
    let err = db.execute("DROP RELATION Dept;").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CatalogError>(),
        Some(CatalogError::DropReferenced { .. })
    ));

    assert_eq!(db.relation("Emp").unwrap(), before_emp);
    assert_eq!(db.relation("Dept").unwrap(), before_dept);

    // Inserting an identical tuple again is a no-op, not a violation
    let outcomes = db.execute("INSERT INTO Emp VALUES ('Ann', 1);").unwrap();
    assert_eq!(
        outcomes,
        vec![StatementOutcome::Inserted {
            relation: "Emp".to_string(),
            count: 0
        }]
    );

    // Unreferenced tuples can go, and then so can the relation
    db.execute("DELETE FROM Emp WHERE dept = 2; DELETE FROM Dept WHERE id = 2; DROP RELATION Emp; DROP RELATION Dept;")
        .unwrap();
    assert!(db.relation_names().is_empty());
}

#[test]
fn test_derived_relations() {
    let db = database(MUSIC);
    let outcomes = db
        .execute("LET Nineties = select[year >= 1990 AND year < 2000](Artist);")
        .unwrap();
    assert_eq!(
        outcomes,
        vec![StatementOutcome::Defined {
            name: "Nineties".to_string(),
            tuples: 3
        }]
    );

    // The derived relation is a value: later changes to Artist do not reach it
    db.execute("DELETE FROM Artist WHERE country = 'UK';").unwrap();
    assert_eq!(db.relation("Nineties").unwrap().len(), 3);

    for statement in [
        "INSERT INTO Nineties VALUES ('Blur', 1991, 'UK')",
        "DELETE FROM Nineties",
        "UPDATE Nineties SET year = 2000",
    ] {
        let err = db.execute(statement).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CatalogError>(),
            Some(&CatalogError::ReadOnlyRelation("Nineties".to_string())),
            "{}",
            statement
        );
    }

    let err = db.execute("LET Artist = Nineties;").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CatalogError>(),
        Some(CatalogError::RelationExists(_))
    ));
}

#[test]
fn test_strict_grouping() {
    let query = "select[country = 'UK' OR country = 'USA' AND year = 1991](Artist)";

    // NOT > AND > OR: the AND binds first
    let db = database(MUSIC);
    let result = db.query(query).unwrap();
    assert_eq!(result.len(), 2);
    assert!(result.contains(&tuple!["Oasis", 1991, "UK"]));
    assert!(result.contains(&tuple!["GZA", 1991, "USA"]));

    let db = Database::new(EngineConfig::default().with_strict_grouping(true));
    db.execute(MUSIC).unwrap();
    let err = db.query(query).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ParseError>(),
        Some(ParseError::MixedLogicalOperators(_))
    ));

    let grouped = db
        .query("select[(country = 'UK' OR country = 'USA') AND year = 1991](Artist)")
        .unwrap();
    assert_eq!(grouped.len(), 2);
}

#[test]
fn test_snapshot_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.snap");

    let db = database(&format!("{}{}", MUSIC, COMPANY));
    db.execute("LET Usa = select[country = 'USA'](Artist);").unwrap();
    db.save_snapshot(&path).unwrap();

    let restored = Database::open(&path, EngineConfig::default()).unwrap();
    assert_eq!(restored.relation_names(), db.relation_names());
    for name in db.relation_names() {
        assert_eq!(restored.relation(&name).unwrap(), db.relation(&name).unwrap());
    }

    // Keys and the read-only flag came back too
    assert!(restored.execute("INSERT INTO Emp VALUES ('Dee', 9);").is_err());
    assert!(restored.execute("DELETE FROM Usa;").is_err());

    // Loading into an existing database replaces its store
    let other = database(KEYS);
    other.load_snapshot(&path).unwrap();
    assert_eq!(other.relation_names(), db.relation_names());
}

#[test]
fn test_explain_statement() {
    let db = database(KEYS);
    let outcomes = db.execute("EXPLAIN select[value = 'X'](R join S);").unwrap();
    let StatementOutcome::Plan(plan) = &outcomes[0] else {
        panic!("expected a plan, got {:?}", outcomes[0]);
    };
    // The selection is pushed below the join onto S
    let lines: Vec<&str> = plan.lines().map(str::trim).collect();
    assert!(lines[0].starts_with("Projection"));
    assert!(lines[1].starts_with("HashJoin"));
    assert_eq!(lines[2], "Scan: R (3 tuples)");
    assert!(lines[3].starts_with("Filter"));
    assert_eq!(lines[4], "Scan: S (2 tuples)");

    let unoptimized = Database::new(EngineConfig::default().with_optimize(false));
    unoptimized.execute(KEYS).unwrap();
    let plan = unoptimized.explain("select[value = 'X'](R join S)").unwrap();
    assert!(plan.starts_with("Filter"));
    assert_eq!(
        unoptimized.query("select[value = 'X'](R join S)").unwrap(),
        db.query("select[value = 'X'](R join S)").unwrap()
    );
}

#[test]
fn test_concurrent_readers() {
    let db = database(KEYS);
    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..20 {
                    let result = db.query("R join S").unwrap();
                    assert_eq!(result.len(), 2);
                }
            });
        }
        scope.spawn(|| {
            db.execute("LET T = R join S;").unwrap();
        });
    });
    assert_eq!(db.relation("T").unwrap().len(), 2);

    // R × S has both R.b_id and S.b_id, which would collide under T
    let err = db.execute("LET U = R times S;").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SchemaError>(),
        Some(SchemaError::DuplicateAttribute { .. })
    ));
}
