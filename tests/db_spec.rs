use chrono::NaiveDate;
use chronicle::db::Database;
use chronicle::models::dates::start_of_day;
use chronicle::models::*;
use chronicle::store::{CountryStore, StoreError};
use speculate2::speculate;
use uuid::Uuid;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn president(name: &str, begins: NaiveDate, ends: Option<NaiveDate>) -> President {
    let mut events = vec![TimelineEvent::new(
        start_of_day(begins),
        Some(EventType::TermBegins),
        "Sworn in",
    )];
    if let Some(ends) = ends {
        events.push(TimelineEvent::new(
            start_of_day(ends),
            Some(EventType::TermEnds),
            "Left office",
        ));
    }
    President {
        name: name.to_string(),
        party: "Union".to_string(),
        birth: day(1900, 1, 1),
        death: None,
        events,
        image_url: None,
    }
}

fn monarch(name: &str, start: NaiveDate, end: Option<NaiveDate>) -> Monarch {
    Monarch {
        name: name.to_string(),
        birth: day(1880, 1, 1),
        death: None,
        start_reign: start,
        end_reign: end,
        death_cause: None,
        notes: None,
        image_url: None,
    }
}

fn input(code: &str, name: &str) -> CountryInput {
    CountryInput {
        code: code.to_string(),
        name: name.to_string(),
        start: day(1900, 1, 1),
        end: None,
        presidents: vec![president("Ada", day(1950, 1, 1), Some(day(1960, 1, 1)))],
        monarchs: vec![monarch("Rudolf", day(1900, 1, 1), Some(day(1950, 1, 1)))],
    }
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "countries" {
        describe "create_country" {
            it "stores the whole record" {
                let created = db.create_country(input("ruritania", "Ruritania"))
                    .expect("Failed to create country");

                let found = db.get_country(created.id).expect("Query failed").expect("Country missing");
                assert_eq!(found, created);
                assert_eq!(found.presidents[0].events.len(), 2);
                assert_eq!(found.monarchs[0].name, "Rudolf");
            }

            it "rejects malformed codes" {
                let err = db.create_country(input("Ruritania!", "Ruritania")).unwrap_err();
                assert!(matches!(err, StoreError::Validation(_)));
            }

            it "rejects blank names" {
                let err = db.create_country(input("ruritania", "  ")).unwrap_err();
                assert!(matches!(err, StoreError::Validation(_)));
            }

            it "rejects a code that is already taken" {
                db.create_country(input("ruritania", "Ruritania")).expect("Failed to create");
                let err = db.create_country(input("ruritania", "Other")).unwrap_err();
                assert!(matches!(err, StoreError::Conflict(_)));
            }
        }

        describe "get_country" {
            it "returns None for non-existent country" {
                let result = db.get_country(Uuid::new_v4()).expect("Query failed");
                assert!(result.is_none());
            }

            it "finds countries by code" {
                let created = db.create_country(input("ruritania", "Ruritania")).expect("Failed to create");
                let found = db.get_country_by_code("ruritania").expect("Query failed");
                assert_eq!(found.map(|c| c.id), Some(created.id));
            }
        }

        describe "list_countries" {
            it "returns empty list when no countries exist" {
                assert!(db.list_countries().expect("Query failed").is_empty());
            }

            it "returns summaries ordered by name" {
                db.create_country(input("zembla", "Zembla")).expect("Failed to create");
                db.create_country(input("genovia", "Genovia")).expect("Failed to create");

                let names: Vec<_> = db.list_countries().expect("Query failed")
                    .into_iter()
                    .map(|c| c.name)
                    .collect();
                assert_eq!(names, vec!["Genovia", "Zembla"]);
            }
        }

        describe "update_country" {
            it "replaces every field and keeps created_at" {
                let created = db.create_country(input("ruritania", "Ruritania")).expect("Failed to create");

                let mut replacement = input("ruritania-2", "New Ruritania");
                replacement.end = Some(day(1999, 12, 31));
                replacement.monarchs.clear();

                let updated = db.update_country(created.id, replacement).expect("Failed to update");
                assert_eq!(updated.code, "ruritania-2");
                assert_eq!(updated.end, Some(day(1999, 12, 31)));
                assert!(updated.monarchs.is_empty());
                assert_eq!(updated.created_at, created.created_at);

                let found = db.get_country(created.id).expect("Query failed").expect("Country missing");
                assert_eq!(found, updated);
            }

            it "keeps its own code without a conflict" {
                let created = db.create_country(input("ruritania", "Ruritania")).expect("Failed to create");
                assert!(db.update_country(created.id, input("ruritania", "Renamed")).is_ok());
            }

            it "refuses to take another country's code" {
                db.create_country(input("genovia", "Genovia")).expect("Failed to create");
                let created = db.create_country(input("ruritania", "Ruritania")).expect("Failed to create");

                let err = db.update_country(created.id, input("genovia", "Ruritania")).unwrap_err();
                assert!(matches!(err, StoreError::Conflict(_)));
            }

            it "reports unknown countries as not found" {
                let id = Uuid::new_v4();
                let err = db.update_country(id, input("ruritania", "Ruritania")).unwrap_err();
                assert!(matches!(err, StoreError::NotFound(missing) if missing == id));
            }

            it "reports a deleted country as not found" {
                let created = db.create_country(input("ruritania", "Ruritania")).expect("Failed to create");
                assert!(db.delete_country(created.id).expect("Delete failed"));

                let err = db.update_country(created.id, input("ruritania", "Ruritania")).unwrap_err();
                assert!(matches!(err, StoreError::NotFound(missing) if missing == created.id));
                assert!(db.get_country_by_code("ruritania").expect("Query failed").is_none());
            }

            it "never reports success for a row deleted concurrently" {
                let created = db.create_country(input("ruritania", "Ruritania")).expect("Failed to create");
                let writer = db.clone();
                let id = created.id;
                let updates = std::thread::spawn(move || {
                    (0..50)
                        .map(|k| writer.update_country(id, input("ruritania", &format!("Ruritania {k}"))))
                        .collect::<Vec<_>>()
                });
                assert!(db.delete_country(id).expect("Delete failed"));

                let results = updates.join().expect("Update thread panicked");
                let first_missing = results.iter().position(|r| r.is_err()).unwrap_or(results.len());
                assert!(results[..first_missing].iter().all(|r| r.is_ok()));
                assert!(results[first_missing..]
                    .iter()
                    .all(|r| matches!(r, Err(StoreError::NotFound(missing)) if *missing == id)));
                assert!(db.get_country(id).expect("Query failed").is_none());
            }
        }

        describe "delete_country" {
            it "removes the country" {
                let created = db.create_country(input("ruritania", "Ruritania")).expect("Failed to create");
                assert!(db.delete_country(created.id).expect("Delete failed"));
                assert!(db.get_country(created.id).expect("Query failed").is_none());
            }

            it "returns false for non-existent country" {
                assert!(!db.delete_country(Uuid::new_v4()).expect("Delete failed"));
            }
        }

        describe "as a country store" {
            it "loads what it created" {
                let created = tokio_test::block_on(db.create(input("ruritania", "Ruritania")))
                    .expect("Failed to create");
                let loaded = tokio_test::block_on(db.load(created.id)).expect("Failed to load");
                assert_eq!(loaded, created);
            }

            it "fails to load unknown ids" {
                let err = tokio_test::block_on(db.load(Uuid::new_v4())).unwrap_err();
                assert!(err.is_not_found());
            }
        }
    }

    describe "on disk" {
        it "persists across reopen" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("data").join("chronicle.db");

            let id = {
                let disk = Database::open(path.clone()).expect("Failed to open");
                disk.migrate().expect("Failed to migrate");
                disk.create_country(input("ruritania", "Ruritania")).expect("Failed to create").id
            };

            let reopened = Database::open(path).expect("Failed to reopen");
            reopened.migrate().expect("Failed to migrate");
            let found = reopened.get_country(id).expect("Query failed");
            assert_eq!(found.map(|c| c.code), Some("ruritania".to_string()));
        }
    }
}
