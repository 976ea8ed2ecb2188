//! Repository behaviour against the in-memory table client.

use std::sync::Arc;

use portfolio_cms::model::{Bio, Copyright, Education, Project, ProjectMember, Skill, SkillCategory, BIO};
use portfolio_cms::{AppError, MemoryTableClient, Repository, SingletonRepository, TableClient};
use serde_json::Value;

fn client() -> Arc<dyn TableClient> {
    Arc::new(MemoryTableClient::new())
}

fn education(institution: &str) -> Education {
    Education {
        institution: institution.into(),
        degree: "BSc Computer Science".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_then_fetch_includes_assigned_key() {
    let repo: Repository<Education> = Repository::new(client());
    let created = repo.create(&education("TU Delft")).await.unwrap();
    assert_eq!(created.id, Some(1));
    assert_eq!(created.sort_order, Some(0));

    let all = repo.fetch().await.unwrap();
    assert_eq!(all, vec![created]);
}

#[tokio::test]
async fn fetch_is_ordered_by_key() {
    let repo: Repository<Education> = Repository::new(client());
    for name in ["A", "B", "C"] {
        repo.create(&education(name)).await.unwrap();
    }
    let ids: Vec<_> = repo.fetch().await.unwrap().into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
}

#[tokio::test]
async fn update_changes_fields_and_keeps_the_rest() {
    let repo: Repository<Education> = Repository::new(client());
    let mut created = repo
        .create(&Education {
            field_of_study: Some("Databases".into()),
            ..education("KTH")
        })
        .await
        .unwrap();

    created.degree = "MSc Computer Science".into();
    let updated = repo.update(&created).await.unwrap();
    assert_eq!(updated.degree, "MSc Computer Science");
    assert_eq!(updated.field_of_study.as_deref(), Some("Databases"));

    let stored = repo.get(&1).await.unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn update_without_key_is_rejected_before_any_request() {
    let repo: Repository<Education> = Repository::new(client());
    let err = repo.update(&education("EPFL")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(repo.fetch().await.unwrap().is_empty());
}

#[tokio::test]
async fn blank_required_field_is_a_validation_error() {
    let repo: Repository<Education> = Repository::new(client());
    let err = repo.create(&education("   ")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(repo.fetch().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_removes_and_missing_key_is_not_an_error() {
    let repo: Repository<Education> = Repository::new(client());
    let a = repo.create(&education("A")).await.unwrap();
    let b = repo.create(&education("B")).await.unwrap();

    repo.delete(&a.id.unwrap()).await.unwrap();
    assert_eq!(repo.fetch().await.unwrap(), vec![b]);

    repo.delete(&999).await.unwrap();
    assert_eq!(repo.fetch().await.unwrap().len(), 1);
}

#[tokio::test]
async fn category_with_skills_cannot_be_deleted() {
    let tables = client();
    let categories: Repository<SkillCategory> = Repository::new(tables.clone());
    let skills: Repository<Skill> = Repository::new(tables);

    let langs = categories
        .create(&SkillCategory {
            name: "Languages".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let cat_id = langs.id.unwrap();
    let rust = skills
        .create(&Skill {
            name: "Rust".into(),
            category_id: Some(cat_id),
            proficiency: Some(90),
            ..Default::default()
        })
        .await
        .unwrap();

    let err = categories.delete(&cat_id).await.unwrap_err();
    match err {
        AppError::Conflict(msg) => assert!(msg.contains("1 row(s) in skills"), "{}", msg),
        other => panic!("expected conflict, got {:?}", other),
    }
    assert_eq!(categories.fetch().await.unwrap().len(), 1);

    skills.delete(&rust.id.unwrap()).await.unwrap();
    categories.delete(&cat_id).await.unwrap();
    assert!(categories.fetch().await.unwrap().is_empty());
}

#[tokio::test]
async fn fetch_where_filters_on_foreign_key() {
    let tables = client();
    let projects: Repository<Project> = Repository::new(tables.clone());
    let members: Repository<ProjectMember> = Repository::new(tables);

    let a = projects
        .create(&Project {
            title: "CMS".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let b = projects
        .create(&Project {
            title: "Compiler".into(),
            tags: vec!["rust".into()],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(b.tags, vec!["rust".to_string()]);
    assert_eq!(a.featured, Some(false));

    for (project, name) in [(&a, "Ada"), (&b, "Grace"), (&a, "Linus")] {
        members
            .create(&ProjectMember {
                project_id: project.id.unwrap(),
                name: name.into(),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let on_a = members
        .fetch_where("project_id", Value::String(a.id.unwrap().to_string()))
        .await
        .unwrap();
    let names: Vec<_> = on_a.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Ada", "Linus"]);

    let err = members.fetch_where("nope", Value::Null).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn singleton_save_is_revision_guarded() {
    let repo: SingletonRepository<Bio> = SingletonRepository::new(client());
    assert!(repo.fetch().await.unwrap().is_none());

    let first = repo
        .save(&Bio {
            name: "Ada Lovelace".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(first.id, Some(1));
    assert_eq!(first.revision, Some(1));

    let second = repo
        .save(&Bio {
            title: Some("Analyst".into()),
            ..first.clone()
        })
        .await
        .unwrap();
    assert_eq!(second.revision, Some(2));

    let stale = Bio {
        name: "Someone Else".into(),
        ..first
    };
    let err = repo.save(&stale).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let stored = repo.fetch().await.unwrap().unwrap();
    assert_eq!(stored.name, "Ada Lovelace");
    assert_eq!(stored.title.as_deref(), Some("Analyst"));
    assert_eq!(stored.revision, Some(2));
}

#[tokio::test]
async fn singleton_rejects_second_row_and_missing_revision() {
    let repo: SingletonRepository<Copyright> = SingletonRepository::new(client());
    let saved = repo
        .save(&Copyright {
            holder: "Ada Lovelace".into(),
            year_start: 2020,
            ..Default::default()
        })
        .await
        .unwrap();

    let duplicate = Copyright {
        holder: "Other".into(),
        year_start: 2021,
        ..Default::default()
    };
    assert!(matches!(repo.save(&duplicate).await, Err(AppError::Conflict(_))));

    let no_revision = Copyright {
        revision: None,
        ..saved
    };
    assert!(matches!(repo.save(&no_revision).await, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn singleton_save_under_a_foreign_id_never_adds_a_row() {
    let repo: SingletonRepository<Bio> = SingletonRepository::new(client());
    let stored = repo
        .save(&Bio {
            name: "Ada".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let foreign = Bio {
        id: Some(99),
        name: "Grace".into(),
        revision: stored.revision,
        ..Default::default()
    };
    let err = repo.save(&foreign).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let tables = client();
    let fresh: SingletonRepository<Bio> = SingletonRepository::new(tables.clone());
    let err = fresh
        .save(&Bio {
            id: Some(7),
            name: "Grace".into(),
            revision: Some(1),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(tables.select(&BIO, &[]).await.unwrap().is_empty());

    let current = repo.fetch().await.unwrap().unwrap();
    assert_eq!(current, stored);
}

#[tokio::test]
async fn singleton_validation_runs_before_save() {
    let repo: SingletonRepository<Copyright> = SingletonRepository::new(client());
    let err = repo
        .save(&Copyright {
            holder: "Ada".into(),
            year_start: 1800,
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(repo.fetch().await.unwrap().is_none());
}
