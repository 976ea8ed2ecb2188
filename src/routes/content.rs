//! Portfolio content routes: singletons, collections, foreign-key lookups.

use crate::handlers::{entity, singleton};
use crate::model::{
    Bio, Contact, Copyright, Education, Experience, Project, ProjectAssociation, ProjectMember, Record, Singleton,
    Skill, SkillCategory,
};
use crate::state::AppState;
use axum::{routing::get, Router};

fn singleton_route<R: Singleton>(router: Router<AppState>, path: &str) -> Router<AppState> {
    router.route(path, get(singleton::fetch::<R>).put(singleton::save::<R>))
}

/// `GET/POST <path>` and `GET/PUT/DELETE <path>/:id`.
fn collection<R: Record>(router: Router<AppState>, path: &str) -> Router<AppState> {
    router
        .route(path, get(entity::list::<R>).post(entity::create::<R>))
        .route(
            &format!("{}/:id", path),
            get(entity::read::<R>)
                .put(entity::update::<R>)
                .delete(entity::delete::<R>),
        )
}

pub fn content_routes() -> Router<AppState> {
    let mut router = Router::new();
    router = singleton_route::<Bio>(router, "/bio");
    router = singleton_route::<Copyright>(router, "/copyright");
    router = collection::<Education>(router, "/education");
    router = collection::<Experience>(router, "/experiences");
    router = collection::<Project>(router, "/projects");
    router = collection::<ProjectMember>(router, "/members");
    router = collection::<ProjectAssociation>(router, "/associations");
    router = collection::<Skill>(router, "/skills");
    router = collection::<SkillCategory>(router, "/skill_categories");
    router = collection::<Contact>(router, "/contacts");
    router
        .route("/projects/:id/members", get(entity::project_members))
        .route("/projects/:id/associations", get(entity::project_associations))
        .route("/skill_categories/:id/skills", get(entity::category_skills))
}
