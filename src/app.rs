use crate::handlers::{auth, expenses, focus, habits, journals, notes, pages, settings, tasks};
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(auth::index))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/api/dashboard", get(pages::dashboard))
        .route("/api/todos", get(pages::todos))
        .route("/api/notes", get(pages::notes).post(notes::create))
        .route("/api/habits", get(pages::habits).post(habits::create))
        .route("/api/journals", get(pages::journals).post(journals::create))
        .route("/api/expenses", get(pages::expenses).post(expenses::create))
        .route("/api/focus", get(pages::focus))
        .route("/api/settings", get(pages::settings))
        .route("/api/tasks", post(tasks::create))
        .route(
            "/api/tasks/:id",
            get(tasks::get)
                .put(tasks::update)
                .patch(tasks::set_status)
                .delete(tasks::delete),
        )
        .route(
            "/api/notes/:id",
            get(notes::get).put(notes::update).delete(notes::delete),
        )
        .route("/api/notes/:id/pin", post(notes::toggle_pin))
        .route(
            "/api/journals/:id",
            get(journals::get).put(journals::update).delete(journals::delete),
        )
        .route(
            "/api/habits/:id",
            get(habits::get).put(habits::update).delete(habits::delete),
        )
        .route("/api/habits/:id/log", post(habits::log))
        .route("/api/habits/:id/skip", post(habits::skip))
        .route(
            "/api/expenses/:id",
            get(expenses::get).put(expenses::update).delete(expenses::delete),
        )
        .route("/api/budget", put(expenses::set_budget))
        .route("/api/savings", post(expenses::create_goal))
        .route(
            "/api/savings/:id",
            put(expenses::update_goal).delete(expenses::delete_goal),
        )
        .route("/api/savings/:id/contribute", post(expenses::contribute))
        .route("/api/focus/goal", put(focus::set_goal))
        .route("/api/focus/session", post(focus::record_session))
        .route("/api/settings/theme", put(settings::set_theme))
        .with_state(state)
}
