use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use handlebars::Handlebars;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, RwLock};
use tower_http::services::ServeDir;

use crate::api::CuzlerClient;
use crate::config::AppConfig;
use crate::downloader::{self, CSV_FILE_NAME, XLSX_FILE_NAME};
use crate::error::{AppError, ViewError};
use crate::flash::UpdateTimers;
use crate::login::{self, AdminGate, SESSION_COOKIE};
use crate::view::CycleView;

const VIEW_TEMPLATE: &str = "cuzler";
const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// The view of one browser session together with its pending update windows.
#[derive(Debug)]
struct Session {
    view: CycleView,
    timers: UpdateTimers,
}

struct SessionEntry {
    session: Arc<Mutex<Session>>,
    expires_at: DateTime<Utc>,
}

pub struct AppState {
    client: CuzlerClient,
    gate: AdminGate,
    templates: Handlebars<'static>,
    sessions: RwLock<HashMap<String, SessionEntry>>,
    updated_window: Duration,
    session_hours: u32,
    static_dir: String,
}

#[derive(Deserialize)]
struct NameForm {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct PasswordForm {
    #[serde(default)]
    password: String,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let mut templates = Handlebars::new();
        templates.register_template_string(VIEW_TEMPLATE, include_str!("./static/cuzler.hbs"))?;

        Ok(AppState {
            client: CuzlerClient::new(&config.api_base_url),
            gate: AdminGate::new(&config.admin_password)?,
            templates,
            sessions: RwLock::new(HashMap::new()),
            updated_window: config.updated_window(),
            session_hours: config.session_hours,
            static_dir: config.static_dir.clone(),
        })
    }

    /// Returns the live session named by the cookie, if any.
    async fn existing_session(&self, jar: &CookieJar) -> Option<Arc<Mutex<Session>>> {
        let session_id = jar.get(SESSION_COOKIE)?.value().to_string();
        let sessions = self.sessions.read().await;
        sessions
            .get(&session_id)
            .filter(|entry| !login::is_expired(entry.expires_at))
            .map(|entry| Arc::clone(&entry.session))
    }

    /// Returns the session named by the cookie, or starts a new one.
    async fn session_for(&self, jar: CookieJar) -> (CookieJar, Arc<Mutex<Session>>) {
        if let Some(session) = self.existing_session(&jar).await {
            return (jar, session);
        }

        let session = Arc::new(Mutex::new(self.start_session().await));
        let session_id = login::new_session_id();

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, entry| !login::is_expired(entry.expires_at));
        sessions.insert(
            session_id.clone(),
            SessionEntry {
                session: Arc::clone(&session),
                expires_at: login::session_expiry(self.session_hours),
            },
        );
        log::info!("started session ({} active)", sessions.len());

        (jar.add(login::session_cookie(session_id)), session)
    }

    // Records are fetched once per session. A failed fetch leaves the view empty.
    async fn start_session(&self) -> Session {
        let mut view = CycleView::new();
        match self.client.fetch_all().await {
            Ok(records) => {
                log::debug!("fetched {} records", records.len());
                view.load(records);
            }
            Err(e) => log::error!("Error fetching data: {}", e),
        }
        Session {
            view,
            timers: UpdateTimers::new(),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.static_dir);
    Router::new()
        .route("/", get(serve_view))
        .route("/hatim/:number", post(select_hatim))
        .route("/cuz/:id", post(submit_name))
        .route("/cuz/:id/edit", post(enter_edit_mode))
        .route("/admin/login", post(admin_login))
        .route("/admin/visibility", post(toggle_password_visibility))
        .route("/export/cuzlers.xlsx", get(export_xlsx))
        .route("/export/cuzlers.csv", get(export_csv))
        .route("/api/view", get(get_view_data))
        .nest_service("/static", static_files)
        .with_state(state)
}

pub async fn run(config: AppConfig) -> Result<(), AppError> {
    config.validate()?;
    let addr = config.socket_addr()?;
    let state = Arc::new(AppState::new(&config)?);
    log::info!("Using cuzlers API at {}", state.client.base_url());

    let app = router(state);
    let listener = TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_view(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, session) = state.session_for(jar).await;
    let mut session = session.lock().await;
    let snapshot = session.view.snapshot();
    // The notice is shown once.
    session.view.take_notice();

    match state.templates.render(VIEW_TEMPLATE, &snapshot) {
        Ok(html) => (jar, Html(html)).into_response(),
        Err(e) => {
            log::error!("Failed to render view: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, jar, "Failed to render page").into_response()
        }
    }
}

async fn get_view_data(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let Some(session) = state.existing_session(&jar).await else {
        return back_to_page();
    };
    let snapshot = session.lock().await.view.snapshot();
    Json(snapshot).into_response()
}

async fn select_hatim(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(number): Path<u8>,
) -> Response {
    let Some(session) = state.existing_session(&jar).await else {
        return back_to_page();
    };
    let result = session.lock().await.view.select_hatim(number);
    match result {
        Ok(()) => Redirect::to("/").into_response(),
        Err(e @ ViewError::PreviousHatimIncomplete { .. }) => {
            log::info!("{}", e);
            Redirect::to("/").into_response()
        }
        Err(e) => view_error_response(e),
    }
}

async fn submit_name(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(form): Form<NameForm>,
) -> Response {
    let Some(session) = state.existing_session(&jar).await else {
        return back_to_page();
    };

    let pending = {
        let mut guard = session.lock().await;
        let key = match guard.view.find(&id) {
            Ok(cuz) => cuz.key(),
            Err(e) => return view_error_response(e),
        };
        guard.view.edit_name(key, &form.name);
        match guard.view.prepare_submit(&id) {
            Ok(pending) => pending,
            Err(e) => return view_error_response(e),
        }
    };

    // The view only changes once the backend has accepted the update.
    match state
        .client
        .update_person_name(&pending.id, &pending.name)
        .await
    {
        Ok(()) => {
            let mut guard = session.lock().await;
            guard.view.apply_update(&pending);

            let key = pending.key;
            let weak = Arc::downgrade(&session);
            guard.timers.schedule(key, state.updated_window, async move {
                if let Some(session) = weak.upgrade() {
                    session.lock().await.view.finish_update(key);
                }
            });
            log::info!("updated cüz {} of hatim {}", key.cuz, key.hatim);
        }
        Err(e) => log::error!("Error updating personName of {}: {}", pending.id, e),
    }

    Redirect::to("/").into_response()
}

async fn enter_edit_mode(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let Some(session) = state.existing_session(&jar).await else {
        return back_to_page();
    };
    let result = session.lock().await.view.enter_edit_mode(&id);
    match result {
        Ok(()) => Redirect::to("/").into_response(),
        Err(e) => view_error_response(e),
    }
}

async fn admin_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<PasswordForm>,
) -> Response {
    let Some(session) = state.existing_session(&jar).await else {
        return back_to_page();
    };
    let mut guard = session.lock().await;
    guard.view.set_admin_password(&form.password);
    match guard.view.admin_login(|password| state.gate.verify(password)) {
        Ok(()) => log::info!("admin session granted"),
        Err(e) => log::warn!("admin login rejected: {}", e),
    }
    Redirect::to("/").into_response()
}

async fn toggle_password_visibility(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<PasswordForm>,
) -> Response {
    let Some(session) = state.existing_session(&jar).await else {
        return back_to_page();
    };
    let mut guard = session.lock().await;
    guard.view.set_admin_password(&form.password);
    guard.view.toggle_password_visibility();
    Redirect::to("/").into_response()
}

async fn export_xlsx(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let Some(session) = state.existing_session(&jar).await else {
        return back_to_page();
    };
    let guard = session.lock().await;
    if !guard.view.is_admin() {
        return view_error_response(ViewError::NotAdmin);
    }

    match downloader::to_xlsx(guard.view.records()) {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                (header::CONTENT_DISPOSITION, attachment(XLSX_FILE_NAME)),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            log::error!("Failed to export records: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Export failed").into_response()
        }
    }
}

async fn export_csv(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let Some(session) = state.existing_session(&jar).await else {
        return back_to_page();
    };
    let guard = session.lock().await;
    if !guard.view.is_admin() {
        return view_error_response(ViewError::NotAdmin);
    }

    (
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, attachment(CSV_FILE_NAME)),
        ],
        downloader::to_csv(guard.view.records()),
    )
        .into_response()
}

// Requests without a live session go back to the page, which starts one.
fn back_to_page() -> Response {
    Redirect::to("/").into_response()
}

fn attachment(file_name: &str) -> String {
    format!("attachment; filename=\"{}\"", file_name)
}

fn view_error_response(e: ViewError) -> Response {
    let status = match e {
        ViewError::InvalidHatim(_) => StatusCode::BAD_REQUEST,
        ViewError::UnknownRecord(_) => StatusCode::NOT_FOUND,
        ViewError::NotEditable(_) => StatusCode::CONFLICT,
        ViewError::NotAdmin | ViewError::WrongPassword => StatusCode::FORBIDDEN,
        ViewError::PreviousHatimIncomplete { .. } => StatusCode::CONFLICT,
    };
    (status, e.to_string()).into_response()
}
