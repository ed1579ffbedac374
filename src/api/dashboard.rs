//! Home page endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, services::dashboard::DashboardCounts};

use super::AuthenticatedUser;

/// Catalog counts and the visit counter of the current session
#[utoipa::path(
    get,
    path = "/",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Home page counts", body = DashboardCounts),
        (status = 303, description = "Login required")
    )
)]
pub async fn index(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<DashboardCounts>> {
    let counts = state.services.dashboard.summary(&claims.sid).await?;
    Ok(Json(counts))
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    };

    use axum::http::StatusCode;

    use crate::test_util::{empty_request, send, token, TestApp, TEST_SID};

    fn app_with_counts() -> TestApp {
        let mut app = TestApp::new().logged_in(7);
        app.repo.books.expect_count().returning(|| Ok(3));
        app.repo
            .books
            .expect_count_title_containing()
            .returning(|_| Ok(0));
        app.repo.instances.expect_count().returning(|| Ok(6));
        app.repo
            .instances
            .expect_count_by_status()
            .returning(|_| Ok(2));
        app.repo.authors.expect_count().returning(|| Ok(2));
        app.repo.taxonomy.expect_count_genres().returning(|| Ok(4));
        app
    }

    #[tokio::test]
    async fn home_page_reports_counts() {
        let mut app = app_with_counts();
        app.sessions
            .expect_incr_visits()
            .withf(|sid| sid == TEST_SID)
            .returning(|_| Ok(1));

        let (status, _, body) = send(
            app.router(),
            empty_request("GET", "/api/v1/", Some(&token(7, &[]))),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["num_books"], 3);
        assert_eq!(body["num_instances"], 6);
        assert_eq!(body["num_instances_available"], 2);
        assert_eq!(body["num_authors"], 2);
        assert_eq!(body["num_genres"], 4);
        assert_eq!(body["num_word"], 0);
        assert_eq!(body["num_visits"], 0);
    }

    #[tokio::test]
    async fn each_visit_increments_the_counter() {
        let visits = Arc::new(AtomicI64::new(0));
        let mut app = app_with_counts();
        let v = visits.clone();
        app.sessions
            .expect_incr_visits()
            .returning(move |_| Ok(v.fetch_add(1, Ordering::SeqCst) + 1));
        let router = app.router();

        let token = token(7, &[]);
        for expected in 0..3 {
            let (_, _, body) = send(
                router.clone(),
                empty_request("GET", "/api/v1", Some(&token)),
            )
            .await;
            assert_eq!(body["num_visits"], expected);
        }
        assert_eq!(visits.load(Ordering::SeqCst), 3);
    }
}
