// src/docs.rs

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    handlers::{analytics, attempt, practice},
    models::{
        analytics::{AnalyticsSnapshot, AttemptPage, RankedIdentifier, StudentProgress},
        attempt::{
            AnswerOutcome, AttemptRecord, SubmitAttemptRequest, SubmitAttemptResponse,
            SubmittedAnswer,
        },
        question::{PracticeSet, PublicQuestion},
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        attempt::submit_attempt,
        attempt::get_progress,
        practice::get_todays_set,
        analytics::get_overview,
        analytics::list_attempts,
        analytics::get_attempt,
    ),
    components(schemas(
        SubmitAttemptRequest,
        SubmitAttemptResponse,
        SubmittedAnswer,
        AnswerOutcome,
        AttemptRecord,
        AttemptPage,
        AnalyticsSnapshot,
        RankedIdentifier,
        StudentProgress,
        PracticeSet,
        PublicQuestion,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Attempts", description = "Scoring and recording submissions"),
        (name = "Practice", description = "Student-facing daily sets"),
        (name = "Analytics", description = "Admin dashboards")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
