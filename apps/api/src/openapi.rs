//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for the task-list API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tasklist API",
        version = "0.1.0",
        description = "Ordered task list management API",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/tasks", api = domain_tasks::ApiDoc)
    ),
    tags(
        (name = "tasks", description = "Task list endpoints")
    )
)]
pub struct ApiDoc;
