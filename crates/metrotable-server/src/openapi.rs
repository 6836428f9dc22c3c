use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "metrotable API",
        version = "0.1.0",
        description = "Metropolitan area records extracted from a Wikipedia table."
    ),
    paths(crate::routes::list_areas, crate::routes::health),
    components(schemas(
        crate::dto::AreaRecord,
        crate::dto::NoDataResponse,
        crate::dto::AreaRow,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "areas", description = "Extracted table rows"),
        (name = "system", description = "Health and system status"),
    )
)]
pub struct ApiDoc;
