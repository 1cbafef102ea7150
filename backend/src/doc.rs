//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: the coil endpoints and the health probes
//! - **Schemas**: request and response bodies plus the domain error wrappers
//!   ([`ErrorSchema`], [`ErrorCodeSchema`]) that keep utoipa out of the
//!   domain layer
//!
//! The generated specification is served by Swagger UI in debug builds.

use crate::inbound::http::coils::{
    CoilDeletedResponse, CoilIdResponse, CoilResponse, CoilStatsResponse, CreateCoilRequestBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Coil inventory API",
        description = "HTTP interface for recording, querying and summarising steel coil stock."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::coils::create_coil,
        crate::inbound::http::coils::delete_coil,
        crate::inbound::http::coils::list_coils,
        crate::inbound::http::coils::get_coil,
        crate::inbound::http::coils::coil_stats,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CreateCoilRequestBody,
        CoilIdResponse,
        CoilDeletedResponse,
        CoilResponse,
        CoilStatsResponse,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "coils", description = "Coil stock operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
