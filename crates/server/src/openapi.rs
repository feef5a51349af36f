use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthDoc {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    #[schema(example = "connected")]
    pub database: String,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct SongDoc {
    pub id: Uuid,
    pub name: String,
    pub path: String,
    pub plays: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(ToSchema)]
pub struct SongInputDoc {
    pub name: String,
    pub path: String,
    /// Defaults to 0 on create and to the stored value on replace.
    pub plays: Option<f64>,
}

#[derive(ToSchema)]
pub struct SongPatchDoc {
    pub name: Option<String>,
    pub path: Option<String>,
    pub plays: Option<f64>,
}

#[derive(ToSchema)]
pub struct SongEnvelopeDoc {
    pub success: bool,
    pub message: Option<String>,
    pub data: SongDoc,
}

#[derive(ToSchema)]
pub struct SongListDoc {
    pub success: bool,
    pub count: usize,
    pub data: Vec<SongDoc>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct DeletedSongDoc {
    pub deleted_song: SongDoc,
    pub deleted_count: u64,
}

#[derive(ToSchema)]
pub struct DeletedEnvelopeDoc {
    pub success: bool,
    pub message: String,
    pub data: DeletedSongDoc,
}

#[derive(ToSchema)]
pub struct ErrorDoc {
    pub success: bool,
    pub error: String,
    /// Underlying error text, outside production only.
    pub detail: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::songs::list,
        crate::routes::songs::get,
        crate::routes::songs::create,
        crate::routes::songs::replace,
        crate::routes::songs::patch,
        crate::routes::songs::delete,
    ),
    components(
        schemas(
            HealthDoc,
            SongDoc,
            SongInputDoc,
            SongPatchDoc,
            SongEnvelopeDoc,
            SongListDoc,
            DeletedSongDoc,
            DeletedEnvelopeDoc,
            ErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "songs")
    )
)]
pub struct ApiDoc;
