use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::books::list_books,
        api::books::add_book,
        api::books::get_book,
        api::books::edit_book,
        api::books::delete_book,
        api::books::clear_books,
        api::lookup::fetch_book_info,
        api::lookup::fetch_book_info_by_title,
        api::data::import_books,
        api::export::export_books,
    ),
    components(
        schemas(
            crate::models::book::Book,
            crate::domain::BookInfo,
        )
    ),
    tags(
        (name = "biblioteca", description = "Biblioteca personal library API")
    )
)]
pub struct ApiDoc;
