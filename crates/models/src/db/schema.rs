table! {
    content_fields (id) {
        id -> Int4,
        section_id -> Int4,
        field_key -> Varchar,
        field_value -> Nullable<Text>,
        field_type -> crate::db::types::Field_type,
        display_order -> Int4,
    }
}

table! {
    entries (id) {
        id -> Int4,
        kind -> crate::db::types::Entry_kind,
        slug -> Varchar,
        title -> Varchar,
        summary -> Nullable<Varchar>,
        body -> Text,
        html -> Text,
        tags -> Array<Text>,
        status -> crate::db::types::Content_status,
        created -> Timestamptz,
        published_at -> Nullable<Timestamptz>,
    }
}

table! {
    page_sections (id) {
        id -> Int4,
        page_id -> Int4,
        section_key -> Varchar,
        section_type -> Varchar,
        display_order -> Int4,
        status -> crate::db::types::Content_status,
    }
}

table! {
    pages (id) {
        id -> Int4,
        route -> Varchar,
        page_title -> Varchar,
        meta_description -> Varchar,
        status -> crate::db::types::Content_status,
    }
}

joinable!(content_fields -> page_sections (section_id));
joinable!(page_sections -> pages (page_id));

allow_tables_to_appear_in_same_query!(
    content_fields,
    entries,
    page_sections,
    pages,
);
