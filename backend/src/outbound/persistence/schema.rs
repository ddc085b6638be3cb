//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them
//! for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Dashboard user accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Normalised email address, unique.
        email -> Varchar,
        /// Display name shown in the dashboard.
        display_name -> Varchar,
        /// Granted role: `admin`, `manager`, or `promoter`.
        role -> Varchar,
        /// Owning company for managers and promoters.
        company_id -> Nullable<Uuid>,
        /// Account status: `active` or `archived`.
        status -> Varchar,
        /// Lowercase hex salt for the credential digest.
        password_salt -> Varchar,
        /// Lowercase hex `SHA-256(salt || password)`.
        password_digest -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Client companies.
    companies (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Trimmed display name, unique.
        name -> Varchar,
        /// Contact address shown on tasting paperwork.
        contact_email -> Varchar,
        /// Object-store key of the uploaded logo.
        logo_key -> Nullable<Varchar>,
        /// Soft-delete status: `active` or `archived`.
        status -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Promotable products, each owned by a company.
    products (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning company.
        company_id -> Uuid,
        /// Trimmed display name.
        name -> Varchar,
        /// Optional marketing blurb.
        description -> Nullable<Text>,
        /// Object-store key of the uploaded product shot.
        image_key -> Nullable<Varchar>,
        /// Soft-delete status: `active` or `archived`.
        status -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Scheduled tasting events.
    tastings (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Company the event promotes for.
        company_id -> Uuid,
        /// Product being tasted.
        product_id -> Uuid,
        /// Assigned promoter, if one has been booked.
        promoter_id -> Nullable<Uuid>,
        /// Venue description.
        venue -> Varchar,
        /// Scheduled start.
        starts_at -> Timestamptz,
        /// Scheduled end.
        ends_at -> Timestamptz,
        /// Lifecycle status.
        status -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Run sheets, one per tasting.
    guides (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning tasting, unique across guides.
        tasting_id -> Uuid,
        /// One-line summary shown at the top of the run sheet.
        headline -> Varchar,
        /// Ordered instructions for the promoter.
        steps -> Array<Text>,
        /// Object-store keys for supporting files.
        attachment_keys -> Array<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Outstanding email verification codes.
    verification_codes (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Address the code was issued to.
        email -> Varchar,
        /// Lowercase hex salt.
        salt -> Varchar,
        /// Lowercase hex `SHA-256(salt || code)`.
        code_hash -> Varchar,
        /// Instant the code stops being accepted.
        expires_at -> Timestamptz,
        /// Incorrect attempts recorded so far.
        tries -> Int2,
        /// Set once the code has been confirmed.
        consumed_at -> Nullable<Timestamptz>,
        /// Issue timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(products -> companies (company_id));
diesel::joinable!(guides -> tastings (tasting_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    companies,
    products,
    tastings,
    guides,
    verification_codes,
);
