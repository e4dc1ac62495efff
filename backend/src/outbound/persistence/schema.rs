//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation. Regenerate or update by hand whenever a migration changes
//! the schema.

diesel::table! {
    /// Registered accounts, both citizens and municipal staff.
    ///
    /// `id` is the internal surrogate key; `user_id` is the externally
    /// exposed stable UUID referenced by reports.
    users (id) {
        /// Internal surrogate key.
        id -> Int4,
        /// Externally-exposed stable identifier (UUID v4, unique).
        user_id -> Uuid,
        /// Unique account name.
        username -> Varchar,
        /// Unique contact email.
        email -> Varchar,
        /// Optional contact phone number.
        phone_number -> Nullable<Varchar>,
        /// Opaque credential hash material.
        password_hash -> Varchar,
        /// Credit reward balance; mutated only by the award paths.
        credits -> Int4,
        /// Municipal staff flag.
        is_staff -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Citizen-submitted pothole reports.
    pothole_reports (id) {
        /// Internal surrogate key.
        id -> Int4,
        /// Externally-exposed stable identifier (UUID v4, unique).
        report_id -> Uuid,
        /// Owning user's external identifier (FK, cascade delete).
        user_id -> Uuid,
        /// Retrievable image URL, when an image was uploaded.
        image_url -> Nullable<Varchar>,
        /// Object-storage key for the uploaded image.
        storage_key -> Nullable<Varchar>,
        /// Free-text description.
        description -> Nullable<Text>,
        /// Human-readable location name.
        location_name -> Nullable<Varchar>,
        /// Latitude, -90..=90, eight fractional digits.
        latitude -> Nullable<Float8>,
        /// Longitude, -180..=180, eight fractional digits.
        longitude -> Nullable<Float8>,
        /// Severity enum spelling (LOW/MEDIUM/HIGH/CRITICAL).
        severity -> Varchar,
        /// Lifecycle status spelling (PENDING/VERIFIED/REJECTED/IN_PROGRESS/COMPLETED).
        status -> Varchar,
        /// Base award recorded at creation (bookkeeping only).
        credits_awarded -> Int4,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Refreshed on every mutation.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only staff verification log.
    verification_records (id) {
        /// Internal surrogate key.
        id -> Int4,
        /// Verified report's external identifier (FK, cascade delete).
        report_id -> Uuid,
        /// Free-text identity of the verifying staff member.
        verified_by -> Varchar,
        /// Outcome spelling (APPROVED/REJECTED/NEED_INFO), nullable.
        outcome -> Nullable<Varchar>,
        /// Free-text notes.
        notes -> Nullable<Text>,
        /// Decision timestamp.
        verified_at -> Timestamptz,
        /// Optional estimated repair date.
        estimated_repair_date -> Nullable<Date>,
    }
}

diesel::table! {
    /// Read-only per-user summary view (non-staff users, left join over
    /// their reports).
    user_report_summary (user_id) {
        user_id -> Uuid,
        username -> Varchar,
        total_reports -> Int8,
        completed_reports -> Int8,
        total_base_credits -> Int8,
        last_report_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Read-only analytics view grouped by (status, severity, day).
    report_analytics (status, severity, day) {
        status -> Varchar,
        severity -> Varchar,
        day -> Date,
        report_count -> Int8,
        avg_base_credits -> Float8,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, pothole_reports, verification_records);
