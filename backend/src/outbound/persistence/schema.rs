//! Diesel table definitions for the SQLite schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Coils in stock and coils that have left it.
    ///
    /// A row with `removed_at` NULL is active. Timestamps are stored as UTC
    /// without an offset, truncated to whole seconds.
    coils (id) {
        /// Auto-assigned, never reused.
        id -> BigInt,
        length -> Double,
        weight -> Double,
        added_at -> Timestamp,
        removed_at -> Nullable<Timestamp>,
    }
}
