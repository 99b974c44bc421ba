//! SQL schema for the Herald SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Rows are never deleted; removal flips `status` to 'removed'.
CREATE TABLE IF NOT EXISTS subscriptions (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id          INTEGER NOT NULL,
    owner_type        TEXT    NOT NULL,   -- 'profile' | 'group' | 'client' | 'base'
    notification_code INTEGER NOT NULL,
    template_code     INTEGER NOT NULL,
    transport_code    INTEGER NOT NULL,
    address           TEXT,               -- overrides the recipient's contact
    status            TEXT    NOT NULL DEFAULT 'active',
    created_at        TEXT    NOT NULL
);

-- One owner opting out of one subscription.
CREATE TABLE IF NOT EXISTS subscription_cancellations (
    subscription_id INTEGER NOT NULL REFERENCES subscriptions(id),
    owner_id        INTEGER NOT NULL,
    owner_type      TEXT    NOT NULL,
    recorded_at     TEXT    NOT NULL,
    PRIMARY KEY (subscription_id, owner_type, owner_id)
);

CREATE INDEX IF NOT EXISTS subscriptions_dispatch_idx
    ON subscriptions(notification_code, owner_type, owner_id);
CREATE INDEX IF NOT EXISTS subscriptions_owner_idx
    ON subscriptions(owner_type, owner_id);
CREATE INDEX IF NOT EXISTS cancellations_owner_idx
    ON subscription_cancellations(owner_type, owner_id);

PRAGMA user_version = 1;
";
